// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Mock instances and per-member dispatch.
//!
//! A [`MockInstance`] owns one [`MemberProxy`] per described member. Callable
//! members dispatch through validation, recording, and rule resolution;
//! fields and properties are backed by value boxes.

use crate::call::{CallArgs, CallLog, CallRecord};
use crate::cell::{CellBinding, PropertyCell, ValueCell};
use crate::error::MockError;
use crate::rules::{Outcome, RuleList, StubRule};
use crate::settings::MockSettings;
use crate::validate::{validate_call, validate_field};
use mimic_schema::{
    synthesize, Describe, DescriptorCache, MemberKind, MemberSpec, SchemaError, TypeDescriptor, Value,
};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, instrument, trace};

static NEXT_MOCK_ID: AtomicU64 = AtomicU64::new(1);

const CALLABLE: &str = "a method or callable";
const READABLE: &str = "a property or field";

/// Build a mock of the described type.
///
/// `name` replaces the auto-assigned number in the mock's identity label.
///
/// ```
/// use std::sync::Arc;
/// use mimic_core::{mock, CallArgs};
/// use mimic_schema::{TypeDescriptor, TypeRef, Value};
///
/// let desc = Arc::new(
///     TypeDescriptor::builder("Random")
///         .method("random", |m| m.returns(TypeRef::Float))
///         .build()
///         .unwrap(),
/// );
/// let rng = mock(&desc, Some("rng"));
/// assert_eq!(rng.to_string(), "Mock[Random#rng]");
/// assert_eq!(rng.call("random", CallArgs::new()).unwrap(), Value::Float(0.0));
/// ```
pub fn mock(descriptor: &Arc<TypeDescriptor>, name: Option<&str>) -> MockInstance {
    let settings = MockSettings {
        name: name.map(str::to_owned),
        ..MockSettings::default()
    };
    mock_with(descriptor, settings)
}

/// Build a mock with explicit [`MockSettings`].
#[instrument(skip_all, fields(type_name = %descriptor.name(), name = ?settings.name))]
pub fn mock_with(descriptor: &Arc<TypeDescriptor>, settings: MockSettings) -> MockInstance {
    let id = NEXT_MOCK_ID.fetch_add(1, Ordering::Relaxed);
    let label = match &settings.name {
        Some(name) => format!("{}#{name}", descriptor.name()),
        None => format!("{}#{id}", descriptor.name()),
    };
    let members = descriptor
        .members()
        .iter()
        .map(|spec| (spec.name.clone(), MemberProxy::new(&label, spec)))
        .collect();
    debug!(mock = %label, members = descriptor.len(), "mock created");
    MockInstance {
        inner: Arc::new(MockInner {
            id,
            label,
            descriptor: Arc::clone(descriptor),
            settings,
            members,
            seq: AtomicU64::new(0),
        }),
    }
}

/// Build a mock of a [`Describe`] type, extracting its descriptor through
/// `cache` on first use.
pub fn mock_of<T: Describe + 'static>(
    cache: &DescriptorCache,
    name: Option<&str>,
) -> Result<MockInstance, SchemaError> {
    let descriptor = cache.get::<T>()?;
    Ok(mock(&descriptor, name))
}

enum MemberState {
    Callable { log: CallLog, rules: RuleList },
    Field(ValueCell),
    Property { cell: Option<PropertyCell>, log: CallLog },
}

/// Per-member state: one lock guards the log, the rules, and the box.
pub(crate) struct MemberProxy {
    label: String,
    spec: MemberSpec,
    state: Mutex<MemberState>,
}

impl MemberProxy {
    fn new(mock_label: &str, spec: &MemberSpec) -> Self {
        let state = match spec.kind {
            MemberKind::Method | MemberKind::Callable => MemberState::Callable {
                log: CallLog::default(),
                rules: RuleList::default(),
            },
            MemberKind::Field => MemberState::Field(ValueCell::default()),
            MemberKind::Property => MemberState::Property {
                cell: None,
                log: CallLog::default(),
            },
        };
        Self {
            label: format!("{mock_label}.{}", spec.name),
            spec: spec.clone(),
            state: Mutex::new(state),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MemberState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wrong_kind(&self, expected: &'static str) -> MockError {
        MockError::WrongMemberKind {
            member: self.label.clone(),
            kind: self.spec.kind,
            expected,
        }
    }
}

struct MockInner {
    id: u64,
    label: String,
    descriptor: Arc<TypeDescriptor>,
    settings: MockSettings,
    members: HashMap<String, MemberProxy>,
    seq: AtomicU64,
}

/// A substitute instance exposing the member surface of a described type.
///
/// Cloning is cheap and clones share every log, rule, and value box, so a
/// test can hand one clone to the code under test and keep another for
/// stubbing and verification.
#[derive(Clone)]
pub struct MockInstance {
    inner: Arc<MockInner>,
}

impl MockInstance {
    /// Identity label, `Type#name` or `Type#number`.
    pub fn label(&self) -> &str {
        &self.inner.label
    }

    /// The descriptor this mock was built from.
    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.inner.descriptor
    }

    /// Settings the mock was built with.
    pub fn settings(&self) -> &MockSettings {
        &self.inner.settings
    }

    /// Member names in declaration order.
    pub fn members(&self) -> Vec<&str> {
        self.inner
            .descriptor
            .members()
            .iter()
            .map(|m| m.name.as_str())
            .collect()
    }

    /// Whether both handles refer to the same mock.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Bind a member by name.
    pub fn member(&self, name: &str) -> Result<Member<'_>, MockError> {
        self.inner
            .members
            .get(name)
            .map(|proxy| Member { mock: self, proxy })
            .ok_or_else(|| MockError::MemberNotFound {
                mock: self.inner.label.clone(),
                member: name.to_owned(),
                type_name: self.inner.descriptor.name().to_owned(),
            })
    }

    /// Invoke a method or callable member.
    pub fn call(&self, name: &str, call: CallArgs) -> Result<Value, MockError> {
        self.member(name)?.call(call)
    }

    /// Read a property (recorded as a zero-argument call) or a field.
    pub fn get(&self, name: &str) -> Result<Value, MockError> {
        self.member(name)?.get()
    }

    /// Write a field, or replace a property's current value.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<(), MockError> {
        self.member(name)?.set(value.into())
    }

    /// Forget every rule and recorded call.
    ///
    /// Attached property cells and written field values are kept.
    pub fn reset(&self) {
        for proxy in self.inner.members.values() {
            match &mut *proxy.lock() {
                MemberState::Callable { log, rules } => {
                    log.clear();
                    rules.clear();
                }
                MemberState::Property { log, .. } => log.clear(),
                MemberState::Field(_) => {}
            }
        }
        debug!(mock = %self.inner.label, "mock reset");
    }

    fn next_seq(&self) -> u64 {
        self.inner.seq.fetch_add(1, Ordering::Relaxed)
    }

    fn binding(&self, proxy: &MemberProxy) -> CellBinding {
        CellBinding {
            member: proxy.label.clone(),
            ty: proxy.spec.result.clone(),
            coercion: self.inner.settings.coercion,
        }
    }
}

impl fmt::Display for MockInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mock[{}]", self.inner.label)
    }
}

impl fmt::Debug for MockInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockInstance")
            .field("label", &self.inner.label)
            .field("type_name", &self.inner.descriptor.name())
            .finish_non_exhaustive()
    }
}

/// Arguments captured by [`Member::rehearse`] for use with
/// [`RuleBuilder::called_with`](crate::RuleBuilder::called_with).
#[derive(Clone, Debug, PartialEq)]
pub struct SignatureToken {
    mock_id: u64,
    member: String,
    call: CallArgs,
}

impl SignatureToken {
    /// Qualified name of the rehearsed member.
    pub fn member(&self) -> &str {
        &self.member
    }

    /// The captured arguments.
    pub fn call_args(&self) -> &CallArgs {
        &self.call
    }

    pub(crate) fn into_parts(self) -> (u64, String, CallArgs) {
        (self.mock_id, self.member, self.call)
    }
}

/// One member of one mock.
#[derive(Clone, Copy)]
pub struct Member<'a> {
    mock: &'a MockInstance,
    proxy: &'a MemberProxy,
}

impl<'a> Member<'a> {
    /// The owning mock.
    pub fn mock(&self) -> &'a MockInstance {
        self.mock
    }

    /// Member name.
    pub fn name(&self) -> &'a str {
        &self.proxy.spec.name
    }

    /// Qualified name, `Type#id.member`.
    pub fn label(&self) -> &'a str {
        &self.proxy.label
    }

    /// Member kind.
    pub fn kind(&self) -> MemberKind {
        self.proxy.spec.kind
    }

    /// Declared signature.
    pub fn spec(&self) -> &'a MemberSpec {
        &self.proxy.spec
    }

    /// Capture `call` as a signature token without validating, recording, or
    /// resolving anything.
    pub fn rehearse(&self, call: CallArgs) -> SignatureToken {
        SignatureToken {
            mock_id: self.mock.inner.id,
            member: self.proxy.label.clone(),
            call,
        }
    }

    /// Invoke a method or callable.
    ///
    /// The call is validated first; a rejected call is neither recorded nor
    /// resolved. Otherwise it is logged and the most recently registered
    /// matching rule supplies the outcome, falling back to a synthesized
    /// default for the declared result type.
    pub fn call(&self, call: CallArgs) -> Result<Value, MockError> {
        self.ensure_callable()?;
        let proxy = self.proxy;
        let coercion = self.mock.inner.settings.coercion;
        if let Err(err) = validate_call(&proxy.spec, &proxy.label, &call, coercion) {
            debug!(member = %proxy.label, error = %err, "call rejected");
            return Err(err);
        }

        let (seq, resolved) = {
            let mut state = proxy.lock();
            let MemberState::Callable { log, rules } = &mut *state else {
                return Err(proxy.wrong_kind(CALLABLE));
            };
            let seq = self.mock.next_seq();
            log.append(&call, seq);
            (seq, rules.resolve(&call))
        };

        match resolved {
            None => {
                trace!(member = %proxy.label, seq, "default synthesis");
                Ok(synthesize(proxy.spec.result.as_ref()))
            }
            Some((rule, outcome)) => {
                trace!(member = %proxy.label, seq, rule, ?outcome, "rule matched");
                match outcome {
                    Outcome::Value(value) => Ok(value),
                    Outcome::Error(error) => Err(MockError::Raised(error)),
                    Outcome::Custom(f) => Ok(f(&call)),
                }
            }
        }
    }

    /// Read a property or field.
    pub fn get(&self) -> Result<Value, MockError> {
        let proxy = self.proxy;
        match &mut *proxy.lock() {
            MemberState::Field(cell) => cell.read(&proxy.label),
            MemberState::Property { cell: None, .. } => Err(MockError::PropertyNotStubbed {
                member: proxy.label.clone(),
            }),
            MemberState::Property {
                cell: Some(cell),
                log,
            } => {
                let seq = self.mock.next_seq();
                log.append(&CallArgs::new(), seq);
                trace!(member = %proxy.label, seq, "property read");
                Ok(cell.value())
            }
            MemberState::Callable { .. } => Err(proxy.wrong_kind(READABLE)),
        }
    }

    /// Write a field, or replace a property's current value.
    ///
    /// Neither is recorded as a call. A property without a cell gets a fresh
    /// one holding `value`.
    pub fn set(&self, value: Value) -> Result<(), MockError> {
        let proxy = self.proxy;
        let coercion = self.mock.inner.settings.coercion;
        match &mut *proxy.lock() {
            MemberState::Field(cell) => {
                validate_field(&proxy.spec, &proxy.label, &value, coercion)?;
                cell.write(value);
                Ok(())
            }
            MemberState::Property { cell: Some(cell), .. } => cell.write_return_value(value),
            MemberState::Property { cell, .. } => {
                let fresh = PropertyCell::new(value);
                fresh.bind(self.mock.binding(proxy))?;
                *cell = Some(fresh);
                Ok(())
            }
            MemberState::Callable { .. } => Err(proxy.wrong_kind(READABLE)),
        }
    }

    pub(crate) fn add_rule(&self, rule: StubRule) -> Result<(), MockError> {
        let proxy = self.proxy;
        let MemberState::Callable { rules, .. } = &mut *proxy.lock() else {
            return Err(proxy.wrong_kind(CALLABLE));
        };
        debug!(member = %proxy.label, matcher = ?rule.matcher, rules = rules.len() + 1, "stub registered");
        rules.push(rule);
        Ok(())
    }

    pub(crate) fn attach_property(&self, cell: PropertyCell) -> Result<(), MockError> {
        let proxy = self.proxy;
        let MemberState::Property { cell: slot, .. } = &mut *proxy.lock() else {
            return Err(proxy.wrong_kind("a property"));
        };
        cell.bind(self.mock.binding(proxy))?;
        *slot = Some(cell);
        debug!(member = %proxy.label, "property cell attached");
        Ok(())
    }

    pub(crate) fn ensure_callable(&self) -> Result<(), MockError> {
        if self.proxy.spec.kind.is_callable() {
            Ok(())
        } else {
            Err(self.proxy.wrong_kind(CALLABLE))
        }
    }

    /// Run `f` over the recorded calls; fields have none.
    pub(crate) fn with_log<R>(&self, f: impl FnOnce(&[CallRecord]) -> R) -> R {
        match &*self.proxy.lock() {
            MemberState::Callable { log, .. } | MemberState::Property { log, .. } => f(log.records()),
            MemberState::Field(_) => f(&[]),
        }
    }

    pub(crate) fn owns(&self, mock_id: u64) -> bool {
        self.mock.inner.id == mock_id
    }
}

impl fmt::Debug for Member<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member")
            .field("label", &self.proxy.label)
            .field("kind", &self.proxy.spec.kind)
            .finish()
    }
}

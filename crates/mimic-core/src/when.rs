// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Stubbing surface: `when(..)` rule builders and `stub(..)` property cells.

use crate::call::CallArgs;
use crate::cell::PropertyCell;
use crate::error::MockError;
use crate::mock::{Member, MockInstance, SignatureToken};
use crate::rules::{Matcher, Outcome, OutcomeProducer, StubRule};
use crate::validate::validate_outcome;
use mimic_schema::Value;
use std::error::Error;
use std::sync::Arc;

/// Begin a stub rule for one member of one mock.
///
/// ```
/// use std::sync::Arc;
/// use mimic_core::{mock, when, CallArgs};
/// use mimic_schema::{TypeDescriptor, TypeRef, Value};
///
/// let desc = Arc::new(
///     TypeDescriptor::builder("Random")
///         .method("randint", |m| m.param("a", TypeRef::Int).param("b", TypeRef::Int).returns(TypeRef::Int))
///         .build()
///         .unwrap(),
/// );
/// let rng = mock(&desc, None);
/// let randint = rng.member("randint").unwrap();
/// when(randint).any_call().then_return_many([1, 2, 3]).unwrap();
///
/// let rolls: Vec<Value> = (0..4)
///     .map(|_| rng.call("randint", CallArgs::positional([1, 6])).unwrap())
///     .collect();
/// assert_eq!(rolls, [1, 2, 3, 3].map(Value::Int));
/// ```
pub fn when(member: Member<'_>) -> RuleBuilder<'_> {
    RuleBuilder { member }
}

/// Chooses which calls a new rule applies to.
#[derive(Debug)]
#[must_use = "a rule is only registered once an outcome is declared"]
pub struct RuleBuilder<'a> {
    member: Member<'a>,
}

impl<'a> RuleBuilder<'a> {
    /// Match every call.
    pub fn any_call(self) -> StubBuilder<'a> {
        self.matching(Ok(Matcher::Any))
    }

    /// Match only calls structurally equal to a rehearsal of this member.
    ///
    /// A token rehearsed on another member, or on another mock, makes the
    /// outcome declaration fail with [`MockError::RehearsalMismatch`].
    pub fn called_with(self, token: SignatureToken) -> StubBuilder<'a> {
        let (mock_id, rehearsed_on, call) = token.into_parts();
        let matcher = if self.member.owns(mock_id) && rehearsed_on == self.member.label() {
            Ok(Matcher::Exact(call))
        } else {
            Err(MockError::RehearsalMismatch {
                expected: self.member.label().to_owned(),
                actual: rehearsed_on,
            })
        };
        self.matching(matcher)
    }

    /// Match calls for which `predicate` returns `true`.
    pub fn call_matching<F>(self, predicate: F) -> StubBuilder<'a>
    where
        F: Fn(&CallArgs) -> bool + Send + Sync + 'static,
    {
        self.matching(Ok(Matcher::Predicate(Arc::new(predicate))))
    }

    fn matching(self, matcher: Result<Matcher, MockError>) -> StubBuilder<'a> {
        StubBuilder {
            member: self.member,
            matcher,
        }
    }
}

/// Declares what a matched call produces and registers the rule.
#[must_use = "a rule is only registered once an outcome is declared"]
pub struct StubBuilder<'a> {
    member: Member<'a>,
    matcher: Result<Matcher, MockError>,
}

impl StubBuilder<'_> {
    /// Return `value` on every matching call.
    pub fn then_return(self, value: impl Into<Value>) -> Result<(), MockError> {
        self.register(vec![Outcome::Value(value.into())])
    }

    /// Return each value in turn, repeating the last one forever.
    pub fn then_return_many<I, T>(self, values: I) -> Result<(), MockError>
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        self.register(values.into_iter().map(|v| Outcome::Value(v.into())).collect())
    }

    /// Fail every matching call with `error`, surfaced as [`MockError::Raised`].
    pub fn then_raise<E>(self, error: E) -> Result<(), MockError>
    where
        E: Error + Send + Sync + 'static,
    {
        self.register(vec![Outcome::error(error)])
    }

    /// Produce a mixed sequence of values, errors, and computations in turn,
    /// repeating the last one forever.
    pub fn use_side_effects<I>(self, outcomes: I) -> Result<(), MockError>
    where
        I: IntoIterator<Item = Outcome>,
    {
        self.register(outcomes.into_iter().collect())
    }

    /// Compute the result from each matching call's arguments.
    ///
    /// The computed value is returned as is; it is not checked against the
    /// declared result type.
    pub fn then<F>(self, f: F) -> Result<(), MockError>
    where
        F: Fn(&CallArgs) -> Value + Send + Sync + 'static,
    {
        self.register(vec![Outcome::custom(f)])
    }

    fn register(self, outcomes: Vec<Outcome>) -> Result<(), MockError> {
        let member = self.member;
        member.ensure_callable()?;
        let matcher = self.matcher?;
        let coercion = member.mock().settings().coercion;
        for outcome in &outcomes {
            if let Outcome::Value(value) = outcome {
                validate_outcome(member.spec(), member.label(), value, coercion)?;
            }
        }
        let producer = OutcomeProducer::new(outcomes).ok_or_else(|| MockError::EmptyOutcomes {
            member: member.label().to_owned(),
        })?;
        member.add_rule(StubRule { matcher, producer })
    }
}

impl std::fmt::Debug for StubBuilder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StubBuilder")
            .field("member", &self.member)
            .field("matcher", &self.matcher)
            .finish()
    }
}

/// Attach property cells to a mock.
pub fn stub(mock: &MockInstance) -> PropertyStubber<'_> {
    PropertyStubber { mock }
}

/// Returned by [`stub`].
#[derive(Debug, Clone, Copy)]
pub struct PropertyStubber<'a> {
    mock: &'a MockInstance,
}

impl PropertyStubber<'_> {
    /// Back the property `name` with `cell`.
    ///
    /// The cell's current value must fit the declared property type
    /// ([`MockError::ReturnType`] otherwise); later writes through any clone
    /// of the cell are held to the same type.
    pub fn property(&self, name: &str, cell: PropertyCell) -> Result<&Self, MockError> {
        self.mock.member(name)?.attach_property(cell)?;
        Ok(self)
    }
}

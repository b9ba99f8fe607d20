// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Stub rules: matchers, outcomes, and most-recent-first resolution.
use crate::call::CallArgs;
use crate::error::RaisedError;
use mimic_schema::Value;
use std::collections::VecDeque;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// Predicate deciding whether a rule applies to the actual call.
///
/// Runs while the member's lock is held, so it must not call back into the
/// same member.
pub type PredicateFn = Arc<dyn Fn(&CallArgs) -> bool + Send + Sync>;

/// Computation producing a result from the actual call.
///
/// Runs after the member's lock is released; it may call back into the mock.
pub type CustomFn = Arc<dyn Fn(&CallArgs) -> Value + Send + Sync>;

/// One entry in a rule's outcome queue.
#[derive(Clone)]
pub enum Outcome {
    /// Return this value.
    Value(Value),
    /// Fail with this user-configured error.
    Error(RaisedError),
    /// Return whatever the function computes from the call.
    Custom(CustomFn),
}

impl Outcome {
    /// A value outcome.
    pub fn value(value: impl Into<Value>) -> Self {
        Self::Value(value.into())
    }

    /// An error outcome.
    pub fn error<E>(error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self::Error(RaisedError::new(error))
    }

    /// A computed outcome.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&CallArgs) -> Value + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }
}

impl From<Value> for Outcome {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<RaisedError> for Outcome {
    fn from(error: RaisedError) -> Self {
        Self::Error(error)
    }
}

impl fmt::Debug for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Error(e) => f.debug_tuple("Error").field(e).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Which calls a rule applies to.
#[derive(Clone)]
pub(crate) enum Matcher {
    Any,
    Exact(CallArgs),
    Predicate(PredicateFn),
}

impl Matcher {
    fn accepts(&self, call: &CallArgs) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(rehearsed) => rehearsed == call,
            Self::Predicate(pred) => pred(call),
        }
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any_call"),
            Self::Exact(call) => write!(f, "called_with{call}"),
            Self::Predicate(_) => f.write_str("call_matching(..)"),
        }
    }
}

/// Outcome queue whose cursor sticks on the final entry.
#[derive(Debug)]
pub(crate) struct OutcomeProducer {
    pending: VecDeque<Outcome>,
    last: Outcome,
}

impl OutcomeProducer {
    /// `None` when `outcomes` is empty.
    pub(crate) fn new(mut outcomes: Vec<Outcome>) -> Option<Self> {
        let last = outcomes.pop()?;
        Some(Self {
            pending: outcomes.into(),
            last,
        })
    }

    pub(crate) fn next_outcome(&mut self) -> Outcome {
        self.pending
            .pop_front()
            .unwrap_or_else(|| self.last.clone())
    }
}

#[derive(Debug)]
pub(crate) struct StubRule {
    pub(crate) matcher: Matcher,
    pub(crate) producer: OutcomeProducer,
}

/// A member's rules in registration order.
#[derive(Debug, Default)]
pub(crate) struct RuleList {
    rules: Vec<StubRule>,
}

impl RuleList {
    pub(crate) fn push(&mut self, rule: StubRule) {
        self.rules.push(rule);
    }

    /// Draw from the most recently registered rule accepting `call`.
    ///
    /// Returns the matching rule's registration index with its outcome, or
    /// `None` when no rule applies.
    pub(crate) fn resolve(&mut self, call: &CallArgs) -> Option<(usize, Outcome)> {
        self.rules
            .iter_mut()
            .enumerate()
            .rev()
            .find(|(_, rule)| rule.matcher.accepts(call))
            .map(|(index, rule)| (index, rule.producer.next_outcome()))
    }

    pub(crate) fn len(&self) -> usize {
        self.rules.len()
    }

    pub(crate) fn clear(&mut self) {
        self.rules.clear();
    }
}

// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Call arguments and the per-member call log.

use mimic_schema::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Positional and keyword arguments of one invocation.
///
/// ```
/// use mimic_core::CallArgs;
///
/// let call = CallArgs::new().arg(1).arg("two").kwarg("flag", true);
/// assert_eq!(call.to_string(), r#"(1, "two", flag=true)"#);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CallArgs {
    #[serde(default)]
    args: Vec<Value>,
    #[serde(default)]
    kwargs: BTreeMap<String, Value>,
}

impl CallArgs {
    /// A call with no arguments.
    pub fn new() -> Self {
        Self::default()
    }

    /// A call with only positional arguments.
    pub fn positional<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            kwargs: BTreeMap::new(),
        }
    }

    /// Append a positional argument.
    #[must_use]
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Set a keyword argument, replacing an earlier one of the same name.
    #[must_use]
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.kwargs.insert(name.into(), value.into());
        self
    }

    /// Positional arguments in call order.
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Keyword arguments by name.
    pub fn kwargs(&self) -> &BTreeMap<String, Value> {
        &self.kwargs
    }

    /// Positional argument at `index`.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }

    /// Keyword argument called `name`.
    pub fn keyword(&self, name: &str) -> Option<&Value> {
        self.kwargs.get(name)
    }

    /// No positional and no keyword arguments.
    pub fn is_empty(&self) -> bool {
        self.args.is_empty() && self.kwargs.is_empty()
    }
}

impl<T: Into<Value>> FromIterator<T> for CallArgs {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::positional(iter)
    }
}

impl fmt::Display for CallArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        let mut first = true;
        for arg in &self.args {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "{arg}")?;
        }
        for (name, value) in &self.kwargs {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "{name}={value}")?;
        }
        f.write_str(")")
    }
}

/// One validated call, as recorded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CallRecord {
    /// Positional arguments.
    pub args: Vec<Value>,
    /// Keyword arguments.
    pub kwargs: BTreeMap<String, Value>,
    /// Position of this call among every recorded call on the same mock.
    pub seq: u64,
}

impl CallRecord {
    /// Args alone when there are no keywords, otherwise both.
    pub fn summary(&self) -> CallSummary {
        if self.kwargs.is_empty() {
            CallSummary::Args(self.args.clone())
        } else {
            CallSummary::WithKwargs(self.args.clone(), self.kwargs.clone())
        }
    }

    /// The arguments as a [`CallArgs`], e.g. to compare against a rehearsal.
    pub fn to_call_args(&self) -> CallArgs {
        CallArgs {
            args: self.args.clone(),
            kwargs: self.kwargs.clone(),
        }
    }
}

/// What `last_call` and `nth_call` report.
#[derive(Clone, Debug, PartialEq)]
pub enum CallSummary {
    /// The call had no keyword arguments.
    Args(Vec<Value>),
    /// The call had keyword arguments.
    WithKwargs(Vec<Value>, BTreeMap<String, Value>),
}

impl CallSummary {
    /// Positional arguments.
    pub fn args(&self) -> &[Value] {
        match self {
            Self::Args(args) | Self::WithKwargs(args, _) => args,
        }
    }

    /// Keyword arguments, if any were passed.
    pub fn kwargs(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Self::Args(_) => None,
            Self::WithKwargs(_, kwargs) => Some(kwargs),
        }
    }
}

/// Append-only history of one member's validated calls.
#[derive(Debug, Default)]
pub(crate) struct CallLog {
    records: Vec<CallRecord>,
}

impl CallLog {
    pub(crate) fn append(&mut self, call: &CallArgs, seq: u64) {
        self.records.push(CallRecord {
            args: call.args.clone(),
            kwargs: call.kwargs.clone(),
            seq,
        });
    }

    pub(crate) fn records(&self) -> &[CallRecord] {
        &self.records
    }

    pub(crate) fn clear(&mut self) {
        self.records.clear();
    }
}

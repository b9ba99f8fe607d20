// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Engine errors and user-configured errors.

use mimic_schema::{MemberKind, TypeRef, Value};
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Why a call's arguments do not fit the declared signature.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArgumentMismatch {
    /// An argument's runtime type is incompatible with the declared type.
    #[error("parameter '{param}' expects {expected}, got {value} ({actual})", actual = .value.type_name())]
    WrongType {
        /// Parameter (or field) name.
        param: String,
        /// Declared type.
        expected: TypeRef,
        /// Offending value.
        value: Value,
    },
    /// More positional arguments than positional parameters and no `*args`.
    #[error("takes {max} positional argument(s) but {given} were given")]
    TooManyPositional {
        /// Positional parameters declared.
        max: usize,
        /// Positional arguments supplied.
        given: usize,
    },
    /// A required parameter was not bound.
    #[error("missing a required argument: '{param}'")]
    Missing {
        /// Unbound parameter.
        param: String,
    },
    /// A keyword matched no parameter and there is no `**kwargs`.
    #[error("got an unexpected keyword argument '{name}'")]
    UnexpectedKeyword {
        /// The unknown keyword.
        name: String,
    },
    /// A parameter was bound both positionally and by keyword.
    #[error("got multiple values for argument '{param}'")]
    MultipleValues {
        /// The doubly bound parameter.
        param: String,
    },
}

/// Error type for every mock operation.
///
/// All variants except [`MockError::Raised`] are detected by the engine.
/// `Raised` carries an error the test registered with `then_raise` or
/// `use_side_effects`, surfaced exactly as supplied.
#[derive(Debug, Error)]
pub enum MockError {
    /// The member does not exist on the mocked type.
    #[error("[MEMBER_NOT_FOUND] {mock}.{member} does not exist on the mocked type {type_name}")]
    MemberNotFound {
        /// Mock identity label.
        mock: String,
        /// Requested member.
        member: String,
        /// Name of the described type.
        type_name: String,
    },
    /// The member exists but the operation needs a different kind.
    #[error("[WRONG_MEMBER_KIND] {member} is a {kind}; expected {expected}")]
    WrongMemberKind {
        /// Qualified member name.
        member: String,
        /// The member's actual kind.
        kind: MemberKind,
        /// What the operation accepts.
        expected: &'static str,
    },
    /// Arguments (or a written field value) do not fit the declared types.
    #[error("[ARGUMENT_TYPE] {member}: {mismatch}")]
    ArgumentType {
        /// Qualified member name.
        member: String,
        /// What went wrong.
        mismatch: ArgumentMismatch,
    },
    /// A stubbed result does not fit the declared result type.
    #[error(
        "[RETURN_TYPE] cannot use {value} ({actual}) as the result of {member}; the declared result type is {expected}",
        actual = .value.type_name()
    )]
    ReturnType {
        /// Qualified member name.
        member: String,
        /// Declared result type.
        expected: TypeRef,
        /// Rejected value.
        value: Value,
    },
    /// A field was read before anything was written to it.
    #[error("[UNSET_FIELD] {member} was read before a value was set")]
    UnsetFieldAccess {
        /// Qualified member name.
        member: String,
    },
    /// A property was used before a cell was attached with `stub(..).property(..)`.
    #[error("[PROPERTY_NOT_STUBBED] {member} needs a PropertyCell before use")]
    PropertyNotStubbed {
        /// Qualified member name.
        member: String,
    },
    /// An outcome declaration received no outcomes.
    #[error("[EMPTY_OUTCOMES] a stub for {member} needs at least one outcome")]
    EmptyOutcomes {
        /// Qualified member name.
        member: String,
    },
    /// A rehearsal token was recorded against a different member.
    #[error("[REHEARSAL_MISMATCH] when({expected}).called_with(..) was given a rehearsal of {actual}")]
    RehearsalMismatch {
        /// Member being stubbed.
        expected: String,
        /// Member the token was rehearsed on.
        actual: String,
    },
    /// A call log query needed at least one call.
    #[error("[NO_CALLS_RECORDED] {member} was not called")]
    NoCallsRecorded {
        /// Qualified member name.
        member: String,
    },
    /// A call log query went past the recorded calls.
    #[error(
        "[INDEX_OUT_OF_RANGE] {member} was not called {wanted} time(s); the actual number of calls was {num_calls}",
        wanted = .index + 1
    )]
    IndexOutOfRange {
        /// Qualified member name.
        member: String,
        /// Requested zero-based index.
        index: usize,
        /// Calls recorded.
        num_calls: usize,
    },
    /// `was_not_called` found recorded calls.
    #[error("[UNEXPECTED_CALLS] expected {member} not to be called, but it was called {num_calls} time(s)")]
    UnexpectedCalls {
        /// Qualified member name.
        member: String,
        /// Calls recorded.
        num_calls: usize,
    },
    /// A user-configured error, re-raised verbatim.
    #[error(transparent)]
    Raised(RaisedError),
}

impl MockError {
    /// The user-configured error, if this is one.
    pub fn raised(&self) -> Option<&RaisedError> {
        match self {
            Self::Raised(e) => Some(e),
            _ => None,
        }
    }
}

/// A user-supplied error stored in a stub and handed back on each matching call.
///
/// Clones share the original error, so identity survives repeated raising
/// ([`RaisedError::ptr_eq`]) and the concrete type can be recovered with
/// [`RaisedError::downcast_ref`].
#[derive(Clone)]
pub struct RaisedError(Arc<dyn Error + Send + Sync + 'static>);

impl RaisedError {
    /// Wrap an error for storage in a stub rule.
    pub fn new<E>(error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self(Arc::new(error))
    }

    /// Borrow the original error.
    pub fn get_ref(&self) -> &(dyn Error + Send + Sync + 'static) {
        &*self.0
    }

    /// Recover the concrete error type.
    pub fn downcast_ref<E: Error + 'static>(&self) -> Option<&E> {
        self.0.downcast_ref::<E>()
    }

    /// Whether the original error is an `E`.
    pub fn is<E: Error + 'static>(&self) -> bool {
        self.0.is::<E>()
    }

    /// Whether both handles point at the same registered error.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for RaisedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for RaisedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}

impl Error for RaisedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.0.source()
    }
}

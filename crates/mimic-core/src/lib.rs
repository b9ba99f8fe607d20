// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! mimic-core: type-checked mocks, stubs, and spies.
//!
//! A [`MockInstance`] is built from an immutable
//! [`TypeDescriptor`](mimic_schema::TypeDescriptor) and exposes the same
//! member surface. Every call is validated against the declared signature,
//! recorded, and resolved through the member's stub rules:
//!
//! - [`when`] registers rules (`any_call`, `called_with`, `call_matching`)
//!   with their outcomes; the most recently registered matching rule wins.
//! - [`that`] / [`spy`] query the call log.
//! - [`stub`] attaches [`PropertyCell`]s to properties.
//!
//! Calls no rule matches return a default synthesized from the declared
//! result type.
#![forbid(unsafe_code)]

mod call;
mod cell;
mod error;
mod mock;
mod rules;
mod settings;
mod validate;
mod verify;
mod when;

pub use call::{CallArgs, CallRecord, CallSummary};
pub use cell::PropertyCell;
pub use error::{ArgumentMismatch, MockError, RaisedError};
pub use mock::{mock, mock_of, mock_with, Member, MockInstance, SignatureToken};
pub use rules::{CustomFn, Outcome, PredicateFn};
pub use settings::{MockSettings, NumericCoercion};
pub use validate::{type_matches, validate_call, validate_outcome};
pub use verify::{spy, that, VerificationView};
pub use when::{stub, when, PropertyStubber, RuleBuilder, StubBuilder};

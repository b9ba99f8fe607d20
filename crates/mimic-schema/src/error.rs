// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Errors raised while describing a type.

use thiserror::Error;

/// Error type for descriptor extraction and annotation parsing.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The target exposes no introspectable members.
    #[error("[UNSUPPORTED_TYPE] {type_name} exposes no members that can be mocked")]
    UnsupportedType {
        /// Name of the rejected type.
        type_name: String,
    },
    /// Two members share a name.
    #[error("[DUPLICATE_MEMBER] {type_name}.{member} is declared more than once")]
    DuplicateMember {
        /// Owning type.
        type_name: String,
        /// Repeated member name.
        member: String,
    },
    /// A member's parameter list is not a valid signature.
    #[error("[INVALID_SIGNATURE] {type_name}.{member}(): {reason}")]
    InvalidSignature {
        /// Owning type.
        type_name: String,
        /// Offending member.
        member: String,
        /// What is wrong with the parameter list.
        reason: String,
    },
    /// An annotation string could not be parsed.
    #[error("[TYPE_SYNTAX] cannot parse annotation {input:?} at offset {position}: {reason}")]
    TypeSyntax {
        /// The full annotation text.
        input: String,
        /// Byte offset where parsing stopped.
        position: usize,
        /// What the parser expected.
        reason: String,
    },
    /// A JSON schema document could not be decoded.
    #[error("[SCHEMA_JSON] {0}")]
    Json(#[from] serde_json::Error),
}

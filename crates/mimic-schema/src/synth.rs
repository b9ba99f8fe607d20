// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Default value synthesis for members with no matching stub.

use crate::ty::TypeRef;
use crate::value::Value;

/// Deterministic placeholder for a declared type.
///
/// Primitive and container types map to their empty/zero value. Unions,
/// named types, `Any`, `None`, and an absent annotation all yield
/// [`Value::None`]. Never fails.
pub fn synthesize(ty: Option<&TypeRef>) -> Value {
    match ty {
        Some(TypeRef::Str) => Value::Str(String::new()),
        Some(TypeRef::Int) => Value::Int(0),
        Some(TypeRef::Bool) => Value::Bool(false),
        Some(TypeRef::Float) => Value::Float(0.0),
        Some(TypeRef::Map(..)) => Value::Map(Vec::new()),
        Some(TypeRef::List(_)) => Value::List(Vec::new()),
        Some(TypeRef::Tuple(_)) => Value::Tuple(Vec::new()),
        Some(TypeRef::Set(_)) => Value::Set(Vec::new()),
        Some(TypeRef::Any | TypeRef::NoneType | TypeRef::Union(_) | TypeRef::Named(_)) | None => {
            Value::None
        }
    }
}

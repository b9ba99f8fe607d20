// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Sample descriptors shared across test suites.

use mimic_schema::{Describe, SchemaError, TypeDescriptor, TypeRef, Value};
use std::sync::Arc;

/// Marker type describing a random-number source.
///
/// Members:
/// - `random() -> float`
/// - `randint(a: int, b: int) -> int`
/// - `seed(a: int | None = None) -> None`
/// - `choice(seq: list) -> Any`
/// - `sample(population: list, *extra: int, k: int = 1, **options: str) -> list`
/// - `name: str` (property)
#[derive(Debug)]
pub struct Random;

impl Describe for Random {
    fn describe() -> Result<TypeDescriptor, SchemaError> {
        TypeDescriptor::builder("Random")
            .method("random", |m| m.returns(TypeRef::Float))
            .method("randint", |m| {
                m.param("self", TypeRef::Any)
                    .param("a", TypeRef::Int)
                    .param("b", TypeRef::Int)
                    .returns(TypeRef::Int)
            })
            .method("seed", |m| {
                m.optional("a", TypeRef::optional(TypeRef::Int), Value::None)
                    .returns(TypeRef::NoneType)
            })
            .method("choice", |m| {
                m.param("seq", TypeRef::list(TypeRef::Any))
                    .returns(TypeRef::Any)
            })
            .method("sample", |m| {
                m.param("population", TypeRef::list(TypeRef::Any))
                    .var_args("extra", TypeRef::Int)
                    .keyword_optional("k", TypeRef::Int, 1)
                    .var_kwargs("options", TypeRef::Str)
                    .returns(TypeRef::list(TypeRef::Any))
            })
            .property("name", TypeRef::Str)
            .build()
    }
}

/// Marker type with one member of every kind.
///
/// Members:
/// - `think(topic: str, depth: int = 1) -> str`
/// - `meaning_of_life: str` (property)
/// - `age: int` (field)
/// - `on_idea(idea: str) -> bool` (callable)
/// - `nickname: str | None` (field)
#[derive(Debug)]
pub struct Philosopher;

impl Describe for Philosopher {
    fn describe() -> Result<TypeDescriptor, SchemaError> {
        TypeDescriptor::builder("Philosopher")
            .method("think", |m| {
                m.param("topic", TypeRef::Str)
                    .optional("depth", TypeRef::Int, 1)
                    .returns(TypeRef::Str)
            })
            .property("meaning_of_life", TypeRef::Str)
            .field("age", TypeRef::Int)
            .callable("on_idea", |m| m.param("idea", TypeRef::Str).returns(TypeRef::Bool))
            .field("nickname", TypeRef::optional(TypeRef::Str))
            .build()
    }
}

/// The `Random` descriptor as a JSON schema document.
pub const RANDOM_SCHEMA_JSON: &str = r#"{
    "name": "Random",
    "members": [
        { "name": "random", "kind": "method", "returns": "float" },
        { "name": "randint", "kind": "method", "returns": "int",
          "params": [{ "name": "self" }, { "name": "a", "type": "int" }, { "name": "b", "type": "int" }] },
        { "name": "seed", "kind": "method", "returns": "None",
          "params": [{ "name": "a", "type": "Optional[int]", "default": { "kind": "None" } }] },
        { "name": "choice", "kind": "method", "returns": "Any",
          "params": [{ "name": "seq", "type": "list[Any]" }] },
        { "name": "sample", "kind": "method", "returns": "list[Any]",
          "params": [
            { "name": "population", "type": "list[Any]" },
            { "name": "extra", "type": "int", "kind": "var_positional" },
            { "name": "k", "type": "int", "kind": "keyword_only", "default": { "kind": "Int", "value": 1 } },
            { "name": "options", "type": "str", "kind": "var_keyword" }
          ] },
        { "name": "name", "kind": "property", "returns": "str" }
    ]
}"#;

fn shared(desc: Result<TypeDescriptor, SchemaError>) -> Arc<TypeDescriptor> {
    match desc {
        Ok(desc) => Arc::new(desc),
        // Fixture descriptors are static; failing here is a bug in this crate.
        Err(err) => unreachable!("fixture descriptor is invalid: {err}"),
    }
}

/// Shared `Random` descriptor.
pub fn random_descriptor() -> Arc<TypeDescriptor> {
    shared(Random::describe())
}

/// Shared `Philosopher` descriptor.
pub fn philosopher_descriptor() -> Arc<TypeDescriptor> {
    shared(Philosopher::describe())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn json_schema_matches_builder() {
        let from_json = TypeDescriptor::from_json(RANDOM_SCHEMA_JSON).unwrap();
        assert_eq!(from_json, *random_descriptor());
    }

    #[test]
    fn philosopher_has_every_kind() {
        let desc = philosopher_descriptor();
        assert_eq!(desc.len(), 5);
    }
}

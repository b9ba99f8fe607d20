// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Dynamic values exchanged with mocked members.
//!
//! Arguments, stubbed results, field contents, and property values all travel
//! as [`Value`]. The model is closed on purpose: every declared
//! [`TypeRef`](crate::TypeRef) kind has exactly one runtime shape, which keeps
//! type checks and default synthesis total.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A runtime value.
///
/// Serialized as `{ "kind": "...", "value": ... }`.
///
/// Equality is structural. [`Value::Set`] and [`Value::Map`] compare without
/// regard to element order; every other container is order-sensitive.
/// Integers and floats never compare equal to each other.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum Value {
    /// Explicit "no value" marker.
    None,
    /// Boolean value.
    Bool(bool),
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit float.
    Float(f64),
    /// UTF-8 text.
    Str(String),
    /// Ordered sequence.
    List(Vec<Value>),
    /// Fixed-shape record of positional values.
    Tuple(Vec<Value>),
    /// Unordered collection of distinct values.
    Set(Vec<Value>),
    /// Key/value mapping with distinct keys.
    Map(Vec<(Value, Value)>),
    /// Instance of a user-named type.
    Object {
        /// Name of the instance's type, matched against [`TypeRef::Named`](crate::TypeRef::Named).
        type_name: String,
        /// Field values by name.
        fields: BTreeMap<String, Value>,
    },
}

impl Value {
    /// Build a [`Value::List`].
    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Build a [`Value::Tuple`].
    pub fn tuple<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Self::Tuple(items.into_iter().map(Into::into).collect())
    }

    /// Build a [`Value::Set`], dropping duplicates.
    pub fn set<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        let mut out: Vec<Value> = Vec::new();
        for item in items {
            let item = item.into();
            if !out.contains(&item) {
                out.push(item);
            }
        }
        Self::Set(out)
    }

    /// Build a [`Value::Map`]. A repeated key keeps the last value.
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Value>,
        V: Into<Value>,
    {
        let mut out: Vec<(Value, Value)> = Vec::new();
        for (k, v) in entries {
            let (k, v) = (k.into(), v.into());
            match out.iter_mut().find(|(existing, _)| *existing == k) {
                Some(slot) => slot.1 = v,
                None => out.push((k, v)),
            }
        }
        Self::Map(out)
    }

    /// Build a [`Value::Object`] of the given type.
    pub fn object<I, K, V>(type_name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self::Object {
            type_name: type_name.into(),
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Runtime type name used in diagnostics (`int`, `str`, `list`, ...).
    pub fn type_name(&self) -> &str {
        match self {
            Self::None => "NoneType",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::List(_) => "list",
            Self::Tuple(_) => "tuple",
            Self::Set(_) => "set",
            Self::Map(_) => "dict",
            Self::Object { type_name, .. } => type_name,
        }
    }

    /// Returns `true` for the "no value" marker.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Boolean payload, if any.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer payload, if any.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Float payload, if any.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Text payload, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Elements of a list, tuple, or set.
    pub fn as_items(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) | Self::Tuple(items) | Self::Set(items) => Some(items),
            _ => None,
        }
    }

    /// Field of an object value.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Object { fields, .. } => fields.get(name),
            _ => None,
        }
    }
}

/// Multiset equality: order is ignored, multiplicity is not.
fn same_elements<T: PartialEq>(a: &[T], b: &[T]) -> bool {
    let count = |items: &[T], x: &T| items.iter().filter(|y| *y == x).count();
    a.len() == b.len() && a.iter().all(|x| count(a, x) == count(b, x))
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::None, Self::None) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::List(a), Self::List(b)) | (Self::Tuple(a), Self::Tuple(b)) => a == b,
            (Self::Set(a), Self::Set(b)) => same_elements(a, b),
            (Self::Map(a), Self::Map(b)) => same_elements(a, b),
            (
                Self::Object {
                    type_name: ta,
                    fields: fa,
                },
                Self::Object {
                    type_name: tb,
                    fields: fb,
                },
            ) => ta == tb && fa == fb,
            _ => false,
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::List(items) => {
                f.write_str("[")?;
                write_joined(f, items)?;
                f.write_str("]")
            }
            Self::Tuple(items) => {
                f.write_str("(")?;
                write_joined(f, items)?;
                if items.len() == 1 {
                    f.write_str(",")?;
                }
                f.write_str(")")
            }
            Self::Set(items) if items.is_empty() => f.write_str("set()"),
            Self::Set(items) => {
                f.write_str("{")?;
                write_joined(f, items)?;
                f.write_str("}")
            }
            Self::Map(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
            Self::Object { type_name, fields } => {
                write!(f, "{type_name} {{")?;
                for (i, (k, v)) in fields.iter().enumerate() {
                    f.write_str(if i == 0 { " " } else { ", " })?;
                    write!(f, "{k}: {v}")?;
                }
                if !fields.is_empty() {
                    f.write_str(" ")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<f32> for Value {
    fn from(x: f32) -> Self {
        Self::Float(f64::from(x))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Self::None
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::None, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::list(items)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn sets_and_maps_ignore_order() {
        assert_eq!(Value::set([1, 2, 3]), Value::set([3, 1, 2]));
        assert_eq!(Value::map([("a", 1), ("b", 2)]), Value::map([("b", 2), ("a", 1)]));
        assert_ne!(Value::list([1, 2]), Value::list([2, 1]));
    }

    #[test]
    fn set_drops_duplicates_and_map_keeps_last() {
        assert_eq!(Value::set([1, 1, 2]).as_items().map(<[Value]>::len), Some(2));
        assert_eq!(Value::map([("k", 1), ("k", 2)]), Value::map([("k", 2)]));
    }

    #[test]
    fn raw_collections_compare_multiplicity() {
        let ints = |xs: &[i64]| xs.iter().map(|&x| Value::Int(x)).collect::<Vec<_>>();
        assert_ne!(Value::Set(ints(&[1, 1, 2])), Value::Set(ints(&[1, 2, 2])));
        assert_eq!(Value::Set(ints(&[1, 2, 1])), Value::Set(ints(&[1, 1, 2])));
        let entry = |k: &str, v: i64| (Value::from(k), Value::Int(v));
        assert_ne!(
            Value::Map(vec![entry("a", 1), entry("a", 1), entry("b", 2)]),
            Value::Map(vec![entry("a", 1), entry("b", 2), entry("b", 2)])
        );
    }

    #[test]
    fn int_and_float_are_distinct() {
        assert_ne!(Value::Int(1), Value::Float(1.0));
    }

    #[test]
    fn display_reads_like_an_annotation_literal() {
        assert_eq!(Value::tuple(["a"]).to_string(), "(\"a\",)");
        assert_eq!(Value::set(Vec::<i64>::new()).to_string(), "set()");
        assert_eq!(Value::map([("k", 1.5)]).to_string(), "{\"k\": 1.5}");
        assert_eq!(Value::object("Point", [("x", 1)]).to_string(), "Point { x: 1 }");
    }

    #[test]
    fn option_converts_to_none_marker() {
        assert!(Value::from(Option::<i64>::None).is_none());
        assert_eq!(Value::from(Some("x")), Value::Str("x".into()));
    }

    #[test]
    fn serializes_with_kind_tag() {
        let json = serde_json::to_string(&Value::Int(7)).unwrap();
        assert_eq!(json, r#"{"kind":"Int","value":7}"#);
        let back: Value = serde_json::from_str(r#"{"kind":"None"}"#).unwrap();
        assert!(back.is_none());
    }
}

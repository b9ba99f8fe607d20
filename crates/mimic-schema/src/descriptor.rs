// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Type descriptors: the immutable member table a mock is built from.
//!
//! A [`TypeDescriptor`] is produced once per target type, either through
//! [`TypeDescriptor::builder`], from a JSON schema document
//! ([`TypeDescriptor::from_json`]), or by a [`Describe`](crate::Describe)
//! implementation. Construction normalizes and validates every signature;
//! after that the descriptor never changes and can be shared behind an `Arc`.

use crate::error::SchemaError;
use crate::ty::TypeRef;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// What kind of member a name refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    /// A method taking parameters and producing a result.
    Method,
    /// A data attribute whose value is itself invoked (e.g. a callback slot).
    Callable,
    /// A computed attribute; every read is an observable call.
    Property,
    /// A plain annotated data attribute.
    Field,
}

impl MemberKind {
    /// Methods and callables are dispatched through the stub rule engine.
    pub fn is_callable(self) -> bool {
        matches!(self, Self::Method | Self::Callable)
    }
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Method => "method",
            Self::Callable => "callable",
            Self::Property => "property",
            Self::Field => "field",
        })
    }
}

/// How a parameter binds to call arguments.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    /// Bound by position or by name.
    #[default]
    PositionalOrKeyword,
    /// Bound by name only.
    KeywordOnly,
    /// Collects surplus positional arguments (`*args`).
    VarPositional,
    /// Collects surplus keyword arguments (`**kwargs`).
    VarKeyword,
}

impl ParamKind {
    const fn rank(self) -> u8 {
        match self {
            Self::PositionalOrKeyword => 0,
            Self::VarPositional => 1,
            Self::KeywordOnly => 2,
            Self::VarKeyword => 3,
        }
    }
}

/// One declared parameter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Parameter name.
    pub name: String,
    /// Declared type; `None` when unannotated.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<TypeRef>,
    /// Default value bound when the caller omits the parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Binding kind.
    #[serde(default)]
    pub kind: ParamKind,
}

impl ParamSpec {
    /// Whether the caller may omit this parameter.
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// `*args` or `**kwargs`.
    pub fn is_variadic(&self) -> bool {
        matches!(self.kind, ParamKind::VarPositional | ParamKind::VarKeyword)
    }
}

impl fmt::Display for ParamSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ParamKind::VarPositional => f.write_str("*")?,
            ParamKind::VarKeyword => f.write_str("**")?,
            _ => {}
        }
        f.write_str(&self.name)?;
        if let Some(ty) = &self.ty {
            write!(f, ": {ty}")?;
        }
        if let Some(default) = &self.default {
            write!(f, " = {default}")?;
        }
        Ok(())
    }
}

/// One member of a described type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemberSpec {
    /// Member name.
    pub name: String,
    /// Member kind.
    pub kind: MemberKind,
    /// Ordered parameters (methods and callables only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<ParamSpec>,
    /// Declared result type; for properties and fields, the value type.
    #[serde(default, rename = "returns", skip_serializing_if = "Option::is_none")]
    pub result: Option<TypeRef>,
}

impl MemberSpec {
    /// Render the signature as `name(a: int, b: str = "x") -> int`.
    pub fn signature(&self) -> String {
        let params: Vec<String> = self.params.iter().map(ToString::to_string).collect();
        let mut out = format!("{}({})", self.name, params.join(", "));
        if let Some(result) = &self.result {
            out.push_str(" -> ");
            out.push_str(&result.to_string());
        }
        out
    }

    fn normalize(&mut self, type_name: &str) -> Result<(), SchemaError> {
        let invalid = |reason: String| SchemaError::InvalidSignature {
            type_name: type_name.to_owned(),
            member: self.name.clone(),
            reason,
        };

        if !self.kind.is_callable() {
            if !self.params.is_empty() {
                return Err(invalid(format!("a {} takes no parameters", self.kind)));
            }
            return Ok(());
        }

        if self
            .params
            .first()
            .is_some_and(|p| p.kind == ParamKind::PositionalOrKeyword && matches!(p.name.as_str(), "self" | "cls"))
        {
            self.params.remove(0);
        }

        let mut seen_default = false;
        let mut last_rank = 0;
        for (i, param) in self.params.iter().enumerate() {
            if self.params[..i].iter().any(|p| p.name == param.name) {
                return Err(invalid(format!("duplicate parameter '{}'", param.name)));
            }
            let rank = param.kind.rank();
            let repeats_variadic = rank == last_rank && param.is_variadic() && i > 0;
            if rank < last_rank || repeats_variadic {
                return Err(invalid(format!("parameter '{}' is out of order", param.name)));
            }
            last_rank = rank;
            if param.is_variadic() && param.has_default() {
                return Err(invalid(format!(
                    "variadic parameter '{}' cannot have a default",
                    param.name
                )));
            }
            if param.kind == ParamKind::PositionalOrKeyword {
                if param.has_default() {
                    seen_default = true;
                } else if seen_default {
                    return Err(invalid(format!(
                        "non-default parameter '{}' follows a default parameter",
                        param.name
                    )));
                }
            }
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct RawDescriptor {
    name: String,
    members: Vec<MemberSpec>,
}

/// Immutable description of a type's member surface.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDescriptor", into = "RawDescriptor")]
pub struct TypeDescriptor {
    name: String,
    members: Vec<MemberSpec>,
    index: BTreeMap<String, usize>,
}

impl TypeDescriptor {
    /// Start describing a type called `name`.
    pub fn builder(name: impl Into<String>) -> DescriptorBuilder {
        DescriptorBuilder {
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// Decode a descriptor from a JSON schema document.
    ///
    /// ```
    /// use mimic_schema::{MemberKind, TypeDescriptor};
    ///
    /// let desc = TypeDescriptor::from_json(r#"{
    ///     "name": "Random",
    ///     "members": [
    ///         { "name": "randint", "kind": "method", "returns": "int",
    ///           "params": [{ "name": "a", "type": "int" }, { "name": "b", "type": "int" }] }
    ///     ]
    /// }"#).unwrap();
    /// assert_eq!(desc.member("randint").map(|m| m.kind), Some(MemberKind::Method));
    /// ```
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let raw: RawDescriptor = serde_json::from_str(json)?;
        Self::try_from(raw)
    }

    /// Encode the descriptor as a pretty-printed JSON schema document.
    pub fn to_json(&self) -> Result<String, SchemaError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Name of the described type.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Members in declaration order.
    pub fn members(&self) -> &[MemberSpec] {
        &self.members
    }

    /// Look up a member by name.
    pub fn member(&self, name: &str) -> Option<&MemberSpec> {
        self.index.get(name).map(|&i| &self.members[i])
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always `false` for a built descriptor; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl TryFrom<RawDescriptor> for TypeDescriptor {
    type Error = SchemaError;

    fn try_from(raw: RawDescriptor) -> Result<Self, Self::Error> {
        if raw.members.is_empty() {
            return Err(SchemaError::UnsupportedType {
                type_name: raw.name,
            });
        }
        let mut members = raw.members;
        let mut index = BTreeMap::new();
        for (i, member) in members.iter_mut().enumerate() {
            member.normalize(&raw.name)?;
            if index.insert(member.name.clone(), i).is_some() {
                return Err(SchemaError::DuplicateMember {
                    type_name: raw.name,
                    member: member.name.clone(),
                });
            }
        }
        Ok(Self {
            name: raw.name,
            members,
            index,
        })
    }
}

impl From<TypeDescriptor> for RawDescriptor {
    fn from(desc: TypeDescriptor) -> Self {
        Self {
            name: desc.name,
            members: desc.members,
        }
    }
}

/// Builder returned by [`TypeDescriptor::builder`].
///
/// # Example
///
/// ```
/// use mimic_schema::{TypeDescriptor, TypeRef};
///
/// let desc = TypeDescriptor::builder("Random")
///     .method("random", |m| m.returns(TypeRef::Float))
///     .method("randint", |m| {
///         m.param("a", TypeRef::Int)
///             .param("b", TypeRef::Int)
///             .returns(TypeRef::Int)
///     })
///     .property("name", TypeRef::Str)
///     .field("seed", TypeRef::optional(TypeRef::Int))
///     .build()
///     .unwrap();
/// assert_eq!(desc.len(), 4);
/// ```
#[derive(Debug)]
pub struct DescriptorBuilder {
    name: String,
    members: Vec<MemberSpec>,
}

impl DescriptorBuilder {
    /// Declare a method.
    pub fn method(self, name: impl Into<String>, sig: impl FnOnce(SignatureBuilder) -> SignatureBuilder) -> Self {
        self.signature_member(name.into(), MemberKind::Method, sig)
    }

    /// Declare a callable data attribute.
    pub fn callable(self, name: impl Into<String>, sig: impl FnOnce(SignatureBuilder) -> SignatureBuilder) -> Self {
        self.signature_member(name.into(), MemberKind::Callable, sig)
    }

    /// Declare a property with the given value type.
    pub fn property(self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.member(MemberSpec {
            name: name.into(),
            kind: MemberKind::Property,
            params: Vec::new(),
            result: Some(ty),
        })
    }

    /// Declare an annotated data field.
    pub fn field(self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.member(MemberSpec {
            name: name.into(),
            kind: MemberKind::Field,
            params: Vec::new(),
            result: Some(ty),
        })
    }

    /// Add a fully formed member spec.
    pub fn member(mut self, spec: MemberSpec) -> Self {
        self.members.push(spec);
        self
    }

    fn signature_member(
        self,
        name: String,
        kind: MemberKind,
        sig: impl FnOnce(SignatureBuilder) -> SignatureBuilder,
    ) -> Self {
        let sig = sig(SignatureBuilder::default());
        self.member(MemberSpec {
            name,
            kind,
            params: sig.params,
            result: sig.result,
        })
    }

    /// Validate every member and freeze the descriptor.
    pub fn build(self) -> Result<TypeDescriptor, SchemaError> {
        TypeDescriptor::try_from(RawDescriptor {
            name: self.name,
            members: self.members,
        })
    }
}

/// Parameter list and result type of a method or callable.
#[derive(Debug, Default)]
pub struct SignatureBuilder {
    params: Vec<ParamSpec>,
    result: Option<TypeRef>,
}

impl SignatureBuilder {
    fn push(mut self, name: impl Into<String>, ty: Option<TypeRef>, default: Option<Value>, kind: ParamKind) -> Self {
        self.params.push(ParamSpec {
            name: name.into(),
            ty,
            default,
            kind,
        });
        self
    }

    /// Required positional-or-keyword parameter.
    pub fn param(self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.push(name, Some(ty), None, ParamKind::PositionalOrKeyword)
    }

    /// Required parameter without a type annotation.
    pub fn param_untyped(self, name: impl Into<String>) -> Self {
        self.push(name, None, None, ParamKind::PositionalOrKeyword)
    }

    /// Positional-or-keyword parameter with a default.
    pub fn optional(self, name: impl Into<String>, ty: TypeRef, default: impl Into<Value>) -> Self {
        self.push(name, Some(ty), Some(default.into()), ParamKind::PositionalOrKeyword)
    }

    /// Required keyword-only parameter.
    pub fn keyword_only(self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.push(name, Some(ty), None, ParamKind::KeywordOnly)
    }

    /// Keyword-only parameter with a default.
    pub fn keyword_optional(self, name: impl Into<String>, ty: TypeRef, default: impl Into<Value>) -> Self {
        self.push(name, Some(ty), Some(default.into()), ParamKind::KeywordOnly)
    }

    /// `*name`, each surplus positional checked against `ty`.
    pub fn var_args(self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.push(name, Some(ty), None, ParamKind::VarPositional)
    }

    /// `**name`, each surplus keyword value checked against `ty`.
    pub fn var_kwargs(self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.push(name, Some(ty), None, ParamKind::VarKeyword)
    }

    /// Declared result type.
    pub fn returns(mut self, ty: TypeRef) -> Self {
        self.result = Some(ty);
        self
    }
}

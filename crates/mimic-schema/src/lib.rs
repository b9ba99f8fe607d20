// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! mimic-schema: what a mocked type looks like.
//!
//! This crate holds the pieces of the engine that do not depend on any mock
//! instance: the dynamic [`Value`] model, declared types ([`TypeRef`]), the
//! immutable [`TypeDescriptor`] member table, descriptor extraction
//! ([`Describe`], [`DescriptorCache`]), and default value synthesis
//! ([`synthesize`]).
#![forbid(unsafe_code)]

mod cache;
mod descriptor;
mod error;
mod synth;
mod ty;
mod value;

pub use cache::{Describe, DescriptorCache};
pub use descriptor::{
    DescriptorBuilder, MemberKind, MemberSpec, ParamKind, ParamSpec, SignatureBuilder,
    TypeDescriptor,
};
pub use error::SchemaError;
pub use synth::synthesize;
pub use ty::TypeRef;
pub use value::Value;

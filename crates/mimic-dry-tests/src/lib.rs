// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared test doubles and fixtures for mimic crates.
#![forbid(unsafe_code)]
//!
//! # Modules
//!
//! - [`fixtures`] - Sample type descriptors with `Describe` impls
//! - [`adapter`] - A Rust trait implemented by forwarding to a mock
//! - [`errors`] - User error types for raised outcomes
//! - [`trace`] - Tracing subscriber setup for tests

pub mod adapter;
pub mod errors;
pub mod fixtures;
pub mod trace;

// Re-export commonly used items at crate root for convenience
pub use adapter::{roll_dice, MockRandom, RandomSource};
pub use errors::{RequestFailed, TestError};
pub use fixtures::{
    philosopher_descriptor, random_descriptor, Philosopher, Random, RANDOM_SCHEMA_JSON,
};
pub use trace::init_test_tracing;

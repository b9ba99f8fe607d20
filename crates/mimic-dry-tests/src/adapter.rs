// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! A Rust trait backed by a mock.
//!
//! Code under test depends on [`RandomSource`]; tests hand it a
//! [`MockRandom`] wrapping a [`MockInstance`] of the `Random` fixture and
//! keep a clone of the instance for stubbing and verification.

use mimic_core::{CallArgs, MockError, MockInstance};
use mimic_schema::{TypeRef, Value};

/// The slice of a random-number source that [`roll_dice`] needs.
pub trait RandomSource {
    /// Uniform float in `[0, 1)`.
    fn random(&self) -> Result<f64, MockError>;
    /// Integer in `[a, b]`.
    fn randint(&self, a: i64, b: i64) -> Result<i64, MockError>;
    /// Reseed; `None` reseeds from entropy.
    fn seed(&self, seed: Option<i64>) -> Result<(), MockError>;
}

/// [`RandomSource`] implemented by forwarding to a mock of `Random`.
#[derive(Debug, Clone)]
pub struct MockRandom {
    mock: MockInstance,
}

impl MockRandom {
    /// Wrap a mock built from the `Random` fixture.
    pub fn new(mock: MockInstance) -> Self {
        Self { mock }
    }

    /// The wrapped mock.
    pub fn mock(&self) -> &MockInstance {
        &self.mock
    }

    fn mismatch(&self, member: &str, expected: TypeRef, value: Value) -> MockError {
        MockError::ReturnType {
            member: format!("{}.{member}", self.mock.label()),
            expected,
            value,
        }
    }
}

// Lossless coercion lets `then_return(6.0)` stand in for an int and
// `then_return(1)` for a float; custom functions are not checked at all.
// Anything that does not convert exactly is a `ReturnType` error.
impl RandomSource for MockRandom {
    #[allow(clippy::cast_precision_loss)]
    fn random(&self) -> Result<f64, MockError> {
        match self.mock.call("random", CallArgs::new())? {
            Value::Float(x) => Ok(x),
            Value::Int(n) => Ok(n as f64),
            other => Err(self.mismatch("random", TypeRef::Float, other)),
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss, clippy::float_cmp)]
    fn randint(&self, a: i64, b: i64) -> Result<i64, MockError> {
        match self.mock.call("randint", CallArgs::positional([a, b]))? {
            Value::Int(n) => Ok(n),
            Value::Float(x)
                if x.fract() == 0.0 && (i64::MIN as f64..i64::MAX as f64).contains(&x) =>
            {
                Ok(x as i64)
            }
            other => Err(self.mismatch("randint", TypeRef::Int, other)),
        }
    }

    fn seed(&self, seed: Option<i64>) -> Result<(), MockError> {
        self.mock
            .call("seed", CallArgs::positional([Value::from(seed)]))
            .map(drop)
    }
}

/// Roll `dice` six-sided dice and return their sum.
///
/// Stands in for production code that takes its randomness as a trait object.
pub fn roll_dice(rng: &dyn RandomSource, dice: usize) -> Result<i64, MockError> {
    (0..dice).map(|_| rng.randint(1, 6)).sum()
}

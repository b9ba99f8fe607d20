// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! User error types for `then_raise` and `use_side_effects` fixtures.

use thiserror::Error;

/// An error a test registers on a stub and expects back verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TestError {
    /// Simulated I/O failure.
    #[error("disk on fire: {0}")]
    DiskOnFire(String),
    /// Simulated timeout.
    #[error("timed out after {millis} ms")]
    Timeout {
        /// How long the simulated operation waited.
        millis: u64,
    },
}

/// An error wrapping another, for checking that source chains survive.
#[derive(Debug, Error)]
#[error("request failed")]
pub struct RequestFailed {
    /// The underlying cause.
    #[source]
    pub cause: TestError,
}

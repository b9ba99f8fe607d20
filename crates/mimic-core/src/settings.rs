// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Per-mock settings.

use serde::{Deserialize, Serialize};

/// How numbers are matched against declared numeric types.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericCoercion {
    /// `int` where `float` is declared, and integral `float` where `int` is
    /// declared, are accepted. Booleans never coerce.
    #[default]
    Lossless,
    /// Runtime kind must match the declared kind exactly.
    Strict,
}

/// Settings applied when a mock is constructed.
///
/// ```
/// use mimic_core::{MockSettings, NumericCoercion};
///
/// let settings = MockSettings::from_json(r#"{ "name": "rng", "coercion": "strict" }"#).unwrap();
/// assert_eq!(settings.name.as_deref(), Some("rng"));
/// assert_eq!(settings.coercion, NumericCoercion::Strict);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MockSettings {
    /// Diagnostic label used in the mock's identity (`Type#label`).
    pub name: Option<String>,
    /// Numeric matching policy for argument, result, and field checks.
    pub coercion: NumericCoercion,
}

impl MockSettings {
    /// Settings with only a diagnostic label.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Replace the coercion policy.
    pub fn with_coercion(mut self, coercion: NumericCoercion) -> Self {
        self.coercion = coercion;
        self
    }

    /// Decode settings from JSON; missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

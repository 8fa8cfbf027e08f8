use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

pub const MIN_TEMPERATURE: f64 = 0.0;
pub const MAX_TEMPERATURE: f64 = 2.0;
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Sampling temperature, always finite and within `[0, 2]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Temperature(f64);

impl Temperature {
    /// Build a temperature from a number. Non-finite values are rejected;
    /// finite values outside the range are clamped.
    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(Error::Validation(format!(
                "temperature must be a finite number, got {value}"
            )));
        }
        Ok(Self(value.clamp(MIN_TEMPERATURE, MAX_TEMPERATURE)))
    }

    /// Parse a temperature from untrusted JSON input.
    ///
    /// Accepts numbers and numeric strings (form fields arrive as strings);
    /// anything else is a validation error.
    pub fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::Number(n) => n
                .as_f64()
                .ok_or_else(|| Error::Validation(format!("temperature out of range: {n}")))
                .and_then(Self::new),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| Error::Validation(format!("temperature must be numeric, got {s:?}")))
                .and_then(Self::new),
            other => Err(Error::Validation(format!(
                "temperature must be numeric, got {other}"
            ))),
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for Temperature {
    fn default() -> Self {
        Self(DEFAULT_TEMPERATURE)
    }
}

impl TryFrom<f64> for Temperature {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Temperature> for f64 {
    fn from(t: Temperature) -> f64 {
        t.0
    }
}

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A scalar value stored in a game variable or used in a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// A boolean value.
    Boolean(bool),
    /// A 64-bit signed integer value.
    Integer(i64),
    /// A 64-bit floating-point value.
    Float(f64),
    /// A text value.
    String(String),
}

impl Scalar {
    /// Returns the value as a float if it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(n) => Some(*n as f64),
            Self::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns true for integers and floats.
    pub fn is_numeric(&self) -> bool {
        self.as_f64().is_some()
    }

    /// Order two scalars of compatible types.
    ///
    /// Integers and floats compare numerically with each other. Strings and
    /// booleans only compare with their own type. Mismatched types have no
    /// ordering.
    pub fn compare(&self, other: &Scalar) -> Option<Ordering> {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => Some(a.cmp(b)),
            (Self::String(a), Self::String(b)) => Some(a.cmp(b)),
            (Self::Boolean(a), Self::Boolean(b)) => Some(a.cmp(b)),
            (a, b) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        }
    }

    /// Add a numeric amount, keeping integer arithmetic when both sides are
    /// integers. Returns `None` if either side is not numeric.
    pub fn checked_add(&self, amount: &Scalar) -> Option<Scalar> {
        match (self, amount) {
            (Self::Integer(a), Self::Integer(b)) => Some(Self::Integer(a.saturating_add(*b))),
            (a, b) => Some(Self::Float(a.as_f64()? + b.as_f64()?)),
        }
    }
}

impl Default for Scalar {
    fn default() -> Self {
        Self::Integer(0)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

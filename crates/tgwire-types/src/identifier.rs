//! Numeric identifiers
//!
//! Chat, user and message ids (and file sizes) are documented upstream as
//! having at most 52 significant bits. They are stored as `i64` and only
//! accepted from a wire float when the float names exactly one integer.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Largest magnitude a wire float may carry and still be decoded (2^53 - 1).
pub const MAX_SAFE_FLOAT_INTEGER: i64 = 9_007_199_254_740_991;

/// Reasons a wire number cannot become an [`Identifier`] without losing precision
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IdentifierError {
    /// Float with a fractional part
    #[error("{0} is not an integer")]
    Fractional(f64),

    /// Float beyond the range where every integer is representable
    #[error("{0} exceeds the lossless float range of +/-9007199254740991")]
    FloatOutOfRange(f64),

    /// Unsigned integer that does not fit in an `i64`
    #[error("{0} does not fit in a signed 64-bit identifier")]
    IntegerOutOfRange(u64),

    /// NaN or infinity
    #[error("non-finite number")]
    NonFinite,
}

/// A chat, user or message identifier, or a file size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(i64);

impl Identifier {
    /// Wrap a native integer
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// The integer value
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Accept an unsigned wire integer if it fits
    pub fn from_u64(value: u64) -> Result<Self, IdentifierError> {
        i64::try_from(value)
            .map(Self)
            .map_err(|_| IdentifierError::IntegerOutOfRange(value))
    }

    /// Accept a wire float only if it is integral and inside the safe range
    pub fn from_f64(value: f64) -> Result<Self, IdentifierError> {
        if !value.is_finite() {
            return Err(IdentifierError::NonFinite);
        }
        if value.fract() != 0.0 {
            return Err(IdentifierError::Fractional(value));
        }
        if value.abs() > MAX_SAFE_FLOAT_INTEGER as f64 {
            return Err(IdentifierError::FloatOutOfRange(value));
        }
        #[allow(clippy::cast_possible_truncation)]
        Ok(Self(value as i64))
    }

    /// Classify a JSON value.
    ///
    /// Returns `None` when the value is not a number at all, so callers can
    /// report a type mismatch instead of a precision problem.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Result<Self, IdentifierError>> {
        let Value::Number(number) = value else {
            return None;
        };
        if let Some(v) = number.as_i64() {
            return Some(Ok(Self(v)));
        }
        if let Some(v) = number.as_u64() {
            return Some(Self::from_u64(v));
        }
        number.as_f64().map(Self::from_f64)
    }
}

impl From<i64> for Identifier {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Identifier> for i64 {
    fn from(value: Identifier) -> Self {
        value.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Identifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.0)
    }
}

struct IdentifierVisitor;

impl Visitor<'_> for IdentifierVisitor {
    type Value = Identifier;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer identifier of at most 52 significant bits")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Identifier, E> {
        Ok(Identifier(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Identifier, E> {
        Identifier::from_u64(v).map_err(E::custom)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Identifier, E> {
        Identifier::from_f64(v).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(IdentifierVisitor)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_integer_beyond_float_range_is_exact() {
        let id: Identifier = serde_json::from_str("9007199254740993").unwrap();
        assert_eq!(id.get(), 9_007_199_254_740_993);
    }

    #[test]
    fn test_integral_float_is_accepted() {
        let id: Identifier = serde_json::from_str("-1001234567890.0").unwrap();
        assert_eq!(id.get(), -1_001_234_567_890);
    }

    #[test]
    fn test_float_beyond_safe_range_is_rejected() {
        let err = serde_json::from_str::<Identifier>("9007199254740993.0").unwrap_err();
        assert!(err.to_string().contains("lossless float range"));
    }

    #[test]
    fn test_fractional_float_is_rejected() {
        assert_eq!(
            Identifier::from_f64(12.5),
            Err(IdentifierError::Fractional(12.5))
        );
    }

    #[test]
    fn test_u64_overflow() {
        assert_eq!(
            Identifier::from_u64(u64::MAX),
            Err(IdentifierError::IntegerOutOfRange(u64::MAX))
        );
    }

    #[test]
    fn test_from_json_non_number() {
        assert!(Identifier::from_json(&json!("42")).is_none());
        assert_eq!(
            Identifier::from_json(&json!(42)),
            Some(Ok(Identifier::new(42)))
        );
    }

    #[test]
    fn test_encodes_as_integer() {
        let text = serde_json::to_string(&Identifier::new(MAX_SAFE_FLOAT_INTEGER)).unwrap();
        assert_eq!(text, "9007199254740991");
    }
}

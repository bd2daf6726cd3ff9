//! Optional-field codec.
//!
//! Remote attributes are `Option<T>`: `None` means "not sent" or "not yet
//! read", `Some(zero)` means "explicitly the zero value". These helpers move
//! values between that representation and plain values.

use std::fmt;

/// Three-state reading of one remote attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldState {
    /// Not sent, or not present in the response.
    Absent,
    /// Present and equal to the field's default.
    Default,
    /// Present with any other value.
    Custom,
}

impl fmt::Display for FieldState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => write!(f, "absent"),
            Self::Default => write!(f, "default"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

/// Wrap `value` for sending; an unset value is left out of the document.
pub fn encode<T>(value: T, is_set: bool) -> Option<T> {
    is_set.then_some(value)
}

/// Unwrap a received attribute, calling `missing` when it is absent.
pub fn decode<T: Clone, E>(field: &Option<T>, missing: impl FnOnce() -> E) -> Result<T, E> {
    field.clone().ok_or_else(missing)
}

/// Classify an attribute against its default.
pub fn classify<T: PartialEq>(field: Option<&T>, default: &T) -> FieldState {
    match field {
        None => FieldState::Absent,
        Some(v) if v == default => FieldState::Default,
        Some(_) => FieldState::Custom,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_keeps_zero_values() {
        assert_eq!(encode(String::new(), true), Some(String::new()));
        assert_eq!(encode(0_i64, true), Some(0));
        assert_eq!(encode(false, true), Some(false));
    }

    #[test]
    fn test_encode_unset_is_absent() {
        assert_eq!(encode(42_i64, false), None);
    }

    #[test]
    fn test_decode() {
        assert_eq!(decode(&Some(7_i64), || "missing"), Ok(7));
        assert_eq!(decode(&None::<i64>, || "missing"), Err("missing"));
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(None, &4_i64), FieldState::Absent);
        assert_eq!(classify(Some(&4_i64), &4), FieldState::Default);
        assert_eq!(classify(Some(&5_i64), &4), FieldState::Custom);
        assert_eq!(classify(Some(&String::new()), &String::new()), FieldState::Default);
    }

    #[test]
    fn test_field_state_display() {
        assert_eq!(FieldState::Custom.to_string(), "custom");
    }
}

//! Request validation
//!
//! Request bodies implement [`RequestValidation`]; the
//! [`ValidatedJson`](crate::extractors::ValidatedJson) extractor runs it
//! before the handler sees the payload.

use crate::error::ApiError;

/// Trait for validating request payloads
pub trait RequestValidation {
    /// Returns `Err(ApiError::Validation)` describing the first invalid field
    fn validate(&self) -> Result<(), ApiError>;
}

/// Fail validation with `$message` unless `$predicate` holds
#[macro_export]
macro_rules! validate_field {
    ($field:expr, $predicate:expr, $message:expr) => {
        if !$predicate {
            return Err($crate::error::ApiError::validation($message));
        }
    };
}

/// Require a non-blank string
#[macro_export]
macro_rules! validate_required {
    ($field:expr, $message:expr) => {
        $crate::validate_field!($field, !$field.trim().is_empty(), $message);
    };
}

/// Require a value no smaller than `$min`
#[macro_export]
macro_rules! validate_min {
    ($field:expr, $min:expr, $message:expr) => {
        $crate::validate_field!($field, $field >= $min, $message);
    };
}

/// Require a value no larger than `$max`
#[macro_export]
macro_rules! validate_max {
    ($field:expr, $max:expr, $message:expr) => {
        $crate::validate_field!($field, $field <= $max, $message);
    };
}

/// Require at most `$max` characters; `None` passes
#[macro_export]
macro_rules! validate_max_chars {
    ($field:expr, $max:expr, $message:expr) => {
        $crate::validate_field!(
            $field,
            $field.as_deref().map_or(true, |value: &str| value.chars().count() <= $max),
            $message
        );
    };
}

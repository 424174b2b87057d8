//! Validation error types

use std::fmt;

/// Validation error for incoming macro payloads
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required field is absent, null, or blank after trimming
    Required { field: &'static str },

    /// Field is present but cannot be read as a decimal number
    NotNumeric { field: &'static str },

    /// Numeric field whose integer part is wider than the column allows
    OutOfRange {
        field: &'static str,
        max_integer_digits: u32,
    },

    /// Identifier doesn't match the accepted format
    InvalidFormat { field: &'static str, reason: &'static str },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required { field } => write!(f, "{} is required", field),
            Self::NotNumeric { field } => write!(f, "{} must be numeric", field),
            Self::OutOfRange {
                field,
                max_integer_digits,
            } => write!(
                f,
                "{} is out of range (at most {} integer digits)",
                field, max_integer_digits
            ),
            Self::InvalidFormat { field, reason } => write!(f, "{}: {}", field, reason),
        }
    }
}

impl std::error::Error for ValidationError {}

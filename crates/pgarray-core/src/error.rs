//! Core error types for pgarray-rs.
//!
//! [`PgArrayError`] covers every failure the array codec, the field
//! descriptor, and the migration metadata can report. Errors are always
//! returned to the immediate caller; nothing in the workspace retries.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

/// Represents a validation error with optional field-level errors.
///
/// Validation errors can be either simple (a single message) or compound
/// (containing per-field error lists).
///
/// # Examples
///
/// ```
/// use pgarray_core::error::ValidationError;
///
/// // Simple validation error
/// let err = ValidationError::new("Value 'C' is not a valid choice.", "invalid_choice");
///
/// // Field-level validation errors
/// let mut field_errors = std::collections::HashMap::new();
/// field_errors.insert(
///     "choices".to_string(),
///     vec![ValidationError::new("Value 'C' is not a valid choice.", "invalid_choice")],
/// );
/// let err = ValidationError::with_field_errors(field_errors);
/// ```
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// The primary error message.
    pub message: String,
    /// A short code identifying the type of validation failure (e.g. "null", "invalid_choice").
    pub code: String,
    /// Additional parameters providing context for the error message.
    pub params: HashMap<String, String>,
    /// Per-field validation errors, keyed by field name.
    pub field_errors: HashMap<String, Vec<Self>>,
}

impl ValidationError {
    /// Creates a new `ValidationError` with a message and code.
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            params: HashMap::new(),
            field_errors: HashMap::new(),
        }
    }

    /// Creates a `ValidationError` containing per-field errors.
    pub fn with_field_errors(field_errors: HashMap<String, Vec<Self>>) -> Self {
        Self {
            message: String::new(),
            code: String::new(),
            params: HashMap::new(),
            field_errors,
        }
    }

    /// Adds a parameter to this validation error.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.message.is_empty() {
            write!(f, "{}", self.message)?;
        } else if !self.field_errors.is_empty() {
            let mut first = true;
            for (field, errors) in &self.field_errors {
                for error in errors {
                    if !first {
                        write!(f, "; ")?;
                    }
                    write!(f, "{field}: {error}")?;
                    first = false;
                }
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// The primary error type for pgarray-rs.
#[derive(Error, Debug)]
pub enum PgArrayError {
    // ── Codec ────────────────────────────────────────────────────────

    /// A value cannot be rendered as an array literal under its spec.
    #[error("Encoding error: {0}")]
    EncodingError(String),

    /// An array literal cannot be parsed under its spec.
    ///
    /// Carries the raw literal and the spec description so a failed load
    /// can be diagnosed without the original row.
    #[error("Decoding error: {reason} (literal {literal:?}, spec {spec})")]
    DecodingError {
        /// The raw literal as read from the column.
        literal: String,
        /// Human-readable description of the declared spec.
        spec: String,
        /// What went wrong.
        reason: String,
    },

    /// A numeric value falls outside the representable range of its kind.
    #[error("Range error: {value} is out of range for {kind}")]
    RangeError {
        /// The offending value as text.
        value: String,
        /// The target element kind (e.g. "smallint").
        kind: String,
    },

    /// Nesting depth, sibling length, or size does not match the declaration.
    #[error("Shape error: {0}")]
    ShapeError(String),

    // ── Validation ───────────────────────────────────────────────────

    /// One or more values failed validation.
    #[error("Validation error: {0}")]
    ValidationError(ValidationError),

    // ── Configuration ────────────────────────────────────────────────

    /// A field or model declaration is invalid.
    #[error("Improperly configured: {0}")]
    ImproperlyConfigured(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    // ── Persistence ──────────────────────────────────────────────────

    /// A row could not be read or written.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// An error occurred during serialization or deserialization.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl PgArrayError {
    /// Returns a short, stable code for this error's category.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::EncodingError(_) => "encoding_error",
            Self::DecodingError { .. } => "decoding_error",
            Self::RangeError { .. } => "range_error",
            Self::ShapeError(_) => "shape_error",
            Self::ValidationError(_) => "validation_error",
            Self::ImproperlyConfigured(_) => "improperly_configured",
            Self::ConfigurationError(_) => "configuration_error",
            Self::DatabaseError(_) => "database_error",
            Self::SerializationError(_) => "serialization_error",
            Self::IoError(_) => "io_error",
        }
    }

    /// Builds a [`PgArrayError::DecodingError`].
    pub fn decoding(
        literal: impl Into<String>,
        spec: impl fmt::Display,
        reason: impl Into<String>,
    ) -> Self {
        Self::DecodingError {
            literal: literal.into(),
            spec: spec.to_string(),
            reason: reason.into(),
        }
    }

    /// Builds a [`PgArrayError::RangeError`].
    pub fn range(value: impl fmt::Display, kind: impl Into<String>) -> Self {
        Self::RangeError {
            value: value.to_string(),
            kind: kind.into(),
        }
    }

    /// Returns `true` if this is a validation failure.
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationError(_))
    }
}

impl From<ValidationError> for PgArrayError {
    fn from(err: ValidationError) -> Self {
        Self::ValidationError(err)
    }
}

/// A convenience type alias for `Result<T, PgArrayError>`.
pub type PgArrayResult<T> = Result<T, PgArrayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display_simple() {
        let err = ValidationError::new("This field cannot be null.", "null");
        assert_eq!(err.to_string(), "This field cannot be null.");
    }

    #[test]
    fn test_validation_error_display_field_errors() {
        let mut field_errors = HashMap::new();
        field_errors.insert(
            "tags".to_string(),
            vec![ValidationError::new("Invalid choice.", "invalid_choice")],
        );
        let err = ValidationError::with_field_errors(field_errors);
        assert!(err.to_string().contains("tags: Invalid choice."));
    }

    #[test]
    fn test_validation_error_with_param() {
        let err = ValidationError::new("Invalid choice.", "invalid_choice").with_param("value", "C");
        assert_eq!(err.params.get("value").unwrap(), "C");
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(PgArrayError::EncodingError("x".into()).code(), "encoding_error");
        assert_eq!(PgArrayError::decoding("{", "int[]", "x").code(), "decoding_error");
        assert_eq!(PgArrayError::range(40000, "smallint").code(), "range_error");
        assert_eq!(PgArrayError::ShapeError("x".into()).code(), "shape_error");
        assert_eq!(
            PgArrayError::ValidationError(ValidationError::new("x", "y")).code(),
            "validation_error"
        );
        assert_eq!(
            PgArrayError::ImproperlyConfigured("x".into()).code(),
            "improperly_configured"
        );
        assert_eq!(PgArrayError::DatabaseError("x".into()).code(), "database_error");
    }

    #[test]
    fn test_decoding_error_carries_literal_and_spec() {
        let err = PgArrayError::decoding("{1,2", "integer[]", "unterminated array");
        let msg = err.to_string();
        assert!(msg.contains("{1,2"));
        assert!(msg.contains("integer[]"));
        assert!(msg.contains("unterminated array"));
    }

    #[test]
    fn test_range_error_display() {
        let err = PgArrayError::range(40000, "smallint");
        assert_eq!(err.to_string(), "Range error: 40000 is out of range for smallint");
    }

    #[test]
    fn test_from_validation_error() {
        let err: PgArrayError = ValidationError::new("bad", "invalid").into();
        assert!(err.is_validation());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: PgArrayError = io_err.into();
        assert_eq!(err.code(), "io_error");
        assert!(err.to_string().contains("file missing"));
    }
}

//! Field validators for array columns.
//!
//! Validators enforce constraints on field values before they are encoded
//! and persisted. Scalar validators inspect a single value; the array
//! validators inspect the outer length of a list, and [`EachElement`] lifts a
//! scalar validator over every leaf of a (possibly nested) array.

use std::fmt;

use pgarray_core::{PgArrayError, ValidationError};

use crate::value::Value;

/// A trait for validating field values.
///
/// Validators are attached to [`ArrayField`](crate::fields::ArrayField)
/// instances and run against the whole column value during
/// [`ArrayField::validate`](crate::fields::ArrayField::validate).
///
/// # Examples
///
/// ```
/// use pgarray_db::validators::{ArrayMaxLengthValidator, Validator};
/// use pgarray_db::value::Value;
///
/// let v = ArrayMaxLengthValidator::new(2);
/// assert!(v.validate(&Value::list([1_i64, 2])).is_ok());
/// assert!(v.validate(&Value::list([1_i64, 2, 3])).is_err());
/// ```
pub trait Validator: Send + Sync + fmt::Debug {
    /// Validates the given value, returning an error if invalid.
    fn validate(&self, value: &Value) -> Result<(), PgArrayError>;

    /// Returns a human-readable name for this validator.
    fn name(&self) -> &str;
}

fn invalid(message: String, code: &str, limit: impl fmt::Display) -> PgArrayError {
    PgArrayError::ValidationError(
        ValidationError::new(message, code).with_param("limit_value", limit.to_string()),
    )
}

/// Validates that a string value has at most `max_length` characters.
#[derive(Debug, Clone)]
pub struct MaxLengthValidator {
    /// The maximum allowed length, in characters.
    pub max_length: usize,
}

impl MaxLengthValidator {
    /// Creates a new `MaxLengthValidator` with the given maximum length.
    pub const fn new(max_length: usize) -> Self {
        Self { max_length }
    }
}

impl Validator for MaxLengthValidator {
    fn validate(&self, value: &Value) -> Result<(), PgArrayError> {
        if let Value::String(s) = value {
            let len = s.chars().count();
            if len > self.max_length {
                return Err(invalid(
                    format!(
                        "Ensure this value has at most {} characters (it has {len}).",
                        self.max_length
                    ),
                    "max_length",
                    self.max_length,
                ));
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "MaxLengthValidator"
    }
}

/// Validates that a numeric value does not exceed a maximum.
#[derive(Debug, Clone)]
pub struct MaxValueValidator {
    /// The maximum allowed value.
    pub max_value: f64,
}

impl MaxValueValidator {
    /// Creates a new `MaxValueValidator` with the given maximum.
    pub fn new(max_value: f64) -> Self {
        Self { max_value }
    }
}

impl Validator for MaxValueValidator {
    fn validate(&self, value: &Value) -> Result<(), PgArrayError> {
        let numeric = match value {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        };
        match numeric {
            Some(n) if n > self.max_value => Err(invalid(
                format!("Ensure this value is less than or equal to {}.", self.max_value),
                "max_value",
                self.max_value,
            )),
            _ => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "MaxValueValidator"
    }
}

/// Validates that a numeric value is not below a minimum.
#[derive(Debug, Clone)]
pub struct MinValueValidator {
    /// The minimum allowed value.
    pub min_value: f64,
}

impl MinValueValidator {
    /// Creates a new `MinValueValidator` with the given minimum.
    pub fn new(min_value: f64) -> Self {
        Self { min_value }
    }
}

impl Validator for MinValueValidator {
    fn validate(&self, value: &Value) -> Result<(), PgArrayError> {
        let numeric = match value {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        };
        match numeric {
            Some(n) if n < self.min_value => Err(invalid(
                format!("Ensure this value is greater than or equal to {}.", self.min_value),
                "min_value",
                self.min_value,
            )),
            _ => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "MinValueValidator"
    }
}

/// Validates that an array has at most `max_length` outer elements.
#[derive(Debug, Clone)]
pub struct ArrayMaxLengthValidator {
    /// The maximum number of outer elements.
    pub max_length: usize,
}

impl ArrayMaxLengthValidator {
    /// Creates a new `ArrayMaxLengthValidator`.
    pub const fn new(max_length: usize) -> Self {
        Self { max_length }
    }
}

impl Validator for ArrayMaxLengthValidator {
    fn validate(&self, value: &Value) -> Result<(), PgArrayError> {
        if let Value::List(items) = value {
            if items.len() > self.max_length {
                return Err(invalid(
                    format!(
                        "List contains {} items, it should contain no more than {}.",
                        items.len(),
                        self.max_length
                    ),
                    "max_length",
                    self.max_length,
                ));
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "ArrayMaxLengthValidator"
    }
}

/// Validates that an array has at least `min_length` outer elements.
#[derive(Debug, Clone)]
pub struct ArrayMinLengthValidator {
    /// The minimum number of outer elements.
    pub min_length: usize,
}

impl ArrayMinLengthValidator {
    /// Creates a new `ArrayMinLengthValidator`.
    pub const fn new(min_length: usize) -> Self {
        Self { min_length }
    }
}

impl Validator for ArrayMinLengthValidator {
    fn validate(&self, value: &Value) -> Result<(), PgArrayError> {
        if let Value::List(items) = value {
            if items.len() < self.min_length {
                return Err(invalid(
                    format!(
                        "List contains {} items, it should contain no fewer than {}.",
                        items.len(),
                        self.min_length
                    ),
                    "min_length",
                    self.min_length,
                ));
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "ArrayMinLengthValidator"
    }
}

/// Applies a scalar validator to every non-null leaf of an array.
///
/// The first failing element stops validation; its error gains an `index`
/// parameter holding the leaf's position in depth-first order.
#[derive(Debug, Clone)]
pub struct EachElement<V> {
    inner: V,
}

impl<V: Validator> EachElement<V> {
    /// Wraps a scalar validator.
    pub const fn new(inner: V) -> Self {
        Self { inner }
    }
}

impl<V: Validator> Validator for EachElement<V> {
    fn validate(&self, value: &Value) -> Result<(), PgArrayError> {
        for (index, leaf) in value.leaves().into_iter().enumerate() {
            if leaf.is_null() {
                continue;
            }
            self.inner.validate(leaf).map_err(|err| match err {
                PgArrayError::ValidationError(v) => {
                    PgArrayError::ValidationError(v.with_param("index", index.to_string()))
                }
                other => other,
            })?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "EachElement"
    }
}

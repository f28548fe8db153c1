//! Database rows and typed column access.
//!
//! A [`Row`] is what a persistence layer hands back after a read and what
//! [`prepare_row`](crate::executor::prepare_row) produces for a write: an
//! ordered list of column names and their [`Value`]s. Array columns hold
//! either an encoded literal (`Value::String`), a natively decoded
//! `Value::List`, or `Value::Null`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use pgarray_core::{PgArrayError, PgArrayResult};

use crate::fields::ArrayField;
use crate::value::Value;

/// A single database row.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    /// Creates a new row from column names and values.
    ///
    /// # Panics
    ///
    /// Panics if the number of columns does not match the number of values.
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        assert_eq!(
            columns.len(),
            values.len(),
            "Row column count must match value count"
        );
        Self { columns, values }
    }

    /// Creates a row from `(column, value)` pairs.
    pub fn from_pairs<C: Into<String>>(pairs: impl IntoIterator<Item = (C, Value)>) -> Self {
        let (columns, values) = pairs
            .into_iter()
            .map(|(column, value)| (column.into(), value))
            .unzip();
        Self { columns, values }
    }

    /// Returns the column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the values, in column order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Gets a typed value by column name.
    ///
    /// # Errors
    ///
    /// Returns an error if the column does not exist or the value cannot be
    /// converted to the requested type.
    pub fn get<T: FromValue>(&self, column: &str) -> PgArrayResult<T> {
        T::from_value(self.require(column)?)
    }

    /// Gets a typed value by column index.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of bounds or the value cannot be
    /// converted to the requested type.
    pub fn get_by_index<T: FromValue>(&self, idx: usize) -> PgArrayResult<T> {
        let value = self.values.get(idx).ok_or_else(|| {
            PgArrayError::DatabaseError(format!(
                "Column index {idx} out of bounds (row has {} columns)",
                self.values.len()
            ))
        })?;
        T::from_value(value)
    }

    /// Returns a reference to the raw Value at the given column name.
    pub fn get_value(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|idx| &self.values[idx])
    }

    /// Reads an array column through its field (the load hook).
    ///
    /// Returns `None` for SQL NULL and the decoded array otherwise; `{}`
    /// yields `Some(vec![])`.
    ///
    /// # Errors
    ///
    /// Returns an error if the column is missing or does not decode under
    /// the field's spec.
    pub fn get_array(&self, field: &ArrayField) -> PgArrayResult<Option<Vec<Value>>> {
        let raw = self.require(&field.column)?;
        Ok(field.from_db_value(raw)?.into_list())
    }

    fn require(&self, column: &str) -> PgArrayResult<&Value> {
        self.get_value(column).ok_or_else(|| {
            PgArrayError::DatabaseError(format!("Column '{column}' not found in row"))
        })
    }
}

/// Trait for converting a [`Value`] to a concrete Rust type.
pub trait FromValue: Sized {
    /// Attempts to convert a value reference to this type.
    fn from_value(value: &Value) -> PgArrayResult<Self>;
}

fn expected(what: &str, value: &Value) -> PgArrayError {
    PgArrayError::DatabaseError(format!("Expected {what}, got {value:?}"))
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> PgArrayResult<Self> {
        match value {
            Value::Int(i) => Ok(*i),
            _ => Err(expected("Int", value)),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> PgArrayResult<Self> {
        match value {
            Value::Int(i) => i32::try_from(*i).map_err(|e| {
                PgArrayError::DatabaseError(format!("Int value out of i32 range: {e}"))
            }),
            _ => Err(expected("Int", value)),
        }
    }
}

impl FromValue for i16 {
    fn from_value(value: &Value) -> PgArrayResult<Self> {
        match value {
            Value::Int(i) => i16::try_from(*i).map_err(|e| {
                PgArrayError::DatabaseError(format!("Int value out of i16 range: {e}"))
            }),
            _ => Err(expected("Int", value)),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> PgArrayResult<Self> {
        match value {
            Value::Float(f) => Ok(*f),
            Value::Int(i) => Ok(*i as f64),
            _ => Err(expected("Float", value)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> PgArrayResult<Self> {
        match value {
            Value::String(s) => Ok(s.clone()),
            _ => Err(expected("String", value)),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &Value) -> PgArrayResult<Self> {
        match value {
            Value::Bytes(b) => Ok(b.clone()),
            _ => Err(expected("Bytes", value)),
        }
    }
}

impl FromValue for NaiveDate {
    fn from_value(value: &Value) -> PgArrayResult<Self> {
        match value {
            Value::Date(d) => Ok(*d),
            _ => Err(expected("Date", value)),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: &Value) -> PgArrayResult<Self> {
        match value {
            Value::DateTime(dt) => Ok(*dt),
            _ => Err(expected("DateTime", value)),
        }
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: &Value) -> PgArrayResult<Self> {
        match value {
            Value::DateTimeTz(dt) => Ok(*dt),
            _ => Err(expected("DateTimeTz", value)),
        }
    }
}

impl FromValue for [u8; 6] {
    fn from_value(value: &Value) -> PgArrayResult<Self> {
        match value {
            Value::MacAddr(mac) => Ok(*mac),
            _ => Err(expected("MacAddr", value)),
        }
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> PgArrayResult<Self> {
        Ok(value.clone())
    }
}

impl FromValue for Vec<Value> {
    fn from_value(value: &Value) -> PgArrayResult<Self> {
        match value {
            Value::List(items) => Ok(items.clone()),
            _ => Err(expected("List", value)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> PgArrayResult<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

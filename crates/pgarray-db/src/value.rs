//! ORM value types for representing database values in a backend-agnostic way.
//!
//! The [`Value`] enum is the core type used throughout the ORM to represent
//! field values, array elements, and column contents. An array value is a
//! `Value::List` whose items are scalars (dimension 1) or further lists
//! (dimension > 1). `Value::Null` plays two roles: as a column value it is
//! the absence marker, and inside a list it is a missing element.

use std::fmt;

use pgarray_core::{PgArrayError, PgArrayResult};

/// A backend-agnostic representation of a database value.
///
/// # Examples
///
/// ```
/// use pgarray_db::value::Value;
///
/// let v = Value::from(42_i64);
/// assert_eq!(v, Value::Int(42));
///
/// let v = Value::list(["a", "b"]);
/// assert_eq!(v, Value::List(vec![Value::from("a"), Value::from("b")]));
/// ```
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    /// SQL NULL.
    Null,
    /// A 64-bit signed integer (covers smallint, integer, and bigint elements).
    Int(i64),
    /// A 64-bit floating-point number (covers real and double precision elements).
    Float(f64),
    /// A UTF-8 string.
    String(String),
    /// Raw binary data.
    Bytes(Vec<u8>),
    /// A date without time.
    Date(chrono::NaiveDate),
    /// A date and time without timezone.
    DateTime(chrono::NaiveDateTime),
    /// A date and time with UTC timezone.
    DateTimeTz(chrono::DateTime<chrono::Utc>),
    /// A 6-byte MAC address.
    MacAddr([u8; 6]),
    /// An ordered sequence of values: an array or a sub-array.
    List(Vec<Value>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Self::Date(d) => write!(f, "{d}"),
            Self::DateTime(dt) => write!(f, "{dt}"),
            Self::DateTimeTz(dt) => write!(f, "{dt}"),
            Self::MacAddr(m) => write!(f, "{}", format_mac(m)),
            Self::List(vals) => {
                write!(f, "[")?;
                for (i, v) in vals.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Element cast that turns a scalar into its text form.
///
/// MAC addresses become `08:00:2b:01:02:03`, numbers and dates their
/// display form. Strings and `Null` pass through unchanged.
///
/// # Errors
///
/// Returns [`PgArrayError::DecodingError`] for binary data that is not
/// UTF-8 and for nested lists, which are not elements.
///
/// # Examples
///
/// ```
/// use pgarray_db::value::{to_text, Value};
///
/// let mac = Value::MacAddr([0x08, 0x00, 0x2b, 0x01, 0x02, 0x03]);
/// assert_eq!(to_text(mac).unwrap(), Value::from("08:00:2b:01:02:03"));
/// ```
pub fn to_text(value: Value) -> PgArrayResult<Value> {
    match value {
        Value::Null | Value::String(_) => Ok(value),
        Value::Bytes(bytes) => String::from_utf8(bytes).map(Value::String).map_err(|e| {
            PgArrayError::decoding("<bytes>", "text", format!("element is not UTF-8: {e}"))
        }),
        Value::List(_) => Err(PgArrayError::decoding(
            value.to_string(),
            "text",
            "cannot cast a sub-array to text",
        )),
        other => Ok(Value::String(other.to_string())),
    }
}

/// Formats a MAC address as lower-case, colon-separated hex.
pub fn format_mac(mac: &[u8; 6]) -> String {
    format!(
        "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
        mac[0], mac[1], mac[2], mac[3], mac[4], mac[5]
    )
}

/// Parses a MAC address in any of PostgreSQL's accepted `macaddr` input forms.
///
/// Accepts `08:00:2b:01:02:03`, `08-00-2b-01-02-03`, `08002b:010203`,
/// `08002b-010203`, `0800.2b01.0203`, `0800-2b01-0203` and `08002b010203`.
pub fn parse_mac(input: &str) -> Option<[u8; 6]> {
    let digits: Vec<u8> = input
        .trim()
        .bytes()
        .filter(|b| !matches!(b, b':' | b'-' | b'.'))
        .collect();
    if digits.len() != 12 {
        return None;
    }
    let mut mac = [0_u8; 6];
    for (i, pair) in digits.chunks(2).enumerate() {
        let hi = char::from(pair[0]).to_digit(16)?;
        let lo = char::from(pair[1]).to_digit(16)?;
        mac[i] = u8::try_from(hi * 16 + lo).ok()?;
    }
    Some(mac)
}

// ── From implementations ───────────────────────────────────────────────

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Self::Bytes(v.to_vec())
    }
}

impl From<[u8; 6]> for Value {
    fn from(v: [u8; 6]) -> Self {
        Self::MacAddr(v)
    }
}

impl From<chrono::NaiveDate> for Value {
    fn from(v: chrono::NaiveDate) -> Self {
        Self::Date(v)
    }
}

impl From<chrono::NaiveDateTime> for Value {
    fn from(v: chrono::NaiveDateTime) -> Self {
        Self::DateTime(v)
    }
}

impl From<chrono::DateTime<chrono::Utc>> for Value {
    fn from(v: chrono::DateTime<chrono::Utc>) -> Self {
        Self::DateTimeTz(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::List(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Self::Null,
        }
    }
}

impl Value {
    /// Builds a `Value::List` from anything convertible into values.
    pub fn list<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Returns `true` if this value is `Null`.
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` if this value is a `List`.
    pub const fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// Attempts to extract an integer value.
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Attempts to extract a float value.
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Attempts to extract a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to extract a byte slice.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Attempts to extract the items of a list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Converts a column value into an optional array: `Null` is absence.
    ///
    /// Returns `None` for both `Null` and non-list values; use
    /// [`is_null`](Self::is_null) to tell them apart.
    pub fn into_list(self) -> Option<Vec<Value>> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns every non-list value reachable from this one, depth first.
    ///
    /// A scalar yields itself; a list yields the leaves of its items.
    pub fn leaves(&self) -> Vec<&Value> {
        let mut out = Vec::new();
        collect_leaves(self, &mut out);
        out
    }
}

fn collect_leaves<'a>(value: &'a Value, out: &mut Vec<&'a Value>) {
    match value {
        Value::List(items) => {
            for item in items {
                collect_leaves(item, out);
            }
        }
        other => out.push(other),
    }
}

//! Element kinds, array specs, and model field definitions.
//!
//! An [`ElementKind`] names the scalar type stored in an array column and
//! knows its PostgreSQL spelling. An [`ArraySpec`] adds dimensionality, an
//! optional size contract, and the rectangularity requirement. [`FieldDef`]
//! is what a model's metadata lists: its primary key and its array fields.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use pgarray_core::{PgArrayError, PgArrayResult, SETTINGS};
use regex::Regex;

use super::array::ArrayField;

/// The deepest nesting PostgreSQL accepts for an array (`MAXDIM`).
pub const MAX_DIMENSIONS: usize = 6;

static CHARACTER_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:varchar|character varying)(?:\s*\(\s*(\d+)\s*\))?$")
        .expect("character type pattern is valid")
});

/// The scalar type of an array column's elements.
///
/// Each variant corresponds to a PostgreSQL base type. Integer kinds carry
/// their storage width, which the codec enforces as a range check.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ElementKind {
    /// 32-bit signed integer (`integer`, `int`, `int4`).
    Integer,
    /// 64-bit signed integer (`bigint`, `int8`).
    BigInteger,
    /// 16-bit signed integer (`smallint`, `int2`).
    SmallInteger,
    /// 64-bit float (`double precision`, `float8`, `float`).
    Float,
    /// 32-bit float (`real`, `float4`).
    Real,
    /// Unlimited-length text.
    Text,
    /// Character data with an optional maximum length (`varchar(n)`).
    Varchar {
        /// Maximum length in characters, if declared.
        max_length: Option<usize>,
    },
    /// Calendar date.
    Date,
    /// Timestamp without time zone.
    Timestamp,
    /// Timestamp with time zone (values are normalized to UTC).
    TimestampTz,
    /// Binary string.
    Bytea,
    /// 6-byte MAC address.
    MacAddr,
}

impl ElementKind {
    /// Shorthand for `Varchar { max_length: Some(max_length) }`.
    pub const fn varchar(max_length: usize) -> Self {
        Self::Varchar {
            max_length: Some(max_length),
        }
    }

    /// Parses a PostgreSQL type name (the `dbtype` of a field declaration).
    ///
    /// Matching is case-insensitive and tolerant of repeated whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`PgArrayError::ImproperlyConfigured`] for types the codec
    /// does not support.
    pub fn from_dbtype(dbtype: &str) -> PgArrayResult<Self> {
        let normalized = dbtype
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();

        let kind = match normalized.as_str() {
            "int" | "integer" | "int4" => Self::Integer,
            "bigint" | "int8" => Self::BigInteger,
            "smallint" | "int2" => Self::SmallInteger,
            "float" | "double precision" | "float8" => Self::Float,
            "real" | "float4" => Self::Real,
            "text" => Self::Text,
            "date" => Self::Date,
            "timestamp" | "timestamp without time zone" => Self::Timestamp,
            "timestamptz" | "timestamp with time zone" => Self::TimestampTz,
            "bytea" => Self::Bytea,
            "macaddr" => Self::MacAddr,
            other => {
                let caps = CHARACTER_TYPE.captures(other).ok_or_else(|| {
                    PgArrayError::ImproperlyConfigured(format!(
                        "Unsupported array element type '{dbtype}'"
                    ))
                })?;
                let max_length = caps
                    .get(1)
                    .map(|m| m.as_str().parse::<usize>())
                    .transpose()
                    .map_err(|e| {
                        PgArrayError::ImproperlyConfigured(format!(
                            "Invalid length in '{dbtype}': {e}"
                        ))
                    })?;
                Self::Varchar { max_length }
            }
        };
        Ok(kind)
    }

    /// Returns the canonical PostgreSQL spelling of this type.
    pub fn db_type(&self) -> String {
        match self {
            Self::Varchar {
                max_length: Some(n),
            } => format!("varchar({n})"),
            other => other.name().to_string(),
        }
    }

    /// Returns the type's short name, used in error messages.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::BigInteger => "bigint",
            Self::SmallInteger => "smallint",
            Self::Float => "double precision",
            Self::Real => "real",
            Self::Text => "text",
            Self::Varchar { .. } => "varchar",
            Self::Date => "date",
            Self::Timestamp => "timestamp",
            Self::TimestampTz => "timestamp with time zone",
            Self::Bytea => "bytea",
            Self::MacAddr => "macaddr",
        }
    }

    /// Returns the inclusive bounds of an integer kind.
    pub fn integer_bounds(&self) -> Option<(i64, i64)> {
        match self {
            Self::SmallInteger => Some((i64::from(i16::MIN), i64::from(i16::MAX))),
            Self::Integer => Some((i64::from(i32::MIN), i64::from(i32::MAX))),
            Self::BigInteger => Some((i64::MIN, i64::MAX)),
            _ => None,
        }
    }
}

impl FromStr for ElementKind {
    type Err = PgArrayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_dbtype(s)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.db_type())
    }
}

/// The declared shape and element type of an array column.
///
/// `dimension` is the nesting depth (1 = flat). `size`, when set, is the
/// maximum length of the outermost dimension. `rectangular` requires every
/// sub-array at the same depth to have the same length, which is what
/// PostgreSQL enforces; it defaults to the global codec setting.
///
/// A spec is a plain immutable value; it is safe to share across threads.
///
/// # Examples
///
/// ```
/// use pgarray_db::fields::{ArraySpec, ElementKind};
///
/// let spec = ArraySpec::new(ElementKind::Integer).dimension(2);
/// assert_eq!(spec.to_string(), "integer[][]");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ArraySpec {
    kind: ElementKind,
    dimension: usize,
    size: Option<usize>,
    rectangular: bool,
}

impl ArraySpec {
    /// Creates a one-dimensional spec for the given element kind.
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            dimension: 1,
            size: None,
            rectangular: SETTINGS.codec().require_rectangular,
        }
    }

    /// Creates a one-dimensional spec from a PostgreSQL type name.
    pub fn from_dbtype(dbtype: &str) -> PgArrayResult<Self> {
        Ok(Self::new(ElementKind::from_dbtype(dbtype)?))
    }

    /// Sets the nesting depth. Must be at least 1; see [`check`](Self::check).
    pub const fn dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    /// Sets the maximum length of the outermost dimension.
    pub const fn size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    /// Sets whether sibling sub-arrays must share a length.
    pub const fn rectangular(mut self, rectangular: bool) -> Self {
        self.rectangular = rectangular;
        self
    }

    /// Returns the element kind.
    pub const fn kind(&self) -> &ElementKind {
        &self.kind
    }

    /// Returns the declared nesting depth.
    pub const fn get_dimension(&self) -> usize {
        self.dimension
    }

    /// Returns the size contract, if any.
    pub const fn get_size(&self) -> Option<usize> {
        self.size
    }

    /// Returns whether rectangularity is enforced.
    pub const fn is_rectangular(&self) -> bool {
        self.rectangular
    }

    /// Verifies the declaration itself.
    ///
    /// # Errors
    ///
    /// Returns [`PgArrayError::ImproperlyConfigured`] if `dimension` is zero
    /// or greater than [`MAX_DIMENSIONS`].
    pub fn check(&self) -> PgArrayResult<()> {
        if self.dimension == 0 {
            return Err(PgArrayError::ImproperlyConfigured(format!(
                "Array of {} must have a dimension of at least 1",
                self.kind.name()
            )));
        }
        if self.dimension > MAX_DIMENSIONS {
            return Err(PgArrayError::ImproperlyConfigured(format!(
                "Array of {} has dimension {}, more than the maximum of {MAX_DIMENSIONS}",
                self.kind.name(),
                self.dimension
            )));
        }
        Ok(())
    }
}

impl fmt::Display for ArraySpec {
    /// Formats the spec as its column type, e.g. `integer[][]`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind, "[]".repeat(self.dimension))
    }
}

/// An auto-incrementing integer primary key.
#[derive(Debug, Clone)]
pub struct AutoField {
    /// The attribute name (usually "id").
    pub name: &'static str,
    /// Human-readable name for the field.
    pub verbose_name: String,
    /// Whether the field was added implicitly by the model declaration.
    pub auto_created: bool,
}

impl AutoField {
    /// Creates the implicit `id` primary key.
    pub fn id() -> Self {
        Self {
            name: "id",
            verbose_name: "ID".to_string(),
            auto_created: true,
        }
    }
}

/// A single field in a model's metadata.
#[derive(Debug)]
pub enum FieldDef {
    /// The auto-incrementing primary key.
    Auto(AutoField),
    /// A PostgreSQL array column.
    Array(ArrayField),
}

impl FieldDef {
    /// Returns the attribute name of this field.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Auto(f) => f.name,
            Self::Array(f) => f.name,
        }
    }

    /// Returns the database column name of this field.
    pub fn column(&self) -> &str {
        match self {
            Self::Auto(f) => f.name,
            Self::Array(f) => &f.column,
        }
    }

    /// Returns `true` if this field is the primary key.
    pub const fn is_primary_key(&self) -> bool {
        matches!(self, Self::Auto(_))
    }

    /// Returns the array field, if this is one.
    pub const fn as_array(&self) -> Option<&ArrayField> {
        match self {
            Self::Array(f) => Some(f),
            Self::Auto(_) => None,
        }
    }
}

impl From<ArrayField> for FieldDef {
    fn from(field: ArrayField) -> Self {
        Self::Array(field)
    }
}

impl From<AutoField> for FieldDef {
    fn from(field: AutoField) -> Self {
        Self::Auto(field)
    }
}

//! The array column descriptor.
//!
//! An [`ArrayField`] is declared once inside a model's `'static` metadata and
//! is immutable afterwards. It converts between the column representation
//! (an array literal, or SQL NULL) and the in-memory [`Value::List`], and
//! validates values before they are written.
//!
//! # Examples
//!
//! ```
//! use pgarray_db::fields::ArrayField;
//! use pgarray_db::value::Value;
//!
//! let field = ArrayField::text("choices").choices([("A", "A"), ("B", "B")]);
//! assert!(field.validate(&Value::list(["A", "B", "A"])).is_ok());
//! assert!(field.validate(&Value::list(["A", "C"])).is_err());
//!
//! let stored = field.get_db_prep_value(&Value::list(["A"])).unwrap();
//! assert_eq!(stored, Value::from(r#"{"A"}"#));
//! ```

use std::fmt;
use std::sync::Arc;

use pgarray_core::{ChoiceMode, PgArrayError, PgArrayResult, ValidationError, SETTINGS};

use super::types::{ArraySpec, ElementKind};
use crate::codec;
use crate::validators::{MaxLengthValidator, Validator};
use crate::value::Value;

type SupplierFn = Arc<dyn Fn() -> Vec<Value> + Send + Sync>;
type CastFn = Arc<dyn Fn(Value) -> PgArrayResult<Value> + Send + Sync>;

/// How an array field produces the value of a newly constructed record.
///
/// Neither variant hands out shared state: a literal is cloned for every
/// record and a supplier is called again for every record.
#[derive(Clone)]
pub enum ArrayDefault {
    /// A fixed array value.
    Literal(Vec<Value>),
    /// A zero-argument function producing a fresh array value.
    Supplier {
        /// The supplier's path, recorded in migrations.
        path: String,
        /// The supplier itself.
        func: SupplierFn,
    },
}

impl ArrayDefault {
    /// Produces a new, independent array value.
    pub fn produce(&self) -> Vec<Value> {
        match self {
            Self::Literal(items) => items.clone(),
            Self::Supplier { func, .. } => func(),
        }
    }
}

impl fmt::Debug for ArrayDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(items) => f.debug_tuple("Literal").field(items).finish(),
            Self::Supplier { path, .. } => f.debug_struct("Supplier").field("path", path).finish(),
        }
    }
}

/// A conversion applied to every non-null element after a value is loaded.
#[derive(Clone)]
pub struct ElementCast {
    /// The cast function's path, recorded in migrations.
    pub path: String,
    func: CastFn,
}

impl ElementCast {
    /// Converts one element.
    ///
    /// # Errors
    ///
    /// Whatever the cast function returns.
    pub fn apply(&self, value: Value) -> PgArrayResult<Value> {
        (self.func)(value)
    }
}

impl fmt::Debug for ElementCast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementCast").field("path", &self.path).finish()
    }
}

/// A serializable description of a field's default.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum DefaultDescription {
    /// A literal array value.
    Literal(Vec<Value>),
    /// A supplier, by path.
    Callable(String),
}

/// The declaration of an array field, reduced to the data a migration records.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FieldDeconstruction {
    /// Attribute name.
    pub name: String,
    /// Column name.
    pub column: String,
    /// Element type, as a PostgreSQL type name.
    pub dbtype: String,
    /// Nesting depth.
    pub dimension: usize,
    /// Maximum outer length, if declared.
    pub size: Option<usize>,
    /// Allowed values and their labels.
    pub choices: Option<Vec<(Value, String)>>,
    /// The default, if any.
    pub default: Option<DefaultDescription>,
    /// Path of the element cast, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_cast: Option<String>,
    /// Whether SQL NULL is allowed.
    pub null: bool,
    /// Whether an empty array is allowed.
    pub blank: bool,
    /// Human-readable name.
    pub verbose_name: Option<String>,
}

/// A PostgreSQL array column bound to a model attribute.
#[derive(Debug)]
pub struct ArrayField {
    /// The attribute name.
    pub name: &'static str,
    /// The database column name (defaults to `name`).
    pub column: String,
    /// Element kind and shape.
    pub spec: ArraySpec,
    /// Allowed values and their display labels.
    pub choices: Option<Vec<(Value, String)>>,
    /// How `choices` are checked.
    pub choice_mode: ChoiceMode,
    /// The value given to new records.
    pub default: Option<ArrayDefault>,
    /// Conversion applied to each loaded element.
    pub type_cast: Option<ElementCast>,
    /// Whether the column accepts SQL NULL.
    pub null: bool,
    /// Whether an empty array is accepted.
    pub blank: bool,
    /// Human-readable name.
    pub verbose_name: Option<String>,
    /// Help text for forms and documentation.
    pub help_text: String,
    /// Validators applied to the whole value.
    pub validators: Vec<Box<dyn Validator>>,
}

impl ArrayField {
    /// Creates a one-dimensional array field of the given element kind.
    pub fn new(name: &'static str, kind: ElementKind) -> Self {
        Self {
            name,
            column: name.to_string(),
            spec: ArraySpec::new(kind),
            choices: None,
            choice_mode: SETTINGS.codec().default_choice_mode,
            default: None,
            type_cast: None,
            null: true,
            blank: true,
            verbose_name: None,
            help_text: String::new(),
            validators: Vec::new(),
        }
    }

    /// Creates an array field from a PostgreSQL element type name.
    ///
    /// # Errors
    ///
    /// Returns [`PgArrayError::ImproperlyConfigured`] for unsupported types.
    pub fn from_dbtype(name: &'static str, dbtype: &str) -> PgArrayResult<Self> {
        Ok(Self::new(name, ElementKind::from_dbtype(dbtype)?))
    }

    /// An `integer[]` field.
    pub fn integer(name: &'static str) -> Self {
        Self::new(name, ElementKind::Integer)
    }

    /// A `bigint[]` field.
    pub fn big_integer(name: &'static str) -> Self {
        Self::new(name, ElementKind::BigInteger)
    }

    /// A `smallint[]` field.
    pub fn small_integer(name: &'static str) -> Self {
        Self::new(name, ElementKind::SmallInteger)
    }

    /// A `double precision[]` field.
    pub fn float(name: &'static str) -> Self {
        Self::new(name, ElementKind::Float)
    }

    /// A `text[]` field.
    pub fn text(name: &'static str) -> Self {
        Self::new(name, ElementKind::Text)
    }

    /// A `varchar(n)[]` field.
    pub fn varchar(name: &'static str, max_length: usize) -> Self {
        Self::new(name, ElementKind::varchar(max_length))
    }

    /// A `date[]` field.
    pub fn date(name: &'static str) -> Self {
        Self::new(name, ElementKind::Date)
    }

    /// A `timestamp with time zone[]` field.
    pub fn datetime(name: &'static str) -> Self {
        Self::new(name, ElementKind::TimestampTz)
    }

    /// A `bytea[]` field.
    pub fn bytea(name: &'static str) -> Self {
        Self::new(name, ElementKind::Bytea)
    }

    /// A `macaddr[]` field.
    pub fn macaddr(name: &'static str) -> Self {
        Self::new(name, ElementKind::MacAddr)
    }

    // ── builder ─────────────────────────────────────────────────────

    /// Sets the database column name.
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }

    /// Sets the nesting depth.
    pub fn dimension(mut self, dimension: usize) -> Self {
        self.spec = self.spec.dimension(dimension);
        self
    }

    /// Sets the maximum outer length.
    pub fn size(mut self, size: usize) -> Self {
        self.spec = self.spec.size(size);
        self
    }

    /// Sets whether sibling sub-arrays must share a length.
    pub fn rectangular(mut self, rectangular: bool) -> Self {
        self.spec = self.spec.rectangular(rectangular);
        self
    }

    /// Restricts values to the given `(value, label)` pairs.
    pub fn choices<V, L>(mut self, choices: impl IntoIterator<Item = (V, L)>) -> Self
    where
        V: Into<Value>,
        L: Into<String>,
    {
        self.choices = Some(
            choices
                .into_iter()
                .map(|(value, label)| (value.into(), label.into()))
                .collect(),
        );
        self
    }

    /// Sets how choices are checked.
    pub fn choice_mode(mut self, mode: ChoiceMode) -> Self {
        self.choice_mode = mode;
        self
    }

    /// Uses a fixed array as the default; each record receives its own copy.
    pub fn default_literal(mut self, items: Vec<Value>) -> Self {
        self.default = Some(ArrayDefault::Literal(items));
        self
    }

    /// Uses a supplier as the default; it is called once per record.
    pub fn default_fn<F>(mut self, func: F) -> Self
    where
        F: Fn() -> Vec<Value> + Send + Sync + 'static,
    {
        self.default = Some(ArrayDefault::Supplier {
            path: std::any::type_name::<F>().to_string(),
            func: Arc::new(func),
        });
        self
    }

    /// Converts every non-null element on load, e.g. with
    /// [`to_text`](crate::value::to_text) to read MAC addresses as strings.
    ///
    /// The cast runs after decoding; values written back must still be
    /// accepted by the element kind's encoder.
    pub fn type_cast<F>(mut self, func: F) -> Self
    where
        F: Fn(Value) -> PgArrayResult<Value> + Send + Sync + 'static,
    {
        self.type_cast = Some(ElementCast {
            path: std::any::type_name::<F>().to_string(),
            func: Arc::new(func),
        });
        self
    }

    /// Sets whether SQL NULL is accepted.
    pub fn null(mut self, null: bool) -> Self {
        self.null = null;
        self
    }

    /// Sets whether an empty array is accepted.
    pub fn blank(mut self, blank: bool) -> Self {
        self.blank = blank;
        self
    }

    /// Sets the human-readable name.
    pub fn verbose_name(mut self, verbose_name: impl Into<String>) -> Self {
        self.verbose_name = Some(verbose_name.into());
        self
    }

    /// Sets the help text.
    pub fn help_text(mut self, help_text: impl Into<String>) -> Self {
        self.help_text = help_text.into();
        self
    }

    /// Adds a validator that runs on the whole value.
    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    // ── declaration ─────────────────────────────────────────────────

    /// Returns the column type, e.g. `integer[][]` or `varchar(30)[]`.
    pub fn db_type(&self) -> String {
        self.spec.to_string()
    }

    /// Verifies the declaration: a valid spec and a default of the right shape.
    ///
    /// # Errors
    ///
    /// Returns [`PgArrayError::ImproperlyConfigured`] describing the problem.
    pub fn check(&self) -> PgArrayResult<()> {
        self.spec.check()?;
        if self.choices.as_ref().is_some_and(Vec::is_empty) {
            return Err(PgArrayError::ImproperlyConfigured(format!(
                "Field '{}' declares an empty choices list",
                self.name
            )));
        }
        if let Some(ArrayDefault::Literal(items)) = &self.default {
            codec::check_shape(items, &self.spec)
                .and_then(|()| codec::check_size(items, &self.spec))
                .map_err(|reason| {
                    PgArrayError::ImproperlyConfigured(format!(
                        "Default of field '{}' does not fit {}: {reason}",
                        self.name, self.spec
                    ))
                })?;
        }
        Ok(())
    }

    /// Describes the field for migrations.
    pub fn deconstruct(&self) -> FieldDeconstruction {
        FieldDeconstruction {
            name: self.name.to_string(),
            column: self.column.clone(),
            dbtype: self.spec.kind().db_type(),
            dimension: self.spec.get_dimension(),
            size: self.spec.get_size(),
            choices: self.choices.clone(),
            default: self.default.as_ref().map(|default| match default {
                ArrayDefault::Literal(items) => DefaultDescription::Literal(items.clone()),
                ArrayDefault::Supplier { path, .. } => DefaultDescription::Callable(path.clone()),
            }),
            type_cast: self.type_cast.as_ref().map(|cast| cast.path.clone()),
            null: self.null,
            blank: self.blank,
            verbose_name: self.verbose_name.clone(),
        }
    }

    // ── values ──────────────────────────────────────────────────────

    /// Returns the value for a newly constructed record.
    ///
    /// Every call produces an independent value. Without a declared default
    /// a nullable field starts as `Null` and a non-nullable one as `{}`.
    ///
    /// # Errors
    ///
    /// Returns [`PgArrayError::ShapeError`] if a supplier returns a value
    /// that does not fit the spec.
    pub fn get_default(&self) -> PgArrayResult<Value> {
        match &self.default {
            Some(default) => {
                let items = default.produce();
                codec::check_shape(&items, &self.spec).map_err(PgArrayError::ShapeError)?;
                Ok(Value::List(items))
            }
            None if self.null => Ok(Value::Null),
            None => Ok(Value::List(Vec::new())),
        }
    }

    /// Converts a column value read from the database (the load hook).
    ///
    /// `Null` stays `Null`; a literal string is decoded; a list from a driver
    /// with native array support is shape-checked and passed through. The
    /// element cast, if declared, then runs on every non-null element.
    ///
    /// # Errors
    ///
    /// Returns [`PgArrayError::DecodingError`] or [`PgArrayError::RangeError`]
    /// if the stored value does not fit the spec, or the cast's error.
    pub fn from_db_value(&self, value: &Value) -> PgArrayResult<Value> {
        let items = match value {
            Value::Null => return Ok(Value::Null),
            Value::String(literal) => codec::decode(literal, &self.spec)?,
            Value::List(items) => {
                codec::check_shape(items, &self.spec)
                    .map_err(|reason| PgArrayError::decoding(value.to_string(), &self.spec, reason))?;
                items.clone()
            }
            other => {
                return Err(PgArrayError::decoding(
                    other.to_string(),
                    &self.spec,
                    format!("column '{}' does not hold an array", self.column),
                ))
            }
        };
        match &self.type_cast {
            Some(cast) => cast_elements(cast, items).map(Value::List),
            None => Ok(Value::List(items)),
        }
    }

    /// Validates and converts a value for writing (the save hook).
    ///
    /// Returns `Value::String(literal)` for arrays and `Value::Null` for absence.
    ///
    /// # Errors
    ///
    /// Any error from [`validate`](Self::validate) or [`codec::encode`].
    pub fn get_db_prep_value(&self, value: &Value) -> PgArrayResult<Value> {
        self.validate(value)?;
        match value {
            Value::List(items) => codec::encode(items, &self.spec).map(Value::String),
            _ => Ok(Value::Null),
        }
    }

    /// Validates a value against the field declaration.
    ///
    /// Checks, in order: absence against `null`; shape and size; emptiness
    /// against `blank`; choices; `varchar` length; user validators.
    ///
    /// # Errors
    ///
    /// [`PgArrayError::ShapeError`] for shape problems and
    /// [`PgArrayError::ValidationError`] for everything else.
    pub fn validate(&self, value: &Value) -> PgArrayResult<()> {
        let result = self.run_validators(value);
        if let Err(err) = &result {
            tracing::debug!(field = self.name, error = %err, "array field validation failed");
        }
        result
    }

    fn run_validators(&self, value: &Value) -> PgArrayResult<()> {
        let items = match value {
            Value::Null if self.null => return Ok(()),
            Value::Null => {
                return Err(ValidationError::new("This field cannot be null.", "null").into());
            }
            Value::List(items) => items,
            other => {
                return Err(PgArrayError::ShapeError(format!(
                    "field '{}' expects an array, got {other}",
                    self.name
                )));
            }
        };

        codec::check_shape(items, &self.spec)
            .and_then(|()| codec::check_size(items, &self.spec))
            .map_err(PgArrayError::ShapeError)?;

        if items.is_empty() && !self.blank {
            return Err(ValidationError::new("This field cannot be blank.", "blank").into());
        }

        if let Some(choices) = &self.choices {
            self.check_choices(items, choices)?;
        }

        if let ElementKind::Varchar {
            max_length: Some(max_length),
        } = self.spec.kind()
        {
            let limit = MaxLengthValidator::new(*max_length);
            for leaf in value.leaves() {
                limit.validate(leaf)?;
            }
        }

        for validator in &self.validators {
            validator.validate(value)?;
        }
        Ok(())
    }

    fn check_choices(&self, items: &[Value], choices: &[(Value, String)]) -> PgArrayResult<()> {
        match self.choice_mode {
            ChoiceMode::PerElement => {
                for leaf in items.iter().flat_map(Value::leaves) {
                    if !leaf.is_null() && !choices.iter().any(|(allowed, _)| allowed == leaf) {
                        return Err(invalid_choice(leaf.to_string()));
                    }
                }
            }
            ChoiceMode::WholeArray => {
                let literal = codec::encode(items, &self.spec)?;
                let allowed = choices.iter().any(|(choice, _)| {
                    choice.as_str() == Some(literal.as_str()) || choice.as_list() == Some(items)
                });
                if !allowed {
                    return Err(invalid_choice(literal));
                }
            }
        }
        Ok(())
    }
}

fn invalid_choice(value: String) -> PgArrayError {
    ValidationError::new(format!("Value '{value}' is not a valid choice."), "invalid_choice")
        .with_param("value", value)
        .into()
}

fn cast_elements(cast: &ElementCast, items: Vec<Value>) -> PgArrayResult<Vec<Value>> {
    items
        .into_iter()
        .map(|item| match item {
            Value::List(inner) => cast_elements(cast, inner).map(Value::List),
            Value::Null => Ok(Value::Null),
            leaf => cast.apply(leaf),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::validators::ArrayMaxLengthValidator;
    use crate::value::to_text;

    fn validation_code(err: PgArrayError) -> String {
        match err {
            PgArrayError::ValidationError(v) => v.code,
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    fn empty_default() -> Vec<Value> {
        Vec::new()
    }

    // ── declaration ─────────────────────────────────────────────────

    #[test]
    fn test_shorthand_constructors() {
        assert_eq!(ArrayField::integer("f").db_type(), "integer[]");
        assert_eq!(ArrayField::big_integer("f").db_type(), "bigint[]");
        assert_eq!(ArrayField::small_integer("f").db_type(), "smallint[]");
        assert_eq!(ArrayField::float("f").db_type(), "double precision[]");
        assert_eq!(ArrayField::text("f").db_type(), "text[]");
        assert_eq!(ArrayField::varchar("f", 30).db_type(), "varchar(30)[]");
        assert_eq!(ArrayField::date("f").db_type(), "date[]");
        assert_eq!(ArrayField::datetime("f").db_type(), "timestamp with time zone[]");
        assert_eq!(ArrayField::bytea("f").db_type(), "bytea[]");
        assert_eq!(ArrayField::macaddr("f").db_type(), "macaddr[]");
        assert_eq!(ArrayField::integer("f").dimension(2).db_type(), "integer[][]");
    }

    #[test]
    fn test_from_dbtype() {
        let field = ArrayField::from_dbtype("varchars", "varchar(30)").unwrap();
        assert_eq!(field.spec.kind(), &ElementKind::varchar(30));
        assert!(ArrayField::from_dbtype("x", "geometry").is_err());
    }

    #[test]
    fn test_field_defaults() {
        let field = ArrayField::text("tags");
        assert_eq!(field.column, "tags");
        assert!(field.null);
        assert!(field.blank);
        assert!(field.choices.is_none());
        assert_eq!(field.choice_mode, ChoiceMode::PerElement);
        assert!(field.check().is_ok());
    }

    #[test]
    fn test_check_rejects_bad_declarations() {
        let zero = ArrayField::integer("f").dimension(0);
        assert!(matches!(zero.check(), Err(PgArrayError::ImproperlyConfigured(_))));

        let flat_default = ArrayField::integer("f")
            .dimension(2)
            .default_literal(vec![Value::Int(1)]);
        assert!(matches!(flat_default.check(), Err(PgArrayError::ImproperlyConfigured(_))));

        let no_choices = ArrayField::text("f").choices(Vec::<(&str, &str)>::new());
        assert!(matches!(no_choices.check(), Err(PgArrayError::ImproperlyConfigured(_))));
    }

    #[test]
    fn test_deconstruct() {
        let field = ArrayField::text("choices")
            .choices([("A", "A"), ("B", "B")])
            .verbose_name("Choices");
        let d = field.deconstruct();
        assert_eq!(d.name, "choices");
        assert_eq!(d.dbtype, "text");
        assert_eq!(d.dimension, 1);
        assert_eq!(
            d.choices,
            Some(vec![
                (Value::from("A"), "A".to_string()),
                (Value::from("B"), "B".to_string())
            ])
        );
        assert_eq!(d.default, None);
        assert_eq!(d.verbose_name.as_deref(), Some("Choices"));
    }

    #[test]
    fn test_deconstruct_defaults() {
        let literal = ArrayField::text("tags").default_literal(vec![]).deconstruct();
        assert_eq!(literal.default, Some(DefaultDescription::Literal(vec![])));

        let supplier = ArrayField::text("tags").default_fn(empty_default).deconstruct();
        match supplier.default {
            Some(DefaultDescription::Callable(path)) => assert!(path.ends_with("empty_default")),
            other => panic!("unexpected default {other:?}"),
        }
    }

    #[test]
    fn test_deconstruct_type_cast() {
        assert_eq!(ArrayField::macaddr("f").deconstruct().type_cast, None);
        let d = ArrayField::macaddr("f").type_cast(to_text).deconstruct();
        assert!(d.type_cast.is_some_and(|path| path.ends_with("to_text")));
    }

    // ── defaults ────────────────────────────────────────────────────

    #[test]
    fn test_get_default_without_declaration() {
        assert_eq!(ArrayField::text("f").get_default().unwrap(), Value::Null);
        assert_eq!(
            ArrayField::text("f").null(false).get_default().unwrap(),
            Value::List(vec![])
        );
    }

    #[test]
    fn test_literal_default_is_independent_per_record() {
        let field = ArrayField::text("tags").default_literal(vec![Value::from("x")]);
        let mut first = field.get_default().unwrap();
        if let Value::List(items) = &mut first {
            items.push(Value::from("y"));
        }
        assert_eq!(field.get_default().unwrap(), Value::list(["x"]));
        assert_eq!(first, Value::list(["x", "y"]));
    }

    #[test]
    fn test_supplier_default_called_per_record() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);
        let field = ArrayField::text("tags").default_fn(|| {
            CALLS.fetch_add(1, Ordering::SeqCst);
            Vec::new()
        });
        assert_eq!(field.get_default().unwrap(), Value::List(vec![]));
        assert_eq!(field.get_default().unwrap(), Value::List(vec![]));
        assert_eq!(CALLS.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_supplier_default_shape_checked() {
        let field = ArrayField::integer("f").dimension(2).default_fn(|| vec![Value::Int(1)]);
        assert!(matches!(field.get_default(), Err(PgArrayError::ShapeError(_))));
    }

    // ── load / save ─────────────────────────────────────────────────

    #[test]
    fn test_from_db_value() {
        let field = ArrayField::integer("f");
        assert_eq!(field.from_db_value(&Value::Null).unwrap(), Value::Null);
        assert_eq!(
            field.from_db_value(&Value::from("{1,2,3}")).unwrap(),
            Value::list([1_i64, 2, 3])
        );
        assert_eq!(field.from_db_value(&Value::from("{}")).unwrap(), Value::List(vec![]));
        assert_eq!(
            field.from_db_value(&Value::list([4_i64])).unwrap(),
            Value::list([4_i64])
        );
        assert!(matches!(
            field.from_db_value(&Value::Int(1)),
            Err(PgArrayError::DecodingError { .. })
        ));
        assert!(matches!(
            field.from_db_value(&Value::list([Value::list([1_i64])])),
            Err(PgArrayError::DecodingError { .. })
        ));
    }

    #[test]
    fn test_get_db_prep_value() {
        let field = ArrayField::integer("f");
        assert_eq!(
            field.get_db_prep_value(&Value::list([1_i64, 2, 3])).unwrap(),
            Value::from("{1,2,3}")
        );
        assert_eq!(field.get_db_prep_value(&Value::List(vec![])).unwrap(), Value::from("{}"));
        assert_eq!(field.get_db_prep_value(&Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn test_get_db_prep_value_range_error() {
        let field = ArrayField::small_integer("smallints");
        assert!(matches!(
            field.get_db_prep_value(&Value::list([40000_i64])),
            Err(PgArrayError::RangeError { .. })
        ));
    }

    // ── validation ──────────────────────────────────────────────────

    #[test]
    fn test_validate_null() {
        assert!(ArrayField::text("f").validate(&Value::Null).is_ok());
        let err = ArrayField::text("f").null(false).validate(&Value::Null).unwrap_err();
        assert_eq!(validation_code(err), "null");
    }

    #[test]
    fn test_validate_blank() {
        assert!(ArrayField::text("f").validate(&Value::List(vec![])).is_ok());
        let err = ArrayField::text("f").blank(false).validate(&Value::List(vec![])).unwrap_err();
        assert_eq!(validation_code(err), "blank");
    }

    #[test]
    fn test_validate_shape() {
        let field = ArrayField::integer("field2").dimension(2);
        assert!(matches!(
            field.validate(&Value::list([1_i64, 2])),
            Err(PgArrayError::ShapeError(_))
        ));
        assert!(matches!(field.validate(&Value::Int(1)), Err(PgArrayError::ShapeError(_))));
        let sized = ArrayField::integer("f").size(1);
        assert!(matches!(
            sized.validate(&Value::list([1_i64, 2])),
            Err(PgArrayError::ShapeError(_))
        ));
    }

    #[test]
    fn test_validate_choices_per_element() {
        let field = ArrayField::text("choices").choices([("A", "A"), ("B", "B")]);
        assert!(field.validate(&Value::list(["A", "B", "A"])).is_ok());
        assert!(field.validate(&Value::list([Value::Null, Value::from("B")])).is_ok());
        match field.validate(&Value::list(["A", "C"])).unwrap_err() {
            PgArrayError::ValidationError(err) => {
                assert_eq!(err.code, "invalid_choice");
                assert_eq!(err.params.get("value").map(String::as_str), Some("C"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_validate_choices_nested() {
        let field = ArrayField::integer("f").dimension(2).choices([(1_i64, "one"), (2, "two")]);
        assert!(field.validate(&Value::list([Value::list([1_i64, 2])])).is_ok());
        assert!(field.validate(&Value::list([Value::list([1_i64, 3])])).is_err());
    }

    #[test]
    fn test_validate_choices_whole_array() {
        let field = ArrayField::text("f")
            .choice_mode(ChoiceMode::WholeArray)
            .choices([(r#"{"A","B"}"#, "A and B")]);
        assert!(field.validate(&Value::list(["A", "B"])).is_ok());
        let err = field.validate(&Value::list(["A"])).unwrap_err();
        assert_eq!(validation_code(err), "invalid_choice");

        let by_list = ArrayField::integer("f")
            .choice_mode(ChoiceMode::WholeArray)
            .choices([(Value::list([1_i64, 2]), "pair")]);
        assert!(by_list.validate(&Value::list([1_i64, 2])).is_ok());
        assert!(by_list.validate(&Value::list([2_i64, 1])).is_err());
    }

    #[test]
    fn test_validate_varchar_length() {
        let field = ArrayField::varchar("varchars", 3);
        assert!(field.validate(&Value::list(["abc"])).is_ok());
        let err = field.validate(&Value::list(["abcd"])).unwrap_err();
        assert_eq!(validation_code(err), "max_length");
    }

    #[test]
    fn test_user_validators() {
        let field = ArrayField::integer("f").validator(ArrayMaxLengthValidator::new(2));
        assert!(field.validate(&Value::list([1_i64, 2])).is_ok());
        let err = field.validate(&Value::list([1_i64, 2, 3])).unwrap_err();
        assert_eq!(validation_code(err), "max_length");
    }

    #[test]
    fn test_get_db_prep_value_validates_first() {
        let field = ArrayField::text("choices").choices([("A", "A"), ("B", "B")]);
        assert!(field.get_db_prep_value(&Value::list(["C"])).unwrap_err().is_validation());
    }

    // ── element casts ───────────────────────────────────────────────

    #[test]
    fn test_type_cast_applies_to_every_loaded_element() {
        let field = ArrayField::macaddr("f").type_cast(to_text);
        let loaded = field
            .from_db_value(&Value::from("{08:00:2b:01:02:03,NULL,DE-AD-BE-EF-00-01}"))
            .unwrap();
        assert_eq!(
            loaded,
            Value::List(vec![
                Value::from("08:00:2b:01:02:03"),
                Value::Null,
                Value::from("de:ad:be:ef:00:01"),
            ])
        );
    }

    #[test]
    fn test_type_cast_reaches_nested_elements() {
        let field = ArrayField::integer("f")
            .dimension(2)
            .type_cast(|v: Value| Ok(Value::Int(v.as_int().unwrap_or_default() * 10)));
        assert_eq!(
            field.from_db_value(&Value::from("{{1,2},{3,4}}")).unwrap(),
            Value::List(vec![Value::list([10_i64, 20]), Value::list([30_i64, 40])])
        );
        assert_eq!(field.from_db_value(&Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn test_type_cast_error_propagates() {
        let field = ArrayField::text("f").type_cast(|_| {
            Err(PgArrayError::DecodingError {
                literal: String::new(),
                spec: String::new(),
                reason: "refused".to_string(),
            })
        });
        assert!(field.from_db_value(&Value::from("{a}")).is_err());
    }

    #[test]
    fn test_cast_values_are_written_back() {
        let field = ArrayField::macaddr("f").type_cast(to_text);
        let loaded = field.from_db_value(&Value::from("{08:00:2b:01:02:03}")).unwrap();
        assert_eq!(
            field.get_db_prep_value(&loaded).unwrap(),
            Value::from("{08:00:2b:01:02:03}")
        );
    }
}

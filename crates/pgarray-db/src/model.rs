//! Model trait and metadata.
//!
//! The [`Model`] trait is implemented by every record type that owns array
//! columns. It exposes static metadata, the primary key, and conversion to
//! and from [`Row`]s. [`ModelMeta`] lists the model's fields; it is declared
//! once per type in a `LazyLock` and never mutated.

use pgarray_core::{PgArrayError, PgArrayResult};

use crate::fields::{ArrayField, FieldDef};
use crate::row::Row;
use crate::value::Value;

/// The core trait for all models with array columns.
///
/// # Examples
///
/// ```
/// use std::sync::LazyLock;
///
/// use pgarray_core::PgArrayResult;
/// use pgarray_db::fields::{ArrayField, AutoField};
/// use pgarray_db::model::{Model, ModelMeta};
/// use pgarray_db::row::Row;
/// use pgarray_db::value::Value;
///
/// struct Post {
///     id: Option<i64>,
///     tags: Option<Vec<Value>>,
/// }
///
/// impl Model for Post {
///     fn meta() -> &'static ModelMeta {
///         static META: LazyLock<ModelMeta> = LazyLock::new(|| {
///             ModelMeta::new(
///                 "blog",
///                 "post",
///                 vec![AutoField::id().into(), ArrayField::text("tags").into()],
///             )
///         });
///         &META
///     }
///
///     fn pk(&self) -> Option<i64> { self.id }
///     fn set_pk(&mut self, id: i64) { self.id = Some(id); }
///
///     fn field_values(&self) -> Vec<(&'static str, Value)> {
///         vec![("id", self.id.into()), ("tags", self.tags.clone().into())]
///     }
///
///     fn from_row(row: &Row) -> PgArrayResult<Self> {
///         let meta = Self::meta();
///         Ok(Self {
///             id: row.get("id")?,
///             tags: row.get_array(meta.array_field("tags")?)?,
///         })
///     }
/// }
///
/// assert_eq!(Post::table_name(), "blog_post");
/// ```
pub trait Model: Send + Sync + 'static {
    /// Returns the static metadata for this model type.
    fn meta() -> &'static ModelMeta;

    /// Returns the database table name.
    fn table_name() -> &'static str {
        &Self::meta().db_table
    }

    /// Returns the application label this model belongs to.
    fn app_label() -> &'static str {
        Self::meta().app_label
    }

    /// Returns the primary key, or `None` if unsaved.
    fn pk(&self) -> Option<i64>;

    /// Sets the primary key (used after INSERT).
    fn set_pk(&mut self, id: i64);

    /// Returns the name of the primary key field (e.g., "id").
    fn pk_field_name() -> &'static str {
        "id"
    }

    /// Returns all field name-value pairs for this instance.
    ///
    /// Array fields report `Value::List` or, when absent, `Value::Null`.
    fn field_values(&self) -> Vec<(&'static str, Value)>;

    /// Returns field name-value pairs excluding the primary key.
    fn non_pk_field_values(&self) -> Vec<(&'static str, Value)> {
        let pk_name = Self::pk_field_name();
        self.field_values()
            .into_iter()
            .filter(|(name, _)| *name != pk_name)
            .collect()
    }

    /// Constructs a model instance from a database row.
    fn from_row(row: &Row) -> PgArrayResult<Self>
    where
        Self: Sized;
}

/// Metadata about a model.
#[derive(Debug)]
pub struct ModelMeta {
    /// The application label (e.g., "pg_array_fields").
    pub app_label: &'static str,
    /// The model name in lowercase (e.g., "intmodel").
    pub model_name: &'static str,
    /// The database table name.
    pub db_table: String,
    /// Human-readable singular name.
    pub verbose_name: String,
    /// Human-readable plural name.
    pub verbose_name_plural: String,
    /// Field definitions, in declaration order.
    pub fields: Vec<FieldDef>,
}

impl ModelMeta {
    /// Creates metadata with the conventional table name `{app_label}_{model_name}`.
    pub fn new(app_label: &'static str, model_name: &'static str, fields: Vec<FieldDef>) -> Self {
        Self {
            app_label,
            model_name,
            db_table: format!("{app_label}_{model_name}"),
            verbose_name: model_name.to_string(),
            verbose_name_plural: format!("{model_name}s"),
            fields,
        }
    }

    /// Returns the field with the given attribute name.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Returns the array field with the given attribute name.
    ///
    /// # Errors
    ///
    /// Returns [`PgArrayError::ImproperlyConfigured`] if there is no such
    /// array field.
    pub fn array_field(&self, name: &str) -> PgArrayResult<&ArrayField> {
        self.field(name)
            .and_then(FieldDef::as_array)
            .ok_or_else(|| {
                PgArrayError::ImproperlyConfigured(format!(
                    "{}.{} has no array field '{name}'",
                    self.app_label, self.model_name
                ))
            })
    }

    /// Iterates over the array fields, in declaration order.
    pub fn array_fields(&self) -> impl Iterator<Item = &ArrayField> {
        self.fields.iter().filter_map(FieldDef::as_array)
    }

    /// Returns the initial value of the named array field for a new record.
    ///
    /// # Errors
    ///
    /// Returns an error if the field does not exist or its default does
    /// not fit its spec.
    pub fn default_for(&self, name: &str) -> PgArrayResult<Option<Vec<Value>>> {
        Ok(self.array_field(name)?.get_default()?.into_list())
    }

    /// Verifies every field declaration.
    ///
    /// # Errors
    ///
    /// Returns [`PgArrayError::ImproperlyConfigured`] for the first invalid
    /// field or for duplicate field names.
    pub fn check(&self) -> PgArrayResult<()> {
        for (i, field) in self.fields.iter().enumerate() {
            if self.fields[..i].iter().any(|f| f.name() == field.name()) {
                return Err(PgArrayError::ImproperlyConfigured(format!(
                    "{}.{} declares field '{}' more than once",
                    self.app_label,
                    self.model_name,
                    field.name()
                )));
            }
            if let Some(array) = field.as_array() {
                array.check()?;
            }
        }
        Ok(())
    }
}

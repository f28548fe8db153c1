//! Project state and migration auto-detection.
//!
//! A [`ProjectState`] is a snapshot of every model's schema-relevant fields,
//! built either by replaying migrations or directly from the models' static
//! metadata. The [`MigrationAutodetector`] compares two states and produces
//! the operations that turn one into the other.

use std::collections::HashMap;

use pgarray_db::fields::{DefaultDescription, ElementKind, FieldDef};
use pgarray_db::model::ModelMeta;
use pgarray_db::value::Value;
use serde::{Deserialize, Serialize};

use crate::operations::{AddField, AlterField, CreateModel, DeleteModel, Operation, RemoveField};

/// A snapshot of the entire project's model state at a point in time.
///
/// Contains all models across all apps, keyed by `(app_label, model_name)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectState {
    /// All models in the project, keyed by `(app_label, model_name)`.
    pub models: HashMap<(String, String), ModelState>,
}

impl ProjectState {
    /// Creates a new empty project state.
    pub fn new() -> Self {
        Self {
            models: HashMap::new(),
        }
    }

    /// Adds a model to this project state.
    pub fn add_model(&mut self, model: ModelState) {
        let key = (model.app_label.clone(), model.name.clone());
        self.models.insert(key, model);
    }

    /// Returns the model with the given key, if present.
    pub fn get_model(&self, app_label: &str, name: &str) -> Option<&ModelState> {
        self.models.get(&(app_label.to_string(), name.to_string()))
    }

    /// Builds the state of the given models from their declared metadata.
    pub fn from_models<'a>(metas: impl IntoIterator<Item = &'a ModelMeta>) -> Self {
        let mut state = Self::new();
        for meta in metas {
            state.add_model(ModelState::from_meta(meta));
        }
        state
    }

    /// Lists the operations that would turn `other` into this state.
    ///
    /// An empty result means the two states declare the same models with
    /// the same fields. Descriptions are sorted.
    pub fn diff(&self, other: &Self) -> Vec<String> {
        let mut changes: Vec<String> = MigrationAutodetector::new(other.clone(), self.clone())
            .detect_changes()
            .into_iter()
            .flat_map(|(app_label, ops)| {
                ops.into_iter()
                    .map(move |op| format!("{app_label}: {}", op.describe()))
            })
            .collect();
        changes.sort();
        changes
    }
}

/// Options for a model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelOptions {
    /// The explicit database table name, if set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_table: Option<String>,
}

/// The state of a single model at a point in time.
///
/// This is a migration-friendly representation of a model that does not
/// hold the runtime [`FieldDef`]s (which carry validators and default
/// suppliers). It uses [`MigrationFieldDef`] instead.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelState {
    /// The application label this model belongs to.
    pub app_label: String,
    /// The model name (lowercase).
    pub name: String,
    /// The fields of this model.
    pub fields: Vec<MigrationFieldDef>,
    /// Model-level options.
    pub options: ModelOptions,
}

impl ModelState {
    /// Creates a new model state.
    pub fn new(
        app_label: impl Into<String>,
        name: impl Into<String>,
        fields: Vec<MigrationFieldDef>,
    ) -> Self {
        Self {
            app_label: app_label.into(),
            name: name.into(),
            fields,
            options: ModelOptions::default(),
        }
    }

    /// Builds the state of a model from its metadata.
    pub fn from_meta(meta: &ModelMeta) -> Self {
        let default_table = format!("{}_{}", meta.app_label, meta.model_name);
        Self {
            app_label: meta.app_label.to_string(),
            name: meta.model_name.to_string(),
            fields: meta.fields.iter().map(MigrationFieldDef::from_field).collect(),
            options: ModelOptions {
                db_table: (meta.db_table != default_table).then(|| meta.db_table.clone()),
            },
        }
    }

    /// Sets model options.
    pub fn with_options(mut self, options: ModelOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the field with the given name.
    pub fn get_field(&self, name: &str) -> Option<&MigrationFieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns the database table name for this model.
    pub fn db_table(&self) -> String {
        self.options
            .db_table
            .clone()
            .unwrap_or_else(|| format!("{}_{}", self.app_label, self.name))
    }
}

/// The kind of column a migration field describes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MigrationFieldType {
    /// An auto-incrementing integer primary key.
    AutoField,
    /// A PostgreSQL array column.
    ArrayField {
        /// The element type, as written in the declaration.
        dbtype: String,
        /// Nesting depth.
        dimension: usize,
        /// Maximum outer length, if declared.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        size: Option<usize>,
    },
}

/// A migration-friendly field definition.
///
/// Unlike [`FieldDef`], this struct is `Clone` and serializable because it
/// records a default supplier by path rather than holding it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationFieldDef {
    /// The field name.
    pub name: String,
    /// The database column name.
    pub column: String,
    /// The field type.
    pub field_type: MigrationFieldType,
    /// Whether this field is the primary key.
    #[serde(default)]
    pub primary_key: bool,
    /// Whether the field was added implicitly.
    #[serde(default)]
    pub auto_created: bool,
    /// Whether the field is included when serializing records.
    #[serde(default = "default_true")]
    pub serialize: bool,
    /// Whether NULL is allowed.
    #[serde(default)]
    pub null: bool,
    /// Whether an empty value is allowed.
    #[serde(default)]
    pub blank: bool,
    /// Allowed values and their labels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<(Value, String)>>,
    /// Default value description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultDescription>,
    /// Path of the element cast applied on load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_cast: Option<String>,
    /// Human-readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbose_name: Option<String>,
}

const fn default_true() -> bool {
    true
}

impl MigrationFieldDef {
    /// Creates a new migration field definition with sensible defaults.
    pub fn new(name: impl Into<String>, field_type: MigrationFieldType) -> Self {
        let name = name.into();
        let column = name.clone();
        Self {
            name,
            column,
            field_type,
            primary_key: false,
            auto_created: false,
            serialize: true,
            null: false,
            blank: false,
            choices: None,
            default: None,
            type_cast: None,
            verbose_name: None,
        }
    }

    /// The implicit `id` primary key.
    pub fn auto_id() -> Self {
        Self::new("id", MigrationFieldType::AutoField)
            .primary_key()
            .auto_created()
            .serialize(false)
            .verbose_name("ID")
    }

    /// A one-dimensional array field; nullable and blank like [`ArrayField`](pgarray_db::fields::ArrayField).
    pub fn array(name: impl Into<String>, dbtype: impl Into<String>) -> Self {
        let mut field = Self::new(
            name,
            MigrationFieldType::ArrayField {
                dbtype: dbtype.into(),
                dimension: 1,
                size: None,
            },
        );
        field.null = true;
        field.blank = true;
        field
    }

    /// Describes a model field.
    pub fn from_field(field: &FieldDef) -> Self {
        match field {
            FieldDef::Auto(auto) => {
                let mut def = Self::new(auto.name, MigrationFieldType::AutoField)
                    .primary_key()
                    .serialize(false)
                    .verbose_name(auto.verbose_name.clone());
                def.auto_created = auto.auto_created;
                def
            }
            FieldDef::Array(array) => {
                let d = array.deconstruct();
                Self {
                    name: d.name,
                    column: d.column,
                    field_type: MigrationFieldType::ArrayField {
                        dbtype: d.dbtype,
                        dimension: d.dimension,
                        size: d.size,
                    },
                    primary_key: false,
                    auto_created: false,
                    serialize: true,
                    null: d.null,
                    blank: d.blank,
                    choices: d.choices,
                    default: d.default,
                    type_cast: d.type_cast,
                    verbose_name: d.verbose_name,
                }
            }
        }
    }

    /// Sets the database column name.
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }

    /// Marks this field as the primary key.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Marks this field as implicitly created.
    pub fn auto_created(mut self) -> Self {
        self.auto_created = true;
        self
    }

    /// Sets whether the field is serialized.
    pub fn serialize(mut self, serialize: bool) -> Self {
        self.serialize = serialize;
        self
    }

    /// Sets the nesting depth of an array field.
    pub fn dimension(mut self, n: usize) -> Self {
        if let MigrationFieldType::ArrayField { dimension, .. } = &mut self.field_type {
            *dimension = n;
        }
        self
    }

    /// Sets the maximum outer length of an array field.
    pub fn size(mut self, n: usize) -> Self {
        if let MigrationFieldType::ArrayField { size, .. } = &mut self.field_type {
            *size = Some(n);
        }
        self
    }

    /// Sets the allowed values.
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

    /// Records a literal default.
    pub fn default_literal(mut self, items: Vec<Value>) -> Self {
        self.default = Some(DefaultDescription::Literal(items));
        self
    }

    /// Records a default supplier by path.
    pub fn default_callable(mut self, path: impl Into<String>) -> Self {
        self.default = Some(DefaultDescription::Callable(path.into()));
        self
    }

    /// Records an element cast by path.
    pub fn type_cast(mut self, path: impl Into<String>) -> Self {
        self.type_cast = Some(path.into());
        self
    }

    /// Sets the human-readable name.
    pub fn verbose_name(mut self, verbose_name: impl Into<String>) -> Self {
        self.verbose_name = Some(verbose_name.into());
        self
    }

    /// Returns the column type, e.g. `serial` or `integer[][]`.
    ///
    /// Returns `None` if the array element type is not supported.
    pub fn db_type(&self) -> Option<String> {
        match &self.field_type {
            MigrationFieldType::AutoField => Some("serial".to_string()),
            MigrationFieldType::ArrayField {
                dbtype, dimension, ..
            } => ElementKind::from_dbtype(dbtype)
                .ok()
                .map(|kind| format!("{}{}", kind.db_type(), "[]".repeat(*dimension))),
        }
    }

    /// Returns a copy with the element type in its canonical spelling,
    /// so that `int` and `integer` compare equal.
    pub fn canonical(&self) -> Self {
        let mut field = self.clone();
        if let MigrationFieldType::ArrayField { dbtype, .. } = &mut field.field_type {
            if let Ok(kind) = ElementKind::from_dbtype(dbtype) {
                *dbtype = kind.db_type();
            }
        }
        field
    }
}

/// Compares two [`ProjectState`]s and generates migration operations.
///
/// The autodetector detects:
/// - New models (creates `CreateModel`)
/// - Deleted models (creates `DeleteModel`)
/// - Added fields (creates `AddField`)
/// - Removed fields (creates `RemoveField`)
/// - Altered fields (creates `AlterField`)
pub struct MigrationAutodetector {
    /// The old project state (before changes).
    pub from_state: ProjectState,
    /// The new project state (after changes).
    pub to_state: ProjectState,
}

impl MigrationAutodetector {
    /// Creates a new autodetector with from and to states.
    pub fn new(from_state: ProjectState, to_state: ProjectState) -> Self {
        Self {
            from_state,
            to_state,
        }
    }

    /// Detects differences between the two states and returns operations
    /// grouped by app label, in a deterministic order.
    pub fn detect_changes(&self) -> HashMap<String, Vec<Box<dyn Operation>>> {
        let mut result: HashMap<String, Vec<Box<dyn Operation>>> = HashMap::new();

        let mut to_keys: Vec<_> = self.to_state.models.keys().collect();
        to_keys.sort();
        let mut from_keys: Vec<_> = self.from_state.models.keys().collect();
        from_keys.sort();

        // 1. New models
        for key in &to_keys {
            if !self.from_state.models.contains_key(*key) {
                let model = &self.to_state.models[*key];
                result.entry(key.0.clone()).or_default().push(Box::new(CreateModel {
                    name: model.name.clone(),
                    fields: model.fields.clone(),
                    options: model.options.clone(),
                }));
            }
        }

        // 2. Deleted models
        for key in &from_keys {
            if !self.to_state.models.contains_key(*key) {
                result.entry(key.0.clone()).or_default().push(Box::new(DeleteModel {
                    name: key.1.clone(),
                }));
            }
        }

        // 3. Field changes on models present in both
        for key in &to_keys {
            let Some(old_model) = self.from_state.models.get(*key) else {
                continue;
            };
            let new_model = &self.to_state.models[*key];
            let ops = result.entry(key.0.clone()).or_default();

            for field in &new_model.fields {
                match old_model.get_field(&field.name) {
                    None => ops.push(Box::new(AddField {
                        model_name: new_model.name.clone(),
                        field: field.clone(),
                    })),
                    Some(old_field) if old_field.canonical() != field.canonical() => {
                        ops.push(Box::new(AlterField {
                            model_name: new_model.name.clone(),
                            field_name: field.name.clone(),
                            field: field.clone(),
                        }));
                    }
                    Some(_) => {}
                }
            }

            for field in &old_model.fields {
                if new_model.get_field(&field.name).is_none() {
                    ops.push(Box::new(RemoveField {
                        model_name: new_model.name.clone(),
                        field_name: field.name.clone(),
                    }));
                }
            }
        }

        result.retain(|_, ops| !ops.is_empty());
        result
    }
}

#[cfg(test)]
mod tests {
    use pgarray_db::fields::{ArrayField, AutoField};

    use super::*;

    fn tags_model() -> ModelState {
        ModelState::new(
            "blog",
            "post",
            vec![
                MigrationFieldDef::auto_id(),
                MigrationFieldDef::array("tags", "text"),
            ],
        )
    }

    #[test]
    fn test_project_state_add_and_get() {
        let mut state = ProjectState::new();
        state.add_model(tags_model());
        let model = state.get_model("blog", "post").unwrap();
        assert_eq!(model.db_table(), "blog_post");
        assert!(model.get_field("tags").is_some());
        assert!(state.get_model("blog", "nope").is_none());
    }

    #[test]
    fn test_auto_id() {
        let id = MigrationFieldDef::auto_id();
        assert!(id.primary_key);
        assert!(id.auto_created);
        assert!(!id.serialize);
        assert_eq!(id.verbose_name.as_deref(), Some("ID"));
        assert_eq!(id.db_type().as_deref(), Some("serial"));
    }

    #[test]
    fn test_array_builder() {
        let field = MigrationFieldDef::array("field2", "int").dimension(2).size(4);
        assert_eq!(
            field.field_type,
            MigrationFieldType::ArrayField {
                dbtype: "int".to_string(),
                dimension: 2,
                size: Some(4),
            }
        );
        assert!(field.null);
        assert!(field.blank);
        assert_eq!(field.db_type().as_deref(), Some("integer[][]"));
        assert_eq!(MigrationFieldDef::array("x", "hstore").db_type(), None);
    }

    #[test]
    fn test_canonical_dbtype() {
        let short = MigrationFieldDef::array("field", "int");
        let long = MigrationFieldDef::array("field", "INTEGER");
        assert_ne!(short, long);
        assert_eq!(short.canonical(), long.canonical());
    }

    #[test]
    fn test_from_field() {
        let id = MigrationFieldDef::from_field(&FieldDef::from(AutoField::id()));
        assert_eq!(id, MigrationFieldDef::auto_id());

        let array = ArrayField::text("choices").choices([("A", "A"), ("B", "B")]);
        let def = MigrationFieldDef::from_field(&FieldDef::from(array));
        assert_eq!(
            def,
            MigrationFieldDef::array("choices", "text").choices([("A", "A"), ("B", "B")])
        );
    }

    #[test]
    fn test_from_field_records_type_cast() {
        let array = ArrayField::macaddr("field").type_cast(pgarray_db::value::to_text);
        let def = MigrationFieldDef::from_field(&FieldDef::from(array));
        assert!(def.type_cast.as_deref().is_some_and(|p| p.ends_with("to_text")));
        assert_ne!(def, MigrationFieldDef::array("field", "macaddr"));
    }

    #[test]
    fn test_from_meta_records_custom_table() {
        let mut meta = ModelMeta::new("blog", "post", vec![ArrayField::text("tags").into()]);
        assert_eq!(ModelState::from_meta(&meta).options.db_table, None);
        meta.db_table = "posts".to_string();
        assert_eq!(ModelState::from_meta(&meta).db_table(), "posts");
    }

    #[test]
    fn test_detect_new_and_deleted_models() {
        let mut old = ProjectState::new();
        old.add_model(ModelState::new("blog", "draft", vec![MigrationFieldDef::auto_id()]));
        let mut new = ProjectState::new();
        new.add_model(tags_model());

        let changes = MigrationAutodetector::new(old, new).detect_changes();
        let descriptions: Vec<String> = changes["blog"].iter().map(|op| op.describe()).collect();
        assert_eq!(descriptions, vec!["Create model post", "Delete model draft"]);
    }

    #[test]
    fn test_detect_field_changes() {
        let mut old = ProjectState::new();
        old.add_model(ModelState::new(
            "blog",
            "post",
            vec![
                MigrationFieldDef::auto_id(),
                MigrationFieldDef::array("tags", "text"),
                MigrationFieldDef::array("legacy", "int"),
            ],
        ));
        let mut new = ProjectState::new();
        new.add_model(ModelState::new(
            "blog",
            "post",
            vec![
                MigrationFieldDef::auto_id(),
                MigrationFieldDef::array("tags", "text").dimension(2),
                MigrationFieldDef::array("scores", "smallint"),
            ],
        ));

        let changes = MigrationAutodetector::new(old, new).detect_changes();
        let descriptions: Vec<String> = changes["blog"].iter().map(|op| op.describe()).collect();
        assert_eq!(
            descriptions,
            vec![
                "Alter field tags on post",
                "Add field scores to post",
                "Remove field legacy from post",
            ]
        );
    }

    #[test]
    fn test_no_changes() {
        let mut state = ProjectState::new();
        state.add_model(tags_model());
        assert!(MigrationAutodetector::new(state.clone(), state.clone())
            .detect_changes()
            .is_empty());
        assert!(state.diff(&state).is_empty());
    }

    #[test]
    fn test_diff_lists_changes() {
        let empty = ProjectState::new();
        let mut state = ProjectState::new();
        state.add_model(tags_model());
        assert_eq!(state.diff(&empty), vec!["blog: Create model post"]);
        assert_eq!(empty.diff(&state), vec!["blog: Delete model post"]);
    }
}

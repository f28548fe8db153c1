//! Migration serialization and deserialization.
//!
//! Provides a JSON form for migrations so their declarations can be stored
//! and compared outside the program that defines them.

use pgarray_core::{PgArrayError, PgArrayResult};
use serde::{Deserialize, Serialize};

use crate::autodetect::{MigrationFieldDef, ModelOptions};
use crate::migration::Migration;
use crate::operations::{AddField, AlterField, CreateModel, DeleteModel, Operation, RemoveField};

/// A serializable representation of a migration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializableMigration {
    /// The app label this migration belongs to.
    pub app_label: String,
    /// The migration name (e.g. "0001_initial").
    pub name: String,
    /// Dependencies as `[app_label, name]` pairs.
    #[serde(default)]
    pub dependencies: Vec<(String, String)>,
    /// Whether this is the initial migration for the app.
    #[serde(default)]
    pub initial: bool,
    /// The operations to apply.
    pub operations: Vec<SerializableOperation>,
}

/// A serializable representation of a single migration operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SerializableOperation {
    /// Create a new model.
    CreateModel {
        /// The model name.
        name: String,
        /// The fields for the model.
        fields: Vec<MigrationFieldDef>,
        /// Model options.
        #[serde(default)]
        options: ModelOptions,
    },
    /// Delete a model.
    DeleteModel {
        /// The model name.
        name: String,
    },
    /// Add a field to an existing model.
    AddField {
        /// The model name.
        model_name: String,
        /// The field definition.
        field: MigrationFieldDef,
    },
    /// Remove a field from a model.
    RemoveField {
        /// The model name.
        model_name: String,
        /// The field name.
        field_name: String,
    },
    /// Alter a field on a model.
    AlterField {
        /// The model name.
        model_name: String,
        /// The field name.
        field_name: String,
        /// The new field definition.
        field: MigrationFieldDef,
    },
}

impl SerializableMigration {
    /// Serializes this migration to a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`PgArrayError::SerializationError`] if serialization fails.
    pub fn to_json(&self) -> PgArrayResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            PgArrayError::SerializationError(format!("Failed to serialize migration: {e}"))
        })
    }

    /// Deserializes a migration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`PgArrayError::SerializationError`] for malformed input.
    pub fn from_json(json: &str) -> PgArrayResult<Self> {
        serde_json::from_str(json).map_err(|e| {
            PgArrayError::SerializationError(format!("Failed to deserialize migration: {e}"))
        })
    }

    /// Captures a migration in serializable form.
    pub fn from_migration(migration: &Migration) -> Self {
        Self {
            app_label: migration.app_label.clone(),
            name: migration.name.clone(),
            dependencies: migration.dependencies.clone(),
            initial: migration.initial,
            operations: migration
                .operations
                .iter()
                .map(|op| op.to_serializable())
                .collect(),
        }
    }

    /// Rebuilds the migration.
    pub fn to_migration(&self) -> Migration {
        Migration {
            name: self.name.clone(),
            app_label: self.app_label.clone(),
            dependencies: self.dependencies.clone(),
            operations: self
                .operations
                .iter()
                .map(SerializableOperation::to_operation)
                .collect(),
            initial: self.initial,
        }
    }
}

impl SerializableOperation {
    /// Converts this serializable operation to a boxed `Operation`.
    pub fn to_operation(&self) -> Box<dyn Operation> {
        match self {
            Self::CreateModel {
                name,
                fields,
                options,
            } => Box::new(CreateModel {
                name: name.clone(),
                fields: fields.clone(),
                options: options.clone(),
            }),
            Self::DeleteModel { name } => Box::new(DeleteModel { name: name.clone() }),
            Self::AddField { model_name, field } => Box::new(AddField {
                model_name: model_name.clone(),
                field: field.clone(),
            }),
            Self::RemoveField {
                model_name,
                field_name,
            } => Box::new(RemoveField {
                model_name: model_name.clone(),
                field_name: field_name.clone(),
            }),
            Self::AlterField {
                model_name,
                field_name,
                field,
            } => Box::new(AlterField {
                model_name: model_name.clone(),
                field_name: field_name.clone(),
                field: field.clone(),
            }),
        }
    }
}

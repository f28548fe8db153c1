//! Migration operations that describe schema changes.
//!
//! Each operation knows how to apply itself to the in-memory
//! [`ProjectState`] and how to describe itself in serializable form. No DDL
//! is produced; the operations are schema metadata only.

use crate::autodetect::{MigrationFieldDef, ModelOptions, ModelState, ProjectState};
use crate::serializer::SerializableOperation;

/// A single migration operation.
pub trait Operation: Send + Sync {
    /// Returns a human-readable description of this operation.
    fn describe(&self) -> String;

    /// Applies this operation to the in-memory project state.
    fn state_forwards(&self, app_label: &str, state: &mut ProjectState);

    /// Returns the serializable form of this operation.
    fn to_serializable(&self) -> SerializableOperation;
}

fn model_mut<'a>(
    state: &'a mut ProjectState,
    app_label: &str,
    model_name: &str,
    op: &dyn Operation,
) -> Option<&'a mut ModelState> {
    let model = state
        .models
        .get_mut(&(app_label.to_string(), model_name.to_string()));
    if model.is_none() {
        tracing::warn!(
            app_label,
            model = model_name,
            operation = %op.describe(),
            "operation targets a model missing from the project state"
        );
    }
    model
}

/// Creates a new model.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateModel {
    /// The model name.
    pub name: String,
    /// The fields of the new model, primary key first.
    pub fields: Vec<MigrationFieldDef>,
    /// Model-level options.
    pub options: ModelOptions,
}

impl Operation for CreateModel {
    fn describe(&self) -> String {
        format!("Create model {}", self.name)
    }

    fn state_forwards(&self, app_label: &str, state: &mut ProjectState) {
        let model = ModelState {
            app_label: app_label.to_string(),
            name: self.name.clone(),
            fields: self.fields.clone(),
            options: self.options.clone(),
        };
        state.add_model(model);
    }

    fn to_serializable(&self) -> SerializableOperation {
        SerializableOperation::CreateModel {
            name: self.name.clone(),
            fields: self.fields.clone(),
            options: self.options.clone(),
        }
    }
}

/// Deletes a model.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteModel {
    /// The model name to delete.
    pub name: String,
}

impl Operation for DeleteModel {
    fn describe(&self) -> String {
        format!("Delete model {}", self.name)
    }

    fn state_forwards(&self, app_label: &str, state: &mut ProjectState) {
        let key = (app_label.to_string(), self.name.clone());
        state.models.remove(&key);
    }

    fn to_serializable(&self) -> SerializableOperation {
        SerializableOperation::DeleteModel {
            name: self.name.clone(),
        }
    }
}

/// Adds a field to an existing model.
#[derive(Debug, Clone, PartialEq)]
pub struct AddField {
    /// The model name the field is added to.
    pub model_name: String,
    /// The new field.
    pub field: MigrationFieldDef,
}

impl Operation for AddField {
    fn describe(&self) -> String {
        format!("Add field {} to {}", self.field.name, self.model_name)
    }

    fn state_forwards(&self, app_label: &str, state: &mut ProjectState) {
        if let Some(model) = model_mut(state, app_label, &self.model_name, self) {
            model.fields.push(self.field.clone());
        }
    }

    fn to_serializable(&self) -> SerializableOperation {
        SerializableOperation::AddField {
            model_name: self.model_name.clone(),
            field: self.field.clone(),
        }
    }
}

/// Removes a field from a model.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoveField {
    /// The model name the field is removed from.
    pub model_name: String,
    /// The name of the field to remove.
    pub field_name: String,
}

impl Operation for RemoveField {
    fn describe(&self) -> String {
        format!("Remove field {} from {}", self.field_name, self.model_name)
    }

    fn state_forwards(&self, app_label: &str, state: &mut ProjectState) {
        if let Some(model) = model_mut(state, app_label, &self.model_name, self) {
            model.fields.retain(|f| f.name != self.field_name);
        }
    }

    fn to_serializable(&self) -> SerializableOperation {
        SerializableOperation::RemoveField {
            model_name: self.model_name.clone(),
            field_name: self.field_name.clone(),
        }
    }
}

/// Replaces a field's declaration, e.g. to change its dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct AlterField {
    /// The model name containing the field.
    pub model_name: String,
    /// The name of the field being altered.
    pub field_name: String,
    /// The new field definition.
    pub field: MigrationFieldDef,
}

impl Operation for AlterField {
    fn describe(&self) -> String {
        format!("Alter field {} on {}", self.field_name, self.model_name)
    }

    fn state_forwards(&self, app_label: &str, state: &mut ProjectState) {
        if let Some(model) = model_mut(state, app_label, &self.model_name, self) {
            if let Some(f) = model.fields.iter_mut().find(|f| f.name == self.field_name) {
                *f = self.field.clone();
            }
        }
    }

    fn to_serializable(&self) -> SerializableOperation {
        SerializableOperation::AlterField {
            model_name: self.model_name.clone(),
            field_name: self.field_name.clone(),
            field: self.field.clone(),
        }
    }
}

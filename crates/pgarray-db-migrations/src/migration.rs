//! Migrations and replay.
//!
//! A [`Migration`] is a named unit of schema change containing a sequence of
//! [`Operation`]s. Replaying migrations in order yields the
//! [`ProjectState`] they describe.

use pgarray_core::{PgArrayError, PgArrayResult};

use crate::autodetect::ProjectState;
use crate::operations::Operation;

/// A single migration containing a sequence of operations.
///
/// Migrations are identified by `(app_label, name)` and may declare
/// dependencies on other migrations. Operations within a migration
/// are applied in order.
pub struct Migration {
    /// The migration name (e.g., "0001_initial").
    pub name: String,
    /// The application label this migration belongs to.
    pub app_label: String,
    /// Dependencies on other migrations: `(app_label, migration_name)`.
    pub dependencies: Vec<(String, String)>,
    /// The operations to apply, in order.
    pub operations: Vec<Box<dyn Operation>>,
    /// Whether this is the initial migration for the app.
    pub initial: bool,
}

impl std::fmt::Debug for Migration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ops: Vec<String> = self.operations.iter().map(|op| op.describe()).collect();
        f.debug_struct("Migration")
            .field("app_label", &self.app_label)
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .field("initial", &self.initial)
            .field("operations", &ops)
            .finish()
    }
}

impl Migration {
    /// Creates a new migration.
    pub fn new(app_label: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            app_label: app_label.into(),
            dependencies: Vec::new(),
            operations: Vec::new(),
            initial: false,
        }
    }

    /// Marks this migration as the initial migration.
    pub fn initial(mut self) -> Self {
        self.initial = true;
        self
    }

    /// Adds a dependency on another migration.
    pub fn depends_on(mut self, app_label: impl Into<String>, name: impl Into<String>) -> Self {
        self.dependencies.push((app_label.into(), name.into()));
        self
    }

    /// Adds an operation to this migration.
    pub fn add_operation(mut self, op: Box<dyn Operation>) -> Self {
        self.operations.push(op);
        self
    }

    /// Returns the `(app_label, name)` key for this migration.
    pub fn key(&self) -> (String, String) {
        (self.app_label.clone(), self.name.clone())
    }

    /// Applies every operation to `state`, in order.
    pub fn apply(&self, state: &mut ProjectState) {
        tracing::debug!(
            app_label = %self.app_label,
            migration = %self.name,
            operations = self.operations.len(),
            "applying migration to project state"
        );
        for op in &self.operations {
            op.state_forwards(&self.app_label, state);
        }
    }
}

impl ProjectState {
    /// Replays `migrations`, in the given order, into a fresh state.
    ///
    /// # Errors
    ///
    /// Returns [`PgArrayError::ConfigurationError`] if a migration depends
    /// on one that was not applied before it.
    pub fn from_migrations(migrations: &[Migration]) -> PgArrayResult<Self> {
        let mut state = Self::new();
        let mut applied: Vec<(String, String)> = Vec::with_capacity(migrations.len());
        for migration in migrations {
            if let Some((app, name)) = migration
                .dependencies
                .iter()
                .find(|dep| !applied.contains(dep))
            {
                return Err(PgArrayError::ConfigurationError(format!(
                    "Migration {}.{} depends on {app}.{name}, which has not been applied",
                    migration.app_label, migration.name
                )));
            }
            migration.apply(&mut state);
            applied.push(migration.key());
        }
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autodetect::{MigrationFieldDef, ModelOptions};
    use crate::operations::{AddField, CreateModel};

    fn initial() -> Migration {
        Migration::new("blog", "0001_initial")
            .initial()
            .add_operation(Box::new(CreateModel {
                name: "post".into(),
                fields: vec![
                    MigrationFieldDef::auto_id(),
                    MigrationFieldDef::array("tags", "text"),
                ],
                options: ModelOptions::default(),
            }))
    }

    fn second() -> Migration {
        Migration::new("blog", "0002_scores")
            .depends_on("blog", "0001_initial")
            .add_operation(Box::new(AddField {
                model_name: "post".into(),
                field: MigrationFieldDef::array("scores", "int").dimension(2),
            }))
    }

    #[test]
    fn test_migration_builder() {
        let migration = second();
        assert_eq!(migration.key(), ("blog".to_string(), "0002_scores".to_string()));
        assert!(!migration.initial);
        assert_eq!(migration.dependencies.len(), 1);
        assert_eq!(migration.operations.len(), 1);
        assert!(initial().initial);
    }

    #[test]
    fn test_from_migrations() {
        let state = ProjectState::from_migrations(&[initial(), second()]).unwrap();
        let model = state.get_model("blog", "post").unwrap();
        let names: Vec<&str> = model.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["id", "tags", "scores"]);
    }

    #[test]
    fn test_from_migrations_requires_dependencies_first() {
        let err = ProjectState::from_migrations(&[second(), initial()]).unwrap_err();
        assert!(matches!(err, PgArrayError::ConfigurationError(_)));
    }

    #[test]
    fn test_debug_lists_operations() {
        let debug = format!("{:?}", initial());
        assert!(debug.contains("Create model post"));
    }
}

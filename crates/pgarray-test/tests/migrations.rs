//! The `pg_array_fields` migrations agree with the fixture models.

use pgarray_db_migrations::{MigrationFieldType, ProjectState, SerializableMigration};
use pgarray_test::pg_array_fields::migrations;
use pgarray_test::pg_array_fields::models::all_models;
use pgarray_test::pg_array_fields::APP_LABEL;

#[test]
fn test_models_have_no_unmigrated_changes() {
    let migrated = ProjectState::from_migrations(&migrations::all()).unwrap();
    let declared = ProjectState::from_models(all_models());
    let pending = declared.diff(&migrated);
    assert!(pending.is_empty(), "unmigrated changes: {pending:?}");
}

#[test]
fn test_initial_migration_field_declarations() {
    let state = ProjectState::from_migrations(&migrations::all()).unwrap();

    let int = state.get_model(APP_LABEL, "intmodel").unwrap();
    assert_eq!(int.db_table(), "pg_array_fields_intmodel");
    assert_eq!(
        int.get_field("field2").unwrap().field_type,
        MigrationFieldType::ArrayField {
            dbtype: "int".to_string(),
            dimension: 2,
            size: None,
        }
    );

    let id = int.get_field("id").unwrap();
    assert!(id.primary_key && id.auto_created && !id.serialize);

    let multi = state.get_model(APP_LABEL, "multitypemodel").unwrap();
    assert_eq!(
        multi.get_field("varchars").unwrap().db_type().as_deref(),
        Some("varchar(30)[]")
    );
}

#[test]
fn test_initial_migration_json() {
    let json = SerializableMigration::from_migration(&migrations::initial())
        .to_json()
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["name"], "0001_initial");
    assert_eq!(parsed["initial"], true);
    assert_eq!(parsed["operations"].as_array().map(Vec::len), Some(12));

    let item = parsed["operations"]
        .as_array()
        .unwrap()
        .iter()
        .find(|op| op["name"] == "item")
        .unwrap();
    assert_eq!(item["fields"][1]["default"]["type"], "callable");
    assert!(item["fields"][1]["default"]["value"]
        .as_str()
        .unwrap()
        .ends_with("defaultval"));

    let restored = SerializableMigration::from_json(&json).unwrap().to_migration();
    assert_eq!(
        ProjectState::from_migrations(&[restored]).unwrap(),
        ProjectState::from_migrations(&[migrations::initial()]).unwrap()
    );
}

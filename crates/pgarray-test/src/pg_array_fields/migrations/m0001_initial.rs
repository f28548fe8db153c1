//! `0001_initial`: creates every fixture model.
//!
//! Element types are spelled as they were declared (`int`, not `integer`),
//! so this migration also exercises dbtype normalization when compared with
//! the models.

use pgarray_db::value::{to_text, Value};
use pgarray_db_migrations::operations::CreateModel;
use pgarray_db_migrations::{Migration, MigrationFieldDef, ModelOptions};

use crate::pg_array_fields::models::defaultval;
use crate::pg_array_fields::APP_LABEL;

fn create(name: &str, fields: Vec<MigrationFieldDef>) -> Box<CreateModel> {
    let mut all = vec![MigrationFieldDef::auto_id()];
    all.extend(fields);
    Box::new(CreateModel {
        name: name.to_string(),
        fields: all,
        options: ModelOptions::default(),
    })
}

/// The initial migration of the `pg_array_fields` app.
pub fn initial() -> Migration {
    Migration::new(APP_LABEL, "0001_initial")
        .initial()
        .add_operation(create(
            "bytesarraymodel",
            vec![MigrationFieldDef::array("entries", "bytea")],
        ))
        .add_operation(create(
            "choicesmodel",
            vec![MigrationFieldDef::array("choices", "text").choices([("A", "A"), ("B", "B")])],
        ))
        .add_operation(create(
            "datemodel",
            vec![MigrationFieldDef::array("dates", "date")],
        ))
        .add_operation(create(
            "datetimemodel",
            vec![MigrationFieldDef::array("dates", "timestamp with time zone")],
        ))
        .add_operation(create(
            "doublemodel",
            vec![MigrationFieldDef::array("field", "double precision")],
        ))
        .add_operation(create(
            "intmodel",
            vec![
                MigrationFieldDef::array("field", "int"),
                MigrationFieldDef::array("field2", "int").dimension(2),
            ],
        ))
        .add_operation(create(
            "item",
            vec![MigrationFieldDef::array("tags", "text")
                .default_callable(std::any::type_name_of_val(&defaultval))],
        ))
        .add_operation(create(
            "item2",
            vec![MigrationFieldDef::array("tags", "text").default_literal(Vec::<Value>::new())],
        ))
        .add_operation(create(
            "macaddrmodel",
            vec![MigrationFieldDef::array("field", "macaddr")
                .type_cast(std::any::type_name_of_val(&to_text))],
        ))
        .add_operation(create(
            "mtextmodel",
            vec![MigrationFieldDef::array("data", "text").dimension(2)],
        ))
        .add_operation(create(
            "multitypemodel",
            vec![
                MigrationFieldDef::array("smallints", "smallint"),
                MigrationFieldDef::array("varchars", "varchar(30)"),
            ],
        ))
        .add_operation(create(
            "textmodel",
            vec![MigrationFieldDef::array("field", "text")],
        ))
}

//! The fixture models, one per supported array column declaration.
//!
//! Every model has an auto `id` primary key and stores each array column as
//! `Option<Vec<Value>>`: `None` is SQL NULL, `Some(vec![])` is `{}`.

use std::sync::LazyLock;

use pgarray_core::PgArrayResult;
use pgarray_db::executor::ModelLifecycleHooks;
use pgarray_db::fields::{ArrayField, AutoField};
use pgarray_db::model::{Model, ModelMeta};
use pgarray_db::row::Row;
use pgarray_db::value::{to_text, Value};

use super::APP_LABEL;

/// The default supplier of `Item.tags`: a fresh empty list per record.
pub fn defaultval() -> Vec<Value> {
    Vec::new()
}

macro_rules! array_model {
    (
        $(#[$doc:meta])*
        $model:ident ($model_name:literal) {
            $($field:ident => $decl:expr),+ $(,)?
        }
    ) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $model {
            /// Primary key, `None` until saved.
            pub id: Option<i64>,
            $(pub $field: Option<Vec<Value>>,)+
        }

        impl $model {
            /// Creates an unsaved record with every array field at its
            /// declared default.
            ///
            /// # Errors
            ///
            /// Returns a shape error if a default supplier returns a value
            /// that does not fit its field.
            pub fn with_defaults() -> PgArrayResult<Self> {
                let meta = Self::meta();
                Ok(Self {
                    id: None,
                    $($field: meta.default_for(stringify!($field))?,)+
                })
            }
        }

        impl Model for $model {
            fn meta() -> &'static ModelMeta {
                static META: LazyLock<ModelMeta> = LazyLock::new(|| {
                    ModelMeta::new(
                        APP_LABEL,
                        $model_name,
                        vec![AutoField::id().into(), $($decl.into()),+],
                    )
                });
                &META
            }

            fn pk(&self) -> Option<i64> {
                self.id
            }

            fn set_pk(&mut self, id: i64) {
                self.id = Some(id);
            }

            fn field_values(&self) -> Vec<(&'static str, Value)> {
                vec![
                    ("id", self.id.into()),
                    $((stringify!($field), self.$field.clone().into()),)+
                ]
            }

            fn from_row(row: &Row) -> PgArrayResult<Self> {
                let meta = Self::meta();
                Ok(Self {
                    id: row.get("id")?,
                    $($field: row.get_array(meta.array_field(stringify!($field))?)?,)+
                })
            }
        }

        impl ModelLifecycleHooks for $model {}
    };
}

array_model! {
    /// A `bytea[]` column.
    BytesArrayModel("bytesarraymodel") {
        entries => ArrayField::bytea("entries"),
    }
}

array_model! {
    /// A `text[]` column restricted to `A` and `B`.
    ChoicesModel("choicesmodel") {
        choices => ArrayField::text("choices").choices([("A", "A"), ("B", "B")]),
    }
}

array_model! {
    /// A `date[]` column.
    DateModel("datemodel") {
        dates => ArrayField::date("dates"),
    }
}

array_model! {
    /// A `timestamp with time zone[]` column.
    DateTimeModel("datetimemodel") {
        dates => ArrayField::datetime("dates"),
    }
}

array_model! {
    /// A `double precision[]` column.
    DoubleModel("doublemodel") {
        field => ArrayField::float("field"),
    }
}

array_model! {
    /// A flat and a two-dimensional `integer` array.
    IntModel("intmodel") {
        field => ArrayField::integer("field"),
        field2 => ArrayField::integer("field2").dimension(2),
    }
}

array_model! {
    /// A `text[]` column defaulting to [`defaultval`].
    Item("item") {
        tags => ArrayField::text("tags").default_fn(defaultval),
    }
}

array_model! {
    /// A `text[]` column defaulting to an empty literal.
    Item2("item2") {
        tags => ArrayField::text("tags").default_literal(vec![]),
    }
}

array_model! {
    /// A `macaddr[]` column whose elements load as text.
    MacAddrModel("macaddrmodel") {
        field => ArrayField::macaddr("field").type_cast(to_text),
    }
}

array_model! {
    /// A two-dimensional `text` array.
    MTextModel("mtextmodel") {
        data => ArrayField::text("data").dimension(2),
    }
}

array_model! {
    /// A `smallint[]` column and a `varchar(30)[]` column.
    MultiTypeModel("multitypemodel") {
        smallints => ArrayField::small_integer("smallints"),
        varchars => ArrayField::varchar("varchars", 30),
    }
}

array_model! {
    /// A `text[]` column.
    TextModel("textmodel") {
        field => ArrayField::text("field"),
    }
}

/// The metadata of every fixture model, in declaration order.
pub fn all_models() -> Vec<&'static ModelMeta> {
    vec![
        BytesArrayModel::meta(),
        ChoicesModel::meta(),
        DateModel::meta(),
        DateTimeModel::meta(),
        DoubleModel::meta(),
        IntModel::meta(),
        Item::meta(),
        Item2::meta(),
        MacAddrModel::meta(),
        MTextModel::meta(),
        MultiTypeModel::meta(),
        TextModel::meta(),
    ]
}

//! Save and load hooks for models with array columns.
//!
//! These free functions are the seam between a model and whatever stores its
//! rows. [`prepare_row`] validates and encodes every field and produces the
//! row to write; [`load_model`] rebuilds a model from a stored row.
//! Neither issues SQL.

use std::collections::HashMap;

use pgarray_core::logging::model_span;
use pgarray_core::{PgArrayError, PgArrayResult, ValidationError};

use crate::model::Model;
use crate::row::Row;

/// Optional lifecycle hooks around a save.
///
/// All methods have default no-op implementations, so you only need to
/// override the hooks you care about.
pub trait ModelLifecycleHooks: Model {
    /// Called before the row is prepared.
    /// Return `Err` to abort the save.
    fn on_pre_save(&self) -> PgArrayResult<()> {
        Ok(())
    }

    /// Called after the row was written successfully.
    fn on_post_save(&self) {
        // no-op
    }
}

/// Validates and encodes a model into the row to write (the save hook).
///
/// Array fields are validated, then encoded to their literal form; absent
/// arrays become `Value::Null`. The primary key is included as-is. Either
/// the whole row is produced or nothing is: the first failing field aborts
/// the preparation.
///
/// Validation failures are reported as a [`ValidationError`] whose
/// `field_errors` is keyed by the failing field's name.
///
/// # Errors
///
/// Returns the first field error: a [`PgArrayError::ValidationError`], or a
/// shape, range, or encoding error from the codec.
pub fn prepare_row<M: Model>(model: &M) -> PgArrayResult<Row> {
    let meta = M::meta();
    let span = model_span(M::table_name(), model.pk());
    let _guard = span.enter();

    let mut pairs = Vec::with_capacity(meta.fields.len());
    for (name, value) in model.field_values() {
        let field = meta.field(name).ok_or_else(|| {
            PgArrayError::ImproperlyConfigured(format!(
                "{} reports a value for undeclared field '{name}'",
                M::table_name()
            ))
        })?;
        let prepared = match field.as_array() {
            Some(array) => array
                .get_db_prep_value(&value)
                .map_err(|err| attach_field(name, err))?,
            None => value,
        };
        pairs.push((field.column().to_string(), prepared));
    }

    tracing::debug!(columns = pairs.len(), "prepared row");
    Ok(Row::from_pairs(pairs))
}

fn attach_field(name: &str, err: PgArrayError) -> PgArrayError {
    match err {
        PgArrayError::ValidationError(inner) => {
            let mut field_errors = HashMap::new();
            field_errors.insert(name.to_string(), vec![inner]);
            PgArrayError::ValidationError(ValidationError::with_field_errors(field_errors))
        }
        other => other,
    }
}

/// Rebuilds a model from a stored row (the load hook).
///
/// # Errors
///
/// Returns any error from [`Model::from_row`], typically a decoding error
/// for an array column.
pub fn load_model<M: Model>(row: &Row) -> PgArrayResult<M> {
    let model = M::from_row(row);
    if let Err(err) = &model {
        tracing::debug!(table = M::table_name(), error = %err, "failed to load row");
    }
    model
}

/// Runs the save hooks around a write.
///
/// Calls `on_pre_save`, prepares the row, hands it to `write` (which
/// returns the stored primary key), sets the key on the model, and calls
/// `on_post_save`. If any step fails the model is left unchanged.
///
/// # Errors
///
/// Returns the first error from the pre-save hook, row preparation, or
/// `write`.
pub fn save_row_with_hooks<M, W>(model: &mut M, write: W) -> PgArrayResult<i64>
where
    M: ModelLifecycleHooks,
    W: FnOnce(Row) -> PgArrayResult<i64>,
{
    model.on_pre_save()?;
    let row = prepare_row(model)?;
    let pk = write(row)?;
    model.set_pk(pk);
    model.on_post_save();
    Ok(pk)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::LazyLock;

    use super::*;
    use crate::fields::{ArrayField, AutoField};
    use crate::model::ModelMeta;
    use crate::value::Value;

    struct Tagged {
        id: Option<i64>,
        tags: Option<Vec<Value>>,
        scores: Option<Vec<Value>>,
    }

    static SAVES: AtomicUsize = AtomicUsize::new(0);

    impl Model for Tagged {
        fn meta() -> &'static ModelMeta {
            static META: LazyLock<ModelMeta> = LazyLock::new(|| {
                ModelMeta::new(
                    "tests",
                    "tagged",
                    vec![
                        AutoField::id().into(),
                        ArrayField::text("tags").choices([("A", "A"), ("B", "B")]).into(),
                        ArrayField::small_integer("scores").column("score_list").into(),
                    ],
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
                ("tags", self.tags.clone().into()),
                ("scores", self.scores.clone().into()),
            ]
        }

        fn from_row(row: &Row) -> PgArrayResult<Self> {
            let meta = Self::meta();
            Ok(Self {
                id: row.get("id")?,
                tags: row.get_array(meta.array_field("tags")?)?,
                scores: row.get_array(meta.array_field("scores")?)?,
            })
        }
    }

    impl ModelLifecycleHooks for Tagged {
        fn on_post_save(&self) {
            SAVES.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn tagged(tags: &[&str], scores: &[i64]) -> Tagged {
        Tagged {
            id: None,
            tags: Some(tags.iter().map(|t| Value::from(*t)).collect()),
            scores: Some(scores.iter().copied().map(Value::Int).collect()),
        }
    }

    #[test]
    fn test_prepare_row_encodes_arrays() {
        let row = prepare_row(&tagged(&["A", "B"], &[1, 2])).unwrap();
        assert_eq!(row.columns(), &["id", "tags", "score_list"]);
        assert_eq!(row.get_value("id"), Some(&Value::Null));
        assert_eq!(row.get::<String>("tags").unwrap(), r#"{"A","B"}"#);
        assert_eq!(row.get::<String>("score_list").unwrap(), "{1,2}");
    }

    #[test]
    fn test_prepare_row_keeps_null_distinct_from_empty() {
        let model = Tagged {
            id: Some(3),
            tags: None,
            scores: Some(vec![]),
        };
        let row = prepare_row(&model).unwrap();
        assert_eq!(row.get_value("tags"), Some(&Value::Null));
        assert_eq!(row.get::<String>("score_list").unwrap(), "{}");
        assert_eq!(row.get::<i64>("id").unwrap(), 3);
    }

    #[test]
    fn test_prepare_row_reports_field_errors() {
        let err = prepare_row(&tagged(&["A", "C"], &[])).unwrap_err();
        match err {
            PgArrayError::ValidationError(v) => {
                let errors = &v.field_errors["tags"];
                assert_eq!(errors[0].code, "invalid_choice");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_prepare_row_range_error_is_not_wrapped() {
        let err = prepare_row(&tagged(&[], &[40000])).unwrap_err();
        assert!(matches!(err, PgArrayError::RangeError { .. }));
    }

    #[test]
    fn test_load_model_round_trip() {
        let row = prepare_row(&tagged(&["B"], &[-5])).unwrap();
        let stored = Row::from_pairs(
            row.columns()
                .iter()
                .cloned()
                .zip(row.values().iter().cloned())
                .map(|(c, v)| if c == "id" { (c, Value::Int(1)) } else { (c, v) }),
        );
        let loaded: Tagged = load_model(&stored).unwrap();
        assert_eq!(loaded.id, Some(1));
        assert_eq!(loaded.tags, Some(vec![Value::from("B")]));
        assert_eq!(loaded.scores, Some(vec![Value::Int(-5)]));
    }

    #[test]
    fn test_load_model_decoding_error() {
        let row = Row::from_pairs([
            ("id", Value::Int(1)),
            ("tags", Value::from("{\"A\"")),
            ("score_list", Value::Null),
        ]);
        assert!(matches!(
            load_model::<Tagged>(&row),
            Err(PgArrayError::DecodingError { .. })
        ));
    }

    #[test]
    fn test_save_row_with_hooks() {
        let before = SAVES.load(Ordering::SeqCst);
        let mut model = tagged(&["A"], &[1]);
        let pk = save_row_with_hooks(&mut model, |row| {
            assert_eq!(row.len(), 3);
            Ok(42)
        })
        .unwrap();
        assert_eq!(pk, 42);
        assert_eq!(model.id, Some(42));
        assert!(SAVES.load(Ordering::SeqCst) > before);
    }

    #[test]
    fn test_save_row_with_hooks_leaves_model_on_failure() {
        let mut model = tagged(&["Z"], &[1]);
        let result = save_row_with_hooks(&mut model, |_| Ok(1));
        assert!(result.is_err());
        assert_eq!(model.id, None);
    }
}

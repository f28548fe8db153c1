//! End-to-end tests over the `pg_array_fields` fixture app.
//!
//! Every fixture model is saved into a [`MemoryTable`], which stores the
//! encoded literal exactly as a database would receive it, and then loaded
//! back through the decode hook.

use chrono::{NaiveDate, TimeZone, Utc};
use pgarray_core::PgArrayError;
use pgarray_db::row::Row;
use pgarray_db::value::Value;
use pgarray_db::Model;
use pgarray_test::pg_array_fields::models::{
    BytesArrayModel, ChoicesModel, DateModel, DateTimeModel, DoubleModel, IntModel, Item, Item2,
    MTextModel, MacAddrModel, MultiTypeModel, TextModel,
};
use pgarray_test::{init_test_logging, MemoryTable};

fn texts(items: &[&str]) -> Vec<Value> {
    items.iter().map(|s| Value::from(*s)).collect()
}

fn ints(items: &[i64]) -> Vec<Value> {
    items.iter().copied().map(Value::Int).collect()
}

fn stored_literal<M: Model>(table: &MemoryTable<M>, pk: i64, column: &str) -> Option<String> {
    table.raw(pk).unwrap().unwrap().get::<Option<String>>(column).unwrap()
}

// ============================================================================
// Integer arrays
// ============================================================================

#[test]
fn test_int_model_round_trip() {
    init_test_logging();
    let table = MemoryTable::<IntModel>::new();
    let mut record = IntModel {
        field: Some(ints(&[1, 2, 3])),
        field2: Some(vec![Value::List(ints(&[1, 2])), Value::List(ints(&[3, 4]))]),
        ..IntModel::default()
    };
    let pk = table.save(&mut record).unwrap();

    assert_eq!(stored_literal(&table, pk, "field").as_deref(), Some("{1,2,3}"));
    assert_eq!(stored_literal(&table, pk, "field2").as_deref(), Some("{{1,2},{3,4}}"));
    assert_eq!(table.get(pk).unwrap(), Some(record));
}

#[test]
fn test_int_model_reads_literal_written_elsewhere() {
    let table = MemoryTable::<IntModel>::new();
    let pk = table
        .insert_raw(Row::from_pairs([
            ("field", Value::from("{1,2,3}")),
            ("field2", Value::from("[1:2][1:1]={{5},{6}}")),
        ]))
        .unwrap();
    let record = table.get(pk).unwrap().unwrap();
    assert_eq!(record.field, Some(ints(&[1, 2, 3])));
    assert_eq!(
        record.field2,
        Some(vec![Value::List(ints(&[5])), Value::List(ints(&[6]))])
    );
}

#[test]
fn test_flat_value_in_two_dimensional_field_is_rejected() {
    let table = MemoryTable::<IntModel>::new();
    let mut record = IntModel {
        field2: Some(ints(&[1, 2])),
        ..IntModel::default()
    };
    let err = table.save(&mut record).unwrap_err();
    assert!(matches!(err, PgArrayError::ShapeError(_)), "{err:?}");
    assert_eq!(table.count().unwrap(), 0);
}

#[test]
fn test_ragged_two_dimensional_value_is_rejected() {
    let table = MemoryTable::<IntModel>::new();
    let mut record = IntModel {
        field2: Some(vec![Value::List(ints(&[1, 2])), Value::List(ints(&[3]))]),
        ..IntModel::default()
    };
    assert!(matches!(
        table.save(&mut record),
        Err(PgArrayError::ShapeError(_))
    ));
}

#[test]
fn test_malformed_stored_literal_fails_to_load() {
    let table = MemoryTable::<IntModel>::new();
    let pk = table
        .insert_raw(Row::from_pairs([
            ("field", Value::from("{1,2")),
            ("field2", Value::Null),
        ]))
        .unwrap();
    match table.get(pk) {
        Err(PgArrayError::DecodingError { literal, spec, .. }) => {
            assert_eq!(literal, "{1,2");
            assert_eq!(spec, "integer[]");
        }
        other => panic!("expected a decoding error, got {other:?}"),
    }
}

// ============================================================================
// Absence vs. empty
// ============================================================================

#[test]
fn test_null_and_empty_are_distinct() {
    let table = MemoryTable::<TextModel>::new();
    let mut absent = TextModel::default();
    let mut empty = TextModel {
        field: Some(vec![]),
        ..TextModel::default()
    };
    let absent_pk = table.save(&mut absent).unwrap();
    let empty_pk = table.save(&mut empty).unwrap();

    assert_eq!(stored_literal(&table, absent_pk, "field"), None);
    assert_eq!(stored_literal(&table, empty_pk, "field").as_deref(), Some("{}"));
    assert_eq!(table.get(absent_pk).unwrap().unwrap().field, None);
    assert_eq!(table.get(empty_pk).unwrap().unwrap().field, Some(vec![]));
}

// ============================================================================
// Text arrays
// ============================================================================

#[test]
fn test_text_model_quotes_and_escapes() {
    let table = MemoryTable::<TextModel>::new();
    let mut record = TextModel {
        field: Some(vec![
            Value::from("plain"),
            Value::from("with, comma"),
            Value::from(r#"say "hi""#),
            Value::from(r"back\slash"),
            Value::from("NULL"),
            Value::Null,
        ]),
        ..TextModel::default()
    };
    let pk = table.save(&mut record).unwrap();
    assert_eq!(
        stored_literal(&table, pk, "field").as_deref(),
        Some(r#"{"plain","with, comma","say \"hi\"","back\\slash","NULL",NULL}"#)
    );
    assert_eq!(table.get(pk).unwrap(), Some(record));
}

#[test]
fn test_mtext_model_two_dimensions() {
    let table = MemoryTable::<MTextModel>::new();
    let pk = table
        .insert_raw(Row::from_pairs([(
            "data",
            Value::from(r#"{{"a","b"},{"c","d"}}"#),
        )]))
        .unwrap();
    let record = table.get(pk).unwrap().unwrap();
    assert_eq!(
        record.data,
        Some(vec![
            Value::List(texts(&["a", "b"])),
            Value::List(texts(&["c", "d"])),
        ])
    );

    let mut copy = MTextModel {
        id: None,
        data: record.data.clone(),
    };
    let copy_pk = table.save(&mut copy).unwrap();
    assert_eq!(
        stored_literal(&table, copy_pk, "data").as_deref(),
        Some(r#"{{"a","b"},{"c","d"}}"#)
    );
}

#[test]
fn test_choices_model() {
    let table = MemoryTable::<ChoicesModel>::new();
    let mut valid = ChoicesModel {
        choices: Some(texts(&["A", "B", "A"])),
        ..ChoicesModel::default()
    };
    let pk = table.save(&mut valid).unwrap();
    assert_eq!(table.get(pk).unwrap(), Some(valid));

    let mut invalid = ChoicesModel {
        choices: Some(texts(&["A", "C"])),
        ..ChoicesModel::default()
    };
    match table.save(&mut invalid) {
        Err(PgArrayError::ValidationError(err)) => {
            let errors = &err.field_errors["choices"];
            assert_eq!(errors[0].code, "invalid_choice");
            assert!(errors[0].message.contains('C'));
        }
        other => panic!("expected a validation error, got {other:?}"),
    }
    assert_eq!(table.count().unwrap(), 1);
}

// ============================================================================
// Defaults
// ============================================================================

#[test]
fn test_item_default_supplier_gives_independent_values() {
    let mut first = Item::with_defaults().unwrap();
    let second = Item::with_defaults().unwrap();
    first.tags.as_mut().unwrap().push(Value::from("x"));
    assert_eq!(second.tags, Some(vec![]));

    let table = MemoryTable::<Item>::new();
    let pk = table.save(&mut first).unwrap();
    assert_eq!(stored_literal(&table, pk, "tags").as_deref(), Some(r#"{"x"}"#));
}

#[test]
fn test_item2_literal_default_is_never_shared() {
    let mut first = Item2::with_defaults().unwrap();
    first.tags.as_mut().unwrap().push(Value::from("mutated"));
    let second = Item2::with_defaults().unwrap();
    assert_eq!(second.tags, Some(vec![]));

    let table = MemoryTable::<Item2>::new();
    let mut fresh = second;
    let pk = table.save(&mut fresh).unwrap();
    assert_eq!(stored_literal(&table, pk, "tags").as_deref(), Some("{}"));
}

// ============================================================================
// Numeric, temporal, binary and network types
// ============================================================================

#[test]
fn test_double_model_round_trip() {
    let table = MemoryTable::<DoubleModel>::new();
    let mut record = DoubleModel {
        field: Some(vec![
            Value::Float(1.5),
            Value::Float(-0.25),
            Value::Float(1e-10),
            Value::Float(f64::INFINITY),
        ]),
        ..DoubleModel::default()
    };
    let pk = table.save(&mut record).unwrap();
    assert_eq!(
        stored_literal(&table, pk, "field").as_deref(),
        Some("{1.5,-0.25,0.0000000001,Infinity}")
    );
    assert_eq!(table.get(pk).unwrap(), Some(record));
}

#[test]
fn test_multi_type_model() {
    let table = MemoryTable::<MultiTypeModel>::new();
    let mut record = MultiTypeModel {
        smallints: Some(ints(&[-32768, 0, 32767])),
        varchars: Some(texts(&["short", "also short"])),
        ..MultiTypeModel::default()
    };
    let pk = table.save(&mut record).unwrap();
    assert_eq!(table.get(pk).unwrap(), Some(record));
}

#[test]
fn test_multi_type_model_smallint_out_of_range() {
    let table = MemoryTable::<MultiTypeModel>::new();
    let mut record = MultiTypeModel {
        smallints: Some(ints(&[40000])),
        ..MultiTypeModel::default()
    };
    assert!(matches!(
        table.save(&mut record),
        Err(PgArrayError::RangeError { .. })
    ));
}

#[test]
fn test_multi_type_model_varchar_too_long() {
    let table = MemoryTable::<MultiTypeModel>::new();
    let mut record = MultiTypeModel {
        varchars: Some(vec![Value::from("x".repeat(31))]),
        ..MultiTypeModel::default()
    };
    match table.save(&mut record) {
        Err(PgArrayError::ValidationError(err)) => {
            assert_eq!(err.field_errors["varchars"][0].code, "max_length");
        }
        other => panic!("expected a validation error, got {other:?}"),
    }
}

#[test]
fn test_date_model_round_trip() {
    let table = MemoryTable::<DateModel>::new();
    let mut record = DateModel {
        dates: Some(vec![
            Value::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()),
            Value::Date(NaiveDate::from_ymd_opt(1999, 12, 31).unwrap()),
        ]),
        ..DateModel::default()
    };
    let pk = table.save(&mut record).unwrap();
    assert_eq!(
        stored_literal(&table, pk, "dates").as_deref(),
        Some("{2024-02-29,1999-12-31}")
    );
    assert_eq!(table.get(pk).unwrap(), Some(record));
}

#[test]
fn test_datetime_model_round_trip() {
    let table = MemoryTable::<DateTimeModel>::new();
    let moment = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    let mut record = DateTimeModel {
        dates: Some(vec![Value::DateTimeTz(moment)]),
        ..DateTimeModel::default()
    };
    let pk = table.save(&mut record).unwrap();
    assert_eq!(
        stored_literal(&table, pk, "dates").as_deref(),
        Some(r#"{"2024-01-02 03:04:05+00"}"#)
    );
    assert_eq!(table.get(pk).unwrap(), Some(record));
}

#[test]
fn test_datetime_model_normalizes_offsets_to_utc() {
    let table = MemoryTable::<DateTimeModel>::new();
    let pk = table
        .insert_raw(Row::from_pairs([(
            "dates",
            Value::from(r#"{"2024-01-02 05:04:05+02"}"#),
        )]))
        .unwrap();
    let record = table.get(pk).unwrap().unwrap();
    assert_eq!(
        record.dates,
        Some(vec![Value::DateTimeTz(
            Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
        )])
    );
}

#[test]
fn test_bytes_array_model_round_trip() {
    let table = MemoryTable::<BytesArrayModel>::new();
    let mut record = BytesArrayModel {
        entries: Some(vec![
            Value::Bytes(vec![0x00, 0x0a, 0xff]),
            Value::Bytes(Vec::new()),
        ]),
        ..BytesArrayModel::default()
    };
    let pk = table.save(&mut record).unwrap();
    assert_eq!(
        stored_literal(&table, pk, "entries").as_deref(),
        Some(r#"{"\\x000aff","\\x"}"#)
    );
    assert_eq!(table.get(pk).unwrap(), Some(record));
}

#[test]
fn test_macaddr_model_loads_text() {
    let table = MemoryTable::<MacAddrModel>::new();
    let mut record = MacAddrModel {
        field: Some(vec![
            Value::from("08-00-2B-01-02-03"),
            Value::MacAddr([0xde, 0xad, 0xbe, 0xef, 0x00, 0x01]),
        ]),
        ..MacAddrModel::default()
    };
    let pk = table.save(&mut record).unwrap();
    assert_eq!(
        stored_literal(&table, pk, "field").as_deref(),
        Some("{08:00:2b:01:02:03,de:ad:be:ef:00:01}")
    );
    let mut loaded = table.get(pk).unwrap().unwrap();
    assert_eq!(
        loaded.field,
        Some(vec![
            Value::from("08:00:2b:01:02:03"),
            Value::from("de:ad:be:ef:00:01"),
        ])
    );

    loaded.field.as_mut().unwrap().push(Value::Null);
    table.save(&mut loaded).unwrap();
    let reloaded = table.get(pk).unwrap().unwrap();
    assert_eq!(reloaded, loaded);
    assert!(reloaded
        .field
        .unwrap()
        .iter()
        .all(|v| v.is_null() || matches!(v, Value::String(_))));
}

#[test]
fn test_macaddr_model_rejects_garbage() {
    let table = MemoryTable::<MacAddrModel>::new();
    let mut record = MacAddrModel {
        field: Some(vec![Value::from("not a mac")]),
        ..MacAddrModel::default()
    };
    assert!(matches!(
        table.save(&mut record),
        Err(PgArrayError::EncodingError(_))
    ));
}

//! An in-memory table for exercising the save and load hooks.
//!
//! [`MemoryTable`] stores the [`Row`]s that
//! [`prepare_row`](pgarray_db::executor::prepare_row) produces, exactly as a
//! database would receive them: array columns hold their encoded literal
//! text or `Null`. Loading goes back through the model's
//! [`from_row`](Model::from_row), so every round trip runs the codec in both
//! directions.
//!
//! ## Example
//!
//! ```
//! use pgarray_db::value::Value;
//! use pgarray_test::pg_array_fields::models::IntModel;
//! use pgarray_test::MemoryTable;
//!
//! let table = MemoryTable::<IntModel>::new();
//! let mut record = IntModel {
//!     field: Some(vec![Value::Int(1), Value::Int(2)]),
//!     ..IntModel::default()
//! };
//! let pk = table.save(&mut record).unwrap();
//! assert_eq!(table.raw(pk).unwrap().unwrap().get::<String>("field").unwrap(), "{1,2}");
//! ```

use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use pgarray_core::logging::model_span;
use pgarray_core::{PgArrayError, PgArrayResult};
use pgarray_db::executor::{load_model, save_row_with_hooks, ModelLifecycleHooks};
use pgarray_db::model::Model;
use pgarray_db::row::Row;
use pgarray_db::value::Value;

/// An in-memory table of rows for model `M`, keyed by primary key.
///
/// Primary keys are assigned from a counter starting at 1. A query counter
/// records every read and write for assertions.
pub struct MemoryTable<M> {
    rows: Mutex<BTreeMap<i64, Row>>,
    next_id: AtomicI64,
    query_count: AtomicUsize,
    _model: PhantomData<fn() -> M>,
}

impl<M: Model> Default for MemoryTable<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Model> MemoryTable<M> {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
            query_count: AtomicUsize::new(0),
            _model: PhantomData,
        }
    }

    /// Saves a record, inserting it if it has no primary key and replacing
    /// the stored row otherwise. Returns the primary key.
    ///
    /// # Errors
    ///
    /// Returns any validation or encoding error; nothing is stored then.
    pub fn save(&self, model: &mut M) -> PgArrayResult<i64>
    where
        M: ModelLifecycleHooks,
    {
        let existing = model.pk();
        save_row_with_hooks(model, |row| {
            let pk = existing.unwrap_or_else(|| self.next_id.fetch_add(1, Ordering::SeqCst));
            self.store(pk, row)?;
            Ok(pk)
        })
    }

    /// Stores a row written by some other client, assigning it a primary key.
    ///
    /// The row is stored as given; any primary key column it carries is
    /// overwritten.
    ///
    /// # Errors
    ///
    /// Returns an error if the table lock is poisoned.
    pub fn insert_raw(&self, row: Row) -> PgArrayResult<i64> {
        let pk = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.store(pk, row)?;
        Ok(pk)
    }

    /// Loads the record with the given primary key.
    ///
    /// # Errors
    ///
    /// Returns a decoding error if the stored row does not fit the model.
    pub fn get(&self, pk: i64) -> PgArrayResult<Option<M>> {
        let span = model_span(M::table_name(), Some(pk));
        let _guard = span.enter();

        let Some(row) = self.raw(pk)? else {
            tracing::debug!("no such row");
            return Ok(None);
        };
        let model = load_model::<M>(&row)?;
        tracing::debug!("loaded row");
        Ok(Some(model))
    }

    /// Loads every record, in primary key order.
    ///
    /// # Errors
    ///
    /// Returns the first decoding error.
    pub fn all(&self) -> PgArrayResult<Vec<M>> {
        let rows: Vec<Row> = self.lock()?.values().cloned().collect();
        self.query_count.fetch_add(1, Ordering::Relaxed);
        rows.iter().map(load_model::<M>).collect()
    }

    /// Returns a copy of the stored row, without decoding it.
    ///
    /// # Errors
    ///
    /// Returns an error if the table lock is poisoned.
    pub fn raw(&self, pk: i64) -> PgArrayResult<Option<Row>> {
        self.query_count.fetch_add(1, Ordering::Relaxed);
        Ok(self.lock()?.get(&pk).cloned())
    }

    /// Returns the number of stored rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the table lock is poisoned.
    pub fn count(&self) -> PgArrayResult<usize> {
        Ok(self.lock()?.len())
    }

    /// Returns the number of reads and writes so far.
    pub fn query_count(&self) -> usize {
        self.query_count.load(Ordering::Relaxed)
    }

    fn store(&self, pk: i64, row: Row) -> PgArrayResult<()> {
        let pk_column = M::pk_field_name();
        let mut pairs = vec![(pk_column.to_string(), Value::Int(pk))];
        pairs.extend(
            row.columns()
                .iter()
                .cloned()
                .zip(row.values().iter().cloned())
                .filter(|(column, _)| column != pk_column),
        );

        let span = model_span(M::table_name(), Some(pk));
        let _guard = span.enter();
        self.query_count.fetch_add(1, Ordering::Relaxed);
        let replaced = self.lock()?.insert(pk, Row::from_pairs(pairs)).is_some();
        tracing::debug!(replaced, "stored row");
        Ok(())
    }

    fn lock(&self) -> PgArrayResult<MutexGuard<'_, BTreeMap<i64, Row>>> {
        self.rows
            .lock()
            .map_err(|e| PgArrayError::DatabaseError(format!("Table lock poisoned: {e}")))
    }
}

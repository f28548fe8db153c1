//! # pgarray-rs
//!
//! PostgreSQL array columns as first-class model fields.
//!
//! This is the meta-crate that re-exports all sub-crates for convenient access.
//! You can depend on `pgarray-rs` to get everything, or depend on individual
//! crates for finer-grained control.
//!
//! ```
//! use pgarray_rs::db::fields::ArraySpec;
//! use pgarray_rs::db::{decode, encode, Value};
//!
//! let spec = ArraySpec::from_dbtype("int").unwrap().dimension(2);
//! let grid = decode("{{1,2},{3,4}}", &spec).unwrap();
//! assert_eq!(grid[1], Value::list([3_i64, 4]));
//! assert_eq!(encode(&grid, &spec).unwrap(), "{{1,2},{3,4}}");
//! ```

/// Core types: errors, settings, and logging setup.
pub use pgarray_core as core;

/// Array codec, `ArrayField`, the `Model` trait, and persistence hooks.
#[cfg(feature = "db")]
pub use pgarray_db as db;

/// Migration metadata and auto-detection.
#[cfg(feature = "db-migrations")]
pub use pgarray_db_migrations as db_migrations;

/// Fixture app and test utilities.
#[cfg(feature = "testing")]
pub use pgarray_test as test;

// Third-party re-exports
pub use chrono;
pub use serde;
pub use serde_json;
pub use tracing;
pub use tracing_subscriber;


//! # pgarray-test
//!
//! Fixture app and test utilities for pgarray-rs. Provides the
//! [`pg_array_fields`] app (one model per supported array column type plus
//! its initial migration) and [`MemoryTable`](memory_table::MemoryTable), an
//! in-memory table that stores rows of encoded literals so tests can run the
//! full save and load cycle without a database.

#![allow(clippy::result_large_err)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_const_for_fn)]

pub mod memory_table;
pub mod pg_array_fields;

use pgarray_core::logging::setup_logging;
use pgarray_core::Settings;

pub use memory_table::MemoryTable;

/// Returns settings with the fixture app installed.
pub fn test_settings() -> Settings {
    Settings {
        installed_apps: vec![pg_array_fields::APP_LABEL.to_string()],
        ..Settings::default()
    }
}

/// Installs a tracing subscriber for tests. Safe to call from every test.
pub fn init_test_logging() {
    setup_logging(&test_settings());
}

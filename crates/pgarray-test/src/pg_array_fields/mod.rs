//! The `pg_array_fields` fixture app.
//!
//! One model per array column declaration the field layer supports, and the
//! `0001_initial` migration that creates them.

pub mod migrations;
pub mod models;

/// The app label shared by every fixture model.
pub const APP_LABEL: &str = "pg_array_fields";

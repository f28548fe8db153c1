//! # pgarray-db-migrations
//!
//! Migration metadata for pgarray-rs. Describes models with array columns as
//! migration operations, replays migrations into a [`ProjectState`], and
//! compares that state with the models declared in code.
//!
//! ## Architecture
//!
//! - [`Migration`] is a named set of [`Operation`]s belonging to an app.
//! - [`ProjectState`] is the model state a sequence of migrations produces.
//! - [`MigrationAutodetector`] diffs two [`ProjectState`]s to produce operations.
//! - [`SerializableMigration`](serializer::SerializableMigration) is the JSON form.
//!
//! No DDL is generated or executed here.
//!
//! ## Module Overview
//!
//! - [`migration`] - `Migration`
//! - [`operations`] - `Operation` trait and the model/field operations
//! - [`autodetect`] - `MigrationAutodetector`, `ProjectState`, `ModelState`, `MigrationFieldDef`
//! - [`serializer`] - JSON serialization of migrations

#![allow(clippy::result_large_err)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::struct_excessive_bools)]

pub mod autodetect;
pub mod migration;
pub mod operations;
pub mod serializer;

// Re-export key types at the crate root.
pub use autodetect::{
    MigrationAutodetector, MigrationFieldDef, MigrationFieldType, ModelOptions, ModelState,
    ProjectState,
};
pub use migration::Migration;
pub use operations::Operation;
pub use serializer::{SerializableMigration, SerializableOperation};

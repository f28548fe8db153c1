//! # pgarray-db
//!
//! ORM layer for PostgreSQL array columns. Provides the array [`codec`] that
//! translates between PostgreSQL's array text format and nested [`Value`]
//! sequences, the [`ArrayField`](fields::ArrayField) descriptor that binds an
//! [`ArraySpec`](fields::ArraySpec) to a model column, and the
//! [`Model`](model::Model) trait with the load/save hooks that call them.
//!
//! ## Architecture
//!
//! There is no inheritance-based hook dispatch. A persistence layer reads a
//! [`Row`](row::Row) and asks each array field to decode its column
//! ([`Row::get_array`](row::Row::get_array)), and on save calls
//! [`prepare_row`](executor::prepare_row), which validates and encodes every
//! field before producing a row. Either the whole row is produced or an
//! error is returned.
//!
//! ## Module Overview
//!
//! - [`value`] - The backend-agnostic [`Value`](value::Value) enum
//! - [`codec`] - Array literal `encode` / `decode`
//! - [`fields`] - `ElementKind`, `ArraySpec`, `ArrayField`, `FieldDef`
//! - [`model`] - The [`Model`](model::Model) trait and [`ModelMeta`](model::ModelMeta)
//! - [`row`] - Database rows and typed column access
//! - [`executor`] - Save/load hooks and lifecycle callbacks
//! - [`validators`] - Field validators

// - result_large_err: PgArrayError is the workspace error type and is used consistently
// - doc_markdown: backtick requirements for documentation items are too strict
// - return_self_not_must_use: builder pattern methods are self-documenting
#![allow(clippy::result_large_err)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::match_same_arms)]

pub mod codec;
pub mod executor;
pub mod fields;
pub mod model;
pub mod row;
pub mod validators;
pub mod value;

// Re-export the most commonly used types at the crate root.
pub use codec::{decode, decode_column, encode, encode_column};
pub use executor::{load_model, prepare_row, save_row_with_hooks, ModelLifecycleHooks};
pub use fields::{
    ArrayDefault, ArrayField, ArraySpec, AutoField, DefaultDescription, ElementCast, ElementKind,
    FieldDeconstruction, FieldDef, MAX_DIMENSIONS,
};
pub use model::{Model, ModelMeta};
pub use pgarray_core::settings::ChoiceMode;
pub use row::{FromValue, Row};
pub use validators::Validator;
pub use value::Value;

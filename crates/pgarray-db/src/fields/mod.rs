//! Field definitions for array columns.
//!
//! This module provides [`ElementKind`] and [`ArraySpec`], which describe an
//! array column's element type and shape, and [`ArrayField`], which binds a
//! spec to a model attribute together with its choices, default, and
//! validators. [`FieldDef`] is the per-field entry of a model's metadata.

pub mod array;
pub mod types;

pub use array::{ArrayDefault, ArrayField, DefaultDescription, ElementCast, FieldDeconstruction};
pub use types::{ArraySpec, AutoField, ElementKind, FieldDef, MAX_DIMENSIONS};

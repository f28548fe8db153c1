//! # pgarray-core
//!
//! Core types for the pgarray-rs workspace: the shared error enum, settings
//! and their loaders, and tracing setup. This crate has no dependency on the
//! ORM crates and is the foundation for all of them.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`settings`] - Workspace settings and the global configuration slot
//! - [`settings_loader`] - Loading settings from TOML, JSON, and the environment
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;

// Re-export the most commonly used types at the crate root.
pub use error::{PgArrayError, PgArrayResult, ValidationError};
pub use settings::{ChoiceMode, CodecSettings, Settings, SETTINGS};

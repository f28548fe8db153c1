//! Settings for pgarray-rs.
//!
//! This module provides the [`Settings`] struct, which holds workspace-wide
//! configuration, and [`LazySettings`], a globally-accessible, lazily-initialized
//! settings instance. Field declarations consult the global settings (when
//! configured) for codec defaults such as rectangularity.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// How a field's `choices` constrain an array value.
///
/// Per-element validation is the primary mode: every leaf scalar must be one
/// of the allowed values. Whole-array validation treats the rendered literal
/// of the entire array as a single token that must match a choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChoiceMode {
    /// Every leaf scalar must be an allowed value.
    #[default]
    PerElement,
    /// The encoded literal of the whole array must be an allowed value.
    WholeArray,
}

/// Array codec defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodecSettings {
    /// Whether sibling sub-arrays must share a length (PostgreSQL enforces this).
    pub require_rectangular: bool,
    /// The choice mode used by fields that do not set one explicitly.
    pub default_choice_mode: ChoiceMode,
}

impl Default for CodecSettings {
    fn default() -> Self {
        Self {
            require_rectangular: true,
            default_choice_mode: ChoiceMode::PerElement,
        }
    }
}

/// The complete set of workspace settings.
///
/// # Examples
///
/// ```
/// use pgarray_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.debug);
/// assert!(settings.codec.require_rectangular);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Whether debug mode is enabled (pretty logs instead of JSON).
    pub debug: bool,
    /// The log level filter (e.g. "info", "debug", "pgarray_db=trace").
    pub log_level: String,
    /// Installed application labels (e.g. "pg_array_fields").
    pub installed_apps: Vec<String>,
    /// Array codec defaults.
    pub codec: CodecSettings,
    /// Custom settings that don't fit into the above categories.
    pub extra: HashMap<String, serde_json::Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            log_level: "info".to_string(),
            installed_apps: Vec::new(),
            codec: CodecSettings::default(),
            extra: HashMap::new(),
        }
    }
}

/// A lazily-initialized, globally-accessible settings container.
///
/// Call [`configure`](LazySettings::configure) once at startup to set the
/// settings, then use [`get`](LazySettings::get) or
/// [`try_get`](LazySettings::try_get) to access them.
pub struct LazySettings {
    inner: OnceLock<Settings>,
}

impl Default for LazySettings {
    fn default() -> Self {
        Self::new()
    }
}

impl LazySettings {
    /// Creates a new, unconfigured `LazySettings`.
    pub const fn new() -> Self {
        Self {
            inner: OnceLock::new(),
        }
    }

    /// Configures the global settings. Must be called exactly once.
    ///
    /// # Panics
    ///
    /// Panics if settings have already been configured.
    pub fn configure(&self, settings: Settings) {
        self.inner
            .set(settings)
            .expect("Settings have already been configured");
    }

    /// Returns a reference to the configured settings.
    ///
    /// # Panics
    ///
    /// Panics if settings have not been configured.
    pub fn get(&self) -> &Settings {
        self.inner
            .get()
            .expect("Settings have not been configured. Call SETTINGS.configure() first.")
    }

    /// Returns the configured settings, or `None` before configuration.
    pub fn try_get(&self) -> Option<&Settings> {
        self.inner.get()
    }

    /// Returns `true` if settings have been configured.
    pub fn is_configured(&self) -> bool {
        self.inner.get().is_some()
    }

    /// Returns the codec settings, falling back to defaults when unconfigured.
    pub fn codec(&self) -> CodecSettings {
        self.try_get()
            .map(|s| s.codec.clone())
            .unwrap_or_default()
    }
}

/// The global settings instance.
///
/// Call `SETTINGS.configure(settings)` once at application startup. Field
/// declarations read codec defaults from here when it is configured and fall
/// back to [`CodecSettings::default`] otherwise.
pub static SETTINGS: LazySettings = LazySettings::new();

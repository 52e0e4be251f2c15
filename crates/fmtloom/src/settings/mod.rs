//! Layered settings resolution.
//!
//! Settings come from three places: built-in defaults, the persisted global
//! store, and project-scoped overrides. A host may additionally expose a
//! per-document overlay that shadows the global store. Every component reads
//! settings through an injected [`SettingsProvider`]; nothing reaches into
//! ambient global state.
//!
//! The merge rule is deliberately shallow: when the base value and the
//! project value are both JSON objects their keys are united with the project
//! winning on conflict, otherwise the project value replaces the base value.

use serde_json::Value;

use crate::error::SettingsError;

mod defaults;
mod effective;
mod memory;

pub use defaults::builtin_value;
pub use effective::{EffectiveConfig, PipelinePolicy};
pub use memory::MemorySettings;

/// Top-level setting keys understood by the engine.
pub mod keys {
    /// Promotes per-request diagnostics to the `info` level.
    pub const DEBUG: &str = "debug";
    /// Runs the formatter from the pre-save hook.
    pub const FORMAT_ON_SAVE: &str = "format_on_save";
    /// Extra directories searched for formatter binaries.
    pub const PATHS: &str = "paths";
    /// Language identifier to formatter command mapping.
    pub const COMMAND_MAP: &str = "command_map";
    /// Per-language structured formatter options.
    pub const OPTIONS: &str = "options";
    /// Failure handling for multi-command pipelines.
    pub const PIPELINE_POLICY: &str = "pipeline_policy";
}

/// Reserved top-level key holding project-scoped overrides.
pub const PROJECT_SETTINGS_KEY: &str = "fmtloom";

/// Capability through which the engine reads and writes settings.
///
/// Hosts implement this over whatever persistence they have. Reads are
/// side-effect free; [`SettingsProvider::update_global`] is the only write and
/// must run as a critical section if the host is multi-threaded.
pub trait SettingsProvider {
    /// Returns the per-document overlay value for `key`, if the host has one.
    fn document_value(&self, _key: &str) -> Option<Value> {
        None
    }

    /// Returns the persisted global value for `key`.
    fn global_value(&self, key: &str) -> Option<Value>;

    /// Returns the project-scoped override for `key`.
    fn project_value(&self, key: &str) -> Option<Value>;

    /// Applies `edit` to the global value for `key` and persists it.
    ///
    /// `edit` receives the current value (`Value::Null` when absent) and
    /// returns whether it changed anything. The provider only persists when it
    /// did, and returns the same flag.
    ///
    /// # Errors
    ///
    /// Returns a [`SettingsError`] when persisting the edited value fails.
    fn update_global(
        &self,
        key: &str,
        edit: &mut dyn FnMut(&mut Value) -> bool,
    ) -> Result<bool, SettingsError>;
}

impl<P: SettingsProvider + ?Sized> SettingsProvider for &P {
    fn document_value(&self, key: &str) -> Option<Value> {
        (**self).document_value(key)
    }

    fn global_value(&self, key: &str) -> Option<Value> {
        (**self).global_value(key)
    }

    fn project_value(&self, key: &str) -> Option<Value> {
        (**self).project_value(key)
    }

    fn update_global(
        &self,
        key: &str,
        edit: &mut dyn FnMut(&mut Value) -> bool,
    ) -> Result<bool, SettingsError> {
        (**self).update_global(key, edit)
    }
}

/// Resolves individual keys across all configuration layers.
///
/// # Example
///
/// ```
/// use fmtloom::settings::{MemorySettings, SettingsResolver};
/// use serde_json::json;
///
/// let settings = MemorySettings::new()
///     .with_global("command_map", json!({"json": "prettier --write %file"}))
///     .with_project("command_map", json!({"yaml": "prettier --write %file"}));
/// let resolved = SettingsResolver::new(&settings).resolve("command_map");
/// assert_eq!(
///     resolved,
///     Some(json!({
///         "json": "prettier --write %file",
///         "yaml": "prettier --write %file",
///     }))
/// );
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SettingsResolver<'a, P: ?Sized> {
    provider: &'a P,
}

impl<'a, P: SettingsProvider + ?Sized> SettingsResolver<'a, P> {
    /// Creates a resolver reading from `provider`.
    #[must_use]
    pub const fn new(provider: &'a P) -> Self {
        Self { provider }
    }

    /// Resolves `key` across every layer.
    ///
    /// The base value is the first of the document overlay, the global store,
    /// and the built-in defaults that holds the key. A project value is then
    /// overlaid with [`merge_override`]. JSON `null` counts as absent at the
    /// top level of every layer.
    #[must_use]
    pub fn resolve(&self, key: &str) -> Option<Value> {
        let base = present(self.provider.document_value(key))
            .or_else(|| present(self.provider.global_value(key)))
            .or_else(|| builtin_value(key));
        merge_override(base, present(self.provider.project_value(key)))
    }

    /// Resolves `key`, returning `default` when no layer holds it.
    #[must_use]
    pub fn resolve_or(&self, key: &str, default: Value) -> Value {
        self.resolve(key).unwrap_or(default)
    }

    /// Resolves a boolean flag, treating absence as `false`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidType`] when the value is not a boolean.
    pub fn flag(&self, key: &str) -> Result<bool, SettingsError> {
        match self.resolve(key) {
            None => Ok(false),
            Some(Value::Bool(value)) => Ok(value),
            Some(_) => Err(SettingsError::InvalidType {
                key: key.to_owned(),
                expected: "a boolean",
            }),
        }
    }
}

/// Overlays `overlay` onto `base` using the shallow merge rule.
///
/// # Example
///
/// ```
/// use fmtloom::settings::merge_override;
/// use serde_json::json;
///
/// let merged = merge_override(Some(json!({"x": 1})), Some(json!({"y": 2})));
/// assert_eq!(merged, Some(json!({"x": 1, "y": 2})));
///
/// let replaced = merge_override(Some(json!([1])), Some(json!({"y": 2})));
/// assert_eq!(replaced, Some(json!({"y": 2})));
/// ```
#[must_use]
pub fn merge_override(base: Option<Value>, overlay: Option<Value>) -> Option<Value> {
    match (base, overlay) {
        (Some(Value::Object(mut merged)), Some(Value::Object(project))) => {
            merged.extend(project);
            Some(Value::Object(merged))
        }
        (base_value, None) => base_value,
        (_, Some(project)) => Some(project),
    }
}

fn present(value: Option<Value>) -> Option<Value> {
    value.filter(|candidate| !candidate.is_null())
}

#[cfg(test)]
mod tests;

//! In-memory settings provider.

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::{Map, Value};

use crate::error::SettingsError;

use super::SettingsProvider;

/// Settings held entirely in memory.
///
/// Useful for hosts that manage persistence themselves and for tests. The
/// global layer sits behind a mutex so concurrent auto-registrations are
/// serialised; the document and project layers are fixed at construction.
#[derive(Debug, Default)]
pub struct MemorySettings {
    document: Map<String, Value>,
    global: Mutex<Map<String, Value>>,
    project: Map<String, Value>,
}

impl MemorySettings {
    /// Creates an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a per-document overlay value.
    #[must_use]
    pub fn with_document(mut self, key: &str, value: Value) -> Self {
        self.document.insert(key.to_owned(), value);
        self
    }

    /// Adds a global value.
    #[must_use]
    pub fn with_global(self, key: &str, value: Value) -> Self {
        self.lock_global().insert(key.to_owned(), value);
        self
    }

    /// Adds a project-scoped override.
    #[must_use]
    pub fn with_project(mut self, key: &str, value: Value) -> Self {
        self.project.insert(key.to_owned(), value);
        self
    }

    /// Returns a copy of the current global layer.
    #[must_use]
    pub fn global_snapshot(&self) -> Map<String, Value> {
        self.lock_global().clone()
    }

    fn lock_global(&self) -> MutexGuard<'_, Map<String, Value>> {
        self.global.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SettingsProvider for MemorySettings {
    fn document_value(&self, key: &str) -> Option<Value> {
        self.document.get(key).cloned()
    }

    fn global_value(&self, key: &str) -> Option<Value> {
        self.lock_global().get(key).cloned()
    }

    fn project_value(&self, key: &str) -> Option<Value> {
        self.project.get(key).cloned()
    }

    fn update_global(
        &self,
        key: &str,
        edit: &mut dyn FnMut(&mut Value) -> bool,
    ) -> Result<bool, SettingsError> {
        let mut global = self.lock_global();
        let mut value = global.get(key).cloned().unwrap_or(Value::Null);
        let changed = edit(&mut value);
        if changed {
            global.insert(key.to_owned(), value);
        }
        Ok(changed)
    }
}

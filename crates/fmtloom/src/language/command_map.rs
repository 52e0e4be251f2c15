//! Language to formatter command mapping with auto-registration.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::info;

use crate::command::CommandSpec;
use crate::error::SettingsError;
use crate::settings::{SettingsProvider, keys};

use super::LanguageId;

/// Tracing target for command-map operations.
const COMMAND_MAP_TARGET: &str = "fmtloom::language";

/// A configured command-map entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandEntry {
    /// The "no formatter assigned" sentinel, persisted as `null` or `[]`.
    Unassigned,
    /// One or more commands, run in order as a pipeline.
    Commands(Vec<CommandSpec>),
}

/// Result of looking up a language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// No formatter applies; the request does nothing.
    Unsupported,
    /// Commands to run, in configured order.
    Commands(Vec<CommandSpec>),
}

/// A lookup together with whether it wrote to the global store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// What the caller should run.
    pub lookup: Lookup,
    /// `true` when a sentinel entry was persisted for a new language.
    pub mutated: bool,
}

/// Parsed `command_map` setting.
///
/// Accepted entry shapes: `null` or `[]` (sentinel), a command line string,
/// or an array whose elements are command line strings or token arrays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandMap {
    entries: BTreeMap<LanguageId, CommandEntry>,
}

impl CommandMap {
    /// Parses the resolved `command_map` value.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidType`] when the map or one of its
    /// entries has an unsupported shape.
    pub fn from_value(value: &Value) -> Result<Self, SettingsError> {
        let entries = match value {
            Value::Null => BTreeMap::new(),
            Value::Object(map) => parse_entries(map)?,
            _ => {
                return Err(SettingsError::InvalidType {
                    key: keys::COMMAND_MAP.to_owned(),
                    expected: "an object keyed by language",
                });
            }
        };
        Ok(Self { entries })
    }

    /// Returns the entry for `language`, if one is configured.
    #[must_use]
    pub fn get(&self, language: &LanguageId) -> Option<&CommandEntry> {
        self.entries.get(language)
    }

    /// Looks up `language`, registering the sentinel when it is unknown.
    ///
    /// An absent language is written to the global store as `null` so the
    /// operator can discover it and fill in a command. Existing entries,
    /// including explicit sentinels, are never overwritten; the write re-checks
    /// the global map inside the provider's critical section.
    ///
    /// # Errors
    ///
    /// Returns a [`SettingsError`] when persisting the sentinel fails.
    pub fn resolve_or_register<P: SettingsProvider + ?Sized>(
        &self,
        language: &LanguageId,
        provider: &P,
    ) -> Result<Registration, SettingsError> {
        match self.entries.get(language) {
            Some(CommandEntry::Commands(specs)) => Ok(Registration {
                lookup: Lookup::Commands(specs.clone()),
                mutated: false,
            }),
            Some(CommandEntry::Unassigned) => Ok(Registration {
                lookup: Lookup::Unsupported,
                mutated: false,
            }),
            None => {
                let mutated = provider
                    .update_global(keys::COMMAND_MAP, &mut |value| {
                        register_sentinel(value, language)
                    })?;
                if mutated {
                    info!(
                        target: COMMAND_MAP_TARGET,
                        language = %language,
                        "registered placeholder command map entry"
                    );
                }
                Ok(Registration {
                    lookup: Lookup::Unsupported,
                    mutated,
                })
            }
        }
    }
}

fn register_sentinel(value: &mut Value, language: &LanguageId) -> bool {
    if value.is_null() {
        *value = Value::Object(Map::new());
    }
    let Some(map) = value.as_object_mut() else {
        return false;
    };
    let known = map
        .keys()
        .any(|key| LanguageId::new(key).as_ref() == Some(language));
    if known {
        return false;
    }
    map.insert(language.as_str().to_owned(), Value::Null);
    true
}

fn parse_entries(
    map: &Map<String, Value>,
) -> Result<BTreeMap<LanguageId, CommandEntry>, SettingsError> {
    let mut entries = BTreeMap::new();
    for (name, raw) in map {
        let Some(language) = LanguageId::new(name) else {
            continue;
        };
        let entry = parse_entry(&language, raw)?;
        entries.insert(language, entry);
    }
    Ok(entries)
}

fn parse_entry(language: &LanguageId, raw: &Value) -> Result<CommandEntry, SettingsError> {
    let invalid = || SettingsError::InvalidType {
        key: format!("{}.{language}", keys::COMMAND_MAP),
        expected: "null, a command line, or an array of command lines or token arrays",
    };
    let specs = match raw {
        Value::Null => Vec::new(),
        Value::String(line) => CommandSpec::parse(line).into_iter().collect(),
        Value::Array(items) => {
            let mut specs = Vec::with_capacity(items.len());
            for item in items {
                let spec = match item {
                    Value::String(line) => CommandSpec::parse(line),
                    Value::Array(tokens) => {
                        let strings = tokens
                            .iter()
                            .map(|token| token.as_str().map(str::to_owned))
                            .collect::<Option<Vec<_>>>()
                            .ok_or_else(invalid)?;
                        CommandSpec::from_tokens(strings)
                    }
                    _ => return Err(invalid()),
                };
                specs.extend(spec);
            }
            specs
        }
        _ => return Err(invalid()),
    };
    if specs.is_empty() {
        Ok(CommandEntry::Unassigned)
    } else {
        Ok(CommandEntry::Commands(specs))
    }
}

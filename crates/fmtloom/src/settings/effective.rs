//! Typed view of the resolved settings for one format request.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::command::FormatterOptions;
use crate::error::SettingsError;
use crate::language::{CommandMap, LanguageId};

use super::{SettingsProvider, SettingsResolver, keys};

/// Failure handling for a multi-command pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelinePolicy {
    /// Abort the remaining commands after the first failing one and leave the
    /// buffer untouched.
    #[default]
    FailFast,
    /// Log failures, keep running the remaining commands, and still apply
    /// whatever the pipeline produced.
    Lenient,
}

/// Settings resolved and validated for a single request.
///
/// Built fresh for every request: settings may change between invocations.
#[derive(Debug, Clone)]
pub struct EffectiveConfig {
    debug: bool,
    format_on_save: bool,
    paths: Vec<PathBuf>,
    command_map: CommandMap,
    options: BTreeMap<LanguageId, FormatterOptions>,
    policy: PipelinePolicy,
}

impl EffectiveConfig {
    /// Resolves every engine setting through `provider`.
    ///
    /// # Errors
    ///
    /// Returns a [`SettingsError`] naming the first malformed setting.
    pub fn resolve<P: SettingsProvider + ?Sized>(provider: &P) -> Result<Self, SettingsError> {
        let resolver = SettingsResolver::new(provider);
        let command_map = CommandMap::from_value(&resolver.resolve_or(
            keys::COMMAND_MAP,
            Value::Object(serde_json::Map::new()),
        ))?;
        Ok(Self {
            debug: resolver.flag(keys::DEBUG)?,
            format_on_save: resolver.flag(keys::FORMAT_ON_SAVE)?,
            paths: parse_paths(resolver.resolve(keys::PATHS))?,
            command_map,
            options: parse_options(resolver.resolve(keys::OPTIONS))?,
            policy: parse_policy(resolver.resolve(keys::PIPELINE_POLICY))?,
        })
    }

    /// Whether per-request diagnostics are promoted to `info`.
    #[must_use]
    pub const fn debug(&self) -> bool {
        self.debug
    }

    /// Whether the pre-save hook formats the document.
    #[must_use]
    pub const fn format_on_save(&self) -> bool {
        self.format_on_save
    }

    /// Extra directories searched for formatter binaries.
    #[must_use]
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// The merged language to command mapping.
    #[must_use]
    pub const fn command_map(&self) -> &CommandMap {
        &self.command_map
    }

    /// Pipeline failure policy.
    #[must_use]
    pub const fn policy(&self) -> PipelinePolicy {
        self.policy
    }

    /// Returns the option block for `language`, or the defaults.
    #[must_use]
    pub fn options_for(&self, language: &LanguageId) -> FormatterOptions {
        self.options.get(language).cloned().unwrap_or_default()
    }
}

fn parse_paths(value: Option<Value>) -> Result<Vec<PathBuf>, SettingsError> {
    let invalid = || SettingsError::InvalidType {
        key: keys::PATHS.to_owned(),
        expected: "an array of strings",
    };
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(entries)) => entries
            .iter()
            .map(|entry| entry.as_str().map(PathBuf::from).ok_or_else(invalid))
            .collect(),
        Some(_) => Err(invalid()),
    }
}

fn parse_options(
    value: Option<Value>,
) -> Result<BTreeMap<LanguageId, FormatterOptions>, SettingsError> {
    let Some(raw) = value.filter(|candidate| !candidate.is_null()) else {
        return Ok(BTreeMap::new());
    };
    let Value::Object(blocks) = raw else {
        return Err(SettingsError::InvalidType {
            key: keys::OPTIONS.to_owned(),
            expected: "an object keyed by language",
        });
    };
    let mut options = BTreeMap::new();
    for (name, block) in &blocks {
        let Some(language) = LanguageId::new(name) else {
            continue;
        };
        let parsed = FormatterOptions::from_value(&language, block)?;
        options.insert(language, parsed);
    }
    Ok(options)
}

fn parse_policy(value: Option<Value>) -> Result<PipelinePolicy, SettingsError> {
    match value {
        None | Some(Value::Null) => Ok(PipelinePolicy::default()),
        Some(raw) => serde_json::from_value(raw).map_err(|_| SettingsError::InvalidType {
            key: keys::PIPELINE_POLICY.to_owned(),
            expected: "\"fail_fast\" or \"lenient\"",
        }),
    }
}

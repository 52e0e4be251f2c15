//! Runtime configuration shared by the `fmtloom` binary.
//!
//! Values are layered by `ortho_config`: built-in defaults, then an optional
//! configuration file (`--config-path` or `FMTLOOM_CONFIG_PATH`), then
//! `FMTLOOM_*` environment variables, then command-line flags. This crate only
//! covers how the binary itself runs; formatter settings such as the command
//! map live in the JSON settings file referenced by [`Config::settings_path`]
//! and are layered by the `fmtloom` engine.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

mod defaults;
mod logging;

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_TIMEOUT_SECS, default_log_filter, default_log_filter_string,
    default_log_format, default_settings_path,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Configuration for the `fmtloom` binary.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "FMTLOOM")]
pub struct Config {
    /// Tracing filter expression, for example `info` or `fmtloom=debug`.
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format of diagnostic log lines.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Location of the persisted formatter settings file.
    #[ortho_config(default = default_settings_path())]
    pub settings_path: PathBuf,
    /// Upper bound for each formatter process, in seconds.
    #[ortho_config(default = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            settings_path: default_settings_path(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Returns the configured tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Returns the configured log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Returns the path of the persisted formatter settings.
    #[must_use]
    pub fn settings_path(&self) -> &Path {
        self.settings_path.as_path()
    }

    /// Returns the per-process timeout as a [`Duration`].
    ///
    /// A zero value is raised to one second so a misconfiguration cannot turn
    /// every formatter into an immediate timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

//! Domain errors raised by the dispatch engine.
//!
//! All errors use `thiserror`-derived enums with structured context so callers
//! can inspect the failure programmatically. I/O and JSON errors are wrapped in
//! `Arc` to keep the enums small and cloneable.

use std::env::JoinPathsError;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Errors arising while reading, validating, or persisting settings.
#[derive(Debug, Clone, Error)]
pub enum SettingsError {
    /// A setting holds a value of the wrong JSON type.
    #[error("setting '{key}' must be {expected}")]
    InvalidType {
        /// Dotted path of the offending setting.
        key: String,
        /// Description of the accepted shape.
        expected: &'static str,
    },

    /// A formatter option block failed validation.
    #[error("invalid option '{field}' for language '{language}': {message}")]
    InvalidOption {
        /// Language whose option block is malformed.
        language: String,
        /// Field within the block, for example `sort_rules[1].sort`.
        field: String,
        /// Human-readable description of the problem.
        message: String,
    },

    /// The configured search paths cannot be joined into a `PATH` value.
    #[error("search paths cannot be combined into PATH: {source}")]
    SearchPath {
        /// Underlying join failure.
        #[source]
        source: Arc<JoinPathsError>,
    },

    /// A settings file could not be read.
    #[error("failed to read settings from '{path}': {source}")]
    Read {
        /// File that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// A settings file does not contain valid JSON.
    #[error("failed to parse settings file '{path}': {source}")]
    Parse {
        /// File that was parsed.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: Arc<serde_json::Error>,
    },

    /// Persisting settings failed.
    #[error("failed to persist settings to '{path}': {source}")]
    Write {
        /// File that was written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },
}

/// Errors arising while staging the buffer for external formatters.
#[derive(Debug, Clone, Error)]
pub enum StagingError {
    /// The document path has no file name to derive the staged name from.
    #[error("document path '{path}' has no file name")]
    MissingFileName {
        /// Offending document path.
        path: PathBuf,
    },

    /// Creating or writing the staged file failed.
    #[error("failed to write staged file in '{directory}': {source}")]
    Write {
        /// Directory the staged file was created in.
        directory: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// Reading the staged file back failed.
    #[error("failed to read staged file '{path}': {source}")]
    Read {
        /// Staged file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The formatter left bytes that are not valid UTF-8.
    #[error("staged file '{path}' is not valid UTF-8")]
    Encoding {
        /// Staged file path.
        path: PathBuf,
    },
}

/// Errors arising while running a formatter process.
///
/// A non-zero exit is not a `RunError`: it is reported through
/// [`FormatResult`](crate::process::FormatResult) because it means the tool
/// ran and disagreed with the input.
#[derive(Debug, Clone, Error)]
pub enum RunError {
    /// The expanded command had no program to run.
    #[error("command expanded to an empty argument list")]
    EmptyCommand,

    /// The program could not be started.
    #[error("failed to launch '{program}': {source}")]
    Launch {
        /// Program that was spawned.
        program: String,
        /// Underlying spawn error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The program did not exit within the configured bound.
    #[error("'{program}' did not finish within {timeout_secs}s")]
    Timeout {
        /// Program that was killed.
        program: String,
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },

    /// Waiting on the child process failed.
    #[error("I/O error while waiting for '{program}': {source}")]
    Io {
        /// Program being awaited.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },
}

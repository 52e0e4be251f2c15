//! Error types surfaced by the fmtloom CLI.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use fmtloom::SettingsError;
use ortho_config::OrthoError;
use thiserror::Error;

use crate::telemetry::TelemetryError;

/// Failures that stop the CLI before or after a format request.
///
/// Problems inside a request are not errors at this level: the engine reports
/// them as an [`fmtloom::Status`] and the CLI maps that to an exit code.
#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<OrthoError>),
    #[error(transparent)]
    CliUsage(#[from] clap::Error),
    #[error("failed to initialise telemetry: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("failed to read '{path}': {source}")]
    ReadDocument {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read the buffer from stdin: {0}")]
    ReadStdin(#[source] io::Error),
    #[error("failed to write '{path}': {source}")]
    WriteDocument {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("no language could be determined for '{0}'")]
    UnknownLanguage(PathBuf),
    #[error("failed to write output: {0}")]
    Output(#[source] io::Error),
}

/// Exit code for command-line usage errors, following the clap convention.
pub(crate) const USAGE_EXIT_CODE: u8 = 2;

impl AppError {
    /// Exit code reported for this error.
    ///
    /// Usage errors exit with [`USAGE_EXIT_CODE`]; everything else is a
    /// general failure.
    pub(crate) const fn exit_code(&self) -> u8 {
        match self {
            Self::CliUsage(_) => USAGE_EXIT_CODE,
            _ => 1,
        }
    }
}

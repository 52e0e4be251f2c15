//! Terminal outcomes of a format request.

use std::fmt;

use crate::language::LanguageId;

/// Name prefixed to every user-facing message.
pub const PRODUCT_NAME: &str = "fmtloom";

/// The single outcome reported for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// The buffer was replaced with formatter output.
    Formatted,
    /// The formatters produced nothing new.
    AlreadyFormatted,
    /// No formatter is configured for the document's language.
    Unsupported {
        /// The detected language, if any.
        language: Option<LanguageId>,
        /// Whether a placeholder entry was written for the language.
        registered: bool,
    },
    /// The buffer is empty or whitespace only.
    NothingToFormat,
    /// The document has no file on disk and was not saved.
    SaveCancelled,
    /// A formatter exited unsuccessfully.
    ToolFailed {
        /// Command line of the first failing formatter.
        command: String,
        /// Its exit code; `None` when it was killed by a signal.
        exit_code: Option<i32>,
        /// Whether output was still applied under the lenient policy.
        applied: bool,
    },
    /// A formatter binary could not be started.
    LaunchFailed {
        /// Program that failed to start.
        program: String,
        /// Operating system error description.
        message: String,
    },
    /// A formatter exceeded the process timeout.
    TimedOut {
        /// Program that was killed.
        program: String,
        /// Timeout that expired, in seconds.
        timeout_secs: u64,
    },
    /// The settings could not be interpreted.
    InvalidSettings {
        /// Description of the malformed setting.
        message: String,
    },
    /// The buffer could not be exchanged through a staged file.
    StagingFailed {
        /// Description of the staging failure.
        message: String,
    },
}

impl Status {
    /// Maps the status to its exit state.
    #[must_use]
    pub const fn exit_state(&self) -> ExitState {
        match self {
            Self::Formatted => ExitState::OkFormatted,
            Self::AlreadyFormatted => ExitState::OkUnchanged,
            Self::Unsupported { .. } | Self::NothingToFormat => ExitState::OkUnsupported,
            Self::SaveCancelled => ExitState::ErrorUnsaved,
            Self::ToolFailed { .. } => ExitState::ErrorToolFailed,
            Self::LaunchFailed { .. } => ExitState::ErrorLaunchFailed,
            Self::TimedOut { .. } => ExitState::ErrorTimedOut,
            Self::InvalidSettings { .. } => ExitState::ErrorInvalidSettings,
            Self::StagingFailed { .. } => ExitState::ErrorStagingFailed,
        }
    }

    /// The message shown to the user, prefixed with [`PRODUCT_NAME`].
    #[must_use]
    pub fn user_message(&self) -> String {
        format!("{PRODUCT_NAME}: {self}")
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Formatted => f.write_str("File formatted."),
            Self::AlreadyFormatted => f.write_str("File already formatted."),
            Self::Unsupported {
                language: Some(language),
                ..
            } => write!(f, "Not a supported file ({language})."),
            Self::Unsupported { language: None, .. } => f.write_str("Not a supported file."),
            Self::NothingToFormat => f.write_str("Nothing to format in file."),
            Self::SaveCancelled => f.write_str("Save canceled."),
            Self::ToolFailed { .. } => f.write_str("One of the tools returned an error."),
            Self::LaunchFailed { program, message } => {
                write!(f, "Could not launch '{program}': {message}")
            }
            Self::TimedOut {
                program,
                timeout_secs,
            } => write!(f, "'{program}' did not finish within {timeout_secs}s."),
            Self::InvalidSettings { message } => write!(f, "Invalid settings: {message}"),
            Self::StagingFailed { message } => write!(f, "Could not stage buffer: {message}"),
        }
    }
}

/// Outcome category of a request, as exposed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitState {
    /// `ok-formatted`
    OkFormatted,
    /// `ok-unchanged`
    OkUnchanged,
    /// `ok-unsupported`
    OkUnsupported,
    /// `error-unsaved`
    ErrorUnsaved,
    /// `error-tool-failed`
    ErrorToolFailed,
    /// `error-launch-failed`
    ErrorLaunchFailed,
    /// `error-timed-out`
    ErrorTimedOut,
    /// `error-invalid-settings`
    ErrorInvalidSettings,
    /// `error-staging-failed`
    ErrorStagingFailed,
}

impl ExitState {
    /// The kebab-case state name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OkFormatted => "ok-formatted",
            Self::OkUnchanged => "ok-unchanged",
            Self::OkUnsupported => "ok-unsupported",
            Self::ErrorUnsaved => "error-unsaved",
            Self::ErrorToolFailed => "error-tool-failed",
            Self::ErrorLaunchFailed => "error-launch-failed",
            Self::ErrorTimedOut => "error-timed-out",
            Self::ErrorInvalidSettings => "error-invalid-settings",
            Self::ErrorStagingFailed => "error-staging-failed",
        }
    }

    /// Process exit code for the state.
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::OkFormatted | Self::OkUnchanged | Self::OkUnsupported => 0,
            Self::ErrorTimedOut | Self::ErrorInvalidSettings | Self::ErrorStagingFailed => 1,
            Self::ErrorUnsaved => 3,
            Self::ErrorToolFailed => 4,
            Self::ErrorLaunchFailed => 5,
        }
    }

    /// Whether the state counts as success.
    #[must_use]
    pub const fn is_ok(self) -> bool {
        self.exit_code() == 0
    }
}

impl fmt::Display for ExitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Format dispatch engine for editor integrations.
//!
//! `fmtloom` never formats code itself. Given an open document it works out
//! which external formatters apply, writes the buffer to a staged file next
//! to the original, runs the configured commands against that file in order,
//! and replaces the buffer with the result when it differs materially from
//! what the user already has.
//!
//! # Architecture
//!
//! A request flows through the modules top to bottom:
//!
//! 1. [`settings`] merges built-in defaults, the global store and project
//!    overrides into an [`EffectiveConfig`];
//! 2. [`project`] finds the directory formatters run in;
//! 3. [`environment`] builds the child search path with project-local
//!    binaries first;
//! 4. [`language`] maps the document to a [`LanguageId`] and the language to
//!    its [`CommandSpec`]s, registering unknown languages for discovery;
//! 5. [`staging`] exchanges the buffer through a [`StagedFile`];
//! 6. [`command`] expands templates into argument vectors;
//! 7. [`process`] runs them behind the [`ProcessRunner`] seam;
//! 8. [`apply`] compares and writes the result back;
//! 9. [`orchestrator`] drives all of the above and reports one [`Status`].
//!
//! Hosts supply an [`Editor`] and a [`SettingsProvider`].
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use fmtloom::process::SystemRunner;
//! use fmtloom::settings::MemorySettings;
//! use fmtloom::Orchestrator;
//! use serde_json::json;
//!
//! let settings = MemorySettings::new()
//!     .with_global("command_map", json!({"json": "prettier --write %file"}));
//! let orchestrator = Orchestrator::new(SystemRunner::new(Duration::from_secs(30)), settings);
//! // orchestrator.format(&mut editor) runs prettier against the staged buffer.
//! # let _ = orchestrator;
//! ```

pub mod apply;
pub mod command;
pub mod editor;
pub mod environment;
pub mod error;
pub mod language;
pub mod orchestrator;
pub mod process;
pub mod project;
pub mod settings;
pub mod staging;

#[cfg(test)]
mod tests;

pub use self::command::{CommandSpec, FormatterOptions, SortOption};
pub use self::editor::{Editor, SaveChoice, Selection, Viewport};
pub use self::error::{RunError, SettingsError, StagingError};
pub use self::language::{CommandMap, LanguageId, Lookup, Registration};
pub use self::orchestrator::{ExitState, Orchestrator, SaveHook, Status};
pub use self::process::{FormatResult, Invocation, ProcessRunner, SystemRunner};
pub use self::project::ProjectContext;
pub use self::settings::{EffectiveConfig, SettingsProvider};
pub use self::staging::StagedFile;

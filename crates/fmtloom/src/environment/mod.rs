//! Subprocess search path and environment construction.
//!
//! Formatter binaries are usually installed per project by the package
//! manager, so `<project>/node_modules/.bin` is searched first when it exists.
//! Configured extra directories come next, then the inherited `PATH`. The
//! result is applied to the child [`Command`] only; the calling process's
//! environment is never modified.

use std::env;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use tracing::debug;

use crate::error::SettingsError;

/// Tracing target for environment construction.
const ENVIRONMENT_TARGET: &str = "fmtloom::environment";

/// Project-relative directory holding locally installed tool binaries.
pub const LOCAL_BIN_DIR: &str = "node_modules/.bin";

/// Builder for the child process `PATH` value.
#[derive(Debug, Clone, Copy)]
pub struct ExecPath;

impl ExecPath {
    /// Joins the project-local bin directory, `extra` and `inherited`.
    ///
    /// The project-local directory is only included when it exists on disk.
    /// Extra directories are kept in configured order even when they do not
    /// exist.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::SearchPath`] when an entry contains the
    /// platform path separator.
    pub fn build(
        project_root: Option<&Path>,
        extra: &[PathBuf],
        inherited: Option<&OsStr>,
    ) -> Result<OsString, SettingsError> {
        let local = project_root
            .map(|root| root.join(LOCAL_BIN_DIR))
            .filter(|candidate| candidate.is_dir());
        let inherited_entries = inherited.map(env::split_paths).into_iter().flatten();
        let entries = local
            .into_iter()
            .chain(extra.iter().cloned())
            .chain(inherited_entries);
        env::join_paths(entries).map_err(|source| SettingsError::SearchPath {
            source: Arc::new(source),
        })
    }
}

/// Environment overrides applied to every formatter process of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildEnvironment {
    path: OsString,
}

impl ChildEnvironment {
    /// Wraps an explicit `PATH` value.
    #[must_use]
    pub const fn new(path: OsString) -> Self {
        Self { path }
    }

    /// Builds the environment for `project_root` from the current `PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::SearchPath`] when the path cannot be joined.
    pub fn for_project(project_root: &Path, extra: &[PathBuf]) -> Result<Self, SettingsError> {
        let inherited = env::var_os("PATH");
        let path = ExecPath::build(Some(project_root), extra, inherited.as_deref())?;
        debug!(
            target: ENVIRONMENT_TARGET,
            project = %project_root.display(),
            path = %path.to_string_lossy(),
            "built formatter search path"
        );
        Ok(Self::new(path))
    }

    /// The `PATH` value handed to children.
    #[must_use]
    pub fn path(&self) -> &OsStr {
        &self.path
    }

    /// Applies the overrides to `command`.
    pub fn apply(&self, command: &mut Command) {
        command.env("PATH", &self.path);
    }
}

#[cfg(test)]
mod tests;

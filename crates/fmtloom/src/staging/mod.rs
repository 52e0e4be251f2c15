//! Per-request temporary copies of the buffer.
//!
//! The staged file lives next to the original where possible so formatters
//! find their project configuration by relative lookup, and its name ends
//! with the original base name so extension-based parser inference keeps
//! working. A random component keeps concurrent requests apart.

use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::{Builder, TempPath};
use tracing::{debug, warn};

use crate::error::StagingError;

/// Tracing target for staging operations.
const STAGING_TARGET: &str = "fmtloom::staging";

/// File name prefix of every staged file.
pub const STAGED_PREFIX: &str = ".fmtloom-";

const RANDOM_BYTES: usize = 8;

/// A staged copy of the buffer, removed when dropped or unstaged.
#[derive(Debug)]
pub struct StagedFile {
    path: TempPath,
}

impl StagedFile {
    /// Writes `text` as UTF-8 to a new file named after `original`.
    ///
    /// The file is created in `scratch_dir`, or in the system temp directory
    /// when `scratch_dir` is not writable.
    ///
    /// # Errors
    ///
    /// Returns [`StagingError::MissingFileName`] when `original` has no file
    /// name, or [`StagingError::Write`] when neither directory accepts the
    /// file.
    pub fn stage(text: &str, original: &Path, scratch_dir: &Path) -> Result<Self, StagingError> {
        let base_name = original
            .file_name()
            .ok_or_else(|| StagingError::MissingFileName {
                path: original.to_path_buf(),
            })?;
        let suffix = format!(".{}", base_name.to_string_lossy());

        let staged = match write_in(scratch_dir, &suffix, text) {
            Ok(path) => path,
            Err(primary) => {
                let fallback = env::temp_dir();
                if fallback == scratch_dir {
                    return Err(primary);
                }
                warn!(
                    target: STAGING_TARGET,
                    directory = %scratch_dir.display(),
                    error = %primary,
                    "project directory not writable, staging in system temp directory"
                );
                write_in(&fallback, &suffix, text)?
            }
        };
        debug!(target: STAGING_TARGET, path = %staged.display(), "staged buffer");
        Ok(Self { path: staged })
    }

    /// The staged file path handed to formatters.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the staged file back and removes it.
    ///
    /// The file is read by path because formatters may replace it rather than
    /// rewrite it in place. It is removed whether or not reading succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`StagingError::Read`] when the file cannot be read, or
    /// [`StagingError::Encoding`] when it is not valid UTF-8.
    pub fn unstage(self) -> Result<String, StagingError> {
        let path = self.path.to_path_buf();
        let contents = fs::read(&path);
        if let Err(error) = self.path.close()
            && error.kind() != io::ErrorKind::NotFound
        {
            warn!(
                target: STAGING_TARGET,
                path = %path.display(),
                %error,
                "failed to remove staged file"
            );
        }
        let bytes = contents.map_err(|source| StagingError::Read {
            path: path.clone(),
            source: Arc::new(source),
        })?;
        String::from_utf8(bytes).map_err(|_| StagingError::Encoding { path })
    }
}

fn write_in(directory: &Path, suffix: &str, text: &str) -> Result<TempPath, StagingError> {
    let to_error = |source: io::Error| StagingError::Write {
        directory: directory.to_path_buf(),
        source: Arc::new(source),
    };
    let mut file = Builder::new()
        .prefix(STAGED_PREFIX)
        .suffix(suffix)
        .rand_bytes(RANDOM_BYTES)
        .tempfile_in(directory)
        .map_err(to_error)?;
    file.write_all(text.as_bytes()).map_err(to_error)?;
    file.flush().map_err(to_error)?;
    Ok(file.into_temp_path())
}

/// Returns `true` when `path` looks like a staged file name.
#[must_use]
pub fn is_staged_name(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(STAGED_PREFIX))
}

/// Lists staged files left in `directory`.
///
/// # Errors
///
/// Returns the underlying I/O error when the directory cannot be listed.
pub fn staged_files_in(directory: &Path) -> io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in fs::read_dir(directory)? {
        let path = entry?.path();
        if is_staged_name(&path) {
            found.push(path);
        }
    }
    Ok(found)
}

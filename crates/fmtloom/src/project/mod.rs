//! Project directory resolution for one format request.

use std::path::{Path, PathBuf};

/// Manifest file marking a package-managed project.
pub const PROJECT_MANIFEST: &str = "package.json";

/// Number of directories searched for [`PROJECT_MANIFEST`], starting with the
/// file's own directory.
pub const FIND_UP_LIMIT: usize = 5;

/// How the project directory was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectSource {
    /// Nearest ancestor holding a [`PROJECT_MANIFEST`].
    Manifest,
    /// The open workspace folder containing the file.
    Workspace,
    /// The file's own directory.
    FileDirectory,
}

/// The directory formatters run in and search for local binaries from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectContext {
    root: PathBuf,
    source: ProjectSource,
}

impl ProjectContext {
    /// Resolves the project directory for `file`.
    ///
    /// Tries, in order: the nearest manifest directory within
    /// [`FIND_UP_LIMIT`] levels, the only open workspace folder (or the
    /// deepest open folder containing the file), and finally the file's
    /// directory.
    #[must_use]
    pub fn resolve(file: &Path, workspace_folders: &[PathBuf]) -> Self {
        let absolute = std::path::absolute(file).unwrap_or_else(|_| file.to_path_buf());
        let directory = absolute
            .parent()
            .map_or_else(|| absolute.clone(), Path::to_path_buf);

        if let Some(root) = find_manifest(&directory) {
            return Self::new(root, ProjectSource::Manifest);
        }
        if let Some(root) = workspace_root(&absolute, workspace_folders) {
            return Self::new(root, ProjectSource::Workspace);
        }
        Self::new(directory, ProjectSource::FileDirectory)
    }

    /// Creates a context from known parts.
    #[must_use]
    pub const fn new(root: PathBuf, source: ProjectSource) -> Self {
        Self { root, source }
    }

    /// The project directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// How the directory was found.
    #[must_use]
    pub const fn source(&self) -> ProjectSource {
        self.source
    }
}

fn find_manifest(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .take(FIND_UP_LIMIT)
        .find(|directory| directory.join(PROJECT_MANIFEST).is_file())
        .map(Path::to_path_buf)
}

fn workspace_root(file: &Path, folders: &[PathBuf]) -> Option<PathBuf> {
    if let [only] = folders {
        return Some(only.clone());
    }
    folders
        .iter()
        .filter(|folder| file.starts_with(folder))
        .max_by_key(|folder| folder.components().count())
        .cloned()
}

//! File backed [`Editor`] for the command line.
//!
//! The buffer is the file contents (or stdin), the view is a fixed origin,
//! and user-facing messages are collected so the caller can print them once
//! the request finishes.

use std::fs;
use std::io::Read;
use std::path::{self, Path, PathBuf};

use fmtloom::{Editor, SaveChoice, Selection, Viewport};
use tracing::{debug, warn};

use crate::AppError;
use crate::cli::{FormatArgs, LanguageArgs};
use crate::syntax::{scope_for, syntax_for};

const TARGET: &str = "fmtloom::cli::editor";

/// Where the buffer came from and where the result goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BufferSource {
    /// Read from the file; a changed buffer is written back to it.
    File,
    /// Read from stdin; the buffer is echoed to stdout.
    Stdin,
}

#[derive(Debug)]
pub(crate) struct FileEditor {
    path: PathBuf,
    saved: bool,
    source: BufferSource,
    text: String,
    modified: bool,
    syntax: Option<String>,
    scope: Option<String>,
    workspaces: Vec<PathBuf>,
    viewport: Viewport,
    selections: Vec<Selection>,
    messages: Vec<String>,
    errors: Vec<String>,
}

impl FileEditor {
    /// Opens the buffer described by `args`.
    ///
    /// With `--stdin` the buffer is read from `stdin` and the document counts
    /// as saved only when `args.file` exists on disk. The document and
    /// workspace paths are made absolute against the current directory so
    /// project discovery sees every ancestor.
    pub(crate) fn open(args: &FormatArgs, stdin: &mut dyn Read) -> Result<Self, AppError> {
        let read_error = |source| AppError::ReadDocument {
            path: args.file.clone(),
            source,
        };
        let document = path::absolute(&args.file).map_err(read_error)?;
        let workspaces = args
            .workspaces
            .iter()
            .map(path::absolute)
            .collect::<Result<Vec<_>, _>>()
            .map_err(read_error)?;
        let (text, saved, source) = if args.stdin {
            let mut buffer = String::new();
            stdin
                .read_to_string(&mut buffer)
                .map_err(AppError::ReadStdin)?;
            (buffer, document.is_file(), BufferSource::Stdin)
        } else {
            let contents = fs::read_to_string(&document).map_err(read_error)?;
            (contents, true, BufferSource::File)
        };
        Ok(Self {
            saved,
            source,
            text,
            workspaces,
            ..Self::detached(&document, args.syntax.as_deref())
        })
    }

    /// Describes `args.file` without reading it.
    pub(crate) fn inspect(args: &LanguageArgs) -> Self {
        Self::detached(&args.file, args.syntax.as_deref())
    }

    fn detached(path: &Path, syntax: Option<&str>) -> Self {
        Self {
            path: path.to_path_buf(),
            saved: true,
            source: BufferSource::File,
            text: String::new(),
            modified: false,
            syntax: syntax.or_else(|| syntax_for(path)).map(str::to_owned),
            scope: scope_for(path),
            workspaces: Vec::new(),
            viewport: Viewport::default(),
            selections: vec![Selection::caret(0)],
            messages: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub(crate) const fn source(&self) -> BufferSource {
        self.source
    }

    /// Document directory used to discover project settings.
    pub(crate) fn document_dir(&self) -> Option<&Path> {
        self.path.parent()
    }

    pub(crate) fn buffer(&self) -> &str {
        &self.text
    }

    pub(crate) fn messages(&self) -> &[String] {
        &self.messages
    }

    pub(crate) fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Writes a replaced buffer back to the file.
    ///
    /// Stdin buffers and untouched buffers are left alone.
    pub(crate) fn commit(&self) -> Result<(), AppError> {
        if !self.modified || self.source == BufferSource::Stdin {
            return Ok(());
        }
        fs::write(&self.path, &self.text).map_err(|source| AppError::WriteDocument {
            path: self.path.clone(),
            source,
        })
    }
}

impl Editor for FileEditor {
    fn file_path(&self) -> Option<PathBuf> {
        self.saved.then(|| self.path.clone())
    }

    fn text(&self) -> String {
        self.text.clone()
    }

    fn replace_all(&mut self, text: &str) {
        text.clone_into(&mut self.text);
        self.modified = true;
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn selections(&self) -> Vec<Selection> {
        self.selections.clone()
    }

    fn set_selections(&mut self, selections: &[Selection]) {
        selections.clone_into(&mut self.selections);
    }

    fn syntax_name(&self) -> Option<String> {
        self.syntax.clone()
    }

    fn scope_at_cursor(&self) -> Option<String> {
        self.scope.clone()
    }

    fn workspace_folders(&self) -> Vec<PathBuf> {
        self.workspaces.clone()
    }

    fn prompt_save(&mut self, message: &str) -> SaveChoice {
        debug!(target: TARGET, prompt = message, "no interactive prompt; not saving");
        SaveChoice::DontSave
    }

    fn save(&mut self) {
        match fs::write(&self.path, &self.text) {
            Ok(()) => {
                self.saved = true;
                self.modified = false;
            }
            Err(error) => warn!(
                target: TARGET,
                path = %self.path.display(),
                %error,
                "saving the buffer failed"
            ),
        }
    }

    fn status_message(&mut self, message: &str) {
        self.messages.push(message.to_owned());
    }

    fn error_message(&mut self, message: &str) {
        self.errors.push(message.to_owned());
    }
}

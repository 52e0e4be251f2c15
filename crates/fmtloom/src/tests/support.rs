//! Test doubles shared by unit and behaviour tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::editor::{Editor, SaveChoice, Selection, Viewport};
use crate::error::RunError;
use crate::process::{FormatResult, Invocation, ProcessRunner};
use crate::staging::is_staged_name;

/// In-memory editor recording everything the engine asks of it.
#[derive(Debug, Clone)]
pub(crate) struct FakeEditor {
    pub(crate) path: Option<PathBuf>,
    pub(crate) text: String,
    pub(crate) viewport: Viewport,
    pub(crate) selections: Vec<Selection>,
    pub(crate) syntax: Option<String>,
    pub(crate) scope: Option<String>,
    pub(crate) folders: Vec<PathBuf>,
    pub(crate) save_choice: SaveChoice,
    pub(crate) saved_path: Option<PathBuf>,
    pub(crate) prompts: usize,
    pub(crate) replacements: usize,
    pub(crate) statuses: Vec<String>,
    pub(crate) errors: Vec<String>,
}

impl FakeEditor {
    pub(crate) fn new(path: &Path, text: &str, syntax: &str) -> Self {
        Self {
            path: Some(path.to_path_buf()),
            text: text.to_owned(),
            viewport: Viewport::new(0.0, 120.0),
            selections: vec![Selection::caret(2)],
            syntax: Some(syntax.to_owned()),
            scope: None,
            folders: Vec::new(),
            save_choice: SaveChoice::Cancel,
            saved_path: None,
            prompts: 0,
            replacements: 0,
            statuses: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub(crate) fn unsaved(text: &str, syntax: &str) -> Self {
        Self {
            path: None,
            ..Self::new(Path::new("unused"), text, syntax)
        }
    }
}

impl Editor for FakeEditor {
    fn file_path(&self) -> Option<PathBuf> {
        self.path.clone()
    }

    fn text(&self) -> String {
        self.text.clone()
    }

    fn replace_all(&mut self, text: &str) {
        text.clone_into(&mut self.text);
        self.replacements += 1;
        self.viewport = Viewport::default();
        self.selections.clear();
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
        self.selections = selections.to_vec();
    }

    fn syntax_name(&self) -> Option<String> {
        self.syntax.clone()
    }

    fn scope_at_cursor(&self) -> Option<String> {
        self.scope.clone()
    }

    fn workspace_folders(&self) -> Vec<PathBuf> {
        self.folders.clone()
    }

    fn prompt_save(&mut self, _message: &str) -> SaveChoice {
        self.prompts += 1;
        self.save_choice
    }

    fn save(&mut self) {
        if let Some(path) = &self.saved_path {
            self.path = Some(path.clone());
        }
    }

    fn status_message(&mut self, message: &str) {
        self.statuses.push(message.to_owned());
    }

    fn error_message(&mut self, message: &str) {
        self.errors.push(message.to_owned());
    }
}

/// What a scripted program does when run.
#[derive(Debug, Clone)]
pub(crate) enum Script {
    /// Overwrites the staged file and exits 0.
    Rewrite(String),
    /// Exits with the given code without touching the file.
    Fail(i32),
    /// Exits 0 and leaves the file as it is.
    Noop,
    /// Exceeds the timeout.
    Hang,
}

/// Runner that simulates formatter programs by name.
///
/// Programs without a script behave as missing binaries.
#[derive(Debug, Default)]
pub(crate) struct ScriptedRunner {
    scripts: HashMap<String, Script>,
    calls: RefCell<Vec<Invocation>>,
}

impl ScriptedRunner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(mut self, program: &str, script: Script) -> Self {
        self.scripts.insert(program.to_owned(), script);
        self
    }

    pub(crate) fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }

    pub(crate) fn programs(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .map(Invocation::program_name)
            .collect()
    }

    /// Staged paths handed to every call, in order.
    pub(crate) fn staged_paths(&self) -> Vec<PathBuf> {
        self.calls.borrow().iter().filter_map(staged_arg).collect()
    }
}

fn staged_arg(invocation: &Invocation) -> Option<PathBuf> {
    invocation
        .args()
        .iter()
        .map(PathBuf::from)
        .find(|arg| is_staged_name(arg))
}

impl ProcessRunner for ScriptedRunner {
    fn run(&self, invocation: &Invocation) -> Result<FormatResult, RunError> {
        self.calls.borrow_mut().push(invocation.clone());
        let program = invocation.program_name();
        let io_error = |source: io::Error| RunError::Io {
            program: program.clone(),
            source: Arc::new(source),
        };
        match self.scripts.get(&program) {
            Some(Script::Rewrite(text)) => {
                let staged = staged_arg(invocation)
                    .ok_or_else(|| io_error(io::Error::other("no staged path argument")))?;
                fs::write(staged, text).map_err(io_error)?;
                Ok(FormatResult::new(Some(0), "", ""))
            }
            Some(Script::Fail(code)) => Ok(FormatResult::new(Some(*code), "", "syntax error")),
            Some(Script::Noop) => Ok(FormatResult::new(Some(0), "", "")),
            Some(Script::Hang) => Err(RunError::Timeout {
                program,
                timeout_secs: 1,
            }),
            None => Err(RunError::Launch {
                program,
                source: Arc::new(io::Error::from(io::ErrorKind::NotFound)),
            }),
        }
    }
}

//! The host editor as seen by the engine.
//!
//! Hosts implement [`Editor`] over their buffer, view and dialog APIs. The
//! engine only ever holds `&mut dyn Editor` for the duration of one request.

use std::path::PathBuf;

/// Scroll position of a view, in host units.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Viewport {
    /// Horizontal offset.
    pub x: f64,
    /// Vertical offset.
    pub y: f64,
}

impl Viewport {
    /// Creates a viewport position.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A selection as character offsets; `anchor == head` is a caret.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    /// Fixed end of the selection.
    pub anchor: usize,
    /// Moving end of the selection.
    pub head: usize,
}

impl Selection {
    /// Creates a caret at `offset`.
    #[must_use]
    pub const fn caret(offset: usize) -> Self {
        Self {
            anchor: offset,
            head: offset,
        }
    }
}

/// Answer to the "save first?" prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveChoice {
    /// Save, then continue.
    Save,
    /// Continue without saving.
    DontSave,
    /// Abandon the request.
    Cancel,
}

/// Capabilities the engine needs from the host editor.
pub trait Editor {
    /// Path of the document on disk, `None` while it has never been saved.
    fn file_path(&self) -> Option<PathBuf>;

    /// Full buffer contents.
    fn text(&self) -> String;

    /// Replaces the whole buffer with `text` in one edit.
    fn replace_all(&mut self, text: &str);

    /// Current scroll position.
    fn viewport(&self) -> Viewport;

    /// Restores a scroll position.
    fn set_viewport(&mut self, viewport: Viewport);

    /// Current selections.
    fn selections(&self) -> Vec<Selection>;

    /// Restores selections.
    fn set_selections(&mut self, selections: &[Selection]);

    /// Name or path of the document's syntax definition.
    fn syntax_name(&self) -> Option<String>;

    /// Space-separated scope stack at the primary cursor.
    fn scope_at_cursor(&self) -> Option<String>;

    /// Root folders open in the window.
    fn workspace_folders(&self) -> Vec<PathBuf>;

    /// Asks whether to save the document before continuing.
    fn prompt_save(&mut self, message: &str) -> SaveChoice;

    /// Saves the document.
    fn save(&mut self);

    /// Shows a transient status message.
    fn status_message(&mut self, message: &str);

    /// Shows a message the user must acknowledge.
    fn error_message(&mut self, message: &str);
}

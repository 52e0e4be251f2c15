//! Comparison of formatter output with the buffer and application of changes.

use tracing::debug;

use crate::editor::{Editor, Selection, Viewport};

/// Tracing target for buffer application.
const APPLY_TARGET: &str = "fmtloom::apply";

/// Whether `text` has nothing worth formatting.
#[must_use]
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Strips trailing whitespace only; interior whitespace is significant.
#[must_use]
pub fn normalise(text: &str) -> &str {
    text.trim_end()
}

/// View state captured before formatting and restored after replacement.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    viewport: Viewport,
    selections: Vec<Selection>,
}

impl ViewState {
    /// Records the current viewport and selections of `editor`.
    #[must_use]
    pub fn capture(editor: &dyn Editor) -> Self {
        Self {
            viewport: editor.viewport(),
            selections: editor.selections(),
        }
    }

    /// The recorded viewport.
    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// The recorded selections.
    #[must_use]
    pub fn selections(&self) -> &[Selection] {
        &self.selections
    }
}

/// What [`apply`] did to the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The buffer was replaced.
    Replaced,
    /// The output matched the buffer; nothing changed.
    AlreadyFormatted,
}

/// Replaces the buffer with `formatted` when it differs from `original`.
///
/// Replacement is a single full-buffer edit followed by restoring `state`,
/// with selections clamped to the new text length.
pub fn apply(
    editor: &mut dyn Editor,
    original: &str,
    formatted: &str,
    state: &ViewState,
) -> Applied {
    if normalise(original) == normalise(formatted) {
        debug!(target: APPLY_TARGET, "formatter output matches buffer");
        return Applied::AlreadyFormatted;
    }
    editor.replace_all(formatted);
    editor.set_viewport(state.viewport());
    let limit = formatted.chars().count();
    let clamped: Vec<Selection> = state
        .selections()
        .iter()
        .map(|selection| Selection {
            anchor: selection.anchor.min(limit),
            head: selection.head.min(limit),
        })
        .collect();
    editor.set_selections(&clamped);
    debug!(
        target: APPLY_TARGET,
        bytes = formatted.len(),
        "replaced buffer with formatter output"
    );
    Applied::Replaced
}

#[cfg(test)]
mod tests;

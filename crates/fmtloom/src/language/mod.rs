//! Language identification and command lookup.
//!
//! A [`LanguageId`] is derived from the document's syntax definition name
//! (`Packages/JavaScript/JavaScript.sublime-syntax` becomes `javascript`) or,
//! when the host has no syntax name, from the innermost lexical scope at the
//! primary cursor (`source.json meta.mapping.json` becomes `json`). The
//! identifier is the lookup key into the [`CommandMap`].

use std::fmt;

use crate::editor::Editor;

mod command_map;

pub use command_map::{CommandEntry, CommandMap, Lookup, Registration};

/// Normalised language identifier used as the command-map key.
///
/// # Example
///
/// ```
/// use fmtloom::LanguageId;
///
/// let id = LanguageId::from_syntax("Packages/JavaScript/JavaScript.sublime-syntax");
/// assert_eq!(id.as_ref().map(LanguageId::as_str), Some("javascript"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LanguageId(String);

impl LanguageId {
    /// Normalises `raw` by trimming and lowercasing it.
    ///
    /// Returns `None` when nothing is left.
    #[must_use]
    pub fn new(raw: &str) -> Option<Self> {
        let normalised = raw.trim().to_lowercase();
        if normalised.is_empty() {
            None
        } else {
            Some(Self(normalised))
        }
    }

    /// Derives an identifier from a syntax definition name or path.
    ///
    /// Directory components and the final extension are stripped before the
    /// result is normalised.
    #[must_use]
    pub fn from_syntax(syntax: &str) -> Option<Self> {
        let base = syntax.rsplit(['/', '\\']).next().unwrap_or(syntax);
        let stem = match base.rfind('.') {
            Some(index) if index > 0 => base.get(..index).unwrap_or(base),
            _ => base,
        };
        Self::new(stem)
    }

    /// Derives an identifier from a space-separated scope stack.
    ///
    /// The innermost (last) scope wins and its last dotted segment names the
    /// language, so `source.js meta.block.js` yields `js`.
    #[must_use]
    pub fn from_scope(scope: &str) -> Option<Self> {
        let innermost = scope.split_whitespace().next_back()?;
        let segment = innermost.rsplit('.').next().unwrap_or(innermost);
        Self::new(segment)
    }

    /// Returns the identifier text.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for LanguageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolves the language of the document open in `editor`.
///
/// Prefers the syntax name and falls back to the scope at the primary cursor.
#[must_use]
pub fn resolve_language(editor: &dyn Editor) -> Option<LanguageId> {
    editor
        .syntax_name()
        .and_then(|syntax| LanguageId::from_syntax(&syntax))
        .or_else(|| {
            editor
                .scope_at_cursor()
                .and_then(|scope| LanguageId::from_scope(&scope))
        })
}

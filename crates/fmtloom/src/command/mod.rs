//! Formatter command templates and their expansion into argument vectors.
//!
//! A [`CommandSpec`] is an ordered token list. Expansion never goes through a
//! shell: every token becomes exactly one argument (or none, see `%sort`), so
//! staged paths containing spaces or quotes need no escaping.
//!
//! Placeholders:
//!
//! - `%file` (a whole token) is replaced by the staged file path;
//! - `%max_line` anywhere inside a token is replaced by the resolved maximum
//!   line width;
//! - `%sort` anywhere inside a token is replaced by the comma-joined sort
//!   fields. The whole token is dropped when sorting is off, or when it
//!   expands to nothing because sorting is on without explicit fields.

use std::ffi::OsString;
use std::fmt;
use std::path::Path;

use tracing::warn;

mod options;

pub use options::{DEFAULT_MAX_LINE, FormatterOptions, ResolvedOptions, SortOption, SortRule};

/// Tracing target for command expansion.
const COMMAND_TARGET: &str = "fmtloom::command";

/// Placeholder replaced by the staged file path.
pub const FILE_PLACEHOLDER: &str = "%file";
/// Placeholder replaced by the sort field list.
pub const SORT_PLACEHOLDER: &str = "%sort";
/// Placeholder replaced by the maximum line width.
pub const MAX_LINE_PLACEHOLDER: &str = "%max_line";

/// Template for one formatter invocation.
///
/// # Example
///
/// ```
/// use fmtloom::CommandSpec;
///
/// let spec = CommandSpec::parse("prettier --write %file").expect("non-empty");
/// assert_eq!(spec.program(), "prettier");
/// assert!(spec.has_file_placeholder());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    tokens: Vec<String>,
}

impl CommandSpec {
    /// Splits a command line on whitespace.
    ///
    /// Returns `None` for a blank line.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        Self::from_tokens(line.split_whitespace().map(str::to_owned).collect())
    }

    /// Wraps an explicit token list.
    ///
    /// Returns `None` when the list is empty or the program token is blank.
    #[must_use]
    pub fn from_tokens(tokens: Vec<String>) -> Option<Self> {
        let program = tokens.first()?;
        if program.trim().is_empty() {
            return None;
        }
        Some(Self { tokens })
    }

    /// Returns the program token.
    #[must_use]
    pub fn program(&self) -> &str {
        self.tokens.first().map_or("", String::as_str)
    }

    /// Returns every token, program first.
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Whether any token is the `%file` placeholder.
    #[must_use]
    pub fn has_file_placeholder(&self) -> bool {
        self.tokens.iter().any(|token| token == FILE_PLACEHOLDER)
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tokens.join(" "))
    }
}

/// Expands `spec` into the argument vector for one invocation.
///
/// A spec without `%file` is passed through verbatim and flagged with a
/// warning, since the formatter will not see the staged buffer.
#[must_use]
pub fn build(spec: &CommandSpec, staged_path: &Path, options: &ResolvedOptions) -> Vec<OsString> {
    if !spec.has_file_placeholder() {
        warn!(
            target: COMMAND_TARGET,
            command = %spec,
            "command has no {FILE_PLACEHOLDER} placeholder; the formatter will not see the buffer"
        );
    }
    let max_line = options.max_line().to_string();
    spec.tokens()
        .iter()
        .filter_map(|token| expand_token(token, staged_path, options.sort(), &max_line))
        .collect()
}

fn expand_token(
    token: &str,
    staged_path: &Path,
    sort: &SortOption,
    max_line: &str,
) -> Option<OsString> {
    if token == FILE_PLACEHOLDER {
        return Some(staged_path.as_os_str().to_owned());
    }
    let mut expanded = token.replace(MAX_LINE_PLACEHOLDER, max_line);
    if expanded.contains(SORT_PLACEHOLDER) {
        match sort {
            SortOption::Off => return None,
            SortOption::Fields(fields) => {
                expanded = expanded.replace(SORT_PLACEHOLDER, &fields.join(","));
                if expanded.is_empty() {
                    return None;
                }
            }
        }
    }
    Some(OsString::from(expanded))
}

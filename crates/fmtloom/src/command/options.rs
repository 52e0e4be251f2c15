//! Structured formatter options resolved by file name.

use serde_json::{Map, Value};

use crate::error::SettingsError;
use crate::language::LanguageId;

/// Maximum line width used when no option block or rule provides one.
pub const DEFAULT_MAX_LINE: u32 = 80;

/// Sort behaviour requested from a structured-data formatter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SortOption {
    /// No sorting; tokens containing `%sort` are dropped.
    #[default]
    Off,
    /// Sort by the listed fields. An empty list means "sort" with the
    /// formatter's own default order.
    Fields(Vec<String>),
}

/// One `{match, sort, max_line}` rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortRule {
    pattern: String,
    sort: SortOption,
    max_line: Option<u32>,
}

impl SortRule {
    /// Creates a rule matching file names that end with `pattern`.
    #[must_use]
    pub fn new(pattern: impl Into<String>, sort: SortOption, max_line: Option<u32>) -> Self {
        Self {
            pattern: pattern.into(),
            sort,
            max_line,
        }
    }

    /// Whether the rule applies to `base_name`.
    #[must_use]
    pub fn matches(&self, base_name: &str) -> bool {
        base_name.ends_with(&self.pattern)
    }
}

/// Options resolved for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOptions {
    sort: SortOption,
    max_line: u32,
}

impl ResolvedOptions {
    /// Creates a resolved option set.
    #[must_use]
    pub const fn new(sort: SortOption, max_line: u32) -> Self {
        Self { sort, max_line }
    }

    /// The sort behaviour.
    #[must_use]
    pub const fn sort(&self) -> &SortOption {
        &self.sort
    }

    /// The maximum line width.
    #[must_use]
    pub const fn max_line(&self) -> u32 {
        self.max_line
    }
}

impl Default for ResolvedOptions {
    fn default() -> Self {
        Self::new(SortOption::Off, DEFAULT_MAX_LINE)
    }
}

/// A language's option block: a default width and ordered rules.
///
/// Rules are tried in configured order and the first one whose pattern is a
/// suffix of the file name wins, even when a later rule is more specific.
///
/// # Example
///
/// ```
/// use fmtloom::LanguageId;
/// use fmtloom::command::{FormatterOptions, SortOption};
/// use serde_json::json;
///
/// let language = LanguageId::new("json").expect("valid id");
/// let options = FormatterOptions::from_value(
///     &language,
///     &json!({"sort_rules": [{"match": "package.json", "sort": ["name"]}]}),
/// )
/// .expect("valid block");
/// let resolved = options.for_file("package.json");
/// assert_eq!(resolved.sort(), &SortOption::Fields(vec!["name".to_owned()]));
/// assert_eq!(resolved.max_line(), 80);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatterOptions {
    max_line_default: u32,
    rules: Vec<SortRule>,
}

impl Default for FormatterOptions {
    fn default() -> Self {
        Self {
            max_line_default: DEFAULT_MAX_LINE,
            rules: Vec::new(),
        }
    }
}

impl FormatterOptions {
    /// Creates an option block from already validated parts.
    #[must_use]
    pub const fn new(max_line_default: u32, rules: Vec<SortRule>) -> Self {
        Self {
            max_line_default,
            rules,
        }
    }

    /// Validates a JSON option block for `language`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidOption`] naming the offending field
    /// when the block, a rule, a `sort` value or a width is malformed.
    pub fn from_value(language: &LanguageId, value: &Value) -> Result<Self, SettingsError> {
        let invalid = |field: &str, message: &str| SettingsError::InvalidOption {
            language: language.to_string(),
            field: field.to_owned(),
            message: message.to_owned(),
        };
        let Value::Object(block) = value else {
            return Err(invalid("options", "must be an object"));
        };
        let max_line_default = match block.get("max_line_default") {
            None | Some(Value::Null) => DEFAULT_MAX_LINE,
            Some(raw) => parse_width(raw)
                .ok_or_else(|| invalid("max_line_default", "must be a non-negative integer"))?,
        };
        let rules = match block.get("sort_rules") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(entries)) => entries
                .iter()
                .enumerate()
                .map(|(index, entry)| parse_rule(language, index, entry))
                .collect::<Result<_, _>>()?,
            Some(_) => return Err(invalid("sort_rules", "must be an array of rules")),
        };
        Ok(Self {
            max_line_default,
            rules,
        })
    }

    /// The width used when no rule provides one.
    #[must_use]
    pub const fn max_line_default(&self) -> u32 {
        self.max_line_default
    }

    /// The rules in configured order.
    #[must_use]
    pub fn rules(&self) -> &[SortRule] {
        &self.rules
    }

    /// Resolves the options for a file's base name.
    #[must_use]
    pub fn for_file(&self, base_name: &str) -> ResolvedOptions {
        self.rules
            .iter()
            .find(|rule| rule.matches(base_name))
            .map_or_else(
                || ResolvedOptions::new(SortOption::Off, self.max_line_default),
                |rule| {
                    ResolvedOptions::new(
                        rule.sort.clone(),
                        rule.max_line.unwrap_or(self.max_line_default),
                    )
                },
            )
    }
}

fn parse_rule(
    language: &LanguageId,
    index: usize,
    entry: &Value,
) -> Result<SortRule, SettingsError> {
    let invalid = |field: &str, message: &str| SettingsError::InvalidOption {
        language: language.to_string(),
        field: format!("sort_rules[{index}]{field}"),
        message: message.to_owned(),
    };
    let Value::Object(rule) = entry else {
        return Err(invalid("", "must be an object"));
    };
    let pattern = rule
        .get("match")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid(".match", "must be a string"))?;
    let sort = parse_sort(rule)
        .ok_or_else(|| invalid(".sort", "must be a boolean or an array of strings"))?;
    let max_line = match rule.get("max_line") {
        None | Some(Value::Null) => None,
        Some(raw) => Some(
            parse_width(raw).ok_or_else(|| invalid(".max_line", "must be a non-negative integer"))?,
        ),
    };
    Ok(SortRule::new(pattern, sort, max_line))
}

fn parse_sort(rule: &Map<String, Value>) -> Option<SortOption> {
    match rule.get("sort") {
        None | Some(Value::Null | Value::Bool(false)) => Some(SortOption::Off),
        Some(Value::Bool(true)) => Some(SortOption::Fields(Vec::new())),
        Some(Value::Array(fields)) => fields
            .iter()
            .map(|field| field.as_str().map(str::to_owned))
            .collect::<Option<Vec<_>>>()
            .map(SortOption::Fields),
        Some(_) => None,
    }
}

fn parse_width(raw: &Value) -> Option<u32> {
    raw.as_u64().and_then(|width| u32::try_from(width).ok())
}

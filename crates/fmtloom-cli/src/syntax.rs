//! Syntax detection from file extensions.
//!
//! Editors report a syntax name for every buffer. The CLI has no grammar
//! engine, so it derives a syntax name from the extension, and for unknown
//! extensions offers a `source.<ext>` scope for the engine's fallback.

use std::path::Path;

const SYNTAXES: &[(&str, &str)] = &[
    ("cjs", "JavaScript"),
    ("css", "CSS"),
    ("go", "Go"),
    ("htm", "HTML"),
    ("html", "HTML"),
    ("js", "JavaScript"),
    ("json", "JSON"),
    ("jsonc", "JSON"),
    ("jsx", "JavaScript"),
    ("less", "LESS"),
    ("markdown", "Markdown"),
    ("md", "Markdown"),
    ("mjs", "JavaScript"),
    ("py", "Python"),
    ("rs", "Rust"),
    ("scss", "SCSS"),
    ("sh", "Bash"),
    ("toml", "TOML"),
    ("ts", "TypeScript"),
    ("tsx", "TypeScriptReact"),
    ("vue", "Vue"),
    ("yaml", "YAML"),
    ("yml", "YAML"),
];

/// Returns the syntax name for `path`, if its extension is known.
pub(crate) fn syntax_for(path: &Path) -> Option<&'static str> {
    let extension = extension_of(path)?;
    SYNTAXES
        .iter()
        .find(|(known, _)| *known == extension)
        .map(|(_, syntax)| *syntax)
}

/// Returns a scope name derived from the extension of `path`.
pub(crate) fn scope_for(path: &Path) -> Option<String> {
    extension_of(path).map(|extension| format!("source.{extension}"))
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|extension| extension.to_str())
        .filter(|extension| !extension.is_empty())
        .map(str::to_ascii_lowercase)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::json("data.json", Some("JSON"))]
    #[case::upper("README.MD", Some("Markdown"))]
    #[case::nested("src/app.test.tsx", Some("TypeScriptReact"))]
    #[case::unknown("lib.ex", None)]
    #[case::bare("Makefile", None)]
    fn syntax_is_derived_from_the_extension(#[case] path: &str, #[case] expected: Option<&str>) {
        assert_eq!(syntax_for(Path::new(path)), expected);
    }

    #[rstest]
    fn scope_uses_the_lowercased_extension() {
        assert_eq!(
            scope_for(Path::new("lib.EX")),
            Some(String::from("source.ex"))
        );
        assert_eq!(scope_for(Path::new("Makefile")), None);
    }
}

//! Unit tests for comparison and buffer application.

use std::path::Path;

use rstest::rstest;

use super::*;
use crate::tests::support::FakeEditor;

fn editor(text: &str) -> FakeEditor {
    FakeEditor::new(Path::new("/work/a.js"), text, "JavaScript")
}

#[rstest]
#[case::empty("", true)]
#[case::spaces("   ", true)]
#[case::mixed(" \r\n\t\u{a0}", true)]
#[case::content("  x ", false)]
fn blank_detection(#[case] text: &str, #[case] expected: bool) {
    assert_eq!(is_blank(text), expected);
}

#[rstest]
#[case::trailing_newlines("a = 1", "a = 1\n\n\n")]
#[case::trailing_spaces("a = 1  \t", "a = 1")]
fn trailing_whitespace_differences_are_ignored(#[case] original: &str, #[case] formatted: &str) {
    let mut subject = editor(original);
    let state = ViewState::capture(&subject);

    let applied = apply(&mut subject, original, formatted, &state);

    assert_eq!(applied, Applied::AlreadyFormatted);
    assert_eq!(subject.replacements, 0);
    assert_eq!(subject.text, original);
}

#[rstest]
fn interior_whitespace_is_significant() {
    let mut subject = editor("a =  1");
    let state = ViewState::capture(&subject);

    let applied = apply(&mut subject, "a =  1", "a = 1", &state);

    assert_eq!(applied, Applied::Replaced);
    assert_eq!(subject.text, "a = 1");
}

#[rstest]
fn replacement_restores_view_state() {
    let mut subject = editor("let a=1");
    subject.viewport = Viewport::new(4.0, 250.0);
    subject.selections = vec![Selection { anchor: 1, head: 5 }, Selection::caret(40)];
    let state = ViewState::capture(&subject);

    apply(&mut subject, "let a=1", "let a = 1;\n", &state);

    assert_eq!(subject.replacements, 1);
    assert_eq!(subject.viewport, Viewport::new(4.0, 250.0));
    assert_eq!(
        subject.selections,
        [Selection { anchor: 1, head: 5 }, Selection::caret(11)]
    );
}

#[rstest]
fn applying_twice_is_idempotent() {
    let original = "const x=1";
    let formatted = "const x = 1;\n";
    let mut subject = editor(original);
    let state = ViewState::capture(&subject);

    let first = apply(&mut subject, original, formatted, &state);
    let current = subject.text.clone();
    let second = apply(&mut subject, &current, formatted, &state);

    assert_eq!(first, Applied::Replaced);
    assert_eq!(second, Applied::AlreadyFormatted);
    assert_eq!(subject.replacements, 1);
}

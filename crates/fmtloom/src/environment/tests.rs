//! Unit tests for search path construction.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;

use rstest::rstest;
use tempfile::TempDir;

use super::*;

fn entries(path: &OsString) -> Vec<PathBuf> {
    env::split_paths(path).collect()
}

#[rstest]
fn local_bin_comes_first_when_present() {
    let project = TempDir::new().expect("temp dir");
    let local = project.path().join(LOCAL_BIN_DIR);
    fs::create_dir_all(&local).expect("create bin dir");
    let inherited = env::join_paths(["/usr/bin", "/bin"]).expect("joinable");

    let path = ExecPath::build(
        Some(project.path()),
        &[PathBuf::from("/usr/local/bin")],
        Some(inherited.as_os_str()),
    )
    .expect("path builds");

    assert_eq!(
        entries(&path),
        [
            local,
            PathBuf::from("/usr/local/bin"),
            PathBuf::from("/usr/bin"),
            PathBuf::from("/bin"),
        ]
    );
}

#[rstest]
fn missing_local_bin_is_skipped() {
    let project = TempDir::new().expect("temp dir");
    let inherited = OsString::from("/usr/bin");

    let path = ExecPath::build(Some(project.path()), &[], Some(inherited.as_os_str()))
        .expect("path builds");

    assert_eq!(entries(&path), [PathBuf::from("/usr/bin")]);
}

#[rstest]
fn extra_paths_keep_configured_order() {
    let extra = [PathBuf::from("/opt/b"), PathBuf::from("/opt/a")];

    let path = ExecPath::build(None, &extra, None).expect("path builds");

    assert_eq!(entries(&path), extra);
}

#[cfg(unix)]
#[rstest]
fn separator_inside_entry_is_rejected() {
    let result = ExecPath::build(None, &[PathBuf::from("/opt/a:/opt/b")], None);

    assert!(matches!(result, Err(SettingsError::SearchPath { .. })));
}

#[rstest]
fn child_environment_sets_path_on_command_only() {
    let before = env::var_os("PATH");
    let environment = ChildEnvironment::new(OsString::from("/only/here"));
    let mut command = std::process::Command::new("true");

    environment.apply(&mut command);

    let applied = command
        .get_envs()
        .find(|(key, _)| *key == OsStr::new("PATH"))
        .and_then(|(_, value)| value.map(OsStr::to_owned));
    assert_eq!(applied, Some(OsString::from("/only/here")));
    assert_eq!(env::var_os("PATH"), before);
}

//! JSON file backed settings for the CLI host.
//!
//! The global store is a single JSON object persisted at the configured
//! settings path. Project overrides come from the nearest
//! `.fmtloom-project.json` above the document, under the reserved
//! [`PROJECT_SETTINGS_KEY`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use fmtloom::SettingsError;
use fmtloom::settings::{PROJECT_SETTINGS_KEY, SettingsProvider};
use serde_json::{Map, Value};
use tracing::debug;

/// File name searched upward from the document for project overrides.
pub(crate) const PROJECT_FILE: &str = ".fmtloom-project.json";

const TARGET: &str = "fmtloom::cli::settings";

/// Settings provider reading a global JSON file and a project file.
#[derive(Debug)]
pub(crate) struct JsonSettings {
    path: PathBuf,
    global: Mutex<Map<String, Value>>,
    project: Map<String, Value>,
}

impl JsonSettings {
    /// Loads the global store at `path` and the project file above `document_dir`.
    ///
    /// A missing global file is an empty store.
    pub(crate) fn load(path: &Path, document_dir: Option<&Path>) -> Result<Self, SettingsError> {
        let global = read_object(path)?.unwrap_or_default();
        let project = match document_dir.and_then(find_project_file) {
            Some(project_file) => {
                debug!(target: TARGET, file = %project_file.display(), "project settings found");
                project_overrides(&project_file)?
            }
            None => Map::new(),
        };
        Ok(Self {
            path: path.to_path_buf(),
            global: Mutex::new(global),
            project,
        })
    }

    fn persist(&self, global: &Map<String, Value>) -> Result<(), SettingsError> {
        let write_error = |source: io::Error| SettingsError::Write {
            path: self.path.clone(),
            source: Arc::new(source),
        };
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        let mut rendered = serde_json::to_string_pretty(global).map_err(|source| {
            SettingsError::Parse {
                path: self.path.clone(),
                source: Arc::new(source),
            }
        })?;
        rendered.push('\n');
        fs::write(&self.path, rendered).map_err(write_error)
    }
}

impl SettingsProvider for JsonSettings {
    fn global_value(&self, key: &str) -> Option<Value> {
        self.global
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn project_value(&self, key: &str) -> Option<Value> {
        self.project.get(key).cloned()
    }

    fn update_global(
        &self,
        key: &str,
        edit: &mut dyn FnMut(&mut Value) -> bool,
    ) -> Result<bool, SettingsError> {
        let mut global = self.global.lock().unwrap_or_else(PoisonError::into_inner);
        let mut value = global.get(key).cloned().unwrap_or(Value::Null);
        if !edit(&mut value) {
            return Ok(false);
        }
        let mut updated = global.clone();
        updated.insert(key.to_owned(), value);
        self.persist(&updated)?;
        *global = updated;
        Ok(true)
    }
}

fn read_object(path: &Path) -> Result<Option<Map<String, Value>>, SettingsError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(error) => {
            return Err(SettingsError::Read {
                path: path.to_path_buf(),
                source: Arc::new(error),
            });
        }
    };
    if contents.trim().is_empty() {
        return Ok(Some(Map::new()));
    }
    let value: Value = serde_json::from_str(&contents).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source: Arc::new(source),
    })?;
    match value {
        Value::Object(map) => Ok(Some(map)),
        _ => Err(SettingsError::InvalidType {
            key: path.display().to_string(),
            expected: "a JSON object",
        }),
    }
}

fn project_overrides(path: &Path) -> Result<Map<String, Value>, SettingsError> {
    let mut document = read_object(path)?.unwrap_or_default();
    match document.remove(PROJECT_SETTINGS_KEY) {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(overrides)) => Ok(overrides),
        Some(_) => Err(SettingsError::InvalidType {
            key: PROJECT_SETTINGS_KEY.to_owned(),
            expected: "an object of project overrides",
        }),
    }
}

fn find_project_file(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(PROJECT_FILE))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    #[fixture]
    fn dir() -> TempDir {
        TempDir::new().expect("tempdir")
    }

    fn write(path: &Path, contents: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("mkdir");
        }
        fs::write(path, contents).expect("write");
    }

    #[rstest]
    fn missing_global_file_is_an_empty_store(dir: TempDir) {
        let settings =
            JsonSettings::load(&dir.path().join("settings.json"), None).expect("load");

        assert_eq!(settings.global_value("command_map"), None);
        assert_eq!(settings.project_value("command_map"), None);
    }

    #[rstest]
    fn project_overrides_come_from_the_nearest_project_file(dir: TempDir) {
        let path = dir.path().join("settings.json");
        write(&path, r#"{"debug": false}"#);
        write(
            &dir.path().join("repo").join(PROJECT_FILE),
            r#"{"fmtloom": {"debug": true}, "unrelated": 1}"#,
        );
        let document_dir = dir.path().join("repo").join("src");
        fs::create_dir_all(&document_dir).expect("mkdir");

        let settings = JsonSettings::load(&path, Some(&document_dir)).expect("load");

        assert_eq!(settings.global_value("debug"), Some(json!(false)));
        assert_eq!(settings.project_value("debug"), Some(json!(true)));
        assert_eq!(settings.project_value("unrelated"), None);
    }

    #[rstest]
    fn updates_persist_only_when_the_value_changes(dir: TempDir) {
        let path = dir.path().join("nested").join("settings.json");
        let settings = JsonSettings::load(&path, None).expect("load");

        let unchanged = settings
            .update_global("command_map", &mut |_| false)
            .expect("update");
        assert!(!unchanged);
        assert!(!path.exists());

        let changed = settings
            .update_global("command_map", &mut |value| {
                *value = json!({"elixir": null});
                true
            })
            .expect("update");
        assert!(changed);

        let persisted: Value = serde_json::from_str(
            &fs::read_to_string(&path).expect("read"),
        )
        .expect("parse");
        assert_eq!(persisted, json!({"command_map": {"elixir": null}}));
        assert_eq!(
            settings.global_value("command_map"),
            Some(json!({"elixir": null}))
        );
    }

    #[rstest]
    #[case::syntax("{not json", "parse")]
    #[case::shape("[1, 2]", "object")]
    fn malformed_global_files_are_rejected(
        dir: TempDir,
        #[case] contents: &str,
        #[case] fragment: &str,
    ) {
        let path = dir.path().join("settings.json");
        write(&path, contents);

        let error = JsonSettings::load(&path, None).err();

        let message = error.map(|found| found.to_string()).unwrap_or_default();
        assert!(message.contains(fragment), "unexpected error: {message}");
    }
}

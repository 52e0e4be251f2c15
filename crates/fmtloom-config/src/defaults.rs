use std::env;
use std::path::PathBuf;

use dirs::config_dir;

/// Default log filter expression used by the binary.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default upper bound, in seconds, for a single formatter process.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Directory name used under the platform configuration directory.
const APP_DIRECTORY: &str = "fmtloom";

/// File name of the persisted formatter settings.
const SETTINGS_FILE: &str = "settings.json";

/// Default log filter expression used by the binary.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binary.
#[must_use]
pub fn default_log_format() -> crate::logging::LogFormat {
    crate::logging::LogFormat::Compact
}

/// Computes the default location of the persisted formatter settings.
///
/// Falls back to the system temporary directory when the platform exposes no
/// configuration directory (for example in stripped-down containers).
#[must_use]
pub fn default_settings_path() -> PathBuf {
    let mut base = config_dir().unwrap_or_else(env::temp_dir);
    base.push(APP_DIRECTORY);
    base.push(SETTINGS_FILE);
    base
}

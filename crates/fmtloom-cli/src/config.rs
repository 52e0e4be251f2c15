//! Configuration loading helpers for the fmtloom CLI.
//!
//! Configuration flags are separated from the subcommand before parsing so
//! `ortho_config` only sees the flags it understands while clap handles the
//! rest.

use std::ffi::{OsStr, OsString};

use fmtloom_config::Config;
use ortho_config::OrthoConfig;

use crate::AppError;

/// CLI flags recognised by the configuration loader.
///
/// Must list every flag `fmtloom_config::Config` accepts.
pub(crate) const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--log-filter",
    "--log-format",
    "--settings-path",
    "--timeout-secs",
];

pub(crate) trait ConfigLoader {
    /// Loads configuration for the CLI.
    ///
    /// Configuration flags must appear before the subcommand; later flags are
    /// handed to the subcommand parser.
    fn load(&self, args: &[OsString]) -> Result<Config, AppError>;
}

pub(crate) struct OrthoConfigLoader;

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        Config::load_from_iter(args.iter().cloned()).map_err(AppError::LoadConfiguration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagAction {
    Include { needs_value: bool },
    Stop,
}

fn classify(argument: &OsStr) -> FlagAction {
    let text = argument.to_string_lossy();
    let Some(flag) = text.split('=').next().filter(|flag| flag.starts_with("--")) else {
        return FlagAction::Stop;
    };
    if CONFIG_CLI_FLAGS.contains(&flag) {
        FlagAction::Include {
            needs_value: !text.contains('='),
        }
    } else {
        FlagAction::Stop
    }
}

/// Arguments split into the configuration prefix and the command remainder.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct ConfigArgumentSplit {
    pub(crate) config_arguments: Vec<OsString>,
    pub(crate) command_arguments: Vec<OsString>,
}

/// Splits leading configuration flags from the command.
///
/// The program name is kept at the head of both halves.
pub(crate) fn split_config_arguments(args: &[OsString]) -> ConfigArgumentSplit {
    let Some((program, rest)) = args.split_first() else {
        return ConfigArgumentSplit::default();
    };
    let mut config_arguments = vec![program.clone()];
    let mut remaining = rest.iter();
    let mut command_arguments = vec![program.clone()];

    while let Some(argument) = remaining.next() {
        match classify(argument) {
            FlagAction::Include { needs_value } => {
                config_arguments.push(argument.clone());
                if needs_value && let Some(value) = remaining.next() {
                    config_arguments.push(value.clone());
                }
            }
            FlagAction::Stop => {
                command_arguments.push(argument.clone());
                break;
            }
        }
    }
    command_arguments.extend(remaining.cloned());

    ConfigArgumentSplit {
        config_arguments,
        command_arguments,
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn os(items: &[&str]) -> Vec<OsString> {
        items.iter().map(OsString::from).collect()
    }

    #[rstest]
    #[case::inline("--log-filter=debug", FlagAction::Include { needs_value: false })]
    #[case::separate("--settings-path", FlagAction::Include { needs_value: true })]
    #[case::subcommand("format", FlagAction::Stop)]
    #[case::unknown("--stdin", FlagAction::Stop)]
    fn flags_are_classified(#[case] argument: &str, #[case] expected: FlagAction) {
        assert_eq!(classify(OsStr::new(argument)), expected);
    }

    #[rstest]
    fn leading_config_flags_are_split_off() {
        let args = os(&[
            "fmtloom",
            "--log-filter",
            "debug",
            "--timeout-secs=5",
            "format",
            "--stdin",
            "a.json",
        ]);

        let split = split_config_arguments(&args);

        assert_eq!(
            split.config_arguments,
            os(&["fmtloom", "--log-filter", "debug", "--timeout-secs=5"])
        );
        assert_eq!(
            split.command_arguments,
            os(&["fmtloom", "format", "--stdin", "a.json"])
        );
    }

    #[rstest]
    fn config_flags_after_the_subcommand_stay_with_it() {
        let args = os(&["fmtloom", "format", "--log-filter", "debug", "a.json"]);

        let split = split_config_arguments(&args);

        assert_eq!(split.config_arguments, os(&["fmtloom"]));
        assert_eq!(
            split.command_arguments,
            os(&["fmtloom", "format", "--log-filter", "debug", "a.json"])
        );
    }

    #[rstest]
    fn empty_arguments_split_to_nothing() {
        assert_eq!(split_config_arguments(&[]), ConfigArgumentSplit::default());
    }
}

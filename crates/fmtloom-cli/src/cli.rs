//! CLI argument definitions for `fmtloom`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Command-line interface for the fmtloom format dispatcher.
#[derive(Parser, Debug)]
#[command(name = "fmtloom", version, disable_help_subcommand = true)]
pub(crate) struct Cli {
    /// The action to perform.
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Structured subcommands.
#[derive(Subcommand, Debug, Clone)]
pub(crate) enum CliCommand {
    /// Formats a file with the formatters configured for its language.
    Format(FormatArgs),
    /// Prints the language identifier used to look up a file's formatters.
    Language(LanguageArgs),
}

/// Arguments of `fmtloom format`.
#[derive(Args, Debug, Clone)]
pub(crate) struct FormatArgs {
    /// The file to format.
    #[arg(value_name = "FILE")]
    pub(crate) file: PathBuf,
    /// Open workspace folder; repeat for multi-root workspaces.
    #[arg(long = "workspace", value_name = "DIR")]
    pub(crate) workspaces: Vec<PathBuf>,
    /// Syntax name to use instead of detecting it from the file extension.
    #[arg(long, value_name = "NAME")]
    pub(crate) syntax: Option<String>,
    /// Reads the buffer from stdin and writes the result to stdout.
    #[arg(long)]
    pub(crate) stdin: bool,
}

/// Arguments of `fmtloom language`.
#[derive(Args, Debug, Clone)]
pub(crate) struct LanguageArgs {
    /// The file to inspect.
    #[arg(value_name = "FILE")]
    pub(crate) file: PathBuf,
    /// Syntax name to use instead of detecting it from the file extension.
    #[arg(long, value_name = "NAME")]
    pub(crate) syntax: Option<String>,
}

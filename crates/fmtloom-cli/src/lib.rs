//! Command-line host for the fmtloom format dispatcher.
//!
//! The binary adapts a file on disk (or a buffer on stdin) to the engine's
//! [`fmtloom::Editor`] capability, backs settings with a JSON file, and maps
//! the request outcome to a process exit code. The runtime is exercised from
//! the binary entrypoint and from tests where configuration loading and the
//! IO streams are substituted.

use std::ffi::OsString;
use std::io::{Read, Write};
use std::process::ExitCode;

use clap::Parser;
use fmtloom::language::resolve_language;
use fmtloom::{Orchestrator, Status, SystemRunner};
use fmtloom_config::Config;
use tracing::debug;

mod cli;
mod config;
mod editor;
mod errors;
mod settings;
mod syntax;
mod telemetry;

use cli::{Cli, CliCommand, FormatArgs, LanguageArgs};
use config::{ConfigLoader, OrthoConfigLoader, split_config_arguments};
use editor::{BufferSource, FileEditor};
pub(crate) use errors::{AppError, USAGE_EXIT_CODE};
use settings::JsonSettings;

const TARGET: &str = "fmtloom::cli";

struct CliRunner<'a, R: Read, W: Write, E: Write, L: ConfigLoader> {
    stdin: &'a mut R,
    stdout: &'a mut W,
    stderr: &'a mut E,
    loader: &'a L,
}

impl<R, W, E, L> CliRunner<'_, R, W, E, L>
where
    R: Read,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    fn run<I>(&mut self, args: I) -> ExitCode
    where
        I: IntoIterator<Item = OsString>,
    {
        let arguments: Vec<OsString> = args.into_iter().collect();
        let split = split_config_arguments(&arguments);

        let cli = match Cli::try_parse_from(&split.command_arguments) {
            Ok(cli) => cli,
            Err(error) => return self.report_parse_error(&error),
        };

        let result = self
            .loader
            .load(&split.config_arguments)
            .and_then(|config| {
                telemetry::initialise(&config)?;
                Ok(config)
            })
            .and_then(|config| self.dispatch(cli.command, &config));

        match result {
            Ok(exit_code) => exit_code,
            Err(error) => {
                drop(writeln!(self.stderr, "fmtloom: {error}"));
                ExitCode::from(error.exit_code())
            }
        }
    }

    fn report_parse_error(&mut self, error: &clap::Error) -> ExitCode {
        if error.use_stderr() {
            drop(write!(self.stderr, "{error}"));
            return ExitCode::from(USAGE_EXIT_CODE);
        }
        drop(write!(self.stdout, "{error}"));
        ExitCode::SUCCESS
    }

    fn dispatch(&mut self, command: CliCommand, config: &Config) -> Result<ExitCode, AppError> {
        match command {
            CliCommand::Format(args) => self.format(&args, config),
            CliCommand::Language(args) => self.language(&args),
        }
    }

    fn format(&mut self, args: &FormatArgs, config: &Config) -> Result<ExitCode, AppError> {
        let mut editor = FileEditor::open(args, &mut *self.stdin)?;
        let settings = JsonSettings::load(config.settings_path(), editor.document_dir())?;
        let orchestrator = Orchestrator::new(SystemRunner::new(config.timeout()), settings);

        let status = orchestrator.format(&mut editor);
        editor.commit()?;
        self.emit(&editor, &status)?;
        Ok(ExitCode::from(status.exit_state().exit_code()))
    }

    /// Prints user messages to stderr and the result to stdout.
    ///
    /// Stdout carries the buffer in stdin mode and the exit-state name
    /// otherwise, so editors and scripts can each parse it.
    fn emit(&mut self, editor: &FileEditor, status: &Status) -> Result<(), AppError> {
        for line in editor.errors().iter().chain(editor.messages()) {
            writeln!(self.stderr, "{line}").map_err(AppError::Output)?;
        }
        let written = match editor.source() {
            BufferSource::Stdin => write!(self.stdout, "{}", editor.buffer()),
            BufferSource::File => writeln!(self.stdout, "{}", status.exit_state()),
        };
        written.map_err(AppError::Output)?;
        debug!(target: TARGET, state = %status.exit_state(), "request reported");
        Ok(())
    }

    fn language(&mut self, args: &LanguageArgs) -> Result<ExitCode, AppError> {
        let editor = FileEditor::inspect(args);
        let language =
            resolve_language(&editor).ok_or_else(|| AppError::UnknownLanguage(args.file.clone()))?;
        writeln!(self.stdout, "{language}").map_err(AppError::Output)?;
        Ok(ExitCode::SUCCESS)
    }
}

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, R, W, E>(args: I, stdin: &mut R, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    R: Read,
    W: Write,
    E: Write,
{
    run_with_loader(args, stdin, stdout, stderr, &OrthoConfigLoader)
}

fn run_with_loader<I, R, W, E, L>(
    args: I,
    stdin: &mut R,
    stdout: &mut W,
    stderr: &mut E,
    loader: &L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    R: Read,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    let mut runner = CliRunner {
        stdin,
        stdout,
        stderr,
        loader,
    };
    runner.run(args)
}

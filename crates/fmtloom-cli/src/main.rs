//! CLI entrypoint for the fmtloom format dispatcher.
//!
//! The binary delegates to [`fmtloom_cli::run`], which loads configuration,
//! parses the command line, and formats the requested file.

use std::io::{self, StderrLock, StdinLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdin: StdinLock<'_> = io::stdin().lock();
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    fmtloom_cli::run(std::env::args_os(), &mut stdin, &mut stdout, &mut stderr)
}

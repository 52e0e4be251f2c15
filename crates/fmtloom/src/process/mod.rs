//! Formatter process execution.
//!
//! [`ProcessRunner`] is the seam between the orchestrator and the operating
//! system. [`SystemRunner`] spawns the program with no stdin, drains stdout
//! and stderr on separate reader threads so a chatty formatter cannot block
//! on a full pipe, and polls for exit until the configured timeout expires.
//! A non-zero exit is reported as an unsuccessful [`FormatResult`]; only
//! failures to start or to finish are [`RunError`]s.

use std::ffi::{OsStr, OsString};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::environment::ChildEnvironment;
use crate::error::RunError;

/// Tracing target for formatter process operations.
const PROCESS_TARGET: &str = "fmtloom::process";

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// A fully expanded command ready to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: OsString,
    args: Vec<OsString>,
    cwd: PathBuf,
    environment: ChildEnvironment,
}

impl Invocation {
    /// Splits `argv` into program and arguments.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::EmptyCommand`] when `argv` is empty.
    pub fn new(
        argv: Vec<OsString>,
        cwd: PathBuf,
        environment: ChildEnvironment,
    ) -> Result<Self, RunError> {
        let mut parts = argv.into_iter();
        let program = parts.next().ok_or(RunError::EmptyCommand)?;
        Ok(Self {
            program,
            args: parts.collect(),
            cwd,
            environment,
        })
    }

    /// The program to execute.
    #[must_use]
    pub fn program(&self) -> &OsStr {
        &self.program
    }

    /// Program name for messages.
    #[must_use]
    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    /// Arguments after the program.
    #[must_use]
    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Working directory of the child.
    #[must_use]
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Environment overrides for the child.
    #[must_use]
    pub const fn environment(&self) -> &ChildEnvironment {
        &self.environment
    }

    /// The whole command line for diagnostics.
    #[must_use]
    pub fn display_line(&self) -> String {
        std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(OsString::as_os_str))
            .map(OsStr::to_string_lossy)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Outcome of one formatter run that started and finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatResult {
    exit_code: Option<i32>,
    stdout: String,
    stderr: String,
}

impl FormatResult {
    /// Creates a result. `exit_code` is `None` when a signal ended the process.
    #[must_use]
    pub fn new(
        exit_code: Option<i32>,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
    ) -> Self {
        Self {
            exit_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// The exit code, if the process exited normally.
    #[must_use]
    pub const fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    /// Captured standard output.
    #[must_use]
    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    /// Captured standard error.
    #[must_use]
    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    /// Whether the process exited with status zero.
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self.exit_code, Some(0))
    }
}

/// Runs formatter invocations.
///
/// # Example
///
/// ```
/// use fmtloom::process::{FormatResult, Invocation, ProcessRunner};
/// use fmtloom::RunError;
///
/// struct Succeeds;
///
/// impl ProcessRunner for Succeeds {
///     fn run(&self, _invocation: &Invocation) -> Result<FormatResult, RunError> {
///         Ok(FormatResult::new(Some(0), "", ""))
///     }
/// }
/// ```
pub trait ProcessRunner {
    /// Runs `invocation` to completion.
    ///
    /// # Errors
    ///
    /// Returns a [`RunError`] when the program cannot be started, does not
    /// finish in time, or cannot be awaited.
    fn run(&self, invocation: &Invocation) -> Result<FormatResult, RunError>;
}

impl<R: ProcessRunner + ?Sized> ProcessRunner for &R {
    fn run(&self, invocation: &Invocation) -> Result<FormatResult, RunError> {
        (**self).run(invocation)
    }
}

/// Runs invocations as operating system processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemRunner {
    timeout: Duration,
}

impl SystemRunner {
    /// Creates a runner that kills children running longer than `timeout`.
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// The configured timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl ProcessRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<FormatResult, RunError> {
        let program = invocation.program_name();
        let mut command = Command::new(invocation.program());
        command
            .args(invocation.args())
            .current_dir(invocation.cwd())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        invocation.environment().apply(&mut command);

        debug!(
            target: PROCESS_TARGET,
            command = %invocation.display_line(),
            cwd = %invocation.cwd().display(),
            "spawning formatter"
        );

        let mut child = command.spawn().map_err(|source| RunError::Launch {
            program: program.clone(),
            source: Arc::new(source),
        })?;
        let stdout = child.stdout.take().map(spawn_reader);
        let stderr = child.stderr.take().map(spawn_reader);

        let start = Instant::now();
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if start.elapsed() > self.timeout => {
                    let timeout_secs = self.timeout.as_secs();
                    warn!(
                        target: PROCESS_TARGET,
                        program = %program,
                        timeout_secs,
                        "formatter timed out, killing process"
                    );
                    drop(child.kill());
                    drop(child.wait());
                    return Err(RunError::Timeout {
                        program,
                        timeout_secs,
                    });
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(source) => {
                    drop(child.kill());
                    return Err(RunError::Io {
                        program,
                        source: Arc::new(source),
                    });
                }
            }
        };

        debug!(
            target: PROCESS_TARGET,
            program = %program,
            ?status,
            elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "formatter exited"
        );

        Ok(FormatResult::new(
            status.code(),
            collect(&program, stdout)?,
            collect(&program, stderr)?,
        ))
    }
}

type Reader = JoinHandle<std::io::Result<Vec<u8>>>;

fn spawn_reader(mut pipe: impl Read + Send + 'static) -> Reader {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        pipe.read_to_end(&mut buffer).map(|_| buffer)
    })
}

fn collect(program: &str, reader: Option<Reader>) -> Result<String, RunError> {
    let Some(handle) = reader else {
        return Ok(String::new());
    };
    let bytes = handle
        .join()
        .unwrap_or_else(|_| Ok(Vec::new()))
        .map_err(|source| RunError::Io {
            program: program.to_owned(),
            source: Arc::new(source),
        })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

//! End-to-end driver for one format request.
//!
//! A request moves through [`Phase`]s in order and ends with exactly one
//! [`Status`], which is shown through [`Editor::status_message`]. Failures
//! never escape to the host: every error is converted into a status. The
//! staged file is owned by the request and removed on every path.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::apply::{self, Applied, ViewState};
use crate::command::{self, CommandSpec, ResolvedOptions};
use crate::editor::{Editor, SaveChoice};
use crate::environment::ChildEnvironment;
use crate::error::{RunError, SettingsError, StagingError};
use crate::language::{Lookup, resolve_language};
use crate::process::{Invocation, ProcessRunner};
use crate::project::ProjectContext;
use crate::settings::{EffectiveConfig, PipelinePolicy, SettingsProvider};
use crate::staging::StagedFile;

mod status;

pub use status::{ExitState, PRODUCT_NAME, Status};

/// Tracing target for request orchestration.
const ORCHESTRATOR_TARGET: &str = "fmtloom::orchestrator";

/// Logs a per-request diagnostic, at `info` when the `debug` setting is on.
macro_rules! diagnostic {
    ($enabled:expr, $($arg:tt)+) => {
        if $enabled {
            info!(target: ORCHESTRATOR_TARGET, $($arg)+);
        } else {
            debug!(target: ORCHESTRATOR_TARGET, $($arg)+);
        }
    };
}

/// Stages a request moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Checking that the document is saved and not blank.
    Validating,
    /// Computing project, settings, language and commands.
    Resolving,
    /// The buffer has been written to a staged file.
    Staged,
    /// Running the command at this pipeline index.
    Running(usize),
    /// Reading the staged file back and updating the buffer.
    Applying,
    /// The status has been reported.
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validating => f.write_str("validating"),
            Self::Resolving => f.write_str("resolving"),
            Self::Staged => f.write_str("staged"),
            Self::Running(index) => write!(f, "running({index})"),
            Self::Applying => f.write_str("applying"),
            Self::Done => f.write_str("done"),
        }
    }
}

/// Hook invoked by the host just before a document is saved.
pub trait SaveHook {
    /// Formats the document when `format_on_save` is enabled.
    ///
    /// Returns `None` when the hook did nothing.
    fn on_pre_save(&self, editor: &mut dyn Editor) -> Option<Status>;
}

/// Everything resolved before the buffer is staged.
struct Plan {
    path: PathBuf,
    text: String,
    project: ProjectContext,
    environment: ChildEnvironment,
    specs: Vec<CommandSpec>,
    options: ResolvedOptions,
    policy: PipelinePolicy,
    debug: bool,
}

/// How the pipeline ended.
enum PipelineOutcome {
    Clean,
    Failed { command: String, exit_code: Option<i32> },
    Fatal(Status),
}

/// Drives format requests with an injected runner and settings provider.
///
/// # Example
///
/// ```
/// use fmtloom::process::SystemRunner;
/// use fmtloom::settings::MemorySettings;
/// use fmtloom::Orchestrator;
/// use std::time::Duration;
///
/// let orchestrator = Orchestrator::new(
///     SystemRunner::new(Duration::from_secs(30)),
///     MemorySettings::new(),
/// );
/// # let _ = orchestrator;
/// ```
#[derive(Debug)]
pub struct Orchestrator<R, S> {
    runner: R,
    settings: S,
}

impl<R, S> Orchestrator<R, S> {
    /// Creates an orchestrator.
    #[must_use]
    pub const fn new(runner: R, settings: S) -> Self {
        Self { runner, settings }
    }

    /// The process runner.
    #[must_use]
    pub const fn runner(&self) -> &R {
        &self.runner
    }

    /// The settings provider.
    #[must_use]
    pub const fn settings(&self) -> &S {
        &self.settings
    }
}

impl<R: ProcessRunner, S: SettingsProvider> Orchestrator<R, S> {
    /// Formats the document open in `editor` and reports the outcome.
    pub fn format(&self, editor: &mut dyn Editor) -> Status {
        let status = self.drive(editor).unwrap_or_else(|status| status);
        report(editor, &status);
        enter(Phase::Done);
        status
    }

    fn drive(&self, editor: &mut dyn Editor) -> Result<Status, Status> {
        enter(Phase::Validating);
        let path = ensure_saved(editor)?;
        let text = editor.text();
        if apply::is_blank(&text) {
            return Ok(Status::NothingToFormat);
        }

        enter(Phase::Resolving);
        let plan = match self.plan(editor, path, text)? {
            Planned::Ready(plan) => plan,
            Planned::Finished(status) => return Ok(status),
        };
        let state = ViewState::capture(editor);

        let staged =
            StagedFile::stage(&plan.text, &plan.path, plan.project.root()).map_err(Status::from)?;
        enter(Phase::Staged);
        let outcome = self.run_pipeline(&plan, &staged);

        enter(Phase::Applying);
        let formatted = staged.unstage();
        let failure = match outcome {
            PipelineOutcome::Fatal(status) => return Err(status),
            PipelineOutcome::Failed { command, exit_code } => Some((command, exit_code)),
            PipelineOutcome::Clean => None,
        };
        if let Some((command, exit_code)) = failure.clone()
            && plan.policy == PipelinePolicy::FailFast
        {
            return Err(Status::ToolFailed {
                command,
                exit_code,
                applied: false,
            });
        }
        let output = formatted.map_err(Status::from)?;
        let applied = apply::apply(editor, &plan.text, &output, &state);
        match (failure, applied) {
            (Some((command, exit_code)), applied) => Err(Status::ToolFailed {
                command,
                exit_code,
                applied: applied == Applied::Replaced,
            }),
            (None, Applied::Replaced) => Ok(Status::Formatted),
            (None, Applied::AlreadyFormatted) => Ok(Status::AlreadyFormatted),
        }
    }

    fn plan(&self, editor: &dyn Editor, path: PathBuf, text: String) -> Result<Planned, Status> {
        let config = EffectiveConfig::resolve(&self.settings).map_err(Status::from)?;
        let project = ProjectContext::resolve(&path, &editor.workspace_folders());
        diagnostic!(config.debug(), file = %path.display(), "format requested");
        diagnostic!(
            config.debug(),
            cwd = %project.root().display(),
            source = ?project.source(),
            "resolved project"
        );

        let Some(language) = resolve_language(editor) else {
            return Ok(Planned::Finished(Status::Unsupported {
                language: None,
                registered: false,
            }));
        };
        diagnostic!(config.debug(), language = %language, "resolved language");

        let registration = config
            .command_map()
            .resolve_or_register(&language, &self.settings)
            .map_err(Status::from)?;
        let specs = match registration.lookup {
            Lookup::Commands(specs) => specs,
            Lookup::Unsupported => {
                return Ok(Planned::Finished(Status::Unsupported {
                    language: Some(language),
                    registered: registration.mutated,
                }));
            }
        };
        let pipeline: Vec<String> = specs.iter().map(ToString::to_string).collect();
        diagnostic!(config.debug(), commands = %pipeline.join(" | "), "resolved commands");

        let environment =
            ChildEnvironment::for_project(project.root(), config.paths()).map_err(Status::from)?;
        let options = config.options_for(&language).for_file(&base_name(&path));
        Ok(Planned::Ready(Box::new(Plan {
            path,
            text,
            project,
            environment,
            specs,
            options,
            policy: config.policy(),
            debug: config.debug(),
        })))
    }

    fn run_pipeline(&self, plan: &Plan, staged: &StagedFile) -> PipelineOutcome {
        let mut first_failure = None;
        for (index, spec) in plan.specs.iter().enumerate() {
            enter(Phase::Running(index));
            let argv = command::build(spec, staged.path(), &plan.options);
            let invocation = match Invocation::new(
                argv,
                plan.project.root().to_path_buf(),
                plan.environment.clone(),
            ) {
                Ok(invocation) => invocation,
                Err(error) => return PipelineOutcome::Fatal(run_failed(spec, error)),
            };
            diagnostic!(plan.debug, command = %invocation.display_line(), "running formatter");

            let result = match self.runner.run(&invocation) {
                Ok(result) => result,
                Err(error) => return PipelineOutcome::Fatal(run_failed(spec, error)),
            };
            if result.success() {
                if !result.stderr().trim().is_empty() {
                    warn!(
                        target: ORCHESTRATOR_TARGET,
                        command = %spec,
                        stderr = %result.stderr().trim_end(),
                        "formatter succeeded with warnings"
                    );
                }
                if !result.stdout().trim().is_empty() {
                    diagnostic!(
                        plan.debug,
                        command = %spec,
                        stdout = %result.stdout().trim_end(),
                        "formatter output"
                    );
                }
                continue;
            }

            warn!(
                target: ORCHESTRATOR_TARGET,
                command = %spec,
                exit_code = ?result.exit_code(),
                stdout = %result.stdout().trim_end(),
                stderr = %result.stderr().trim_end(),
                "formatter failed"
            );
            if first_failure.is_none() {
                first_failure = Some((spec.to_string(), result.exit_code()));
            }
            if plan.policy == PipelinePolicy::FailFast {
                break;
            }
        }
        match first_failure {
            Some((command, exit_code)) => PipelineOutcome::Failed { command, exit_code },
            None => PipelineOutcome::Clean,
        }
    }
}

impl<R: ProcessRunner, S: SettingsProvider> SaveHook for Orchestrator<R, S> {
    fn on_pre_save(&self, editor: &mut dyn Editor) -> Option<Status> {
        editor.file_path()?;
        match EffectiveConfig::resolve(&self.settings) {
            Ok(config) if config.format_on_save() => Some(self.format(editor)),
            Ok(_) => None,
            Err(error) => {
                let status = Status::from(error);
                report(editor, &status);
                Some(status)
            }
        }
    }
}

enum Planned {
    Ready(Box<Plan>),
    Finished(Status),
}

fn ensure_saved(editor: &mut dyn Editor) -> Result<PathBuf, Status> {
    if let Some(path) = editor.file_path() {
        return Ok(path);
    }
    let prompt = format!("{PRODUCT_NAME}\n\nFile must first be saved.");
    match editor.prompt_save(&prompt) {
        SaveChoice::Save => editor.save(),
        SaveChoice::DontSave | SaveChoice::Cancel => {}
    }
    editor.file_path().ok_or(Status::SaveCancelled)
}

fn report(editor: &mut dyn Editor, status: &Status) {
    let message = status.user_message();
    let state = status.exit_state();
    if state.is_ok() {
        info!(target: ORCHESTRATOR_TARGET, state = %state, "{message}");
    } else {
        warn!(target: ORCHESTRATOR_TARGET, state = %state, "{message}");
    }
    editor.status_message(&message);
    if matches!(status, Status::LaunchFailed { .. }) {
        editor.error_message(&message);
    }
}

fn enter(phase: Phase) {
    debug!(target: ORCHESTRATOR_TARGET, %phase, "entering phase");
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl From<SettingsError> for Status {
    fn from(error: SettingsError) -> Self {
        Self::InvalidSettings {
            message: error.to_string(),
        }
    }
}

impl From<StagingError> for Status {
    fn from(error: StagingError) -> Self {
        Self::StagingFailed {
            message: error.to_string(),
        }
    }
}

fn run_failed(spec: &CommandSpec, error: RunError) -> Status {
    match error {
        RunError::Launch { program, source } => Status::LaunchFailed {
            program,
            message: source.to_string(),
        },
        RunError::Timeout {
            program,
            timeout_secs,
        } => Status::TimedOut {
            program,
            timeout_secs,
        },
        RunError::EmptyCommand => Status::InvalidSettings {
            message: RunError::EmptyCommand.to_string(),
        },
        RunError::Io { program, source } => {
            warn!(
                target: ORCHESTRATOR_TARGET,
                program = %program,
                error = %source,
                "lost track of formatter process"
            );
            Status::ToolFailed {
                command: spec.to_string(),
                exit_code: None,
                applied: false,
            }
        }
    }
}

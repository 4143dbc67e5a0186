//! Update action dispatch.
//!
//! The update action is an external program run against one monitored
//! folder. The watcher only cares about its exit status.

mod vars;

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use anyhow::Result;

pub use vars::{FOLDER_VAR, build_vars, resolve_args};

use crate::utils::exec::Cmd;

/// Default arguments: the target folder.
pub fn default_args() -> Vec<String> {
    vec![format!("${FOLDER_VAR}")]
}

/// How to invoke the update action for a folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateAction {
    /// Absolute path of the action (script or executable).
    pub path: PathBuf,
    /// Interpreter prefix, e.g. `["python3"]`. Empty runs `path` directly.
    pub runner: Vec<String>,
    /// Arguments after the action path; `$STALEWATCH_*` is substituted.
    pub args: Vec<String>,
}

impl UpdateAction {
    #[cfg(test)]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            runner: Vec::new(),
            args: default_args(),
        }
    }

    /// File name of the action, for logs and alert subjects.
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Build the command that runs this action against `folder`.
    pub fn command(&self, folder: &Path) -> Cmd {
        let vars = build_vars(folder, &self.path);
        let args = resolve_args(&self.args, &vars);

        let cmd = if self.runner.is_empty() {
            Cmd::new(&self.path)
        } else {
            Cmd::from_slice(&self.runner).arg(&self.path)
        };

        cmd.args(args).cwd(folder).envs(&vars)
    }
}

/// Runs the update action. Implementations must treat a non-zero exit and a
/// failure to start identically: both are an `Err`.
pub trait TriggerDispatcher: Send + Sync {
    fn dispatch(&self, action: &UpdateAction, folder: &Path) -> Result<()>;
}

/// Dispatcher that runs the action as a subprocess.
#[derive(Debug, Default, Clone, Copy)]
pub struct CommandDispatcher;

impl TriggerDispatcher for CommandDispatcher {
    fn dispatch(&self, action: &UpdateAction, folder: &Path) -> Result<()> {
        crate::log!("dispatch"; "running {} for {}", action.display_name(), folder.display());

        let output = action.command(folder).run()?;

        if crate::logger::is_verbose() {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let stdout = stdout.trim();
            if !stdout.is_empty() {
                crate::log!("dispatch"; "{}", stdout);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerOutcome {
    Success,
    Failure(String),
}

/// Result of one dispatch attempt.
#[derive(Debug, Clone)]
pub struct TriggerRecord {
    pub folder: PathBuf,
    pub action: PathBuf,
    pub started_at: SystemTime,
    pub elapsed: Duration,
    pub outcome: TriggerOutcome,
}

impl TriggerRecord {
    pub fn is_success(&self) -> bool {
        self.outcome == TriggerOutcome::Success
    }

    pub fn error_detail(&self) -> Option<&str> {
        match &self.outcome {
            TriggerOutcome::Success => None,
            TriggerOutcome::Failure(detail) => Some(detail),
        }
    }
}

/// Dispatch once and record the outcome.
pub fn fire(
    dispatcher: &dyn TriggerDispatcher,
    action: &UpdateAction,
    folder: &Path,
) -> TriggerRecord {
    let started_at = SystemTime::now();
    let timer = std::time::Instant::now();

    let outcome = match dispatcher.dispatch(action, folder) {
        Ok(()) => TriggerOutcome::Success,
        Err(e) => TriggerOutcome::Failure(format!("{e:#}")),
    };

    TriggerRecord {
        folder: folder.to_path_buf(),
        action: action.path.clone(),
        started_at,
        elapsed: timer.elapsed(),
        outcome,
    }
}

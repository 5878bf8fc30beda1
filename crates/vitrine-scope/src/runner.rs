//! The scoped build/lint task.

use std::path::PathBuf;
use std::process::{Command, ExitStatus};

use thiserror::Error;
use tracing::info;

/// Placeholder replaced by the scope's target in the command template.
pub const TARGET_PLACEHOLDER: &str = "{target}";

/// Lint the target and everything that depends on it.
pub const DEFAULT_TASK_TEMPLATE: &str = "pnpm turbo run lint --filter={target}...";

/// Errors building a task command.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunnerError {
    /// The template could not be split into words.
    #[error("task command '{template}' is malformed: {reason}")]
    Malformed {
        /// The template as configured.
        template: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The template never mentions the target.
    #[error("task command '{template}' must contain {{target}}")]
    MissingPlaceholder {
        /// The template as configured.
        template: String,
    },
}

/// Runs the scoped task for a target.
pub trait TaskRunner {
    /// Human-readable command line for `target`.
    fn command_line(&self, target: &str) -> String;

    /// Run the task to completion.
    fn run(&self, target: &str) -> std::io::Result<ExitStatus>;
}

/// [`TaskRunner`] spawning a program from a word-split command template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRunner {
    words: Vec<String>,
    workdir: Option<PathBuf>,
}

impl CommandRunner {
    /// Parse a template such as `pnpm turbo run lint --filter={target}...`.
    pub fn from_template(template: &str) -> Result<Self, RunnerError> {
        let words = shell_words::split(template).map_err(|e| RunnerError::Malformed {
            template: template.to_string(),
            reason: e.to_string(),
        })?;

        if words.is_empty() {
            return Err(RunnerError::Malformed {
                template: template.to_string(),
                reason: "empty command".into(),
            });
        }
        if !words.iter().any(|w| w.contains(TARGET_PLACEHOLDER)) {
            return Err(RunnerError::MissingPlaceholder {
                template: template.to_string(),
            });
        }

        Ok(Self {
            words,
            workdir: None,
        })
    }

    /// Run the task from `dir` instead of the current directory.
    pub fn with_workdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(dir.into());
        self
    }

    /// Program and arguments with the target substituted.
    pub fn argv(&self, target: &str) -> Vec<String> {
        self.words
            .iter()
            .map(|w| w.replace(TARGET_PLACEHOLDER, target))
            .collect()
    }
}

impl TaskRunner for CommandRunner {
    fn command_line(&self, target: &str) -> String {
        shell_words::join(self.argv(target))
    }

    fn run(&self, target: &str) -> std::io::Result<ExitStatus> {
        let argv = self.argv(target);
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"))?;

        info!(command = %self.command_line(target), "running scoped task");
        let mut cmd = Command::new(program);
        cmd.args(args);
        if let Some(dir) = &self.workdir {
            cmd.current_dir(dir);
        }
        // stdio is inherited so the task's own output reaches the user.
        cmd.status()
    }
}

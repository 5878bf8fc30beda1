//! The scope check shared by the pre-commit hook and CI.
//!
//! One run goes resolve, collect, classify, then either skips the task for an
//! infra-only scope or runs it. Any failure stops the run; the task never
//! starts before classification is complete.

use std::process::ExitStatus;

use thiserror::Error;
use tracing::{debug, info};
use vitrine_rules::{classify, Classification, RulesError, Scope, ScopeTable};

use crate::changes::{collect_changes, ChangeSource};
use crate::git::{GitError, Vcs};
use crate::report::ViolationReport;
use crate::runner::TaskRunner;

/// Reasons a scope check fails.
#[derive(Error, Debug)]
pub enum CheckError {
    /// The branch has no scope or the table is invalid.
    #[error(transparent)]
    Scope(#[from] RulesError),

    /// Files outside the scope were changed.
    #[error("{0}")]
    Blocked(ViolationReport),

    /// The change set could not be read.
    #[error(transparent)]
    Git(#[from] GitError),

    /// The task could not be started.
    #[error("failed to start task `{command}`: {source}")]
    TaskSpawn {
        /// The command line.
        command: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The task ran and failed.
    #[error("task `{command}` for target '{target}' failed ({status})")]
    TaskFailed {
        /// Target the task was scoped to.
        target: String,
        /// The command line.
        command: String,
        /// Exit status.
        status: ExitStatus,
    },
}

/// How a successful check ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing changed; no task run.
    NoChanges,
    /// All files allowed; the scope has no task.
    InfraOnly {
        /// Number of files checked.
        files: usize,
    },
    /// All files allowed and the task passed.
    Passed {
        /// Number of files checked.
        files: usize,
        /// Target the task ran for.
        target: String,
    },
}

/// Resolve the scope for `branch`.
pub fn resolve_scope<'a>(table: &'a ScopeTable, branch: &str) -> Result<&'a Scope, CheckError> {
    Ok(table.resolve(branch)?)
}

/// Classify `files` and fail with a full report if any is outside `scope`.
pub fn classify_changes(
    table: &ScopeTable,
    scope: &Scope,
    files: &[String],
) -> Result<Classification, CheckError> {
    let classification = classify(files, scope);
    if classification.is_clean() {
        Ok(classification)
    } else {
        Err(CheckError::Blocked(ViolationReport::new(
            scope,
            &classification,
            table,
        )))
    }
}

/// Run the scoped task for `target`; a non-zero exit is fatal.
pub fn run_scoped_task(runner: &dyn TaskRunner, target: &str) -> Result<(), CheckError> {
    let command = runner.command_line(target);
    let status = runner.run(target).map_err(|source| CheckError::TaskSpawn {
        command: command.clone(),
        source,
    })?;

    if status.success() {
        Ok(())
    } else {
        Err(CheckError::TaskFailed {
            target: target.to_string(),
            command,
            status,
        })
    }
}

/// A configured scope check.
pub struct ScopeCheck<'a> {
    scopes: &'a ScopeTable,
    vcs: &'a dyn Vcs,
    runner: &'a dyn TaskRunner,
}

impl<'a> ScopeCheck<'a> {
    /// Create a check over the given table, repository and runner.
    pub fn new(scopes: &'a ScopeTable, vcs: &'a dyn Vcs, runner: &'a dyn TaskRunner) -> Self {
        Self {
            scopes,
            vcs,
            runner,
        }
    }

    /// Check the changes from `source` on `branch`.
    pub fn run(&self, branch: &str, source: &ChangeSource) -> Result<Outcome, CheckError> {
        let scope = resolve_scope(self.scopes, branch)?;
        println!("Branch: {branch}");
        println!(
            "Scope: {} (target: {})",
            scope.name(),
            scope.target().unwrap_or("none")
        );

        let files = collect_changes(self.vcs, source)?;
        if files.is_empty() {
            println!("No {} to check.", source.describe());
            return Ok(Outcome::NoChanges);
        }
        debug!(count = files.len(), source = %source.describe(), "collected changes");

        let classification = classify_changes(self.scopes, scope, &files)?;
        println!(
            "All {} file(s) are within scope '{}'.",
            classification.len(),
            scope.name()
        );

        let Some(target) = scope.target() else {
            info!(scope = scope.name(), "infra-only scope, skipping task");
            println!("Scope '{}' has no task target, skipping.", scope.name());
            return Ok(Outcome::InfraOnly {
                files: classification.len(),
            });
        };

        println!("Running: {}", self.runner.command_line(target));
        run_scoped_task(self.runner, target)?;

        Ok(Outcome::Passed {
            files: classification.len(),
            target: target.to_string(),
        })
    }
}

//! Branch-scoped change gate.
//!
//! A branch named `<scope>/<topic>` may only change the paths its scope
//! allows. The same check runs from a pre-commit hook (staged files) and from
//! CI (diff against the merge base), then lints the scope's target and its
//! dependents.

pub mod changes;
pub mod check;
pub mod config;
pub mod env;
pub mod git;
pub mod report;
pub mod runner;

pub use changes::{collect_changes, ChangeSource};
pub use check::{
    classify_changes, resolve_scope, run_scoped_task, CheckError, Outcome, ScopeCheck,
};
pub use config::ScopeConfig;
pub use git::{GitCli, GitError, Vcs};
pub use report::{ScopeSummary, ViolationReport};
pub use runner::{CommandRunner, RunnerError, TaskRunner};

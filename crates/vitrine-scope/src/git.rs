//! Git queries used to find the branch and the change set.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::debug;

/// Errors from git invocations.
#[derive(Error, Debug)]
pub enum GitError {
    /// git could not be started.
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        /// The command line.
        command: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// git exited with a failure status.
    #[error("`{command}` failed ({status}): {stderr}")]
    Failed {
        /// The command line.
        command: String,
        /// Exit status description.
        status: String,
        /// Trimmed stderr.
        stderr: String,
    },

    /// A remote-tracking ref is still missing after fetching it.
    #[error("ref '{remote}/{branch}' is not available locally, even after `git fetch {remote} {branch}`")]
    MissingRemoteRef {
        /// Remote name.
        remote: String,
        /// Branch name.
        branch: String,
    },
}

/// The git operations the scope check needs.
pub trait Vcs {
    /// Current branch (`git rev-parse --abbrev-ref HEAD`).
    fn current_branch(&self) -> Result<String, GitError>;

    /// Staged added/copied/modified/renamed/type-changed files.
    fn staged_files(&self) -> Result<Vec<String>, GitError>;

    /// Whether `refs/remotes/<remote>/<branch>` exists locally.
    fn has_remote_branch(&self, remote: &str, branch: &str) -> Result<bool, GitError>;

    /// Fetch `<branch>` from `<remote>`.
    fn fetch(&self, remote: &str, branch: &str) -> Result<(), GitError>;

    /// Merge base of two revisions.
    fn merge_base(&self, a: &str, b: &str) -> Result<String, GitError>;

    /// Added/copied/modified/renamed/type-changed files between two revisions.
    fn diff_names(&self, from: &str, to: &str) -> Result<Vec<String>, GitError>;
}

/// [`Vcs`] backed by the `git` executable.
#[derive(Debug, Clone, Default)]
pub struct GitCli {
    repo: Option<PathBuf>,
}

impl GitCli {
    /// Run git in the current directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run git in `repo`.
    pub fn in_dir(repo: impl Into<PathBuf>) -> Self {
        Self {
            repo: Some(repo.into()),
        }
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new("git");
        cmd.args(args).stdin(Stdio::null());
        if let Some(repo) = &self.repo {
            cmd.current_dir(repo);
        }
        cmd
    }

    /// Run git and return its raw stdout.
    fn read(&self, args: &[&str]) -> Result<String, GitError> {
        let command = format!("git {}", args.join(" "));
        debug!(%command, "running git");
        let output = self
            .command(args)
            .output()
            .map_err(|source| GitError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(GitError::Failed {
                command,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn read_line(&self, args: &[&str]) -> Result<String, GitError> {
        Ok(self.read(args)?.trim().to_string())
    }
}

impl Vcs for GitCli {
    fn current_branch(&self) -> Result<String, GitError> {
        self.read_line(&["rev-parse", "--abbrev-ref", "HEAD"])
    }

    fn staged_files(&self) -> Result<Vec<String>, GitError> {
        let out = self.read(&["diff", "--cached", "--name-only", "-z", "--diff-filter=ACMRT"])?;
        Ok(parse_name_list(&out))
    }

    fn has_remote_branch(&self, remote: &str, branch: &str) -> Result<bool, GitError> {
        let reference = format!("refs/remotes/{remote}/{branch}");
        let args = ["show-ref", "--verify", "--quiet", reference.as_str()];
        let status = self
            .command(&args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|source| GitError::Spawn {
                command: format!("git {}", args.join(" ")),
                source,
            })?;
        Ok(status.success())
    }

    fn fetch(&self, remote: &str, branch: &str) -> Result<(), GitError> {
        let args = ["fetch", remote, branch];
        let command = format!("git {}", args.join(" "));
        // Progress goes straight to the terminal.
        let status = self
            .command(&args)
            .status()
            .map_err(|source| GitError::Spawn {
                command: command.clone(),
                source,
            })?;
        if !status.success() {
            return Err(GitError::Failed {
                command,
                status: status.to_string(),
                stderr: String::new(),
            });
        }
        Ok(())
    }

    fn merge_base(&self, a: &str, b: &str) -> Result<String, GitError> {
        self.read_line(&["merge-base", a, b])
    }

    fn diff_names(&self, from: &str, to: &str) -> Result<Vec<String>, GitError> {
        let out = self.read(&["diff", "--name-only", "-z", from, to, "--diff-filter=ACMRT"])?;
        Ok(parse_name_list(&out))
    }
}

/// Split `--name-only -z` output into paths.
///
/// Entries are NUL-terminated and unquoted, so paths keep non-ASCII bytes,
/// quotes and surrounding spaces exactly as stored.
pub fn parse_name_list(output: &str) -> Vec<String> {
    output
        .split('\0')
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

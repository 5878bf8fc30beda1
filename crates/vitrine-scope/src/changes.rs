//! Where the change set comes from.

use tracing::{info, warn};

use crate::git::{GitError, Vcs};

/// The two change-set sources: the index for pre-commit, the merge-base diff
/// for CI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeSource {
    /// Files staged for the next commit.
    Staged,
    /// Files changed on `HEAD` since it forked from `<remote>/<base>`.
    MergeBase {
        /// Remote holding the base branch, usually `origin`.
        remote: String,
        /// Base branch name.
        base: String,
    },
}

impl ChangeSource {
    /// Short description for reports.
    pub fn describe(&self) -> String {
        match self {
            Self::Staged => "staged files".to_string(),
            Self::MergeBase { remote, base } => format!("changes since {remote}/{base}"),
        }
    }
}

/// Read the change set from `vcs`.
///
/// For [`ChangeSource::MergeBase`] a missing remote-tracking ref is fetched
/// once before giving up.
pub fn collect_changes(vcs: &dyn Vcs, source: &ChangeSource) -> Result<Vec<String>, GitError> {
    match source {
        ChangeSource::Staged => vcs.staged_files(),
        ChangeSource::MergeBase { remote, base } => {
            ensure_remote_branch(vcs, remote, base)?;
            let merge_base = vcs.merge_base(&format!("{remote}/{base}"), "HEAD")?;
            info!(%merge_base, "diffing against merge base");
            vcs.diff_names(&merge_base, "HEAD")
        }
    }
}

fn ensure_remote_branch(vcs: &dyn Vcs, remote: &str, base: &str) -> Result<(), GitError> {
    if vcs.has_remote_branch(remote, base)? {
        return Ok(());
    }

    warn!(remote, base, "base branch not available locally, fetching");
    vcs.fetch(remote, base)?;

    if vcs.has_remote_branch(remote, base)? {
        Ok(())
    } else {
        Err(GitError::MissingRemoteRef {
            remote: remote.to_string(),
            branch: base.to_string(),
        })
    }
}

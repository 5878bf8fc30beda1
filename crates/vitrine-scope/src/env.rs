//! Branch and base-branch detection from CI environment variables.
//!
//! Lookups take a function instead of reading the process environment so the
//! precedence rules can be tested without mutating global state.

/// Variables naming the branch under test, in precedence order.
///
/// GitHub Actions pull requests, GitHub Actions pushes, GitLab, Jenkins.
pub const BRANCH_ENV_VARS: &[&str] = &[
    "GITHUB_HEAD_REF",
    "GITHUB_REF_NAME",
    "CI_COMMIT_REF_NAME",
    "BRANCH_NAME",
];

/// Variables naming the merge target, in precedence order.
pub const BASE_BRANCH_ENV_VARS: &[&str] = &[
    "GITHUB_BASE_REF",
    "CI_MERGE_REQUEST_TARGET_BRANCH_NAME",
    "CHANGE_TARGET",
];

/// Base branch when no variable is set.
pub const DEFAULT_BASE_BRANCH: &str = "main";

/// First variable in `names` with a non-blank value.
pub fn first_set<F>(names: &[&str], lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    names
        .iter()
        .filter_map(|name| lookup(name))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

/// Branch name from CI variables, if any is set.
pub fn branch_from_env<F>(lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    first_set(BRANCH_ENV_VARS, lookup)
}

/// Base branch from CI variables, defaulting to [`DEFAULT_BASE_BRANCH`].
pub fn base_branch_from_env<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    first_set(BASE_BRANCH_ENV_VARS, lookup).unwrap_or_else(|| DEFAULT_BASE_BRANCH.to_string())
}

/// Lookup backed by the process environment.
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

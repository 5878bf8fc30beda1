//! Error types for rule tables.

use thiserror::Error;

/// Result type for rule table operations.
pub type Result<T> = std::result::Result<T, RulesError>;

/// Errors raised while building or consulting rule tables.
///
/// Every variant is a configuration error: none of them are retried, and each
/// names the key or rule that has to be fixed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RulesError {
    /// The route table does not end with a `/` catch-all.
    #[error("route table must end with a catch-all rule mounted at \"/\" (last rule: {last})")]
    MissingCatchAll {
        /// Name of the last rule, or `<empty>` for an empty table.
        last: String,
    },

    /// A catch-all rule shadows the rules after it.
    #[error("catch-all rule '{name}' at position {index} must be the last route")]
    CatchAllNotLast {
        /// Name of the misplaced rule.
        name: String,
        /// Zero-based position in the table.
        index: usize,
    },

    /// Only one half of a rewrite pair was configured.
    #[error("route '{name}' sets only one of rewrite_from / rewrite_to")]
    IncompleteRewrite {
        /// Name of the offending rule.
        name: String,
    },

    /// The upstream target is not a usable plain-HTTP origin.
    #[error("route '{name}' has invalid upstream '{upstream}': {reason}")]
    InvalidUpstream {
        /// Name of the offending rule.
        name: String,
        /// The upstream as configured.
        upstream: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A path pattern could not be parsed.
    #[error("invalid path pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The pattern as configured.
        pattern: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The branch prefix does not name a configured scope.
    #[error(
        "unknown scope '{scope}' derived from branch \"{branch}\"; use one of the prefixes: {}",
        .valid.join(", ")
    )]
    UnknownScope {
        /// The full branch name.
        branch: String,
        /// The segment before the first `/`.
        scope: String,
        /// All scope keys in table order.
        valid: Vec<String>,
    },

    /// Two scopes share a name.
    #[error("scope '{name}' is defined more than once")]
    DuplicateScope {
        /// The duplicated name.
        name: String,
    },

    /// A scope name cannot be used as a branch prefix.
    #[error("invalid scope name '{name}': names must be non-empty and contain no '/'")]
    InvalidScopeName {
        /// The rejected name.
        name: String,
    },
}

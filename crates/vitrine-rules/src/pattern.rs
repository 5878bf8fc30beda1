//! Path patterns shared by the request router and the change-set gatekeeper.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RulesError};

/// A predicate over a `/`-separated path.
///
/// The same type classifies inbound request paths (`Mount`) and repository
/// file paths (`Exact`, `Prefix`, `Glob`).
///
/// The textual form used in configuration files is:
/// - anything containing `*` or `?` is a [`Glob`](PathPattern::Glob)
/// - anything ending in `/` is a literal [`Prefix`](PathPattern::Prefix)
/// - everything else is [`Exact`](PathPattern::Exact)
///
/// [`Mount`](PathPattern::Mount) has no textual form of its own; route rules
/// build it from their `match_prefix`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PathPattern {
    /// The whole path must equal the pattern.
    Exact(String),
    /// Literal `starts_with` match.
    Prefix(String),
    /// Segment-aware prefix: `/admin` matches `/admin` and `/admin/x` but not
    /// `/administrator`. `/` matches everything.
    Mount(String),
    /// Glob with `*`, `**` and `?`.
    Glob(Glob),
}

impl PathPattern {
    /// Parse the textual form of a pattern.
    pub fn parse(pattern: &str) -> Result<Self> {
        if pattern.is_empty() {
            return Err(RulesError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: "pattern is empty".into(),
            });
        }
        if pattern.contains(['*', '?']) {
            return Glob::new(pattern).map(Self::Glob);
        }
        if pattern.ends_with('/') {
            return Ok(Self::Prefix(pattern.to_string()));
        }
        Ok(Self::Exact(pattern.to_string()))
    }

    /// Build a segment-aware mount pattern for request paths.
    pub fn mount(prefix: &str) -> Result<Self> {
        if !prefix.starts_with('/') {
            return Err(RulesError::InvalidPattern {
                pattern: prefix.to_string(),
                reason: "mount prefixes must start with '/'".into(),
            });
        }
        Ok(Self::Mount(prefix.to_string()))
    }

    /// Check whether `path` is matched by this pattern.
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Exact(exact) => path == exact,
            Self::Prefix(prefix) => path.starts_with(prefix.as_str()),
            Self::Mount(mount) => mount_matches(mount, path),
            Self::Glob(glob) => glob.is_match(path),
        }
    }

    /// True for a mount that matches every path. Other variants never are.
    pub fn is_catch_all(&self) -> bool {
        matches!(self, Self::Mount(mount) if mount.trim_end_matches('/').is_empty())
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Exact(s) | Self::Prefix(s) | Self::Mount(s) => s,
            Self::Glob(glob) => glob.as_str(),
        }
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for PathPattern {
    type Error = RulesError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<PathPattern> for String {
    fn from(pattern: PathPattern) -> Self {
        pattern.as_str().to_string()
    }
}

fn mount_matches(mount: &str, path: &str) -> bool {
    let mount = mount.trim_end_matches('/');
    if mount.is_empty() {
        return true;
    }
    match path.strip_prefix(mount) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// A compiled glob pattern.
///
/// Pattern syntax:
/// - `*` matches any characters except `/`
/// - `**` matches any characters including `/`
/// - `**/` matches any directory prefix, including none
/// - `?` matches one character except `/`
#[derive(Debug, Clone)]
pub struct Glob {
    source: String,
    regex: Regex,
}

impl Glob {
    /// Compile a glob.
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(&glob_to_regex(pattern)).map_err(|e| RulesError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// Check if the glob matches `path`.
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// The glob as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl PartialEq for Glob {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Glob {}

/// Match a glob against a path without keeping the compiled form.
///
/// Invalid globs match nothing.
pub fn glob_match(pattern: &str, path: &str) -> bool {
    Glob::new(pattern).is_ok_and(|glob| glob.is_match(path))
}

fn glob_to_regex(pattern: &str) -> String {
    let mut regex = String::with_capacity(pattern.len() * 2);
    regex.push('^');

    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    if chars.peek() == Some(&'/') {
                        chars.next();
                        regex.push_str("(.*/)?");
                    } else {
                        regex.push_str(".*");
                    }
                } else {
                    regex.push_str("[^/]*");
                }
            }
            '?' => regex.push_str("[^/]"),
            _ => regex.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }

    regex.push('$');
    regex
}

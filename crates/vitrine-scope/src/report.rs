//! Operator-facing output: violation reports and the JSON scope summary.

use std::fmt;

use serde::Serialize;
use vitrine_rules::{global_allow_list, Classification, Scope, ScopeTable, Violation};

/// Everything needed to fix a blocked change set without re-running the
/// tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViolationReport {
    /// Resolved scope name.
    pub scope: String,
    /// The scope's own patterns.
    pub allowed_patterns: Vec<String>,
    /// Paths every scope may change.
    pub global: Vec<String>,
    /// Each violating path, sorted.
    pub violations: Vec<Violation>,
}

impl ViolationReport {
    /// Build the report for a classification with violations.
    pub fn new(scope: &Scope, classification: &Classification, table: &ScopeTable) -> Self {
        Self {
            scope: scope.name().to_string(),
            allowed_patterns: scope
                .allowed_patterns()
                .iter()
                .map(|p| p.to_string())
                .collect(),
            global: global_allow_list(),
            violations: vitrine_rules::explain(classification, table),
        }
    }
}

impl fmt::Display for ViolationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} file(s) are outside scope '{}':",
            self.violations.len(),
            self.scope
        )?;
        for violation in &self.violations {
            write!(f, "  - {}", violation.path)?;
            if violation.permitted_by.is_empty() {
                writeln!(f, " (no scope permits this path)")?;
            } else {
                writeln!(
                    f,
                    " (allowed on branches: {})",
                    violation
                        .permitted_by
                        .iter()
                        .map(|s| format!("{s}/..."))
                        .collect::<Vec<_>>()
                        .join(", ")
                )?;
            }
        }
        writeln!(f, "Scope '{}' may change:", self.scope)?;
        for pattern in &self.allowed_patterns {
            writeln!(f, "  - {pattern}")?;
        }
        write!(f, "Always allowed: {}", self.global.join(", "))
    }
}

/// Machine-readable description of the scope a branch resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeSummary {
    /// Branch the scope was resolved from.
    pub branch: String,
    /// Scope name.
    pub scope: String,
    /// Task target, `null` for infra-only scopes.
    pub target: Option<String>,
    /// The scope's patterns followed by the global allow-list.
    pub allowed_patterns: Vec<String>,
}

impl ScopeSummary {
    /// Summarize `scope` as resolved from `branch`.
    pub fn new(branch: &str, scope: &Scope) -> Self {
        let mut allowed_patterns: Vec<String> = scope
            .allowed_patterns()
            .iter()
            .map(|p| p.to_string())
            .collect();
        allowed_patterns.extend(global_allow_list());

        Self {
            branch: branch.to_string(),
            scope: scope.name().to_string(),
            target: scope.target().map(str::to_string),
            allowed_patterns,
        }
    }
}

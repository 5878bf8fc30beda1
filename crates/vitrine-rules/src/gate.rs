//! Change-set classification against a scope.

use std::collections::BTreeSet;

use crate::scope::{Scope, ScopeTable};

/// A change set split into allowed and violating paths.
///
/// Every input path lands in exactly one of the two sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    /// Paths the scope may change.
    pub allowed: BTreeSet<String>,
    /// Paths outside the scope.
    pub violating: BTreeSet<String>,
}

impl Classification {
    /// No violations.
    pub fn is_clean(&self) -> bool {
        self.violating.is_empty()
    }

    /// Number of distinct paths classified.
    pub fn len(&self) -> usize {
        self.allowed.len() + self.violating.len()
    }

    /// True when nothing was classified.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Partition `files` by whether `scope` permits them.
///
/// Pure: the same input always yields the same partition, regardless of
/// order or repetition.
pub fn classify<I, S>(files: I, scope: &Scope) -> Classification
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = Classification::default();
    for file in files {
        let file = file.as_ref();
        if scope.permits(file) {
            out.allowed.insert(file.to_string());
        } else {
            out.violating.insert(file.to_string());
        }
    }
    out
}

/// One violating path plus the scopes that would have accepted it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// The offending path.
    pub path: String,
    /// Other scopes whose patterns cover the path.
    pub permitted_by: Vec<String>,
}

/// Explain each violation against the whole table.
pub fn explain(classification: &Classification, table: &ScopeTable) -> Vec<Violation> {
    classification
        .violating
        .iter()
        .map(|path| Violation {
            path: path.clone(),
            permitted_by: table
                .scopes_covering(path)
                .into_iter()
                .map(str::to_string)
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::default_scope_specs;

    fn table() -> ScopeTable {
        ScopeTable::from_specs(&default_scope_specs()).unwrap()
    }

    #[test]
    fn test_storefront_change_set_is_clean() {
        let table = table();
        let scope = table.get("storefront").unwrap();
        let result = classify(
            ["apps/storefront/app/page.tsx", "packages/ui/src/button.tsx"],
            scope,
        );
        assert!(result.is_clean());
        assert_eq!(result.allowed.len(), 2);
    }

    #[test]
    fn test_admin_cannot_touch_gateway() {
        let table = table();
        let scope = table.get("admin").unwrap();
        let result = classify(["apps/gateway/server.mjs"], scope);
        assert!(!result.is_clean());
        assert!(result.allowed.is_empty());
        assert!(result.violating.contains("apps/gateway/server.mjs"));

        let violations = explain(&result, &table);
        assert_eq!(
            violations,
            vec![Violation {
                path: "apps/gateway/server.mjs".into(),
                permitted_by: vec!["gateway".into(), "platform".into()],
            }]
        );
    }

    #[test]
    fn test_mixed_change_set_reports_every_violation() {
        let table = table();
        let scope = table.get("docs").unwrap();
        let result = classify(
            [
                "apps/docs/intro.mdx",
                "apps/admin/app/page.tsx",
                "package.json",
                "turbo.json",
                ".husky/pre-commit",
            ],
            scope,
        );
        assert_eq!(
            result.violating.iter().map(String::as_str).collect::<Vec<_>>(),
            ["apps/admin/app/page.tsx", "turbo.json"]
        );
        assert_eq!(result.allowed.len(), 3);
    }

    #[test]
    fn test_duplicates_collapse() {
        let table = table();
        let scope = table.get("gateway").unwrap();
        let result = classify(
            ["apps/gateway/server.mjs", "apps/gateway/server.mjs"],
            scope,
        );
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_empty_change_set() {
        let table = table();
        let result = classify(Vec::<String>::new(), table.get("platform").unwrap());
        assert!(result.is_empty());
        assert!(result.is_clean());
    }
}

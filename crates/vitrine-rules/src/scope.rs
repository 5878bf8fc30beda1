//! Branch-prefix scopes and the global allow-list.

use std::collections::HashSet;

use crate::error::{Result, RulesError};
use crate::pattern::PathPattern;
use crate::spec::ScopeSpec;

/// Directories any scope may touch.
pub const GLOBAL_ALLOWED_PREFIXES: &[&str] = &[".husky/"];

/// Root files any scope may touch.
///
/// Applied before the scope's own patterns, so a scope table cannot opt out.
pub const GLOBAL_ALLOWED_FILES: &[&str] = &["pnpm-lock.yaml", "package.json"];

/// Check a path against the fixed global allow-list.
pub fn is_globally_allowed(path: &str) -> bool {
    GLOBAL_ALLOWED_FILES.contains(&path)
        || GLOBAL_ALLOWED_PREFIXES
            .iter()
            .any(|prefix| path.starts_with(prefix))
}

/// The global allow-list in the textual pattern form, for reports.
pub fn global_allow_list() -> Vec<String> {
    GLOBAL_ALLOWED_PREFIXES
        .iter()
        .chain(GLOBAL_ALLOWED_FILES)
        .map(|s| s.to_string())
        .collect()
}

/// The scope key of a branch: everything before the first `/`.
///
/// `storefront/new-banner` has key `storefront`; a branch without `/` is its
/// own key.
pub fn scope_key(branch: &str) -> &str {
    branch.split('/').next().unwrap_or(branch)
}

/// A named policy: which paths a branch may change and what to lint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    name: String,
    allowed: Vec<PathPattern>,
    target: Option<String>,
}

impl Scope {
    /// Create a scope. `target = None` marks it infra-only.
    pub fn new(
        name: impl Into<String>,
        allowed: Vec<PathPattern>,
        target: Option<String>,
    ) -> Result<Self> {
        let name = name.into();
        if name.is_empty() || name.contains('/') {
            return Err(RulesError::InvalidScopeName { name });
        }
        Ok(Self {
            name,
            allowed,
            target,
        })
    }

    /// Scope key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scope-specific patterns in declaration order.
    pub fn allowed_patterns(&self) -> &[PathPattern] {
        &self.allowed
    }

    /// Build/lint target, if any.
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Infra-only scopes skip the scoped task.
    pub fn is_infra_only(&self) -> bool {
        self.target.is_none()
    }

    /// True if the scope's own patterns cover `path`, ignoring the global list.
    pub fn covers(&self, path: &str) -> bool {
        self.allowed.iter().any(|pattern| pattern.matches(path))
    }

    /// True if a branch in this scope may change `path`.
    pub fn permits(&self, path: &str) -> bool {
        is_globally_allowed(path) || self.covers(path)
    }
}

impl TryFrom<&ScopeSpec> for Scope {
    type Error = RulesError;

    fn try_from(spec: &ScopeSpec) -> Result<Self> {
        let allowed = spec
            .allowed_patterns
            .iter()
            .map(|p| PathPattern::parse(p))
            .collect::<Result<Vec<_>>>()?;
        Self::new(spec.name.clone(), allowed, spec.target.clone())
    }
}

/// All scopes, keyed by unique name, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeTable {
    scopes: Vec<Scope>,
}

impl ScopeTable {
    /// Validate uniqueness and freeze.
    pub fn new(scopes: Vec<Scope>) -> Result<Self> {
        let mut seen = HashSet::new();
        for scope in &scopes {
            if !seen.insert(scope.name()) {
                return Err(RulesError::DuplicateScope {
                    name: scope.name().to_string(),
                });
            }
        }
        Ok(Self { scopes })
    }

    /// Build a table from configuration documents.
    pub fn from_specs(specs: &[ScopeSpec]) -> Result<Self> {
        let scopes = specs
            .iter()
            .map(Scope::try_from)
            .collect::<Result<Vec<_>>>()?;
        Self::new(scopes)
    }

    /// Resolve the scope of a branch.
    ///
    /// Fails with [`RulesError::UnknownScope`] listing every valid key when the
    /// branch prefix is not configured.
    pub fn resolve(&self, branch: &str) -> Result<&Scope> {
        let key = scope_key(branch);
        self.get(key).ok_or_else(|| RulesError::UnknownScope {
            branch: branch.to_string(),
            scope: key.to_string(),
            valid: self.names().map(str::to_string).collect(),
        })
    }

    /// Exact-name lookup.
    pub fn get(&self, name: &str) -> Option<&Scope> {
        self.scopes.iter().find(|scope| scope.name() == name)
    }

    /// Scope keys in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.scopes.iter().map(Scope::name)
    }

    /// All scopes in declaration order.
    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    /// Names of the scopes whose own patterns cover `path`.
    pub fn scopes_covering(&self, path: &str) -> Vec<&str> {
        self.scopes
            .iter()
            .filter(|scope| scope.covers(path))
            .map(Scope::name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::default_scope_specs;

    fn table() -> ScopeTable {
        ScopeTable::from_specs(&default_scope_specs()).unwrap()
    }

    #[test]
    fn test_scope_key() {
        assert_eq!(scope_key("storefront/hero-banner"), "storefront");
        assert_eq!(scope_key("admin/tenant/seo"), "admin");
        assert_eq!(scope_key("platform"), "platform");
        assert_eq!(scope_key(""), "");
        assert_eq!(scope_key("/leading"), "");
    }

    #[test]
    fn test_resolve_known_branch() {
        let table = table();
        let scope = table.resolve("gateway/timeouts").unwrap();
        assert_eq!(scope.name(), "gateway");
        assert_eq!(scope.target(), Some("gateway"));
        assert!(!scope.is_infra_only());
        assert!(table.resolve("platform/ci").unwrap().is_infra_only());
    }

    #[test]
    fn test_unknown_scope_lists_valid_keys() {
        let err = table().resolve("feature/login").unwrap_err();
        assert_eq!(
            err,
            RulesError::UnknownScope {
                branch: "feature/login".into(),
                scope: "feature".into(),
                valid: vec![
                    "storefront".into(),
                    "admin".into(),
                    "docs".into(),
                    "gateway".into(),
                    "platform".into()
                ],
            }
        );
        let message = err.to_string();
        assert!(message.contains("feature/login"));
        assert!(message.contains("storefront, admin, docs, gateway, platform"));
    }

    #[test]
    fn test_lookup_is_exact() {
        let table = table();
        assert!(table.resolve("Admin/x").is_err());
        assert!(table.resolve("admins/x").is_err());
        assert!(table.resolve("main").is_err());
    }

    #[test]
    fn test_global_files_allowed_everywhere() {
        let docs_only = ScopeTable::from_specs(&[ScopeSpec {
            name: "docs".into(),
            allowed_patterns: vec!["apps/docs/".into()],
            target: Some("docs".into()),
        }])
        .unwrap();
        for scope in table().scopes().iter().chain(docs_only.scopes()) {
            assert!(scope.permits("package.json"), "{}", scope.name());
            assert!(scope.permits("pnpm-lock.yaml"), "{}", scope.name());
            assert!(scope.permits(".husky/pre-commit"), "{}", scope.name());
        }
        // Only the root manifest is global.
        assert!(!is_globally_allowed("apps/docs-legacy/package.json"));
        assert!(!docs_only.scopes()[0].permits("apps/admin/package.json"));
    }

    #[test]
    fn test_scopes_covering() {
        let table = table();
        assert_eq!(
            table.scopes_covering("apps/gateway/server.mjs"),
            vec!["gateway", "platform"]
        );
        assert_eq!(
            table.scopes_covering("packages/core-config/src/index.ts"),
            vec!["storefront", "admin", "gateway", "platform"]
        );
        assert!(table.scopes_covering("vendor/blob.bin").is_empty());
    }

    #[test]
    fn test_duplicate_and_invalid_names() {
        let spec = ScopeSpec {
            name: "docs".into(),
            allowed_patterns: vec![],
            target: None,
        };
        assert_eq!(
            ScopeTable::from_specs(&[spec.clone(), spec.clone()]).unwrap_err(),
            RulesError::DuplicateScope {
                name: "docs".into()
            }
        );

        let slashed = ScopeSpec {
            name: "docs/site".into(),
            ..spec.clone()
        };
        assert!(matches!(
            ScopeTable::from_specs(&[slashed]).unwrap_err(),
            RulesError::InvalidScopeName { .. }
        ));

        let empty = ScopeSpec {
            name: String::new(),
            ..spec
        };
        assert!(ScopeTable::from_specs(&[empty]).is_err());
    }
}

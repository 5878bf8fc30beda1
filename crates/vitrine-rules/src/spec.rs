//! Serializable rule documents and the built-in defaults.
//!
//! These are the shapes that appear in TOML configuration files. They are
//! converted into validated tables with [`RouteTable::from_specs`] and
//! [`ScopeTable::from_specs`].
//!
//! [`RouteTable::from_specs`]: crate::RouteTable::from_specs
//! [`ScopeTable::from_specs`]: crate::ScopeTable::from_specs

use serde::{Deserialize, Serialize};

/// One route as written in configuration.
///
/// ```toml
/// [[routes]]
/// name = "admin"
/// match_prefix = "/admin"
/// rewrite_from = "/admin"
/// rewrite_to = "/"
/// upstream = "http://localhost:3200"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSpec {
    /// Rule name for logs and errors.
    pub name: String,
    /// Mount point; `/` is the catch-all.
    pub match_prefix: String,
    /// Literal prefix to replace before forwarding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rewrite_from: Option<String>,
    /// Replacement for `rewrite_from`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rewrite_to: Option<String>,
    /// Plain-HTTP origin, e.g. `http://localhost:3000`.
    pub upstream: String,
}

/// One scope as written in configuration.
///
/// ```toml
/// [[scopes]]
/// name = "gateway"
/// allowed_patterns = ["apps/gateway/", "packages/core-config/"]
/// target = "gateway"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeSpec {
    /// Branch prefix selecting this scope.
    pub name: String,
    /// Patterns in their textual form.
    #[serde(default)]
    pub allowed_patterns: Vec<String>,
    /// Build/lint target; absent for infra-only scopes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

/// The gateway's default routes: `/admin` to the admin app, the rest to the
/// storefront.
pub fn default_route_specs() -> Vec<RouteSpec> {
    vec![
        RouteSpec {
            name: "admin".into(),
            match_prefix: "/admin".into(),
            rewrite_from: Some("/admin".into()),
            rewrite_to: Some("/".into()),
            upstream: "http://localhost:3200".into(),
        },
        RouteSpec {
            name: "storefront".into(),
            match_prefix: "/".into(),
            rewrite_from: None,
            rewrite_to: None,
            upstream: "http://localhost:3000".into(),
        },
    ]
}

/// The monorepo's default scopes.
pub fn default_scope_specs() -> Vec<ScopeSpec> {
    fn scope(name: &str, patterns: &[&str], target: Option<&str>) -> ScopeSpec {
        ScopeSpec {
            name: name.into(),
            allowed_patterns: patterns.iter().map(|p| p.to_string()).collect(),
            target: target.map(str::to_string),
        }
    }

    vec![
        scope(
            "storefront",
            &["apps/storefront/", "packages/ui/", "packages/core-config/"],
            Some("storefront"),
        ),
        scope(
            "admin",
            &["apps/admin/", "packages/ui/", "packages/core-config/"],
            Some("admin"),
        ),
        scope("docs", &["apps/docs/"], Some("docs")),
        scope(
            "gateway",
            &["apps/gateway/", "packages/core-config/"],
            Some("gateway"),
        ),
        // Root and infra files are only reachable from this scope.
        scope(
            "platform",
            &[
                "apps/",
                "packages/",
                "scripts/",
                ".husky/",
                "turbo.json",
                "package.json",
                "pnpm-workspace.yaml",
                "pnpm-lock.yaml",
                "README.md",
                "tsconfig.json",
                ".editorconfig",
                ".gitignore",
            ],
            None,
        ),
    ]
}

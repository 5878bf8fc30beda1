//! # Vitrine Rules
//!
//! Ordered path rules shared by the gateway and the scope tooling.
//!
//! Both halves of the platform classify a path against an ordered rule set:
//!
//! - the gateway picks the first [`RouteRule`] whose mount claims a request
//!   path, rewrites the path and forwards it to the rule's [`Upstream`];
//! - the scope tooling derives a [`Scope`] from a branch name and partitions
//!   a change set into allowed and violating files with [`classify`].
//!
//! Tables are validated once when built and are read-only afterwards.
//!
//! ```rust
//! use vitrine_rules::{classify, default_route_specs, default_scope_specs, RouteTable, ScopeTable};
//!
//! let routes = RouteTable::from_specs(&default_route_specs()).unwrap();
//! let matched = routes.resolve("/admin/org/acme/settings");
//! assert_eq!(matched.rule.name(), "admin");
//! assert_eq!(matched.forward_path, "/org/acme/settings");
//!
//! let scopes = ScopeTable::from_specs(&default_scope_specs()).unwrap();
//! let scope = scopes.resolve("admin/seo-form").unwrap();
//! let result = classify(["apps/gateway/server.mjs"], scope);
//! assert!(!result.is_clean());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]

mod error;
mod gate;
mod pattern;
mod route;
mod scope;
mod spec;

pub use error::{Result, RulesError};
pub use gate::{classify, explain, Classification, Violation};
pub use pattern::{glob_match, Glob, PathPattern};
pub use route::{Rewrite, RouteMatch, RouteRule, RouteTable, Upstream};
pub use scope::{
    global_allow_list, is_globally_allowed, scope_key, Scope, ScopeTable, GLOBAL_ALLOWED_FILES,
    GLOBAL_ALLOWED_PREFIXES,
};
pub use spec::{default_route_specs, default_scope_specs, RouteSpec, ScopeSpec};

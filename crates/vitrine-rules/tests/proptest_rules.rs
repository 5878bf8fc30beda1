//! Property-based tests for routing and gating laws.
//!
//! These tests use proptest to check that classification is a pure partition
//! of its input and that scope and route resolution are total where they
//! should be.

use std::collections::BTreeSet;

use proptest::prelude::*;
use vitrine_rules::{
    classify, default_route_specs, default_scope_specs, scope_key, RouteTable, RulesError,
    ScopeTable,
};

fn scopes() -> ScopeTable {
    ScopeTable::from_specs(&default_scope_specs()).unwrap()
}

// Paths biased towards the monorepo layout so both outcomes show up.
fn arb_repo_path() -> impl Strategy<Value = String> {
    let dirs = prop_oneof![
        Just("apps/storefront/"),
        Just("apps/admin/"),
        Just("apps/gateway/"),
        Just("apps/docs/"),
        Just("packages/ui/"),
        Just("packages/core-config/"),
        Just("scripts/"),
        Just(".husky/"),
        Just(""),
        Just("vendor/"),
    ];
    (dirs, "[a-z][a-z0-9_.-]{0,12}").prop_map(|(dir, file)| format!("{dir}{file}"))
}

fn arb_change_set() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop_oneof![
            4 => arb_repo_path(),
            1 => Just("package.json".to_string()),
            1 => Just("pnpm-lock.yaml".to_string()),
        ],
        0..24,
    )
}

fn arb_scope_name() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("storefront".to_string()),
        Just("admin".to_string()),
        Just("docs".to_string()),
        Just("gateway".to_string()),
        Just("platform".to_string()),
    ]
}

proptest! {
    #[test]
    fn classification_partitions_input(files in arb_change_set(), name in arb_scope_name()) {
        let table = scopes();
        let scope = table.get(&name).unwrap();
        let result = classify(&files, scope);

        let input: BTreeSet<String> = files.iter().cloned().collect();
        let union: BTreeSet<String> = result.allowed.union(&result.violating).cloned().collect();
        prop_assert_eq!(union, input);
        prop_assert!(result.allowed.is_disjoint(&result.violating));
    }

    #[test]
    fn classification_is_idempotent(files in arb_change_set(), name in arb_scope_name()) {
        let table = scopes();
        let scope = table.get(&name).unwrap();
        prop_assert_eq!(classify(&files, scope), classify(&files, scope));

        let mut reversed = files.clone();
        reversed.reverse();
        prop_assert_eq!(classify(&files, scope), classify(&reversed, scope));
    }

    #[test]
    fn global_files_never_violate(files in arb_change_set(), name in arb_scope_name()) {
        let table = scopes();
        let result = classify(&files, table.get(&name).unwrap());
        prop_assert!(!result.violating.contains("package.json"));
        prop_assert!(!result.violating.contains("pnpm-lock.yaml"));
        prop_assert!(result.violating.iter().all(|f| !f.starts_with(".husky/")));
    }

    #[test]
    fn resolve_defined_iff_key_known(branch in "[a-z]{0,10}(/[a-z0-9-]{0,10}){0,3}") {
        let table = scopes();
        let key = scope_key(&branch);
        let known = table.names().any(|name| name == key);
        match table.resolve(&branch) {
            Ok(scope) => {
                prop_assert!(known);
                prop_assert_eq!(scope.name(), key);
            }
            Err(RulesError::UnknownScope { scope, valid, .. }) => {
                prop_assert!(!known);
                prop_assert_eq!(scope, key);
                prop_assert_eq!(valid.len(), 5);
            }
            Err(other) => prop_assert!(false, "unexpected error: {other}"),
        }
    }

    #[test]
    fn routing_is_total_and_rewrites_admin(rest in "(/[a-zA-Z0-9_-]{1,8}){0,4}") {
        let table = RouteTable::from_specs(&default_route_specs()).unwrap();

        let admin = table.resolve(&format!("/admin{rest}"));
        prop_assert_eq!(admin.rule.name(), "admin");
        let expected = if rest.is_empty() { "/".to_string() } else { rest.clone() };
        prop_assert_eq!(admin.forward_path, expected);

        let other = format!("/org{rest}");
        let storefront = table.resolve(&other);
        prop_assert_eq!(storefront.rule.name(), "storefront");
        prop_assert_eq!(storefront.forward_path, other);
    }
}

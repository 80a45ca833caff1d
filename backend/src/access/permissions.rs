//! Route permission table and role home routes.
//!
//! Resolution order for a (path, role) pair:
//! 1. no role: deny
//! 2. exact pattern match: allow iff the role is listed
//! 3. prefix patterns (`base/*`, plain string prefix on `base`): allow iff
//!    the role is listed on *any* matching entry
//! 4. nothing matched: deny

use std::collections::HashMap;

use axent_common::Role;
use serde::Serialize;

use Role::{Admin, Customer, Organization, Provider};

const ALL_ROLES: &[Role] = &[Customer, Organization, Provider, Admin];

/// Route patterns and the roles allowed to view them.
pub const ROUTE_PERMISSIONS: &[(&str, &[Role])] = &[
    // Public pages
    ("/", ALL_ROLES),
    ("/sign-in", ALL_ROLES),
    ("/sign-up", ALL_ROLES),
    ("/role-selection", ALL_ROLES),
    // Role modules
    ("/customer/*", &[Customer, Admin]),
    ("/organization/*", &[Organization, Admin]),
    ("/provider/*", &[Provider, Admin]),
    ("/admin/*", &[Admin]),
];

/// Canonical landing route per role.
pub const ROLE_HOMES: &[(Role, &str)] = &[
    (Customer, "/customer/dashboard"),
    (Organization, "/organization/dashboard"),
    (Provider, "/provider/dashboard"),
    (Admin, "/admin/dashboard"),
];

/// Redirect target for a role missing from [`ROLE_HOMES`].
pub const DEFAULT_HOME: &str = "/";

/// Home route for a role.
pub fn home_path(role: Role) -> &'static str {
    home_in(ROLE_HOMES, role)
}

fn home_in(homes: &[(Role, &'static str)], role: Role) -> &'static str {
    homes
        .iter()
        .find(|(r, _)| *r == role)
        .map(|(_, path)| *path)
        .unwrap_or(DEFAULT_HOME)
}

/// Outcome of a permission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    Allow,
    Deny,
}

impl Access {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Access::Allow)
    }

    fn from_bool(allowed: bool) -> Self {
        if allowed {
            Access::Allow
        } else {
            Access::Deny
        }
    }
}

/// A route pattern: a literal path, or a prefix written as `base/*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutePattern {
    Exact(String),
    Prefix(String),
}

impl RoutePattern {
    pub fn parse(pattern: &str) -> Self {
        match pattern.strip_suffix("/*") {
            Some(base) => Self::Prefix(base.to_string()),
            None => Self::Exact(pattern.to_string()),
        }
    }
}

/// Immutable route-pattern to allowed-roles mapping.
#[derive(Debug, Clone)]
pub struct PermissionTable {
    exact: HashMap<String, Vec<Role>>,
    prefixes: Vec<(String, Vec<Role>)>,
}

impl PermissionTable {
    /// Build a table from `(pattern, roles)` pairs.
    ///
    /// A pattern listed twice keeps the roles of its last occurrence.
    pub fn new<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a [Role])>,
    {
        let mut exact = HashMap::new();
        let mut prefixes: Vec<(String, Vec<Role>)> = Vec::new();

        for (pattern, roles) in entries {
            match RoutePattern::parse(pattern) {
                RoutePattern::Exact(path) => {
                    exact.insert(path, roles.to_vec());
                }
                RoutePattern::Prefix(base) => {
                    prefixes.retain(|(b, _)| *b != base);
                    prefixes.push((base, roles.to_vec()));
                }
            }
        }

        Self { exact, prefixes }
    }

    /// The marketplace's route table.
    pub fn standard() -> Self {
        Self::new(ROUTE_PERMISSIONS.iter().copied())
    }

    /// Decide whether `role` may view `path`. Total: never fails.
    pub fn resolve(&self, path: &str, role: Option<Role>) -> Access {
        let Some(role) = role else {
            return Access::Deny;
        };
        let Some(path) = normalize_path(path) else {
            return Access::Deny;
        };

        if let Some(roles) = self.exact.get(&path) {
            return Access::from_bool(roles.contains(&role));
        }

        let allowed = self
            .prefixes
            .iter()
            .filter(|(base, _)| path.starts_with(base.as_str()))
            .any(|(_, roles)| roles.contains(&role));

        Access::from_bool(allowed)
    }

    /// Whether any entry, exact or prefix, covers `path`.
    pub fn covers(&self, path: &str) -> bool {
        match normalize_path(path) {
            Some(path) => {
                self.exact.contains_key(&path)
                    || self
                        .prefixes
                        .iter()
                        .any(|(base, _)| path.starts_with(base.as_str()))
            }
            None => false,
        }
    }
}

impl Default for PermissionTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Canonicalize a request path.
///
/// Strips query and fragment, collapses repeated `/` and drops a trailing
/// `/` (except on the root). Returns `None` for empty or malformed paths:
/// no leading `/`, control characters, or `.`/`..` segments.
pub fn normalize_path(path: &str) -> Option<String> {
    let path = path.trim();
    let path = path.split(['?', '#']).next().unwrap_or_default();

    if !path.starts_with('/') || path.chars().any(char::is_control) {
        return None;
    }

    let mut normalized = String::with_capacity(path.len());
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        if segment == "." || segment == ".." {
            return None;
        }
        normalized.push('/');
        normalized.push_str(segment);
    }

    if normalized.is_empty() {
        normalized.push('/');
    }
    Some(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/", Some("/"))]
    #[case("/sign-in/", Some("/sign-in"))]
    #[case("//customer//dashboard", Some("/customer/dashboard"))]
    #[case("/customer/dashboard?tab=bids#top", Some("/customer/dashboard"))]
    #[case("", None)]
    #[case("customer/dashboard", None)]
    #[case("/customer/../admin/dashboard", None)]
    #[case("/customer/\ndashboard", None)]
    fn test_normalize_path(#[case] input: &str, #[case] expected: Option<&str>) {
        assert_eq!(normalize_path(input).as_deref(), expected);
    }

    #[rstest]
    #[case("/provider/dashboard", Provider, Access::Allow)]
    #[case("/provider/dashboard", Admin, Access::Allow)]
    #[case("/provider/dashboard", Customer, Access::Deny)]
    #[case("/provider/dashboard", Organization, Access::Deny)]
    #[case("/admin/dashboard", Admin, Access::Allow)]
    #[case("/admin/dashboard", Provider, Access::Deny)]
    #[case("/customer/estimator", Customer, Access::Allow)]
    #[case("/organization/dashboard", Organization, Access::Allow)]
    #[case("/sign-in", Customer, Access::Allow)]
    #[case("/", Provider, Access::Allow)]
    fn test_resolve_standard_table(#[case] path: &str, #[case] role: Role, #[case] expected: Access) {
        let table = PermissionTable::standard();
        assert_eq!(table.resolve(path, Some(role)), expected);
    }

    #[test]
    fn test_resolve_without_role_always_denies() {
        let table = PermissionTable::standard();
        for path in ["/", "/sign-in", "/customer/dashboard", "/admin/dashboard", "/nowhere"] {
            assert_eq!(table.resolve(path, None), Access::Deny);
        }
    }

    #[test]
    fn test_unmatched_paths_deny_every_role() {
        let table = PermissionTable::standard();
        for path in ["/dashboard", "/settings", "/api/profile", "", "relative", "/x/customer/y"] {
            for role in Role::ALL {
                assert_eq!(table.resolve(path, Some(role)), Access::Deny, "{path} {role}");
            }
        }
    }

    #[test]
    fn test_every_role_can_reach_its_home() {
        let table = PermissionTable::standard();
        for role in Role::ALL {
            let matching: Vec<_> = ROLE_HOMES.iter().filter(|(r, _)| *r == role).collect();
            assert_eq!(matching.len(), 1, "{role} must have exactly one home");
            assert_eq!(table.resolve(home_path(role), Some(role)), Access::Allow);
        }
    }

    #[test]
    fn test_admin_allowed_on_every_protected_module() {
        let table = PermissionTable::standard();
        for role in Role::ALL {
            assert!(table.resolve(home_path(role), Some(Admin)).is_allowed());
        }
    }

    #[test]
    fn test_prefix_is_plain_string_prefix() {
        let table = PermissionTable::standard();
        assert_eq!(table.resolve("/customers-lounge", Some(Customer)), Access::Allow);
        assert_eq!(table.resolve("/customer", Some(Customer)), Access::Allow);
    }

    #[test]
    fn test_exact_match_takes_priority_over_prefix() {
        let table = PermissionTable::new([
            ("/reports/*", &[Customer, Admin][..]),
            ("/reports/finance", &[Admin][..]),
        ]);
        assert_eq!(table.resolve("/reports/finance", Some(Customer)), Access::Deny);
        assert_eq!(table.resolve("/reports/usage", Some(Customer)), Access::Allow);
    }

    #[test]
    fn test_overlapping_prefixes_are_or_combined() {
        let table = PermissionTable::new([
            ("/fleet/*", &[Admin][..]),
            ("/fleet/public/*", &[Customer][..]),
        ]);
        assert_eq!(table.resolve("/fleet/public/map", Some(Customer)), Access::Allow);
        assert_eq!(table.resolve("/fleet/public/map", Some(Admin)), Access::Allow);
        assert_eq!(table.resolve("/fleet/private", Some(Customer)), Access::Deny);
    }

    #[test]
    fn test_home_path_defaults_when_role_missing_from_table() {
        assert_eq!(home_path(Provider), "/provider/dashboard");
        let partial: &[(Role, &str)] = &[(Customer, "/customer/dashboard")];
        assert_eq!(home_in(partial, Admin), DEFAULT_HOME);
        assert_eq!(home_in(partial, Customer), "/customer/dashboard");
    }

    #[test]
    fn test_covers() {
        let table = PermissionTable::standard();
        assert!(table.covers("/"));
        assert!(table.covers("/admin/anything"));
        assert!(!table.covers("/api/profile"));
        assert!(!table.covers(""));
    }

    #[test]
    fn test_route_pattern_parse() {
        assert_eq!(RoutePattern::parse("/admin/*"), RoutePattern::Prefix("/admin".to_string()));
        assert_eq!(RoutePattern::parse("/sign-in"), RoutePattern::Exact("/sign-in".to_string()));
    }
}

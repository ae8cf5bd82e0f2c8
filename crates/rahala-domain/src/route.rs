//! Declarative access policies attached to navigable paths.

use serde::{Deserialize, Serialize};

use crate::role::Role;
use crate::section::Section;

/// Access policy for one route. Every field is optional; the empty
/// requirement only asks for an authenticated session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRequirement {
    #[serde(default)]
    pub required_role: Option<Role>,
    #[serde(default)]
    pub required_permission: Option<String>,
    #[serde(default)]
    pub required_section: Option<String>,
    #[serde(default)]
    pub allowed_roles: Option<Vec<Role>>,
}

impl RouteRequirement {
    pub fn authenticated() -> Self {
        Self::default()
    }

    pub fn role(role: Role) -> Self {
        Self {
            required_role: Some(role),
            ..Self::default()
        }
    }

    pub fn permission(permission: impl Into<String>) -> Self {
        Self {
            required_permission: Some(permission.into()),
            ..Self::default()
        }
    }

    pub fn section(section: Section) -> Self {
        Self {
            required_section: Some(section.key().to_owned()),
            ..Self::default()
        }
    }

    pub fn allowed_roles(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            allowed_roles: Some(roles.into_iter().collect()),
            ..Self::default()
        }
    }
}

/// Route registrations supplied by the routing layer at startup.
///
/// Lookup picks the longest registered prefix that ends on a path-segment
/// boundary, so `/accounting` covers `/accounting/invoices/42` but not
/// `/accountingx`.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<(String, RouteRequirement)>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, path: impl Into<String>, requirement: RouteRequirement) -> Self {
        let path = normalize(&path.into());
        self.routes.retain(|(p, _)| *p != path);
        self.routes.push((path, requirement));
        self
    }

    /// Requirement for `path`, or the authenticated-only requirement when no
    /// registration covers it.
    pub fn requirement_for(&self, path: &str) -> RouteRequirement {
        let path = normalize(path);
        self.routes
            .iter()
            .filter(|(prefix, _)| covers(prefix, &path))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, req)| req.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

fn normalize(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_owned()
    } else if trimmed.starts_with('/') {
        trimmed.to_owned()
    } else {
        format!("/{trimmed}")
    }
}

fn covers(prefix: &str, path: &str) -> bool {
    if prefix == "/" {
        return true;
    }
    path == prefix || path.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('/'))
}

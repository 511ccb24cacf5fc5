//! Role names as forwarded by the gateway
//!
//! Roles arrive as a comma-joined header such as `ROLE_CARRIER,ROLE_ADMIN`.
//! Comparison ignores surrounding whitespace, the `ROLE_` prefix and case,
//! so `carrier`, `CARRIER` and ` ROLE_Carrier ` are the same role.

use serde::{Deserialize, Serialize};

const ROLE_PREFIX: &str = "ROLE_";

pub const ADMIN: &str = "ADMIN";
pub const MANAGER: &str = "MANAGER";
pub const CARRIER: &str = "CARRIER";

/// Header carrying the authenticated subject id
pub const USER_ID_HEADER: &str = "X-User-Id";
/// Header carrying the comma-joined role list
pub const USER_ROLES_HEADER: &str = "X-User-Roles";

/// Normalize one role name: trim, drop the `ROLE_` prefix, upper-case
pub fn normalize_role(role: &str) -> String {
    let trimmed = role.trim();
    let upper = trimmed.to_ascii_uppercase();
    match upper.strip_prefix(ROLE_PREFIX) {
        Some(rest) => rest.to_string(),
        None => upper,
    }
}

/// The set of roles a caller holds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet {
    roles: Vec<String>,
}

impl RoleSet {
    /// An empty role set
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a comma-joined roles header
    pub fn parse(header: &str) -> Self {
        Self::from_names(header.split(','))
    }

    /// Build from individual role names
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut roles: Vec<String> = names
            .into_iter()
            .map(|r| normalize_role(r.as_ref()))
            .filter(|r| !r.is_empty())
            .collect();
        roles.dedup();
        Self { roles }
    }

    /// Check if the set contains a role (any spelling)
    pub fn has(&self, role: &str) -> bool {
        let wanted = normalize_role(role);
        self.roles.iter().any(|r| *r == wanted)
    }

    /// Check if the set contains any of the given roles
    pub fn has_any<S: AsRef<str>>(&self, roles: &[S]) -> bool {
        roles.iter().any(|r| self.has(r.as_ref()))
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.roles.iter().map(|s| s.as_str())
    }

    /// Render as the forwarded header value
    pub fn to_header(&self) -> String {
        self.roles
            .iter()
            .map(|r| format!("{}{}", ROLE_PREFIX, r))
            .collect::<Vec<_>>()
            .join(",")
    }
}

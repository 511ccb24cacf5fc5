//! CallerIdentity - Who is making the request
//!
//! Supplied by the gateway and trusted verbatim. Nothing here validates the
//! subject against the identity service.

use fleet_domain::{CarrierId, ManagerId, UserId};
use shared::role::{ADMIN, CARRIER, MANAGER};
use shared::RoleSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerIdentity {
    user_id: Option<UserId>,
    roles: RoleSet,
}

impl CallerIdentity {
    pub fn new(user_id: Option<UserId>, roles: RoleSet) -> Self {
        Self { user_id, roles }
    }

    /// An authenticated caller
    pub fn user(user_id: i64, roles: &str) -> Self {
        Self::new(Some(UserId::new(user_id)), RoleSet::parse(roles))
    }

    /// Parse the gateway's `X-User-Id` and `X-User-Roles` values
    ///
    /// A missing or non-numeric subject leaves the caller unauthenticated.
    pub fn from_headers(user_id: Option<&str>, roles: Option<&str>) -> Self {
        let user_id = user_id
            .and_then(|value| value.trim().parse::<i64>().ok())
            .map(UserId::new);
        let roles = roles.map(RoleSet::parse).unwrap_or_default();

        Self::new(user_id, roles)
    }

    /// A request with no forwarded identity
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    pub fn roles(&self) -> &RoleSet {
        &self.roles
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.has(role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ADMIN)
    }

    /// The caller as a carrier, if it holds the carrier role
    pub fn as_carrier(&self) -> Option<CarrierId> {
        self.user_id
            .filter(|_| self.has_role(CARRIER))
            .map(CarrierId::from)
    }

    /// The caller as a manager, if it holds the manager role
    pub fn as_manager(&self) -> Option<ManagerId> {
        self.user_id
            .filter(|_| self.has_role(MANAGER))
            .map(ManagerId::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_carrier_view() {
        let caller = CallerIdentity::user(100, "ROLE_CARRIER");

        assert_eq!(caller.as_carrier(), Some(CarrierId::new(100)));
        assert_eq!(caller.as_manager(), None);
        assert!(!caller.is_admin());
    }

    #[test]
    fn test_from_headers() {
        let caller = CallerIdentity::from_headers(Some("10"), Some("ROLE_MANAGER,ROLE_ADMIN"));

        assert_eq!(caller.user_id(), Some(UserId::new(10)));
        assert_eq!(caller.as_manager(), Some(ManagerId::new(10)));
        assert!(caller.is_admin());
    }

    #[test]
    fn test_from_headers_with_bad_subject() {
        let caller = CallerIdentity::from_headers(Some("abc"), Some("CARRIER"));

        assert_eq!(caller.user_id(), None);
        assert_eq!(caller.as_carrier(), None);
    }

    #[test]
    fn test_anonymous_has_no_views() {
        let caller = CallerIdentity::anonymous();

        assert_eq!(caller.user_id(), None);
        assert_eq!(caller.as_carrier(), None);
    }
}

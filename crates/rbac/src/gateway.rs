//! Gateway - Token admission in front of the services
//!
//! ```text
//! Authorization: Bearer <jwt>
//!        │
//!        ▼
//!  TokenVerifier ──► Claims ──► RouteGuard ──► X-User-Id / X-User-Roles
//! ```

use crate::error::AuthError;
use crate::route_guard::RouteGuard;
use crate::token::{bearer_token, TokenVerifier};
use shared::{RoleSet, USER_ID_HEADER, USER_ROLES_HEADER};
use std::sync::Arc;

/// Identity forwarded to downstream services
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardedIdentity {
    pub user_id: i64,
    pub roles: RoleSet,
}

impl ForwardedIdentity {
    /// Header pairs to attach to the proxied request
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        vec![
            (USER_ID_HEADER, self.user_id.to_string()),
            (USER_ROLES_HEADER, self.roles.to_header()),
        ]
    }
}

/// Gateway
pub struct Gateway {
    verifier: Arc<dyn TokenVerifier>,
    guard: RouteGuard,
}

impl Gateway {
    pub fn new(verifier: Arc<dyn TokenVerifier>, guard: RouteGuard) -> Self {
        Self { verifier, guard }
    }

    /// Authenticate and authorize one request
    pub fn admit(
        &self,
        path: &str,
        authorization: Option<&str>,
    ) -> Result<ForwardedIdentity, AuthError> {
        let token = bearer_token(authorization)?;
        let claims = self.verifier.verify(token)?;

        self.guard.authorize(path, Some(&claims.roles))?;

        Ok(ForwardedIdentity {
            user_id: claims.subject,
            roles: claims.roles,
        })
    }

    pub fn guard(&self) -> &RouteGuard {
        &self.guard
    }
}

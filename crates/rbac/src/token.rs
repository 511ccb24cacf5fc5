//! Bearer token verification
//!
//! Signature checking and token issuance belong to the identity service.
//! The gateway only needs the verified subject and roles, so the mechanism
//! sits behind [`TokenVerifier`].

use crate::error::AuthError;
use shared::RoleSet;
use std::collections::HashMap;

/// What a verified token says about its bearer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Numeric user id
    pub subject: i64,
    pub roles: RoleSet,
}

impl Claims {
    pub fn new(subject: i64, roles: RoleSet) -> Self {
        Self { subject, roles }
    }
}

/// Verifies a raw bearer token
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<Claims, AuthError>;
}

/// Fixed token table for local runs and tests
#[derive(Debug, Clone, Default)]
pub struct StaticTokenVerifier {
    tokens: HashMap<String, Claims>,
}

impl StaticTokenVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: accept a token
    pub fn with_token(mut self, token: impl Into<String>, claims: Claims) -> Self {
        self.tokens.insert(token.into(), claims);
        self
    }
}

impl TokenVerifier for StaticTokenVerifier {
    fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or_else(|| AuthError::InvalidToken("unknown token".to_string()))
    }
}

/// Extract the token from an `Authorization` header value
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::MissingToken)?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidToken("expected Bearer scheme".to_string()))?
        .trim();

    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}

//! Authentication and authorization errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing roles")]
    MissingRoles,

    #[error("Access to '{path}' requires one of: {}", required.join(", "))]
    Forbidden { path: String, required: Vec<String> },

    #[error("Invalid route pattern '{pattern}': {reason}")]
    InvalidRoute { pattern: String, reason: String },
}

impl AuthError {
    /// HTTP status the gateway answers with
    pub fn status(&self) -> u16 {
        match self {
            AuthError::MissingToken | AuthError::InvalidToken(_) => 401,
            AuthError::MissingRoles | AuthError::Forbidden { .. } => 403,
            AuthError::InvalidRoute { .. } => 500,
        }
    }
}

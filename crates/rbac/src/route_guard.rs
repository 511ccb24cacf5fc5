//! RouteGuard - Role requirements per request path

use crate::error::AuthError;
use glob::Pattern;
use shared::{RoleSet, RouteRuleConfig};

/// A compiled route rule
#[derive(Debug, Clone)]
pub struct RouteRule {
    pattern: Pattern,
    roles: Vec<String>,
}

impl RouteRule {
    /// Compile a rule
    pub fn new(pattern: &str, roles: Vec<String>) -> Result<Self, AuthError> {
        let compiled = Pattern::new(pattern).map_err(|e| AuthError::InvalidRoute {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            pattern: compiled,
            roles,
        })
    }

    /// Check if the rule covers a path
    ///
    /// `/api/v1/issues/**` covers `/api/v1/issues` as well as anything below.
    pub fn matches(&self, path: &str) -> bool {
        let path = path.trim_end_matches('/');
        self.pattern.matches(path) || self.pattern.matches(&format!("{}/", path))
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn roles(&self) -> &[String] {
        &self.roles
    }
}

/// RouteGuard decides whether a caller's roles open a path
///
/// Rules are checked in order and the first matching rule decides. A path
/// no rule covers needs authentication only.
#[derive(Debug, Clone, Default)]
pub struct RouteGuard {
    rules: Vec<RouteRule>,
}

impl RouteGuard {
    /// Create an empty RouteGuard
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from configuration
    pub fn from_config(rules: &[RouteRuleConfig]) -> Result<Self, AuthError> {
        let mut guard = Self::new();
        for rule in rules {
            guard.add_rule(RouteRule::new(&rule.pattern, rule.roles.clone())?);
        }
        Ok(guard)
    }

    /// Register a rule
    pub fn add_rule(&mut self, rule: RouteRule) {
        self.rules.push(rule);
    }

    /// The rule that governs a path, if any
    pub fn rule_for(&self, path: &str) -> Option<&RouteRule> {
        self.rules.iter().find(|r| r.matches(path))
    }

    /// Check a caller against a path
    pub fn authorize(&self, path: &str, roles: Option<&RoleSet>) -> Result<(), AuthError> {
        let Some(rule) = self.rule_for(path) else {
            return Ok(());
        };

        let roles = roles.ok_or(AuthError::MissingRoles)?;
        if roles.has_any(rule.roles()) {
            Ok(())
        } else {
            Err(AuthError::Forbidden {
                path: path.to_string(),
                required: rule.roles().to_vec(),
            })
        }
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }
}

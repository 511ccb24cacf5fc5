//! Configuration types for the issues service

use crate::error::{FleetError, UnsupportedConfigFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One gateway authorization rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRuleConfig {
    /// Glob over the request path, e.g. `/api/v1/issues/**`
    pub pattern: String,

    /// Roles allowed through; any one is enough
    pub roles: Vec<String>,
}

impl RouteRuleConfig {
    pub fn new<S: Into<String>>(pattern: impl Into<String>, roles: impl IntoIterator<Item = S>) -> Self {
        Self {
            pattern: pattern.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }
}

/// Gateway configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    #[serde(default = "default_routes")]
    pub routes: Vec<RouteRuleConfig>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            routes: default_routes(),
        }
    }
}

fn default_routes() -> Vec<RouteRuleConfig> {
    vec![
        RouteRuleConfig::new("/api/v1/issues/**", ["CARRIER", "MANAGER", "ADMIN"]),
        RouteRuleConfig::new("/api/v1/vehicles/**", ["MANAGER", "ADMIN"]),
        RouteRuleConfig::new("/api/v1/shipments/**", ["CARRIER", "MANAGER", "ADMIN"]),
        RouteRuleConfig::new("/api/v1/payments/**", ["MANAGER", "ADMIN"]),
        RouteRuleConfig::new("/api/v1/users/**", ["ADMIN"]),
    ]
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    "info".to_string()
}

/// Event consumer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumerConfig {
    /// Bound of the channel between the transport and the index
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

fn default_channel_capacity() -> usize {
    1024
}

/// Issues service configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub consumer: ConsumerConfig,
}

impl ServiceConfig {
    /// Load configuration from a JSON or YAML file, chosen by extension
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let config: Self = match extension.as_str() {
            "json" => serde_json::from_str(&content)?,
            "yaml" | "yml" => serde_yaml::from_str(&content)?,
            _ => {
                return Err(UnsupportedConfigFormat {
                    path: path.display().to_string(),
                    extension,
                }
                .into())
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Load from a file if given, otherwise use defaults
    pub fn load(path: Option<&Path>) -> crate::Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> crate::Result<()> {
        if self.consumer.channel_capacity == 0 {
            return Err(FleetError::Config(
                "consumer.channelCapacity must be greater than zero".to_string(),
            ));
        }
        if let Some(rule) = self.gateway.routes.iter().find(|r| r.roles.is_empty()) {
            return Err(FleetError::Config(format!(
                "route '{}' lists no roles",
                rule.pattern
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_parse_json() {
        let json = r#"{
            "gateway": {
                "routes": [
                    { "pattern": "/api/v1/issues/**", "roles": ["CARRIER"] }
                ]
            },
            "consumer": { "channelCapacity": 16 }
        }"#;

        let config: ServiceConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.gateway.routes.len(), 1);
        assert_eq!(config.consumer.channel_capacity, 16);
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn test_defaults_cover_issue_routes() {
        let config = ServiceConfig::default();
        assert!(config
            .gateway
            .routes
            .iter()
            .any(|r| r.pattern.starts_with("/api/v1/issues")));
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "logging:\n  filter: debug\nconsumer:\n  channelCapacity: 8").unwrap();

        let config = ServiceConfig::from_file(file.path()).unwrap();
        assert_eq!(config.logging.filter, "debug");
        assert_eq!(config.consumer.channel_capacity, 8);
        assert_eq!(config.gateway, GatewayConfig::default());
    }

    #[test]
    fn test_rejects_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();

        let err = ServiceConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, FleetError::UnsupportedConfigFormat(_)));
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{ "consumer": {{ "channelCapacity": 0 }} }}"#).unwrap();

        let err = ServiceConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, FleetError::Config(_)));
    }
}

//! Error types shared across the fleet crates

use thiserror::Error;

/// Error thrown when a configuration file cannot be used
#[derive(Debug, Error)]
#[error("Unsupported config format '{extension}' for {path}. Expected one of: json, yaml, yml")]
pub struct UnsupportedConfigFormat {
    pub path: String,
    pub extension: String,
}

/// General error type
#[derive(Debug, Error)]
pub enum FleetError {
    #[error(transparent)]
    UnsupportedConfigFormat(#[from] UnsupportedConfigFormat),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, FleetError>;

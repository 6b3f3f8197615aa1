//! Connector configuration
//!
//! Loaded from the TOML file named by `CONNECTOR_CONFIG`; without it the
//! built-in defaults apply. Inbound and outbound secrets live in separate
//! sections and are never mixed.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use hmac_auth::layer::DEFAULT_MAX_BODY_BYTES;
use hmac_auth::{SecretConfig, ValidationConfig};
use serde::Deserialize;
use thiserror::Error;

/// Environment variable holding the config file path
pub const CONFIG_ENV: &str = "CONNECTOR_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConnectorConfig {
    pub connector: ConnectorSettings,
    pub security: ConnectorSecurity,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConnectorSettings {
    pub bind: SocketAddr,
    pub cloud_api_base_url: String,
    pub snapshot_path: String,
    /// Identity reported by `/health`
    pub source_id: String,
    pub forward_timeout_secs: u64,
    pub max_body_bytes: usize,
}

impl Default for ConnectorSettings {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 5270)),
            cloud_api_base_url: "http://localhost:5261".to_string(),
            snapshot_path: "/v1/snapshots".to_string(),
            source_id: "connector-local".to_string(),
            forward_timeout_secs: 10,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConnectorSecurity {
    /// Validates terminals posting to `/ingest/snapshot`
    pub inbound_hmac: ValidationConfig,
    /// Signs what is forwarded to the cloud tier
    pub outbound_hmac: SecretConfig,
}

impl ConnectorConfig {
    /// Load from `CONNECTOR_CONFIG`, or defaults when it is unset.
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::from_path(Path::new(path.trim())),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|err| ConfigError::Io {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.connector.forward_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "connector.forward_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if !self.connector.snapshot_path.starts_with('/') {
            return Err(ConfigError::Invalid(
                "connector.snapshot_path must start with '/'".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConnectorConfig::from_toml_str("").unwrap();
        assert_eq!(config.connector.bind.port(), 5270);
        assert_eq!(config.connector.cloud_api_base_url, "http://localhost:5261");
        assert_eq!(config.connector.snapshot_path, "/v1/snapshots");
        assert_eq!(config.connector.source_id, "connector-local");
        assert_eq!(config.connector.forward_timeout_secs, 10);
        assert_eq!(config.security.inbound_hmac.allowed_clock_skew_secs, 300);
        assert!(config.security.outbound_hmac.shared_secret.is_empty());
    }

    #[test]
    fn test_inbound_and_outbound_namespaces_stay_apart() {
        let config = ConnectorConfig::from_toml_str(
            r#"
            [connector]
            cloud_api_base_url = "https://cloud.example.test"
            source_id = "edge-7"

            [security.inbound_hmac]
            shared_secret = "terminal-secret"
            allowed_clock_skew_secs = 60

            [security.outbound_hmac]
            shared_secret = "cloud-secret"

            [security.outbound_hmac.source_secrets]
            "acct-1" = "acct-1-cloud"
            "#,
        )
        .unwrap();

        assert_eq!(config.connector.source_id, "edge-7");
        assert_eq!(config.security.inbound_hmac.secrets.shared_secret, "terminal-secret");
        assert_eq!(config.security.inbound_hmac.allowed_clock_skew_secs, 60);
        assert!(config.security.inbound_hmac.secrets.source_secrets.is_empty());
        assert_eq!(config.security.outbound_hmac.shared_secret, "cloud-secret");
        assert_eq!(config.security.outbound_hmac.source_secrets.len(), 1);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = ConnectorConfig::from_toml_str("[connector]\nforward_timeout_secs = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_relative_snapshot_path_rejected() {
        let err = ConnectorConfig::from_toml_str("[connector]\nsnapshot_path = \"v1/snapshots\"").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}

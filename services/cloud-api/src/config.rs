//! Cloud API configuration
//!
//! Loaded from the TOML file named by `CLOUD_API_CONFIG`; without it the
//! built-in defaults apply. Every section and field is optional.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use hmac_auth::layer::DEFAULT_MAX_BODY_BYTES;
use hmac_auth::ValidationConfig;
use persistence::PersistenceConfig;
use serde::Deserialize;
use thiserror::Error;

/// Environment variable holding the config file path
pub const CONFIG_ENV: &str = "CLOUD_API_CONFIG";

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
pub struct CloudApiConfig {
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub persistence: PersistenceConfig,
    pub notifications: NotificationConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 5261)),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Inbound validation for `POST /v1/snapshots`
    pub hmac: ValidationConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Updates buffered per WebSocket subscriber before it starts lagging
    pub channel_capacity: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { channel_capacity: 256 }
    }
}

impl CloudApiConfig {
    /// Load from `CLOUD_API_CONFIG`, or defaults when it is unset.
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
        if self.notifications.channel_capacity == 0 {
            return Err(ConfigError::Invalid(
                "notifications.channel_capacity must be greater than zero".to_string(),
            ));
        }
        if self.persistence.enabled && self.persistence.database_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "persistence.database_path must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use persistence::BackendKind;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = CloudApiConfig::from_toml_str("").unwrap();
        assert_eq!(config.server.bind.port(), 5261);
        assert_eq!(config.server.max_body_bytes, 1024 * 1024);
        assert_eq!(config.security.hmac.allowed_clock_skew_secs, 300);
        assert_eq!(config.security.hmac.nonce_sweep_interval, 128);
        assert!(config.persistence.enabled);
        assert_eq!(config.persistence.backend, BackendKind::Sqlite);
        assert_eq!(config.persistence.retention_days, 30);
        assert_eq!(config.persistence.default_history_take, 200);
        assert_eq!(config.persistence.max_history_take, 1000);
        assert_eq!(config.persistence.retention_cleanup_interval_writes, 50);
        assert_eq!(config.notifications.channel_capacity, 256);
    }

    #[test]
    fn test_full_file() {
        let config = CloudApiConfig::from_toml_str(
            r#"
            [server]
            bind = "127.0.0.1:9000"

            [security.hmac]
            allowed_clock_skew_secs = 120
            shared_secret = "fallback"

            [security.hmac.source_secrets]
            "demo-source-01" = "per-source"

            [persistence]
            backend = "memory"
            retention_days = 0
            "#,
        )
        .unwrap();

        assert_eq!(config.server.bind, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(config.security.hmac.allowed_clock_skew_secs, 120);
        assert_eq!(config.security.hmac.secrets.shared_secret, "fallback");
        assert_eq!(
            config.security.hmac.secrets.source_secrets.get("demo-source-01").map(String::as_str),
            Some("per-source")
        );
        assert_eq!(config.persistence.backend, BackendKind::Memory);
        assert_eq!(config.persistence.retention_days, 0);
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let err = CloudApiConfig::from_toml_str("[persistence]\nbackend = \"postgres\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_zero_channel_capacity_rejected() {
        let err = CloudApiConfig::from_toml_str("[notifications]\nchannel_capacity = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = CloudApiConfig::from_path(Path::new("/nonexistent/cloud-api.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/cloud-api.toml"));
    }
}

//! Configuration management for the metadata store
//!
//! This module handles all configuration aspects for the metadata store,
//! including YAML file parsing, environment variable overrides, and
//! configuration validation.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for the metadata store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Object store configuration
    pub store: StoreConfig,
    /// Telemetry configuration
    pub telemetry: TelemetryConfig,
}

/// Object store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreConfig {
    /// Namespace all metadata objects live in
    pub namespace: String,
}

/// Telemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryConfig {
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Tracing configuration
    pub tracing: TracingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log format ("json" or "plain")
    pub format: String,
}

/// Tracing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TracingConfig {
    /// Enable tracing
    pub enabled: bool,
    /// Service name
    pub service_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreConfig {
                namespace: "federation".to_string(),
            },
            telemetry: TelemetryConfig {
                logging: LoggingConfig {
                    level: "info".to_string(),
                    format: "json".to_string(),
                },
                tracing: TracingConfig {
                    enabled: true,
                    service_name: "federation-metastore".to_string(),
                },
            },
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .context("Failed to read configuration file")?;

        let config: Config =
            serde_yaml::from_str(&content).context("Failed to parse configuration file")?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();

        if let Ok(namespace) = std::env::var("METASTORE_NAMESPACE") {
            config.store.namespace = namespace;
        }

        if let Ok(log_level) = std::env::var("LOG_LEVEL") {
            config.telemetry.logging.level = log_level;
        }

        if let Ok(log_format) = std::env::var("LOG_FORMAT") {
            config.telemetry.logging.format = log_format;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.store.namespace.is_empty() {
            return Err(anyhow::anyhow!("Store namespace is required"));
        }

        if !matches!(self.telemetry.logging.format.as_str(), "json" | "plain") {
            return Err(anyhow::anyhow!(
                "Log format must be 'json' or 'plain', got '{}'",
                self.telemetry.logging.format
            ));
        }

        Ok(())
    }

    /// Save configuration to a YAML file
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize configuration")?;

        tokio::fs::write(path, content)
            .await
            .context("Failed to write configuration file")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_config_validation() {
        let mut config = Config::default();
        config.store.namespace = String::new();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.telemetry.logging.format = "xml".to_string();
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_config_file_roundtrip() {
        let config = Config::default();
        let temp_file = NamedTempFile::new().unwrap();

        config.save_to_file(temp_file.path()).await.unwrap();
        let loaded_config = Config::from_file(temp_file.path()).await.unwrap();

        assert_eq!(config.store.namespace, loaded_config.store.namespace);
        assert_eq!(
            config.telemetry.logging.level,
            loaded_config.telemetry.logging.level
        );
    }
}

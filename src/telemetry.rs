//! Telemetry for the metadata store
//!
//! Structured logging setup driven by the telemetry section of the
//! configuration. Embedders that already install their own subscriber
//! should skip this and leave tracing to the host application.

use crate::config::TelemetryConfig;
use crate::error::MetastoreError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber
pub fn init_tracing(config: &TelemetryConfig) -> Result<(), MetastoreError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    if config.tracing.enabled {
        match config.logging.format.as_str() {
            "json" => {
                let subscriber = tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().json().with_target(true).with_thread_ids(true));

                tracing::subscriber::set_global_default(subscriber).map_err(|e| {
                    MetastoreError::Internal {
                        detail: format!("failed to set tracing subscriber: {}", e),
                    }
                })?;
            }
            _ => {
                let subscriber = tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().with_target(true).with_thread_ids(true));

                tracing::subscriber::set_global_default(subscriber).map_err(|e| {
                    MetastoreError::Internal {
                        detail: format!("failed to set tracing subscriber: {}", e),
                    }
                })?;
            }
        }
    }

    Ok(())
}

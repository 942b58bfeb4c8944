//! # Observability
//!
//! Tracing initialization for the commit pipeline.
//!
//! Logging is injected process-wide here rather than inside any handler,
//! so the dispatcher stays testable in isolation (tests install their own
//! subscriber with `tracing::subscriber::with_default`).
//!
//! # Example
//!
//! ```ignore
//! observability::init()?;
//! ```

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing with defaults (JSON format, `RUST_LOG` honored)
pub fn init() -> Result<()> {
    init_with_config(ObservabilityConfig::default())
}

/// Observability configuration
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Log format
    pub log_format: LogFormat,
    /// Default log level when `RUST_LOG` is unset
    pub default_log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Json,
            default_log_level: "info".to_string(),
        }
    }
}

/// Log format
#[derive(Debug, Clone, Copy, Default)]
pub enum LogFormat {
    /// JSON structured logs
    #[default]
    Json,
    /// Human-readable format
    Pretty,
    /// Compact single-line format
    Compact,
}

/// Initialize with custom configuration
pub fn init_with_config(config: ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_log_level));

    match config.log_format {
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .json()
                .with_target(true)
                .with_file(true)
                .with_line_number(true);

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init()
                .context("Failed to initialize tracing subscriber")?;
        }
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer().pretty();

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init()
                .context("Failed to initialize tracing subscriber")?;
        }
        LogFormat::Compact => {
            let fmt_layer = fmt::layer().compact();

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init()
                .context("Failed to initialize tracing subscriber")?;
        }
    }

    tracing::info!(log_format = ?config.log_format, "Observability initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ObservabilityConfig::default();
        assert!(matches!(config.log_format, LogFormat::Json));
        assert_eq!(config.default_log_level, "info");
    }
}

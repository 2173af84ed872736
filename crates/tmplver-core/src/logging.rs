//! Structured logging setup
//!
//! The library itself only emits `tracing` events. Applications that want
//! them printed call [`init_logging`] once at startup.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter, used when `RUST_LOG` is unset
    pub level: String,
    /// Output format: compact, full, json
    pub format: LogFormat,
    /// Include timestamps
    pub timestamps: bool,
    /// Include thread IDs
    pub thread_ids: bool,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Compact format for production
    Compact,
    /// Full format with all details
    Full,
    /// JSON structured format
    Json,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            timestamps: true,
            thread_ids: false,
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "full" => Ok(LogFormat::Full),
            "json" => Ok(LogFormat::Json),
            other => Err(Error::configuration(format!("Invalid log format: {}", other))),
        }
    }
}

/// Initialize the global logging system
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let env_filter = create_env_filter(config)?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(config.thread_ids);

    // Each format produces a distinct subscriber type
    let installed = match (config.format, config.timestamps) {
        (LogFormat::Compact, true) => tracing::subscriber::set_global_default(builder.compact().finish()),
        (LogFormat::Compact, false) => {
            tracing::subscriber::set_global_default(builder.compact().without_time().finish())
        }
        (LogFormat::Full, true) => tracing::subscriber::set_global_default(builder.finish()),
        (LogFormat::Full, false) => tracing::subscriber::set_global_default(builder.without_time().finish()),
        (LogFormat::Json, true) => {
            tracing::subscriber::set_global_default(builder.with_ansi(false).json().finish())
        }
        (LogFormat::Json, false) => {
            tracing::subscriber::set_global_default(builder.with_ansi(false).json().without_time().finish())
        }
    };

    installed.map_err(|e| Error::Configuration {
        message: "Failed to initialize logging".to_string(),
        source: Some(anyhow::Error::new(e)),
    })?;

    tracing::info!(config = ?config, "Logging system initialized");
    Ok(())
}

/// Create environment filter based on configuration
fn create_env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| Error::Configuration {
            message: format!("Invalid log level: {}", config.level),
            source: Some(anyhow::Error::new(e)),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("compact".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_second_install_is_an_error() {
        let config = LoggingConfig {
            level: "debug".to_string(),
            ..LoggingConfig::default()
        };
        // Another test binary may already own the global subscriber, so only
        // the second call is asserted.
        let _ = init_logging(&config);
        assert!(matches!(init_logging(&config), Err(Error::Configuration { .. })));
    }
}

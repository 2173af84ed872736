//! Engine configuration
//!
//! Configuration is loaded from:
//! - Default values
//! - A configuration file (TOML/YAML/JSON, chosen by extension)
//! - Environment variables

use crate::error::{Error, Result};
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tmplver_schemas::{ValidationMode, Version};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Compatibility validation settings
    pub validation: ValidationConfig,

    /// Version listing and suggestion settings
    pub versions: VersionsConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Compatibility validation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// `basic` runs the blocking rules only, `strict` adds advisory rules
    pub mode: ValidationMode,

    /// Refuse to publish while validation reports a failure
    pub enforce_on_publish: bool,
}

/// Version handling configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionsConfig {
    /// Limit applied by `get_versions` when the caller gives none
    pub default_list_limit: Option<usize>,

    /// Suggested version for a template with nothing published
    pub initial_version: String,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            mode: ValidationMode::Strict,
            enforce_on_publish: true,
        }
    }
}

impl Default for VersionsConfig {
    fn default() -> Self {
        Self {
            default_list_limit: None,
            initial_version: "1.0.0".to_string(),
        }
    }
}

impl VersionsConfig {
    /// The parsed initial version
    pub fn initial_version(&self) -> Result<Version> {
        Ok(Version::parse(&self.initial_version)?)
    }
}

impl EngineConfig {
    /// Load configuration from a file, picking the format by extension
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Io {
            message: format!("Failed to read config file {}", path.display()),
            source: e,
        })?;

        let extension = path.extension().and_then(|s| s.to_str()).unwrap_or_default();
        let parsed: std::result::Result<Self, anyhow::Error> = match extension {
            "toml" => toml::from_str(&content).map_err(anyhow::Error::new),
            "yaml" | "yml" => serde_yaml::from_str(&content).map_err(anyhow::Error::new),
            "json" => serde_json::from_str(&content).map_err(anyhow::Error::new),
            other => {
                return Err(Error::configuration(format!(
                    "Unsupported config file extension '{}' for {}",
                    other,
                    path.display()
                )))
            }
        };

        parsed.map_err(|e| Error::Configuration {
            message: format!("Failed to parse config file {}", path.display()),
            source: Some(e),
        })
    }

    /// Load a file, apply environment overrides and validate the result
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = Self::from_file(path)?;
        config.merge_with_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides
    pub fn merge_with_env(&mut self) -> Result<()> {
        if let Ok(level) = std::env::var("TMPLVER_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Ok(format) = std::env::var("TMPLVER_LOG_FORMAT") {
            self.logging.format = format.parse()?;
        }

        if let Ok(mode) = std::env::var("TMPLVER_VALIDATION_MODE") {
            self.validation.mode = match mode.to_lowercase().as_str() {
                "basic" => ValidationMode::Basic,
                "strict" => ValidationMode::Strict,
                other => {
                    return Err(Error::configuration(format!("Invalid validation mode: {}", other)));
                }
            };
        }

        if let Ok(enforce) = std::env::var("TMPLVER_ENFORCE_ON_PUBLISH") {
            self.validation.enforce_on_publish = enforce.to_lowercase() == "true" || enforce == "1";
        }

        if let Ok(limit) = std::env::var("TMPLVER_DEFAULT_LIST_LIMIT") {
            let limit = limit.parse::<usize>().map_err(|e| Error::Configuration {
                message: format!("Invalid list limit: {}", limit),
                source: Some(anyhow::Error::new(e)),
            })?;
            self.versions.default_list_limit = Some(limit);
        }

        Ok(())
    }

    /// Check values serde cannot check on its own
    pub fn validate(&self) -> Result<()> {
        self.versions.initial_version().map_err(|e| Error::Configuration {
            message: format!("Invalid initial_version '{}'", self.versions.initial_version),
            source: Some(anyhow::Error::new(e)),
        })?;
        if self.versions.default_list_limit == Some(0) {
            return Err(Error::configuration("default_list_limit must be greater than zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogFormat;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.validation.mode, ValidationMode::Strict);
        assert!(config.validation.enforce_on_publish);
        assert_eq!(config.versions.initial_version, "1.0.0");
        assert_eq!(config.versions.default_list_limit, None);
        assert_eq!(config.logging.format, LogFormat::Compact);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: EngineConfig = toml::from_str(
            r#"
            [validation]
            mode = "basic"

            [logging]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.validation.mode, ValidationMode::Basic);
        assert!(config.validation.enforce_on_publish);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_initial_version_rejected() {
        let mut config = EngineConfig::default();
        config.versions.initial_version = "1.0".to_string();
        assert!(matches!(config.validate(), Err(Error::Configuration { .. })));
    }
}

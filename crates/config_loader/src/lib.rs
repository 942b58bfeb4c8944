//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Validate configuration legality
//! - Generate `PipelineConfig`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::load_from_path(Path::new("pipeline.toml")).unwrap();
//! println!("Handlers: {}", config.handlers.len());
//! ```

mod parser;
mod validator;

pub use contracts::PipelineConfig;
pub use parser::ConfigFormat;

use contracts::CommitterError;
use std::path::Path;

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<PipelineConfig, CommitterError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<PipelineConfig, CommitterError> {
        let config = parser::parse(content, format)?;
        validator::validate(&config)?;
        Ok(config)
    }

    /// Serialize PipelineConfig to TOML string
    pub fn to_toml(config: &PipelineConfig) -> Result<String, CommitterError> {
        toml::to_string_pretty(config)
            .map_err(|e| CommitterError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize PipelineConfig to JSON string
    pub fn to_json(config: &PipelineConfig) -> Result<String, CommitterError> {
        serde_json::to_string_pretty(config)
            .map_err(|e| CommitterError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, CommitterError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            CommitterError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            CommitterError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read configuration file content
    fn read_file(path: &Path) -> Result<String, CommitterError> {
        Ok(std::fs::read_to_string(path)?)
    }
}

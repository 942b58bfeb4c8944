//! Configuration parsing (TOML / JSON)

use contracts::{CommitterError, PipelineConfig};

/// Supported configuration formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// Infer format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parse configuration content in the given format
pub fn parse(content: &str, format: ConfigFormat) -> Result<PipelineConfig, CommitterError> {
    match format {
        ConfigFormat::Toml => toml::from_str(content)
            .map_err(|e| CommitterError::config_parse(format!("TOML parse error: {e}"))),
        ConfigFormat::Json => serde_json::from_str(content)
            .map_err(|e| CommitterError::config_parse(format!("JSON parse error: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_extension("toml"), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_extension("JSON"), Some(ConfigFormat::Json));
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }

    #[test]
    fn test_parse_error_is_config_parse() {
        let err = parse("not = [valid", ConfigFormat::Toml).unwrap_err();
        assert!(matches!(err, CommitterError::ConfigParse { .. }));
    }
}

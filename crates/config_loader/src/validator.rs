//! Configuration validation
//!
//! Rules:
//! - at least one handler
//! - spool threshold > 0
//! - handler names non-empty
//! - file handlers carry a directory
//! - fan-out handlers carry children
//! - field filter patterns compile

use contracts::{CommitterError, HandlerConfig, HandlerType, PipelineConfig};

/// Validate a pipeline configuration
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &PipelineConfig) -> Result<(), CommitterError> {
    if config.spool.max_memory_bytes == 0 {
        return Err(CommitterError::config_validation(
            "spool.max_memory_bytes",
            "must be > 0",
        ));
    }
    if config.handlers.is_empty() {
        return Err(CommitterError::config_validation(
            "handlers",
            "at least one handler is required",
        ));
    }
    for handler in &config.handlers {
        validate_handler(handler, "handlers")?;
    }
    Ok(())
}

fn validate_handler(config: &HandlerConfig, path: &str) -> Result<(), CommitterError> {
    let path = format!("{path}[{}]", config.name);

    if config.name.is_empty() {
        return Err(CommitterError::config_validation(
            format!("{path}.name"),
            "handler name must not be empty",
        ));
    }

    // Surfaces invalid regexes at load time instead of first dispatch
    config.field_filter.compile()?;

    match config.handler_type {
        HandlerType::File => {
            if config.directory.is_none() {
                return Err(CommitterError::config_validation(
                    format!("{path}.directory"),
                    "file handler requires a directory",
                ));
            }
        }
        HandlerType::FanOut => {
            if config.children.is_empty() {
                return Err(CommitterError::config_validation(
                    format!("{path}.children"),
                    "fan-out handler requires at least one child",
                ));
            }
            for child in &config.children {
                validate_handler(child, &format!("{path}.children"))?;
            }
        }
        HandlerType::Log => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::SpoolConfig;

    fn minimal() -> PipelineConfig {
        PipelineConfig {
            spool: SpoolConfig::default(),
            handlers: vec![HandlerConfig::new("console", HandlerType::Log)],
        }
    }

    #[test]
    fn test_minimal_config_passes() {
        assert!(validate(&minimal()).is_ok());
    }

    #[test]
    fn test_empty_handlers_rejected() {
        let mut config = minimal();
        config.handlers.clear();
        assert!(matches!(
            validate(&config).unwrap_err(),
            CommitterError::ConfigValidation { .. }
        ));
    }

    #[test]
    fn test_zero_spool_threshold_rejected() {
        let mut config = minimal();
        config.spool.max_memory_bytes = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_file_handler_needs_directory() {
        let mut config = minimal();
        config.handlers = vec![HandlerConfig::new("fs", HandlerType::File)];
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("directory"));
    }

    #[test]
    fn test_fan_out_needs_children_recursively() {
        let mut config = minimal();
        config.handlers = vec![HandlerConfig {
            children: vec![HandlerConfig::new("empty_tree", HandlerType::FanOut)],
            ..HandlerConfig::new("tree", HandlerType::FanOut)
        }];
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("children"));
    }
}

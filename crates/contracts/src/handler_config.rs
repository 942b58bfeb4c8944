//! Handler and pipeline configuration contracts shared across crates

use std::path::PathBuf;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::CommitterError;

/// Default in-memory buffering threshold before content spills to disk
pub const DEFAULT_MAX_MEMORY_BYTES: usize = 1024 * 1024;

/// Spill-storage settings for replayable content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpoolConfig {
    /// Bytes buffered in memory before spilling to a temp file
    #[serde(default = "default_max_memory_bytes")]
    pub max_memory_bytes: usize,

    /// Directory for spill files (system temp dir when unset)
    #[serde(default)]
    pub spool_dir: Option<PathBuf>,
}

fn default_max_memory_bytes() -> usize {
    DEFAULT_MAX_MEMORY_BYTES
}

impl Default for SpoolConfig {
    fn default() -> Self {
        Self {
            max_memory_bytes: DEFAULT_MAX_MEMORY_BYTES,
            spool_dir: None,
        }
    }
}

/// Which handler implementation a config entry describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerType {
    /// Log every operation via tracing (troubleshooting aid)
    Log,
    /// Write operations to a directory on disk
    File,
    /// Nested fan-out over `children`
    FanOut,
}

/// Include/exclude patterns restricting which metadata fields a
/// logging-style handler renders
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldFilter {
    /// Only fields matching this pattern are rendered (all, when unset)
    #[serde(default)]
    pub include: Option<String>,
    /// Fields matching this pattern are never rendered
    #[serde(default)]
    pub exclude: Option<String>,
}

impl FieldFilter {
    /// Compile the patterns once for per-field matching
    ///
    /// # Errors
    /// Returns a validation error when either pattern is not a valid regex.
    pub fn compile(&self) -> Result<CompiledFieldFilter, CommitterError> {
        let compile = |pattern: &Option<String>, which: &str| {
            pattern
                .as_deref()
                .map(Regex::new)
                .transpose()
                .map_err(|e| {
                    CommitterError::config_validation(
                        format!("field_filter.{which}"),
                        format!("invalid pattern: {e}"),
                    )
                })
        };
        Ok(CompiledFieldFilter {
            include: compile(&self.include, "include")?,
            exclude: compile(&self.exclude, "exclude")?,
        })
    }
}

/// Compiled form of [`FieldFilter`]
#[derive(Debug, Default)]
pub struct CompiledFieldFilter {
    include: Option<Regex>,
    exclude: Option<Regex>,
}

impl CompiledFieldFilter {
    /// Whether a field name passes the filter
    pub fn matches(&self, field: &str) -> bool {
        if let Some(exclude) = &self.exclude {
            if exclude.is_match(field) {
                return false;
            }
        }
        match &self.include {
            Some(include) => include.is_match(field),
            None => true,
        }
    }
}

/// Configuration of one handler in the dispatch tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlerConfig {
    /// Handler instance name (used for logging/metrics)
    pub name: String,

    /// Which implementation to construct
    pub handler_type: HandlerType,

    /// Metadata field filter (log handlers)
    #[serde(default)]
    pub field_filter: FieldFilter,

    /// Skip rendering document content (log handlers)
    #[serde(default)]
    pub ignore_content: bool,

    /// Destination directory (file handlers)
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Child handlers (fan-out handlers), dispatched in listed order
    #[serde(default)]
    pub children: Vec<HandlerConfig>,
}

impl HandlerConfig {
    /// Minimal config for a handler that takes no parameters
    pub fn new(name: impl Into<String>, handler_type: HandlerType) -> Self {
        Self {
            name: name.into(),
            handler_type,
            field_filter: FieldFilter::default(),
            ignore_content: false,
            directory: None,
            children: Vec::new(),
        }
    }
}

/// Top-level pipeline configuration consumed by the dispatcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Content spill settings shared by the whole dispatch tree
    #[serde(default)]
    pub spool: SpoolConfig,

    /// Ordered destination handlers
    pub handlers: Vec<HandlerConfig>,
}

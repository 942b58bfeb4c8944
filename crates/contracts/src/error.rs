//! Layered error definitions
//!
//! Categorized by source: config / lifecycle / handler / content

use thiserror::Error;

use crate::LifecycleState;

/// Unified error type
#[derive(Debug, Error)]
pub enum CommitterError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Lifecycle Errors =====
    /// Handler could not reach the ready state
    #[error("handler '{handler}' init error: {message}")]
    Init { handler: String, message: String },

    /// Lifecycle call made out of order
    #[error("illegal call to '{call}' on handler '{handler}' in {state:?} state")]
    IllegalState {
        handler: String,
        call: String,
        state: LifecycleState,
    },

    // ===== Handler Errors =====
    /// Handler failed while processing an operation
    #[error("handler '{handler}' failed to process '{reference}': {message}")]
    Handle {
        handler: String,
        reference: String,
        message: String,
    },

    /// Handler failed to flush buffered work
    #[error("handler '{handler}' commit error: {message}")]
    Commit { handler: String, message: String },

    /// Handler failed while releasing resources
    #[error("handler '{handler}' close error: {message}")]
    Close { handler: String, message: String },

    /// Handler failed during out-of-band maintenance
    #[error("handler '{handler}' clean error: {message}")]
    Clean { handler: String, message: String },

    /// One or more handlers failed to close; close is never short-circuited,
    /// so every failure that occurred is carried here
    #[error("close failed for {} handler(s)", failures.len())]
    CloseAggregate { failures: Vec<CommitterError> },

    // ===== Content Errors =====
    /// Content replay or backing-store access error
    #[error("content replay error: {message}")]
    ContentReplay { message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl CommitterError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create handler init error
    pub fn init(handler: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Init {
            handler: handler.into(),
            message: message.into(),
        }
    }

    /// Create illegal lifecycle call error
    pub fn illegal_state(
        handler: impl Into<String>,
        call: impl Into<String>,
        state: LifecycleState,
    ) -> Self {
        Self::IllegalState {
            handler: handler.into(),
            call: call.into(),
            state,
        }
    }

    /// Create per-operation handler error
    pub fn handle(
        handler: impl Into<String>,
        reference: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Handle {
            handler: handler.into(),
            reference: reference.into(),
            message: message.into(),
        }
    }

    /// Create commit error
    pub fn commit(handler: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Commit {
            handler: handler.into(),
            message: message.into(),
        }
    }

    /// Create close error
    pub fn close(handler: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Close {
            handler: handler.into(),
            message: message.into(),
        }
    }

    /// Create clean error
    pub fn clean(handler: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Clean {
            handler: handler.into(),
            message: message.into(),
        }
    }

    /// Create content replay error
    pub fn content_replay(message: impl Into<String>) -> Self {
        Self::ContentReplay {
            message: message.into(),
        }
    }
}

//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Delivery Model
//! - Operations are dispatched synchronously, in handler registration order
//! - Upsert content is shared read-only across handlers via rewind+read
//! - No cross-destination atomicity: partial success is visible to the caller

mod content;
mod error;
mod handler;
mod handler_config;
mod metadata;
mod operation;

pub use content::ReplayableContent;
pub use error::CommitterError;
pub use handler::{CommitterHandler, HandlerContext, LifecycleState};
pub use handler_config::{
    CompiledFieldFilter, FieldFilter, HandlerConfig, HandlerType, PipelineConfig, SpoolConfig,
    DEFAULT_MAX_MEMORY_BYTES,
};
pub use metadata::Metadata;
pub use operation::CommitOperation;

//! # Dispatcher
//!
//! Commit-stage fan-out module.
//!
//! Responsibilities:
//! - Forward every [`CommitOperation`] to an ordered list of handlers
//! - Rewind shared content before each delivery
//! - Enforce the handler lifecycle and surface the first failure

pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod metrics;

pub use contracts::{CommitOperation, CommitterHandler};
pub use dispatcher::{create_dispatcher, create_handler, FanOutDispatcher, HandlerId};
pub use error::DispatcherError;
pub use handlers::{FileSystemHandler, FileSystemHandlerConfig, LogHandler};
pub use metrics::{HandlerMetrics, MetricsSnapshot};

//! FanOutDispatcher - ordered fan-out of commit operations to handlers

use tracing::{debug, error, info, instrument};

use contracts::{
    CommitOperation, CommitterError, CommitterHandler, HandlerConfig, HandlerContext, HandlerType,
    LifecycleState, PipelineConfig,
};

use crate::error::DispatcherError;
use crate::handlers::{FileSystemHandler, LogHandler};
use crate::metrics::{HandlerMetrics, MetricsSnapshot};

/// Identity token for a registered handler.
///
/// Returned by [`FanOutDispatcher::add_handler`]; the only way to remove
/// a specific registration, since duplicates are permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

struct HandlerEntry {
    id: HandlerId,
    handler: Box<dyn CommitterHandler>,
    metrics: HandlerMetrics,
}

/// A handler that forwards every call to an ordered list of child handlers.
///
/// Children are invoked strictly in registration order for every lifecycle
/// call and every operation. Upsert content is rewound immediately before
/// delivery to each child, so no child inherits a mid-stream cursor from
/// the previous one. `init`, `handle`, `commit` and `clean` are fail-fast
/// with no rollback of children already processed; `close` is best-effort
/// across all children and aggregates every failure.
///
/// Implements [`CommitterHandler`] itself, so dispatchers nest into trees.
pub struct FanOutDispatcher {
    name: String,
    entries: Vec<HandlerEntry>,
    next_id: u64,
    state: LifecycleState,
}

impl FanOutDispatcher {
    /// Create an empty dispatcher
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
            next_id: 0,
            state: LifecycleState::default(),
        }
    }

    /// Append a handler to the registry.
    ///
    /// No uniqueness constraint; the same implementation may be registered
    /// more than once. Returns the identity token for later removal.
    pub fn add_handler(&mut self, handler: Box<dyn CommitterHandler>) -> HandlerId {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        self.entries.push(HandlerEntry {
            id,
            handler,
            metrics: HandlerMetrics::new(),
        });
        id
    }

    /// Remove a handler by identity, returning it if present
    pub fn remove_handler(&mut self, id: HandlerId) -> Option<Box<dyn CommitterHandler>> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(index).handler)
    }

    /// Number of registered handlers
    pub fn handler_count(&self) -> usize {
        self.entries.len()
    }

    /// Get metrics for all handlers, in registration order
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.entries
            .iter()
            .map(|e| (e.handler.name().to_string(), e.metrics.snapshot()))
            .collect()
    }
}

impl CommitterHandler for FanOutDispatcher {
    fn name(&self) -> &str {
        &self.name
    }

    /// Initialize children in registration order, fail-fast.
    ///
    /// Children initialized before a failure stay initialized; the caller
    /// must close them separately if it recovers.
    #[instrument(
        name = "dispatcher_init",
        skip(self, ctx),
        fields(dispatcher = %self.name, handlers = self.entries.len())
    )]
    fn init(&mut self, ctx: &HandlerContext) -> Result<(), CommitterError> {
        self.state.ensure_uninitialized(&self.name)?;

        for entry in &mut self.entries {
            let child_ctx = HandlerContext::new(
                format!("{}.{}", ctx.id, entry.handler.name()),
                ctx.spool.clone(),
            );
            entry.handler.init(&child_ctx)?;
        }

        self.state = LifecycleState::Ready;
        info!(dispatcher = %self.name, handlers = self.entries.len(), "Dispatcher ready");
        Ok(())
    }

    #[instrument(
        name = "dispatcher_handle",
        skip(self, op),
        fields(dispatcher = %self.name, reference = %op.reference())
    )]
    fn handle(&mut self, op: &mut CommitOperation) -> Result<(), CommitterError> {
        self.state.ensure_ready(&self.name, "handle")?;

        let is_upsert = op.is_upsert();
        let reference = op.reference().to_string();
        for entry in &mut self.entries {
            // Every child sees the stream from offset 0, even if the
            // previous child stopped mid-stream.
            if let Some(content) = op.content_mut() {
                if let Err(e) = content.rewind() {
                    entry.metrics.inc_failure_count();
                    error!(
                        dispatcher = %self.name,
                        handler = %entry.handler.name(),
                        reference = %reference,
                        error = %e,
                        "Content rewind failed, aborting dispatch for this operation"
                    );
                    return Err(CommitterError::handle(
                        entry.handler.name(),
                        reference.as_str(),
                        format!("content rewind failed: {e}"),
                    ));
                }
            }

            if let Err(e) = entry.handler.handle(op) {
                entry.metrics.inc_failure_count();
                error!(
                    dispatcher = %self.name,
                    handler = %entry.handler.name(),
                    reference = %reference,
                    error = %e,
                    "Handler failed, aborting dispatch for this operation"
                );
                return Err(e);
            }

            if is_upsert {
                entry.metrics.inc_upsert_count();
            } else {
                entry.metrics.inc_delete_count();
            }
        }
        Ok(())
    }

    /// Flush children in registration order, fail-fast
    #[instrument(name = "dispatcher_commit", skip(self), fields(dispatcher = %self.name))]
    fn commit(&mut self) -> Result<(), CommitterError> {
        self.state.ensure_ready(&self.name, "commit")?;

        for entry in &mut self.entries {
            entry.handler.commit()?;
        }
        debug!(dispatcher = %self.name, "Commit forwarded to all handlers");
        Ok(())
    }

    /// Close every child, best-effort.
    ///
    /// Unlike `handle`/`commit`, a failing child does not stop the rest:
    /// resource cleanup must be attempted for all. Every failure that
    /// occurred is reported, not just the first.
    #[instrument(name = "dispatcher_close", skip(self), fields(dispatcher = %self.name))]
    fn close(&mut self) -> Result<(), CommitterError> {
        self.state.ensure_ready(&self.name, "close")?;

        let mut failures = Vec::new();
        for entry in &mut self.entries {
            if let Err(e) = entry.handler.close() {
                error!(
                    dispatcher = %self.name,
                    handler = %entry.handler.name(),
                    error = %e,
                    "Handler close failed, continuing with remaining handlers"
                );
                failures.push(e);
            }
        }
        self.state = LifecycleState::Closed;

        if failures.is_empty() {
            info!(dispatcher = %self.name, "Dispatcher closed");
            Ok(())
        } else {
            Err(CommitterError::CloseAggregate { failures })
        }
    }

    /// Forward maintenance to children in order, fail-fast.
    ///
    /// Legal in any lifecycle state.
    #[instrument(name = "dispatcher_clean", skip(self), fields(dispatcher = %self.name))]
    fn clean(&mut self) -> Result<(), CommitterError> {
        for entry in &mut self.entries {
            entry.handler.clean()?;
        }
        Ok(())
    }
}

/// Create a handler from its configuration
#[instrument(
    name = "dispatcher_create_handler",
    skip(config),
    fields(handler = %config.name, handler_type = ?config.handler_type)
)]
pub fn create_handler(config: &HandlerConfig) -> Result<Box<dyn CommitterHandler>, DispatcherError> {
    match config.handler_type {
        HandlerType::Log => {
            let handler = LogHandler::from_config(config)
                .map_err(|e| DispatcherError::handler_creation(&config.name, e.to_string()))?;
            Ok(Box::new(handler))
        }
        HandlerType::File => {
            let handler = FileSystemHandler::from_config(config)
                .map_err(|e| DispatcherError::handler_creation(&config.name, e.to_string()))?;
            Ok(Box::new(handler))
        }
        HandlerType::FanOut => {
            let mut dispatcher = FanOutDispatcher::new(config.name.clone());
            for child in &config.children {
                let handler = create_handler(child)?;
                dispatcher.add_handler(handler);
            }
            Ok(Box::new(dispatcher))
        }
    }
}

/// Convenience function to create the root dispatcher from pipeline config
#[instrument(name = "dispatcher_create", skip(config), fields(handlers = config.handlers.len()))]
pub fn create_dispatcher(config: &PipelineConfig) -> Result<FanOutDispatcher, DispatcherError> {
    let mut dispatcher = FanOutDispatcher::new("dispatcher");
    for handler_config in &config.handlers {
        let handler = create_handler(handler_config)?;
        dispatcher.add_handler(handler);
    }
    Ok(dispatcher)
}

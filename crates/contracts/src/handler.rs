//! CommitterHandler trait - the destination interface
//!
//! Defines the uniform capability interface implemented by every
//! destination adapter and by the fan-out dispatcher itself, which is
//! what makes dispatch trees composable.

use std::io::Read;

use crate::{CommitOperation, CommitterError, ReplayableContent, SpoolConfig};

/// Commit destination trait
///
/// All destination implementations must implement this trait. The call
/// chain is single-threaded and synchronous: every method blocks until
/// the work is done, and the caller drives the lifecycle directly.
///
/// No timeout is imposed on any call; a handler that blocks indefinitely
/// (e.g. on network I/O) stalls the whole dispatch chain.
pub trait CommitterHandler {
    /// Handler name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Move the handler to the ready state.
    ///
    /// Called exactly once before any operation.
    ///
    /// # Errors
    /// Returns [`CommitterError::Init`] when the destination cannot be
    /// reached or prepared.
    fn init(&mut self, ctx: &HandlerContext) -> Result<(), CommitterError>;

    /// Process one upsert or delete operation.
    ///
    /// Operations arrive interleaved, for arbitrary references, with no
    /// grouping and no duplicate-reference guarantee.
    ///
    /// # Errors
    /// Returns a processing error (should include context)
    fn handle(&mut self, op: &mut CommitOperation) -> Result<(), CommitterError>;

    /// Flush buffered work now.
    ///
    /// May be called multiple times during a session, once per batch.
    fn commit(&mut self) -> Result<(), CommitterError>;

    /// Final call; release all destination-held resources
    fn close(&mut self) -> Result<(), CommitterError>;

    /// Out-of-band maintenance: purge orphaned destination state.
    ///
    /// Must be self-contained and callable in any lifecycle state.
    fn clean(&mut self) -> Result<(), CommitterError>;
}

/// Context handed to a handler at init time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HandlerContext {
    /// Unique instance identifier for this handler
    pub id: String,
    /// Spill-storage settings for re-wrapping content streams
    pub spool: SpoolConfig,
}

impl HandlerContext {
    /// Create a context for a handler instance
    pub fn new(id: impl Into<String>, spool: SpoolConfig) -> Self {
        Self {
            id: id.into(),
            spool,
        }
    }

    /// Wrap a source stream so it satisfies the replay contract.
    ///
    /// Buffers an arbitrary reader against this context's spill settings.
    /// Bytes already in memory should go through
    /// [`ReplayableContent::from_bytes`] instead; that path is a
    /// passthrough and never double-buffers.
    pub fn ensure_replayable(
        &self,
        reader: impl Read,
    ) -> Result<ReplayableContent, CommitterError> {
        ReplayableContent::from_reader(reader, &self.spool)
    }
}

/// Lifecycle state of a handler instance
///
/// ```text
/// UNINITIALIZED --init()--> READY
/// READY --handle()/commit()--> READY
/// READY --close()--> CLOSED
/// (any state) --clean()--> (same state)
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LifecycleState {
    /// Created but not yet initialized
    #[default]
    Uninitialized,
    /// Initialized and accepting operations
    Ready,
    /// Closed; no further calls accepted
    Closed,
}

impl LifecycleState {
    /// Guard for `handle`/`commit`/`close`: only legal when ready
    pub fn ensure_ready(&self, handler: &str, call: &str) -> Result<(), CommitterError> {
        if *self == Self::Ready {
            Ok(())
        } else {
            Err(CommitterError::illegal_state(handler, call, *self))
        }
    }

    /// Guard for `init`: only legal before the first init
    pub fn ensure_uninitialized(&self, handler: &str) -> Result<(), CommitterError> {
        if *self == Self::Uninitialized {
            Ok(())
        } else {
            Err(CommitterError::illegal_state(handler, "init", *self))
        }
    }
}

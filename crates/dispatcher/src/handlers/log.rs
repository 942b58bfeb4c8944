//! LogHandler - logs every operation via tracing
//!
//! A troubleshooting destination: renders reference, filtered metadata
//! and (optionally) content for every operation. Not meant for
//! production volumes.

use std::fmt::Write as _;
use std::io::Read;
use std::time::Instant;

use tracing::{info, instrument};

use contracts::{
    CommitOperation, CommitterError, CommitterHandler, CompiledFieldFilter, HandlerConfig,
    HandlerContext, LifecycleState,
};

const LOG_PROGRESS_BATCH_SIZE: u64 = 100;

/// Handler that logs operation summaries for debugging
pub struct LogHandler {
    name: String,
    ignore_content: bool,
    filter: CompiledFieldFilter,
    state: LifecycleState,
    upsert_count: u64,
    delete_count: u64,
    started: Option<Instant>,
}

impl LogHandler {
    /// Create a new LogHandler logging all fields and content
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ignore_content: false,
            filter: CompiledFieldFilter::default(),
            state: LifecycleState::default(),
            upsert_count: 0,
            delete_count: 0,
            started: None,
        }
    }

    /// Create from handler configuration (for factory)
    pub fn from_config(config: &HandlerConfig) -> Result<Self, CommitterError> {
        Ok(Self {
            name: config.name.clone(),
            ignore_content: config.ignore_content,
            filter: config.field_filter.compile()?,
            state: LifecycleState::default(),
            upsert_count: 0,
            delete_count: 0,
            started: None,
        })
    }

    fn render_ref_and_meta(&self, text: &mut String, op: &CommitOperation) {
        let _ = writeln!(text, "REFERENCE = {}", op.reference());
        if !op.metadata().is_empty() {
            text.push_str("--- Metadata: -------------------------------------\n");
            for (field, values) in op.metadata().iter() {
                if self.filter.matches(field) {
                    for value in values {
                        let _ = writeln!(text, "{field} = {value}");
                    }
                }
            }
        }
    }

    fn render_upsert(&self, op: &mut CommitOperation) -> Result<String, CommitterError> {
        let mut text = String::from("=== DOCUMENT UPSERTED ================================\n");
        self.render_ref_and_meta(&mut text, op);

        if !self.ignore_content {
            text.push_str("--- Content ---------------------------------------\n");
            let reference = op.reference().to_string();
            let mut body = Vec::new();
            if let Some(content) = op.content_mut() {
                content.read_to_end(&mut body).map_err(|e| {
                    CommitterError::handle(&self.name, reference.as_str(), e.to_string())
                })?;
            }
            text.push_str(&String::from_utf8_lossy(&body));
            text.push('\n');
        }
        Ok(text)
    }

    fn render_delete(&self, op: &CommitOperation) -> String {
        let mut text = String::from("=== DOCUMENT DELETED =================================\n");
        self.render_ref_and_meta(&mut text, op);
        text
    }

    fn elapsed_secs(&self) -> f64 {
        self.started.map(|t| t.elapsed().as_secs_f64()).unwrap_or(0.0)
    }
}

impl CommitterHandler for LogHandler {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "log_handler_init", skip(self, _ctx), fields(handler = %self.name))]
    fn init(&mut self, _ctx: &HandlerContext) -> Result<(), CommitterError> {
        self.state.ensure_uninitialized(&self.name)?;
        self.started = Some(Instant::now());
        self.state = LifecycleState::Ready;
        Ok(())
    }

    #[instrument(
        name = "log_handler_handle",
        skip(self, op),
        fields(handler = %self.name, reference = %op.reference())
    )]
    fn handle(&mut self, op: &mut CommitOperation) -> Result<(), CommitterError> {
        self.state.ensure_ready(&self.name, "handle")?;

        if op.is_upsert() {
            let text = self.render_upsert(op)?;
            info!(handler = %self.name, "{text}");
            self.upsert_count += 1;
            if self.upsert_count % LOG_PROGRESS_BATCH_SIZE == 0 {
                info!(
                    handler = %self.name,
                    upserts = self.upsert_count,
                    elapsed_secs = self.elapsed_secs(),
                    "Upsert progress"
                );
            }
        } else {
            let text = self.render_delete(op);
            info!(handler = %self.name, "{text}");
            self.delete_count += 1;
            if self.delete_count % LOG_PROGRESS_BATCH_SIZE == 0 {
                info!(
                    handler = %self.name,
                    deletes = self.delete_count,
                    elapsed_secs = self.elapsed_secs(),
                    "Delete progress"
                );
            }
        }
        Ok(())
    }

    #[instrument(name = "log_handler_commit", skip(self), fields(handler = %self.name))]
    fn commit(&mut self) -> Result<(), CommitterError> {
        self.state.ensure_ready(&self.name, "commit")?;
        // Nothing buffered for a log handler
        Ok(())
    }

    #[instrument(name = "log_handler_close", skip(self), fields(handler = %self.name))]
    fn close(&mut self) -> Result<(), CommitterError> {
        self.state.ensure_ready(&self.name, "close")?;
        self.state = LifecycleState::Closed;
        info!(
            handler = %self.name,
            upserts = self.upsert_count,
            deletes = self.delete_count,
            elapsed_secs = self.elapsed_secs(),
            "LogHandler closed"
        );
        Ok(())
    }

    fn clean(&mut self) -> Result<(), CommitterError> {
        // Nothing to purge for a log handler
        Ok(())
    }
}

//! FileSystemHandler - writes operations to a directory tree
//!
//! Upserts land under `<dir>/upserts/` as a content file plus a metadata
//! JSON document; deletes land under `<dir>/deletes/` as a reference
//! marker. Files are sequence-numbered so repeated operations for the
//! same reference never overwrite each other.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, error, info, instrument};

use contracts::{
    CommitOperation, CommitterError, CommitterHandler, HandlerConfig, HandlerContext,
    LifecycleState, Metadata,
};

const UPSERT_DIR: &str = "upserts";
const DELETE_DIR: &str = "deletes";
const CONTENT_EXT: &str = "cntnt";
const META_EXT: &str = "meta.json";
const DELETE_EXT: &str = "ref";
const MAX_STEM_REF_LEN: usize = 64;

/// Configuration for FileSystemHandler
#[derive(Debug, Clone, PartialEq)]
pub struct FileSystemHandlerConfig {
    /// Base output directory
    pub directory: PathBuf,
}

#[derive(Serialize)]
struct MetaRecord<'a> {
    reference: &'a str,
    metadata: &'a Metadata,
}

/// Handler that persists every operation as files on disk
pub struct FileSystemHandler {
    name: String,
    config: FileSystemHandlerConfig,
    state: LifecycleState,
    created_dirs: HashSet<PathBuf>,
    seq: u64,
    upsert_count: u64,
    delete_count: u64,
}

impl FileSystemHandler {
    /// Create a new FileSystemHandler
    pub fn new(name: impl Into<String>, config: FileSystemHandlerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            state: LifecycleState::default(),
            created_dirs: HashSet::new(),
            seq: 0,
            upsert_count: 0,
            delete_count: 0,
        }
    }

    /// Create from handler configuration (for factory)
    pub fn from_config(config: &HandlerConfig) -> Result<Self, CommitterError> {
        let directory = config.directory.clone().ok_or_else(|| {
            CommitterError::config_validation(
                format!("handlers[{}].directory", config.name),
                "file handler requires a directory",
            )
        })?;
        Ok(Self::new(&config.name, FileSystemHandlerConfig { directory }))
    }

    fn ensure_dir(&mut self, sub: &str) -> io::Result<PathBuf> {
        let dir = self.config.directory.join(sub);
        if !self.created_dirs.contains(&dir) {
            fs::create_dir_all(&dir)?;
            self.created_dirs.insert(dir.clone());
        }
        Ok(dir)
    }

    fn next_stem(&mut self, reference: &str) -> String {
        self.seq += 1;
        format!("{:06}-{}", self.seq, sanitize_reference(reference))
    }

    fn write_upsert(&mut self, op: &mut CommitOperation) -> io::Result<()> {
        let dir = self.ensure_dir(UPSERT_DIR)?;
        let stem = self.next_stem(op.reference());
        let content_path = dir.join(format!("{stem}.{CONTENT_EXT}"));
        let meta_path = dir.join(format!("{stem}.{META_EXT}"));

        // Content first: a failure mid-record must not leave an orphaned
        // metadata file pointing at content that was never written.
        let mut content_file = File::create(&content_path)?;
        if let Some(content) = op.content_mut() {
            if let Err(e) = io::copy(content, &mut content_file) {
                drop(content_file);
                let _ = fs::remove_file(&content_path);
                return Err(e);
            }
        }

        let meta_record = MetaRecord {
            reference: op.reference(),
            metadata: op.metadata(),
        };
        let write_meta = || -> io::Result<()> {
            let meta_file = File::create(&meta_path)?;
            serde_json::to_writer_pretty(meta_file, &meta_record)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
        };
        if let Err(e) = write_meta() {
            let _ = fs::remove_file(&meta_path);
            let _ = fs::remove_file(&content_path);
            return Err(e);
        }
        Ok(())
    }

    fn write_delete(&mut self, op: &CommitOperation) -> io::Result<()> {
        let dir = self.ensure_dir(DELETE_DIR)?;
        let stem = self.next_stem(op.reference());

        let marker = MetaRecord {
            reference: op.reference(),
            metadata: op.metadata(),
        };
        let marker_file = File::create(dir.join(format!("{stem}.{DELETE_EXT}")))?;
        serde_json::to_writer_pretty(marker_file, &marker)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(())
    }

    fn persist(&mut self, op: &mut CommitOperation) -> Result<(), CommitterError> {
        let result = if op.is_upsert() {
            self.write_upsert(op)
        } else {
            self.write_delete(op)
        };
        result.map_err(|e| {
            error!(handler = %self.name, reference = %op.reference(), error = %e, "Write failed");
            CommitterError::handle(&self.name, op.reference(), e.to_string())
        })
    }

    fn purge_dir(&self, sub: &str) -> io::Result<()> {
        let dir = self.config.directory.join(sub);
        match fs::remove_dir_all(&dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

impl CommitterHandler for FileSystemHandler {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "file_handler_init", skip(self, _ctx), fields(handler = %self.name))]
    fn init(&mut self, _ctx: &HandlerContext) -> Result<(), CommitterError> {
        self.state.ensure_uninitialized(&self.name)?;
        fs::create_dir_all(&self.config.directory)
            .map_err(|e| CommitterError::init(&self.name, e.to_string()))?;
        self.state = LifecycleState::Ready;
        debug!(handler = %self.name, directory = %self.config.directory.display(), "FileSystemHandler ready");
        Ok(())
    }

    #[instrument(
        name = "file_handler_handle",
        skip(self, op),
        fields(handler = %self.name, reference = %op.reference())
    )]
    fn handle(&mut self, op: &mut CommitOperation) -> Result<(), CommitterError> {
        self.state.ensure_ready(&self.name, "handle")?;
        self.persist(op)?;
        if op.is_upsert() {
            self.upsert_count += 1;
        } else {
            self.delete_count += 1;
        }
        Ok(())
    }

    #[instrument(name = "file_handler_commit", skip(self), fields(handler = %self.name))]
    fn commit(&mut self) -> Result<(), CommitterError> {
        self.state.ensure_ready(&self.name, "commit")?;
        // Operations are persisted as they arrive; nothing buffered
        Ok(())
    }

    #[instrument(name = "file_handler_close", skip(self), fields(handler = %self.name))]
    fn close(&mut self) -> Result<(), CommitterError> {
        self.state.ensure_ready(&self.name, "close")?;
        self.state = LifecycleState::Closed;
        info!(
            handler = %self.name,
            upserts = self.upsert_count,
            deletes = self.delete_count,
            "FileSystemHandler closed"
        );
        Ok(())
    }

    /// Purge previously written operation files.
    ///
    /// Self-contained: legal in any lifecycle state.
    #[instrument(name = "file_handler_clean", skip(self), fields(handler = %self.name))]
    fn clean(&mut self) -> Result<(), CommitterError> {
        self.purge_dir(UPSERT_DIR)
            .and_then(|()| self.purge_dir(DELETE_DIR))
            .map_err(|e| CommitterError::clean(&self.name, e.to_string()))?;
        self.created_dirs.clear();
        info!(handler = %self.name, "Purged written operations");
        Ok(())
    }
}

fn sanitize_reference(reference: &str) -> String {
    let mut sanitized: String = reference
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    sanitized.truncate(MAX_STEM_REF_LEN);
    sanitized
}

/// List files under a handler subdirectory, sorted by name (test helper
/// and maintenance hook for callers inspecting the output tree)
pub fn list_operation_files(directory: &Path, sub: &str) -> io::Result<Vec<PathBuf>> {
    let dir = directory.join(sub);
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|entry| entry.path())
        .collect();
    files.sort();
    Ok(files)
}

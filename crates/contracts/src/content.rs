//! Replayable content buffer with spill-to-disk backing

use std::fmt;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};

use bytes::Bytes;

use crate::{CommitterError, SpoolConfig};

/// A byte stream that can be rewound to its start any number of times.
///
/// Content up to the configured in-memory threshold is held in a shared
/// buffer; anything larger is spooled to an unnamed temporary file that
/// the OS reclaims when the backing is dropped. The read/rewind contract
/// is identical for both backings.
pub struct ReplayableContent {
    backing: Backing,
}

enum Backing {
    Memory { data: Bytes, pos: usize },
    Spooled { file: File, len: u64 },
    Released,
}

impl ReplayableContent {
    /// Wrap bytes already in memory.
    ///
    /// This is the passthrough path: the bytes already satisfy the replay
    /// contract, so no copy and no spill can occur.
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self {
            backing: Backing::Memory {
                data: data.into(),
                pos: 0,
            },
        }
    }

    /// Empty content
    pub fn empty() -> Self {
        Self::from_bytes(Bytes::new())
    }

    /// Drain an arbitrary source stream into a replayable buffer.
    ///
    /// The source is read eagerly: up to `spool.max_memory_bytes` stays in
    /// memory, anything beyond spools to a temp file in `spool.spool_dir`
    /// (system temp dir when unset). The source itself need not be seekable.
    pub fn from_reader(mut reader: impl Read, spool: &SpoolConfig) -> Result<Self, CommitterError> {
        let threshold = spool.max_memory_bytes;
        let mut head = Vec::new();
        reader
            .by_ref()
            .take(threshold as u64 + 1)
            .read_to_end(&mut head)?;

        if head.len() <= threshold {
            return Ok(Self::from_bytes(head));
        }

        let mut file = match &spool.spool_dir {
            Some(dir) => tempfile::tempfile_in(dir)?,
            None => tempfile::tempfile()?,
        };
        file.write_all(&head)?;
        let tail_len = io::copy(&mut reader, &mut file)?;
        file.seek(SeekFrom::Start(0))?;

        Ok(Self {
            backing: Backing::Spooled {
                file,
                len: head.len() as u64 + tail_len,
            },
        })
    }

    /// Reposition the read cursor to byte offset 0.
    ///
    /// # Errors
    /// Fails if the backing store has been released or the spool file
    /// cannot be seeked.
    pub fn rewind(&mut self) -> Result<(), CommitterError> {
        match &mut self.backing {
            Backing::Memory { pos, .. } => {
                *pos = 0;
                Ok(())
            }
            Backing::Spooled { file, .. } => {
                file.seek(SeekFrom::Start(0))?;
                Ok(())
            }
            Backing::Released => Err(CommitterError::content_replay(
                "backing store has been released",
            )),
        }
    }

    /// Free any backing resource; idempotent.
    ///
    /// Subsequent reads and rewinds fail. Dropping the content releases
    /// the backing as well, so calling this is only needed to reclaim
    /// spool space before the owning operation goes away.
    pub fn release(&mut self) {
        self.backing = Backing::Released;
    }

    /// Total content length in bytes
    pub fn len(&self) -> u64 {
        match &self.backing {
            Backing::Memory { data, .. } => data.len() as u64,
            Backing::Spooled { len, .. } => *len,
            Backing::Released => 0,
        }
    }

    /// Whether the content is zero bytes long
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the content lives in a temp file rather than memory
    pub fn is_spooled(&self) -> bool {
        matches!(self.backing, Backing::Spooled { .. })
    }

    /// Whether the backing store has been released
    pub fn is_released(&self) -> bool {
        matches!(self.backing, Backing::Released)
    }
}

impl Read for ReplayableContent {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.backing {
            Backing::Memory { data, pos } => {
                let remaining = &data[(*pos).min(data.len())..];
                let n = remaining.len().min(buf.len());
                buf[..n].copy_from_slice(&remaining[..n]);
                *pos += n;
                Ok(n)
            }
            Backing::Spooled { file, .. } => file.read(buf),
            Backing::Released => Err(io::Error::other("content backing store released")),
        }
    }
}

impl fmt::Debug for ReplayableContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let backing = match &self.backing {
            Backing::Memory { .. } => "memory",
            Backing::Spooled { .. } => "spooled",
            Backing::Released => "released",
        };
        f.debug_struct("ReplayableContent")
            .field("backing", &backing)
            .field("len", &self.len())
            .finish()
    }
}

impl From<Bytes> for ReplayableContent {
    fn from(data: Bytes) -> Self {
        Self::from_bytes(data)
    }
}

impl From<Vec<u8>> for ReplayableContent {
    fn from(data: Vec<u8>) -> Self {
        Self::from_bytes(data)
    }
}

impl From<&str> for ReplayableContent {
    fn from(data: &str) -> Self {
        Self::from_bytes(Bytes::copy_from_slice(data.as_bytes()))
    }
}

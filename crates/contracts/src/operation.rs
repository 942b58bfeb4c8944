//! Commit operation model - the two request variants

use crate::{Metadata, ReplayableContent};

/// A single document request flowing through the dispatch chain.
///
/// Sum type so that handlers match exhaustively; a destination cannot
/// silently ignore a variant it was never written for.
#[derive(Debug)]
pub enum CommitOperation {
    /// Add-or-replace a document at the destination
    Upsert {
        /// Unique document identifier within the pipeline
        reference: String,
        /// Immutable, insertion-ordered document fields
        metadata: Metadata,
        /// Replayable document body, shared by every handler in a fan-out
        content: ReplayableContent,
    },
    /// Remove a document from the destination
    Delete {
        reference: String,
        metadata: Metadata,
    },
}

impl CommitOperation {
    /// Build an upsert operation
    pub fn upsert(
        reference: impl Into<String>,
        metadata: Metadata,
        content: impl Into<ReplayableContent>,
    ) -> Self {
        Self::Upsert {
            reference: reference.into(),
            metadata,
            content: content.into(),
        }
    }

    /// Build a delete operation
    pub fn delete(reference: impl Into<String>, metadata: Metadata) -> Self {
        Self::Delete {
            reference: reference.into(),
            metadata,
        }
    }

    /// The document reference this operation targets
    pub fn reference(&self) -> &str {
        match self {
            Self::Upsert { reference, .. } | Self::Delete { reference, .. } => reference,
        }
    }

    /// Metadata carried by either variant
    pub fn metadata(&self) -> &Metadata {
        match self {
            Self::Upsert { metadata, .. } | Self::Delete { metadata, .. } => metadata,
        }
    }

    /// Mutable content handle, present on upserts only.
    ///
    /// Mutable because reading and rewinding move the cursor; the bytes
    /// themselves never change.
    pub fn content_mut(&mut self) -> Option<&mut ReplayableContent> {
        match self {
            Self::Upsert { content, .. } => Some(content),
            Self::Delete { .. } => None,
        }
    }

    /// Whether this is an upsert
    pub fn is_upsert(&self) -> bool {
        matches!(self, Self::Upsert { .. })
    }
}

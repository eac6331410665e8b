//! Session-local recordings list
//!
//! Newest first. Deleting a recording releases its blob handle.

use super::blob::BlobStore;
use crate::recorder::state::Recording;
use std::sync::Arc;

/// Ordered collection of finalized recordings
pub struct RecordingsCollection {
    items: Vec<Recording>,
    blobs: Arc<BlobStore>,
}

impl RecordingsCollection {
    pub fn new(blobs: Arc<BlobStore>) -> Self {
        Self {
            items: Vec::new(),
            blobs,
        }
    }

    /// Add a freshly finalized recording at the front
    pub fn insert(&mut self, recording: Recording) {
        tracing::debug!("Adding recording {} to the list", recording.id);
        self.items.insert(0, recording);
    }

    pub fn get(&self, id: &str) -> Option<&Recording> {
        self.items.iter().find(|r| r.id == id)
    }

    /// Remove a recording and release its blob. Unknown ids are a no-op.
    pub fn delete(&mut self, id: &str) -> Option<Recording> {
        let index = self.items.iter().position(|r| r.id == id)?;
        let recording = self.items.remove(index);
        if !self.blobs.revoke(&recording.url) {
            tracing::warn!("Blob for recording {} was already released", recording.id);
        }
        tracing::info!("Deleted recording {}", recording.id);
        Some(recording)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Recording> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Recording] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn blobs(&self) -> &Arc<BlobStore> {
        &self.blobs
    }
}

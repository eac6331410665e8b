//! In-memory blob store
//!
//! Assembled media objects live here for the lifetime of the application
//! session, addressed by `blob:` handles. Nothing is written to disk.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

const BLOB_SCHEME: &str = "blob:video-recorder/";

/// Dereferenceable handle to a blob
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobUrl(String);

impl BlobUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An immutable media object
#[derive(Debug)]
pub struct Blob {
    mime_type: String,
    bytes: Vec<u8>,
}

impl Blob {
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Blob-related errors
#[derive(Error, Debug)]
pub enum BlobError {
    #[error("Blob not found: {0}")]
    NotFound(BlobUrl),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Session-scoped store of blobs
#[derive(Default)]
pub struct BlobStore {
    blobs: RwLock<HashMap<BlobUrl, Arc<Blob>>>,
    revoked: AtomicUsize,
}

impl BlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Concatenate `parts` into one blob and return its handle
    pub fn materialize<I, P>(&self, parts: I, mime_type: &str) -> BlobUrl
    where
        I: IntoIterator<Item = P>,
        P: AsRef<[u8]>,
    {
        let mut bytes = Vec::new();
        for part in parts {
            bytes.extend_from_slice(part.as_ref());
        }

        let url = BlobUrl(format!("{}{}", BLOB_SCHEME, Uuid::new_v4()));
        tracing::debug!("Materialized {} ({} bytes, {})", url, bytes.len(), mime_type);

        let blob = Blob {
            mime_type: mime_type.to_string(),
            bytes,
        };
        self.blobs.write().insert(url.clone(), Arc::new(blob));
        url
    }

    /// Dereference a handle
    pub fn get(&self, url: &BlobUrl) -> Result<Arc<Blob>, BlobError> {
        self.blobs
            .read()
            .get(url)
            .cloned()
            .ok_or_else(|| BlobError::NotFound(url.clone()))
    }

    /// Release a handle. Returns false if it was unknown or already released.
    pub fn revoke(&self, url: &BlobUrl) -> bool {
        let removed = self.blobs.write().remove(url).is_some();
        if removed {
            self.revoked.fetch_add(1, Ordering::SeqCst);
            tracing::debug!("Revoked {}", url);
        }
        removed
    }

    pub fn contains(&self, url: &BlobUrl) -> bool {
        self.blobs.read().contains_key(url)
    }

    /// Number of live blobs
    pub fn len(&self) -> usize {
        self.blobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.read().is_empty()
    }

    /// Total number of successful revocations
    pub fn revoked_count(&self) -> usize {
        self.revoked.load(Ordering::SeqCst)
    }
}

//! Finalized recordings
//!
//! The blob store holding encoded media, the newest-first collection and
//! the download/play helpers.

pub mod blob;
pub mod collection;
pub mod export;

pub use blob::{Blob, BlobError, BlobStore, BlobUrl};
pub use collection::RecordingsCollection;

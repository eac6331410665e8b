//! Download and playback of finalized recordings
//!
//! Both dereference the recording's blob handle; download writes a copy
//! under the suggested filename, play hands a temporary copy to a player.
//! Playback copies are tracked in `PlaybackFiles` and removed when it drops.

use super::blob::{BlobError, BlobStore};
use crate::recorder::state::Recording;
use parking_lot::Mutex;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

/// Temporary copies handed to the player during this session
#[derive(Debug, Default)]
pub struct PlaybackFiles {
    paths: Mutex<Vec<PathBuf>>,
}

impl PlaybackFiles {
    pub fn new() -> Self {
        Self::default()
    }

    fn track(&self, path: PathBuf) {
        self.paths.lock().push(path);
    }

    pub fn len(&self) -> usize {
        self.paths.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.lock().is_empty()
    }

    /// Remove every tracked copy, returning how many were deleted
    pub fn cleanup(&self) -> usize {
        let paths = std::mem::take(&mut *self.paths.lock());
        let mut removed = 0;
        for path in paths {
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => tracing::warn!("Failed to remove {}: {}", path.display(), e),
            }
        }
        if removed > 0 {
            tracing::debug!("Removed {} playback copies", removed);
        }
        removed
    }
}

impl Drop for PlaybackFiles {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Write the recording to `dir` as `recording-<timestamp>.<ext>`
pub fn download(
    recording: &Recording,
    blobs: &BlobStore,
    dir: &Path,
) -> Result<PathBuf, BlobError> {
    let blob = blobs.get(&recording.url)?;

    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }

    let path = dir.join(recording.suggested_filename());
    fs::write(&path, blob.bytes())?;

    tracing::info!(
        "Downloaded recording {} to {} ({} bytes)",
        recording.id,
        path.display(),
        blob.size()
    );
    Ok(path)
}

/// Copy the recording to a temporary file and open it with `player`
///
/// Without a player the temporary path is returned for the caller to show.
/// The copy is tracked in `files` and lives until that is cleaned up.
pub fn play(
    recording: &Recording,
    blobs: &BlobStore,
    files: &PlaybackFiles,
    player: Option<&str>,
) -> Result<PathBuf, BlobError> {
    let blob = blobs.get(&recording.url)?;

    let mut file = tempfile::Builder::new()
        .prefix("recording-")
        .suffix(&format!(".{}", recording.extension()))
        .tempfile()?;
    file.write_all(blob.bytes())?;
    let (_, path) = file.keep().map_err(|e| e.error)?;
    files.track(path.clone());

    if let Some(player) = player {
        let child = Command::new(player)
            .arg(&path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        reap(child);
        tracing::info!("Playing recording {} with {}", recording.id, player);
    }

    Ok(path)
}

/// Wait for the player off the caller's thread so it never lingers as a zombie
fn reap(mut child: Child) {
    let wait = move || match child.wait() {
        Ok(status) => tracing::debug!("Player exited with {}", status),
        Err(e) => tracing::warn!("Failed to wait for player: {}", e),
    };
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn_blocking(wait);
        }
        Err(_) => {
            std::thread::spawn(wait);
        }
    }
}

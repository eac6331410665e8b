//! Commands over the recordings list

use super::AppState;
use crate::recorder::state::Recording;
use crate::recordings::export;
use crate::utils::error::{AppError, AppResult};
use std::path::{Path, PathBuf};

/// Recordings, newest first
pub fn list_recordings(state: &AppState) -> Vec<Recording> {
    state.recordings.lock().as_slice().to_vec()
}

/// Delete a recording. Unknown ids are a no-op and return `None`.
pub fn delete_recording(state: &AppState, id: &str) -> Option<Recording> {
    state.recordings.lock().delete(id)
}

fn find(state: &AppState, id: &str) -> AppResult<Recording> {
    state
        .recordings
        .lock()
        .get(id)
        .cloned()
        .ok_or_else(|| AppError::RecordingNotFound(id.to_string()))
}

/// Write a recording to `dir`, or to the configured downloads directory
pub fn download_recording(state: &AppState, id: &str, dir: Option<&Path>) -> AppResult<PathBuf> {
    let recording = find(state, id)?;
    let dir = dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| state.config.downloads_dir());

    let blobs = state.controller.blobs();
    Ok(export::download(&recording, blobs, &dir)?)
}

/// Open a recording with the configured player
pub fn play_recording(state: &AppState, id: &str) -> AppResult<PathBuf> {
    let recording = find(state, id)?;
    let blobs = state.controller.blobs();
    let player = state.config.player.as_deref();
    Ok(export::play(&recording, blobs, &state.playback, player)?)
}

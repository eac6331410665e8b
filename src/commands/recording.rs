//! Recording-related commands

use super::AppState;
use crate::capture::traits::VideoSource;
use crate::recorder::state::{Recording, RecordingOptions, RecordingState};
use crate::utils::error::{AppError, AppResult};
use crate::views::settings::SettingsChange;

/// Start recording with the current options
pub async fn start_recording(state: &AppState) -> AppResult<()> {
    let options = *state.options.read();
    state.controller.start(options).await?;
    Ok(())
}

/// Stop recording and add the result to the recordings list
pub async fn stop_recording(state: &AppState) -> AppResult<Recording> {
    let recording = state.controller.stop().await?;
    state.recordings.lock().insert(recording.clone());
    Ok(recording)
}

/// Toggle pause
pub fn pause_recording(state: &AppState) -> AppResult<RecordingState> {
    Ok(state.controller.pause()?)
}

/// Resume recording
pub fn resume_recording(state: &AppState) -> AppResult<RecordingState> {
    Ok(state.controller.resume()?)
}

/// Get current recording state
pub fn get_recording_state(state: &AppState) -> RecordingState {
    state.controller.state()
}

/// Get current recording duration in seconds
pub fn get_recording_duration(state: &AppState) -> f64 {
    state.controller.elapsed_secs()
}

pub fn get_options(state: &AppState) -> RecordingOptions {
    *state.options.read()
}

/// Choose the source for the next recording
pub fn select_source(state: &AppState, source: VideoSource) -> AppResult<RecordingOptions> {
    let current = state.controller.state();
    if current != RecordingState::Idle {
        return Err(AppError::InvalidInput(format!(
            "Cannot change the source while {:?}",
            current
        )));
    }

    let mut options = state.options.write();
    options.video_source = source;
    tracing::debug!("Selected {} source", source);
    Ok(*options)
}

/// Apply a settings panel edit to the options for the next recording
pub fn update_settings(state: &AppState, change: SettingsChange) -> RecordingOptions {
    let mut options = state.options.write();
    *options = change.apply(*options);
    tracing::debug!("Updated options: {:?}", *options);
    *options
}

/// Show or hide the settings panel, returning the new visibility
pub fn toggle_settings(state: &AppState) -> bool {
    state.settings.lock().toggle()
}

pub fn dismiss_error(state: &AppState) {
    state.controller.clear_error();
}

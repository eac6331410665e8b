//! Recording state management
//!
//! Defines the lifecycle state machine, the options snapshot taken at start
//! time and the finalized recording artifact.

use crate::capture::traits::{Resolution, VideoSource};
use crate::recordings::blob::BlobUrl;
use serde::{Deserialize, Serialize};

/// Current state of the recording lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingState {
    /// No recording in progress
    Idle,
    /// Waiting for the environment to hand out a stream
    Starting,
    /// Currently recording
    Active,
    /// Recording is paused
    Paused,
    /// Waiting for the encoder to flush
    Stopping,
    /// Acquisition failed; reverts to Idle once the error is recorded
    Error,
}

impl RecordingState {
    /// A live session exists and accepts pause/stop
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Active | Self::Paused)
    }

    /// An async transition is in flight
    pub fn is_transitioning(&self) -> bool {
        matches!(self, Self::Starting | Self::Stopping)
    }
}

impl Default for RecordingState {
    fn default() -> Self {
        Self::Idle
    }
}

/// How a recording's duration is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DurationMode {
    /// Start to stop, paused intervals included
    WallClock,
    /// Start to stop minus paused intervals
    Active,
}

impl Default for DurationMode {
    fn default() -> Self {
        Self::WallClock
    }
}

/// Options snapshot passed to `start`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordingOptions {
    /// Camera or display
    pub video_source: VideoSource,

    /// Whether to capture audio alongside video
    pub audio_enabled: bool,

    /// Requested capture resolution
    pub resolution: Resolution,
}

impl Default for RecordingOptions {
    fn default() -> Self {
        Self {
            video_source: VideoSource::Webcam,
            audio_enabled: true,
            resolution: Resolution::HD,
        }
    }
}

/// A finalized recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recording {
    /// Unique recording ID
    pub id: String,

    /// Handle to the encoded media blob
    pub url: BlobUrl,

    /// Unix timestamp (ms) when the recording started
    pub timestamp: i64,

    /// Duration in seconds
    pub duration: f64,

    /// Source the recording was captured from
    #[serde(rename = "type")]
    pub kind: VideoSource,

    /// Container mime type of the blob
    pub mime_type: String,

    /// Blob size in bytes
    pub size: u64,
}

impl Recording {
    /// File extension derived from the mime type
    pub fn extension(&self) -> &str {
        extension_for_mime(&self.mime_type)
    }

    /// Filename suggested when downloading
    pub fn suggested_filename(&self) -> String {
        format!("recording-{}.{}", self.timestamp, self.extension())
    }
}

/// Map a container mime type to a file extension
pub fn extension_for_mime(mime_type: &str) -> &str {
    let essence = mime_type.split(';').next().unwrap_or_default().trim();
    match essence {
        "video/mp4" => "mp4",
        "video/x-matroska" => "mkv",
        "video/quicktime" => "mov",
        _ => "webm",
    }
}

/// Read-only view of the live session for the preview
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewSnapshot {
    pub source: VideoSource,
    pub stream_id: String,
    pub video_label: String,
    pub audio_label: Option<String>,
    pub resolution: Resolution,
    pub paused: bool,
    pub elapsed_secs: f64,
    pub fragment_count: usize,
    pub byte_count: u64,
}

//! Recording errors
//!
//! Every variant renders as the single human-readable message shown to the
//! user.

use crate::capture::traits::{AcquireError, EncoderError, VideoSource};
use thiserror::Error;

/// Fallback message when acquisition fails without a description
pub const UNKNOWN_ACQUISITION_MESSAGE: &str = "An error occurred while starting the recording.";

/// Errors surfaced by the recording lifecycle
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordingError {
    #[error("No webcam found. Please connect a webcam and try again.")]
    NoWebcam,

    #[error(
        "Unable to access {}. Please make sure it's properly connected and not in use by another application.",
        device_noun(.0)
    )]
    DeviceUnavailable(VideoSource),

    /// Carries the source that was refused; the message is the same for both
    #[error("Permission to use camera/microphone was denied. Please allow access and try again.")]
    PermissionDenied(VideoSource),

    #[error("{}", unknown_message(.0))]
    UnknownAcquisition(Option<String>),

    #[error("A recording is already in progress")]
    AlreadyRecording,

    #[error("No recording in progress")]
    NotRecording,

    #[error("Encoder error: {0}")]
    Encoder(String),
}

fn device_noun(source: &VideoSource) -> &'static str {
    match source {
        VideoSource::Webcam => "the camera",
        VideoSource::Screen => "the display",
    }
}

fn unknown_message(message: &Option<String>) -> &str {
    message.as_deref().unwrap_or(UNKNOWN_ACQUISITION_MESSAGE)
}

impl RecordingError {
    /// Map an environment failure for `source` into the taxonomy
    pub fn from_acquire(source: VideoSource, error: AcquireError) -> Self {
        match error {
            AcquireError::PermissionDenied => RecordingError::PermissionDenied(source),
            AcquireError::NotFound | AcquireError::NotReadable => {
                RecordingError::DeviceUnavailable(source)
            }
            AcquireError::Other(message) => {
                RecordingError::UnknownAcquisition(message.filter(|m| !m.trim().is_empty()))
            }
        }
    }

    /// Whether this error came from acquiring a stream
    pub fn is_acquisition_failure(&self) -> bool {
        matches!(
            self,
            RecordingError::NoWebcam
                | RecordingError::DeviceUnavailable(_)
                | RecordingError::PermissionDenied(_)
                | RecordingError::UnknownAcquisition(_)
        )
    }
}

impl From<EncoderError> for RecordingError {
    fn from(error: EncoderError) -> Self {
        RecordingError::Encoder(error.to_string())
    }
}

pub type RecordingResult<T> = Result<T, RecordingError>;

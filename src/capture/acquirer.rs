//! Stream acquisition
//!
//! One acquisition call against the environment, with the webcam presence
//! pre-check and the mapping of environment failures into `RecordingError`.

use super::traits::{CaptureConstraints, DeviceKind, MediaEnvironment, MediaStream, VideoSource};
use crate::recorder::error::RecordingError;
use std::sync::Arc;

/// Requests live streams from a [`MediaEnvironment`]
#[derive(Clone)]
pub struct CaptureAcquirer {
    environment: Arc<dyn MediaEnvironment>,
}

impl CaptureAcquirer {
    pub fn new(environment: Arc<dyn MediaEnvironment>) -> Self {
        Self { environment }
    }

    /// Whether the environment reports at least one video input
    pub async fn has_webcam(&self) -> Result<bool, RecordingError> {
        let devices = self
            .environment
            .enumerate_devices()
            .await
            .map_err(|e| RecordingError::from_acquire(VideoSource::Webcam, e))?;

        Ok(devices.iter().any(|d| d.kind == DeviceKind::VideoInput))
    }

    /// Acquire a stream for `source`
    ///
    /// The webcam path fails with `NoWebcam` before acquisition is attempted
    /// when no video input is enumerated.
    pub async fn acquire(
        &self,
        source: VideoSource,
        constraints: CaptureConstraints,
    ) -> Result<MediaStream, RecordingError> {
        if source == VideoSource::Webcam && !self.has_webcam().await? {
            tracing::warn!("No video input device enumerated");
            return Err(RecordingError::NoWebcam);
        }

        tracing::debug!(
            "Requesting {} stream at {} (audio: {})",
            source,
            constraints.resolution,
            constraints.audio
        );

        self.environment
            .acquire_stream(source, &constraints)
            .await
            .map_err(|e| RecordingError::from_acquire(source, e))
    }
}

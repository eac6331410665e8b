//! System-related commands
//!
//! Device listing and basic information about the host.

use super::AppState;
use crate::capture::traits::{DeviceInfo, VideoSource};
use crate::recorder::error::RecordingError;
use crate::utils::error::AppResult;
use serde::{Deserialize, Serialize};

/// System information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    pub os: String,
    pub arch: String,
    pub version: String,
}

/// Get basic system information
pub fn get_system_info() -> SystemInfo {
    SystemInfo {
        os: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

/// List the capture devices the environment reports
pub async fn get_devices(state: &AppState) -> AppResult<Vec<DeviceInfo>> {
    let devices = state
        .environment
        .enumerate_devices()
        .await
        .map_err(|e| RecordingError::from_acquire(VideoSource::Webcam, e))?;

    tracing::debug!("Enumerated {} devices", devices.len());
    Ok(devices)
}

//! Capture trait definitions
//!
//! Environment-agnostic types and traits for stream acquisition and encoding.
//! A `MediaEnvironment` is whatever hosts the capture devices and the encoder;
//! the recorder only ever talks to it through these types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

/// Where captured video originates from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoSource {
    /// A camera device
    Webcam,
    /// The display, chosen through the environment's own picker
    Screen,
}

impl VideoSource {
    /// Human-readable label used by the views
    pub fn label(&self) -> &'static str {
        match self {
            VideoSource::Webcam => "Webcam",
            VideoSource::Screen => "Screen",
        }
    }
}

impl Default for VideoSource {
    fn default() -> Self {
        Self::Webcam
    }
}

impl fmt::Display for VideoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoSource::Webcam => f.write_str("webcam"),
            VideoSource::Screen => f.write_str("screen"),
        }
    }
}

impl FromStr for VideoSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "webcam" | "camera" => Ok(VideoSource::Webcam),
            "screen" | "display" => Ok(VideoSource::Screen),
            other => Err(format!("Unknown video source '{}' (expected webcam or screen)", other)),
        }
    }
}

/// Video resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

/// Largest accepted capture dimensions
pub const MAX_WIDTH: u32 = 7680;
pub const MAX_HEIGHT: u32 = 4320;

impl Resolution {
    pub const HD: Resolution = Resolution { width: 1280, height: 720 };
    pub const FULL_HD: Resolution = Resolution { width: 1920, height: 1080 };
    pub const QHD: Resolution = Resolution { width: 2560, height: 1440 };

    /// Create a resolution, rejecting zero or oversized dimensions
    pub fn new(width: u32, height: u32) -> Result<Self, ResolutionError> {
        if width == 0 || height == 0 || width > MAX_WIDTH || height > MAX_HEIGHT {
            return Err(ResolutionError::OutOfRange(width, height));
        }
        Ok(Self { width, height })
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::HD
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Resolution parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("Invalid resolution format: '{0}' (expected WIDTHxHEIGHT)")]
    InvalidFormat(String),

    #[error("Resolution {0}x{1} out of range (dimensions must be between 1x1 and 7680x4320)")]
    OutOfRange(u32, u32),
}

impl FromStr for Resolution {
    type Err = ResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ResolutionError::InvalidFormat(s.to_string());
        let (width, height) = s.trim().split_once('x').ok_or_else(invalid)?;
        let width: u32 = width.parse().map_err(|_| invalid())?;
        let height: u32 = height.parse().map_err(|_| invalid())?;
        Resolution::new(width, height)
    }
}

/// Kind of capture device reported by enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    VideoInput,
    AudioInput,
    AudioOutput,
}

/// Information about a capture device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    /// Unique device ID
    pub id: String,

    /// Device kind
    pub kind: DeviceKind,

    /// Device name
    pub label: String,
}

/// Constraints passed along with an acquisition request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureConstraints {
    pub resolution: Resolution,
    pub audio: bool,
}

/// Kind of media carried by a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Video,
    Audio,
}

/// One track of an acquired stream
///
/// Clones share the same live flag, so stopping any clone stops the track.
#[derive(Debug, Clone)]
pub struct MediaTrack {
    pub id: String,
    pub kind: TrackKind,
    pub label: String,
    live: Arc<AtomicBool>,
}

impl MediaTrack {
    pub fn new(id: impl Into<String>, kind: TrackKind, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            label: label.into(),
            live: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    /// Stop the track. Returns false if it was already stopped.
    pub fn stop(&self) -> bool {
        self.live.swap(false, Ordering::SeqCst)
    }
}

/// A live stream handed out by the environment
#[derive(Debug, Clone)]
pub struct MediaStream {
    pub id: String,
    pub resolution: Resolution,
    tracks: Vec<MediaTrack>,
}

impl MediaStream {
    pub fn new(id: impl Into<String>, resolution: Resolution, tracks: Vec<MediaTrack>) -> Self {
        Self {
            id: id.into(),
            resolution,
            tracks,
        }
    }

    pub fn tracks(&self) -> &[MediaTrack] {
        &self.tracks
    }

    pub fn video_tracks(&self) -> impl Iterator<Item = &MediaTrack> {
        self.tracks.iter().filter(|t| t.kind == TrackKind::Video)
    }

    pub fn audio_tracks(&self) -> impl Iterator<Item = &MediaTrack> {
        self.tracks.iter().filter(|t| t.kind == TrackKind::Audio)
    }

    /// Whether any track is still live
    pub fn is_active(&self) -> bool {
        self.tracks.iter().any(MediaTrack::is_live)
    }

    /// Stop every track, freeing the underlying devices. Idempotent.
    pub fn release(&self) {
        let stopped = self.tracks.iter().filter(|t| t.stop()).count();
        if stopped > 0 {
            tracing::debug!("Released stream {} ({} tracks stopped)", self.id, stopped);
        }
    }
}

/// Failure conditions reported by the environment on acquisition
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AcquireError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("requested device not found")]
    NotFound,

    #[error("device could not be read")]
    NotReadable,

    #[error("acquisition failed: {}", other_message(.0))]
    Other(Option<String>),
}

fn other_message(message: &Option<String>) -> &str {
    message.as_deref().unwrap_or("unknown error")
}

/// Encoder failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncoderError {
    #[error("failed to start encoder: {0}")]
    Start(String),

    #[error("failed to finalize encoder: {0}")]
    Finalize(String),

    #[error("encoder is {0}")]
    InvalidState(&'static str),
}

/// A discrete chunk of encoded media
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// Emission order, starting at 0
    pub sequence: u64,
    pub data: Vec<u8>,
}

impl Fragment {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

pub type FragmentSender = mpsc::UnboundedSender<Fragment>;
pub type FragmentReceiver = mpsc::UnboundedReceiver<Fragment>;

/// An encoder bound to one stream
///
/// The encoder is the only producer of fragments. Once `finalize` returns,
/// the final fragment has been sent and the fragment channel is closed.
#[async_trait]
pub trait MediaEncoder: Send {
    /// Container mime type of the produced fragments
    fn mime_type(&self) -> &str;

    /// Suspend fragment production without tearing down the encoder
    fn pause(&mut self) -> Result<(), EncoderError>;

    /// Resume fragment production
    fn resume(&mut self) -> Result<(), EncoderError>;

    /// Flush the final fragment and close the fragment stream
    async fn finalize(&mut self) -> Result<(), EncoderError>;
}

/// The host environment's capture and encoding capability
#[async_trait]
pub trait MediaEnvironment: Send + Sync {
    /// List the capture devices currently known to the environment
    async fn enumerate_devices(&self) -> Result<Vec<DeviceInfo>, AcquireError>;

    /// Acquire a live stream. May suspend on a permission prompt.
    async fn acquire_stream(
        &self,
        source: VideoSource,
        constraints: &CaptureConstraints,
    ) -> Result<MediaStream, AcquireError>;

    /// Start encoding `stream`, delivering fragments to `fragments`
    fn encode_stream(
        &self,
        stream: &MediaStream,
        fragments: FragmentSender,
    ) -> Result<Box<dyn MediaEncoder>, EncoderError>;
}

//! Capture sources
//!
//! The environment seam (`traits`), the acquisition step built on it
//! (`acquirer`) and the synthetic test-pattern environment.

pub mod acquirer;
pub mod synthetic;
pub mod traits;

pub use acquirer::CaptureAcquirer;
pub use synthetic::{SyntheticConfig, SyntheticEnvironment};
pub use traits::{
    AcquireError, CaptureConstraints, DeviceInfo, DeviceKind, EncoderError, Fragment,
    MediaEncoder, MediaEnvironment, MediaStream, MediaTrack, Resolution, TrackKind, VideoSource,
};

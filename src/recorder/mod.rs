//! Recording system module
//!
//! This module implements the recording lifecycle:
//! - RecordingController to orchestrate acquisition, pause/resume and stop
//! - LiveSession owning the stream, encoder and fragment sequence
//! - Recording, the finalized artifact handed to the recordings list

pub mod controller;
pub mod error;
pub mod session;
pub mod state;

pub use controller::{RecordingController, RecordingEvent};
pub use error::{RecordingError, RecordingResult};
pub use session::{FinishedSession, LiveSession};
pub use state::{DurationMode, PreviewSnapshot, Recording, RecordingOptions, RecordingState};

//! Recording lifecycle controller
//!
//! Orchestrates stream acquisition and the live session, owns the lifecycle
//! state and produces a finalized `Recording` on stop.
//!
//! State transitions are taken under a short lock before any suspension, so
//! a re-entrant call sees the in-flight state and is rejected instead of
//! racing. No lock is held across an `.await`.

use super::error::{RecordingError, RecordingResult};
use super::session::LiveSession;
use super::state::{DurationMode, PreviewSnapshot, Recording, RecordingOptions, RecordingState};
use crate::capture::acquirer::CaptureAcquirer;
use crate::capture::traits::{CaptureConstraints, MediaEnvironment, VideoSource};
use crate::recordings::blob::BlobStore;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use uuid::Uuid;

/// Events emitted during recording
#[derive(Debug, Clone, PartialEq)]
pub enum RecordingEvent {
    /// Recording started
    Started(VideoSource),
    /// Recording paused
    Paused,
    /// Recording resumed
    Resumed,
    /// Recording stopped, carrying the new recording's id
    Stopped(String),
    /// Error occurred
    Error(String),
}

/// Manages the single live recording session
pub struct RecordingController {
    /// Environment used for encoding
    environment: Arc<dyn MediaEnvironment>,

    /// Stream acquisition on top of the environment
    acquirer: CaptureAcquirer,

    /// Destination for finalized media
    blobs: Arc<BlobStore>,

    /// Current lifecycle state
    state: Arc<RwLock<RecordingState>>,

    /// The live session, if any
    session: Mutex<Option<LiveSession>>,

    /// Message of the last failure, cleared on a successful start or stop
    error: RwLock<Option<String>>,

    /// How durations are measured
    duration_mode: DurationMode,

    /// Event broadcaster
    event_tx: broadcast::Sender<RecordingEvent>,
}

impl RecordingController {
    /// Create a new controller over `environment`
    pub fn new(environment: Arc<dyn MediaEnvironment>, blobs: Arc<BlobStore>) -> Self {
        let (event_tx, _) = broadcast::channel(100);
        Self {
            acquirer: CaptureAcquirer::new(environment.clone()),
            environment,
            blobs,
            state: Arc::new(RwLock::new(RecordingState::Idle)),
            session: Mutex::new(None),
            error: RwLock::new(None),
            duration_mode: DurationMode::default(),
            event_tx,
        }
    }

    /// Choose how recording durations are measured
    pub fn with_duration_mode(mut self, mode: DurationMode) -> Self {
        self.duration_mode = mode;
        self
    }

    /// Get the current recording state
    pub fn state(&self) -> RecordingState {
        *self.state.read()
    }

    /// Message of the last failure, if not yet cleared
    pub fn error(&self) -> Option<String> {
        self.error.read().clone()
    }

    /// Dismiss the current error message
    pub fn clear_error(&self) {
        *self.error.write() = None;
    }

    pub fn duration_mode(&self) -> DurationMode {
        self.duration_mode
    }

    pub fn blobs(&self) -> &Arc<BlobStore> {
        &self.blobs
    }

    /// Subscribe to recording events
    pub fn subscribe(&self) -> broadcast::Receiver<RecordingEvent> {
        self.event_tx.subscribe()
    }

    /// Live stream description for the preview, `None` when not recording
    ///
    /// Elapsed time follows the duration mode, so the preview agrees with
    /// the duration the recording will be saved with.
    pub fn preview(&self) -> Option<PreviewSnapshot> {
        let mut session = self.session.lock();
        let session = session.as_mut()?;
        let mut snapshot = session.snapshot();
        snapshot.elapsed_secs = self.measure(session).as_secs_f64();
        Some(snapshot)
    }

    /// Seconds since the live session started, per the duration mode
    pub fn elapsed_secs(&self) -> f64 {
        self.session
            .lock()
            .as_ref()
            .map(|s| self.measure(s).as_secs_f64())
            .unwrap_or(0.0)
    }

    fn measure(&self, session: &LiveSession) -> Duration {
        match self.duration_mode {
            DurationMode::WallClock => session.elapsed(),
            DurationMode::Active => session.active_elapsed(),
        }
    }

    fn set_state(&self, state: RecordingState) {
        *self.state.write() = state;
    }

    fn emit(&self, event: RecordingEvent) {
        // No subscribers is fine
        let _ = self.event_tx.send(event);
    }

    /// Store a failure, pass through `Error` and settle in `Idle`
    fn fail(&self, error: &RecordingError) {
        let message = error.to_string();
        tracing::error!("Recording failed: {}", message);

        *self.error.write() = Some(message.clone());
        self.set_state(RecordingState::Error);
        self.emit(RecordingEvent::Error(message));
        self.set_state(RecordingState::Idle);
    }

    /// Start recording with an options snapshot
    pub async fn start(&self, options: RecordingOptions) -> RecordingResult<()> {
        {
            let mut state = self.state.write();
            if *state != RecordingState::Idle {
                tracing::warn!("Ignoring start while {:?}", *state);
                return Err(RecordingError::AlreadyRecording);
            }
            *state = RecordingState::Starting;
        }

        tracing::info!(
            "Starting {} recording at {} (audio: {})",
            options.video_source,
            options.resolution,
            options.audio_enabled
        );

        match self.open_session(&options).await {
            Ok(session) => {
                *self.session.lock() = Some(session);
                self.clear_error();
                self.set_state(RecordingState::Active);
                self.emit(RecordingEvent::Started(options.video_source));
                tracing::info!("Recording started");
                Ok(())
            }
            Err(e) => {
                self.fail(&e);
                Err(e)
            }
        }
    }

    async fn open_session(&self, options: &RecordingOptions) -> RecordingResult<LiveSession> {
        let constraints = CaptureConstraints {
            resolution: options.resolution,
            audio: options.audio_enabled,
        };
        let stream = self.acquirer.acquire(options.video_source, constraints).await?;

        let (tx, rx) = mpsc::unbounded_channel();
        let encoder = match self.environment.encode_stream(&stream, tx) {
            Ok(encoder) => encoder,
            Err(e) => {
                stream.release();
                return Err(e.into());
            }
        };

        Ok(LiveSession::begin(options.video_source, stream, encoder, rx))
    }

    /// Toggle between `Active` and `Paused`, returning the new state
    pub fn pause(&self) -> RecordingResult<RecordingState> {
        let current = self.state();
        match current {
            RecordingState::Active => self.suspend(),
            RecordingState::Paused => self.resume(),
            _ => Err(RecordingError::NotRecording),
        }
    }

    fn suspend(&self) -> RecordingResult<RecordingState> {
        let mut state = self.state.write();
        if *state != RecordingState::Active {
            return Err(RecordingError::NotRecording);
        }

        let mut session = self.session.lock();
        let session = session.as_mut().ok_or(RecordingError::NotRecording)?;
        session.pause()?;

        *state = RecordingState::Paused;
        drop(state);

        tracing::info!("Pausing recording");
        self.emit(RecordingEvent::Paused);
        Ok(RecordingState::Paused)
    }

    /// Resume a paused recording; a no-op while already `Active`
    pub fn resume(&self) -> RecordingResult<RecordingState> {
        let mut state = self.state.write();
        match *state {
            RecordingState::Active => return Ok(RecordingState::Active),
            RecordingState::Paused => {}
            _ => return Err(RecordingError::NotRecording),
        }

        let mut session = self.session.lock();
        let session = session.as_mut().ok_or(RecordingError::NotRecording)?;
        session.resume()?;

        *state = RecordingState::Active;
        drop(state);

        tracing::info!("Resuming recording");
        self.emit(RecordingEvent::Resumed);
        Ok(RecordingState::Active)
    }

    /// Stop recording and finalize the media into a `Recording`
    pub async fn stop(&self) -> RecordingResult<Recording> {
        {
            let mut state = self.state.write();
            if !state.is_live() {
                return Err(RecordingError::NotRecording);
            }
            *state = RecordingState::Stopping;
        }

        tracing::info!("Stopping recording");

        let session = self.session.lock().take();
        let Some(session) = session else {
            self.set_state(RecordingState::Idle);
            return Err(RecordingError::NotRecording);
        };

        let finished = match session.finish().await {
            Ok(finished) => finished,
            Err(e) => {
                let error = RecordingError::from(e);
                tracing::error!("Failed to finalize recording: {}", error);
                *self.error.write() = Some(error.to_string());
                self.set_state(RecordingState::Idle);
                self.emit(RecordingEvent::Error(error.to_string()));
                return Err(error);
            }
        };

        let duration = match self.duration_mode {
            DurationMode::WallClock => finished.elapsed,
            DurationMode::Active => finished.active,
        };
        let size = finished.byte_count();
        let url = self.blobs.materialize(
            finished.fragments.iter().map(|f| &f.data),
            &finished.mime_type,
        );

        let recording = Recording {
            id: Uuid::new_v4().to_string(),
            url,
            timestamp: finished.started_unix_ms,
            duration: duration.as_secs_f64(),
            kind: finished.source,
            mime_type: finished.mime_type,
            size,
        };

        self.clear_error();
        self.set_state(RecordingState::Idle);
        self.emit(RecordingEvent::Stopped(recording.id.clone()));

        tracing::info!(
            "Recording stopped. Duration: {:.2}s, {} fragments, {} bytes",
            recording.duration,
            finished.fragments.len(),
            size
        );
        Ok(recording)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::synthetic::{SyntheticConfig, SyntheticEnvironment};
    use crate::capture::traits::{
        AcquireError, DeviceInfo, EncoderError, FragmentSender, MediaEncoder, MediaStream,
        Resolution,
    };
    use async_trait::async_trait;

    /// Synthetic environment that remembers the last stream it handed out
    /// and can break the encoder on start or on finalize
    #[derive(Default)]
    struct FaultyEnvironment {
        inner: SyntheticEnvironment,
        fail_start: bool,
        fail_finalize: bool,
        last_stream: Mutex<Option<MediaStream>>,
    }

    impl FaultyEnvironment {
        fn last_stream(&self) -> MediaStream {
            self.last_stream.lock().clone().expect("no stream acquired")
        }
    }

    #[async_trait]
    impl MediaEnvironment for FaultyEnvironment {
        async fn enumerate_devices(&self) -> Result<Vec<DeviceInfo>, AcquireError> {
            self.inner.enumerate_devices().await
        }

        async fn acquire_stream(
            &self,
            source: VideoSource,
            constraints: &CaptureConstraints,
        ) -> Result<MediaStream, AcquireError> {
            let stream = self.inner.acquire_stream(source, constraints).await?;
            *self.last_stream.lock() = Some(stream.clone());
            Ok(stream)
        }

        fn encode_stream(
            &self,
            stream: &MediaStream,
            fragments: FragmentSender,
        ) -> Result<Box<dyn MediaEncoder>, EncoderError> {
            if self.fail_start {
                return Err(EncoderError::Start("nope".to_string()));
            }
            let inner = self.inner.encode_stream(stream, fragments)?;
            if self.fail_finalize {
                Ok(Box::new(BrokenFinalize { inner }))
            } else {
                Ok(inner)
            }
        }
    }

    struct BrokenFinalize {
        inner: Box<dyn MediaEncoder>,
    }

    #[async_trait]
    impl MediaEncoder for BrokenFinalize {
        fn mime_type(&self) -> &str {
            self.inner.mime_type()
        }

        fn pause(&mut self) -> Result<(), EncoderError> {
            self.inner.pause()
        }

        fn resume(&mut self) -> Result<(), EncoderError> {
            self.inner.resume()
        }

        async fn finalize(&mut self) -> Result<(), EncoderError> {
            let _ = self.inner.finalize().await;
            Err(EncoderError::Finalize("boom".to_string()))
        }
    }

    fn controller(config: SyntheticConfig) -> (RecordingController, Arc<SyntheticEnvironment>) {
        let env = Arc::new(SyntheticEnvironment::new(config));
        let controller = RecordingController::new(env.clone(), Arc::new(BlobStore::new()));
        (controller, env)
    }

    fn webcam() -> RecordingOptions {
        RecordingOptions::default()
    }

    fn screen() -> RecordingOptions {
        RecordingOptions {
            video_source: VideoSource::Screen,
            audio_enabled: false,
            resolution: Resolution::FULL_HD,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_stop_produces_recording() {
        let (controller, _env) = controller(SyntheticConfig::default());
        let mut events = controller.subscribe();

        controller.start(webcam()).await.unwrap();
        assert_eq!(controller.state(), RecordingState::Active);

        tokio::time::sleep(Duration::from_millis(2000)).await;
        let recording = controller.stop().await.unwrap();

        assert_eq!(recording.kind, VideoSource::Webcam);
        assert!((recording.duration - 2.0).abs() < 0.05);
        assert!(recording.size > 0);
        assert_eq!(controller.state(), RecordingState::Idle);
        assert!(controller.blobs().contains(&recording.url));

        assert_eq!(events.recv().await.unwrap(), RecordingEvent::Started(VideoSource::Webcam));
        assert_eq!(events.recv().await.unwrap(), RecordingEvent::Stopped(recording.id.clone()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_toggles() {
        let (controller, _env) = controller(SyntheticConfig::default());
        assert_eq!(controller.pause(), Err(RecordingError::NotRecording));
        assert_eq!(controller.state(), RecordingState::Idle);

        controller.start(screen()).await.unwrap();
        assert_eq!(controller.pause().unwrap(), RecordingState::Paused);
        assert!(controller.preview().unwrap().paused);
        assert_eq!(controller.pause().unwrap(), RecordingState::Active);
        assert_eq!(controller.resume().unwrap(), RecordingState::Active);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wall_clock_duration_includes_pause() {
        let (controller, _env) = controller(SyntheticConfig::default());
        controller.start(screen()).await.unwrap();

        tokio::time::sleep(Duration::from_secs(1)).await;
        controller.pause().unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;
        controller.pause().unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;

        let recording = controller.stop().await.unwrap();
        assert!((recording.duration - 4.0).abs() < 0.05);
    }

    #[tokio::test(start_paused = true)]
    async fn test_active_duration_excludes_pause() {
        let env = Arc::new(SyntheticEnvironment::default());
        let controller = RecordingController::new(env, Arc::new(BlobStore::new()))
            .with_duration_mode(DurationMode::Active);
        controller.start(screen()).await.unwrap();

        tokio::time::sleep(Duration::from_secs(1)).await;
        controller.pause().unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;

        // Stopping while paused
        let recording = controller.stop().await.unwrap();
        assert!((recording.duration - 1.0).abs() < 0.05);
    }

    #[tokio::test]
    async fn test_start_while_active_is_rejected() {
        let (controller, env) = controller(SyntheticConfig::default());
        controller.start(webcam()).await.unwrap();
        let stream_id = controller.preview().unwrap().stream_id;

        let result = controller.start(screen()).await;

        assert_eq!(result, Err(RecordingError::AlreadyRecording));
        assert_eq!(controller.state(), RecordingState::Active);
        assert_eq!(controller.preview().unwrap().stream_id, stream_id);
        assert_eq!(env.acquire_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reentrant_start_is_rejected() {
        let config = SyntheticConfig {
            acquire_delay: Duration::from_millis(500),
            ..SyntheticConfig::default()
        };
        let (controller, env) = controller(config);

        let (first, second) = tokio::join!(controller.start(webcam()), controller.start(screen()));

        assert!(first.is_ok());
        assert_eq!(second, Err(RecordingError::AlreadyRecording));
        assert_eq!(env.acquire_calls(), 1);
        assert_eq!(controller.preview().unwrap().source, VideoSource::Webcam);
    }

    #[tokio::test]
    async fn test_permission_denied_returns_to_idle() {
        let (controller, _env) =
            controller(SyntheticConfig::default().with_failure(AcquireError::PermissionDenied));
        let mut events = controller.subscribe();

        let result = controller.start(screen()).await;

        assert_eq!(result, Err(RecordingError::PermissionDenied(VideoSource::Screen)));
        assert_eq!(controller.state(), RecordingState::Idle);
        assert!(controller.error().unwrap().contains("denied"));
        assert!(controller.preview().is_none());
        assert!(matches!(events.recv().await.unwrap(), RecordingEvent::Error(_)));
    }

    #[tokio::test]
    async fn test_error_cleared_by_next_start() {
        let (controller, _env) = controller(SyntheticConfig::default().without_webcam());

        assert_eq!(controller.start(webcam()).await, Err(RecordingError::NoWebcam));
        assert!(controller.error().is_some());

        controller.start(screen()).await.unwrap();
        assert!(controller.error().is_none());
    }

    #[tokio::test]
    async fn test_stop_without_session() {
        let (controller, _env) = controller(SyntheticConfig::default());
        assert_eq!(controller.stop().await, Err(RecordingError::NotRecording));
        assert_eq!(controller.state(), RecordingState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_elapsed_secs_tracks_session() {
        let (controller, _env) = controller(SyntheticConfig::default());
        assert_eq!(controller.elapsed_secs(), 0.0);

        controller.start(screen()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!((controller.elapsed_secs() - 1.5).abs() < 0.05);
    }

    #[tokio::test]
    async fn test_encoder_start_failure_releases_stream() {
        let env = Arc::new(FaultyEnvironment {
            fail_start: true,
            ..FaultyEnvironment::default()
        });
        let blobs = Arc::new(BlobStore::new());
        let controller = RecordingController::new(env.clone(), blobs.clone());

        let result = controller.start(screen()).await;

        assert!(matches!(result, Err(RecordingError::Encoder(_))));
        assert_eq!(controller.state(), RecordingState::Idle);
        assert!(controller.error().unwrap().contains("nope"));
        assert!(controller.preview().is_none());
        assert!(!env.last_stream().is_active());
        assert!(blobs.is_empty());
    }

    #[tokio::test]
    async fn test_finalize_failure_releases_stream() {
        let env = Arc::new(FaultyEnvironment {
            fail_finalize: true,
            ..FaultyEnvironment::default()
        });
        let blobs = Arc::new(BlobStore::new());
        let controller = RecordingController::new(env.clone(), blobs.clone());
        let mut events = controller.subscribe();

        controller.start(webcam()).await.unwrap();
        let stream = env.last_stream();
        assert!(stream.is_active());

        let result = controller.stop().await;

        assert!(matches!(result, Err(RecordingError::Encoder(_))));
        assert_eq!(controller.state(), RecordingState::Idle);
        assert!(controller.error().unwrap().contains("boom"));
        assert!(!stream.is_active());
        assert!(blobs.is_empty());

        assert_eq!(events.recv().await.unwrap(), RecordingEvent::Started(VideoSource::Webcam));
        assert!(matches!(events.recv().await.unwrap(), RecordingEvent::Error(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_preview_elapsed_follows_duration_mode() {
        let env = Arc::new(SyntheticEnvironment::default());
        let controller = RecordingController::new(env, Arc::new(BlobStore::new()))
            .with_duration_mode(DurationMode::Active);
        controller.start(screen()).await.unwrap();

        tokio::time::sleep(Duration::from_secs(1)).await;
        controller.pause().unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;

        let preview = controller.preview().unwrap();
        assert!((preview.elapsed_secs - 1.0).abs() < 0.05);
        assert!((controller.elapsed_secs() - preview.elapsed_secs).abs() < 0.05);

        let recording = controller.stop().await.unwrap();
        assert!((recording.duration - preview.elapsed_secs).abs() < 0.05);
    }
}

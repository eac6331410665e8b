//! End-to-end recording scenarios through the public API

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use video_recorder_lib::capture::traits::FragmentSender;
use video_recorder_lib::capture::{
    AcquireError, CaptureConstraints, DeviceInfo, EncoderError, MediaEncoder, MediaEnvironment,
    MediaStream, Resolution, SyntheticConfig, SyntheticEnvironment, VideoSource,
};
use video_recorder_lib::recorder::{
    DurationMode, RecordingController, RecordingError, RecordingOptions, RecordingState,
};
use video_recorder_lib::recordings::{BlobStore, RecordingsCollection};

struct Harness {
    env: Arc<SyntheticEnvironment>,
    blobs: Arc<BlobStore>,
    controller: RecordingController,
}

fn harness(config: SyntheticConfig) -> Harness {
    let env = Arc::new(SyntheticEnvironment::new(config));
    let blobs = Arc::new(BlobStore::new());
    let controller = RecordingController::new(env.clone(), blobs.clone());
    Harness {
        env,
        blobs,
        controller,
    }
}

/// Synthetic environment that keeps a handle on every stream it hands out
#[derive(Default)]
struct RecordingEnvironment {
    inner: SyntheticEnvironment,
    streams: Mutex<Vec<MediaStream>>,
}

#[async_trait]
impl MediaEnvironment for RecordingEnvironment {
    async fn enumerate_devices(&self) -> Result<Vec<DeviceInfo>, AcquireError> {
        self.inner.enumerate_devices().await
    }

    async fn acquire_stream(
        &self,
        source: VideoSource,
        constraints: &CaptureConstraints,
    ) -> Result<MediaStream, AcquireError> {
        let stream = self.inner.acquire_stream(source, constraints).await?;
        self.streams.lock().push(stream.clone());
        Ok(stream)
    }

    fn encode_stream(
        &self,
        stream: &MediaStream,
        fragments: FragmentSender,
    ) -> Result<Box<dyn MediaEncoder>, EncoderError> {
        self.inner.encode_stream(stream, fragments)
    }
}

fn webcam_options() -> RecordingOptions {
    RecordingOptions {
        video_source: VideoSource::Webcam,
        audio_enabled: true,
        resolution: Resolution::HD,
    }
}

fn screen_options() -> RecordingOptions {
    RecordingOptions {
        video_source: VideoSource::Screen,
        audio_enabled: false,
        resolution: Resolution::FULL_HD,
    }
}

#[tokio::test(start_paused = true)]
async fn test_two_second_webcam_recording() {
    let h = harness(SyntheticConfig::default());

    h.controller.start(webcam_options()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(2000)).await;
    let recording = h.controller.stop().await.unwrap();

    assert_eq!(recording.kind, VideoSource::Webcam);
    assert!((recording.duration - 2.0).abs() < 0.05, "duration {}", recording.duration);
    assert_eq!(recording.mime_type, "video/webm");

    let blob = h.blobs.get(&recording.url).unwrap();
    assert_eq!(blob.size(), recording.size);
    assert_eq!(&blob.bytes()[..4], &[0x1A, 0x45, 0xDF, 0xA3]);
}

#[tokio::test]
async fn test_screen_permission_denied() {
    let h = harness(SyntheticConfig::default().with_failure(AcquireError::PermissionDenied));

    let result = h.controller.start(screen_options()).await;

    assert_eq!(result, Err(RecordingError::PermissionDenied(VideoSource::Screen)));
    assert_eq!(
        h.controller.error().as_deref(),
        Some("Permission to use camera/microphone was denied. Please allow access and try again.")
    );
    assert_eq!(h.controller.state(), RecordingState::Idle);
    assert_eq!(h.controller.stop().await, Err(RecordingError::NotRecording));
    assert!(h.blobs.is_empty());
}

#[tokio::test]
async fn test_no_webcam_never_acquires() {
    let h = harness(SyntheticConfig::default().without_webcam());

    let result = h.controller.start(webcam_options()).await;

    assert_eq!(result, Err(RecordingError::NoWebcam));
    assert_eq!(h.env.enumerate_calls(), 1);
    assert_eq!(h.env.acquire_calls(), 0);
    assert_eq!(h.controller.state(), RecordingState::Idle);

    // Screen capture does not depend on a camera
    h.controller.start(screen_options()).await.unwrap();
    assert_eq!(h.env.enumerate_calls(), 1);
}

#[tokio::test]
async fn test_unreadable_device() {
    let h = harness(SyntheticConfig::default().with_failure(AcquireError::NotReadable));

    let err = h.controller.start(webcam_options()).await.unwrap_err();
    assert!(err.to_string().starts_with("Unable to access the camera."));
}

#[tokio::test]
async fn test_pause_toggle_and_idle_rejection() {
    let h = harness(SyntheticConfig::default());

    assert_eq!(h.controller.pause(), Err(RecordingError::NotRecording));
    assert_eq!(h.controller.state(), RecordingState::Idle);

    h.controller.start(webcam_options()).await.unwrap();
    assert_eq!(h.controller.pause(), Ok(RecordingState::Paused));
    assert_eq!(h.controller.state(), RecordingState::Paused);
    assert_eq!(h.controller.pause(), Ok(RecordingState::Active));
    assert_eq!(h.controller.state(), RecordingState::Active);
}

#[tokio::test]
async fn test_start_while_active_keeps_session() {
    let h = harness(SyntheticConfig::default());
    h.controller.start(webcam_options()).await.unwrap();
    let before = h.controller.preview().unwrap();

    assert_eq!(
        h.controller.start(screen_options()).await,
        Err(RecordingError::AlreadyRecording)
    );

    let after = h.controller.preview().unwrap();
    assert_eq!(after.stream_id, before.stream_id);
    assert_eq!(after.source, VideoSource::Webcam);
    assert!(h.controller.error().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_start_is_rejected() {
    let h = harness(SyntheticConfig {
        acquire_delay: Duration::from_millis(300),
        ..SyntheticConfig::default()
    });

    let (a, b) = tokio::join!(
        h.controller.start(screen_options()),
        h.controller.start(screen_options())
    );

    assert!(a.is_ok());
    assert_eq!(b, Err(RecordingError::AlreadyRecording));
    assert_eq!(h.env.acquire_calls(), 1);
    assert_eq!(h.controller.state(), RecordingState::Active);
}

#[tokio::test]
async fn test_tracks_released_after_stop() {
    let env = Arc::new(RecordingEnvironment::default());
    let controller = RecordingController::new(env.clone(), Arc::new(BlobStore::new()));

    controller.start(webcam_options()).await.unwrap();
    let stream = env.streams.lock()[0].clone();
    assert!(stream.is_active());
    assert_eq!(stream.audio_tracks().count(), 1);
    assert_eq!(controller.preview().unwrap().stream_id, stream.id);

    controller.pause().unwrap();
    assert!(stream.is_active());

    controller.stop().await.unwrap();
    assert!(!stream.is_active());
    assert!(stream.tracks().iter().all(|t| !t.is_live()));
    assert!(controller.preview().is_none());

    controller.start(screen_options()).await.unwrap();
    let next = env.streams.lock()[1].clone();
    assert_ne!(next.id, stream.id);
    assert!(next.is_active());
    controller.stop().await.unwrap();
    assert!(!next.is_active());
}

#[tokio::test(start_paused = true)]
async fn test_fragments_assembled_in_order() {
    let h = harness(SyntheticConfig {
        fragment_interval: Duration::from_millis(100),
        fragment_size: 16,
        ..SyntheticConfig::default()
    });

    h.controller.start(screen_options()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(1050)).await;
    let recording = h.controller.stop().await.unwrap();

    let blob = h.blobs.get(&recording.url).unwrap();
    assert!(blob.size() > 10 * 16);
    assert_eq!(&blob.bytes()[..4], &[0x1A, 0x45, 0xDF, 0xA3]);
}

#[tokio::test(start_paused = true)]
async fn test_active_duration_mode() {
    let env = Arc::new(SyntheticEnvironment::default());
    let controller = RecordingController::new(env, Arc::new(BlobStore::new()))
        .with_duration_mode(DurationMode::Active);

    controller.start(screen_options()).await.unwrap();
    tokio::time::sleep(Duration::from_secs(2)).await;
    controller.pause().unwrap();
    tokio::time::sleep(Duration::from_secs(5)).await;
    controller.resume().unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;

    let recording = controller.stop().await.unwrap();
    assert!((recording.duration - 3.0).abs() < 0.05, "duration {}", recording.duration);
}

#[tokio::test]
async fn test_delete_first_of_two() {
    let h = harness(SyntheticConfig::default());
    let mut collection = RecordingsCollection::new(h.blobs.clone());

    h.controller.start(webcam_options()).await.unwrap();
    let first = h.controller.stop().await.unwrap();
    collection.insert(first.clone());

    h.controller.start(screen_options()).await.unwrap();
    let second = h.controller.stop().await.unwrap();
    collection.insert(second.clone());

    assert_eq!(collection.as_slice()[0].id, second.id);

    collection.delete(&second.id);
    assert_eq!(collection.as_slice(), [first.clone()]);
    assert!(!h.blobs.contains(&second.url));
    assert!(h.blobs.contains(&first.url));
    assert_eq!(h.blobs.revoked_count(), 1);

    collection.delete("no-such-id");
    assert_eq!(collection.len(), 1);
    assert_eq!(h.blobs.revoked_count(), 1);
}

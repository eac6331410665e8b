//! Synthetic test-pattern environment
//!
//! Stands in for a real camera/display stack. Streams are made of virtual
//! tracks and the encoder emits a WebM-signature header followed by
//! pattern fragments on a rolling interval, from a spawned tokio task.

use super::traits::{
    AcquireError, CaptureConstraints, DeviceInfo, DeviceKind, EncoderError, Fragment,
    FragmentSender, MediaEncoder, MediaEnvironment, MediaStream, MediaTrack, TrackKind,
    VideoSource,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// EBML magic that opens every WebM/Matroska file
const WEBM_SIGNATURE: [u8; 4] = [0x1A, 0x45, 0xDF, 0xA3];

const MIME_TYPE: &str = "video/webm";

/// Behavior of the synthetic environment
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    /// Devices reported by enumeration
    pub devices: Vec<DeviceInfo>,

    /// Interval between payload fragments
    pub fragment_interval: Duration,

    /// Payload bytes per fragment
    pub fragment_size: usize,

    /// Simulated time spent in the permission prompt
    pub acquire_delay: Duration,

    /// When set, every acquisition fails with this error
    pub acquire_failure: Option<AcquireError>,
}

impl SyntheticConfig {
    /// A camera and a microphone
    pub fn default_devices() -> Vec<DeviceInfo> {
        vec![
            DeviceInfo {
                id: "synthetic-camera-0".to_string(),
                kind: DeviceKind::VideoInput,
                label: "Test Pattern Camera".to_string(),
            },
            DeviceInfo {
                id: "synthetic-mic-0".to_string(),
                kind: DeviceKind::AudioInput,
                label: "Test Tone Microphone".to_string(),
            },
        ]
    }

    /// Drop every video input from the device list
    pub fn without_webcam(mut self) -> Self {
        self.devices.retain(|d| d.kind != DeviceKind::VideoInput);
        self
    }

    pub fn with_failure(mut self, failure: AcquireError) -> Self {
        self.acquire_failure = Some(failure);
        self
    }
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            devices: Self::default_devices(),
            fragment_interval: Duration::from_millis(1000),
            fragment_size: 4096,
            acquire_delay: Duration::ZERO,
            acquire_failure: None,
        }
    }
}

/// Test-pattern implementation of [`MediaEnvironment`]
pub struct SyntheticEnvironment {
    config: SyntheticConfig,
    enumerate_calls: AtomicUsize,
    acquire_calls: AtomicUsize,
    next_stream: AtomicU64,
}

impl SyntheticEnvironment {
    pub fn new(config: SyntheticConfig) -> Self {
        Self {
            config,
            enumerate_calls: AtomicUsize::new(0),
            acquire_calls: AtomicUsize::new(0),
            next_stream: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &SyntheticConfig {
        &self.config
    }

    /// Number of times devices were enumerated
    pub fn enumerate_calls(&self) -> usize {
        self.enumerate_calls.load(Ordering::SeqCst)
    }

    /// Number of times a stream was requested
    pub fn acquire_calls(&self) -> usize {
        self.acquire_calls.load(Ordering::SeqCst)
    }

    fn video_label(&self, source: VideoSource) -> String {
        match source {
            VideoSource::Webcam => self
                .config
                .devices
                .iter()
                .find(|d| d.kind == DeviceKind::VideoInput)
                .map(|d| d.label.clone())
                .unwrap_or_else(|| "Test Pattern Camera".to_string()),
            VideoSource::Screen => "screen:0:0".to_string(),
        }
    }

    fn audio_label(&self, source: VideoSource) -> String {
        match source {
            VideoSource::Webcam => self
                .config
                .devices
                .iter()
                .find(|d| d.kind == DeviceKind::AudioInput)
                .map(|d| d.label.clone())
                .unwrap_or_else(|| "Test Tone Microphone".to_string()),
            VideoSource::Screen => "System Audio".to_string(),
        }
    }
}

impl Default for SyntheticEnvironment {
    fn default() -> Self {
        Self::new(SyntheticConfig::default())
    }
}

#[async_trait]
impl MediaEnvironment for SyntheticEnvironment {
    async fn enumerate_devices(&self) -> Result<Vec<DeviceInfo>, AcquireError> {
        self.enumerate_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.config.devices.clone())
    }

    async fn acquire_stream(
        &self,
        source: VideoSource,
        constraints: &CaptureConstraints,
    ) -> Result<MediaStream, AcquireError> {
        self.acquire_calls.fetch_add(1, Ordering::SeqCst);

        if !self.config.acquire_delay.is_zero() {
            tokio::time::sleep(self.config.acquire_delay).await;
        }

        if let Some(failure) = &self.config.acquire_failure {
            tracing::debug!("Synthetic acquisition of {} failing with {:?}", source, failure);
            return Err(failure.clone());
        }

        if source == VideoSource::Webcam
            && !self.config.devices.iter().any(|d| d.kind == DeviceKind::VideoInput)
        {
            return Err(AcquireError::NotFound);
        }

        let n = self.next_stream.fetch_add(1, Ordering::SeqCst);
        let mut tracks = vec![MediaTrack::new(
            format!("video-{n}"),
            TrackKind::Video,
            self.video_label(source),
        )];
        if constraints.audio {
            tracks.push(MediaTrack::new(
                format!("audio-{n}"),
                TrackKind::Audio,
                self.audio_label(source),
            ));
        }

        tracing::info!(
            "Synthetic {} stream {} acquired at {} (audio: {})",
            source,
            n,
            constraints.resolution,
            constraints.audio
        );

        Ok(MediaStream::new(format!("stream-{n}"), constraints.resolution, tracks))
    }

    fn encode_stream(
        &self,
        stream: &MediaStream,
        fragments: FragmentSender,
    ) -> Result<Box<dyn MediaEncoder>, EncoderError> {
        if !stream.is_active() {
            return Err(EncoderError::Start(format!("stream {} has no live tracks", stream.id)));
        }

        let header = header_fragment(stream);
        Ok(Box::new(SyntheticEncoder::spawn(
            header,
            self.config.fragment_interval,
            self.config.fragment_size,
            fragments,
        )))
    }
}

/// Encoder that emits pattern fragments from a background task
struct SyntheticEncoder {
    paused: Arc<AtomicBool>,
    stop_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<u64>>,
}

impl SyntheticEncoder {
    fn spawn(
        header: Vec<u8>,
        interval: Duration,
        fragment_size: usize,
        tx: FragmentSender,
    ) -> Self {
        let paused = Arc::new(AtomicBool::new(false));
        let (stop_tx, stop_rx) = oneshot::channel();
        let handle = tokio::spawn(run_encoder(
            header,
            interval,
            fragment_size,
            tx,
            paused.clone(),
            stop_rx,
        ));

        Self {
            paused,
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        }
    }
}

#[async_trait]
impl MediaEncoder for SyntheticEncoder {
    fn mime_type(&self) -> &str {
        MIME_TYPE
    }

    fn pause(&mut self) -> Result<(), EncoderError> {
        if self.stop_tx.is_none() {
            return Err(EncoderError::InvalidState("already finalized"));
        }
        self.paused.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn resume(&mut self) -> Result<(), EncoderError> {
        if self.stop_tx.is_none() {
            return Err(EncoderError::InvalidState("already finalized"));
        }
        self.paused.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn finalize(&mut self) -> Result<(), EncoderError> {
        let stop_tx = self
            .stop_tx
            .take()
            .ok_or(EncoderError::InvalidState("already finalized"))?;
        // The task may already be gone if the receiver was dropped
        let _ = stop_tx.send(());

        if let Some(handle) = self.handle.take() {
            let emitted = handle
                .await
                .map_err(|e| EncoderError::Finalize(e.to_string()))?;
            tracing::debug!("Synthetic encoder finalized after {} fragments", emitted);
        }
        Ok(())
    }
}

impl Drop for SyntheticEncoder {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

async fn run_encoder(
    header: Vec<u8>,
    interval: Duration,
    fragment_size: usize,
    tx: FragmentSender,
    paused: Arc<AtomicBool>,
    mut stop_rx: oneshot::Receiver<()>,
) -> u64 {
    let mut sequence = 0u64;
    if tx.send(Fragment { sequence, data: header }).is_err() {
        return 0;
    }
    sequence += 1;

    let mut ticker = tokio::time::interval(interval);
    // First tick completes immediately
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = &mut stop_rx => break,
            _ = ticker.tick() => {
                if paused.load(Ordering::SeqCst) {
                    continue;
                }
                let data = pattern_payload(sequence, fragment_size);
                if tx.send(Fragment { sequence, data }).is_err() {
                    return sequence;
                }
                sequence += 1;
            }
        }
    }

    // Final flush, always emitted on finalize
    let data = pattern_payload(sequence, fragment_size / 2);
    if tx.send(Fragment { sequence, data }).is_ok() {
        sequence += 1;
    }
    sequence
}

fn header_fragment(stream: &MediaStream) -> Vec<u8> {
    let mut data = WEBM_SIGNATURE.to_vec();
    data.extend_from_slice(
        format!(
            "synthetic {} tracks={}",
            stream.resolution,
            stream.tracks().len()
        )
        .as_bytes(),
    );
    data
}

fn pattern_payload(sequence: u64, size: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(size.max(8));
    data.extend_from_slice(&sequence.to_be_bytes());
    data.extend((8..size).map(|i| (sequence as usize).wrapping_add(i) as u8));
    data
}

//! Live recording session
//!
//! Owns the acquired stream, its encoder and the fragment sequence while a
//! recording is in progress. The encoder is the only producer of fragments
//! and the session is the only consumer and the only writer of `fragments`.

use super::state::PreviewSnapshot;
use crate::capture::traits::{
    EncoderError, Fragment, FragmentReceiver, MediaEncoder, MediaStream, VideoSource,
};
use chrono::Utc;
use std::time::Duration;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::time::Instant;

/// Output of a finished session
#[derive(Debug)]
pub struct FinishedSession {
    pub source: VideoSource,
    pub started_unix_ms: i64,
    /// Start to stop, paused time included
    pub elapsed: Duration,
    /// Start to stop, paused time excluded
    pub active: Duration,
    pub mime_type: String,
    /// Fragments in emission order
    pub fragments: Vec<Fragment>,
}

impl FinishedSession {
    pub fn byte_count(&self) -> u64 {
        self.fragments.iter().map(|f| f.len() as u64).sum()
    }
}

/// An active recording session
pub struct LiveSession {
    source: VideoSource,
    stream: MediaStream,
    encoder: Box<dyn MediaEncoder>,
    receiver: FragmentReceiver,
    fragments: Vec<Fragment>,
    byte_count: u64,
    started_at: Instant,
    started_unix_ms: i64,
    paused_total: Duration,
    paused_since: Option<Instant>,
}

impl LiveSession {
    /// Wrap an acquired stream and its running encoder
    pub fn begin(
        source: VideoSource,
        stream: MediaStream,
        encoder: Box<dyn MediaEncoder>,
        receiver: FragmentReceiver,
    ) -> Self {
        Self {
            source,
            stream,
            encoder,
            receiver,
            fragments: Vec::new(),
            byte_count: 0,
            started_at: Instant::now(),
            started_unix_ms: Utc::now().timestamp_millis(),
            paused_total: Duration::ZERO,
            paused_since: None,
        }
    }

    pub fn source(&self) -> VideoSource {
        self.source
    }

    pub fn stream(&self) -> &MediaStream {
        &self.stream
    }

    pub fn started_unix_ms(&self) -> i64 {
        self.started_unix_ms
    }

    pub fn is_paused(&self) -> bool {
        self.paused_since.is_some()
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    pub fn byte_count(&self) -> u64 {
        self.byte_count
    }

    /// Wall-clock time since start
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Time since start minus paused intervals
    pub fn active_elapsed(&self) -> Duration {
        let paused_now = self
            .paused_since
            .map(|since| since.elapsed())
            .unwrap_or_default();
        self.elapsed()
            .saturating_sub(self.paused_total)
            .saturating_sub(paused_now)
    }

    /// Suspend fragment capture; the stream and encoder stay alive
    pub fn pause(&mut self) -> Result<(), EncoderError> {
        if self.paused_since.is_some() {
            return Ok(());
        }
        self.encoder.pause()?;
        self.paused_since = Some(Instant::now());
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), EncoderError> {
        let Some(since) = self.paused_since else {
            return Ok(());
        };
        self.encoder.resume()?;
        self.paused_total += since.elapsed();
        self.paused_since = None;
        Ok(())
    }

    /// Append every fragment delivered so far. Returns how many were added.
    pub fn collect_pending(&mut self) -> usize {
        let mut added = 0;
        loop {
            match self.receiver.try_recv() {
                Ok(fragment) => {
                    self.push(fragment);
                    added += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        added
    }

    fn push(&mut self, fragment: Fragment) {
        self.byte_count += fragment.len() as u64;
        self.fragments.push(fragment);
    }

    /// Read-only description for the preview
    pub fn snapshot(&mut self) -> PreviewSnapshot {
        self.collect_pending();
        PreviewSnapshot {
            source: self.source,
            stream_id: self.stream.id.clone(),
            video_label: self
                .stream
                .video_tracks()
                .next()
                .map(|t| t.label.clone())
                .unwrap_or_default(),
            audio_label: self.stream.audio_tracks().next().map(|t| t.label.clone()),
            resolution: self.stream.resolution,
            paused: self.is_paused(),
            elapsed_secs: self.elapsed().as_secs_f64(),
            fragment_count: self.fragments.len(),
            byte_count: self.byte_count,
        }
    }

    /// Finalize the encoder, drain every fragment and release the stream
    ///
    /// The stream is released whether or not finalization succeeds.
    pub async fn finish(mut self) -> Result<FinishedSession, EncoderError> {
        if let Some(since) = self.paused_since.take() {
            self.paused_total += since.elapsed();
        }

        let finalized = self.encoder.finalize().await;
        let elapsed = self.elapsed();
        self.stream.release();
        finalized?;

        while let Some(fragment) = self.receiver.recv().await {
            self.push(fragment);
        }

        tracing::debug!(
            "Session on {} finished: {} fragments, {} bytes",
            self.stream.id,
            self.fragments.len(),
            self.byte_count
        );

        Ok(FinishedSession {
            source: self.source,
            started_unix_ms: self.started_unix_ms,
            elapsed,
            active: elapsed.saturating_sub(self.paused_total),
            mime_type: self.encoder.mime_type().to_string(),
            fragments: std::mem::take(&mut self.fragments),
        })
    }
}

impl Drop for LiveSession {
    fn drop(&mut self) {
        self.stream.release();
    }
}

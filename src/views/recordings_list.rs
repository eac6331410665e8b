//! Recordings list
//!
//! Lists finalized recordings newest first, with the date, duration, kind
//! and the actions available on each item.

use crate::capture::traits::VideoSource;
use crate::recorder::state::Recording;
use chrono::{Local, TimeZone};
use std::fmt::{self, Write};

/// Shown when there is nothing to list
pub const EMPTY_MESSAGE: &str = "No recordings yet. Start recording to see them here!";

/// Format seconds as `m:ss`
pub fn format_duration(seconds: f64) -> String {
    let seconds = if seconds.is_finite() && seconds > 0.0 { seconds } else { 0.0 };
    let minutes = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    format!("{}:{:02}", minutes, secs)
}

/// Format an epoch-millis timestamp like `Oct 19, 06:21 PM` in local time
pub fn format_timestamp(timestamp_ms: i64) -> String {
    format_timestamp_in(timestamp_ms, &Local)
}

pub fn format_timestamp_in<Tz>(timestamp_ms: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    match tz.timestamp_millis_opt(timestamp_ms).single() {
        Some(at) => at.format("%b %-d, %I:%M %p").to_string(),
        None => "Invalid Date".to_string(),
    }
}

pub fn kind_label(kind: VideoSource) -> &'static str {
    match kind {
        VideoSource::Webcam => "Webcam Recording",
        VideoSource::Screen => "Screen Recording",
    }
}

/// One row of the list
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingItem {
    pub id: String,
    pub date: String,
    pub duration: String,
    pub label: &'static str,
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordingsListView {
    pub items: Vec<RecordingItem>,
}

impl RecordingsListView {
    pub fn build<'a>(recordings: impl IntoIterator<Item = &'a Recording>) -> Self {
        Self::build_with(recordings, format_timestamp)
    }

    /// Build with a custom date formatter
    pub fn build_with<'a>(
        recordings: impl IntoIterator<Item = &'a Recording>,
        format_date: impl Fn(i64) -> String,
    ) -> Self {
        let items = recordings
            .into_iter()
            .map(|r| RecordingItem {
                id: r.id.clone(),
                date: format_date(r.timestamp),
                duration: format_duration(r.duration),
                label: kind_label(r.kind),
                filename: r.suggested_filename(),
            })
            .collect();
        Self { items }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Render the heading and one numbered line per recording
    ///
    /// Items are addressed in shell commands by their 1-based position.
    pub fn render(&self) -> String {
        let mut out = String::from("Recordings\n");
        if self.items.is_empty() {
            out.push_str(EMPTY_MESSAGE);
            out.push('\n');
            return out;
        }

        for (index, item) in self.items.iter().enumerate() {
            let _ = writeln!(
                out,
                "{:>3}. {}  {}  {}  [play] [download] [delete]",
                index + 1,
                item.label,
                item.date,
                item.duration
            );
        }
        out
    }
}

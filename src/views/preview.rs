//! Live preview
//!
//! Shows the stream being recorded; renders nothing without a live session.

use super::recordings_list::format_duration;
use crate::recorder::state::PreviewSnapshot;

pub fn render(snapshot: Option<&PreviewSnapshot>) -> Option<String> {
    let snapshot = snapshot?;

    let badge = if snapshot.paused { "Paused" } else { "Recording" };
    let audio = snapshot.audio_label.as_deref().unwrap_or("no audio");

    Some(format!(
        "● {} {}\n  {} ({}), {}\n  {} fragments, {} bytes",
        badge,
        format_duration(snapshot.elapsed_secs),
        snapshot.video_label,
        snapshot.resolution,
        audio,
        snapshot.fragment_count,
        snapshot.byte_count,
    ))
}

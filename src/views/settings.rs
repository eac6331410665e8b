//! Settings panel
//!
//! Resolution and audio choices for the next recording. Changes only ever
//! produce a new `RecordingOptions`; a session in progress keeps the
//! snapshot it was started with.

use crate::capture::traits::Resolution;
use crate::recorder::state::RecordingOptions;
use std::fmt::Write;

/// Selectable resolutions, in display order
pub const RESOLUTION_PRESETS: [(&str, Resolution); 3] = [
    ("HD", Resolution::HD),
    ("Full HD", Resolution::FULL_HD),
    ("2K", Resolution::QHD),
];

/// A single edit made in the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsChange {
    Audio(bool),
    Resolution(Resolution),
}

impl SettingsChange {
    pub fn apply(self, options: RecordingOptions) -> RecordingOptions {
        match self {
            SettingsChange::Audio(audio_enabled) => RecordingOptions {
                audio_enabled,
                ..options
            },
            SettingsChange::Resolution(resolution) => RecordingOptions {
                resolution,
                ..options
            },
        }
    }
}

/// Option label as shown in the select, e.g. `Full HD (1920x1080)`
pub fn preset_label(name: &str, resolution: Resolution) -> String {
    format!("{} ({})", name, resolution)
}

/// Resolve a select choice: a 1-based preset index, a preset name or `WxH`
pub fn parse_resolution_choice(input: &str) -> Result<Resolution, String> {
    let choice = input.trim();

    if let Ok(index) = choice.parse::<usize>() {
        return index
            .checked_sub(1)
            .and_then(|i| RESOLUTION_PRESETS.get(i))
            .map(|(_, resolution)| *resolution)
            .ok_or_else(|| format!("No resolution preset #{}", index));
    }

    let normalized: String = choice
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect::<String>()
        .to_ascii_lowercase();
    if let Some((_, resolution)) = RESOLUTION_PRESETS
        .iter()
        .find(|(name, _)| name.replace(' ', "").to_ascii_lowercase() == normalized)
    {
        return Ok(*resolution);
    }

    let resolution: Resolution = choice.parse().map_err(|e| format!("{}", e))?;
    if RESOLUTION_PRESETS.iter().any(|(_, r)| *r == resolution) {
        Ok(resolution)
    } else {
        Err(format!(
            "{} is not one of the available resolutions ({})",
            resolution,
            RESOLUTION_PRESETS
                .iter()
                .map(|(_, r)| r.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ))
    }
}

/// Settings panel with its own visibility toggle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsPanel {
    visible: bool,
}

impl SettingsPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Flip visibility, returning the new value
    pub fn toggle(&mut self) -> bool {
        self.visible = !self.visible;
        self.visible
    }

    /// Render the panel, or nothing while hidden
    pub fn render(&self, options: &RecordingOptions) -> Option<String> {
        if !self.visible {
            return None;
        }

        let mut out = String::from("Settings\n");
        let check = if options.audio_enabled { "x" } else { " " };
        let _ = writeln!(out, "  [{}] Record audio (audio on|off)", check);
        let _ = writeln!(out, "  Resolution (resolution <n>):");

        let mut matched = false;
        for (index, (name, resolution)) in RESOLUTION_PRESETS.iter().enumerate() {
            let selected = *resolution == options.resolution;
            matched |= selected;
            let _ = writeln!(
                out,
                "    {} {}. {}",
                if selected { ">" } else { " " },
                index + 1,
                preset_label(name, *resolution)
            );
        }
        if !matched {
            let _ = writeln!(out, "    > Custom ({})", options.resolution);
        }

        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::traits::VideoSource;

    #[test]
    fn test_preset_labels() {
        let labels: Vec<String> = RESOLUTION_PRESETS
            .iter()
            .map(|(name, r)| preset_label(name, *r))
            .collect();
        assert_eq!(labels, ["HD (1280x720)", "Full HD (1920x1080)", "2K (2560x1440)"]);
    }

    #[test]
    fn test_parse_resolution_choice() {
        assert_eq!(parse_resolution_choice("1"), Ok(Resolution::HD));
        assert_eq!(parse_resolution_choice("full hd"), Ok(Resolution::FULL_HD));
        assert_eq!(parse_resolution_choice("2K"), Ok(Resolution::QHD));
        assert_eq!(parse_resolution_choice("1920x1080"), Ok(Resolution::FULL_HD));
        assert!(parse_resolution_choice("4").is_err());
        assert!(parse_resolution_choice("0").is_err());
        assert!(parse_resolution_choice("800x600").is_err());
        assert!(parse_resolution_choice("huge").is_err());
    }

    #[test]
    fn test_apply_keeps_other_fields() {
        let options = RecordingOptions {
            video_source: VideoSource::Screen,
            ..RecordingOptions::default()
        };
        let updated = SettingsChange::Audio(false).apply(options);
        assert_eq!(updated.video_source, VideoSource::Screen);
        assert!(!updated.audio_enabled);

        let updated = SettingsChange::Resolution(Resolution::QHD).apply(updated);
        assert_eq!(updated.resolution, Resolution::QHD);
        assert!(!updated.audio_enabled);
    }

    #[test]
    fn test_visibility_toggle() {
        let mut panel = SettingsPanel::new();
        let options = RecordingOptions::default();
        assert!(panel.render(&options).is_none());

        assert!(panel.toggle());
        let text = panel.render(&options).unwrap();
        assert!(text.contains("[x] Record audio"));
        assert!(text.contains("> 1. HD (1280x720)"));

        assert!(!panel.toggle());
        assert!(!panel.is_visible());
    }

    #[test]
    fn test_custom_resolution_is_shown() {
        let mut panel = SettingsPanel::new();
        panel.toggle();
        let options = RecordingOptions {
            resolution: Resolution { width: 640, height: 480 },
            ..RecordingOptions::default()
        };
        assert!(panel.render(&options).unwrap().contains("> Custom (640x480)"));
    }
}

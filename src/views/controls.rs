//! Recording controls
//!
//! Source selection plus the transport buttons for the current lifecycle
//! state.

use crate::capture::traits::VideoSource;
use crate::recorder::state::RecordingState;
use std::fmt::Write;

/// What a button does when pressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    SelectSource(VideoSource),
    Start,
    Pause,
    Resume,
    Stop,
}

impl ControlAction {
    /// Shell command that triggers the action
    pub fn command(&self) -> &'static str {
        match self {
            ControlAction::SelectSource(VideoSource::Webcam) => "source webcam",
            ControlAction::SelectSource(VideoSource::Screen) => "source screen",
            ControlAction::Start => "start",
            ControlAction::Pause => "pause",
            ControlAction::Resume => "resume",
            ControlAction::Stop => "stop",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlButton {
    pub action: ControlAction,
    pub label: &'static str,
    pub enabled: bool,
    pub selected: bool,
}

impl ControlButton {
    fn new(action: ControlAction, label: &'static str, enabled: bool) -> Self {
        Self {
            action,
            label,
            enabled,
            selected: false,
        }
    }
}

/// Buttons to show for a lifecycle state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlsView {
    pub sources: Vec<ControlButton>,
    pub transport: Vec<ControlButton>,
}

impl ControlsView {
    pub fn build(state: RecordingState, selected: VideoSource) -> Self {
        // Source changes are only allowed while no session exists
        let sources_enabled = matches!(state, RecordingState::Idle | RecordingState::Error);

        let sources = [(VideoSource::Webcam, "Webcam"), (VideoSource::Screen, "Screen")]
            .into_iter()
            .map(|(source, label)| ControlButton {
                selected: source == selected,
                ..ControlButton::new(ControlAction::SelectSource(source), label, sources_enabled)
            })
            .collect();

        let transport = match state {
            RecordingState::Active => vec![
                ControlButton::new(ControlAction::Pause, "Pause", true),
                ControlButton::new(ControlAction::Stop, "Stop", true),
            ],
            RecordingState::Paused => vec![
                ControlButton::new(ControlAction::Resume, "Resume", true),
                ControlButton::new(ControlAction::Stop, "Stop", true),
            ],
            RecordingState::Idle | RecordingState::Error => {
                vec![ControlButton::new(ControlAction::Start, "Start Recording", true)]
            }
            RecordingState::Starting => {
                vec![ControlButton::new(ControlAction::Start, "Starting...", false)]
            }
            RecordingState::Stopping => {
                vec![ControlButton::new(ControlAction::Start, "Saving...", false)]
            }
        };

        Self { sources, transport }
    }

    pub fn is_enabled(&self, action: ControlAction) -> bool {
        self.sources
            .iter()
            .chain(self.transport.iter())
            .any(|b| b.action == action && b.enabled)
    }

    /// One line per button group, disabled buttons in parentheses
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Source: {}", render_group(&self.sources));
        let _ = writeln!(out, "Controls: {}", render_group(&self.transport));
        out
    }
}

fn render_group(buttons: &[ControlButton]) -> String {
    buttons
        .iter()
        .map(|b| {
            let label = if b.selected {
                format!("*{}*", b.label)
            } else {
                b.label.to_string()
            };
            if b.enabled {
                format!("[{}] ({})", label, b.action.command())
            } else {
                format!("({})", label)
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}

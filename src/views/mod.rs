//! Views
//!
//! Pure view-model builders over borrowed state, plus plain-text renderers
//! used by the interactive shell. Views hold no state of their own beyond the
//! settings panel's visibility toggle.

pub mod controls;
pub mod preview;
pub mod recordings_list;
pub mod settings;

pub use controls::{ControlAction, ControlButton, ControlsView};
pub use recordings_list::RecordingsListView;
pub use settings::{SettingsChange, SettingsPanel};

/// Render the current error, if any, as a banner line
pub fn error_banner(error: Option<&str>) -> Option<String> {
    error.map(|message| format!("[!] {}", message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_banner() {
        assert_eq!(error_banner(None), None);
        assert_eq!(
            error_banner(Some("No webcam found.")).as_deref(),
            Some("[!] No webcam found.")
        );
    }
}

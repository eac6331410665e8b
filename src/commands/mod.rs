//! Command handlers
//!
//! This module contains the commands the shell invokes, plus the
//! application state they operate on.

pub mod recording;
pub mod recordings;
pub mod system;

use crate::capture::synthetic::SyntheticEnvironment;
use crate::capture::traits::MediaEnvironment;
use crate::config::AppConfig;
use crate::recorder::controller::RecordingController;
use crate::recorder::state::RecordingOptions;
use crate::recordings::blob::BlobStore;
use crate::recordings::collection::RecordingsCollection;
use crate::recordings::export::PlaybackFiles;
use crate::views::settings::SettingsPanel;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

/// Application state shared by every command
pub struct AppState {
    pub controller: Arc<RecordingController>,
    pub recordings: Mutex<RecordingsCollection>,
    pub environment: Arc<dyn MediaEnvironment>,
    /// Options the next `start` snapshots
    pub options: RwLock<RecordingOptions>,
    pub settings: Mutex<SettingsPanel>,
    /// Temporary copies opened for playback, removed with the state
    pub playback: PlaybackFiles,
    pub config: AppConfig,
}

impl AppState {
    /// State over the synthetic environment described by `config`
    pub fn new(config: AppConfig) -> Self {
        let environment = Arc::new(SyntheticEnvironment::new(config.to_synthetic_config()));
        Self::with_environment(config, environment)
    }

    pub fn with_environment(config: AppConfig, environment: Arc<dyn MediaEnvironment>) -> Self {
        let blobs = Arc::new(BlobStore::new());
        let controller = RecordingController::new(environment.clone(), blobs.clone())
            .with_duration_mode(config.duration_mode);

        Self {
            controller: Arc::new(controller),
            recordings: Mutex::new(RecordingsCollection::new(blobs)),
            environment,
            options: RwLock::new(config.default_options),
            settings: Mutex::new(SettingsPanel::new()),
            playback: PlaybackFiles::new(),
            config,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

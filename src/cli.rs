//! Command-line interface

use crate::capture::traits::{Resolution, VideoSource};
use crate::config::AppConfig;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "video-recorder",
    version,
    about = "Record webcam or screen clips with pause/resume and a session-local recordings list"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file (defaults to <config dir>/video-recorder/config.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Video source for new recordings (webcam or screen)
    #[arg(long, global = true)]
    pub source: Option<VideoSource>,

    /// Record video only
    #[arg(long, global = true)]
    pub no_audio: bool,

    /// Capture resolution like 1920x1080
    #[arg(long, global = true)]
    pub resolution: Option<Resolution>,

    /// Simulate a machine without a camera
    #[arg(long, global = true)]
    pub no_webcam: bool,

    /// Simulate the user refusing the capture prompt
    #[arg(long, global = true)]
    pub deny_permission: bool,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive recorder (the default)
    Shell,

    /// Record one clip and download it
    Record(RecordArgs),

    /// List capture devices
    Devices,

    /// Show the effective configuration
    Config(ConfigArgs),
}

#[derive(Args, Debug)]
pub struct RecordArgs {
    /// Seconds to record, paused time included
    #[arg(long, default_value_t = 3.0)]
    pub duration: f64,

    /// Pause this many seconds into the recording
    #[arg(long, requires = "pause_for")]
    pub pause_after: Option<f64>,

    /// How long to stay paused
    #[arg(long)]
    pub pause_for: Option<f64>,

    /// Directory to download the clip into (overrides config)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Write the effective configuration to the config file
    #[arg(long)]
    pub save: bool,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded config
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(source) = self.source {
            config.default_options.video_source = source;
        }
        if self.no_audio {
            config.default_options.audio_enabled = false;
        }
        if let Some(resolution) = self.resolution {
            config.default_options.resolution = resolution;
        }
        if self.no_webcam {
            config.environment.webcam_connected = false;
        }
        if self.deny_permission {
            config.environment.deny_permission = true;
        }
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_shell() {
        let cli = Cli::try_parse_from(["video-recorder"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_overrides_apply() {
        let cli = Cli::try_parse_from([
            "video-recorder",
            "record",
            "--source",
            "screen",
            "--resolution",
            "1920x1080",
            "--no-audio",
            "--no-webcam",
            "--duration",
            "2",
        ])
        .unwrap();

        let mut config = AppConfig::default();
        cli.apply(&mut config);

        assert_eq!(config.default_options.video_source, VideoSource::Screen);
        assert_eq!(config.default_options.resolution, Resolution::FULL_HD);
        assert!(!config.default_options.audio_enabled);
        assert!(!config.environment.webcam_connected);
        assert!(!config.environment.deny_permission);

        match cli.command {
            Some(Commands::Record(args)) => assert_eq!(args.duration, 2.0),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Cli::try_parse_from(["video-recorder", "--resolution", "0x720"]).is_err());
        assert!(Cli::try_parse_from(["video-recorder", "--source", "phone"]).is_err());
        assert!(Cli::try_parse_from(["video-recorder", "record", "--pause-after", "1"]).is_err());
    }
}

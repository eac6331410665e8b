//! Video Recorder - webcam and screen clips, made simple.
//!
//! This is the main library crate for the recorder. It provides the
//! application setup and all backend functionality: stream acquisition,
//! the recording lifecycle, the session-local recordings list and the
//! terminal views.

pub mod capture;
pub mod cli;
pub mod commands;
pub mod config;
pub mod recorder;
pub mod recordings;
pub mod shell;
pub mod utils;
pub mod views;

use anyhow::{Context, Result};
use cli::{Commands, ConfigArgs, RecordArgs};
use commands::{recording, recordings as recordings_cmd, system, AppState};
use config::AppConfig;
use recorder::controller::RecordingEvent;
use std::path::Path;
use std::time::Duration;
use tokio::io::BufReader;
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging to stderr
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "video_recorder=debug,video_recorder_lib=debug"
    } else {
        "video_recorder=info,video_recorder_lib=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Log lifecycle events until the controller goes away
fn spawn_event_logger(mut events: broadcast::Receiver<RecordingEvent>) {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(RecordingEvent::Started(source)) => {
                    tracing::debug!("Event: {} recording started", source)
                }
                Ok(RecordingEvent::Paused) => tracing::debug!("Event: paused"),
                Ok(RecordingEvent::Resumed) => tracing::debug!("Event: resumed"),
                Ok(RecordingEvent::Stopped(id)) => tracing::debug!("Event: stopped ({})", id),
                Ok(RecordingEvent::Error(message)) => tracing::debug!("Event: error ({})", message),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("Event logger skipped {} events", n)
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

/// Run the application
pub async fn run() -> Result<()> {
    let cli = cli::parse();
    init_tracing(cli.verbose);

    tracing::info!("Starting Video Recorder v{}", env!("CARGO_PKG_VERSION"));

    let mut config = AppConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    config.validate()?;

    match cli.command {
        None | Some(Commands::Shell) => run_shell(config).await,
        Some(Commands::Record(ref args)) => run_record(config, args).await,
        Some(Commands::Devices) => run_devices(config).await,
        Some(Commands::Config(ref args)) => run_config(&config, cli.config.as_deref(), args),
    }
}

async fn run_shell(config: AppConfig) -> Result<()> {
    let state = AppState::new(config);
    spawn_event_logger(state.controller.subscribe());

    let input = BufReader::new(tokio::io::stdin());
    shell::run(&state, input, tokio::io::stdout()).await
}

async fn run_record(config: AppConfig, args: &RecordArgs) -> Result<()> {
    let state = AppState::new(config);
    spawn_event_logger(state.controller.subscribe());

    let total = Duration::try_from_secs_f64(args.duration).context("Invalid --duration")?;
    let pause = match (args.pause_after, args.pause_for) {
        (Some(after), Some(length)) => Some((
            Duration::try_from_secs_f64(after).context("Invalid --pause-after")?,
            Duration::try_from_secs_f64(length).context("Invalid --pause-for")?,
        )),
        _ => None,
    };

    recording::start_recording(&state).await?;

    match pause {
        Some((after, length)) if after < total => {
            tokio::time::sleep(after).await;
            recording::pause_recording(&state)?;
            let paused = length.min(total - after);
            tokio::time::sleep(paused).await;
            recording::pause_recording(&state)?;
            tokio::time::sleep(total - after - paused).await;
        }
        _ => tokio::time::sleep(total).await,
    }

    let saved = recording::stop_recording(&state).await?;
    let path = recordings_cmd::download_recording(&state, &saved.id, args.output.as_deref())?;

    println!(
        "{} ({:.1}s, {} bytes) saved to {}",
        views::recordings_list::kind_label(saved.kind),
        saved.duration,
        saved.size,
        path.display()
    );
    Ok(())
}

async fn run_devices(config: AppConfig) -> Result<()> {
    let state = AppState::new(config);
    let info = system::get_system_info();
    println!("{} {} (v{})", info.os, info.arch, info.version);

    for device in system::get_devices(&state).await? {
        println!("{:?}\t{}\t{}", device.kind, device.label, device.id);
    }
    Ok(())
}

fn run_config(config: &AppConfig, explicit: Option<&Path>, args: &ConfigArgs) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);

    if args.save {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(AppConfig::default_path)
            .context("No config directory available; pass --config")?;
        config.save(&path)?;
        println!("Saved to {}", path.display());
    }
    Ok(())
}

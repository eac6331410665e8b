//! Interactive shell
//!
//! A line-oriented front end over the command layer. After every command the
//! screen is re-rendered: error banner, live preview, controls, the settings
//! panel when visible, and the recordings list.

use crate::capture::traits::{Resolution, VideoSource};
use crate::commands::{recording, recordings, system, AppState};
use crate::recorder::RecordingState;
use crate::utils::error::{AppError, ErrorResponse};
use crate::views::recordings_list::{format_duration, kind_label};
use crate::views::settings::{parse_resolution_choice, SettingsChange};
use crate::views::{self, preview, ControlsView, RecordingsListView};
use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

const HELP: &str = "\
Commands:
  start | pause | resume | stop
  source <webcam|screen>      choose what to record
  settings                    show/hide the settings panel
  audio <on|off>              toggle audio capture
  resolution <n|name|WxH>     pick a resolution preset
  list                        show recordings
  play <n>                    open recording #n
  download <n> [dir]          save recording #n
  delete <n>                  remove recording #n
  devices                     list capture devices
  dismiss                     clear the error banner
  help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Start,
    Pause,
    Resume,
    Stop,
    Source(VideoSource),
    Settings,
    Audio(bool),
    Resolution(Resolution),
    List,
    Play(usize),
    Download(usize, Option<PathBuf>),
    Delete(usize),
    Devices,
    Dismiss,
    Help,
    Quit,
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse(line: &str) -> Result<Option<ShellCommand>, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let rest: Vec<&str> = words.collect();

    let command = match (verb.to_ascii_lowercase().as_str(), rest.as_slice()) {
        ("start" | "record", []) => ShellCommand::Start,
        ("pause", []) => ShellCommand::Pause,
        ("resume", []) => ShellCommand::Resume,
        ("stop", []) => ShellCommand::Stop,
        ("source", [source]) => ShellCommand::Source(source.parse()?),
        ("settings", []) => ShellCommand::Settings,
        ("audio", [flag]) => ShellCommand::Audio(parse_flag(flag)?),
        ("resolution", choice) if !choice.is_empty() => {
            ShellCommand::Resolution(parse_resolution_choice(&choice.join(" "))?)
        }
        ("list" | "ls", []) => ShellCommand::List,
        ("play", [n]) => ShellCommand::Play(parse_index(n)?),
        ("download", [n]) => ShellCommand::Download(parse_index(n)?, None),
        ("download", [n, dir]) => {
            ShellCommand::Download(parse_index(n)?, Some(PathBuf::from(dir)))
        }
        ("delete" | "rm", [n]) => ShellCommand::Delete(parse_index(n)?),
        ("devices", []) => ShellCommand::Devices,
        ("dismiss", []) => ShellCommand::Dismiss,
        ("help" | "?", _) => ShellCommand::Help,
        ("quit" | "exit" | "q", []) => ShellCommand::Quit,
        (verb, _) => return Err(format!("Unknown command '{}'. Type 'help' for a list.", verb)),
    };
    Ok(Some(command))
}

fn parse_flag(flag: &str) -> Result<bool, String> {
    match flag.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        other => Err(format!("Expected on or off, got '{}'", other)),
    }
}

fn parse_index(n: &str) -> Result<usize, String> {
    match n.parse::<usize>() {
        Ok(index) if index > 0 => Ok(index),
        _ => Err(format!("'{}' is not a recording number", n)),
    }
}

/// Render the full screen for the current state
pub fn render_screen(state: &AppState) -> String {
    let mut sections = Vec::new();

    if let Some(banner) = views::error_banner(state.controller.error().as_deref()) {
        sections.push(banner);
    }
    if let Some(preview) = preview::render(state.controller.preview().as_ref()) {
        sections.push(preview);
    }

    let options = recording::get_options(state);
    sections.push(ControlsView::build(state.controller.state(), options.video_source).render());

    if let Some(settings) = state.settings.lock().render(&options) {
        sections.push(settings);
    }

    let list = recordings::list_recordings(state);
    sections.push(RecordingsListView::build(&list).render());

    sections.join("\n")
}

/// Run one command, returning the message to print
pub async fn execute(state: &AppState, command: ShellCommand) -> Result<String, AppError> {
    let message = match command {
        ShellCommand::Start => {
            recording::start_recording(state).await?;
            "Recording started".to_string()
        }
        ShellCommand::Pause => match recording::pause_recording(state)? {
            RecordingState::Paused => "Paused".to_string(),
            _ => "Resumed".to_string(),
        },
        ShellCommand::Resume => {
            recording::resume_recording(state)?;
            "Resumed".to_string()
        }
        ShellCommand::Stop => {
            let saved = recording::stop_recording(state).await?;
            format!(
                "Saved {} ({})",
                kind_label(saved.kind),
                format_duration(saved.duration)
            )
        }
        ShellCommand::Source(source) => {
            recording::select_source(state, source)?;
            format!("Source: {}", source.label())
        }
        ShellCommand::Settings => {
            if recording::toggle_settings(state) {
                "Settings shown".to_string()
            } else {
                "Settings hidden".to_string()
            }
        }
        ShellCommand::Audio(enabled) => {
            recording::update_settings(state, SettingsChange::Audio(enabled));
            format!("Audio {}", if enabled { "on" } else { "off" })
        }
        ShellCommand::Resolution(resolution) => {
            recording::update_settings(state, SettingsChange::Resolution(resolution));
            format!("Resolution {}", resolution)
        }
        ShellCommand::List | ShellCommand::Help => String::new(),
        ShellCommand::Play(n) => {
            let id = recording_id(state, n)?;
            let path = recordings::play_recording(state, &id)?;
            format!("Playing {}", path.display())
        }
        ShellCommand::Download(n, dir) => {
            let id = recording_id(state, n)?;
            let path = recordings::download_recording(state, &id, dir.as_deref())?;
            format!("Downloaded to {}", path.display())
        }
        ShellCommand::Delete(n) => {
            let id = recording_id(state, n)?;
            recordings::delete_recording(state, &id);
            format!("Deleted recording #{}", n)
        }
        ShellCommand::Devices => {
            let devices = system::get_devices(state).await?;
            if devices.is_empty() {
                "No capture devices".to_string()
            } else {
                devices
                    .iter()
                    .map(|d| format!("{:?}: {} ({})", d.kind, d.label, d.id))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        }
        ShellCommand::Dismiss => {
            recording::dismiss_error(state);
            String::new()
        }
        ShellCommand::Quit => String::new(),
    };
    Ok(message)
}

fn recording_id(state: &AppState, n: usize) -> Result<String, AppError> {
    n.checked_sub(1)
        .and_then(|i| recordings::list_recordings(state).into_iter().nth(i))
        .map(|r| r.id)
        .ok_or_else(|| AppError::RecordingNotFound(format!("#{}", n)))
}

/// Read commands from `input` until EOF or `quit`
pub async fn run<R, W>(state: &AppState, input: R, mut output: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let intro = format!("{}\nType 'help' for commands.\n> ", render_screen(state));
    write_out(&mut output, &intro).await?;

    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        let text = match parse(&line) {
            Ok(None) => String::new(),
            Ok(Some(ShellCommand::Quit)) => break,
            Ok(Some(ShellCommand::Help)) => HELP.to_string(),
            Ok(Some(command)) => match execute(state, command).await {
                Ok(message) => message,
                Err(e) => {
                    let response = ErrorResponse::from(e);
                    tracing::debug!("Command failed with {}", response.code);
                    format!("Error: {}", response.message)
                }
            },
            Err(message) => format!("Error: {}", message),
        };

        let mut screen = String::new();
        if !text.is_empty() {
            screen.push_str(&text);
            screen.push_str("\n\n");
        }
        screen.push_str(&render_screen(state));
        screen.push_str("\n> ");
        write_out(&mut output, &screen).await?;
    }

    // Do not leave devices running behind the user's back
    if state.controller.state().is_live() {
        tracing::info!("Input closed while recording, stopping");
        if let Err(e) = recording::stop_recording(state).await {
            tracing::warn!("Failed to stop recording on exit: {}", e);
        }
    }

    Ok(())
}

async fn write_out<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> Result<()> {
    output
        .write_all(text.as_bytes())
        .await
        .context("Failed to write output")?;
    output.flush().await.context("Failed to flush output")?;
    Ok(())
}

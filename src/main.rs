//! vozlive - device-side session controller for a streaming voice backend
//!
//! Connects to the voice websocket, drives the turn state machine from
//! server messages, reassembles streamed reply audio into playable
//! artifacts, and exposes a small stdin command loop standing in for the
//! device's buttons.

#![forbid(unsafe_code)]

pub mod asr_client;
pub mod chunks;
pub mod completion;
pub mod events;
pub mod pcm;
pub mod protocol;
pub mod session;

use anyhow::Result;
use asr_client::{AsrClient, AsrClientConfig};
use events::{Outbound, SessionEvent};
use pcm::{VolumeGate, DEFAULT_VOLUME_THRESHOLD, SAMPLE_RATE_HZ};
use session::Session;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// 100ms of mono samples per outbound frame.
const FRAME_SAMPLES: usize = SAMPLE_RATE_HZ as usize / 10;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AsrClientConfig {
        url: std::env::var("VOZLIVE_WS_URL")
            .unwrap_or_else(|_| AsrClientConfig::default().url),
        ..Default::default()
    };
    let threshold = std::env::var("VOZLIVE_VOLUME_THRESHOLD")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_VOLUME_THRESHOLD);
    let gate = VolumeGate::new(threshold);

    let mut client = AsrClient::connect(&config).await?;
    let sender = client.sender();

    let mut session = Session::new();
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    println!("commands: audio <path> | end | toggle | view | quit");

    loop {
        tokio::select! {
            inbound = client.next() => {
                let Some(inbound) = inbound else { break };
                let events = session.handle(inbound, Instant::now());
                let disconnected = events
                    .iter()
                    .any(|e| matches!(e, SessionEvent::Disconnected));
                render(&events);
                if disconnected {
                    break;
                }
            }
            _ = quiet_deadline(session.deadline()) => {
                let events = session.on_quiet_elapsed(Instant::now());
                render(&events);
            }
            line = stdin.next_line() => {
                let Ok(Some(line)) = line else { break };
                if !handle_command(line.trim(), &mut session, &sender, &gate).await? {
                    break;
                }
            }
        }
    }

    let events = session.close();
    render(&events);
    info!("vozlive stopped");
    Ok(())
}

/// Sleeps until the quiet-period deadline, or forever when none is pending.
async fn quiet_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => {
            tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await
        }
        None => std::future::pending().await,
    }
}

/// Returns false when the loop should exit.
async fn handle_command(
    line: &str,
    session: &mut Session,
    sender: &UnboundedSender<Outbound>,
    gate: &VolumeGate,
) -> Result<bool> {
    match line.split_once(' ').unwrap_or((line, "")) {
        ("audio", path) if !path.is_empty() => {
            if let Err(e) = stream_audio_file(path, sender, gate).await {
                error!("could not stream {}: {}", path, e);
            }
        }
        ("end", _) => {
            let events = session.end_of_speech();
            if !events.is_empty() {
                let _ = sender.send(Outbound::EndOfUtterance);
            }
            render(&events);
        }
        ("toggle", _) => {
            if let Some(view) = session.view() {
                let events = session.toggle_text(view.turn_id);
                if events.is_empty() {
                    println!("nothing to reveal yet");
                }
                render(&events);
            } else {
                println!("no turn");
            }
        }
        ("view", _) => match session.view() {
            Some(view) => {
                println!(
                    "turn {}: user={:?} audio={} bytes ({}) text={}",
                    view.turn_id,
                    view.user_text.as_deref().unwrap_or("…"),
                    view.artifact_size,
                    if view.is_complete { "complete" } else { "streaming" },
                    view.revealed_text.as_deref().unwrap_or("[hidden]"),
                );
            }
            None => println!("no turn"),
        },
        ("quit", _) | ("exit", _) => return Ok(false),
        ("", _) => {}
        (other, _) => warn!("unknown command: {}", other),
    }
    Ok(true)
}

/// Push a raw f32 LE mono 16 kHz capture file through the volume gate in
/// 100ms frames, simulating a microphone.
async fn stream_audio_file(
    path: &str,
    sender: &UnboundedSender<Outbound>,
    gate: &VolumeGate,
) -> Result<()> {
    let bytes = tokio::fs::read(path).await?;
    let samples: Vec<f32> = bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();
    let mut sent = 0usize;
    let mut dropped = 0usize;
    for frame in samples.chunks(FRAME_SAMPLES) {
        match gate.encode(frame) {
            Some(encoded) => {
                sender.send(Outbound::Audio(encoded))?;
                sent += 1;
            }
            None => dropped += 1,
        }
    }
    info!(
        "🎤 streamed {}: {} frames sent, {} silent frames dropped",
        path, sent, dropped
    );
    Ok(())
}

fn render(events: &[SessionEvent]) {
    for event in events {
        match event {
            SessionEvent::Connected { session_id } => {
                println!("connected, session {}", session_id);
            }
            SessionEvent::UserTurnStarted { turn_id } => {
                println!("[turn {}] listening done, transcribing…", turn_id);
            }
            SessionEvent::UserTextUpdated { turn_id, text } => {
                println!("[turn {}] you said: {}", turn_id, text);
            }
            SessionEvent::ReplyStarted { turn_id, intent } => match intent {
                Some(intent) => println!("[turn {}] reply starting (intent: {})", turn_id, intent),
                None => println!("[turn {}] reply starting", turn_id),
            },
            SessionEvent::ReplyTextBuffered { .. } => {}
            SessionEvent::ArtifactUpdated { turn_id, size, .. } => {
                println!("[turn {}] audio streaming: {} bytes", turn_id, size);
            }
            SessionEvent::AudioComplete {
                turn_id,
                size,
                has_text,
                ..
            } => {
                println!("[turn {}] 🔊 reply audio ready ({} bytes)", turn_id, size);
                if *has_text {
                    println!("[turn {}] type 'toggle' to show the reply text", turn_id);
                }
            }
            SessionEvent::TextVisibility {
                turn_id,
                visible,
                text,
            } => {
                if *visible {
                    println!(
                        "[turn {}] reply: {}",
                        turn_id,
                        text.as_deref().unwrap_or_default()
                    );
                } else {
                    println!("[turn {}] reply text hidden", turn_id);
                }
            }
            SessionEvent::ServerError { message } => {
                println!("server error: {}", message);
            }
            SessionEvent::Disconnected => {
                println!("disconnected");
            }
        }
    }
}

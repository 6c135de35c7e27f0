//! Storyplay - terminal narrator demo
//!
//! Plays a story catalog in the terminal: titles and lines are printed on
//! the engine's cadence, scene swaps and voice-over cues are logged, and a
//! progress readout tracks completion. Stands in for a full host
//! application (3D renderer, audio output, progress bar UI).

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storyplay_engine::config::StoryConfig;
use storyplay_engine::playback::NullAudioPlayer;
use storyplay_engine::{StoryEngine, StoryEvent};

/// Command-line arguments for storyplay
#[derive(Parser, Debug)]
#[command(name = "storyplay")]
#[command(about = "Terminal narrator for storyplay catalogs")]
#[command(version)]
struct Args {
    /// Story catalog file (TOML)
    #[arg(short, long, default_value = "data/story.toml", env = "STORYPLAY_CATALOG")]
    catalog: PathBuf,

    /// Start at this chapter instead of the beginning
    #[arg(short = 'j', long, env = "STORYPLAY_START_CHAPTER")]
    start_chapter: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storyplay_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let story = StoryConfig::load(&args.catalog)
        .with_context(|| format!("failed to load story catalog {}", args.catalog.display()))?;

    let engine = StoryEngine::new(story.catalog, story.timing, Arc::new(NullAudioPlayer))
        .context("failed to initialize story engine")?;

    let mut events = engine.subscribe();
    let renderer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if render(&event) {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "renderer lagged behind event stream");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    match args.start_chapter {
        Some(index) => engine.jump_to_chapter(index).await,
        None => engine.start().await,
    }

    tokio::select! {
        _ = renderer => {
            info!("story complete");
        }
        _ = shutdown_signal() => {
            info!("interrupted");
        }
    }

    engine.dispose().await;
    Ok(())
}

/// Print one event; returns true once the story has ended
fn render(event: &StoryEvent) -> bool {
    match event {
        StoryEvent::TitleShown { title, .. } => {
            println!();
            println!("=== {title} ===");
        }
        StoryEvent::LineShown { text, .. } => {
            if !text.is_empty() {
                println!("  {text}");
            }
        }
        StoryEvent::LineHidden { .. } => {}
        StoryEvent::ProgressChanged { percent, .. } => {
            // Carriage-return progress readout would fight the line output;
            // log at whole-percent boundaries instead.
            if percent.fract() == 0.0 {
                info!(percent, "progress");
            }
        }
        StoryEvent::SceneChanged { scene_id, .. } => {
            info!(%scene_id, "scene swap");
        }
        StoryEvent::VoiceOverStarted { chapter_index, .. } => {
            info!(chapter_index, "voice-over started");
        }
        StoryEvent::VoiceOverFailed { reason, .. } => {
            warn!(%reason, "voice-over failed, continuing without audio");
        }
        StoryEvent::StoryEnded { .. } => {
            println!();
            println!("The End. Thanks for watching!");
            return true;
        }
    }
    false
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

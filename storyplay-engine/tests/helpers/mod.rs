#![allow(dead_code)] // each test binary uses a different subset

//! Shared test infrastructure for engine integration tests
//!
//! Runs the engine on tokio's paused clock. `advance_ms` steps virtual time
//! in small increments with interleaved yields so chained timers (a fired
//! callback scheduling the next delay) land on their true deadlines.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use storyplay_engine::catalog::{Chapter, ChapterCatalog};
use storyplay_engine::playback::{AudioPlayer, StoryEngine};
use storyplay_engine::{StoryEvent, TimingParams};
use tokio::sync::broadcast;

/// Recording fake for the host's audio player
#[derive(Default)]
pub struct RecordingPlayer {
    plays: Mutex<Vec<String>>,
    stops: AtomicUsize,
    fail_with: Mutex<Option<String>>,
}

impl RecordingPlayer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing(reason: &str) -> Arc<Self> {
        let player = Self::default();
        *player.fail_with.lock().unwrap() = Some(reason.to_string());
        Arc::new(player)
    }

    pub fn plays(&self) -> Vec<String> {
        self.plays.lock().unwrap().clone()
    }

    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

impl AudioPlayer for RecordingPlayer {
    fn play(&self, voice_ref: &str) -> storyplay_engine::Result<()> {
        if let Some(reason) = self.fail_with.lock().unwrap().clone() {
            return Err(storyplay_engine::Error::Audio(reason));
        }
        self.plays.lock().unwrap().push(voice_ref.to_string());
        Ok(())
    }

    fn pause(&self) {}

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

/// Four equal-weight chapters (weight 25), each `lines=["a","b"]` with
/// 1000 ms durations, a voice-over `vo-<i>` and scene `scene-<i>`
pub fn four_chapter_catalog() -> ChapterCatalog {
    let chapters = (0..4)
        .map(|i| Chapter {
            title: format!("Chapter {i}"),
            lines: vec!["a".to_string(), "b".to_string()],
            line_durations_ms: vec![1000, 1000],
            voice_over: Some(format!("vo-{i}")),
            scene_id: format!("scene-{i}"),
        })
        .collect();
    ChapterCatalog::new(chapters).unwrap()
}

/// Engine over [`four_chapter_catalog`] with default timing
pub fn test_engine(player: Arc<dyn AudioPlayer>) -> StoryEngine {
    StoryEngine::new(four_chapter_catalog(), TimingParams::default(), player).unwrap()
}

/// Let freshly spawned tasks reach their first await
pub async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

/// Advance the paused clock by `total` milliseconds in 50 ms steps
pub async fn advance_ms(total: u64) {
    settle().await;
    let mut remaining = total;
    while remaining > 0 {
        let step = remaining.min(50);
        tokio::time::advance(Duration::from_millis(step)).await;
        remaining -= step;
        settle().await;
    }
}

/// Drain all currently queued events
pub fn drain(rx: &mut broadcast::Receiver<StoryEvent>) -> Vec<StoryEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Progress values among the drained events, in emission order
pub fn progress_values(events: &[StoryEvent]) -> Vec<f64> {
    events
        .iter()
        .filter_map(|e| match e {
            StoryEvent::ProgressChanged { percent, .. } => Some(*percent),
            _ => None,
        })
        .collect()
}

/// Scene ids among the drained events, in emission order
pub fn scene_ids(events: &[StoryEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            StoryEvent::SceneChanged { scene_id, .. } => Some(scene_id.clone()),
            _ => None,
        })
        .collect()
}

//! Playback state
//!
//! The engine exclusively owns one mutable [`PlaybackState`]; observers only
//! ever see [`PlaybackSnapshot`] copies.

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// Playback phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackPhase {
    /// Constructed, not yet started (or disposed)
    Idle,
    /// Chapter title card is displayed
    ShowingTitle,
    /// A narration line is visible
    ShowingLine,
    /// The current line has faded out (gap or blackout in effect)
    LineHidden,
    /// End screen reached
    Ended,
}

impl std::fmt::Display for PlaybackPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackPhase::Idle => write!(f, "idle"),
            PlaybackPhase::ShowingTitle => write!(f, "showing_title"),
            PlaybackPhase::ShowingLine => write!(f, "showing_line"),
            PlaybackPhase::LineHidden => write!(f, "line_hidden"),
            PlaybackPhase::Ended => write!(f, "ended"),
        }
    }
}

/// Engine-owned mutable playback state
///
/// Mutated only by the engine's transition functions, always under its state
/// lock. `chapter_index == total_chapters` with `phase == Ended` is the
/// synthetic end-screen position.
#[derive(Debug)]
pub struct PlaybackState {
    pub phase: PlaybackPhase,
    pub chapter_index: usize,
    pub line_index: usize,
    pub progress_percent: f64,

    /// When the currently showing line became visible (engine clock)
    pub line_shown_at: Option<Instant>,
}

impl PlaybackState {
    pub fn new() -> Self {
        Self {
            phase: PlaybackPhase::Idle,
            chapter_index: 0,
            line_index: 0,
            progress_percent: 0.0,
            line_shown_at: None,
        }
    }

    /// Immutable copy for external observers
    pub fn snapshot(&self, generation: u64) -> PlaybackSnapshot {
        PlaybackSnapshot {
            phase: self.phase,
            chapter_index: self.chapter_index,
            line_index: self.line_index,
            progress_percent: self.progress_percent,
            generation,
        }
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable view of the playback position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    pub phase: PlaybackPhase,
    pub chapter_index: usize,
    pub line_index: usize,
    pub progress_percent: f64,
    pub generation: u64,
}

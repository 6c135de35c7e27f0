//! Event types for the storyplay event system
//!
//! Every variant carries only plain, immutable values (strings, numbers,
//! enums) plus a UTC timestamp. Subscribers never receive references into
//! live engine state.

use serde::{Deserialize, Serialize};

/// Storyplay event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StoryEvent {
    /// A chapter title became visible
    TitleShown {
        chapter_index: usize,
        title: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A narration line became visible
    LineShown {
        chapter_index: usize,
        line_index: usize,
        text: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The current narration line faded out (the inter-line gap began)
    LineHidden {
        chapter_index: usize,
        line_index: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Progress percentage update (0.0 - 100.0)
    ProgressChanged {
        percent: f64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The displayed 3D scene should swap to a new model
    SceneChanged {
        scene_id: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Voice-over playback started for a chapter
    VoiceOverStarted {
        chapter_index: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Voice-over playback failed; narration continues without audio
    VoiceOverFailed {
        chapter_index: usize,
        reason: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The story reached its end screen
    StoryEnded {
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl StoryEvent {
    /// Event timestamp, regardless of variant
    pub fn timestamp(&self) -> chrono::DateTime<chrono::Utc> {
        match self {
            StoryEvent::TitleShown { timestamp, .. }
            | StoryEvent::LineShown { timestamp, .. }
            | StoryEvent::LineHidden { timestamp, .. }
            | StoryEvent::ProgressChanged { timestamp, .. }
            | StoryEvent::SceneChanged { timestamp, .. }
            | StoryEvent::VoiceOverStarted { timestamp, .. }
            | StoryEvent::VoiceOverFailed { timestamp, .. }
            | StoryEvent::StoryEnded { timestamp } => *timestamp,
        }
    }
}

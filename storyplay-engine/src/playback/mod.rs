//! Playback engine, scheduler, and voice-over cueing

pub mod engine;
pub mod scheduler;
pub mod state;
pub mod voiceover;

pub use engine::StoryEngine;
pub use scheduler::Scheduler;
pub use state::{PlaybackPhase, PlaybackSnapshot, PlaybackState};
pub use voiceover::{AudioPlayer, NullAudioPlayer};

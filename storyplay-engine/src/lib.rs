//! # Storyplay Engine
//!
//! Timed playback engine for multi-chapter narrated stories: reveals lines
//! on a per-line cadence, keeps a voice-over track and a 3D scene identifier
//! in lockstep with chapter transitions, reports progress as a 0-100
//! percentage, and supports direct seeking to any chapter.
//!
//! Rendering, audio decoding, and asset handling belong to the host; the
//! engine talks to them only through the [`AudioPlayer`] trait and its
//! event stream.
//!
//! [`AudioPlayer`]: playback::AudioPlayer

pub mod catalog;
pub mod config;
pub mod playback;
pub mod progress;

pub use catalog::{Chapter, ChapterCatalog};
pub use playback::{PlaybackPhase, PlaybackSnapshot, StoryEngine};
pub use storyplay_common::{Error, Result, StoryEvent, TimingParams};

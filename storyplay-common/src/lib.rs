//! # Storyplay Common Library
//!
//! Shared types for the storyplay workspace:
//! - Error taxonomy (`Error` enum)
//! - Event types (`StoryEvent` enum)
//! - Timing parameters (`TimingParams`)

pub mod error;
pub mod events;
pub mod params;

pub use error::{Error, Result};
pub use events::StoryEvent;
pub use params::TimingParams;

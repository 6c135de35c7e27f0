//! Voice-over cueing
//!
//! Starts and stops chapter voice-over in lockstep with phase transitions.
//! Playback failures are reported upward and never stall narration.

use std::sync::Arc;

use storyplay_common::Result;
use tracing::{debug, warn};

/// Host-provided audio playback collaborator
///
/// The host has already satisfied any platform audio-permission
/// precondition; the engine performs no retry on failure.
pub trait AudioPlayer: Send + Sync {
    /// Begin playback of the given voice-over reference
    fn play(&self, voice_ref: &str) -> Result<()>;

    /// Pause playback, retaining position
    fn pause(&self);

    /// Stop playback and discard position
    fn stop(&self);
}

/// An [`AudioPlayer`] that plays nothing
///
/// Used by hosts without an audio path; narration proceeds silently.
#[derive(Debug, Default)]
pub struct NullAudioPlayer;

impl AudioPlayer for NullAudioPlayer {
    fn play(&self, voice_ref: &str) -> Result<()> {
        debug!(voice_ref, "null audio player: ignoring play");
        Ok(())
    }

    fn pause(&self) {}

    fn stop(&self) {}
}

/// Voice-over controller
///
/// Thin wrapper keeping the start/stop policy in one place: `start` reports
/// failure to the caller non-fatally, `stop` is unconditional and called
/// before every chapter switch.
#[derive(Clone)]
pub struct VoiceOverCue {
    player: Arc<dyn AudioPlayer>,
}

impl VoiceOverCue {
    pub fn new(player: Arc<dyn AudioPlayer>) -> Self {
        Self { player }
    }

    /// Start the given voice-over; returns the failure reason on error
    pub fn start(&self, voice_ref: &str) -> Option<String> {
        match self.player.play(voice_ref) {
            Ok(()) => {
                debug!(voice_ref, "voice-over started");
                None
            }
            Err(e) => {
                warn!(voice_ref, error = %e, "voice-over playback failed, continuing without audio");
                Some(e.to_string())
            }
        }
    }

    /// Stop any active voice-over
    pub fn stop(&self) {
        self.player.stop();
    }
}

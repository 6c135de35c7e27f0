//! Timing parameters for story playback
//!
//! All delays that shape the narration cadence live here, so hosts and tests
//! can tune them in one place. Values are milliseconds on the engine's
//! cooperative timeline (wall-clock drift stretches them uniformly but never
//! reorders them).

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Playback timing parameters
///
/// Defaults match the reference presentation:
/// - Title card displayed for 2000 ms before the first line
/// - 1800 ms gap between a line fading out and the next line appearing
/// - 2000 ms blackout between chapters, with the scene swap pre-empted at
///   1650 ms so the new model is in place before the next title
/// - Voice-over armed 5000 ms after chapter entry (valid range 5000-8000 ms,
///   leaving time to read the title first)
/// - Progress recomputed every 100 ms while a line is showing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingParams {
    /// Title card display duration (ms)
    pub title_ms: u64,

    /// Gap between hiding line `i` and showing line `i+1` (ms)
    pub line_gap_ms: u64,

    /// Blackout between the last line of a chapter and the next title (ms)
    pub blackout_ms: u64,

    /// Offset into the blackout at which the scene swap fires (ms)
    pub scene_swap_ms: u64,

    /// Delay from chapter entry to voice-over start (ms)
    pub voice_over_preroll_ms: u64,

    /// Progress recomputation cadence while a line is showing (ms)
    pub progress_tick_ms: u64,
}

impl Default for TimingParams {
    fn default() -> Self {
        Self {
            title_ms: 2000,
            line_gap_ms: 1800,
            blackout_ms: 2000,
            scene_swap_ms: 1650,
            voice_over_preroll_ms: 5000,
            progress_tick_ms: 100,
        }
    }
}

impl TimingParams {
    /// Validate parameter relationships
    ///
    /// The scene swap must land within the blackout window, and a zero tick
    /// would busy-loop the progress chain.
    pub fn validate(&self) -> Result<()> {
        if self.scene_swap_ms > self.blackout_ms {
            return Err(Error::Config(format!(
                "scene_swap_ms ({}) must not exceed blackout_ms ({})",
                self.scene_swap_ms, self.blackout_ms
            )));
        }
        if self.progress_tick_ms == 0 {
            return Err(Error::Config(
                "progress_tick_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

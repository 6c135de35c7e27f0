//! Playback state machine
//!
//! Drives chapter/line progression on the engine's cooperative timeline:
//! title cards, timed line reveal and fade, inter-chapter blackouts with
//! pre-empted scene swaps, voice-over cueing, and progress reporting.
//!
//! All suspension goes through the generation-tagged [`Scheduler`]; a host
//! jump, restart, or dispose bumps the generation before touching state, so
//! every in-flight transition of the superseded configuration is inert by
//! the time it could fire. Generation bumps and state mutation both happen
//! under the single state lock, and transition bodies never await while
//! holding it; together that makes check-then-mutate-then-schedule atomic
//! with respect to cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};
use tokio::time::Instant;
use tracing::{debug, error, info, trace, warn};

use storyplay_common::{Result, StoryEvent, TimingParams};

use crate::catalog::ChapterCatalog;
use crate::playback::scheduler::Scheduler;
use crate::playback::state::{PlaybackPhase, PlaybackSnapshot, PlaybackState};
use crate::playback::voiceover::{AudioPlayer, VoiceOverCue};
use crate::progress;

/// Event channel capacity; slow subscribers lag rather than block the engine
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// How a chapter is being entered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChapterEntry {
    /// `start()` from idle
    Start,
    /// Host gesture (`jump_to_chapter` / `restart`)
    Jump,
    /// Natural completion of the previous chapter
    Natural,
}

/// Narrated story playback engine
///
/// Cheap to clone; clones share the same underlying engine. Hosts drive it
/// with [`start`], [`jump_to_chapter`], [`restart`] and [`dispose`], and
/// observe it through [`subscribe`] (event stream of plain values) or
/// [`snapshot`] (immutable state copy).
///
/// [`start`]: StoryEngine::start
/// [`jump_to_chapter`]: StoryEngine::jump_to_chapter
/// [`restart`]: StoryEngine::restart
/// [`dispose`]: StoryEngine::dispose
/// [`subscribe`]: StoryEngine::subscribe
/// [`snapshot`]: StoryEngine::snapshot
#[derive(Clone)]
pub struct StoryEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    catalog: ChapterCatalog,
    params: TimingParams,
    state: RwLock<PlaybackState>,
    scheduler: Scheduler,
    voice: VoiceOverCue,
    event_tx: broadcast::Sender<StoryEvent>,
    disposed: AtomicBool,
}

impl StoryEngine {
    /// Create an engine over a validated catalog
    pub fn new(
        catalog: ChapterCatalog,
        params: TimingParams,
        player: Arc<dyn AudioPlayer>,
    ) -> Result<Self> {
        params.validate()?;
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        info!(
            chapters = catalog.total_chapters(),
            chapter_weight = catalog.chapter_weight(),
            "story engine created"
        );

        Ok(Self {
            inner: Arc::new(EngineInner {
                catalog,
                params,
                state: RwLock::new(PlaybackState::new()),
                scheduler: Scheduler::new(),
                voice: VoiceOverCue::new(player),
                event_tx,
                disposed: AtomicBool::new(false),
            }),
        })
    }

    /// Subscribe to the engine's event stream
    pub fn subscribe(&self) -> broadcast::Receiver<StoryEvent> {
        self.event_tx().subscribe()
    }

    /// Immutable copy of the current playback position
    pub async fn snapshot(&self) -> PlaybackSnapshot {
        let state = self.inner.state.read().await;
        state.snapshot(self.inner.scheduler.generation())
    }

    /// Begin playback from chapter 0
    ///
    /// Idempotent: a second call (any phase other than `Idle`) is a no-op.
    pub async fn start(&self) {
        if self.is_disposed() {
            return;
        }
        let mut state = self.inner.state.write().await;
        if state.phase != PlaybackPhase::Idle {
            debug!(phase = %state.phase, "start ignored, playback already underway");
            return;
        }
        info!("starting story playback");
        self.enter_chapter(&mut state, 0, ChapterEntry::Start);
    }

    /// Jump directly to a chapter
    ///
    /// `index == total_chapters` means "jump to the end screen"; larger
    /// indices clamp to it. Supersedes every in-flight transition: the
    /// generation is bumped before any state changes, so no callback of the
    /// previous configuration can act afterwards.
    pub async fn jump_to_chapter(&self, index: usize) {
        if self.is_disposed() {
            return;
        }
        let total = self.inner.catalog.total_chapters();
        let target = if index > total {
            warn!(index, total, "chapter index out of range, clamping to end screen");
            total
        } else {
            index
        };

        let mut state = self.inner.state.write().await;
        debug!(chapter = target, "jump to chapter");
        if target == total {
            self.inner.scheduler.cancel_all();
            self.inner.voice.stop();
            self.finish(&mut state);
        } else {
            self.enter_chapter(&mut state, target, ChapterEntry::Jump);
        }
    }

    /// Restart from the beginning
    ///
    /// Equivalent to jumping to chapter 0: clears the end screen and resets
    /// progress to 0.
    pub async fn restart(&self) {
        info!("restarting story");
        self.jump_to_chapter(0).await;
    }

    /// Cancel all pending work and render the engine inert
    ///
    /// Every subsequent operation is a no-op; no scheduled callback fires
    /// afterwards, however far the clock advances.
    pub async fn dispose(&self) {
        if self.inner.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        let mut state = self.inner.state.write().await;
        self.inner.scheduler.cancel_all();
        self.inner.voice.stop();
        state.phase = PlaybackPhase::Idle;
        state.line_shown_at = None;
        info!("story engine disposed");
    }

    fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::SeqCst)
    }

    fn event_tx(&self) -> &broadcast::Sender<StoryEvent> {
        &self.inner.event_tx
    }

    fn emit(&self, event: StoryEvent) {
        // No receivers is fine
        let _ = self.inner.event_tx.send(event);
    }

    fn now() -> chrono::DateTime<chrono::Utc> {
        chrono::Utc::now()
    }

    fn emit_progress(&self, percent: f64) {
        self.emit(StoryEvent::ProgressChanged {
            percent,
            timestamp: Self::now(),
        });
    }

    /// Enter a chapter: title card up, voice-over armed, first line queued
    ///
    /// Shared by all entry paths. Cancels pending work and stops audio
    /// first, so a chapter entry is always the only live configuration and
    /// no timer chain from a superseded chapter survives a rapid jump.
    ///
    /// `Natural` entries use the blackout as the title window and pre-empt
    /// the scene swap partway through it; `Start`/`Jump` entries swap the
    /// scene immediately and use the regular title duration.
    fn enter_chapter(&self, state: &mut PlaybackState, index: usize, entry: ChapterEntry) {
        self.inner.scheduler.cancel_all();
        self.inner.voice.stop();

        let chapter = self.inner.catalog.chapter_at(index);
        let weight = self.inner.catalog.chapter_weight();

        state.chapter_index = index;
        state.line_index = 0;
        state.phase = PlaybackPhase::ShowingTitle;
        state.line_shown_at = None;
        state.progress_percent = progress::chapter_base(index, weight);

        debug!(chapter = index, title = %chapter.title, ?entry, "entering chapter");

        self.emit(StoryEvent::TitleShown {
            chapter_index: index,
            title: chapter.title.clone(),
            timestamp: Self::now(),
        });
        self.emit_progress(state.progress_percent);

        let title_window_ms = match entry {
            ChapterEntry::Start | ChapterEntry::Jump => {
                self.emit(StoryEvent::SceneChanged {
                    scene_id: chapter.scene_id.clone(),
                    timestamp: Self::now(),
                });
                self.inner.params.title_ms
            }
            ChapterEntry::Natural => {
                // Scene swap fires partway through the blackout so the new
                // model is in place before its first line.
                let engine = self.clone();
                self.inner
                    .scheduler
                    .schedule_after(self.inner.params.scene_swap_ms, move |gen| async move {
                        engine.on_scene_swap(gen, index).await;
                    });
                self.inner.params.blackout_ms
            }
        };

        if chapter.voice_over.is_some() {
            let engine = self.clone();
            self.inner.scheduler.schedule_after(
                self.inner.params.voice_over_preroll_ms,
                move |gen| async move {
                    engine.on_voice_over_due(gen, index).await;
                },
            );
        }

        let engine = self.clone();
        self.inner
            .scheduler
            .schedule_after(title_window_ms, move |gen| async move {
                engine.on_title_elapsed(gen).await;
            });
    }

    /// Reveal line `line` of the current chapter
    fn show_line(&self, state: &mut PlaybackState, line: usize) {
        let chapter = self.inner.catalog.chapter_at(state.chapter_index);
        let weight = self.inner.catalog.chapter_weight();
        let duration_ms = chapter.line_durations_ms[line];

        state.phase = PlaybackPhase::ShowingLine;
        state.line_index = line;
        state.line_shown_at = Some(Instant::now());
        state.progress_percent =
            progress::line_base(state.chapter_index, line, chapter.lines.len(), weight);

        trace!(
            chapter = state.chapter_index,
            line,
            duration_ms,
            "showing line"
        );

        self.emit(StoryEvent::LineShown {
            chapter_index: state.chapter_index,
            line_index: line,
            text: chapter.lines[line].clone(),
            timestamp: Self::now(),
        });
        self.emit_progress(state.progress_percent);

        let engine = self.clone();
        self.inner
            .scheduler
            .schedule_after(duration_ms, move |gen| async move {
                engine.on_line_hide(gen, line).await;
            });

        let engine = self.clone();
        self.inner.scheduler.schedule_after(
            duration_ms + self.inner.params.line_gap_ms,
            move |gen| async move {
                engine.on_line_advance(gen, line).await;
            },
        );

        let engine = self.clone();
        self.inner
            .scheduler
            .schedule_after(self.inner.params.progress_tick_ms, move |gen| async move {
                engine.on_progress_tick(gen).await;
            });
    }

    /// Land on the end screen
    fn finish(&self, state: &mut PlaybackState) {
        state.phase = PlaybackPhase::Ended;
        state.chapter_index = self.inner.catalog.total_chapters();
        state.line_index = 0;
        state.line_shown_at = None;
        state.progress_percent = 100.0;

        info!("story ended");
        self.emit_progress(100.0);
        self.emit(StoryEvent::StoryEnded {
            timestamp: Self::now(),
        });
    }

    /// Last line of the chapter done: next chapter or end screen
    fn complete_chapter(&self, state: &mut PlaybackState) {
        let next = state.chapter_index + 1;
        if next < self.inner.catalog.total_chapters() {
            self.enter_chapter(state, next, ChapterEntry::Natural);
        } else {
            self.inner.scheduler.cancel_all();
            self.inner.voice.stop();
            self.finish(state);
        }
    }

    /// Title window elapsed: first line, or straight to the next chapter
    /// for a line-less chapter
    async fn on_title_elapsed(&self, gen: u64) {
        let mut state = self.inner.state.write().await;
        if !self.inner.scheduler.is_live(gen) {
            trace!(gen, "stale title transition dropped");
            return;
        }
        if state.phase != PlaybackPhase::ShowingTitle {
            debug_assert!(false, "live title transition in phase {}", state.phase);
            error!(phase = %state.phase, "live title transition fired outside ShowingTitle");
            return;
        }

        if self
            .inner
            .catalog
            .chapter_at(state.chapter_index)
            .lines
            .is_empty()
        {
            self.complete_chapter(&mut state);
        } else {
            self.show_line(&mut state, 0);
        }
    }

    /// Line display duration elapsed: fade it out
    async fn on_line_hide(&self, gen: u64, line: usize) {
        let mut state = self.inner.state.write().await;
        if !self.inner.scheduler.is_live(gen) {
            trace!(gen, line, "stale line hide dropped");
            return;
        }
        if state.phase != PlaybackPhase::ShowingLine || state.line_index != line {
            debug_assert!(
                false,
                "live hide for line {} in phase {} at line {}",
                line, state.phase, state.line_index
            );
            error!(phase = %state.phase, line, "live line hide fired out of place");
            return;
        }

        let chapter = self.inner.catalog.chapter_at(state.chapter_index);
        let weight = self.inner.catalog.chapter_weight();

        state.phase = PlaybackPhase::LineHidden;
        state.line_shown_at = None;
        state.progress_percent =
            progress::line_end(state.chapter_index, line, chapter.lines.len(), weight);

        self.emit(StoryEvent::LineHidden {
            chapter_index: state.chapter_index,
            line_index: line,
            timestamp: Self::now(),
        });
        self.emit_progress(state.progress_percent);
    }

    /// Inter-line gap elapsed: advance to the next line or finish the chapter
    async fn on_line_advance(&self, gen: u64, line: usize) {
        let mut state = self.inner.state.write().await;
        if !self.inner.scheduler.is_live(gen) {
            trace!(gen, line, "stale line advance dropped");
            return;
        }
        if state.phase != PlaybackPhase::LineHidden || state.line_index != line {
            debug_assert!(
                false,
                "live advance for line {} in phase {} at line {}",
                line, state.phase, state.line_index
            );
            error!(phase = %state.phase, line, "live line advance fired out of place");
            return;
        }

        let next_line = line + 1;
        let total_lines = self
            .inner
            .catalog
            .chapter_at(state.chapter_index)
            .lines
            .len();

        if next_line < total_lines {
            self.show_line(&mut state, next_line);
        } else {
            self.complete_chapter(&mut state);
        }
    }

    /// Progress sampling tick; re-arms itself while the line is showing
    //
    // Explicit `+ Send` return bound (rather than plain `async fn`) breaks the
    // auto-trait inference cycle created by the recursive self-re-arm through
    // the generic `Scheduler::schedule_after`.
    fn on_progress_tick(&self, gen: u64) -> impl std::future::Future<Output = ()> + Send + '_ {
        async move {
        let mut state = self.inner.state.write().await;
        if !self.inner.scheduler.is_live(gen) {
            return;
        }
        if state.phase != PlaybackPhase::ShowingLine {
            // Line already hidden; the chain ends here.
            return;
        }
        let Some(shown_at) = state.line_shown_at else {
            return;
        };

        let chapter = self.inner.catalog.chapter_at(state.chapter_index);
        let elapsed_ms = shown_at.elapsed().as_millis() as u64;
        let percent = progress::line_progress(
            state.chapter_index,
            state.line_index,
            elapsed_ms,
            chapter.lines.len(),
            chapter.line_durations_ms[state.line_index],
            self.inner.catalog.chapter_weight(),
        );

        state.progress_percent = percent;
        self.emit_progress(percent);

        let engine = self.clone();
        self.inner
            .scheduler
            .schedule_after(self.inner.params.progress_tick_ms, move |g| async move {
                engine.on_progress_tick(g).await;
            });
        }
    }

    /// Pre-empted scene swap during an inter-chapter blackout
    async fn on_scene_swap(&self, gen: u64, chapter_index: usize) {
        let state = self.inner.state.read().await;
        if !self.inner.scheduler.is_live(gen) {
            trace!(gen, chapter_index, "stale scene swap dropped");
            return;
        }
        debug_assert_eq!(state.chapter_index, chapter_index);

        let chapter = self.inner.catalog.chapter_at(chapter_index);
        debug!(chapter = chapter_index, scene = %chapter.scene_id, "scene swap");
        self.emit(StoryEvent::SceneChanged {
            scene_id: chapter.scene_id.clone(),
            timestamp: Self::now(),
        });
    }

    /// Voice-over pre-roll elapsed: start playback, report failure upward
    async fn on_voice_over_due(&self, gen: u64, chapter_index: usize) {
        let state = self.inner.state.read().await;
        if !self.inner.scheduler.is_live(gen) {
            trace!(gen, chapter_index, "stale voice-over cue dropped");
            return;
        }
        debug_assert_eq!(state.chapter_index, chapter_index);

        let chapter = self.inner.catalog.chapter_at(chapter_index);
        let Some(voice_ref) = chapter.voice_over.as_deref() else {
            return;
        };

        match self.inner.voice.start(voice_ref) {
            None => self.emit(StoryEvent::VoiceOverStarted {
                chapter_index,
                timestamp: Self::now(),
            }),
            Some(reason) => self.emit(StoryEvent::VoiceOverFailed {
                chapter_index,
                reason,
                timestamp: Self::now(),
            }),
        }
    }
}

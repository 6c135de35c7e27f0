//! Generation-tagged delayed-action scheduler
//!
//! The sole suspension primitive of the playback engine. Every scheduled
//! action captures the scheduler's generation at schedule time; `cancel_all`
//! bumps the generation and aborts whatever it can reach. An action whose
//! captured generation no longer matches at fire time is a silent no-op, so
//! a late or unabortable timer from a superseded chapter can never act.
//!
//! Abort alone is not enough: a task that has already been woken can slip
//! past `abort()`. The generation check closes that window, which is why
//! both guards exist.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::trace;

/// Generation-tagged delayed-callback facility
///
/// Shared between the engine and its scheduled transitions via `Arc`.
#[derive(Debug)]
pub struct Scheduler {
    /// Current generation; bumped by `cancel_all`
    generation: AtomicU64,

    /// Handles of pending tasks, for best-effort abort
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            generation: AtomicU64::new(0),
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Current generation
    ///
    /// Transition callbacks re-check this against their captured value under
    /// the engine's state lock, closing the race between a fire-time check
    /// and a concurrent `cancel_all`.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Schedule `action` to run after `delay_ms`
    ///
    /// The action receives the generation captured at schedule time and runs
    /// only if it still matches at fire time. Returns the captured
    /// generation.
    pub fn schedule_after<F, Fut>(&self, delay_ms: u64, action: F) -> u64
    where
        F: FnOnce(u64) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let scheduled_gen = self.generation();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            action(scheduled_gen).await;
        });

        let mut handles = self.handles.lock().expect("scheduler handle list poisoned");
        handles.retain(|h| !h.is_finished());
        handles.push(handle);

        scheduled_gen
    }

    /// Invalidate all pending actions
    ///
    /// Bumps the generation (making every previously scheduled action inert
    /// at fire time) and then aborts the pending tasks. Returns the new
    /// generation.
    pub fn cancel_all(&self) -> u64 {
        let new_gen = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let drained: Vec<JoinHandle<()>> = {
            let mut handles = self.handles.lock().expect("scheduler handle list poisoned");
            handles.drain(..).collect()
        };
        let cancelled = drained.len();
        for handle in drained {
            handle.abort();
        }

        trace!(generation = new_gen, cancelled, "scheduler cancelled all pending actions");
        new_gen
    }

    /// Whether `scheduled_gen` is still the live generation
    pub fn is_live(&self, scheduled_gen: u64) -> bool {
        self.generation() == scheduled_gen
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

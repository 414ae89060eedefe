// ── Debounced input ──
//
// Trailing-edge debounce for free-text search. Every keystroke replaces
// the pending delayed task; only the last one in a quiet window fires.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// A spawned task that runs `work` after `delay` unless cancelled first.
///
/// Cancellation only takes effect before the delay elapses. Once the
/// work has started it runs to completion. Dropping the handle cancels.
#[derive(Debug)]
pub struct PendingTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl PendingTask {
    /// Spawn onto the current Tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn spawn_after<F>(delay: Duration, work: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            tokio::select! {
                () = token.cancelled() => trace!("pending task cancelled"),
                () = tokio::time::sleep(delay) => work.await,
            }
        });
        Self { cancel, handle }
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for PendingTask {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Typed search text plus the single pending propagation.
///
/// The typed text is visible immediately; propagation to the filter
/// happens `quiet` after the last keystroke.
#[derive(Debug)]
pub struct DebouncedSearch {
    quiet: Duration,
    typed: watch::Sender<String>,
    pending: Mutex<Option<PendingTask>>,
}

impl DebouncedSearch {
    pub fn new(quiet: Duration) -> Self {
        let (typed, _) = watch::channel(String::new());
        Self {
            quiet,
            typed,
            pending: Mutex::new(None),
        }
    }

    /// Record a keystroke and (re)schedule propagation.
    ///
    /// `propagate` is invoked with the final text once the quiet period
    /// passes without another call.
    pub fn input<F, Fut>(&self, text: impl Into<String>, propagate: F)
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let text = text.into();
        self.typed.send_replace(text.clone());

        let task = PendingTask::spawn_after(self.quiet, propagate(text));
        let previous = self
            .pending
            .lock()
            .expect("debounce lock poisoned")
            .replace(task);
        if let Some(previous) = previous {
            previous.cancel();
        }
    }

    /// Cancel the pending propagation, if any. Returns `true` if one was
    /// still waiting.
    pub fn cancel(&self) -> bool {
        let pending = self.pending.lock().expect("debounce lock poisoned").take();
        pending.is_some_and(|task| {
            let waiting = !task.is_finished() && !task.is_cancelled();
            task.cancel();
            waiting
        })
    }

    /// Cancel and reset the typed text.
    pub fn reset(&self) {
        self.cancel();
        self.typed.send_replace(String::new());
    }

    /// Text as typed, ahead of propagation.
    pub fn typed(&self) -> String {
        self.typed.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.typed.subscribe()
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet
    }
}

//! [`ModeSupervisor`] – owns "what behavior is currently running".
//!
//! Exactly one behavior task may drive the motors at any moment.  The
//! supervisor enforces that by serialising every switch through a single
//! critical section: the previous task is asked to cancel, its join handle
//! is **awaited to completion**, and only then is the replacement spawned.
//! Two concurrent switch requests therefore apply one after the other, never
//! interleaved, and there is no window in which two behavior tasks both
//! issue motor commands.
//!
//! # Cancellation contract
//!
//! Cancellation is cooperative.  The supervisor only cancels the behavior's
//! [`CancellationToken`]; the behavior observes it at its next suspension
//! point, stops the motors on its way out, and returns.  Every behavior loop
//! guarantees at least one suspension point per iteration, bounding the
//! switch latency to one iteration.  Cancellation is clean shutdown, never a
//! failure.
//!
//! Switching into the mode that is already active is not special-cased: the
//! running task is cancelled and a fresh one started (idempotent restart,
//! not a no-op).

use std::future::Future;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use trundle_types::Mode;

struct RunningBehavior {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct Supervised {
    mode: Option<Mode>,
    task: Option<RunningBehavior>,
}

/// Serialises behavior switching and guarantees single ownership of the
/// motor actuator.
///
/// Process-lifetime singleton, constructed once at startup and shared by
/// reference with every command listener.
#[derive(Default)]
pub struct ModeSupervisor {
    inner: Mutex<Supervised>,
}

impl ModeSupervisor {
    /// Create a supervisor with no active behavior.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the active behavior with `entry`, recording `mode`.
    ///
    /// `entry` receives a fresh [`CancellationToken`] and is spawned as an
    /// independent task.  If a previous behavior is still running it is
    /// cancelled and awaited first; this call does not return until the old
    /// task has fully unwound and the new one is spawned.
    pub async fn switch_to<F, Fut>(&self, mode: Mode, entry: F)
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut inner = self.inner.lock().await;

        if let Some(previous) = inner.task.take() {
            previous.cancel.cancel();
            if let Err(err) = previous.handle.await {
                // A panicked behavior must not take the supervisor down with
                // it; the replacement still starts.
                if err.is_panic() {
                    error!(?err, "previous behavior task panicked during switch");
                }
            }
            if let Some(old_mode) = inner.mode {
                info!(%old_mode, %mode, "behavior superseded");
            }
        }

        inner.mode = Some(mode);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(entry(cancel.clone()));
        inner.task = Some(RunningBehavior { cancel, handle });
        info!(%mode, "behavior started");
    }

    /// The mode recorded by the most recent switch, if any.
    pub async fn current_mode(&self) -> Option<Mode> {
        self.inner.lock().await.mode
    }

    /// `true` when the current behavior task has run to completion on its
    /// own (e.g. a find behavior that reached its target).
    pub async fn is_finished(&self) -> bool {
        let inner = self.inner.lock().await;
        match &inner.task {
            Some(running) => running.handle.is_finished(),
            None => true,
        }
    }

    /// Cancel and await the active behavior, leaving the supervisor idle.
    ///
    /// Called at process shutdown; the behavior's own unwind path stops the
    /// motors before this returns.
    pub async fn shutdown(&self) {
        let mut inner = self.inner.lock().await;
        if let Some(previous) = inner.task.take() {
            previous.cancel.cancel();
            let _ = previous.handle.await;
        }
        inner.mode = None;
        info!("supervisor shut down");
    }
}

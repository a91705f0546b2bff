//! [`MediumArbiter`] – exclusivity gate between the two command sources.
//!
//! The web operator and the voice pipeline run as concurrent tasks, and
//! exactly one of them may be commanding the robot at any moment.  Each call
//! is atomic: acquire and release both take the single internal lock, so
//! concurrent attempts from the two sources are decided one at a time.
//!
//! # Anti-starvation rule
//!
//! Voice commands come from a person standing next to the robot, so they get
//! priority when contention happens.  After a voice acquisition is denied,
//! the denial is remembered and the web operator is refused fresh grants
//! until the voice pipeline either succeeds or is itself superseded by a new
//! pending request.  Denial is an ordinary boolean outcome, never an error:
//! a refused source announces "busy" and drops the command.
//!
//! # Example
//!
//! ```
//! use trundle_kernel::MediumArbiter;
//! use trundle_types::Medium;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let arbiter = MediumArbiter::new();
//! assert!(arbiter.acquire(Medium::Web).await);
//! // Voice is denied while web holds control …
//! assert!(!arbiter.acquire(Medium::Voice).await);
//! // … and release reports it as the medium owed a turn.
//! assert_eq!(arbiter.release(Medium::Web).await, Some(Medium::Voice));
//! # });
//! ```

use tokio::sync::Mutex;
use tracing::debug;
use trundle_types::Medium;

#[derive(Default)]
struct ArbiterState {
    holder: Option<Medium>,
    last_unsuccessful: Option<Medium>,
}

/// Grants exclusive command-issuing rights to one [`Medium`] at a time.
///
/// Process-lifetime singleton, constructed once at startup and shared by
/// reference with both command listeners.
#[derive(Default)]
pub struct MediumArbiter {
    state: Mutex<ArbiterState>,
}

impl MediumArbiter {
    /// Create an arbiter with no holder and no pending denial.
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to take exclusive control for `requester`.
    ///
    /// Denied when another medium holds control, or when the requester is
    /// [`Medium::Web`] while a previously denied voice request is still owed
    /// its turn.  Voice requests skip that pending check entirely.  Every
    /// denial records `requester` as the pending medium.
    pub async fn acquire(&self, requester: Medium) -> bool {
        let mut state = self.state.lock().await;

        if let Some(holder) = state.holder {
            state.last_unsuccessful = Some(requester);
            debug!(%requester, %holder, "medium denied: control already held");
            return false;
        }

        if state.last_unsuccessful.is_none() || requester == Medium::Voice {
            state.holder = Some(requester);
            state.last_unsuccessful = None;
            debug!(%requester, "medium granted");
            true
        } else {
            state.last_unsuccessful = Some(requester);
            debug!(%requester, "medium denied: a voice request is owed its turn");
            false
        }
    }

    /// Give up control held by `requester`.
    ///
    /// No-ops when `requester` is not the current holder.  Returns the medium
    /// whose earlier request was denied and is now free to retry, so the
    /// caller can emit the "now available" announcement that prompts it.
    pub async fn release(&self, requester: Medium) -> Option<Medium> {
        let mut state = self.state.lock().await;
        if state.holder == Some(requester) {
            state.holder = None;
            if let Some(pending) = state.last_unsuccessful {
                debug!(%requester, %pending, "medium released with a deferred requester");
                return Some(pending);
            }
            debug!(%requester, "medium released");
        }
        None
    }

    /// The medium currently holding control, if any.
    pub async fn holder(&self) -> Option<Medium> {
        self.state.lock().await.holder
    }
}

//! The one-way notice bus.
//!
//! Behaviors and the command dispatcher publish [`Notice`]s here; whatever
//! wants to surface them (the operator UI forwarder, the CLI printer, a test
//! collector) subscribes.  Built on [`tokio::sync::broadcast`] so every
//! subscriber sees every notice without any single subscriber blocking the
//! others.
//!
//! Publishing is fire-and-forget by contract: a notice that nobody receives
//! is a normal condition, never an error, and no behavior ever aborts
//! because the sink is down.

use tokio::sync::broadcast;
use tracing::debug;
use trundle_types::{Event, Notice};

/// Default buffer depth before slow subscribers start losing old notices.
const DEFAULT_CAPACITY: usize = 128;

/// Shared notice bus.  Clone it cheaply – all clones feed the same channel.
#[derive(Clone, Debug)]
pub struct NoticeBus {
    sender: broadcast::Sender<Event>,
}

impl NoticeBus {
    /// Create a bus buffering up to `capacity` undelivered notices per
    /// subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Wrap `payload` in an [`Event`] stamped with `source` and broadcast it.
    ///
    /// Returns the number of subscribers that were handed the event.  Zero
    /// subscribers is normal (e.g. the operator UI is not connected).
    pub fn publish(&self, source: &str, payload: Notice) -> usize {
        let event = Event::now(source, payload);
        debug!(source, payload = ?event.payload, "notice");
        match self.sender.send(event) {
            Ok(n) => n,
            // No receivers currently listening; the notice is simply dropped.
            Err(broadcast::error::SendError(_)) => 0,
        }
    }

    /// Subscribe to every notice published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }
}

impl Default for NoticeBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_receives_published_notice() {
        let bus = NoticeBus::default();
        let mut rx = bus.subscribe();

        let delivered = bus.publish("test", Notice::Stuck);
        assert_eq!(delivered, 1);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.source, "test");
        assert_eq!(event.payload, Notice::Stuck);
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_not_an_error() {
        let bus = NoticeBus::default();
        assert_eq!(bus.publish("test", Notice::Available), 0);
    }

    #[tokio::test]
    async fn clones_share_the_same_channel() {
        let bus = NoticeBus::default();
        let bus_clone = bus.clone();
        let mut rx = bus.subscribe();

        bus_clone.publish("clone", Notice::Available);
        let event = rx.recv().await.unwrap();
        assert_eq!(event.source, "clone");
    }

    #[tokio::test]
    async fn every_subscriber_sees_every_notice() {
        let bus = NoticeBus::default();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        assert_eq!(bus.publish("test", Notice::Stuck), 2);
        assert_eq!(a.recv().await.unwrap().payload, Notice::Stuck);
        assert_eq!(b.recv().await.unwrap().payload, Notice::Stuck);
    }
}

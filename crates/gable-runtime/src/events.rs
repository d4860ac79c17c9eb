//! Lifecycle event broadcast.

use gable_core::events::GableEvent;
use tokio::sync::broadcast;
use tracing::trace;

/// Broadcast channel for agent lifecycle events.
///
/// Events are transient operator telemetry; the durable record is the
/// action log. Emitting with no live subscriber is not an error.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<GableEvent>,
}

impl EventBus {
    /// A bus retaining up to `capacity` events per lagging subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to all events from this point on.
    pub fn subscribe(&self) -> broadcast::Receiver<GableEvent> {
        self.sender.subscribe()
    }

    /// Broadcast one event.
    pub fn emit(&self, event: GableEvent) {
        trace!(?event, "event emitted");
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

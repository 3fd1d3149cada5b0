//! Session-scoped notification bus.
//!
//! Views publish here when a hint has been processed, so listeners other
//! than the renderer that consumed the hint can observe it. A bus is created
//! by the session that owns the views and handed to each of them.

use tokio::sync::broadcast;

use crate::hint::Hint;
use crate::model::ViewId;

/// Default number of undelivered notifications kept per subscriber.
pub const DEFAULT_BUS_CAPACITY: usize = 64;

/// Notification published on the bus.
#[derive(Debug, Clone, PartialEq)]
pub enum BusEvent {
    /// A renderer marked `hint` of view `view` as processed.
    HintProcessed { view: ViewId, hint: Hint },
}

/// Publish/subscribe channel for view notifications.
///
/// Cloning the bus shares the underlying channel.
#[derive(Debug, Clone)]
pub struct HintBus {
    tx: broadcast::Sender<BusEvent>,
}

impl Default for HintBus {
    fn default() -> Self {
        Self::new(DEFAULT_BUS_CAPACITY)
    }
}

impl HintBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event. Returns the number of subscribers that received it.
    pub fn publish(&self, event: BusEvent) -> usize {
        // No subscribers is not an error: nobody is listening.
        self.tx.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BusEvent> {
        self.tx.subscribe()
    }
}

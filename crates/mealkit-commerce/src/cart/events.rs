//! Cart change notifications.
//!
//! The ledger publishes a [`CartEvent`] after every successful mutation on an
//! in-process broadcast channel, so any number of views can follow the cart
//! without polling.

use crate::ids::{ItemId, LineId};
use serde::Serialize;
use tokio::sync::broadcast;

/// Buffered events per subscriber before the slowest one starts lagging.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// A change to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CartEvent {
    /// A new line was appended.
    LineAdded {
        line_id: LineId,
        item_id: ItemId,
        quantity: i64,
    },
    /// An existing line's quantity changed, by merge or by replacement.
    QuantityChanged {
        line_id: LineId,
        item_id: ItemId,
        previous: i64,
        quantity: i64,
    },
    LineRemoved { line_id: LineId, item_id: ItemId },
    /// All lines were dropped.
    Cleared { lines_removed: usize },
}

/// Publisher side, owned by the ledger.
#[derive(Debug)]
pub(crate) struct CartEvents {
    sender: broadcast::Sender<CartEvent>,
}

impl CartEvents {
    pub(crate) fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Publish to current subscribers. Having none is fine.
    pub(crate) fn publish(&self, event: CartEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    pub(crate) fn subscribe(&self) -> CartSubscription {
        CartSubscription {
            receiver: self.sender.subscribe(),
        }
    }
}

/// A subscriber's view of cart events.
pub struct CartSubscription {
    receiver: broadcast::Receiver<CartEvent>,
}

impl CartSubscription {
    /// Wait for the next event. Returns None once the ledger is dropped.
    pub async fn recv(&mut self) -> Option<CartEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "cart subscriber lagged, skipped events");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Take the next buffered event without waiting.
    pub fn try_recv(&mut self) -> Option<CartEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "cart subscriber lagged, skipped events");
                    continue;
                }
                Err(_) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_subscribers() {
        let events = CartEvents::new();
        assert_eq!(events.publish(CartEvent::Cleared { lines_removed: 2 }), 0);
    }

    #[tokio::test]
    async fn test_every_subscriber_receives() {
        let events = CartEvents::new();
        let mut a = events.subscribe();
        let mut b = events.subscribe();

        assert_eq!(events.publish(CartEvent::Cleared { lines_removed: 1 }), 2);
        assert_eq!(a.recv().await, Some(CartEvent::Cleared { lines_removed: 1 }));
        assert_eq!(b.try_recv(), Some(CartEvent::Cleared { lines_removed: 1 }));
    }

    #[tokio::test]
    async fn test_recv_ends_when_publisher_dropped() {
        let events = CartEvents::new();
        let mut sub = events.subscribe();
        drop(events);
        assert_eq!(sub.recv().await, None);
    }

    #[test]
    fn test_event_json_shape() {
        let event = CartEvent::LineRemoved {
            line_id: LineId::new("line_1"),
            item_id: ItemId::new("poke"),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "line_removed");
        assert_eq!(json["item_id"], "poke");
    }
}

//! Fan-out channels fed by the dispatcher
//!
//! Every subscriber sees every event published after it subscribed. Nothing is
//! buffered for subscribers that don't exist yet.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::gateway::{IncomingMessage, ReactionEvent};

pub const DEFAULT_BUS_CAPACITY: usize = 64;
/// Largest buffer a bus may preallocate
pub const MAX_BUS_CAPACITY: usize = 65_536;

/// Single-producer broadcast channel
#[derive(Debug)]
pub struct EventBus<T> {
    tx: broadcast::Sender<T>,
}

impl<T> Clone for EventBus<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T: Clone> EventBus<T> {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish to current subscribers, returning how many there were
    pub fn publish(&self, event: T) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<T> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl<T: Clone> Default for EventBus<T> {
    fn default() -> Self {
        Self::new(DEFAULT_BUS_CAPACITY)
    }
}

/// Prefix-less messages, consumed by collectors
pub type MessageBus = EventBus<Arc<IncomingMessage>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReactionChange {
    Added(ReactionEvent),
    Removed(ReactionEvent),
}

impl ReactionChange {
    pub fn event(&self) -> &ReactionEvent {
        match self {
            Self::Added(event) | Self::Removed(event) => event,
        }
    }
}

/// Reaction adds and removes, in arrival order
pub type ReactionBus = EventBus<ReactionChange>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{Author, ChannelId, MessageId};
    use chrono::Utc;

    #[tokio::test]
    async fn test_every_subscriber_sees_message() {
        let bus = MessageBus::new(8);
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        let msg = Arc::new(IncomingMessage::new(
            1,
            2,
            Author::new(3, "ana"),
            "42",
            Utc::now(),
        ));
        assert_eq!(bus.publish(Arc::clone(&msg)), 2);

        assert_eq!(first.recv().await.unwrap().content, "42");
        assert_eq!(second.recv().await.unwrap().content, "42");
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = ReactionBus::default();
        let change = ReactionChange::Added(ReactionEvent {
            channel_id: ChannelId(1),
            message_id: MessageId(2),
            user_id: None,
            guild_id: None,
            emoji: "👍".to_string(),
        });

        assert_eq!(bus.publish(change.clone()), 0);
        assert_eq!(change.event().emoji, "👍");
    }

    #[tokio::test]
    async fn test_dropping_bus_closes_receivers() {
        let bus = MessageBus::new(4);
        let mut rx = bus.subscribe();
        drop(bus);

        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Closed)
        ));
    }
}

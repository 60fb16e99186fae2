//! Cross-component notifications.
//!
//! Exactly two signals cross component boundaries, both fire-and-forget. Each
//! subscriber owns the receive half of its own tokio unbounded channel; a
//! subscriber that drops its receiver is pruned on the next publish.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;

/// Every event kind that can be published on the [`EventBus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    /// Emitted after every persisted save or purge of a comment collection.
    CommentsChanged,
    /// An indicator asked for the annotation UI of one block to open.
    OpenAnnotationRequested { block_index: usize },
}

/// Publish/subscribe registry shared by the store and the coordinator.
///
/// Cloning yields another handle onto the same subscriber list.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<mpsc::UnboundedSender<Notification>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new listener and returns its receive half.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<Notification> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    /// Delivers `event` to every live subscriber. Never blocks.
    pub fn publish(&self, event: Notification) {
        let mut subs = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subs.retain(|tx| tx.send(event).is_ok());
        tracing::trace!(?event, listeners = subs.len(), "notification published");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_subscriber_receives_each_event() {
        let bus = EventBus::new();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        bus.publish(Notification::CommentsChanged);
        bus.publish(Notification::OpenAnnotationRequested { block_index: 2 });

        for rx in [&mut a, &mut b] {
            assert_eq!(rx.try_recv().unwrap(), Notification::CommentsChanged);
            assert_eq!(
                rx.try_recv().unwrap(),
                Notification::OpenAnnotationRequested { block_index: 2 }
            );
            assert!(rx.try_recv().is_err());
        }
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let bus = EventBus::new();
        let dropped = bus.subscribe();
        let mut kept = bus.subscribe();
        drop(dropped);

        bus.publish(Notification::CommentsChanged);
        assert_eq!(bus.subscribers.lock().unwrap().len(), 1);
        assert_eq!(kept.try_recv().unwrap(), Notification::CommentsChanged);
    }
}

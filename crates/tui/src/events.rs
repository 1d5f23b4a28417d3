use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, error::TryRecvError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Something changed the account collection; subscribers should reload.
    AccountsUpdate,
}

impl Topic {
    pub fn name(self) -> &'static str {
        match self {
            Self::AccountsUpdate => "accounts:update",
        }
    }
}

#[derive(Debug, Default)]
struct Registry {
    next_id: u64,
    subscribers: HashMap<u64, (Topic, UnboundedSender<Topic>)>,
}

/// Process-wide publish/subscribe channel.
///
/// Cloning the bus shares the same registry. Subscribers are removed when
/// their [`Subscription`] is dropped.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    registry: Arc<Mutex<Registry>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
        registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn subscribe(&self, topic: Topic) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut registry = Self::lock(&self.registry);
        let id = registry.next_id;
        registry.next_id += 1;
        registry.subscribers.insert(id, (topic, tx));
        tracing::debug!(topic = topic.name(), id, "subscribed");
        Subscription {
            id,
            topic,
            rx,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Delivers `topic` to every live subscriber of it and returns how many
    /// were reached.
    pub fn publish(&self, topic: Topic) -> usize {
        let mut registry = Self::lock(&self.registry);
        // a closed receiver means its subscription is mid-drop
        registry
            .subscribers
            .retain(|_, (_, tx)| !tx.is_closed());
        let delivered = registry
            .subscribers
            .values()
            .filter(|(t, _)| *t == topic)
            .filter(|(_, tx)| tx.send(topic).is_ok())
            .count();
        tracing::debug!(topic = topic.name(), delivered, "published");
        delivered
    }

    #[cfg(test)]
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        Self::lock(&self.registry)
            .subscribers
            .values()
            .filter(|(t, _)| *t == topic)
            .count()
    }
}

/// Live registration on an [`EventBus`]. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    topic: Topic,
    rx: UnboundedReceiver<Topic>,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    pub fn topic(&self) -> Topic {
        self.topic
    }

    /// Drains pending notifications, returning how many were queued.
    ///
    /// Several queued updates collapse into one reload for the caller.
    pub fn drain(&mut self) -> usize {
        let mut count = 0;
        loop {
            match self.rx.try_recv() {
                Ok(_) => count += 1,
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return count,
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            EventBus::lock(&registry).subscribers.remove(&self.id);
            tracing::debug!(topic = self.topic.name(), id = self.id, "unsubscribed");
        }
    }
}

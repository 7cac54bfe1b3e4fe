//! Cross-view change notifications.
//!
//! Topics carry no payload. A subscriber reacts by re-reading storage, so a missed
//! notification only delays a refresh; the next read always sees the latest write.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Topic {
    CatalogChanged,
    PromotionOrderChanged,
    OrderPlaced,
    MediaChanged,
}

impl Topic {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CatalogChanged => "catalog-changed",
            Self::PromotionOrderChanged => "promotion-order-changed",
            Self::OrderPlaced => "order-placed",
            Self::MediaChanged => "media-changed",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

type Handler = Arc<dyn Fn(Topic) + Send + Sync>;
type Registry = HashMap<Topic, Vec<(u64, Handler)>>;

/// Same-process publish/subscribe. Cloning yields another handle on the same registry.
#[derive(Clone, Default)]
pub struct Notifier {
    handlers: Arc<Mutex<Registry>>,
    next_id: Arc<AtomicU64>,
}

impl Notifier {
    pub fn new() -> Self { Self::default() }

    pub fn subscribe<F>(&self, topic: Topic, handler: F) -> Subscription
    where
        F: Fn(Topic) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.handlers).entry(topic).or_default().push((id, Arc::new(handler)));
        Subscription { topic, id, handlers: Arc::clone(&self.handlers) }
    }

    /// Delivers synchronously to every current subscriber of `topic`. Handlers run
    /// outside the registry lock and may publish or subscribe themselves.
    pub fn publish(&self, topic: Topic) {
        let handlers: Vec<Handler> = lock(&self.handlers)
            .get(&topic)
            .map(|subs| subs.iter().map(|(_, h)| Arc::clone(h)).collect())
            .unwrap_or_default();
        tracing::debug!(%topic, subscribers = handlers.len(), "publish");
        for handler in handlers {
            handler(topic);
        }
    }

    pub fn subscriber_count(&self, topic: Topic) -> usize {
        lock(&self.handlers).get(&topic).map_or(0, Vec::len)
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier").field("topics", &lock(&self.handlers).len()).finish()
    }
}

/// Handle returned by [`Notifier::subscribe`]. Dropping it keeps the handler
/// registered; call [`Subscription::unsubscribe`] to stop delivery.
#[must_use = "keep the subscription to be able to unsubscribe"]
pub struct Subscription {
    topic: Topic,
    id: u64,
    handlers: Arc<Mutex<Registry>>,
}

impl Subscription {
    pub fn topic(&self) -> Topic { self.topic }

    pub fn unsubscribe(self) {
        if let Some(subs) = lock(&self.handlers).get_mut(&self.topic) {
            subs.retain(|(id, _)| *id != self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("topic", &self.topic).field("id", &self.id).finish()
    }
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

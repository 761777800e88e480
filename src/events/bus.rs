use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use anyhow::Result;
use futures::future::BoxFuture;
use serde_json::{json, Value};

/// A registered event handler. Handlers return a future so subscribers
/// can do async work during a sequential publish.
pub type Handler = Arc<dyn Fn(Value) -> BoxFuture<'static, Result<()>> + Send + Sync>;

struct Registered {
    id: u64,
    handler: Handler,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    topics: HashMap<String, Vec<Registered>>,
    wildcard: Vec<Registered>,
}

impl Registry {
    fn register(&mut self, topic: Option<&str>, handler: Handler) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        let entry = Registered { id, handler };
        match topic {
            Some(topic) => self.topics.entry(topic.to_string()).or_default().push(entry),
            None => self.wildcard.push(entry),
        }
        id
    }

    fn remove(&mut self, topic: Option<&str>, id: u64) {
        match topic {
            Some(topic) => {
                if let Some(entries) = self.topics.get_mut(topic) {
                    entries.retain(|entry| entry.id != id);
                }
            }
            None => self.wildcard.retain(|entry| entry.id != id),
        }
    }
}

/// Handle returned by `subscribe`; consuming it detaches the handler.
pub struct Subscription {
    registry: Weak<Mutex<Registry>>,
    topic: Option<String>,
    id: u64,
}

impl Subscription {
    pub fn unsubscribe(self) {
        if let Some(registry) = self.registry.upgrade() {
            let mut registry = registry.lock().unwrap();
            registry.remove(self.topic.as_deref(), self.id);
        }
    }
}

/// Process-wide pub/sub channel. Cloning yields another handle to the
/// same registry.
///
/// Delivery contract: `publish` awaits each handler in subscription
/// order; a handler error is logged and skipped, never interrupting
/// delivery to the remaining subscribers or failing the publish.
/// Wildcard subscribers observe every topic as `{topic, payload}`.
/// There is no ordering guarantee across distinct topics.
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Arc<Mutex<Registry>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, topic: &str, handler: F) -> Subscription
    where
        F: Fn(Value) -> BoxFuture<'static, Result<()>> + Send + Sync + 'static,
    {
        let id = self
            .registry
            .lock()
            .unwrap()
            .register(Some(topic), Arc::new(handler));
        Subscription {
            registry: Arc::downgrade(&self.registry),
            topic: Some(topic.to_string()),
            id,
        }
    }

    /// Subscribe to every topic; used for cross-cutting diagnostics
    /// without coupling to individual topic names.
    pub fn subscribe_all<F>(&self, handler: F) -> Subscription
    where
        F: Fn(Value) -> BoxFuture<'static, Result<()>> + Send + Sync + 'static,
    {
        let id = self.registry.lock().unwrap().register(None, Arc::new(handler));
        Subscription {
            registry: Arc::downgrade(&self.registry),
            topic: None,
            id,
        }
    }

    /// Snapshot the handlers under the lock so subscribers are free to
    /// (un)subscribe from inside a handler.
    fn snapshot(&self, topic: &str) -> (Vec<Handler>, Vec<Handler>) {
        let registry = self.registry.lock().unwrap();
        let direct = registry
            .topics
            .get(topic)
            .map(|entries| entries.iter().map(|e| Arc::clone(&e.handler)).collect())
            .unwrap_or_default();
        let wildcard = registry
            .wildcard
            .iter()
            .map(|e| Arc::clone(&e.handler))
            .collect();
        (direct, wildcard)
    }

    /// Deliver sequentially, awaiting each handler.
    pub async fn publish(&self, topic: &str, payload: Value) {
        let (direct, wildcard) = self.snapshot(topic);

        for handler in direct {
            if let Err(error) = handler(payload.clone()).await {
                tracing::warn!(topic, %error, "event handler failed");
            }
        }

        if wildcard.is_empty() {
            return;
        }
        let wrapped = json!({ "topic": topic, "payload": payload });
        for handler in wildcard {
            if let Err(error) = handler(wrapped.clone()).await {
                tracing::warn!(topic, %error, "wildcard event handler failed");
            }
        }
    }

    /// Fire-and-forget variant: delivery runs on a spawned task with
    /// the same per-handler fault isolation; failures are logged, never
    /// propagated to the caller.
    pub fn publish_sync(&self, topic: &str, payload: Value) {
        let bus = self.clone();
        let topic = topic.to_string();
        tokio::spawn(async move {
            bus.publish(&topic, payload).await;
        });
    }
}

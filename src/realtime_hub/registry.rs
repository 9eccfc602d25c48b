//! SubscriberRegistry - set of live viewers

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::subscriber::Subscriber;

/// Currently connected subscribers, keyed by id
pub struct SubscriberRegistry {
    subscribers: RwLock<HashMap<Uuid, Arc<dyn Subscriber>>>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
        }
    }

    /// Register a subscriber (re-registering the same id replaces it)
    pub async fn register(&self, subscriber: Arc<dyn Subscriber>) {
        let id = subscriber.id();
        let count = {
            let mut subscribers = self.subscribers.write().await;
            subscribers.insert(id, subscriber);
            subscribers.len()
        };
        tracing::info!(connection_id = %id, subscriber_count = count, "Subscriber registered");
    }

    /// Remove a subscriber. Returns false if it was already gone.
    pub async fn unregister(&self, id: &Uuid) -> bool {
        let removed = {
            let mut subscribers = self.subscribers.write().await;
            subscribers.remove(id).is_some()
        };
        if removed {
            tracing::info!(connection_id = %id, "Subscriber unregistered");
        }
        removed
    }

    /// Copy of the current subscriber set; the lock is released on return
    pub async fn enumerate(&self) -> Vec<Arc<dyn Subscriber>> {
        let subscribers = self.subscribers.read().await;
        subscribers.values().cloned().collect()
    }

    pub async fn contains(&self, id: &Uuid) -> bool {
        self.subscribers.read().await.contains_key(id)
    }

    pub async fn count(&self) -> usize {
        self.subscribers.read().await.len()
    }
}

impl Default for SubscriberRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realtime_hub::subscriber::ChannelSubscriber;

    #[tokio::test]
    async fn test_register_enumerate_unregister() {
        let registry = SubscriberRegistry::new();
        let (a, _rx_a) = ChannelSubscriber::new();
        let (b, _rx_b) = ChannelSubscriber::new();
        let a_id = a.id();

        registry.register(Arc::new(a)).await;
        registry.register(Arc::new(b)).await;
        assert_eq!(registry.count().await, 2);
        assert_eq!(registry.enumerate().await.len(), 2);

        assert!(registry.unregister(&a_id).await);
        assert!(!registry.contains(&a_id).await);
        assert_eq!(registry.count().await, 1);
    }

    #[tokio::test]
    async fn test_unregister_is_idempotent() {
        let registry = SubscriberRegistry::new();
        let (a, _rx) = ChannelSubscriber::new();
        let id = a.id();
        registry.register(Arc::new(a)).await;

        assert!(registry.unregister(&id).await);
        assert!(!registry.unregister(&id).await);
        assert!(!registry.unregister(&Uuid::new_v4()).await);
        assert_eq!(registry.count().await, 0);
    }

    #[tokio::test]
    async fn test_double_register_does_not_duplicate() {
        let registry = SubscriberRegistry::new();
        let (a, _rx) = ChannelSubscriber::new();
        let a: Arc<dyn Subscriber> = Arc::new(a);

        registry.register(a.clone()).await;
        registry.register(a).await;
        assert_eq!(registry.enumerate().await.len(), 1);
    }

    #[tokio::test]
    async fn test_enumerate_is_a_stable_copy() {
        let registry = SubscriberRegistry::new();
        let (a, _rx_a) = ChannelSubscriber::new();
        registry.register(Arc::new(a)).await;

        let snapshot = registry.enumerate().await;
        let (b, _rx_b) = ChannelSubscriber::new();
        registry.register(Arc::new(b)).await;

        assert_eq!(snapshot.len(), 1);
        assert_eq!(registry.count().await, 2);
    }

    #[tokio::test]
    async fn test_concurrent_register_unregister() {
        let registry = Arc::new(SubscriberRegistry::new());

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let registry = registry.clone();
                tokio::spawn(async move {
                    let (s, _rx) = ChannelSubscriber::new();
                    let id = s.id();
                    registry.register(Arc::new(s)).await;
                    let _ = registry.enumerate().await;
                    registry.unregister(&id).await;
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap();
        }
        assert_eq!(registry.count().await, 0);
    }
}

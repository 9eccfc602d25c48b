//! BroadcastDispatcher - fan-out to every registered subscriber
//!
//! Copies the subscriber set, releases the registry lock, then delivers to each
//! subscriber independently. A subscriber that fails once is unregistered.

use std::sync::Arc;

use super::registry::SubscriberRegistry;
use super::HubMessage;

/// Result of one broadcast pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub delivered: usize,
    pub removed: usize,
}

pub struct BroadcastDispatcher {
    registry: Arc<SubscriberRegistry>,
}

impl BroadcastDispatcher {
    pub fn new(registry: Arc<SubscriberRegistry>) -> Self {
        Self { registry }
    }

    /// Deliver a message to all current subscribers
    ///
    /// Never fails: serialization problems are logged and delivery problems
    /// only remove the failing subscriber.
    pub async fn publish(&self, message: &HubMessage) -> DispatchOutcome {
        let json = match message.to_json() {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize message");
                return DispatchOutcome::default();
            }
        };

        let targets = self.registry.enumerate().await;
        tracing::debug!(
            message_type = %message.kind(),
            client_count = targets.len(),
            "Sending to connected clients"
        );

        let mut outcome = DispatchOutcome::default();
        for subscriber in targets {
            match subscriber.send(&json) {
                Ok(()) => outcome.delivered += 1,
                Err(e) => {
                    let id = subscriber.id();
                    tracing::warn!(connection_id = %id, error = %e, "Failed to send message, dropping subscriber");
                    if self.registry.unregister(&id).await {
                        outcome.removed += 1;
                    }
                }
            }
        }
        outcome
    }
}

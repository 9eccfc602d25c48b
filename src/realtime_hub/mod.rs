//! RealtimeHub - WebSocket Distribution
//!
//! ## Responsibilities
//!
//! - Live viewer registry
//! - Incident broadcasting to dashboards
//! - Wire format of the live feed
//!
//! Wire messages:
//!
//! - `{"type": "bootstrap", "items": [...]}` once per connection
//! - `{"type": "incident", "data": {...}}` for every newly ingested incident

mod dispatcher;
mod registry;
mod subscriber;

pub use dispatcher::{BroadcastDispatcher, DispatchOutcome};
pub use registry::SubscriberRegistry;
pub use subscriber::{ChannelSubscriber, DeliveryError, Subscriber};

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::incident_store::Incident;

/// Hub message types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HubMessage {
    /// Backlog sent once, before any live push
    Bootstrap { items: Vec<Incident> },
    /// A newly ingested incident
    Incident { data: Incident },
}

impl HubMessage {
    pub fn bootstrap(items: Vec<Incident>) -> Self {
        HubMessage::Bootstrap { items }
    }

    pub fn incident(data: Incident) -> Self {
        HubMessage::Incident { data }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            HubMessage::Bootstrap { .. } => "bootstrap",
            HubMessage::Incident { .. } => "incident",
        }
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// RealtimeHub instance
pub struct RealtimeHub {
    registry: Arc<SubscriberRegistry>,
    dispatcher: BroadcastDispatcher,
}

impl RealtimeHub {
    /// Create new RealtimeHub
    pub fn new() -> Self {
        let registry = Arc::new(SubscriberRegistry::new());
        Self {
            dispatcher: BroadcastDispatcher::new(registry.clone()),
            registry,
        }
    }

    /// Register a subscriber for live pushes
    pub async fn register(&self, subscriber: Arc<dyn Subscriber>) {
        self.registry.register(subscriber).await;
    }

    /// Unregister a subscriber (no-op if already gone)
    pub async fn unregister(&self, id: &Uuid) -> bool {
        self.registry.unregister(id).await
    }

    /// Broadcast message to all subscribers
    pub async fn broadcast(&self, message: &HubMessage) -> DispatchOutcome {
        tracing::info!(message_type = %message.kind(), "Broadcasting message to clients");
        self.dispatcher.publish(message).await
    }

    /// Get connected viewer count
    pub async fn viewer_count(&self) -> usize {
        self.registry.count().await
    }
}

impl Default for RealtimeHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn sample() -> Incident {
        Incident {
            id: "0123456789abcdef0123456789abcdef".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            camera_id: "cam-1".to_string(),
            label: "weapon".to_string(),
            confidence: 0.87,
            summary: "knife detected".to_string(),
            frame: None,
            location: Some("Camera cam-1".to_string()),
            metadata: None,
        }
    }

    #[test]
    fn test_incident_wire_format() {
        let value: serde_json::Value =
            serde_json::from_str(&HubMessage::incident(sample()).to_json().unwrap()).unwrap();

        assert_eq!(value["type"], json!("incident"));
        assert_eq!(value["data"]["camera_id"], json!("cam-1"));
        assert_eq!(value["data"]["confidence"], json!(0.87));
        assert_eq!(value["data"]["location"], json!("Camera cam-1"));
        assert_eq!(value["data"]["timestamp"], json!("2024-05-01T12:00:00Z"));
    }

    #[test]
    fn test_bootstrap_wire_format() {
        let value: serde_json::Value = serde_json::from_str(
            &HubMessage::bootstrap(vec![sample(), sample()]).to_json().unwrap(),
        )
        .unwrap();

        assert_eq!(value["type"], json!("bootstrap"));
        assert_eq!(value["items"].as_array().unwrap().len(), 2);
        assert!(value.get("data").is_none());
    }

    #[test]
    fn test_wire_messages_parse_back() {
        let message = HubMessage::bootstrap(Vec::new());
        let parsed: HubMessage = serde_json::from_str(&message.to_json().unwrap()).unwrap();
        assert_eq!(parsed, message);
    }

    #[tokio::test]
    async fn test_hub_broadcast_and_unregister() {
        let hub = RealtimeHub::new();
        let (subscriber, mut rx) = ChannelSubscriber::new();
        let id = subscriber.id();
        hub.register(Arc::new(subscriber)).await;
        assert_eq!(hub.viewer_count().await, 1);

        let outcome = hub.broadcast(&HubMessage::incident(sample())).await;
        assert_eq!(outcome.delivered, 1);
        let payload = rx.recv().await.unwrap();
        assert!(payload.contains("\"type\":\"incident\""));

        assert!(hub.unregister(&id).await);
        assert!(!hub.unregister(&id).await);
        assert_eq!(hub.viewer_count().await, 0);
    }

    #[tokio::test]
    async fn test_hub_drops_disconnected_viewer() {
        let hub = RealtimeHub::new();
        let (subscriber, rx) = ChannelSubscriber::new();
        hub.register(Arc::new(subscriber)).await;
        drop(rx);

        let outcome = hub.broadcast(&HubMessage::incident(sample())).await;
        assert_eq!(outcome, DispatchOutcome { delivered: 0, removed: 1 });
        assert_eq!(hub.viewer_count().await, 0);
    }
}

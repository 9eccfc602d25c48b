//! Subscriber - live delivery target
//!
//! The hub only ever sees this capability. The connection behind it is owned
//! by the transport task; the hub never closes it.

use tokio::sync::mpsc;
use uuid::Uuid;

/// Delivery failure. Any failure means the subscriber is treated as dead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// Connection is gone
    #[error("subscriber closed")]
    Closed,
}

/// Something that can receive serialized hub messages
pub trait Subscriber: Send + Sync {
    /// Stable identity used for registry membership
    fn id(&self) -> Uuid;

    /// Hand one message to the subscriber without waiting on the network
    fn send(&self, payload: &str) -> Result<(), DeliveryError>;
}

/// Subscriber backed by a channel drained by a connection writer task
///
/// Sends never block and never fail while the writer task is alive, so a
/// slow viewer is never mistaken for a dead one.
pub struct ChannelSubscriber {
    id: Uuid,
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelSubscriber {
    /// Create subscriber and the receiving half for the writer task
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let subscriber = Self {
            id: Uuid::new_v4(),
            tx,
        };
        (subscriber, rx)
    }
}

impl Subscriber for ChannelSubscriber {
    fn id(&self) -> Uuid {
        self.id
    }

    fn send(&self, payload: &str) -> Result<(), DeliveryError> {
        self.tx
            .send(payload.to_owned())
            .map_err(|_| DeliveryError::Closed)
    }
}

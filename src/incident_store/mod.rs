//! IncidentStore - Recent Incident Window (Ring Buffer)
//!
//! ## Responsibilities
//!
//! - Hold the most recent incidents in insertion order
//! - Evict the single oldest incident once capacity is exceeded
//! - Provide consistent point-in-time snapshots for history and bootstrap
//!
//! Records are immutable once appended; there is no update or delete API.

mod types;

pub use types::{Confidence, Incident, IncidentDraft, IncidentSubmission};

use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use tokio::sync::RwLock;

/// Default number of retained incidents
pub const DEFAULT_CAPACITY: usize = 200;

/// Ring buffer for incidents
struct IncidentRingBuffer {
    incidents: VecDeque<Incident>,
    capacity: usize,
}

impl IncidentRingBuffer {
    fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            incidents: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Returns the evicted incident, if any
    fn push(&mut self, incident: Incident) -> Option<Incident> {
        let evicted = if self.incidents.len() >= self.capacity {
            self.incidents.pop_front()
        } else {
            None
        };
        self.incidents.push_back(incident);
        evicted
    }

    fn snapshot(&self) -> Vec<Incident> {
        self.incidents.iter().cloned().collect()
    }
}

/// IncidentStore instance
pub struct IncidentStore {
    buffer: RwLock<IncidentRingBuffer>,
    capacity: usize,
}

impl IncidentStore {
    /// Create new IncidentStore (capacity is clamped to at least 1)
    pub fn new(capacity: usize) -> Self {
        let buffer = IncidentRingBuffer::new(capacity);
        Self {
            capacity: buffer.capacity,
            buffer: RwLock::new(buffer),
        }
    }

    /// Append an incident, evicting the oldest one if the window is full
    pub async fn append(&self, incident: Incident) {
        let incident_id = incident.id.clone();
        let evicted = {
            let mut buffer = self.buffer.write().await;
            buffer.push(incident)
        };

        match evicted {
            Some(old) => tracing::debug!(
                incident_id = %incident_id,
                evicted_id = %old.id,
                "Incident appended, oldest evicted"
            ),
            None => tracing::debug!(incident_id = %incident_id, "Incident appended"),
        }
    }

    /// All retained incidents, oldest first
    pub async fn snapshot(&self) -> Vec<Incident> {
        let buffer = self.buffer.read().await;
        buffer.snapshot()
    }

    /// Timestamp of the newest retained incident
    pub async fn latest_timestamp(&self) -> Option<DateTime<Utc>> {
        let buffer = self.buffer.read().await;
        buffer.incidents.back().map(|i| i.timestamp)
    }

    /// Number of retained incidents
    pub async fn count(&self) -> usize {
        let buffer = self.buffer.read().await;
        buffer.incidents.len()
    }

    /// Maximum number of retained incidents
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for IncidentStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

//! IncidentService - Ingestion and Live Subscription
//!
//! ## Responsibilities
//!
//! - Validate detector submissions and assign id/timestamp
//! - Append to the IncidentStore and broadcast through the RealtimeHub
//! - Attach new viewers: bootstrap snapshot first, then registration
//!
//! Ingestion runs under one ordering guard so every viewer receives pushes in
//! store insertion order. Inside it only in-memory work happens; socket writes
//! run in each viewer's own writer task. Subscription never takes the guard: a
//! record committed between the snapshot and registration may show up in both
//! the bootstrap and a push, or in neither.

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::incident_store::{Incident, IncidentDraft, IncidentStore, IncidentSubmission};
use crate::realtime_hub::{HubMessage, RealtimeHub, Subscriber};

/// IncidentService instance
pub struct IncidentService {
    store: Arc<IncidentStore>,
    realtime: Arc<RealtimeHub>,
    ordering: Arc<Mutex<()>>,
}

impl IncidentService {
    pub fn new(store: Arc<IncidentStore>, realtime: Arc<RealtimeHub>) -> Self {
        Self {
            store,
            realtime,
            ordering: Arc::new(Mutex::new(())),
        }
    }

    /// Ingest a detector submission
    ///
    /// Invalid submissions are rejected before anything is stored. Once
    /// validated, append and broadcast run to completion even if the caller
    /// goes away.
    pub async fn ingest(&self, submission: IncidentSubmission) -> Result<Incident> {
        let draft = submission.validate()?;

        let store = self.store.clone();
        let realtime = self.realtime.clone();
        let ordering = self.ordering.clone();
        let task = tokio::spawn(async move {
            let _order = ordering.lock().await;
            commit(&store, &realtime, draft).await
        });

        task.await
            .map_err(|e| Error::Internal(format!("ingest task failed: {}", e)))
    }

    /// Attach a live viewer
    ///
    /// Sends the current backlog as one bootstrap message, then registers the
    /// subscriber. Every incident committed after this returns is pushed.
    /// Returns the number of incidents in the bootstrap.
    pub async fn subscribe(&self, subscriber: Arc<dyn Subscriber>) -> Result<usize> {
        let backlog = self.store.snapshot().await;
        let count = backlog.len();
        let bootstrap = HubMessage::bootstrap(backlog).to_json()?;
        subscriber.send(&bootstrap)?;

        self.realtime.register(subscriber).await;
        Ok(count)
    }

    /// Detach a live viewer (no-op if already removed)
    pub async fn unsubscribe(&self, id: &Uuid) -> bool {
        self.realtime.unregister(id).await
    }

    /// Current window, oldest first
    pub async fn history(&self) -> Vec<Incident> {
        self.store.snapshot().await
    }
}

/// Stamp, append and broadcast. Caller holds the ordering guard.
async fn commit(store: &IncidentStore, realtime: &RealtimeHub, draft: IncidentDraft) -> Incident {
    let now = Utc::now();
    // Keep timestamps non-decreasing even if the wall clock steps back
    let timestamp = match store.latest_timestamp().await {
        Some(last) if last > now => last,
        _ => now,
    };
    let incident = draft.stamp(Uuid::new_v4().simple().to_string(), timestamp);

    store.append(incident.clone()).await;
    let outcome = realtime
        .broadcast(&HubMessage::incident(incident.clone()))
        .await;

    tracing::info!(
        incident_id = %incident.id,
        camera_id = %incident.camera_id,
        label = %incident.label,
        confidence = incident.confidence,
        delivered = outcome.delivered,
        dropped = outcome.removed,
        "Incident ingested"
    );
    incident
}

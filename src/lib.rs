//! Incident Hub Library
//!
//! Ingests incident reports from camera-side detectors and fans them out to
//! live dashboards, keeping a bounded recent window for late joiners.
//!
//! ## Architecture (5 Components)
//!
//! 1. IncidentStore - Recent incidents (ring buffer)
//! 2. SubscriberRegistry - Live viewer set
//! 3. BroadcastDispatcher - Fan-out with dead-viewer removal
//! 4. IncidentService - Ingestion and viewer bootstrap
//! 5. WebAPI - POST /incident, GET /incidents, /ws
//!
//! Registry and dispatcher live under `realtime_hub`.

pub mod error;
pub mod incident_service;
pub mod incident_store;
pub mod models;
pub mod realtime_hub;
pub mod state;
pub mod web_api;

pub use error::{Error, Result};
pub use state::{AppConfig, AppState};

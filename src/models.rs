//! Shared response types

use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_sec: u64,
}

/// Hub status (GET /api/status)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub incident_count: usize,
    pub capacity: usize,
    pub viewer_count: usize,
}

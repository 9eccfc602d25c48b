//! Application state
//!
//! Holds all shared components and state

use crate::error::{Error, Result};
use crate::incident_service::IncidentService;
use crate::incident_store::{IncidentStore, DEFAULT_CAPACITY};
use crate::realtime_hub::RealtimeHub;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

/// Default request body limit (frames arrive base64-encoded)
pub const DEFAULT_MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Number of incidents retained for history/bootstrap
    pub max_incidents: usize,
    /// Request body limit in bytes
    pub max_body_bytes: usize,
    /// Dashboard static files (optional)
    pub static_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_incidents: DEFAULT_CAPACITY,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            static_dir: None,
        }
    }
}

fn parse_var<T: FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{}: invalid value {:?}", key, value))),
    }
}

fn non_zero(key: &str, value: usize) -> Result<usize> {
    if value == 0 {
        return Err(Error::Config(format!("{} must be at least 1", key)));
    }
    Ok(value)
}

impl AppConfig {
    /// Load configuration from process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through a variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT", lookup("PORT"), defaults.port)?,
            max_incidents: non_zero(
                "MAX_INCIDENTS",
                parse_var("MAX_INCIDENTS", lookup("MAX_INCIDENTS"), defaults.max_incidents)?,
            )?,
            max_body_bytes: non_zero(
                "MAX_BODY_BYTES",
                parse_var("MAX_BODY_BYTES", lookup("MAX_BODY_BYTES"), defaults.max_body_bytes)?,
            )?,
            static_dir: lookup("STATIC_DIR")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Application config
    pub config: AppConfig,
    /// IncidentStore (recent window)
    pub store: Arc<IncidentStore>,
    /// RealtimeHub (live viewers)
    pub realtime: Arc<RealtimeHub>,
    /// IncidentService (ingest + subscribe)
    pub incidents: Arc<IncidentService>,
    /// Process start, for uptime
    pub started_at: Instant,
}

impl AppState {
    /// Build all components from config
    pub fn new(config: AppConfig) -> Self {
        let store = Arc::new(IncidentStore::new(config.max_incidents));
        let realtime = Arc::new(RealtimeHub::new());
        let incidents = Arc::new(IncidentService::new(store.clone(), realtime.clone()));

        Self {
            config,
            store,
            realtime,
            incidents,
            started_at: Instant::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.max_incidents, 200);
        assert_eq!(config.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
        assert!(config.static_dir.is_none());
        assert_eq!(config.bind_addr(), "0.0.0.0:8000");
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "9000"),
            ("MAX_INCIDENTS", "50"),
            ("STATIC_DIR", "/srv/dashboard"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:9000");
        assert_eq!(config.max_incidents, 50);
        assert_eq!(config.static_dir, Some(PathBuf::from("/srv/dashboard")));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("PORT", "eighty")])),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("MAX_INCIDENTS", "0")])),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("MAX_BODY_BYTES", "-3")])),
            Err(Error::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_state_uses_configured_capacity() {
        let config = AppConfig {
            max_incidents: 7,
            ..AppConfig::default()
        };
        let state = AppState::new(config);
        assert_eq!(state.store.capacity(), 7);
        assert_eq!(state.realtime.viewer_count().await, 0);
    }
}

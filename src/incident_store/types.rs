//! Incident types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Stored incident with server-assigned id and timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub camera_id: String,
    pub label: String,
    /// Stored as given; range is not enforced here
    pub confidence: f64,
    pub summary: String,
    /// Encoded frame (usually base64 JPEG)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

/// Confidence as posted by a detector
///
/// Numeric strings are coerced, matching what detectors built on lax
/// model layers tend to send.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Confidence {
    Number(f64),
    Text(String),
}

impl Confidence {
    fn to_f64(&self) -> Option<f64> {
        let value = match self {
            Confidence::Number(n) => *n,
            Confidence::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

/// Incident submission from a camera detector (POST /incident body)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IncidentSubmission {
    #[serde(default)]
    pub camera_id: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub confidence: Option<Confidence>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub frame: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

/// Submission that passed validation, waiting for id and timestamp
#[derive(Debug, Clone)]
pub struct IncidentDraft {
    camera_id: String,
    label: String,
    confidence: f64,
    summary: String,
    frame: Option<String>,
    location: Option<String>,
    metadata: Option<Map<String, Value>>,
}

fn required_text(field: &str, value: Option<String>) -> Result<String> {
    let value = value.ok_or_else(|| Error::Validation(format!("{} is required", field)))?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation(format!("{} must not be empty", field)));
    }
    Ok(trimmed.to_string())
}

impl IncidentSubmission {
    /// Validate and normalize required fields
    ///
    /// Required strings are trimmed and must be non-empty. Optional fields
    /// pass through untouched.
    pub fn validate(self) -> Result<IncidentDraft> {
        let camera_id = required_text("camera_id", self.camera_id)?;
        let label = required_text("label", self.label)?;
        let summary = required_text("summary", self.summary)?;
        let confidence = match self.confidence {
            None => return Err(Error::Validation("confidence is required".to_string())),
            Some(c) => c.to_f64().ok_or_else(|| {
                Error::Validation("confidence must be a finite number".to_string())
            })?,
        };

        Ok(IncidentDraft {
            camera_id,
            label,
            confidence,
            summary,
            frame: self.frame,
            location: self.location,
            metadata: self.metadata,
        })
    }
}

impl IncidentDraft {
    /// Assign identity and capture time, producing the immutable record
    pub fn stamp(self, id: String, timestamp: DateTime<Utc>) -> Incident {
        Incident {
            id,
            timestamp,
            camera_id: self.camera_id,
            label: self.label,
            confidence: self.confidence,
            summary: self.summary,
            frame: self.frame,
            location: self.location,
            metadata: self.metadata,
        }
    }
}

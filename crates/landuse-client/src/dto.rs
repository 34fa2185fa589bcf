//! Wire records exchanged with the backend.
//!
//! These mirror the JSON bodies of the REST contract and are converted to the
//! domain types of `landuse-core` at the component boundary.

use landuse_core::error::{LanduseError, Result};
use landuse_core::{
    Job, JobId, JobStatus, Pattern, PatternId, Polygon, Scenario, ScenarioId, SessionId,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Decodes a response body into a wire record.
///
/// Decode failures are transport errors: the request succeeded but the body
/// does not match the contract.
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    Ok(serde_json::from_value(value)?)
}

/// Encodes a request body.
pub fn encode<T: Serialize>(body: &T) -> Result<Value> {
    serde_json::to_value(body)
        .map_err(|e| LanduseError::invalid_argument(format!("Failed to encode request: {e}")))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: SessionId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRecord {
    pub scenario_id: ScenarioId,
    pub session_id: SessionId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl From<ScenarioRecord> for Scenario {
    fn from(record: ScenarioRecord) -> Self {
        Scenario {
            id: record.scenario_id,
            session_id: record.session_id,
            name: record.name,
            description: record.description,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateScenarioRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioCreated {
    pub scenario_id: ScenarioId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternRecord {
    pub pattern_id: PatternId,
    pub session_id: SessionId,
    pub label: String,
    pub wkt: String,
}

impl TryFrom<PatternRecord> for Pattern {
    type Error = LanduseError;

    fn try_from(record: PatternRecord) -> Result<Self> {
        let geometry = Polygon::from_wkt(&record.wkt).map_err(|e| {
            LanduseError::invalid_response(format!(
                "pattern '{}' has unreadable geometry: {e}",
                record.pattern_id
            ))
        })?;
        Ok(Pattern {
            id: record.pattern_id,
            session_id: record.session_id,
            name: record.label,
            geometry,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePatternRequest {
    pub label: String,
    pub wkt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternCreated {
    pub pattern_id: PatternId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WallpaperRequest {
    pub scenario_id: ScenarioId,
    pub target_parcel_wkt: String,
    pub pattern_id: PatternId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillRequest {
    pub scenario_id: ScenarioId,
    pub target_parcel_wkt: String,
    pub lulc_class: String,
}

/// Acknowledgement returned when the backend accepts a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobAck {
    pub job_id: JobId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatusRecord {
    #[serde(default)]
    pub job_id: Option<JobId>,
    pub status: JobStatus,
    #[serde(default)]
    pub name: Option<String>,
}

impl JobStatusRecord {
    pub fn into_job(self, requested: &JobId) -> Job {
        Job {
            id: self.job_id.unwrap_or_else(|| requested.clone()),
            status: self.status,
            name: self.name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParcelTableRequest {
    pub target_parcel_wkt: String,
}

/// Raw LULC statistics; keys are category names or numeric codes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LulcStatsRecord {
    pub lulc_stats: BTreeMap<String, f64>,
}

//! Scenario domain model.

use serde::{Deserialize, Serialize};

use crate::error::{LanduseError, Result};
use crate::id::{ScenarioId, SessionId};

/// A named variant of land-use state within a session.
///
/// Scenarios are immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: ScenarioId,
    pub session_id: SessionId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Input for creating a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewScenario {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewScenario {
    /// Validates the input.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `name` is empty or whitespace.
    pub fn new(name: impl Into<String>, description: Option<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(LanduseError::invalid_argument("scenario name must not be empty"));
        }
        Ok(Self { name, description })
    }
}

//! Scenario creation, listing and lookup.

use landuse_core::error::Result;
use landuse_core::id::ensure_non_empty;
use landuse_core::{IdRegistry, NewScenario, Scenario, ScenarioId, SessionId, Transport};
use std::sync::Arc;
use tracing::{debug, info};

use crate::dto::{self, CreateScenarioRequest, ScenarioCreated, ScenarioRecord};
use crate::routes;

/// Creates, lists and reads named scenarios within a session.
pub struct ScenarioStore {
    transport: Arc<dyn Transport>,
    ids: Arc<IdRegistry>,
}

impl ScenarioStore {
    pub fn new(transport: Arc<dyn Transport>, ids: Arc<IdRegistry>) -> Self {
        Self { transport, ids }
    }

    /// Lists the scenarios of a session.
    ///
    /// Every returned scenario id is recorded as issued.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the backend does not know the session.
    pub async fn list_scenarios(&self, session_id: &SessionId) -> Result<Vec<Scenario>> {
        ensure_non_empty(session_id)?;
        debug!(session_id = %session_id, "Listing scenarios");
        let value = self
            .transport
            .get(&routes::scenarios(session_id))
            .await
            .map_err(|e| e.for_entity("session", session_id.as_str()))?;
        let records: Vec<ScenarioRecord> = dto::decode(value)?;

        Ok(records
            .into_iter()
            .map(|record| {
                self.ids.record(&record.scenario_id);
                self.ids.record(&record.session_id);
                Scenario::from(record)
            })
            .collect())
    }

    /// Looks up a scenario by its global id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown scenario.
    pub async fn get_scenario(&self, scenario_id: &ScenarioId) -> Result<Scenario> {
        ensure_non_empty(scenario_id)?;
        debug!(scenario_id = %scenario_id, "Fetching scenario");
        let value = self
            .transport
            .get(&routes::scenario(scenario_id))
            .await
            .map_err(|e| e.for_entity("scenario", scenario_id.as_str()))?;
        let record: ScenarioRecord = dto::decode(value)?;
        self.ids.record(&record.scenario_id);
        Ok(Scenario::from(record))
    }

    /// Creates a scenario and returns only its new id.
    ///
    /// Use [`ScenarioStore::get_scenario`] to read the record back.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an empty name, before any request is
    /// made, and `NotFound` for an unknown session.
    pub async fn create_scenario(
        &self,
        session_id: &SessionId,
        name: &str,
        description: Option<&str>,
    ) -> Result<ScenarioId> {
        ensure_non_empty(session_id)?;
        let scenario = NewScenario::new(name, description.map(str::to_string))?;

        let body = dto::encode(&CreateScenarioRequest {
            name: scenario.name,
            description: scenario.description,
        })?;
        let value = self
            .transport
            .post(&routes::create_scenario(session_id), Some(body))
            .await
            .map_err(|e| e.for_entity("session", session_id.as_str()))?;
        let created: ScenarioCreated = dto::decode(value)?;

        self.ids.record(&created.scenario_id);
        info!(session_id = %session_id, scenario_id = %created.scenario_id, "Scenario created");
        Ok(created.scenario_id)
    }
}

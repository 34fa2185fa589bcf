//! Wallpapering pattern catalog.

use landuse_core::error::{LanduseError, Result};
use landuse_core::id::ensure_non_empty;
use landuse_core::pattern::validate_pattern_name;
use landuse_core::{Coordinate, IdRegistry, Pattern, PatternId, Polygon, SessionId, Transport};
use std::sync::Arc;
use tracing::{debug, info};

use crate::dto::{self, CreatePatternRequest, PatternCreated, PatternRecord};
use crate::routes;

/// Creates and lists reusable land-use patterns within a session.
pub struct PatternCatalog {
    transport: Arc<dyn Transport>,
    ids: Arc<IdRegistry>,
}

impl PatternCatalog {
    pub fn new(transport: Arc<dyn Transport>, ids: Arc<IdRegistry>) -> Self {
        Self { transport, ids }
    }

    /// Lists the patterns of a session, recording their ids as issued.
    pub async fn list_patterns(&self, session_id: &SessionId) -> Result<Vec<Pattern>> {
        ensure_non_empty(session_id)?;
        debug!(session_id = %session_id, "Listing patterns");
        let value = self
            .transport
            .get(&routes::patterns(session_id))
            .await
            .map_err(|e| e.for_entity("session", session_id.as_str()))?;
        let records: Vec<PatternRecord> = dto::decode(value)?;

        records
            .into_iter()
            .map(|record| {
                let pattern = Pattern::try_from(record)?;
                self.ids.record(&pattern.id);
                Ok(pattern)
            })
            .collect()
    }

    /// Saves a pattern for the session and returns its backend-issued id.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an empty name or a ring with fewer than
    /// three distinct points (checked before any request), and a transport
    /// error if the backend hands back an id it already issued.
    pub async fn create_pattern(
        &self,
        session_id: &SessionId,
        geometry: &[Coordinate],
        name: &str,
    ) -> Result<PatternId> {
        ensure_non_empty(session_id)?;
        validate_pattern_name(name)?;
        let polygon = Polygon::new(geometry.to_vec())?;

        let body = dto::encode(&CreatePatternRequest {
            label: name.to_string(),
            wkt: polygon.to_wkt(),
        })?;
        let value = self
            .transport
            .post(&routes::patterns(session_id), Some(body))
            .await
            .map_err(|e| e.for_entity("session", session_id.as_str()))?;
        let created: PatternCreated = dto::decode(value)?;

        if !self.ids.record(&created.pattern_id) {
            return Err(LanduseError::invalid_response(format!(
                "backend reissued pattern id '{}'",
                created.pattern_id
            )));
        }
        info!(session_id = %session_id, pattern_id = %created.pattern_id, name, "Pattern created");
        Ok(created.pattern_id)
    }
}

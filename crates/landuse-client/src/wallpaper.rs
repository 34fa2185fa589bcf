//! Wallpapering, parcel fill and crop submission.

use landuse_core::error::{LanduseError, Result};
use landuse_core::{
    Coordinate, IdRegistry, JobId, PatternId, Polygon, Route, ScenarioId, Transport,
};
use std::sync::Arc;
use tracing::info;

use crate::dto::{self, FillRequest, JobAck, WallpaperRequest};
use crate::lulc_service::LulcService;
use crate::routes;

/// Submits land-use edits to a scenario as asynchronous jobs.
///
/// Submissions return as soon as the backend accepts the job; use the
/// [`crate::JobTracker`] to follow it.
pub struct WallpaperOperation {
    transport: Arc<dyn Transport>,
    ids: Arc<IdRegistry>,
    lulc: Arc<LulcService>,
}

impl WallpaperOperation {
    pub fn new(transport: Arc<dyn Transport>, ids: Arc<IdRegistry>, lulc: Arc<LulcService>) -> Self {
        Self { transport, ids, lulc }
    }

    /// Stamps a pattern onto a target parcel within a scenario.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument`, without contacting the backend, if the
    /// target has fewer than three distinct points or either id was never
    /// issued to this client.
    pub async fn submit(
        &self,
        target: &[Coordinate],
        pattern_id: &PatternId,
        scenario_id: &ScenarioId,
    ) -> Result<JobId> {
        let parcel = Polygon::new(target.to_vec())?;
        self.ids.ensure_issued(pattern_id)?;
        self.ids.ensure_issued(scenario_id)?;

        let body = dto::encode(&WallpaperRequest {
            scenario_id: scenario_id.clone(),
            target_parcel_wkt: parcel.to_wkt(),
            pattern_id: pattern_id.clone(),
        })?;
        let job_id = self.accept(&routes::wallpaper(), Some(body)).await?;
        info!(
            job_id = %job_id,
            scenario_id = %scenario_id,
            pattern_id = %pattern_id,
            "Wallpaper job submitted"
        );
        Ok(job_id)
    }

    /// Paints a whole parcel with a single LULC category.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a bad target, an unknown scenario id or a
    /// category missing from the LULC registry. The registry may be loaded
    /// from the backend first; the fill itself is not sent when validation
    /// fails.
    pub async fn fill(
        &self,
        target: &[Coordinate],
        lulc_class: &str,
        scenario_id: &ScenarioId,
    ) -> Result<JobId> {
        let parcel = Polygon::new(target.to_vec())?;
        self.ids.ensure_issued(scenario_id)?;

        let registry = self.lulc.registry().await?;
        if !registry.contains_name(lulc_class) {
            return Err(LanduseError::invalid_argument(format!(
                "'{}' is not a LULC category",
                lulc_class
            )));
        }

        let body = dto::encode(&FillRequest {
            scenario_id: scenario_id.clone(),
            target_parcel_wkt: parcel.to_wkt(),
            lulc_class: lulc_class.to_string(),
        })?;
        let job_id = self.accept(&routes::lulc_fill(), Some(body)).await?;
        info!(job_id = %job_id, scenario_id = %scenario_id, lulc_class, "Fill job submitted");
        Ok(job_id)
    }

    /// Crops the scenario's land use to its study area.
    ///
    /// The backend knows the study area; the result is the scenario-wide
    /// LULC table.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument`, without contacting the backend, if the
    /// scenario id was never issued to this client.
    pub async fn crop(&self, scenario_id: &ScenarioId) -> Result<JobId> {
        self.ids.ensure_issued(scenario_id)?;
        let job_id = self
            .accept(&routes::lulc_crop(scenario_id), None)
            .await
            .map_err(|e| e.for_entity("scenario", scenario_id.as_str()))?;
        info!(job_id = %job_id, scenario_id = %scenario_id, "Crop job submitted");
        Ok(job_id)
    }

    async fn accept(&self, route: &Route, body: Option<serde_json::Value>) -> Result<JobId> {
        let value = self.transport.post(route, body).await?;
        let ack: JobAck = dto::decode(value)?;
        Ok(ack.job_id)
    }
}

//! LULC code registry and table queries.

use landuse_core::error::{LanduseError, Result};
use landuse_core::{Coordinate, LulcCode, LulcRegistry, LulcTable, Polygon, Transport};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::dto::{self, LulcStatsRecord, ParcelTableRequest};
use crate::routes;

/// Serves the LULC code registry and baseline parcel tables.
///
/// The registry is fetched once and cached for the lifetime of the service;
/// a failed fetch is not cached, so the next call tries again.
pub struct LulcService {
    transport: Arc<dyn Transport>,
    registry: OnceCell<Arc<LulcRegistry>>,
}

impl LulcService {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            registry: OnceCell::new(),
        }
    }

    /// Returns the code registry, loading it on first use.
    pub async fn registry(&self) -> Result<Arc<LulcRegistry>> {
        self.registry
            .get_or_try_init(|| async {
                debug!("Loading LULC codes");
                let value = self.transport.get(&routes::lulc_codes()).await?;
                let entries: Vec<LulcCode> = dto::decode(value)?;
                let registry = LulcRegistry::from_entries(entries).map_err(|e| {
                    LanduseError::invalid_response(format!(
                        "backend served an inconsistent LULC registry: {e}"
                    ))
                })?;
                info!(codes = registry.len(), "LULC codes loaded");
                Ok::<_, LanduseError>(Arc::new(registry))
            })
            .await
            .cloned()
    }

    /// Returns the code → name mapping.
    pub async fn codes(&self) -> Result<Arc<LulcRegistry>> {
        self.registry().await
    }

    /// Fetches the baseline table for a parcel that has not been wallpapered.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a ring with fewer than three distinct
    /// points (before any request), and an `InvalidResponse` transport error
    /// if the backend reports categories outside the registry.
    pub async fn table_for_parcel(&self, geometry: &[Coordinate]) -> Result<LulcTable> {
        let parcel = Polygon::new(geometry.to_vec())?;
        let registry = self.registry().await?;

        let body = dto::encode(&ParcelTableRequest {
            target_parcel_wkt: parcel.to_wkt(),
        })?;
        let value = self.transport.post(&routes::lulc_table(), Some(body)).await?;
        table_from_response(value, &registry)
    }
}

/// Decodes `{lulc_stats: {...}}` into a table checked against the registry.
pub(crate) fn table_from_response(value: Value, registry: &LulcRegistry) -> Result<LulcTable> {
    let record: LulcStatsRecord = dto::decode(value)?;
    let table = LulcTable::from_raw(record.lulc_stats, registry).inspect_err(|e| {
        warn!(error = %e, "Backend returned an invalid LULC table");
    })?;
    table.validate(registry)?;
    Ok(table)
}

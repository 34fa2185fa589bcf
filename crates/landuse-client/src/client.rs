//! Facade wiring every component onto one transport.

use landuse_core::error::Result;
use landuse_core::{ClientConfig, IdRegistry, Transport};
use std::sync::Arc;

use crate::http_transport::ReqwestTransport;
use crate::job_tracker::{JobTracker, PollPolicy};
use crate::lulc_service::LulcService;
use crate::pattern_catalog::PatternCatalog;
use crate::scenario_store::ScenarioStore;
use crate::session_manager::SessionManager;
use crate::wallpaper::WallpaperOperation;

/// One client instance: a transport, the ids it has been issued and the
/// components built on them.
///
/// Components share the id registry, so a scenario listed through
/// [`LanduseClient::scenarios`] is accepted by [`LanduseClient::wallpaper`].
pub struct LanduseClient {
    config: ClientConfig,
    ids: Arc<IdRegistry>,
    sessions: SessionManager,
    scenarios: ScenarioStore,
    patterns: PatternCatalog,
    wallpaper: WallpaperOperation,
    jobs: JobTracker,
    lulc: Arc<LulcService>,
}

impl LanduseClient {
    /// Builds a client talking HTTP to `config.base_url`.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new(&config)?);
        Self::with_transport(config, transport)
    }

    /// Builds a client on an arbitrary transport.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;
        let ids = Arc::new(IdRegistry::new());
        let lulc = Arc::new(LulcService::new(Arc::clone(&transport)));

        Ok(Self {
            sessions: SessionManager::new(Arc::clone(&transport), Arc::clone(&ids)),
            scenarios: ScenarioStore::new(Arc::clone(&transport), Arc::clone(&ids)),
            patterns: PatternCatalog::new(Arc::clone(&transport), Arc::clone(&ids)),
            wallpaper: WallpaperOperation::new(
                Arc::clone(&transport),
                Arc::clone(&ids),
                Arc::clone(&lulc),
            ),
            jobs: JobTracker::new(transport, Arc::clone(&lulc)),
            lulc,
            ids,
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Poll policy derived from the configuration.
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy::from_config(&self.config)
    }

    pub fn ids(&self) -> &IdRegistry {
        &self.ids
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn scenarios(&self) -> &ScenarioStore {
        &self.scenarios
    }

    pub fn patterns(&self) -> &PatternCatalog {
        &self.patterns
    }

    pub fn wallpaper(&self) -> &WallpaperOperation {
        &self.wallpaper
    }

    pub fn jobs(&self) -> &JobTracker {
        &self.jobs
    }

    pub fn lulc(&self) -> &LulcService {
        &self.lulc
    }
}

pub mod geometry;
pub mod job;
pub mod lulc;
pub mod pattern;
pub mod scenario;
pub mod session;

use anyhow::{Context as _, Result};
use landuse_client::{ConfigService, InMemoryBackend, LanduseClient};
use landuse_core::{Polygon, Transport};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::info;

use crate::GlobalArgs;

const DEMO_SESSION: &str = "demo";
const DEMO_SCENARIO: &str = "baseline";
const DEMO_PATTERN: &str = "suburb";
const DEMO_WORKER_TICK: Duration = Duration::from_millis(200);

/// Everything a command needs: the client and, offline, the demo worker.
pub struct Context {
    pub client: LanduseClient,
    worker: Option<JoinHandle<()>>,
}

impl Context {
    pub async fn connect(args: &GlobalArgs) -> Result<Self> {
        let service = match &args.config {
            Some(path) => ConfigService::with_path(path),
            None => ConfigService::new(),
        };
        let mut config = service.load().context("Failed to load configuration")?;
        if let Some(url) = &args.base_url {
            config.base_url = url.clone();
        }

        if !args.offline {
            let client = LanduseClient::new(config).context("Failed to create client")?;
            return Ok(Self { client, worker: None });
        }

        let backend = Arc::new(InMemoryBackend::new());
        seed_demo(&backend).await?;
        let worker = backend.spawn_worker(DEMO_WORKER_TICK);
        // The demo worker runs a job to completion in two ticks.
        config.poll_interval_ms = DEMO_WORKER_TICK.as_millis() as u64;
        info!(
            session = DEMO_SESSION,
            scenario = DEMO_SCENARIO,
            pattern = DEMO_PATTERN,
            "Using in-memory demo backend"
        );

        let transport: Arc<dyn Transport> = backend;
        let client = LanduseClient::with_transport(config, transport)?;
        Ok(Self {
            client,
            worker: Some(worker),
        })
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.abort();
        }
    }
}

async fn seed_demo(backend: &InMemoryBackend) -> Result<()> {
    let stencil = Polygon::from_pairs(&[(0.0, 0.0), (0.0, 4.0), (4.0, 4.0), (4.0, 0.0)])?;
    backend
        .insert_scenario(DEMO_SESSION, DEMO_SCENARIO, "Baseline", Some("Demo scenario"))
        .await;
    backend
        .insert_pattern(DEMO_SESSION, DEMO_PATTERN, "Suburb", &stencil)
        .await;
    Ok(())
}

/// Prints `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

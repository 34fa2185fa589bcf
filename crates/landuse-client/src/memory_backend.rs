//! In-memory reference backend.
//!
//! [`InMemoryBackend`] implements the whole REST contract behind the
//! [`Transport`] trait without any network. It is used by the test suites and
//! by the CLI's `--offline` mode.
//!
//! Jobs only change status when the backend does work: call
//! [`InMemoryBackend::advance_job`], [`InMemoryBackend::complete_all`] or run
//! [`InMemoryBackend::spawn_worker`]. Reading a status never changes it.
//!
//! Baseline tables are derived deterministically from parcel area and
//! location and are reported keyed by numeric LULC code, the way the stats
//! worker reports them.

use async_trait::async_trait;
use landuse_core::error::{LanduseError, Result};
use landuse_core::{
    Coordinate, IdRegistry, JobId, JobStatus, LulcRegistry, LulcTable, PatternId, Polygon, Route,
    ScenarioId, SessionId, Transport,
};
use serde_json::{Value, json};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::dto::{
    self, CreatePatternRequest, CreateScenarioRequest, FillRequest, ParcelTableRequest,
    PatternRecord, ScenarioRecord, WallpaperRequest,
};

/// Relative weights of the built-in categories, by code.
const BASE_MIX: [(u16, f64); 5] = [(41, 0.30), (71, 0.20), (22, 0.25), (24, 0.15), (82, 0.10)];

const CROP_JOB: &str = "lulc_crop";

#[derive(Debug, Clone)]
struct JobEntry {
    name: &'static str,
    scenario_id: ScenarioId,
    status: JobStatus,
    /// Every status the job has had, oldest first.
    history: Vec<JobStatus>,
    /// Table published when the job succeeds.
    outcome: LulcTable,
}

impl JobEntry {
    /// Applies `next` if the lifecycle allows it.
    fn transition(&mut self, next: JobStatus) -> bool {
        if !self.status.can_transition_to(next) {
            return false;
        }
        self.status = next;
        self.history.push(next);
        true
    }
}

/// The status a working backend moves a pending job to next.
fn successor(status: JobStatus) -> Option<JobStatus> {
    match status {
        JobStatus::Queued => Some(JobStatus::Running),
        JobStatus::Running => Some(JobStatus::Succeeded),
        JobStatus::Succeeded | JobStatus::Failed => None,
    }
}

#[derive(Debug, Default)]
struct BackendState {
    sessions: Vec<SessionId>,
    scenarios: Vec<ScenarioRecord>,
    patterns: Vec<PatternRecord>,
    jobs: HashMap<JobId, JobEntry>,
    job_order: Vec<JobId>,
}

impl BackendState {
    fn has_session(&self, id: &SessionId) -> bool {
        self.sessions.contains(id)
    }

    fn scenario(&self, id: &ScenarioId) -> Option<&ScenarioRecord> {
        self.scenarios.iter().find(|s| &s.scenario_id == id)
    }

    fn pattern(&self, id: &PatternId) -> Option<&PatternRecord> {
        self.patterns.iter().find(|p| &p.pattern_id == id)
    }
}

/// A backend living entirely in memory.
pub struct InMemoryBackend {
    state: RwLock<BackendState>,
    ids: IdRegistry,
    codes: LulcRegistry,
    requests: AtomicUsize,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBackend {
    /// Creates an empty backend serving the built-in LULC registry.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(BackendState::default()),
            ids: IdRegistry::new(),
            codes: LulcRegistry::builtin(),
            requests: AtomicUsize::new(0),
        }
    }

    /// Number of requests received so far.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    // ============================================================================
    // Seeding helpers
    // ============================================================================

    /// Registers a session with a fixed id.
    pub async fn insert_session(&self, id: impl Into<SessionId>) -> SessionId {
        let id = id.into();
        let mut state = self.state.write().await;
        if !state.has_session(&id) {
            state.sessions.push(id.clone());
        }
        id
    }

    /// Registers a scenario with a fixed id, creating its session if needed.
    pub async fn insert_scenario(
        &self,
        session_id: impl Into<SessionId>,
        id: impl Into<ScenarioId>,
        name: &str,
        description: Option<&str>,
    ) -> ScenarioId {
        let session_id = self.insert_session(session_id).await;
        let id = id.into();
        let mut state = self.state.write().await;
        state.scenarios.push(ScenarioRecord {
            scenario_id: id.clone(),
            session_id,
            name: name.to_string(),
            description: description.map(str::to_string),
        });
        id
    }

    /// Registers a pattern with a fixed id, creating its session if needed.
    pub async fn insert_pattern(
        &self,
        session_id: impl Into<SessionId>,
        id: impl Into<PatternId>,
        name: &str,
        geometry: &Polygon,
    ) -> PatternId {
        let session_id = self.insert_session(session_id).await;
        let id = id.into();
        let mut state = self.state.write().await;
        state.patterns.push(PatternRecord {
            pattern_id: id.clone(),
            session_id,
            label: name.to_string(),
            wkt: geometry.to_wkt(),
        });
        id
    }

    // ============================================================================
    // Job processing
    // ============================================================================

    /// Moves a job one step along its lifecycle.
    ///
    /// Returns the new status, or `None` if the job is unknown or already
    /// terminal.
    pub async fn advance_job(&self, id: &JobId) -> Option<JobStatus> {
        let mut state = self.state.write().await;
        let job = state.jobs.get_mut(id)?;
        let from = job.status;
        let next = successor(from)?;
        if !job.transition(next) {
            return None;
        }
        debug!(job_id = %id, from = %from, to = %next, "Job advanced");
        Some(next)
    }

    /// Marks a pending job as failed. Returns `false` if it was unknown or
    /// already terminal.
    pub async fn fail_job(&self, id: &JobId) -> bool {
        let mut state = self.state.write().await;
        state
            .jobs
            .get_mut(id)
            .is_some_and(|job| job.transition(JobStatus::Failed))
    }

    /// Runs every pending job through its remaining steps to success.
    /// Returns how many were completed.
    pub async fn complete_all(&self) -> usize {
        let mut state = self.state.write().await;
        let mut completed = 0;
        for job in state.jobs.values_mut() {
            if !job.status.is_pending() {
                continue;
            }
            while let Some(next) = successor(job.status) {
                if !job.transition(next) {
                    break;
                }
            }
            completed += 1;
        }
        completed
    }

    /// Statuses a job has gone through, oldest first.
    pub async fn job_history(&self, id: &JobId) -> Option<Vec<JobStatus>> {
        let state = self.state.read().await;
        state.jobs.get(id).map(|job| job.history.clone())
    }

    /// Spawns a worker that advances the oldest pending job every `tick`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn_worker(self: &Arc<Self>, tick: Duration) -> JoinHandle<()> {
        let backend = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(tick).await;
                let next = {
                    let state = backend.state.read().await;
                    state
                        .job_order
                        .iter()
                        .find(|id| state.jobs.get(*id).is_some_and(|j| j.status.is_pending()))
                        .cloned()
                };
                if let Some(id) = next {
                    backend.advance_job(&id).await;
                }
            }
        })
    }

    // ============================================================================
    // Request handling
    // ============================================================================

    async fn handle(&self, method: &str, route: &Route, body: Option<Value>) -> Result<Value> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let path = route.to_string();
        let path = path.as_str();
        debug!(method, path, "In-memory backend request");

        let segments: Vec<&str> = route.segments().collect();

        match (method, segments.as_slice()) {
            ("POST", ["users"]) => self.create_session().await,
            ("GET", ["session", id]) => self.get_session(id).await,
            ("GET", ["scenarios", session_id]) => self.list_scenarios(session_id).await,
            ("GET", ["scenario", id]) => self.get_scenario(id).await,
            ("POST", ["scenario", session_id]) => {
                self.create_scenario(session_id, required(body, path)?).await
            }
            ("GET", ["pattern", session_id]) => self.list_patterns(session_id).await,
            ("POST", ["pattern", session_id]) => {
                self.create_pattern(session_id, required(body, path)?).await
            }
            ("POST", ["wallpaper"]) => self.wallpaper(required(body, path)?).await,
            ("POST", ["lulc_fill"]) => self.fill(required(body, path)?).await,
            ("POST", ["lulc_crop", scenario_id]) => self.crop(scenario_id).await,
            ("GET", ["jobs"]) => self.list_jobs().await,
            ("GET", ["job", id]) => self.job_status(id).await,
            ("GET", ["job", id, "result"]) => self.job_result(id).await,
            ("GET", ["lulc_codes"]) => Ok(serde_json::to_value(self.codes.entries())?),
            ("POST", ["lulc_table"]) => self.parcel_table(required(body, path)?),
            _ => Err(LanduseError::not_found("route", format!("{method} {path}"))),
        }
    }

    async fn create_session(&self) -> Result<Value> {
        let id: SessionId = self.ids.allocate();
        self.state.write().await.sessions.push(id.clone());
        info!(session_id = %id, "Session created");
        Ok(json!({ "session_id": id }))
    }

    async fn get_session(&self, id: &str) -> Result<Value> {
        let id = SessionId::new(id);
        if !self.state.read().await.has_session(&id) {
            return Err(LanduseError::not_found("session", id.into_inner()));
        }
        Ok(json!({ "session_id": id }))
    }

    async fn list_scenarios(&self, session_id: &str) -> Result<Value> {
        let session_id = SessionId::new(session_id);
        let state = self.state.read().await;
        if !state.has_session(&session_id) {
            return Err(LanduseError::not_found("session", session_id.into_inner()));
        }
        let scenarios: Vec<&ScenarioRecord> = state
            .scenarios
            .iter()
            .filter(|s| s.session_id == session_id)
            .collect();
        Ok(serde_json::to_value(scenarios)?)
    }

    async fn get_scenario(&self, id: &str) -> Result<Value> {
        let id = ScenarioId::new(id);
        let state = self.state.read().await;
        let scenario = state
            .scenario(&id)
            .ok_or_else(|| LanduseError::not_found("scenario", id.as_str()))?;
        Ok(serde_json::to_value(scenario)?)
    }

    async fn create_scenario(&self, session_id: &str, body: Value) -> Result<Value> {
        let request: CreateScenarioRequest = dto::decode(body).map_err(unprocessable)?;
        if request.name.trim().is_empty() {
            return Err(LanduseError::invalid_argument("scenario name must not be empty"));
        }
        let session_id = SessionId::new(session_id);
        let mut state = self.state.write().await;
        if !state.has_session(&session_id) {
            return Err(LanduseError::not_found("session", session_id.into_inner()));
        }
        let id: ScenarioId = self.ids.allocate();
        state.scenarios.push(ScenarioRecord {
            scenario_id: id.clone(),
            session_id,
            name: request.name,
            description: request.description,
        });
        Ok(json!({ "scenario_id": id }))
    }

    async fn list_patterns(&self, session_id: &str) -> Result<Value> {
        let session_id = SessionId::new(session_id);
        let state = self.state.read().await;
        if !state.has_session(&session_id) {
            return Err(LanduseError::not_found("session", session_id.into_inner()));
        }
        let patterns: Vec<&PatternRecord> = state
            .patterns
            .iter()
            .filter(|p| p.session_id == session_id)
            .collect();
        Ok(serde_json::to_value(patterns)?)
    }

    async fn create_pattern(&self, session_id: &str, body: Value) -> Result<Value> {
        let request: CreatePatternRequest = dto::decode(body).map_err(unprocessable)?;
        let geometry = Polygon::from_wkt(&request.wkt)?;
        let session_id = SessionId::new(session_id);
        let mut state = self.state.write().await;
        if !state.has_session(&session_id) {
            return Err(LanduseError::not_found("session", session_id.into_inner()));
        }
        let id: PatternId = self.ids.allocate();
        state.patterns.push(PatternRecord {
            pattern_id: id.clone(),
            session_id,
            label: request.label,
            wkt: geometry.to_wkt(),
        });
        Ok(json!({ "pattern_id": id }))
    }

    async fn wallpaper(&self, body: Value) -> Result<Value> {
        let request: WallpaperRequest = dto::decode(body).map_err(unprocessable)?;
        let target = Polygon::from_wkt(&request.target_parcel_wkt)?;
        let mut state = self.state.write().await;
        if state.scenario(&request.scenario_id).is_none() {
            return Err(LanduseError::not_found("scenario", request.scenario_id.into_inner()));
        }
        let pattern = state
            .pattern(&request.pattern_id)
            .ok_or_else(|| LanduseError::not_found("pattern", request.pattern_id.as_str()))?;
        let stencil = Polygon::from_wkt(&pattern.wkt)?;

        // The pattern's land-use mix is stretched over the whole parcel.
        let outcome = self.named_table(&mix_for(&stencil), target.area());
        Ok(self.enqueue(&mut state, "wallpaper", request.scenario_id, outcome))
    }

    async fn fill(&self, body: Value) -> Result<Value> {
        let request: FillRequest = dto::decode(body).map_err(unprocessable)?;
        let target = Polygon::from_wkt(&request.target_parcel_wkt)?;
        if !self.codes.contains_name(&request.lulc_class) {
            return Err(LanduseError::invalid_argument(format!(
                "unknown LULC class '{}'",
                request.lulc_class
            )));
        }
        let mut state = self.state.write().await;
        if state.scenario(&request.scenario_id).is_none() {
            return Err(LanduseError::not_found("scenario", request.scenario_id.into_inner()));
        }
        let mut outcome = LulcTable::new();
        outcome.insert(request.lulc_class, target.area());
        Ok(self.enqueue(&mut state, "lulc_fill", request.scenario_id, outcome))
    }

    /// The crop result is the scenario's edited land use: the sum of every
    /// succeeded edit of that scenario at submission time.
    async fn crop(&self, scenario_id: &str) -> Result<Value> {
        let scenario_id = ScenarioId::new(scenario_id);
        let mut state = self.state.write().await;
        if state.scenario(&scenario_id).is_none() {
            return Err(LanduseError::not_found("scenario", scenario_id.into_inner()));
        }
        let mut outcome = LulcTable::new();
        for job in state.jobs.values().filter(|job| {
            job.scenario_id == scenario_id
                && job.name != CROP_JOB
                && job.status == JobStatus::Succeeded
        }) {
            for category in job.outcome.categories() {
                let value = job.outcome.get(category).unwrap_or_default();
                let sum = outcome.get(category).unwrap_or_default() + value;
                outcome.insert(category, sum);
            }
        }
        Ok(self.enqueue(&mut state, CROP_JOB, scenario_id, outcome))
    }

    async fn list_jobs(&self) -> Result<Value> {
        let state = self.state.read().await;
        let jobs: Vec<Value> = state
            .job_order
            .iter()
            .filter_map(|id| {
                state.jobs.get(id).map(
                    |job| json!({ "job_id": id, "status": job.status, "name": job.name }),
                )
            })
            .collect();
        Ok(Value::Array(jobs))
    }

    fn enqueue(
        &self,
        state: &mut BackendState,
        name: &'static str,
        scenario_id: ScenarioId,
        outcome: LulcTable,
    ) -> Value {
        let id: JobId = self.ids.allocate();
        state.jobs.insert(
            id.clone(),
            JobEntry {
                name,
                scenario_id,
                status: JobStatus::Queued,
                history: vec![JobStatus::Queued],
                outcome,
            },
        );
        state.job_order.push(id.clone());
        info!(job_id = %id, job = name, "Job queued");
        json!({ "job_id": id })
    }

    async fn job_status(&self, id: &str) -> Result<Value> {
        let id = JobId::new(id);
        let state = self.state.read().await;
        let job = state
            .jobs
            .get(&id)
            .ok_or_else(|| LanduseError::not_found("job", id.as_str()))?;
        Ok(json!({ "job_id": id, "status": job.status, "name": job.name }))
    }

    async fn job_result(&self, id: &str) -> Result<Value> {
        let id = JobId::new(id);
        let state = self.state.read().await;
        let job = state
            .jobs
            .get(&id)
            .ok_or_else(|| LanduseError::not_found("job", id.as_str()))?;
        if job.status != JobStatus::Succeeded {
            return Err(LanduseError::precondition_failed(format!(
                "job '{}' is {}",
                id, job.status
            )));
        }
        Ok(json!({ "lulc_stats": job.outcome }))
    }

    fn parcel_table(&self, body: Value) -> Result<Value> {
        let request: ParcelTableRequest = dto::decode(body).map_err(unprocessable)?;
        let parcel = Polygon::from_wkt(&request.target_parcel_wkt)?;
        let area = parcel.area();
        let stats: BTreeMap<String, f64> = mix_for(&parcel)
            .into_iter()
            .map(|(code, share)| (code.to_string(), share * area))
            .collect();
        Ok(json!({ "lulc_stats": stats }))
    }

    fn named_table(&self, mix: &[(u16, f64)], area: f64) -> LulcTable {
        let mut table = LulcTable::new();
        for (code, share) in mix {
            if let Some(name) = self.codes.name(*code) {
                table.insert(name, share * area);
            }
        }
        table
    }
}

#[async_trait]
impl Transport for InMemoryBackend {
    async fn get(&self, route: &Route) -> Result<Value> {
        self.handle("GET", route, None).await
    }

    async fn post(&self, route: &Route, body: Option<Value>) -> Result<Value> {
        self.handle("POST", route, body).await
    }
}

/// Land-use mix under a polygon.
///
/// The base mix is rotated by the cell containing the polygon's vertex
/// centroid, so different locations report different tables.
fn mix_for(polygon: &Polygon) -> Vec<(u16, f64)> {
    let centroid = vertex_centroid(polygon.ring());
    let cell = (centroid.x.floor() as i64).wrapping_add(centroid.y.floor() as i64);
    let shift = cell.rem_euclid(BASE_MIX.len() as i64) as usize;
    let codes = BASE_MIX.map(|(code, _)| code);
    BASE_MIX
        .iter()
        .enumerate()
        .map(|(i, (_, share))| (codes[(i + shift) % codes.len()], *share))
        .collect()
}

fn vertex_centroid(ring: &[Coordinate]) -> Coordinate {
    let n = ring.len().max(1) as f64;
    let (sx, sy) = ring
        .iter()
        .fold((0.0, 0.0), |(sx, sy), c| (sx + c.x, sy + c.y));
    Coordinate::new(sx / n, sy / n)
}

fn required(body: Option<Value>, path: &str) -> Result<Value> {
    body.ok_or_else(|| LanduseError::invalid_argument(format!("{path} requires a request body")))
}

/// A body that does not match the request schema is rejected like a 422.
fn unprocessable(err: LanduseError) -> LanduseError {
    LanduseError::invalid_argument(format!("malformed request body: {err}"))
}

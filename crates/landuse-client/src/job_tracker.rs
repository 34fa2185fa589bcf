//! Job status polling and result retrieval.

use landuse_core::error::{LanduseError, Result};
use landuse_core::id::ensure_non_empty;
use landuse_core::{ClientConfig, Job, JobId, JobStatus, LulcTable, Transport};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::dto::{self, JobStatusRecord};
use crate::lulc_service::{LulcService, table_from_response};
use crate::routes;

/// How a caller-driven wait polls a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between two status reads.
    pub interval: Duration,
    /// Status reads before giving up.
    pub max_attempts: u32,
}

impl PollPolicy {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.poll_interval(), config.max_poll_attempts)
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::from_config(&ClientConfig::default())
    }
}

/// Observes backend jobs.
///
/// The tracker never changes a job; it only reads status and, once a job has
/// succeeded, its LULC table. There is no cancellation: a caller stops a wait
/// by no longer polling.
pub struct JobTracker {
    transport: Arc<dyn Transport>,
    lulc: Arc<LulcService>,
}

impl JobTracker {
    pub fn new(transport: Arc<dyn Transport>, lulc: Arc<LulcService>) -> Self {
        Self { transport, lulc }
    }

    /// Reads the current job snapshot.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown job.
    pub async fn job(&self, job_id: &JobId) -> Result<Job> {
        ensure_non_empty(job_id)?;
        let value = self
            .transport
            .get(&routes::job(job_id))
            .await
            .map_err(|e| e.for_entity("job", job_id.as_str()))?;
        let record: JobStatusRecord = dto::decode(value)?;
        let job = record.into_job(job_id);
        debug!(job_id = %job_id, status = %job.status, "Job status read");
        Ok(job)
    }

    /// Lists the jobs known to the backend, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidResponse` transport error if a listed job has no id.
    pub async fn list(&self) -> Result<Vec<Job>> {
        let value = self.transport.get(&routes::jobs()).await?;
        let records: Vec<JobStatusRecord> = dto::decode(value)?;
        records
            .into_iter()
            .map(|record| {
                let id = record.job_id.clone().ok_or_else(|| {
                    LanduseError::invalid_response("job listing entry without job_id")
                })?;
                Ok(record.into_job(&id))
            })
            .collect()
    }

    /// Reads the current status. Idempotent.
    pub async fn status(&self, job_id: &JobId) -> Result<JobStatus> {
        Ok(self.job(job_id).await?.status)
    }

    /// Returns the LULC table produced by a succeeded job.
    ///
    /// # Errors
    ///
    /// Returns `PreconditionFailed` if the job is queued, running or failed;
    /// the result endpoint is not called in that case.
    pub async fn result(&self, job_id: &JobId) -> Result<LulcTable> {
        let status = self.status(job_id).await?;
        if status != JobStatus::Succeeded {
            return Err(LanduseError::precondition_failed(format!(
                "job '{}' is {}, result is only available once it has succeeded",
                job_id, status
            )));
        }

        let registry = self.lulc.registry().await?;
        let value = self
            .transport
            .get(&routes::job_result(job_id))
            .await
            .map_err(|e| e.for_entity("job", job_id.as_str()))?;
        table_from_response(value, &registry)
    }

    /// Polls until the job reaches a terminal status and returns it.
    ///
    /// A failed status read is returned immediately and never retried.
    ///
    /// # Errors
    ///
    /// Returns `PollLimitExceeded` if the job is still pending after
    /// `policy.max_attempts` reads.
    pub async fn wait(&self, job_id: &JobId, policy: PollPolicy) -> Result<JobStatus> {
        let attempts = policy.max_attempts.max(1);
        for attempt in 1..=attempts {
            let status = self.status(job_id).await?;
            if status.is_terminal() {
                info!(job_id = %job_id, status = %status, attempt, "Job finished");
                return Ok(status);
            }
            if attempt < attempts {
                tokio::time::sleep(policy.interval).await;
            }
        }

        warn!(job_id = %job_id, attempts, "Gave up waiting for job");
        Err(LanduseError::PollLimitExceeded {
            job_id: job_id.to_string(),
            attempts,
        })
    }

    /// Waits for the job and returns its table if it succeeded.
    ///
    /// # Errors
    ///
    /// Returns `PreconditionFailed` if the job failed, plus any error of
    /// [`JobTracker::wait`].
    pub async fn wait_for_result(&self, job_id: &JobId, policy: PollPolicy) -> Result<LulcTable> {
        match self.wait(job_id, policy).await? {
            JobStatus::Succeeded => self.result(job_id).await,
            status => Err(LanduseError::precondition_failed(format!(
                "job '{}' finished as {}",
                job_id, status
            ))),
        }
    }
}

//! Job domain model.
//!
//! Jobs are created by the backend when work is submitted and only the
//! backend moves them through their lifecycle:
//!
//! ```text
//! queued -> running -> succeeded
//!                   \-> failed
//! ```

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::id::JobId;

/// Lifecycle status of an asynchronous job.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum JobStatus {
    /// Accepted but not started.
    #[serde(alias = "pending")]
    #[strum(to_string = "queued", serialize = "pending")]
    Queued,
    /// Being worked on.
    Running,
    /// Finished; a result is available.
    #[serde(alias = "success")]
    #[strum(to_string = "succeeded", serialize = "success")]
    Succeeded,
    /// Finished without a result.
    Failed,
}

impl JobStatus {
    /// Whether the job has finished, successfully or not.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    /// Whether the job is still queued or running.
    pub fn is_pending(self) -> bool {
        !self.is_terminal()
    }

    /// Whether moving from `self` to `next` is a legal lifecycle transition.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (Self::Queued, Self::Running)
                | (Self::Queued, Self::Failed)
                | (Self::Running, Self::Succeeded)
                | (Self::Running, Self::Failed)
        )
    }
}

/// A snapshot of a job as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub status: JobStatus,
    /// Kind of work, e.g. `wallpaper` or `lulc_fill`, when reported.
    #[serde(default)]
    pub name: Option<String>,
}

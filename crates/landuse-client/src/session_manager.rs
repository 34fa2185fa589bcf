//! Session creation and lookup.

use landuse_core::error::Result;
use landuse_core::id::ensure_non_empty;
use landuse_core::{IdRegistry, Session, SessionId, Transport};
use std::sync::Arc;
use tracing::{debug, info};

use crate::dto::{self, SessionRecord};
use crate::routes;

/// Creates sessions, the root scope for scenarios and patterns.
pub struct SessionManager {
    transport: Arc<dyn Transport>,
    ids: Arc<IdRegistry>,
}

impl SessionManager {
    pub fn new(transport: Arc<dyn Transport>, ids: Arc<IdRegistry>) -> Self {
        Self { transport, ids }
    }

    /// Allocates a new session on the backend.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the call fails. A `Decode` kind
    /// (`reached_backend()`) means the backend may have created a session
    /// whose id could not be read.
    pub async fn create_session(&self) -> Result<Session> {
        let value = self.transport.post(&routes::create_session(), None).await?;
        let record: SessionRecord = dto::decode(value)?;
        self.ids.record(&record.session_id);
        info!(session_id = %record.session_id, "Session created");
        Ok(Session::new(record.session_id))
    }

    /// Reads back a session, confirming the backend still knows it.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown session.
    pub async fn get_session(&self, session_id: &SessionId) -> Result<Session> {
        ensure_non_empty(session_id)?;
        debug!(session_id = %session_id, "Fetching session");
        let value = self
            .transport
            .get(&routes::session(session_id))
            .await
            .map_err(|e| e.for_entity("session", session_id.as_str()))?;
        let record: SessionRecord = dto::decode(value)?;
        self.ids.record(&record.session_id);
        Ok(Session::new(record.session_id))
    }
}

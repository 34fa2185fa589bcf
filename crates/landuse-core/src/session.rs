//! Session domain model.

use serde::{Deserialize, Serialize};

use crate::id::SessionId;

/// The top-level scope grouping a user's scenarios and patterns.
///
/// A session carries no mutable state of its own; its lifetime is decided by
/// the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
}

impl Session {
    pub fn new(id: impl Into<SessionId>) -> Self {
        Self { id: id.into() }
    }
}

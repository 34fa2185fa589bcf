//! Pattern domain model.

use serde::{Deserialize, Serialize};

use crate::error::{LanduseError, Result};
use crate::geometry::Polygon;
use crate::id::{PatternId, SessionId};

/// A reusable stencil of land-use assignments over a shape.
///
/// Patterns belong to one session but are addressable by id from any
/// scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub id: PatternId,
    pub session_id: SessionId,
    pub name: String,
    pub geometry: Polygon,
}

/// Validates a pattern name.
///
/// # Errors
///
/// Returns `InvalidArgument` if the name is empty or whitespace.
pub fn validate_pattern_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(LanduseError::invalid_argument("pattern name must not be empty"));
    }
    Ok(())
}

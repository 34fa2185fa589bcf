//! Error types for the Landuse client.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classifies why a request to the backend did not produce a usable answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportErrorKind {
    /// The connection could not be established.
    Connect,
    /// The request did not complete within the transport timeout.
    Timeout,
    /// The request failed for another network-level reason.
    Request,
    /// The backend answered with a non-success HTTP status.
    Status(u16),
    /// The backend answered successfully but the body could not be decoded.
    Decode,
    /// The body decoded but violates the contract (e.g. unknown LULC category).
    InvalidResponse,
}

impl std::fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connect => write!(f, "connect"),
            Self::Timeout => write!(f, "timeout"),
            Self::Request => write!(f, "request"),
            Self::Status(code) => write!(f, "status {}", code),
            Self::Decode => write!(f, "decode"),
            Self::InvalidResponse => write!(f, "invalid response"),
        }
    }
}

/// A shared error type for the entire Landuse client.
///
/// Every client operation returns one of these variants so a caller can tell a
/// network failure apart from a legitimately empty result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LanduseError {
    /// Network/HTTP failure or an undecodable response.
    #[error("Transport error ({kind}): {message}")]
    Transport {
        kind: TransportErrorKind,
        message: String,
    },

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Malformed geometry, empty required field or unknown identifier.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation is not valid in the current state (e.g. job not finished).
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Client-side polling gave up before the job reached a terminal status.
    #[error("Job '{job_id}' still pending after {attempts} polls")]
    PollLimitExceeded { job_id: String, attempts: u32 },
}

impl LanduseError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Transport error
    pub fn transport(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self::Transport {
            kind,
            message: message.into(),
        }
    }

    /// Creates a Transport error for a body that decoded but broke the contract
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::transport(TransportErrorKind::InvalidResponse, message)
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an InvalidArgument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Creates a PreconditionFailed error
    pub fn precondition_failed(message: impl Into<String>) -> Self {
        Self::PreconditionFailed(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a Transport error
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is an InvalidArgument error
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Check if this is a PreconditionFailed error
    pub fn is_precondition_failed(&self) -> bool {
        matches!(self, Self::PreconditionFailed(_))
    }

    /// Returns the transport failure kind, if this is a transport error.
    pub fn transport_kind(&self) -> Option<TransportErrorKind> {
        match self {
            Self::Transport { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Whether the backend received and accepted the request.
    ///
    /// True only for responses that came back with a success status but could
    /// not be decoded, i.e. the side effect (such as session creation) may
    /// have happened even though the call failed.
    pub fn reached_backend(&self) -> bool {
        matches!(
            self.transport_kind(),
            Some(TransportErrorKind::Decode | TransportErrorKind::InvalidResponse)
        )
    }

    /// Whether retrying the same call unchanged may succeed.
    ///
    /// Transport failures are recoverable at the caller's discretion; argument
    /// and precondition errors need the caller to change something first.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { kind, .. } => match kind {
                TransportErrorKind::Connect
                | TransportErrorKind::Timeout
                | TransportErrorKind::Request => true,
                TransportErrorKind::Status(code) => *code >= 500,
                TransportErrorKind::Decode | TransportErrorKind::InvalidResponse => false,
            },
            Self::PollLimitExceeded { .. } => true,
            _ => false,
        }
    }

    /// Re-labels a generic NotFound (as produced by the transport for a 404)
    /// with the entity the caller was actually looking up.
    pub fn for_entity(self, entity_type: &'static str, id: impl Into<String>) -> Self {
        match self {
            Self::NotFound { .. } => Self::not_found(entity_type, id),
            other => other,
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<serde_json::Error> for LanduseError {
    fn from(err: serde_json::Error) -> Self {
        Self::transport(TransportErrorKind::Decode, err.to_string())
    }
}

impl From<toml::de::Error> for LanduseError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// A type alias for `Result<T, LanduseError>`.
pub type Result<T> = std::result::Result<T, LanduseError>;

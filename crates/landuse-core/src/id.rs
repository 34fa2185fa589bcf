//! Opaque identifiers and the registry that tracks which ones were issued.
//!
//! Identifiers are opaque strings on the wire. The backend is the authority
//! for the ids it hands out; the [`IdRegistry`] remembers every id the client
//! has been given (or has observed in a listing) so operations can reject
//! made-up ids before a request is sent.
//!
//! Locally minted ids are `<prefix>-<uuid v4>`, giving 122 random bits per id.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock};
use uuid::Uuid;

use crate::error::{LanduseError, Result};

/// The kind of entity an identifier refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdKind {
    Session,
    Scenario,
    Pattern,
    Job,
}

impl IdKind {
    /// Prefix used for locally minted identifiers of this kind.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Session => "ses",
            Self::Scenario => "scn",
            Self::Pattern => "pat",
            Self::Job => "job",
        }
    }

    /// Entity label used in error messages.
    pub fn entity_type(self) -> &'static str {
        match self {
            Self::Session => "session",
            Self::Scenario => "scenario",
            Self::Pattern => "pattern",
            Self::Job => "job",
        }
    }
}

/// Common behaviour of the typed identifier wrappers.
pub trait EntityId: Clone + std::fmt::Display {
    /// The entity kind this identifier addresses.
    const KIND: IdKind;

    /// Borrow the raw identifier string.
    fn as_str(&self) -> &str;
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        // Backends may issue integer ids; they are kept as their decimal text.
        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                #[derive(Deserialize)]
                #[serde(untagged)]
                enum Raw {
                    Text(String),
                    Number(u64),
                }

                Ok(match Raw::deserialize(deserializer)? {
                    Raw::Text(id) => Self(id),
                    Raw::Number(id) => Self(id.to_string()),
                })
            }
        }

        impl $name {
            /// Wraps a raw identifier string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the raw identifier string.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the wrapper, returning the raw string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl EntityId for $name {
            const KIND: IdKind = $kind;

            fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

entity_id!(
    /// Identifies a session, the root scope for scenarios and patterns.
    SessionId,
    IdKind::Session
);
entity_id!(
    /// Identifies a scenario.
    ScenarioId,
    IdKind::Scenario
);
entity_id!(
    /// Identifies a wallpapering pattern.
    PatternId,
    IdKind::Pattern
);
entity_id!(
    /// Identifies an asynchronous backend job.
    JobId,
    IdKind::Job
);

/// Tracks identifiers issued to (or observed by) one client instance.
///
/// The registry is re-entrant: it can be shared behind an `Arc` by every
/// component of a client and used from several tasks at once.
#[derive(Debug, Default)]
pub struct IdRegistry {
    issued: RwLock<HashMap<IdKind, HashSet<String>>>,
}

impl IdRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mints a fresh identifier of the given kind and records it.
    ///
    /// Collisions are re-drawn, so the returned id never repeats one already
    /// known to this registry.
    pub fn allocate<T: EntityId + From<String>>(&self) -> T {
        let mut issued = self.issued.write().unwrap_or_else(PoisonError::into_inner);
        let ids = issued.entry(T::KIND).or_default();
        loop {
            let candidate = format!("{}-{}", T::KIND.prefix(), Uuid::new_v4());
            if ids.insert(candidate.clone()) {
                return T::from(candidate);
            }
        }
    }

    /// Records an identifier handed out by the backend.
    ///
    /// Returns `false` if the id was already known.
    pub fn record<T: EntityId>(&self, id: &T) -> bool {
        let mut issued = self.issued.write().unwrap_or_else(PoisonError::into_inner);
        issued
            .entry(T::KIND)
            .or_default()
            .insert(id.as_str().to_string())
    }

    /// Whether the identifier is known to this registry.
    pub fn contains<T: EntityId>(&self, id: &T) -> bool {
        let issued = self.issued.read().unwrap_or_else(PoisonError::into_inner);
        issued
            .get(&T::KIND)
            .is_some_and(|ids| ids.contains(id.as_str()))
    }

    /// Number of identifiers of the given kind known to this registry.
    pub fn count(&self, kind: IdKind) -> usize {
        let issued = self.issued.read().unwrap_or_else(PoisonError::into_inner);
        issued.get(&kind).map_or(0, HashSet::len)
    }

    /// Validates that an identifier is non-empty and was previously issued.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` otherwise.
    pub fn ensure_issued<T: EntityId>(&self, id: &T) -> Result<()> {
        ensure_non_empty(id)?;
        if !self.contains(id) {
            return Err(LanduseError::invalid_argument(format!(
                "{} id '{}' was never issued to this client",
                T::KIND.entity_type(),
                id
            )));
        }
        Ok(())
    }
}

/// Validates that an identifier is not empty or whitespace.
pub fn ensure_non_empty<T: EntityId>(id: &T) -> Result<()> {
    if id.as_str().trim().is_empty() {
        return Err(LanduseError::invalid_argument(format!(
            "{} id must not be empty",
            T::KIND.entity_type()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_has_kind_prefix() {
        let registry = IdRegistry::new();
        let id: PatternId = registry.allocate();
        assert!(id.as_str().starts_with("pat-"));
        assert!(registry.contains(&id));
    }

    #[test]
    fn test_allocate_many_unique() {
        let registry = IdRegistry::new();
        let ids: HashSet<JobId> = (0..500).map(|_| registry.allocate::<JobId>()).collect();
        assert_eq!(ids.len(), 500);
        assert_eq!(registry.count(IdKind::Job), 500);
    }

    #[test]
    fn test_record_and_contains() {
        let registry = IdRegistry::new();
        let id = ScenarioId::new("S1");
        assert!(!registry.contains(&id));
        assert!(registry.record(&id));
        assert!(!registry.record(&id));
        assert!(registry.contains(&id));
    }

    #[test]
    fn test_kinds_are_separate() {
        let registry = IdRegistry::new();
        registry.record(&ScenarioId::new("X"));
        assert!(!registry.contains(&PatternId::new("X")));
    }

    #[test]
    fn test_ensure_issued() {
        let registry = IdRegistry::new();
        let known = PatternId::new("P1");
        registry.record(&known);

        assert!(registry.ensure_issued(&known).is_ok());
        assert!(
            registry
                .ensure_issued(&PatternId::new("P2"))
                .unwrap_err()
                .is_invalid_argument()
        );
        assert!(
            registry
                .ensure_issued(&PatternId::new("  "))
                .unwrap_err()
                .is_invalid_argument()
        );
    }

    #[test]
    fn test_id_serializes_transparently() {
        let id = SessionId::new("abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
        let back: SessionId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_numeric_id_deserializes_as_text() {
        let id: JobId = serde_json::from_str("42").unwrap();
        assert_eq!(id.as_str(), "42");
    }
}

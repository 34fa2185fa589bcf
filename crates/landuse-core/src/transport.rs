//! Transport trait.
//!
//! Defines the seam between the client components and the wire. Components
//! speak in REST routes and JSON values; implementations decide how requests
//! reach a backend (HTTP, in-memory, ...).

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// A REST path kept as raw segments, e.g. `["job", "42", "result"]`.
///
/// Segments are stored unescaped. Escaping is the job of the transport that
/// puts the route on the wire, so an id containing `/` stays one segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Route {
    segments: Vec<String>,
}

impl Route {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Splits a literal path such as `/scenario/7` on `/`, ignoring empty
    /// segments. No unescaping is done.
    pub fn from_path(path: &str) -> Self {
        Self::new(path.split('/').filter(|s| !s.is_empty()))
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

/// An abstract JSON request/response channel to a backend.
///
/// # Implementation Notes
///
/// Implementations must map failures onto the shared error taxonomy:
/// - unknown resource → `NotFound`
/// - request rejected as malformed → `InvalidArgument`
/// - request not valid in the current state → `PreconditionFailed`
/// - anything else that prevents a decoded answer → `Transport`
///
/// Implementations must not retry on their own.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs a GET request against `route` (e.g. `/scenario/42`).
    async fn get(&self, route: &Route) -> Result<Value>;

    /// Performs a POST request against `route` with an optional JSON body.
    async fn post(&self, route: &Route, body: Option<Value>) -> Result<Value>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_display() {
        assert_eq!(Route::new(["job", "9", "result"]).to_string(), "/job/9/result");
        assert_eq!(Route::new(Vec::<String>::new()).to_string(), "/");
    }

    #[test]
    fn test_from_path_ignores_empty_segments() {
        let route = Route::from_path("/jobs/");
        assert_eq!(route, Route::new(["jobs"]));
        assert_eq!(Route::from_path("scenario//7").segments().collect::<Vec<_>>(), ["scenario", "7"]);
    }
}

//! HTTP transport backed by reqwest.

use async_trait::async_trait;
use landuse_core::error::{LanduseError, Result, TransportErrorKind};
use landuse_core::{ClientConfig, Route, Transport};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde_json::Value;
use tracing::{debug, warn};

/// Real transport talking JSON over HTTP to the backend.
///
/// Timeouts are enforced per request from [`ClientConfig::request_timeout_secs`].
/// Failed requests are never retried here.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: Url,
}

impl ReqwestTransport {
    /// Creates a transport for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error if the configuration is invalid or the HTTP
    /// client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| LanduseError::config(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = Url::parse(config.normalized_base_url()).map_err(|e| {
            LanduseError::config(format!("Invalid base_url '{}': {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(LanduseError::config(format!(
                "base_url '{}' cannot carry a path",
                config.base_url
            )));
        }

        Ok(Self { client, base_url })
    }

    /// Full URL for a route; each segment is percent-encoded.
    pub fn url(&self, route: &Route) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(route.segments());
        }
        url
    }

    async fn send(&self, request: RequestBuilder, method: &str, route: &Route) -> Result<Value> {
        let path = route.to_string();
        let path = path.as_str();
        debug!(method, path, "Sending request");

        let response = request.send().await.map_err(|e| request_error(&e, path))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!(method, path, status = status.as_u16(), "Backend returned error status");
            return Err(status_error(status, path, &body));
        }

        let bytes = response.bytes().await.map_err(|e| {
            LanduseError::transport(
                TransportErrorKind::Decode,
                format!("Failed to read response from {}: {}", path, e),
            )
        })?;

        if bytes.is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_slice(&bytes).map_err(|e| {
            LanduseError::transport(
                TransportErrorKind::Decode,
                format!("Failed to parse response from {}: {}", path, e),
            )
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, route: &Route) -> Result<Value> {
        let request = self.client.get(self.url(route));
        self.send(request, "GET", route).await
    }

    async fn post(&self, route: &Route, body: Option<Value>) -> Result<Value> {
        let mut request = self.client.post(self.url(route));
        if let Some(body) = body {
            request = request.json(&body);
        }
        self.send(request, "POST", route).await
    }
}

fn request_error(err: &reqwest::Error, path: &str) -> LanduseError {
    let kind = if err.is_timeout() {
        TransportErrorKind::Timeout
    } else if err.is_connect() {
        TransportErrorKind::Connect
    } else {
        TransportErrorKind::Request
    };
    LanduseError::transport(kind, format!("Request to {} failed: {}", path, err))
}

/// Maps a non-success HTTP status onto the error taxonomy.
pub(crate) fn status_error(status: StatusCode, path: &str, body: &str) -> LanduseError {
    match status {
        StatusCode::NOT_FOUND => LanduseError::not_found("resource", path),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            LanduseError::invalid_argument(format!("Backend rejected {}: {}", path, body))
        }
        StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => {
            LanduseError::precondition_failed(format!("{}: {}", path, body))
        }
        other => LanduseError::transport(
            TransportErrorKind::Status(other.as_u16()),
            format!("HTTP {} from {}: {}", other, path, body),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let transport =
            ReqwestTransport::new(&ClientConfig::with_base_url("http://localhost:8000/")).unwrap();
        assert_eq!(
            transport.url(&Route::new(["users"])).as_str(),
            "http://localhost:8000/users"
        );
    }

    #[test]
    fn test_url_keeps_base_path_and_escapes_segments() {
        let transport =
            ReqwestTransport::new(&ClientConfig::with_base_url("http://localhost:8000/api")).unwrap();
        assert_eq!(
            transport.url(&Route::new(["job", "a/b c", "result"])).as_str(),
            "http://localhost:8000/api/job/a%2Fb%20c/result"
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = ReqwestTransport::new(&ClientConfig::with_base_url("")).err().unwrap();
        assert!(matches!(err, LanduseError::Config(_)));
    }

    #[test]
    fn test_status_mapping() {
        assert!(status_error(StatusCode::NOT_FOUND, "/job/1", "").is_not_found());
        assert!(status_error(StatusCode::UNPROCESSABLE_ENTITY, "/wallpaper", "").is_invalid_argument());
        assert!(status_error(StatusCode::CONFLICT, "/job/1/result", "").is_precondition_failed());

        let err = status_error(StatusCode::BAD_GATEWAY, "/users", "upstream");
        assert_eq!(err.transport_kind(), Some(TransportErrorKind::Status(502)));
        assert!(err.is_retryable());
        assert!(!err.reached_backend());
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        // Port 9 (discard) on localhost is not expected to accept HTTP.
        let mut config = ClientConfig::with_base_url("http://127.0.0.1:9");
        config.request_timeout_secs = 2;
        let transport = ReqwestTransport::new(&config).unwrap();

        let err = transport.post(&Route::new(["users"]), None).await.unwrap_err();
        assert!(err.is_transport());
        assert!(!err.reached_backend());
    }
}

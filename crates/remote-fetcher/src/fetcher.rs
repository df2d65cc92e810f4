//! HTTP fetching and typed decoding

use crate::error::{FetchError, ResponseError, Result};
use std::time::Duration;
use tracing::{debug, warn};

/// Boxed error type returned by decode implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A value that can be built from a fetched response body.
///
/// `accept_status` decides which status codes count as success; the default
/// accepts 200 and 201 and rejects everything else.
pub trait Fetchable: Sized + Send + 'static {
    fn from_fetched(bytes: &[u8]) -> std::result::Result<Self, BoxError>;

    fn accept_status(code: u16) -> bool {
        matches!(code, 200 | 201)
    }
}

impl Fetchable for Vec<u8> {
    fn from_fetched(bytes: &[u8]) -> std::result::Result<Self, BoxError> {
        Ok(bytes.to_vec())
    }
}

impl Fetchable for String {
    fn from_fetched(bytes: &[u8]) -> std::result::Result<Self, BoxError> {
        Ok(String::from_utf8(bytes.to_vec())?)
    }
}

/// Fetches remote resources over HTTP and decodes them into typed values.
pub struct RemoteFetcher {
    http: reqwest::Client,
}

impl RemoteFetcher {
    /// Create a fetcher with default settings (30 second timeout).
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(30))
    }

    /// Create a fetcher with a custom request timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { http }
    }

    /// Create a fetcher backed by a caller-configured client.
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Issue a single GET against `url` and decode the body into `V`.
    ///
    /// Transport failures map to [`FetchError::Other`], rejected status
    /// codes to [`FetchError::ResponseError`], an empty body to
    /// [`FetchError::Other`], and decode failures to
    /// [`FetchError::ParsingFailed`]. Decoding runs on a blocking task so
    /// large payloads never stall the transport driver.
    pub async fn fetch<V: Fetchable>(&self, url: &str) -> Result<V> {
        let response = self.http.get(url).send().await.map_err(|err| {
            warn!(url, error = %err, "transport failure");
            FetchError::Other(err.to_string())
        })?;

        let status = response.status();
        if !V::accept_status(status.as_u16()) {
            warn!(url, status = status.as_u16(), "rejected response status");
            return Err(FetchError::ResponseError(ResponseError {
                code: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("unknown status")
                    .to_string(),
            }));
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| FetchError::Other(err.to_string()))?;

        if body.is_empty() {
            return Err(FetchError::Other("no data".to_string()));
        }

        debug!(url, bytes = body.len(), "fetched resource");

        tokio::task::spawn_blocking(move || V::from_fetched(&body))
            .await
            .map_err(|err| FetchError::Other(err.to_string()))?
            .map_err(FetchError::ParsingFailed)
    }
}

impl Default for RemoteFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize, PartialEq)]
    struct Widget {
        id: u32,
        label: String,
    }

    impl Fetchable for Widget {
        fn from_fetched(bytes: &[u8]) -> std::result::Result<Self, BoxError> {
            Ok(serde_json::from_slice(bytes)?)
        }
    }

    #[tokio::test]
    async fn test_fetch_decodes_successful_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/widget"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"id":7,"label":"bolt"}"#))
            .mount(&server)
            .await;

        let fetcher = RemoteFetcher::new();
        let widget: Widget = fetcher.fetch(&format!("{}/widget", server.uri())).await.unwrap();
        assert_eq!(
            widget,
            Widget {
                id: 7,
                label: "bolt".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_fetch_accepts_201() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(201).set_body_string("created"))
            .mount(&server)
            .await;

        let fetcher = RemoteFetcher::new();
        let body: String = fetcher.fetch(&server.uri()).await.unwrap();
        assert_eq!(body, "created");
    }

    #[tokio::test]
    async fn test_fetch_reports_response_error_with_code() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let fetcher = RemoteFetcher::new();
        let err = fetcher.fetch::<String>(&server.uri()).await.unwrap_err();
        match err {
            FetchError::ResponseError(response) => {
                assert_eq!(response.code, 500);
                assert!(!response.message.is_empty());
            }
            other => panic!("expected ResponseError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_rejects_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let fetcher = RemoteFetcher::new();
        let err = fetcher.fetch::<String>(&server.uri()).await.unwrap_err();
        match err {
            FetchError::Other(msg) => assert_eq!(msg, "no data"),
            other => panic!("expected Other, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_reports_decode_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let fetcher = RemoteFetcher::new();
        let err = fetcher.fetch::<Widget>(&server.uri()).await.unwrap_err();
        assert!(matches!(err, FetchError::ParsingFailed(_)));
    }

    #[tokio::test]
    async fn test_fetch_reports_transport_failure() {
        // Nothing listens on this port
        let fetcher = RemoteFetcher::with_timeout(Duration::from_secs(2));
        let err = fetcher
            .fetch::<String>("http://127.0.0.1:9/unreachable")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Other(_)));
    }
}

//! HTTP exchange layer.
//!
//! One GET per triggered click, with the optional `X-Fragment` header so
//! the server can tailor a partial response to the requesting fragment.
//! No timeout, no retry, no cancellation: a request runs until it settles.

use log::debug;
use reqwest::{StatusCode, Url};
use std::fmt;

/// Header carrying the anchor's `phlex-fragment` value to the server.
pub const FRAGMENT_HEADER: &str = "X-Fragment";

/// Errors that can occur while fetching replacement HTML.
#[derive(Debug)]
pub enum FetchError {
    /// Network-level failure (DNS, connection refused, broken transport).
    Network(String),
    /// The response arrived but its body could not be read.
    Body(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Network(msg) => write!(f, "network error: {msg}"),
            FetchError::Body(msg) => write!(f, "body read error: {msg}"),
        }
    }
}

impl std::error::Error for FetchError {}

/// A settled response: status plus the body as raw HTML text.
///
/// The status is reported, not judged: the dispatcher applies any body
/// it gets, and only the refresh action cares about success.
#[derive(Debug)]
pub struct FetchedBody {
    pub status: StatusCode,
    pub body: String,
}

/// Thin wrapper over a shared `reqwest::Client`.
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Uses a caller-configured client (proxies, TLS, headers). The
    /// default client carries no timeout.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub async fn fetch(
        &self,
        url: &Url,
        fragment: Option<&str>,
    ) -> Result<FetchedBody, FetchError> {
        let mut request = self.client.get(url.clone());
        if let Some(fragment) = fragment {
            request = request.header(FRAGMENT_HEADER, fragment);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Body(e.to_string()))?;

        debug!("GET {url} -> {status}, {} bytes", body.len());
        Ok(FetchedBody { status, body })
    }
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_returns_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/part"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<li>hi</li>"))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/part", server.uri())).unwrap();
        let fetched = Fetcher::new().fetch(&url, None).await.unwrap();
        assert_eq!(fetched.status, StatusCode::OK);
        assert_eq!(fetched.body, "<li>hi</li>");
    }

    #[tokio::test]
    async fn test_fragment_header_attached_when_present() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/part"))
            .and(header(FRAGMENT_HEADER, "sidebar"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/part", server.uri())).unwrap();
        let fetched = Fetcher::new().fetch(&url, Some("sidebar")).await.unwrap();
        assert_eq!(fetched.body, "ok");
    }

    #[tokio::test]
    async fn test_non_success_status_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let url = Url::parse(&server.uri()).unwrap();
        let fetched = Fetcher::new().fetch(&url, None).await.unwrap();
        assert_eq!(fetched.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(fetched.body, "boom");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_a_network_error() {
        let url = {
            let server = MockServer::start().await;
            Url::parse(&server.uri()).unwrap()
            // Server drops here; the port goes dark.
        };

        let result = Fetcher::new().fetch(&url, None).await;
        assert!(matches!(result, Err(FetchError::Network(_))));
    }
}

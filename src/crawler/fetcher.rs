//! HTTP fetcher implementation
//!
//! This module handles all page requests for the crawler, including:
//! - Building HTTP clients with the crawler's user agent string
//! - GET requests with a hard cap on the number of body bytes read
//! - Error classification (timeout, connection, non-2xx status)

use crate::config::{FetchConfig, UserAgentConfig};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Errors produced while fetching a page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("HTTP error for {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else if error.is_connect() {
            FetchError::Connect {
                url: url.to_string(),
                message: error.to_string(),
            }
        } else {
            FetchError::Http {
                url: url.to_string(),
                source: error,
            }
        }
    }
}

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: String,
    /// HTTP status code (always 2xx)
    pub status_code: u16,
    /// Content-Type header value
    pub content_type: Option<String>,
    /// Body decoded as UTF-8 (lossy)
    pub body: String,
    /// Whether the body hit the byte cap
    pub truncated: bool,
}

/// Retrieves raw page bodies
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches `url`, accepting only 2xx responses
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `timeout` - Total request timeout
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use navigate_crawler::config::UserAgentConfig;
/// use navigate_crawler::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.user_agent_string())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// reqwest-backed page fetcher
pub struct HttpFetcher {
    client: Client,
    max_body_bytes: usize,
}

impl HttpFetcher {
    pub fn new(user_agent: &UserAgentConfig, config: &FetchConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(user_agent, config.timeout())?,
            max_body_bytes: config.max_body_bytes,
        })
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client, max_body_bytes: usize) -> Self {
        Self {
            client,
            max_body_bytes,
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        // Read at most max_body_bytes; the rest is dropped, not rejected
        let mut body: Vec<u8> = Vec::new();
        let mut truncated = false;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?
        {
            let remaining = self.max_body_bytes.saturating_sub(body.len());
            if chunk.len() > remaining {
                body.extend_from_slice(&chunk[..remaining]);
                truncated = true;
                break;
            }
            body.extend_from_slice(&chunk);
        }

        if truncated {
            tracing::debug!(
                "Truncated body of {} at {} bytes",
                url,
                self.max_body_bytes
            );
        }

        Ok(FetchedPage {
            final_url,
            status_code: status.as_u16(),
            content_type,
            body: String::from_utf8_lossy(&body).into_owned(),
            truncated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher(max_body_bytes: usize) -> HttpFetcher {
        let config = FetchConfig {
            max_body_bytes,
            ..FetchConfig::default()
        };
        HttpFetcher::new(&UserAgentConfig::default(), &config).unwrap()
    }

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(30));
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_success_sends_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .and(header("user-agent", "NavigateBot/1.0"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html><title>Hi</title></html>")
                    .insert_header("content-type", "text/html"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let page = fetcher(1024)
            .fetch(&format!("{}/page", server.uri()))
            .await
            .unwrap();

        assert_eq!(page.status_code, 200);
        assert_eq!(page.body, "<html><title>Hi</title></html>");
        assert_eq!(page.content_type.as_deref(), Some("text/html"));
        assert!(!page.truncated);
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = fetcher(1024)
            .fetch(&format!("{}/missing", server.uri()))
            .await;

        assert!(matches!(result, Err(FetchError::Status { status: 404, .. })));
    }

    #[tokio::test]
    async fn test_server_error_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let result = fetcher(1024).fetch(&format!("{}/x", server.uri())).await;
        assert!(matches!(result, Err(FetchError::Status { status: 503, .. })));
    }

    #[tokio::test]
    async fn test_oversized_body_is_truncated() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/big"))
            .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(5000)))
            .mount(&server)
            .await;

        let page = fetcher(100)
            .fetch(&format!("{}/big", server.uri()))
            .await
            .unwrap();

        assert_eq!(page.body.len(), 100);
        assert!(page.truncated);
    }

    #[tokio::test]
    async fn test_timeout_is_classified() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let client = build_http_client(&UserAgentConfig::default(), Duration::from_millis(200))
            .unwrap();
        let result = HttpFetcher::with_client(client, 1024)
            .fetch(&format!("{}/slow", server.uri()))
            .await;

        assert!(matches!(result, Err(FetchError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_connection_refused_is_error() {
        // Port 9 (discard) on localhost is closed in test environments
        let result = fetcher(1024).fetch("http://127.0.0.1:9/").await;
        assert!(result.is_err());
    }
}

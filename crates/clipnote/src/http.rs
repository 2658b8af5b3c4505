//! HTTP fetch capability used by parsers
//!
//! Parsers only see the [`HttpClient`] trait, so tests and hosts can swap
//! the transport. [`ReqwestClient`] is the default implementation.

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, USER_AGENT};
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::NoteError;
use crate::DEFAULT_USER_AGENT;

/// Connect timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Time allowed until response headers arrive
const RESPONSE_TIMEOUT: Duration = Duration::from_secs(15);

/// Time allowed to read the whole body
const BODY_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP method for a request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Post => write!(f, "POST"),
        }
    }
}

/// Request handed to an [`HttpClient`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Absolute URL
    pub url: String,
    /// Extra headers as (name, value) pairs
    pub headers: Vec<(String, String)>,
    /// Content-Type header value
    pub content_type: Option<String>,
}

impl HttpRequest {
    /// Create a GET request for the URL
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the HTTP method
    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Add a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the Content-Type header
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Header value by case-insensitive name
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Fetch capability: perform a request and return the raw response body
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Perform the request
    ///
    /// Non-success statuses and transport failures are errors.
    async fn request(&self, request: &HttpRequest) -> Result<String, NoteError>;
}

/// [`HttpClient`] backed by reqwest
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Create a client with the default User-Agent
    pub fn new() -> Result<Self, NoteError> {
        Self::with_user_agent(DEFAULT_USER_AGENT)
    }

    /// Create a client with a custom User-Agent
    pub fn with_user_agent(user_agent: &str) -> Result<Self, NoteError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT)),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(CONNECT_TIMEOUT)
            .read_timeout(RESPONSE_TIMEOUT)
            .build()
            .map_err(NoteError::ClientBuild)?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn request(&self, request: &HttpRequest) -> Result<String, NoteError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        };

        let mut headers = HeaderMap::new();
        for (name, value) in &request.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => warn!(header = %name, "Skipping invalid request header"),
            }
        }
        if let Some(ref content_type) = request.content_type {
            if let Ok(value) = HeaderValue::from_str(content_type) {
                headers.insert(CONTENT_TYPE, value);
            }
        }

        debug!(method = %request.method, url = %request.url, "Sending request");
        let response = self
            .client
            .request(method, &request.url)
            .headers(headers)
            .send()
            .await
            .map_err(NoteError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(NoteError::Fetch(format!(
                "HTTP {} from {}",
                status.as_u16(),
                request.url
            )));
        }

        let body = read_body_with_timeout(response, BODY_TIMEOUT).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

/// Read the response body, failing if it does not complete before the deadline
async fn read_body_with_timeout(
    response: reqwest::Response,
    timeout: Duration,
) -> Result<Bytes, NoteError> {
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    let deadline = tokio::time::Instant::now() + timeout;

    loop {
        tokio::select! {
            chunk = stream.next() => {
                match chunk {
                    Some(Ok(bytes)) => body.extend_from_slice(&bytes),
                    Some(Err(e)) => return Err(NoteError::from_reqwest(e)),
                    None => return Ok(Bytes::from(body)),
                }
            }
            _ = tokio::time::sleep_until(deadline) => {
                warn!(read = body.len(), "Body timeout reached");
                return Err(NoteError::Timeout);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let req = HttpRequest::get("https://example.com/api")
            .header("Accept", "application/json")
            .content_type("application/json");

        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "https://example.com/api");
        assert_eq!(req.header_value("accept"), Some("application/json"));
        assert_eq!(req.content_type.as_deref(), Some("application/json"));
        assert_eq!(req.header_value("user-agent"), None);
    }

    #[test]
    fn test_method_display() {
        assert_eq!(HttpMethod::Get.to_string(), "GET");
        assert_eq!(HttpMethod::Post.to_string(), "POST");
        assert_eq!(
            HttpRequest::get("https://a.b").method(HttpMethod::Post).method,
            HttpMethod::Post
        );
    }

    #[test]
    fn test_client_builds() {
        assert!(ReqwestClient::new().is_ok());
        assert!(ReqwestClient::with_user_agent("ClipNoteTest/1.0").is_ok());
    }
}

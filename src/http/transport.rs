//! Outbound HTTP transport.
//!
//! # Responsibilities
//! - Perform exactly one outbound request per call
//! - Report status, response headers and body
//! - Report the request head that was actually sent
//!
//! # Design Decisions
//! - `Transport` is the seam between the proxy and the HTTP client, so the
//!   executor can be driven by a recording double in tests
//! - Connections, TLS and redirects belong to `reqwest`
//! - Redirects are not followed unless configured

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_LENGTH, HOST, USER_AGENT};
use reqwest::redirect::Policy;
use reqwest::Method;
use thiserror::Error;
use url::Url;

use crate::config::ClientConfig;

/// A fully built outbound request.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

/// What the transport reports back after a transfer.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// Raw status code; zero means the transport got no usable status.
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
    /// Request head as sent on the wire.
    pub request_head: String,
}

/// Errors raised by a transport.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to build request: {0}")]
    Build(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("failed to read response body: {0}")]
    Body(String),
}

/// Executes outbound requests.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: OutboundRequest) -> Result<TransportResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn send(&self, request: OutboundRequest) -> Result<TransportResponse, TransportError> {
        (**self).send(request).await
    }
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    user_agent: Option<HeaderValue>,
}

impl ReqwestTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let policy = if config.follow_redirects {
            Policy::limited(config.max_redirects)
        } else {
            Policy::none()
        };

        let user_agent = match &config.user_agent {
            Some(agent) => Some(
                HeaderValue::from_str(agent).map_err(|e| TransportError::Build(e.to_string()))?,
            ),
            None => None,
        };

        let client = reqwest::Client::builder()
            .redirect(policy)
            .build()
            .map_err(|e| TransportError::Build(e.to_string()))?;
        Ok(Self { client, user_agent })
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self {
            client,
            user_agent: None,
        }
    }

    /// Set the headers the client would otherwise add after the head is
    /// rendered, so the captured head matches the wire.
    fn complete_headers(&self, headers: &mut HeaderMap) {
        if let Some(agent) = &self.user_agent {
            headers.entry(USER_AGENT).or_insert_with(|| agent.clone());
        }
        headers
            .entry(ACCEPT)
            .or_insert_with(|| HeaderValue::from_static("*/*"));
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: OutboundRequest) -> Result<TransportResponse, TransportError> {
        let mut headers = request.headers;
        self.complete_headers(&mut headers);

        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let built = builder
            .build()
            .map_err(|e| TransportError::Build(e.to_string()))?;
        let request_head = render_request_head(&built);

        let response = self
            .client
            .execute(built)
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;

        Ok(TransportResponse {
            status,
            headers,
            body,
            request_head,
        })
    }
}

/// Render a request head the way it goes out over HTTP/1.1.
///
/// `Host` comes from the URL and `Content-Length` from the body when the
/// client would add them itself.
pub fn render_request_head(request: &reqwest::Request) -> String {
    let url = request.url();
    let mut target = url.path().to_string();
    if let Some(query) = url.query() {
        target.push('?');
        target.push_str(query);
    }

    let mut head = format!("{} {} HTTP/1.1\r\n", request.method(), target);

    let headers = request.headers();
    if !headers.contains_key(HOST) {
        if let Some(host) = host_header(url) {
            head.push_str(&format!("host: {}\r\n", host));
        }
    }
    for (name, value) in headers {
        head.push_str(&format!("{}: {}\r\n", name, String::from_utf8_lossy(value.as_bytes())));
    }
    if !headers.contains_key(CONTENT_LENGTH) {
        if let Some(len) = request.body().and_then(|b| b.as_bytes()).map(<[u8]>::len) {
            head.push_str(&format!("content-length: {}\r\n", len));
        }
    }
    head.push_str("\r\n");
    head
}

fn host_header(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

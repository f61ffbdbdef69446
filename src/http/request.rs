//! Inbound request context and outbound request construction.
//!
//! # Responsibilities
//! - Carry the inbound request (method, URI, body, content type, headers)
//!   explicitly instead of reading ambient server state
//! - Turn a resolved method/body into outbound request parameters per verb
//!
//! # Design Decisions
//! - Dispatch on the lowercased method name; unknown verbs take the GET path
//! - Only POST carries a body and a `Content-Type`
//! - Method strings that are not valid HTTP tokens fall back to GET

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, COOKIE};
use reqwest::Method;

/// Content type used for POST bodies when the inbound request declares none.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// The request that triggered this proxy invocation.
#[derive(Debug, Clone, Default)]
pub struct InboundRequest {
    method: String,
    uri: String,
    body: Bytes,
    content_type: Option<String>,
    headers: HeaderMap,
}

impl InboundRequest {
    pub fn new(method: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            uri: uri.into(),
            ..Self::default()
        }
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// Request URI as received, including any query string.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Declared content type: the explicit value, else the `Content-Type` header.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref().or_else(|| {
            self.headers
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
        })
    }

    /// Value of the named cookie sent by the caller, if any.
    pub fn cookie(&self, name: &str) -> Option<String> {
        self.headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(cookie::Cookie::split_parse)
            .filter_map(Result::ok)
            .find(|c| c.name() == name)
            .map(|c| c.value().to_string())
    }
}

/// How the outbound request was configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    Post,
    Options,
    Passthrough,
}

/// Outbound request parameters produced by [`RequestBuilder`].
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub kind: MethodKind,
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

/// Per-verb outbound request configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestBuilder;

impl RequestBuilder {
    pub fn build(&self, method: &str, body: Bytes, content_type: Option<&str>) -> RequestConfig {
        match method.to_ascii_lowercase().as_str() {
            "post" => Self::build_post(body, content_type),
            "options" => RequestConfig {
                kind: MethodKind::Options,
                method: Method::OPTIONS,
                headers: HeaderMap::new(),
                body: None,
            },
            _ => RequestConfig {
                kind: MethodKind::Passthrough,
                method: passthrough_method(method),
                headers: HeaderMap::new(),
                body: None,
            },
        }
    }

    fn build_post(body: Bytes, content_type: Option<&str>) -> RequestConfig {
        let mut headers = HeaderMap::new();
        let value = content_type
            .and_then(|ct| HeaderValue::from_str(ct).ok())
            .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
        headers.insert(CONTENT_TYPE, value);

        RequestConfig {
            kind: MethodKind::Post,
            method: Method::POST,
            headers,
            body: Some(body),
        }
    }
}

fn passthrough_method(method: &str) -> Method {
    match Method::from_bytes(method.to_ascii_uppercase().as_bytes()) {
        Ok(m) => m,
        Err(_) => {
            tracing::warn!(method = %method, "Invalid method token, forwarding as GET");
            Method::GET
        }
    }
}

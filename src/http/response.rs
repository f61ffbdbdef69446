//! Captured upstream response.
//!
//! # Responsibilities
//! - Collect response headers keyed by lowercased name
//! - Keep repeated headers as an ordered list of values
//! - Hold the full result of one transfer

use std::collections::BTreeMap;

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::Serialize;

/// Response headers, lowercased name → values in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResponseHeaders(BTreeMap<String, Vec<String>>);

impl ResponseHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, name: &str, value: &str) {
        self.0
            .entry(name.to_ascii_lowercase())
            .or_default()
            .push(value.to_string());
    }

    /// All values for `name`, case-insensitive.
    pub fn get_all(&self, name: &str) -> &[String] {
        self.0
            .get(&name.to_ascii_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// First value for `name`, case-insensitive.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).first().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&HeaderMap> for ResponseHeaders {
    fn from(map: &HeaderMap) -> Self {
        let mut headers = ResponseHeaders::new();
        for (name, value) in map {
            headers.push(name.as_str(), String::from_utf8_lossy(value.as_bytes()).trim());
        }
        headers
    }
}

/// Everything recorded by one completed transfer.
#[derive(Debug, Clone)]
pub struct TransferResult {
    pub status: StatusCode,
    pub response_headers: ResponseHeaders,
    /// Raw outbound request head, as sent.
    pub request_head: String,
    pub response_body: Bytes,
}

//! The read-only result of one proxy run.
//!
//! # Responsibilities
//! - Record how the run ended (no route, failed transfer, completed transfer)
//! - Answer status, body and header queries without side effects
//! - Relay the body to an output channel
//!
//! # Design Decisions
//! - `CallStatus` replaces sentinel strings; the legacy sentinel text and
//!   the 500 default stay available for callers that relay them verbatim
//! - A failed transfer still counts as an attempted call

use std::borrow::Cow;
use std::io::Write;

use bytes::Bytes;
use reqwest::StatusCode;
use serde::Serialize;

use crate::http::response::{ResponseHeaders, TransferResult};
use crate::routing::ResolvedRequest;

/// Body text reported when no response was captured.
pub const NO_RESPONSE: &str = "No response, the call was unsuccessful or not made";

/// Status code reported until a transfer completes with a valid status.
pub const DEFAULT_STATUS_CODE: u16 = 500;

/// How a proxy run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallStatus {
    /// A route matched but no outbound request could be built from it.
    NotAttempted { reason: String },
    /// No rule matched the inbound path.
    NoRoute,
    /// The transfer was attempted but produced no valid status.
    Failed { reason: String },
    /// The transfer completed.
    Completed(StatusCode),
}

impl CallStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, CallStatus::Completed(_))
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Outcome {
    Unresolved,
    NotAttempted { reason: String },
    Failed { reason: String },
    Transferred(TransferResult),
}

/// Headers view returned by [`Exchange::headers`].
#[derive(Debug, Clone, Serialize)]
pub struct ExchangeHeaders<'a> {
    pub method: &'a str,
    pub request: Option<&'a str>,
    pub response: Option<&'a ResponseHeaders>,
}

/// Terminal state of a proxy: everything a caller may ask after `run`.
#[derive(Debug, Clone)]
pub struct Exchange {
    method: String,
    resolved: Option<ResolvedRequest>,
    outcome: Outcome,
}

impl Exchange {
    pub(crate) fn unresolved(method: String) -> Self {
        Self {
            method,
            resolved: None,
            outcome: Outcome::Unresolved,
        }
    }

    pub(crate) fn finished(resolved: ResolvedRequest, outcome: Outcome) -> Self {
        Self {
            method: resolved.method.clone(),
            resolved: Some(resolved),
            outcome,
        }
    }

    pub fn status(&self) -> CallStatus {
        match &self.outcome {
            Outcome::Unresolved => CallStatus::NoRoute,
            Outcome::NotAttempted { reason } => CallStatus::NotAttempted {
                reason: reason.clone(),
            },
            Outcome::Failed { reason } => CallStatus::Failed {
                reason: reason.clone(),
            },
            Outcome::Transferred(result) => CallStatus::Completed(result.status),
        }
    }

    /// Upstream status code, or 500 when no transfer completed.
    pub fn status_code(&self) -> u16 {
        self.transfer()
            .map(|r| r.status.as_u16())
            .unwrap_or(DEFAULT_STATUS_CODE)
    }

    /// True once an outbound transfer was attempted, successful or not.
    pub fn has_transferred(&self) -> bool {
        matches!(self.outcome, Outcome::Failed { .. } | Outcome::Transferred(_))
    }

    /// The routing result, if a rule matched.
    pub fn resolved(&self) -> Option<&ResolvedRequest> {
        self.resolved.as_ref()
    }

    pub fn transfer(&self) -> Option<&TransferResult> {
        match &self.outcome {
            Outcome::Transferred(result) => Some(result),
            _ => None,
        }
    }

    pub fn response_body(&self) -> Option<&Bytes> {
        self.transfer().map(|r| &r.response_body)
    }

    /// Body as text, or [`NO_RESPONSE`] when nothing was captured.
    pub fn response_text(&self) -> Cow<'_, str> {
        match self.response_body() {
            Some(body) => String::from_utf8_lossy(body),
            None => Cow::Borrowed(NO_RESPONSE),
        }
    }

    /// Method used (or that would have been used) for the transfer.
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn headers(&self) -> ExchangeHeaders<'_> {
        let transfer = self.transfer();
        ExchangeHeaders {
            method: &self.method,
            request: transfer.map(|r| r.request_head.as_str()),
            response: transfer.map(|r| &r.response_headers),
        }
    }

    /// Write the captured body to `out` if a transfer was attempted.
    ///
    /// Returns whether anything was relayed.
    pub fn echo_response_body<W: Write>(&self, mut out: W) -> std::io::Result<bool> {
        if !self.has_transferred() {
            return Ok(false);
        }
        if let Some(body) = self.response_body() {
            out.write_all(body)?;
            out.flush()?;
        }
        Ok(true)
    }
}

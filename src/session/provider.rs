//! Session identity.
//!
//! # Responsibilities
//! - Obtain the caller's session id, or create one
//! - Guarantee ids are safe to embed in a file name
//!
//! # Design Decisions
//! - Session state is passed explicitly; nothing is read from globals
//! - Ids are limited to `[A-Za-z0-9,_-]`, at most 128 characters
//! - Fresh ids are UUID v4 in simple (hex) form

use cookie::Cookie;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::http::request::InboundRequest;

const MAX_SESSION_ID_LEN: usize = 128;

/// Session errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("invalid session id {0:?}")]
    InvalidId(String),
}

/// An opaque session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId {
    value: String,
    created: bool,
}

impl SessionId {
    /// Wrap an existing id.
    pub fn existing(value: impl Into<String>) -> Result<Self, SessionError> {
        let value = value.into();
        if !is_valid_session_id(&value) {
            return Err(SessionError::InvalidId(value));
        }
        Ok(Self {
            value,
            created: false,
        })
    }

    /// Create a fresh random id.
    pub fn generate() -> Self {
        Self {
            value: Uuid::new_v4().simple().to_string(),
            created: true,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// True when the id was created for this request and the caller does not
    /// know it yet.
    pub fn is_new(&self) -> bool {
        self.created
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}

pub fn is_valid_session_id(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_SESSION_ID_LEN
        && value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b',' | b'-' | b'_'))
}

/// The session used for a call, as reported back to the caller.
///
/// A new id carries the `Set-Cookie` value the caller should put on its own
/// response so the next call reuses the same jar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionReport {
    pub cookie: String,
    pub id: String,
    pub new: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set_cookie: Option<String>,
}

impl SessionReport {
    pub fn new(cookie_name: &str, session: &SessionId) -> Self {
        let set_cookie = session.is_new().then(|| {
            Cookie::build((cookie_name.to_string(), session.as_str().to_string()))
                .path("/")
                .http_only(true)
                .build()
                .to_string()
        });

        Self {
            cookie: cookie_name.to_string(),
            id: session.as_str().to_string(),
            new: session.is_new(),
            set_cookie,
        }
    }
}

/// Source of session ids.
pub trait SessionProvider: Send + Sync {
    fn session_id(&self, inbound: &InboundRequest) -> Result<SessionId, SessionError>;
}

/// Always the same id.
#[derive(Debug, Clone)]
pub struct FixedSession(pub String);

impl SessionProvider for FixedSession {
    fn session_id(&self, _inbound: &InboundRequest) -> Result<SessionId, SessionError> {
        SessionId::existing(self.0.clone())
    }
}

/// Reads the id from a named inbound cookie, creating one when absent.
#[derive(Debug, Clone)]
pub struct CookieSession {
    cookie_name: String,
}

impl CookieSession {
    pub fn new(cookie_name: impl Into<String>) -> Self {
        Self {
            cookie_name: cookie_name.into(),
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }
}

impl SessionProvider for CookieSession {
    fn session_id(&self, inbound: &InboundRequest) -> Result<SessionId, SessionError> {
        match inbound.cookie(&self.cookie_name) {
            Some(value) => match SessionId::existing(value) {
                Ok(id) => Ok(id),
                Err(SessionError::InvalidId(bad)) => {
                    tracing::warn!(cookie = %self.cookie_name, value = %bad, "Ignoring invalid session id");
                    Ok(SessionId::generate())
                }
            },
            None => Ok(SessionId::generate()),
        }
    }
}

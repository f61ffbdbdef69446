//! Session identity and per-session cookie jars.
//!
//! # Data Flow
//! ```text
//! InboundRequest
//!     → provider.rs (SessionProvider: existing id from cookie, or a new one)
//!     → cookie_jar.rs (SessionCookieJar::open: create dir, pick <dir>/curl_<id>)
//!     → executor loads cookies before the transfer, stores Set-Cookie after it
//! ```

pub mod cookie_jar;
pub mod provider;

pub use cookie_jar::{CookieJarError, SessionCookieJar};
pub use provider::{CookieSession, FixedSession, SessionError, SessionId, SessionProvider, SessionReport};

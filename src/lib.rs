//! Pinch proxy: one inbound request, one rewritten outbound transfer.
//!
//! ```text
//! InboundRequest ──▶ routing (rule table, first match) ──▶ http (per-verb request)
//!                                                              │
//!                         session (cookie jar per session) ───▶│
//!                                                              ▼
//!                                   Exchange ◀── proxy (single transfer via Transport)
//! ```

pub mod config;
pub mod http;
pub mod observability;
pub mod proxy;
pub mod routing;
pub mod session;

pub use config::schema::PinchConfig;
pub use http::{InboundRequest, ReqwestTransport, Transport};
pub use proxy::{CallStatus, Exchange, Proxy};
pub use routing::{RuleTable, RuleTarget};

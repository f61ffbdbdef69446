//! Proxy execution subsystem.
//!
//! # Data Flow
//! ```text
//! Proxy::new(inbound, transport) + rules (+ cookie jar)
//!     → run(path): routing → RequestBuilder → cookies → Transport::send
//!     → Exchange (read-only: status, body, headers, echo)
//! ```

pub mod exchange;
pub mod executor;
pub mod shortcuts;

pub use exchange::{CallStatus, Exchange, ExchangeHeaders, DEFAULT_STATUS_CODE, NO_RESPONSE};
pub use executor::Proxy;

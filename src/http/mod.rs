//! HTTP request/response handling.
//!
//! # Data Flow
//! ```text
//! InboundRequest (method, URI, body, content type, headers)
//!     → [routing decides URL, method, body]
//!     → request.rs (RequestBuilder: per-verb headers and body)
//!     → transport.rs (one outbound transfer via reqwest)
//!     → response.rs (status, lowercased header map, body)
//! ```

pub mod request;
pub mod response;
pub mod transport;

pub use request::{InboundRequest, MethodKind, RequestBuilder, RequestConfig};
pub use response::{ResponseHeaders, TransferResult};
pub use transport::{OutboundRequest, ReqwestTransport, Transport, TransportError, TransportResponse};

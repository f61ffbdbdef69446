//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! routing / executor / cookie jar
//!     → tracing events with structured fields (path, url, status, ...)
//!     → logging.rs subscriber (stderr)
//! ```
//!
//! # Design Decisions
//! - The library only emits events; installing a subscriber is the binary's job
//! - `RUST_LOG` wins over the configured level

pub mod logging;

pub use logging::init_logging;

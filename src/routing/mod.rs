//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Rule registration:
//!     (pattern, RuleTarget)
//!     → pattern.rs (classify once: exact / prefix gate / prefix rewrite / catch-all)
//!     → table.rs (ordered, keyed by pattern, duplicates replaced in place)
//!
//! Inbound path:
//!     → router.rs (first rule producing a URL)
//!     → Return: ResolvedRequest or None
//! ```
//!
//! # Design Decisions
//! - Patterns parsed at registration, never per request
//! - No regex (prefix comparisons only)
//! - Deterministic: same table and path always resolve the same way

pub mod pattern;
pub mod router;
pub mod table;

pub use pattern::RulePattern;
pub use router::{ResolvedRequest, Router};
pub use table::{Rule, RuleTable, RuleTarget};

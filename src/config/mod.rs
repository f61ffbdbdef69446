//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → PinchConfig (validated, immutable)
//!     → rule table, cookie jar and client built from it once per invocation
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - No reload: a config lives for a single proxy invocation

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{ClientConfig, CookieConfig, ObservabilityConfig, PinchConfig, RuleConfig};
pub use validation::ValidationError;

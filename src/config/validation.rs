//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject rules that can never match (empty pattern or target)
//! - Reject method overrides that are not HTTP tokens
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: PinchConfig → Result<(), Vec<ValidationError>>
//! - Pattern syntax is not checked; unknown forms are literal patterns

use reqwest::Method;
use thiserror::Error;

use crate::config::schema::PinchConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("rule #{index}: pattern is empty")]
    EmptyPattern { index: usize },

    #[error("rule #{index} ({pattern}): target is empty")]
    EmptyTarget { index: usize, pattern: String },

    #[error("rule #{index} ({pattern}): invalid method {method:?}")]
    InvalidMethod {
        index: usize,
        pattern: String,
        method: String,
    },

    #[error("cookies.session_cookie must not be empty when cookies.dir is set")]
    EmptySessionCookie,
}

/// Check a parsed configuration.
pub fn validate_config(config: &PinchConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (index, rule) in config.rules.iter().enumerate() {
        if rule.pattern.is_empty() {
            errors.push(ValidationError::EmptyPattern { index });
        }
        if rule.target.is_empty() {
            errors.push(ValidationError::EmptyTarget {
                index,
                pattern: rule.pattern.clone(),
            });
        }
        if let Some(method) = &rule.method {
            if Method::from_bytes(method.as_bytes()).is_err() {
                errors.push(ValidationError::InvalidMethod {
                    index,
                    pattern: rule.pattern.clone(),
                    method: method.clone(),
                });
            }
        }
    }

    if config.cookies.enabled() && config.cookies.session_cookie.is_empty() {
        errors.push(ValidationError::EmptySessionCookie);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

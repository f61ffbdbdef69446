//! Route lookup.
//!
//! # Responsibilities
//! - Walk the rule table in insertion order
//! - Return the first rule that produces a URL, as a `ResolvedRequest`
//! - Fill method and body from the inbound request when the rule leaves them unset
//!
//! # Design Decisions
//! - First match wins; later rules are never consulted
//! - Explicit `None` for no match rather than an empty URL

use bytes::Bytes;

use crate::http::request::InboundRequest;
use crate::routing::table::{RuleTable, RuleTarget};

/// The outcome of routing: where, how and what to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRequest {
    pub url: String,
    pub method: String,
    pub body: Bytes,
}

/// Resolves inbound paths against an owned rule table.
#[derive(Debug, Clone, Default)]
pub struct Router {
    table: RuleTable,
}

impl Router {
    pub fn new(table: RuleTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    pub fn add_rule(&mut self, pattern: impl Into<String>, target: RuleTarget) {
        self.table.add_rule(pattern, target);
    }

    /// Find the first rule applying to `path`.
    pub fn resolve(&self, path: &str, inbound: &InboundRequest) -> Option<ResolvedRequest> {
        self.table.iter().find_map(|rule| {
            let url = rule.url_for(path)?;
            let target = rule.target();

            tracing::debug!(
                path = %path,
                pattern = %rule.raw(),
                kind = rule.pattern().kind(),
                url = %url,
                "Rule matched"
            );

            Some(ResolvedRequest {
                url,
                method: target
                    .method
                    .clone()
                    .unwrap_or_else(|| inbound.method().to_string()),
                body: target.body.clone().unwrap_or_else(|| inbound.body().clone()),
            })
        })
    }
}

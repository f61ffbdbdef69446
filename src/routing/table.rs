//! Ordered rule storage.
//!
//! # Responsibilities
//! - Keep rules in insertion order, keyed by their raw pattern
//! - Replace an existing rule in place when its pattern is registered again
//! - Parse each pattern once, on insertion

use bytes::Bytes;
use indexmap::IndexMap;

use crate::routing::pattern::RulePattern;

/// What a matched rule forwards to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTarget {
    /// Target URL, or replacement prefix for rewrite patterns.
    pub target: String,
    /// Method override. `None` forwards the inbound method.
    pub method: Option<String>,
    /// Body override. `None` forwards the inbound body.
    pub body: Option<Bytes>,
}

impl RuleTarget {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            method: None,
            body: None,
        }
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// A registered rule.
#[derive(Debug, Clone)]
pub struct Rule {
    raw: String,
    pattern: RulePattern,
    target: RuleTarget,
}

impl Rule {
    fn new(raw: String, target: RuleTarget) -> Self {
        Self {
            pattern: RulePattern::parse(&raw),
            raw,
            target,
        }
    }

    /// The pattern string as registered.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn pattern(&self) -> &RulePattern {
        &self.pattern
    }

    pub fn target(&self) -> &RuleTarget {
        &self.target
    }

    /// A rule with an empty target can never produce a URL.
    pub fn is_matchable(&self) -> bool {
        !self.target.target.is_empty()
    }

    /// Target URL for `path`, if this rule applies.
    pub fn url_for(&self, path: &str) -> Option<String> {
        if !self.is_matchable() {
            return None;
        }
        if self.raw == path {
            return Some(self.target.target.clone());
        }
        self.pattern.rewrite(path, &self.target.target)
    }
}

/// Rules keyed by raw pattern, iterated in insertion order.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: IndexMap<String, Rule>,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a rule, or replace the rule already registered for `pattern`.
    ///
    /// A replaced rule keeps its original position.
    pub fn add_rule(&mut self, pattern: impl Into<String>, target: RuleTarget) {
        let pattern = pattern.into();
        let rule = Rule::new(pattern.clone(), target);
        if let Some(previous) = self.rules.insert(pattern, rule) {
            tracing::debug!(pattern = %previous.raw, "Replaced existing rule");
        }
    }

    pub fn get(&self, pattern: &str) -> Option<&Rule> {
        self.rules.get(pattern)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.values()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

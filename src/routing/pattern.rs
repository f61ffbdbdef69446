//! Rule pattern parsing and matching.
//!
//! # Responsibilities
//! - Classify a rule pattern once, at registration time
//! - Match an inbound path against a classified pattern
//! - Produce the rewritten target URL on match
//!
//! # Pattern Kinds
//! ```text
//! /exact/path      Exact          path == pattern        → target
//! /api/*           PrefixGate     path starts "/api/"    → target
//! /old/$           PrefixRewrite  path starts "/old/"    → target + rest of path
//! /$               CatchAll       any path               → target + path
//! ```
//!
//! # Design Decisions
//! - Only the final `/`-separated segment decides the kind; `foo*` is literal
//! - Stripping removes the wildcard character only, the separator stays
//! - Only `/$` is the catch-all; a bare `$` rewrites paths starting with `$`
//! - Every kind also matches its own literal text exactly
//! - No regex, plain prefix comparison

/// A classified rule pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RulePattern {
    /// Matches only the literal path.
    Exact(String),
    /// Matches any path with this prefix; the target is used verbatim.
    PrefixGate(String),
    /// Matches any path with this prefix; the prefix is replaced by the target.
    PrefixRewrite(String),
    /// Matches any path; the whole path is appended to the target.
    CatchAll,
}

impl RulePattern {
    /// Parse a raw pattern string.
    ///
    /// Never fails: anything that is not a recognised wildcard form is an
    /// exact pattern.
    pub fn parse(raw: &str) -> Self {
        let last_segment = raw.rsplit('/').next().unwrap_or(raw);

        match last_segment {
            "*" => RulePattern::PrefixGate(raw[..raw.len() - 1].to_string()),
            "$" => match &raw[..raw.len() - 1] {
                "/" => RulePattern::CatchAll,
                "" => RulePattern::PrefixRewrite(raw.to_string()),
                prefix => RulePattern::PrefixRewrite(prefix.to_string()),
            },
            _ => RulePattern::Exact(raw.to_string()),
        }
    }

    /// Rewrite `path` into a target URL, or `None` if the pattern's wildcard
    /// does not apply.
    ///
    /// Exact equality with the raw pattern is checked by the caller.
    pub fn rewrite(&self, path: &str, target: &str) -> Option<String> {
        match self {
            RulePattern::Exact(literal) => (literal == path).then(|| target.to_string()),
            RulePattern::PrefixGate(prefix) => path.starts_with(prefix.as_str()).then(|| target.to_string()),
            RulePattern::PrefixRewrite(prefix) => path
                .strip_prefix(prefix.as_str())
                .map(|rest| format!("{}{}", target, rest)),
            RulePattern::CatchAll => Some(format!("{}{}", target, path)),
        }
    }

    /// Short label for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            RulePattern::Exact(_) => "exact",
            RulePattern::PrefixGate(_) => "prefix_gate",
            RulePattern::PrefixRewrite(_) => "prefix_rewrite",
            RulePattern::CatchAll => "catch_all",
        }
    }
}

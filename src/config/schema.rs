//! Configuration schema definitions.
//!
//! This module defines the configuration structure for one proxy invocation.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::routing::{RuleTable, RuleTarget};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PinchConfig {
    /// Ordered rule table. Later rules with the same pattern replace earlier ones.
    pub rules: Vec<RuleConfig>,

    /// Per-session cookie jar settings.
    pub cookies: CookieConfig,

    /// Outbound HTTP client settings.
    pub client: ClientConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl PinchConfig {
    /// Build the rule table, preserving file order.
    pub fn rule_table(&self) -> RuleTable {
        let mut table = RuleTable::new();
        for rule in &self.rules {
            table.add_rule(rule.pattern.clone(), rule.to_target());
        }
        table
    }
}

/// One routing rule.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RuleConfig {
    /// Path pattern: literal, `prefix/*`, `prefix/$` or `/$`.
    pub pattern: String,

    /// Target URL, or replacement prefix for `$` patterns.
    pub target: String,

    /// Method override (defaults to the inbound method).
    #[serde(default)]
    pub method: Option<String>,

    /// Body override (defaults to the inbound body).
    #[serde(default)]
    pub body: Option<String>,
}

impl RuleConfig {
    pub fn to_target(&self) -> RuleTarget {
        let mut target = RuleTarget::new(self.target.clone());
        if let Some(method) = &self.method {
            target = target.method(method.clone());
        }
        if let Some(body) = &self.body {
            target = target.body(body.clone());
        }
        target
    }
}

/// Cookie jar configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CookieConfig {
    /// Directory holding one jar file per session. Empty disables jars.
    pub dir: String,

    /// Inbound cookie that carries the caller's session id.
    pub session_cookie: String,
}

impl CookieConfig {
    pub fn enabled(&self) -> bool {
        !self.dir.is_empty()
    }
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            dir: String::new(),
            session_cookie: "PINCHSESSID".to_string(),
        }
    }
}

/// Outbound client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Follow upstream redirects instead of relaying them.
    pub follow_redirects: bool,

    /// Redirect limit when following.
    pub max_redirects: usize,

    /// `User-Agent` sent upstream. `None` sends none.
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            follow_redirects: false,
            max_redirects: 10,
            user_agent: Some(concat!("pinch-proxy/", env!("CARGO_PKG_VERSION")).to_string()),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: PinchConfig = toml::from_str("").unwrap();
        assert!(config.rules.is_empty());
        assert!(!config.cookies.enabled());
        assert_eq!(config.cookies.session_cookie, "PINCHSESSID");
        assert!(!config.client.follow_redirects);
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_rule_table_keeps_file_order() {
        let config: PinchConfig = toml::from_str(
            r#"
            [[rules]]
            pattern = "/api/*"
            target = "https://backend/"
            method = "POST"
            body = "{}"

            [[rules]]
            pattern = "/$"
            target = "https://fallback"
            "#,
        )
        .unwrap();

        let table = config.rule_table();
        let patterns: Vec<&str> = table.iter().map(|r| r.raw()).collect();
        assert_eq!(patterns, vec!["/api/*", "/$"]);

        let api = table.get("/api/*").unwrap().target();
        assert_eq!(api.method.as_deref(), Some("POST"));
        assert_eq!(api.body.as_deref(), Some(&b"{}"[..]));
    }
}

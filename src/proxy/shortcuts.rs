//! Direct-mode helpers.
//!
//! Each helper replaces the proxy's rule table with one implicit rule and
//! runs it:
//! - `get` / `post`: `*` → target, run against the empty path
//! - `forward`: `/$` → target, run against the inbound URI (path appended)
//! - `router`: empty proxy for manual rule registration
//!
//! Passing the proxy in lets the caller attach a cookie jar first. Rules
//! already registered on it are discarded.

use bytes::Bytes;

use crate::http::request::InboundRequest;
use crate::http::transport::Transport;
use crate::proxy::exchange::Exchange;
use crate::proxy::executor::Proxy;
use crate::routing::{RuleTable, RuleTarget};

/// An empty proxy; add rules with [`Proxy::route`] and call [`Proxy::run`].
pub fn router<T: Transport>(inbound: InboundRequest, transport: T) -> Proxy<T> {
    Proxy::new(inbound, transport)
}

/// Send a GET to `target`.
pub async fn get<T: Transport>(proxy: Proxy<T>, target: impl Into<String>, body: Option<Bytes>) -> Exchange {
    direct(proxy, target.into(), "GET", body).await
}

/// Send a POST to `target`, with `body` or the inbound body.
pub async fn post<T: Transport>(proxy: Proxy<T>, target: impl Into<String>, body: Option<Bytes>) -> Exchange {
    direct(proxy, target.into(), "POST", body).await
}

/// Forward the inbound request to `target` + inbound URI with the inbound
/// method. Only a POST carries the inbound body.
pub async fn forward<T: Transport>(proxy: Proxy<T>, target: impl Into<String>) -> Exchange {
    let uri = proxy.inbound().uri().to_string();
    let mut proxy = proxy.with_rules(RuleTable::new());
    proxy.route("/$", RuleTarget::new(target));
    proxy.run(&uri).await
}

async fn direct<T: Transport>(
    proxy: Proxy<T>,
    target: String,
    method: &str,
    body: Option<Bytes>,
) -> Exchange {
    let mut rule = RuleTarget::new(target).method(method);
    if let Some(body) = body {
        rule = rule.body(body);
    }

    let mut proxy = proxy.with_rules(RuleTable::new());
    proxy.route("*", rule);
    proxy.run("").await
}

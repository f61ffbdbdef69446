//! Single-shot proxy execution.
//!
//! # States
//! ```text
//! Proxy (Idle) ──run(path)──┬── no rule ──────────────→ Exchange: NoRoute
//!                           └── Resolved ──transfer──┬→ Exchange: Completed(status)
//!                                                    ├→ Exchange: Failed
//!                                                    └→ Exchange: NotAttempted (unusable URL)
//! ```
//!
//! # Design Decisions
//! - `run` consumes the proxy, so a second transfer cannot be expressed
//! - Exactly one call to the transport, and only after a rule matched
//! - Routing and transfer problems end up in the `Exchange`, never as errors;
//!   configuration problems (cookie directory) surface before `run`

use reqwest::header::COOKIE;
use reqwest::StatusCode;
use url::Url;

use crate::http::request::{InboundRequest, RequestBuilder};
use crate::http::response::{ResponseHeaders, TransferResult};
use crate::http::transport::{OutboundRequest, ReqwestTransport, Transport, TransportResponse};
use crate::proxy::exchange::{Exchange, Outcome};
use crate::routing::{ResolvedRequest, Router, RuleTable, RuleTarget};
use crate::session::cookie_jar::{request_cookie_header, store_response_cookies, SessionCookieJar};

/// A configured, not yet executed proxy for one inbound request.
#[derive(Debug)]
pub struct Proxy<T = ReqwestTransport> {
    router: Router,
    inbound: InboundRequest,
    cookie_jar: Option<SessionCookieJar>,
    request_builder: RequestBuilder,
    transport: T,
}

impl<T: Transport> Proxy<T> {
    pub fn new(inbound: InboundRequest, transport: T) -> Self {
        Self {
            router: Router::default(),
            inbound,
            cookie_jar: None,
            request_builder: RequestBuilder,
            transport,
        }
    }

    /// Replace the rule table.
    pub fn with_rules(mut self, table: RuleTable) -> Self {
        self.router = Router::new(table);
        self
    }

    /// Use a per-session cookie jar for the transfer.
    pub fn with_cookie_jar(mut self, jar: SessionCookieJar) -> Self {
        self.cookie_jar = Some(jar);
        self
    }

    /// Add or replace a rule.
    pub fn route(&mut self, pattern: impl Into<String>, target: RuleTarget) -> &mut Self {
        self.router.add_rule(pattern, target);
        self
    }

    pub fn inbound(&self) -> &InboundRequest {
        &self.inbound
    }

    pub fn cookie_jar(&self) -> Option<&SessionCookieJar> {
        self.cookie_jar.as_ref()
    }

    /// Resolve `path` without transferring anything.
    pub fn resolve(&self, path: &str) -> Option<ResolvedRequest> {
        self.router.resolve(path, &self.inbound)
    }

    /// Resolve `path` and perform the transfer, at most once.
    pub async fn run(self, path: &str) -> Exchange {
        let Some(resolved) = self.resolve(path) else {
            tracing::info!(path = %path, rules = self.router.table().len(), "No route matched");
            return Exchange::unresolved(self.inbound.method().to_string());
        };

        let url = match Url::parse(&resolved.url) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(path = %path, url = %resolved.url, error = %e, "Resolved URL is not usable");
                let reason = format!("invalid URL {}: {}", resolved.url, e);
                return Exchange::finished(resolved, Outcome::NotAttempted { reason });
            }
        };

        let config = self.request_builder.build(
            &resolved.method,
            resolved.body.clone(),
            self.inbound.content_type(),
        );

        let mut headers = config.headers;
        let mut cookies = self.cookie_jar.as_ref().map(SessionCookieJar::load);
        if let Some(value) = cookies.as_ref().and_then(|store| request_cookie_header(store, &url)) {
            headers.insert(COOKIE, value);
        }

        tracing::debug!(
            path = %path,
            url = %url,
            method = %config.method,
            kind = ?config.kind,
            "Forwarding request"
        );

        let request = OutboundRequest {
            method: config.method,
            url: url.clone(),
            headers,
            body: config.body,
        };

        let outcome = match self.transport.send(request).await {
            Ok(response) => {
                if let (Some(jar), Some(store)) = (&self.cookie_jar, cookies.as_mut()) {
                    store_response_cookies(store, &response.headers, &url);
                    if let Err(e) = jar.save(store) {
                        tracing::warn!(error = %e, "Failed to persist cookie jar");
                    }
                }
                record_response(response)
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Upstream transfer failed");
                Outcome::Failed {
                    reason: e.to_string(),
                }
            }
        };

        if let Outcome::Transferred(result) = &outcome {
            tracing::info!(url = %url, status = result.status.as_u16(), "Transfer complete");
        }

        Exchange::finished(resolved, outcome)
    }
}

fn record_response(response: TransportResponse) -> Outcome {
    let status = match StatusCode::from_u16(response.status) {
        Ok(status) => status,
        Err(_) => {
            tracing::warn!(status = response.status, "Upstream returned no valid status");
            return Outcome::Failed {
                reason: format!("invalid status code {}", response.status),
            };
        }
    };

    Outcome::Transferred(TransferResult {
        status,
        response_headers: ResponseHeaders::from(&response.headers),
        request_head: response.request_head,
        response_body: response.body,
    })
}

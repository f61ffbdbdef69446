//! End-to-end forwarding through the reqwest transport against a mock backend.

use bytes::Bytes;
use pinch_proxy::http::{InboundRequest, ReqwestTransport};
use pinch_proxy::proxy::{shortcuts, CallStatus, Proxy};
use pinch_proxy::routing::{RuleTable, RuleTarget};
use reqwest::redirect::Policy;
use reqwest::StatusCode;

mod common;

use common::MockReply;

fn transport() -> ReqwestTransport {
    let client = reqwest::Client::builder()
        .no_proxy()
        .redirect(Policy::none())
        .build()
        .unwrap();
    ReqwestTransport::from_client(client)
}

#[tokio::test]
async fn test_prefix_gate_relays_response() {
    let reply = MockReply::ok("hello from backend")
        .with_header("X-Backend", "one")
        .with_header("Set-Cookie", "a=1")
        .with_header("Set-Cookie", "b=2");
    let (addr, received) = common::start_recording_backend(reply).await;

    let mut rules = RuleTable::new();
    rules.add_rule("/api/*", RuleTarget::new(format!("http://{}/users", addr)));

    let proxy = Proxy::new(InboundRequest::new("GET", "/api/users?page=2"), transport()).with_rules(rules);
    let exchange = proxy.run("/api/users?page=2").await;

    assert_eq!(exchange.status(), CallStatus::Completed(StatusCode::OK));
    assert_eq!(exchange.status_code(), 200);
    assert_eq!(exchange.response_text(), "hello from backend");

    let headers = exchange.headers();
    let response = headers.response.unwrap();
    assert_eq!(response.get("x-backend"), Some("one"));
    assert_eq!(response.get_all("set-cookie"), &["a=1".to_string(), "b=2".to_string()]);

    let request_head = headers.request.unwrap();
    assert!(request_head.starts_with("GET /users HTTP/1.1\r\n"));
    assert!(request_head.contains(&format!("host: {}", addr)));

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].request_line(), "GET /users HTTP/1.1");
    assert!(received[0].body.is_empty());
}

#[tokio::test]
async fn test_post_sends_body_and_content_type() {
    let (addr, received) = common::start_recording_backend(MockReply::ok("created")).await;

    let inbound = InboundRequest::new("POST", "/submit")
        .with_body("{\"name\":\"pinch\"}")
        .with_content_type("application/json");
    let mut proxy = Proxy::new(inbound, transport());
    proxy.route("/submit", RuleTarget::new(format!("http://{}/hook", addr)));

    let exchange = proxy.run("/submit").await;
    assert!(exchange.status().is_completed());

    let received = received.lock().unwrap();
    assert_eq!(received[0].request_line(), "POST /hook HTTP/1.1");
    assert_eq!(received[0].header("content-type").as_deref(), Some("application/json"));
    assert_eq!(received[0].body, b"{\"name\":\"pinch\"}");
}

#[tokio::test]
async fn test_post_override_body_wins() {
    let (addr, received) = common::start_recording_backend(MockReply::ok("")).await;

    let inbound = InboundRequest::new("GET", "/ping").with_body("ignored");
    let exchange = shortcuts::post(
        shortcuts::router(inbound, transport()),
        format!("http://{}/ping", addr),
        Some(Bytes::from_static(b"override")),
    )
    .await;
    assert!(exchange.has_transferred());

    let received = received.lock().unwrap();
    assert_eq!(received[0].body, b"override");
    assert_eq!(
        received[0].header("content-type").as_deref(),
        Some("application/octet-stream")
    );
}

#[tokio::test]
async fn test_forward_appends_uri() {
    let (addr, received) = common::start_recording_backend(MockReply::ok("doc")).await;

    let inbound = InboundRequest::new("GET", "/docs/intro?lang=en");
    let exchange = shortcuts::forward(shortcuts::router(inbound, transport()), format!("http://{}", addr)).await;

    assert_eq!(exchange.response_text(), "doc");
    let received = received.lock().unwrap();
    assert_eq!(received[0].request_line(), "GET /docs/intro?lang=en HTTP/1.1");
}

#[tokio::test]
async fn test_upstream_error_status_is_relayed() {
    let reply = MockReply {
        status_line: "404 Not Found",
        headers: Vec::new(),
        body: "missing",
    };
    let (addr, _) = common::start_recording_backend(reply).await;

    let exchange = shortcuts::get(
        shortcuts::router(InboundRequest::new("GET", "/"), transport()),
        format!("http://{}/nope", addr),
        None,
    )
    .await;
    assert_eq!(exchange.status(), CallStatus::Completed(StatusCode::NOT_FOUND));
    assert_eq!(exchange.status_code(), 404);
    assert_eq!(exchange.response_text(), "missing");
}

#[tokio::test]
async fn test_redirect_is_not_followed() {
    let reply = MockReply {
        status_line: "302 Found",
        headers: vec![("Location", "/elsewhere")],
        body: "",
    };
    let (addr, received) = common::start_recording_backend(reply).await;

    let exchange = shortcuts::get(
        shortcuts::router(InboundRequest::new("GET", "/"), transport()),
        format!("http://{}/moved", addr),
        None,
    )
    .await;
    assert_eq!(exchange.status_code(), 302);
    assert_eq!(
        exchange.headers().response.unwrap().get("location"),
        Some("/elsewhere")
    );
    assert_eq!(received.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unreachable_backend_is_failed_call() {
    let addr = common::closed_port().await;

    let exchange = shortcuts::get(
        shortcuts::router(InboundRequest::new("GET", "/"), transport()),
        format!("http://{}/", addr),
        None,
    )
    .await;
    assert!(exchange.has_transferred());
    assert!(matches!(exchange.status(), CallStatus::Failed { .. }));
    assert_eq!(exchange.status_code(), 500);
    assert!(exchange.response_body().is_none());

    let mut out = Vec::new();
    assert!(exchange.echo_response_body(&mut out).unwrap());
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_no_route_never_reaches_backend() {
    let (addr, received) = common::start_recording_backend(MockReply::ok("")).await;

    let mut proxy = Proxy::new(InboundRequest::new("GET", "/b"), transport());
    proxy.route("/a", RuleTarget::new(format!("http://{}/", addr)));

    let exchange = proxy.run("/b").await;
    assert_eq!(exchange.status(), CallStatus::NoRoute);
    assert!(received.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_direct_mode_ignores_configured_rules() {
    let (explicit, explicit_received) = common::start_recording_backend(MockReply::ok("explicit")).await;
    let (configured, configured_received) = common::start_recording_backend(MockReply::ok("configured")).await;

    let config = pinch_proxy::config::parse_config(&format!(
        r#"
[[rules]]
pattern = "/docs/*"
target = "http://{configured}/gate"

[[rules]]
pattern = "/$"
target = "http://{configured}"
"#
    ))
    .unwrap();

    let proxy = || Proxy::new(InboundRequest::new("GET", "/docs/intro"), transport()).with_rules(config.rule_table());

    let exchange = shortcuts::get(proxy(), format!("http://{}/status", explicit), None).await;
    assert_eq!(exchange.response_text(), "explicit");

    let exchange = shortcuts::forward(proxy(), format!("http://{}", explicit)).await;
    assert_eq!(exchange.response_text(), "explicit");

    let received = explicit_received.lock().unwrap();
    assert_eq!(received.len(), 2);
    assert_eq!(received[0].request_line(), "GET /status HTTP/1.1");
    assert_eq!(received[1].request_line(), "GET /docs/intro HTTP/1.1");
    assert!(configured_received.lock().unwrap().is_empty());
}

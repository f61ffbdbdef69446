//! pinch-proxy: forward one request according to a rule table.
//!
//! The inbound request is described on the command line (method, URI,
//! content type, headers, body from a file or stdin). The relayed response
//! body goes to stdout, logs and the optional header dump go to stderr.
//!
//! Configured rules apply to `route` only; `get`, `post` and `forward` use
//! their single implicit rule. When cookies are enabled the session in use
//! is reported in the header dump and, with `--session-out`, as JSON in a
//! file, including the `Set-Cookie` value for a newly created session.
//!
//! ```text
//! pinch-proxy --config rules.toml --uri /api/users route
//! pinch-proxy --method POST --body-file - post https://backend/hook
//! pinch-proxy --uri /docs/intro forward https://docs.example.com
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use bytes::Bytes;
use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use tokio::io::AsyncReadExt;

use pinch_proxy::config::{load_config, PinchConfig};
use pinch_proxy::http::{InboundRequest, ReqwestTransport};
use pinch_proxy::observability::init_logging;
use pinch_proxy::proxy::{shortcuts, Exchange, ExchangeHeaders, Proxy};
use pinch_proxy::session::{CookieSession, FixedSession, SessionCookieJar, SessionProvider, SessionReport};

#[derive(Parser)]
#[command(name = "pinch-proxy")]
#[command(about = "Forward a single request through a small rewrite rule table", long_about = None)]
struct Cli {
    /// TOML configuration (rules, cookies, client, observability).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Inbound request method.
    #[arg(short, long, default_value = "GET")]
    method: String,

    /// Inbound request URI (path and query).
    #[arg(short, long, default_value = "/")]
    uri: String,

    /// Inbound content type.
    #[arg(long)]
    content_type: Option<String>,

    /// Inbound header, `Name: value`. Repeatable.
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    headers: Vec<(HeaderName, HeaderValue)>,

    /// Read the inbound body from this file, `-` for stdin.
    #[arg(long)]
    body_file: Option<PathBuf>,

    /// Session id for the cookie jar (default: inbound session cookie or a new id).
    #[arg(long)]
    session: Option<String>,

    /// Print captured request/response headers as JSON to stderr.
    #[arg(long)]
    dump_headers: bool,

    /// Write the session in use (id, new flag, Set-Cookie) as JSON to this file.
    #[arg(long)]
    session_out: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the inbound URI against the configured rules
    Route,
    /// GET the target
    Get {
        target: String,
        /// Body to send instead of the inbound body.
        #[arg(long)]
        body: Option<String>,
    },
    /// POST to the target
    Post {
        target: String,
        /// Body to send instead of the inbound body.
        #[arg(long)]
        body: Option<String>,
    },
    /// Forward to the target with the inbound URI appended
    Forward { target: String },
}

fn parse_header(raw: &str) -> Result<(HeaderName, HeaderValue), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected `Name: value`, got {:?}", raw))?;
    let name = HeaderName::from_bytes(name.trim().as_bytes()).map_err(|e| e.to_string())?;
    let value = HeaderValue::from_str(value.trim()).map_err(|e| e.to_string())?;
    Ok((name, value))
}

/// Header dump written with `--dump-headers`.
#[derive(Serialize)]
struct Dump<'a> {
    #[serde(flatten)]
    headers: ExchangeHeaders<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    session: Option<&'a SessionReport>,
}

async fn read_body(path: &Path) -> std::io::Result<Bytes> {
    let mut buf = Vec::new();
    if path.as_os_str() == "-" {
        tokio::io::stdin().read_to_end(&mut buf).await?;
    } else {
        buf = tokio::fs::read(path).await?;
    }
    Ok(Bytes::from(buf))
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => PinchConfig::default(),
    };

    init_logging(&config.observability.log_level);

    let mut headers = HeaderMap::new();
    for (name, value) in cli.headers.iter().cloned() {
        headers.append(name, value);
    }

    let mut inbound = InboundRequest::new(cli.method.clone(), cli.uri.clone()).with_headers(headers);
    if let Some(content_type) = &cli.content_type {
        inbound = inbound.with_content_type(content_type.clone());
    }
    if let Some(path) = &cli.body_file {
        inbound = inbound.with_body(read_body(path).await?);
    }

    let transport = ReqwestTransport::new(&config.client)?;
    let mut proxy = Proxy::new(inbound, transport);
    if matches!(cli.command, Commands::Route) {
        proxy = proxy.with_rules(config.rule_table());
    }

    let mut session_report = None;

    if config.cookies.enabled() {
        let provider: Box<dyn SessionProvider> = match &cli.session {
            Some(id) => Box::new(FixedSession(id.clone())),
            None => Box::new(CookieSession::new(config.cookies.session_cookie.clone())),
        };
        let session = provider.session_id(proxy.inbound())?;
        if session.is_new() {
            tracing::info!(
                cookie = %config.cookies.session_cookie,
                session = %session,
                "Started new session"
            );
        }
        let report = SessionReport::new(&config.cookies.session_cookie, &session);
        if let Some(path) = &cli.session_out {
            tokio::fs::write(path, serde_json::to_vec_pretty(&report)?).await?;
        }
        session_report = Some(report);

        let jar = SessionCookieJar::open(&config.cookies.dir, session)?;
        proxy = proxy.with_cookie_jar(jar);
    }

    tracing::debug!(method = %cli.method, uri = %cli.uri, "Inbound request");

    let exchange = match cli.command {
        Commands::Route => {
            let uri = proxy.inbound().uri().to_string();
            proxy.run(&uri).await
        }
        Commands::Get { target, body } => shortcuts::get(proxy, target, body.map(Bytes::from)).await,
        Commands::Post { target, body } => shortcuts::post(proxy, target, body.map(Bytes::from)).await,
        Commands::Forward { target } => shortcuts::forward(proxy, target).await,
    };

    report(&exchange, session_report.as_ref(), cli.dump_headers)
}

fn report(
    exchange: &Exchange,
    session: Option<&SessionReport>,
    dump_headers: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    if dump_headers {
        let dump = Dump {
            headers: exchange.headers(),
            session,
        };
        eprintln!("{}", serde_json::to_string_pretty(&dump)?);
    }

    if !exchange.echo_response_body(std::io::stdout().lock())? {
        eprintln!("{}", exchange.response_text());
        return Ok(ExitCode::FAILURE);
    }

    tracing::debug!(status = ?exchange.status(), "Done");
    if exchange.status().is_completed() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

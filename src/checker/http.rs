// src/checker/http.rs
// =============================================================================
// This module talks HTTP for a single URL check.
//
// Key functionality:
// - Makes HTTP HEAD requests (lightweight, no body download)
// - Falls back to GET when HEAD is refused or answered ambiguously
// - Follows redirects by hand so every hop lands in the redirect chain
// - Sorts failures into transient (worth a retry) and final ones
//
// The client is built with redirects disabled. Every request, including
// each redirect hop, first takes a token from the shared rate limiter.
// =============================================================================

use std::error::Error as _;
use std::io;

use reqwest::{header, Client, Method, Response, StatusCode};
use url::Url;

use super::limiter::RateLimiter;
use super::result::UrlStatus;
use crate::config::CheckerConfig;

/// What one request found, before timing and attempt bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Outcome {
    pub status: UrlStatus,
    pub http_status: Option<u16>,
    pub redirect_chain: Vec<String>,
    pub error: Option<String>,
}

impl Outcome {
    pub fn new(status: UrlStatus) -> Self {
        Self {
            status,
            http_status: None,
            redirect_chain: Vec::new(),
            error: None,
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// A request that produced no response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Failure {
    /// The request timed out. Retried.
    Timeout(String),
    /// Connection refused, reset or aborted. Retried.
    Connection(String),
    /// Anything else (TLS, protocol errors). Not retried.
    Other(String),
}

impl Failure {
    pub fn is_transient(&self) -> bool {
        matches!(self, Failure::Timeout(_) | Failure::Connection(_))
    }

    /// The final outcome once retries are exhausted.
    pub fn into_outcome(self) -> Outcome {
        match self {
            Failure::Timeout(message) => Outcome::new(UrlStatus::Timeout).with_error(message),
            Failure::Connection(message) => Outcome::new(UrlStatus::Broken).with_error(message),
            Failure::Other(message) => Outcome::new(UrlStatus::Unknown).with_error(message),
        }
    }
}

/// Builds the shared client. Redirects are never followed automatically.
pub(crate) fn build_client(config: &CheckerConfig) -> reqwest::Result<Client> {
    let mut builder = Client::builder()
        .timeout(config.request_timeout())
        .redirect(reqwest::redirect::Policy::none())
        .user_agent(config.user_agent.clone());
    if !config.use_system_proxy {
        builder = builder.no_proxy();
    }
    builder.build()
}

/// Requests `url`, following up to `max_redirects` hops.
///
/// A response of any kind is an `Ok` outcome; only a request that got no
/// response at all is a `Failure`.
pub(crate) async fn request_url(
    client: &Client,
    limiter: &RateLimiter,
    config: &CheckerConfig,
    url: &Url,
) -> Result<Outcome, Failure> {
    let mut current = url.clone();
    let mut chain: Vec<String> = Vec::new();

    loop {
        let response = head_then_get(client, limiter, &current).await?;
        let status = response.status();

        if !status.is_redirection() {
            return Ok(analyze_response(status, chain));
        }

        // 3xx: find where it points
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok());
        let Some(location) = location else {
            let mut outcome = analyze_response(status, chain);
            outcome.error = Some("redirect without a Location header".to_string());
            return Ok(outcome);
        };

        // Location may be relative to the URL that sent it.
        let next = match current.join(location) {
            Ok(next) => next,
            Err(e) => {
                let mut outcome = Outcome::new(UrlStatus::Broken)
                    .with_error(format!("invalid redirect target '{location}': {e}"));
                outcome.http_status = Some(status.as_u16());
                outcome.redirect_chain = chain;
                return Ok(outcome);
            }
        };

        if chain.len() >= config.max_redirects {
            let mut outcome = Outcome::new(UrlStatus::Broken)
                .with_error(format!("more than {} redirects", config.max_redirects));
            outcome.http_status = Some(status.as_u16());
            outcome.redirect_chain = chain;
            return Ok(outcome);
        }

        chain.push(next.to_string());
        current = next;
    }
}

// HEAD first; some servers refuse it or answer it differently from GET.
async fn head_then_get(client: &Client, limiter: &RateLimiter, url: &Url) -> Result<Response, Failure> {
    let head = send(client, limiter, Method::HEAD, url).await?;
    if matches!(
        head.status(),
        StatusCode::METHOD_NOT_ALLOWED | StatusCode::NOT_IMPLEMENTED | StatusCode::FORBIDDEN
    ) {
        return send(client, limiter, Method::GET, url).await;
    }
    Ok(head)
}

async fn send(client: &Client, limiter: &RateLimiter, method: Method, url: &Url) -> Result<Response, Failure> {
    limiter.acquire().await;
    client
        .request(method, url.clone())
        .send()
        .await
        .map_err(categorize_error)
}

// Analyzes a final (non-redirect) status code
//
// HTTP status codes:
// - 200-299: Success (Redirected if we got here through redirects)
// - 401, 403, 429: Reachable but not verifiable without credentials/patience
// - 400-599: Broken
// - anything else: Unknown
pub(crate) fn analyze_response(status: StatusCode, chain: Vec<String>) -> Outcome {
    let code = status.as_u16();
    let link_status = match code {
        200..=299 if chain.is_empty() => UrlStatus::Valid,
        200..=299 => UrlStatus::Redirected,
        401 | 403 | 429 => UrlStatus::Unknown,
        400..=599 => UrlStatus::Broken,
        _ => UrlStatus::Unknown,
    };

    let mut outcome = Outcome::new(link_status);
    outcome.http_status = Some(code);
    outcome.redirect_chain = chain;
    if !link_status.is_ok() {
        outcome.error = Some(format!("HTTP {code}"));
    }
    outcome
}

// Categorizes different error types from reqwest
//
// reqwest errors can happen for many reasons:
// - Network timeout
// - Connection refused or reset by the peer
// - TLS certificate problems
// - etc.
fn categorize_error(error: reqwest::Error) -> Failure {
    let message = error.to_string();
    if error.is_timeout() {
        Failure::Timeout(message)
    } else if error.is_connect() || is_connection_reset(&error) {
        Failure::Connection(message)
    } else {
        Failure::Other(message)
    }
}

// Walks the error's source chain looking for an I/O reset.
fn is_connection_reset(error: &reqwest::Error) -> bool {
    let mut source = error.source();
    while let Some(cause) = source {
        if let Some(io_error) = cause.downcast_ref::<io::Error>() {
            if matches!(
                io_error.kind(),
                io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionAborted | io::ErrorKind::BrokenPipe
            ) {
                return true;
            }
        }
        source = cause.source();
    }
    false
}

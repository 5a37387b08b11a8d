// src/checker/link.rs
// =============================================================================
// The per-URL state machine.
//
//   Pending ──syntax ok──> Resolving ──resolved──> Requesting{0}
//      │                       │                      │    ▲
//      │ bad syntax            │ not found /          │    │ backoff
//      ▼                       ▼ resolver down        ▼    │
//   Done(Broken)        Done(DnsFailure|Unknown)   Backoff{n} (transient
//                                                  failure, n < max_retries)
//
// Requesting ends in Done with the request outcome, or with the final
// failure once the retry budget is spent. DNS failures and HTTP error
// statuses are never retried. The retry counter lives in the state, so
// every path through the loop is bounded.
// =============================================================================

use std::time::Instant;

use chrono::Utc;
use reqwest::Client;
use tracing::debug;
use url::Url;

use super::http::{request_url, Outcome};
use super::limiter::RateLimiter;
use super::resolve::{ResolveError, Resolver};
use super::result::{UrlCheckResult, UrlStatus};
use crate::config::CheckerConfig;

/// Borrowed handles a single check needs.
pub(crate) struct CheckContext<'a> {
    pub client: &'a Client,
    pub resolver: &'a dyn Resolver,
    pub limiter: &'a RateLimiter,
    pub config: &'a CheckerConfig,
}

#[derive(Debug)]
enum CheckState {
    Pending,
    Resolving(Url),
    Requesting { url: Url, retry: u32 },
    Backoff { url: Url, retry: u32 },
    Done(Outcome),
}

/// Runs one URL through the state machine to a final result.
pub(crate) async fn check_url(ctx: &CheckContext<'_>, raw: &str) -> UrlCheckResult {
    let started = Instant::now();
    let mut attempts = 0u32;
    let mut state = CheckState::Pending;

    let outcome = loop {
        state = match state {
            CheckState::Pending => match parse_target(raw) {
                Ok(url) => CheckState::Resolving(url),
                Err(reason) => CheckState::Done(Outcome::new(UrlStatus::Broken).with_error(reason)),
            },

            CheckState::Resolving(url) => {
                let host = url.host_str().unwrap_or_default().to_string();
                let port = url.port_or_known_default().unwrap_or(80);
                match ctx.resolver.resolve(&host, port).await {
                    Ok(()) => CheckState::Requesting { url, retry: 0 },
                    Err(e @ ResolveError::NotFound(_)) => {
                        CheckState::Done(Outcome::new(UrlStatus::DnsFailure).with_error(e.to_string()))
                    }
                    Err(e @ ResolveError::Unavailable(_)) => {
                        CheckState::Done(Outcome::new(UrlStatus::Unknown).with_error(e.to_string()))
                    }
                }
            }

            CheckState::Requesting { url, retry } => {
                attempts += 1;
                match request_url(ctx.client, ctx.limiter, ctx.config, &url).await {
                    Ok(outcome) => CheckState::Done(outcome),
                    Err(failure) if failure.is_transient() && retry < ctx.config.max_retries => {
                        debug!(url = %url, retry, failure = ?failure, "transient failure, backing off");
                        CheckState::Backoff { url, retry }
                    }
                    Err(failure) => CheckState::Done(failure.into_outcome()),
                }
            }

            CheckState::Backoff { url, retry } => {
                tokio::time::sleep(ctx.config.backoff(retry)).await;
                CheckState::Requesting { url, retry: retry + 1 }
            }

            CheckState::Done(outcome) => break outcome,
        };
    };

    UrlCheckResult {
        url: raw.to_string(),
        status: outcome.status,
        http_status: outcome.http_status,
        redirect_chain: outcome.redirect_chain,
        error: outcome.error,
        checked_at: Utc::now(),
        latency_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        attempts,
    }
}

/// Syntax gate: an absolute http(s) URL with a host.
pub(crate) fn parse_target(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw.trim()).map_err(|e| format!("invalid URL: {e}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err("URL has no host".to_string()),
    }
}

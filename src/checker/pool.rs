// src/checker/pool.rs
// =============================================================================
// The link health checker: a bounded worker pool over distinct URLs.
//
// Flow for a batch:
// 1. De-duplicate the URLs (BTreeSet, so dispatch order is stable)
// 2. Run up to `workers` checks at once with buffer_unordered
// 3. Each check asks the cache first; a fresh hit makes no network call
// 4. Fresh results (except Unknown) go back into the cache
// 5. If the run timeout fires, every URL without a result is recorded as
//    Timeout: the result map always holds every URL exactly once
// =============================================================================

use std::collections::{BTreeMap, BTreeSet};
use std::pin::pin;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use reqwest::Client;
use tracing::{debug, info, warn};

use super::http::build_client;
use super::limiter::RateLimiter;
use super::link::{check_url, CheckContext};
use super::resolve::{Resolver, SystemResolver};
use super::result::{UrlCheckResult, UrlStatus};
use crate::cache::ResultCache;
use crate::config::CheckerConfig;
use crate::error::EngineError;

/// Results of one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkReport {
    /// One result per distinct URL.
    pub results: BTreeMap<String, UrlCheckResult>,
    /// How many of them came from the cache.
    pub cache_hits: usize,
}

pub struct LinkChecker {
    client: Client,
    resolver: Arc<dyn Resolver>,
    limiter: RateLimiter,
    cache: Arc<ResultCache>,
    config: CheckerConfig,
    max_age: Duration,
}

impl LinkChecker {
    /// Builds a checker that shares `cache` with its owner.
    pub fn new(config: CheckerConfig, cache: Arc<ResultCache>, max_age: Duration) -> Result<Self, EngineError> {
        let client = build_client(&config)?;
        Ok(Self {
            client,
            resolver: Arc::new(SystemResolver),
            limiter: RateLimiter::new(config.requests_per_second, config.burst),
            cache,
            config,
            max_age,
        })
    }

    /// Swaps the DNS resolution step.
    pub fn with_resolver(mut self, resolver: Arc<dyn Resolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    /// Checks every distinct URL in `urls`.
    pub async fn check_all<I, S>(&self, urls: I) -> LinkReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let distinct: BTreeSet<String> = urls
            .into_iter()
            .map(|u| u.as_ref().trim().to_string())
            .filter(|u| !u.is_empty())
            .collect();

        let workers = self.config.workers.max(1);
        info!(urls = distinct.len(), workers, "checking links");

        let mut report = LinkReport::default();
        let mut checks = pin!(stream::iter(distinct.iter())
            .map(|url| async move {
                let (result, cached) = self.check_one(url).await;
                (url.clone(), result, cached)
            })
            .buffer_unordered(workers));

        let drain = async {
            while let Some((url, result, cached)) = checks.next().await {
                if cached {
                    report.cache_hits += 1;
                }
                report.results.insert(url, result);
            }
        };

        match self.config.run_timeout() {
            Some(limit) => {
                if tokio::time::timeout(limit, drain).await.is_err() {
                    warn!(
                        pending = distinct.len() - report.results.len(),
                        "run timeout reached, pending checks recorded as timeouts"
                    );
                }
            }
            None => drain.await,
        }

        for url in &distinct {
            if !report.results.contains_key(url) {
                report
                    .results
                    .insert(url.clone(), UrlCheckResult::timed_out(url, "run timeout elapsed before the check finished"));
            }
        }

        info!(
            checked = report.results.len(),
            cache_hits = report.cache_hits,
            broken = report.results.values().filter(|r| r.status == UrlStatus::Broken).count(),
            "link check finished"
        );
        report
    }

    /// Checks one URL, consulting the cache first. The flag is true for a
    /// cache hit.
    pub async fn check_one(&self, url: &str) -> (UrlCheckResult, bool) {
        if let Some(hit) = self.cache.get(url, self.max_age) {
            debug!(url, status = hit.status.as_str(), "cache hit");
            return (hit, true);
        }

        let ctx = CheckContext {
            client: &self.client,
            resolver: self.resolver.as_ref(),
            limiter: &self.limiter,
            config: &self.config,
        };
        let result = check_url(&ctx, url).await;

        debug!(
            url,
            status = result.status.as_str(),
            http_status = ?result.http_status,
            attempts = result.attempts,
            latency_ms = result.latency_ms,
            "link checked"
        );

        // Unknown means "could not verify"; the next run should try again.
        if result.status != UrlStatus::Unknown {
            self.cache.set(result.clone());
        }
        (result, false)
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does pin! do here?
//    - buffer_unordered yields a stream of async blocks, which are not Unpin
//    - StreamExt::next() needs an Unpin stream, so we pin it on the stack
//
// 2. Why does the drain loop borrow `report` instead of returning it?
//    - tokio::time::timeout drops the future when time runs out
//    - Whatever the loop already inserted stays in `report`, and the
//      missing URLs are filled in afterwards
//
// 3. Arc<dyn Resolver>
//    - A trait object behind a shared pointer: any type implementing
//      Resolver can be plugged in at runtime
// -----------------------------------------------------------------------------

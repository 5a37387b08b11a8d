// src/checker/result.rs
// =============================================================================
// The outcome of checking one URL.
//
// A UrlCheckResult is created by the checker, written into the result cache
// and read back on later runs until it expires. It serializes with stable
// snake_case field names so the JSON report and the cache file agree.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Final state of a URL check.
///
/// Ordered from healthy to unverifiable so reports can sort by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrlStatus {
    /// 2xx without redirects
    Valid,
    /// 2xx after one or more redirects
    Redirected,
    /// Bad syntax, 4xx/5xx, refused connection or too many redirects
    Broken,
    /// Still timing out after every retry, or cut off by the run timeout
    Timeout,
    /// The host name does not resolve
    DnsFailure,
    /// Could not be verified (resolver outage, 429, unexpected errors)
    Unknown,
}

impl UrlStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            UrlStatus::Valid => "valid",
            UrlStatus::Redirected => "redirected",
            UrlStatus::Broken => "broken",
            UrlStatus::Timeout => "timeout",
            UrlStatus::DnsFailure => "dns_failure",
            UrlStatus::Unknown => "unknown",
        }
    }

    /// Valid and Redirected both mean the page is reachable.
    pub fn is_ok(self) -> bool {
        matches!(self, UrlStatus::Valid | UrlStatus::Redirected)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlCheckResult {
    pub url: String,
    pub status: UrlStatus,
    /// Status code of the last response, if any response arrived.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    /// Every Location followed, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub redirect_chain: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub checked_at: DateTime<Utc>,
    /// Wall time of the whole check, retries and backoff included.
    #[serde(default)]
    pub latency_ms: u64,
    /// HTTP attempts made. Zero when the check stopped before any request.
    #[serde(default)]
    pub attempts: u32,
}

impl UrlCheckResult {
    /// A URL that never produced an answer before the run was cut off.
    pub fn timed_out(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: UrlStatus::Timeout,
            http_status: None,
            redirect_chain: Vec::new(),
            error: Some(error.into()),
            checked_at: Utc::now(),
            latency_ms: 0,
            attempts: 0,
        }
    }
}

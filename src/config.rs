// src/config.rs
// =============================================================================
// Engine configuration.
//
// Every knob is a plain scalar with a default, so a config file only needs
// the values it wants to change:
//
//   {
//     "checker": { "workers": 8, "requests_per_second": 4.0 },
//     "cache": { "path": ".doc-guardian/cache.json", "max_age_secs": 3600 }
//   }
//
// The CLI loads this file (if given) and then applies its flags on top.
// =============================================================================

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::DEFAULT_INDEX_SIZE_THRESHOLD;

// ── Default value functions ──────────────────────────────────────────

fn default_index_size_threshold() -> usize {
    DEFAULT_INDEX_SIZE_THRESHOLD
}

fn default_min_description_length() -> usize {
    10
}

fn default_max_entries_per_section() -> usize {
    50
}

fn default_size_limit_tokens() -> usize {
    100_000
}

fn default_index_token_budget() -> usize {
    50_000
}

fn default_sitemap_dump_share() -> f64 {
    0.8
}

fn default_sitemap_dump_min_entries() -> usize {
    20
}

fn default_formulaic_share() -> f64 {
    0.5
}

fn default_workers() -> usize {
    5
}

fn default_requests_per_second() -> f64 {
    10.0
}

fn default_burst() -> u32 {
    1
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_max_redirects() -> usize {
    5
}

fn default_max_retries() -> u32 {
    2
}

fn default_backoff_base_ms() -> u64 {
    250
}

fn default_user_agent() -> String {
    format!("doc-guardian/{}", env!("CARGO_PKG_VERSION"))
}

fn default_true() -> bool {
    true
}

fn default_max_age_secs() -> u64 {
    24 * 60 * 60
}

fn default_shards() -> usize {
    16
}

// ── Config structs ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub validator: ValidatorConfig,
    #[serde(default)]
    pub checker: CheckerConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    /// Set to false to skip network checks entirely.
    #[serde(default = "default_true")]
    pub check_links: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            validator: ValidatorConfig::default(),
            checker: CheckerConfig::default(),
            cache: CacheConfig::default(),
            check_links: true,
        }
    }
}

/// Thresholds for the validation levels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorConfig {
    #[serde(default = "default_index_size_threshold")]
    pub index_size_threshold: usize,
    #[serde(default = "default_min_description_length")]
    pub min_description_length: usize,
    /// Index documents only.
    #[serde(default = "default_max_entries_per_section")]
    pub max_entries_per_section: usize,
    #[serde(default = "default_size_limit_tokens")]
    pub size_limit_tokens: usize,
    /// Index documents only.
    #[serde(default = "default_index_token_budget")]
    pub index_token_budget: usize,
    /// Share of all entries one section may hold before it is a sitemap dump.
    #[serde(default = "default_sitemap_dump_share")]
    pub sitemap_dump_share: f64,
    #[serde(default = "default_sitemap_dump_min_entries")]
    pub sitemap_dump_min_entries: usize,
    /// Share of entries sharing one description that counts as formulaic.
    #[serde(default = "default_formulaic_share")]
    pub formulaic_share: f64,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            index_size_threshold: default_index_size_threshold(),
            min_description_length: default_min_description_length(),
            max_entries_per_section: default_max_entries_per_section(),
            size_limit_tokens: default_size_limit_tokens(),
            index_token_budget: default_index_token_budget(),
            sitemap_dump_share: default_sitemap_dump_share(),
            sitemap_dump_min_entries: default_sitemap_dump_min_entries(),
            formulaic_share: default_formulaic_share(),
        }
    }
}

/// Link health checker settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckerConfig {
    /// Worker pool width.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Aggregate request rate across all workers. Zero or less disables it.
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: f64,
    /// Requests that may be issued back to back before the rate applies.
    #[serde(default = "default_burst")]
    pub burst: u32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    /// Retries for transient failures (timeouts, connection resets).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    /// Abort still-pending checks after this long; they are recorded as
    /// timeouts.
    #[serde(default)]
    pub run_timeout_secs: Option<u64>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Honour HTTP(S)_PROXY environment variables.
    #[serde(default = "default_true")]
    pub use_system_proxy: bool,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            requests_per_second: default_requests_per_second(),
            burst: default_burst(),
            request_timeout_secs: default_request_timeout_secs(),
            max_redirects: default_max_redirects(),
            max_retries: default_max_retries(),
            backoff_base_ms: default_backoff_base_ms(),
            run_timeout_secs: None,
            user_agent: default_user_agent(),
            use_system_proxy: true,
        }
    }
}

impl CheckerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn run_timeout(&self) -> Option<Duration> {
        self.run_timeout_secs.map(Duration::from_secs)
    }

    /// Delay before retry number `attempt` (0-based): base * 2^attempt.
    pub fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.backoff_base_ms.saturating_mul(1u64 << attempt.min(16)))
    }
}

/// Result cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Backing file. Without one the cache lives for a single run.
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: u64,
    #[serde(default = "default_shards")]
    pub shards: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_age_secs: default_max_age_secs(),
            shards: default_shards(),
        }
    }
}

impl CacheConfig {
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_secs)
    }
}

impl EngineConfig {
    /// Loads a JSON config file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Invalid {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.checker.workers, 5);
        assert_eq!(config.checker.requests_per_second, 10.0);
        assert_eq!(config.checker.max_redirects, 5);
        assert_eq!(config.validator.index_size_threshold, 256_000);
        assert_eq!(config.cache.max_age(), Duration::from_secs(86_400));
        assert!(config.cache.path.is_none());
        assert!(config.check_links);
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"checker": {"workers": 8}, "check_links": false}"#).unwrap();
        assert_eq!(config.checker.workers, 8);
        assert_eq!(config.checker.max_retries, 2);
        assert!(!config.check_links);
        assert_eq!(config.validator.min_description_length, 10);
    }

    #[test]
    fn test_empty_json_keeps_link_checks_on() {
        let config: EngineConfig = serde_json::from_str("{}").unwrap();
        assert!(config.check_links);
    }

    #[test]
    fn test_backoff_doubles() {
        let config = CheckerConfig {
            backoff_base_ms: 100,
            ..Default::default()
        };
        assert_eq!(config.backoff(0), Duration::from_millis(100));
        assert_eq!(config.backoff(1), Duration::from_millis(200));
        assert_eq!(config.backoff(3), Duration::from_millis(800));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = EngineConfig::from_json_file(Path::new("/nonexistent/doc-guardian.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}

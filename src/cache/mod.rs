// src/cache/mod.rs
// =============================================================================
// URL result cache.
//
// Keyed by URL; each value is a UrlCheckResult plus the time it was
// recorded. Lookups take a max age and ignore anything older.
//
// Concurrency: the map is split into shards, each behind its own RwLock.
// A URL always hashes to the same shard, so readers and writers of
// different URLs rarely meet, and every read or write of one URL is atomic
// (a whole entry is swapped in under the write lock; there is no partial
// state to observe). Two workers racing on one key: the last write wins.
//
// Persistence: an optional JSON file, loaded on open and written back with
// `persist()`, which creates the parent directory when needed. A missing or
// unreadable file yields an empty cache; only a failed write is reported as
// an error.
// =============================================================================

use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::checker::UrlCheckResult;
use crate::error::CacheError;

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub result: UrlCheckResult,
    pub recorded_at: DateTime<Utc>,
}

// On-disk layout. BTreeMap keeps the file stable between runs.
#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    version: u32,
    entries: BTreeMap<String, CacheEntry>,
}

type Shard = RwLock<HashMap<String, CacheEntry>>;

#[derive(Debug)]
pub struct ResultCache {
    shards: Vec<Shard>,
    path: Option<PathBuf>,
    dirty: AtomicBool,
}

impl ResultCache {
    /// A cache that lives only as long as this value.
    pub fn in_memory(shards: usize) -> Self {
        Self {
            shards: (0..shards.max(1)).map(|_| RwLock::new(HashMap::new())).collect(),
            path: None,
            dirty: AtomicBool::new(false),
        }
    }

    /// Opens a file-backed cache, loading whatever the file holds.
    pub fn open(path: impl Into<PathBuf>, shards: usize) -> Self {
        let path = path.into();
        let mut cache = Self::in_memory(shards);

        match load_file(&path) {
            Ok(Some(entries)) => {
                info!(path = %path.display(), entries = entries.len(), "loaded result cache");
                for (url, entry) in entries {
                    cache.shard(&url).write().unwrap_or_else(PoisonError::into_inner).insert(url, entry);
                }
            }
            Ok(None) => debug!(path = %path.display(), "no result cache yet, starting empty"),
            Err(reason) => warn!(path = %path.display(), %reason, "result cache unreadable, starting empty"),
        }

        cache.path = Some(path);
        cache
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn shard(&self, url: &str) -> &Shard {
        let mut hasher = DefaultHasher::new();
        url.hash(&mut hasher);
        let index = (hasher.finish() % self.shards.len() as u64) as usize;
        &self.shards[index]
    }

    /// The cached result for `url` if it was recorded at most `max_age` ago.
    pub fn get(&self, url: &str, max_age: Duration) -> Option<UrlCheckResult> {
        let shard = self.shard(url).read().unwrap_or_else(PoisonError::into_inner);
        let entry = shard.get(url)?;

        // A timestamp from the future (clock skew) counts as fresh.
        let age = Utc::now().signed_duration_since(entry.recorded_at);
        let fresh = match age.to_std() {
            Ok(age) => age <= max_age,
            Err(_) => true,
        };
        fresh.then(|| entry.result.clone())
    }

    /// Stores `result`, replacing any previous entry for its URL.
    pub fn set(&self, result: UrlCheckResult) {
        self.set_at(result, Utc::now());
    }

    pub fn set_at(&self, result: UrlCheckResult, recorded_at: DateTime<Utc>) {
        let url = result.url.clone();
        let entry = CacheEntry { result, recorded_at };
        self.shard(&url)
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url, entry);
        self.dirty.store(true, Ordering::Release);
    }

    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|s| s.read().unwrap_or_else(PoisonError::into_inner).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Writes the cache to its file, if it has one and anything changed.
    ///
    /// The file is written to a temporary sibling first and then renamed
    /// over the old one, so a crash never leaves a half-written cache.
    pub fn persist(&self) -> Result<(), CacheError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if !self.dirty.load(Ordering::Acquire) {
            return Ok(());
        }

        let mut entries = BTreeMap::new();
        for shard in &self.shards {
            let shard = shard.read().unwrap_or_else(PoisonError::into_inner);
            entries.extend(shard.iter().map(|(url, entry)| (url.clone(), entry.clone())));
        }
        let count = entries.len();
        let bytes = serde_json::to_vec_pretty(&CacheFile {
            version: FORMAT_VERSION,
            entries,
        })?;

        let write_error = |source| CacheError::Write {
            path: path.clone(),
            source,
        };
        let parent = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                std::fs::create_dir_all(parent).map_err(write_error)?;
                parent
            }
            None => Path::new("."),
        };
        // A uniquely named sibling, renamed over the target once complete.
        let mut tmp = NamedTempFile::new_in(parent).map_err(write_error)?;
        tmp.write_all(&bytes).map_err(write_error)?;
        tmp.persist(path).map_err(|e| write_error(e.error))?;

        self.dirty.store(false, Ordering::Release);
        info!(path = %path.display(), entries = count, "saved result cache");
        Ok(())
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::in_memory(16)
    }
}

// Ok(None) when there is no file yet; Err with a reason when it is unusable.
fn load_file(path: &Path) -> Result<Option<BTreeMap<String, CacheEntry>>, String> {
    let raw = match std::fs::read(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.to_string()),
    };
    let file: CacheFile = serde_json::from_slice(&raw).map_err(|e| e.to_string())?;
    if file.version != FORMAT_VERSION {
        return Err(format!("unsupported cache version {}", file.version));
    }
    Ok(Some(file.entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::UrlStatus;
    use std::sync::Arc;

    fn result(url: &str, status: UrlStatus) -> UrlCheckResult {
        UrlCheckResult {
            url: url.to_string(),
            status,
            http_status: Some(200),
            redirect_chain: Vec::new(),
            error: None,
            checked_at: Utc::now(),
            latency_ms: 3,
            attempts: 1,
        }
    }

    #[test]
    fn test_get_respects_max_age() {
        let cache = ResultCache::in_memory(4);
        let old = Utc::now() - chrono::Duration::hours(2);
        cache.set_at(result("https://a.example", UrlStatus::Valid), old);

        assert!(cache.get("https://a.example", Duration::from_secs(3 * 3600)).is_some());
        assert!(cache.get("https://a.example", Duration::from_secs(3600)).is_none());
        assert!(cache.get("https://missing.example", Duration::from_secs(3600)).is_none());
    }

    #[test]
    fn test_future_timestamps_are_fresh() {
        let cache = ResultCache::in_memory(1);
        let future = Utc::now() + chrono::Duration::hours(1);
        cache.set_at(result("https://a.example", UrlStatus::Valid), future);
        assert!(cache.get("https://a.example", Duration::ZERO).is_some());
    }

    #[test]
    fn test_set_overwrites() {
        let cache = ResultCache::in_memory(2);
        cache.set(result("https://a.example", UrlStatus::Valid));
        cache.set(result("https://a.example", UrlStatus::Broken));
        let hit = cache.get("https://a.example", Duration::from_secs(60)).unwrap();
        assert_eq!(hit.status, UrlStatus::Broken);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_concurrent_writers() {
        let cache = Arc::new(ResultCache::in_memory(8));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for i in 0..200 {
                        // Every thread also hammers one shared key.
                        cache.set(result(&format!("https://{t}.example/{i}"), UrlStatus::Valid));
                        cache.set(result("https://shared.example", UrlStatus::Valid));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 8 * 200 + 1);
        let shared = cache.get("https://shared.example", Duration::from_secs(60)).unwrap();
        assert_eq!(shared.url, "https://shared.example");
    }

    #[test]
    fn test_persist_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");

        let cache = ResultCache::open(&path, 4);
        assert!(cache.is_empty());
        let stored = result("https://a.example", UrlStatus::Redirected);
        cache.set(stored.clone());
        cache.persist().unwrap();

        let reopened = ResultCache::open(&path, 4);
        assert_eq!(reopened.get("https://a.example", Duration::from_secs(60)), Some(stored));
    }

    #[test]
    fn test_persist_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("cache.json");

        let cache = ResultCache::open(&path, 2);
        cache.set(result("https://a.example", UrlStatus::Valid));
        cache.persist().unwrap();

        assert!(path.exists());
        assert_eq!(ResultCache::open(&path, 2).len(), 1);
    }

    #[test]
    fn test_concurrent_persists_to_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let path = path.clone();
                std::thread::spawn(move || {
                    let cache = ResultCache::open(path, 2);
                    cache.set(result(&format!("https://{t}.example"), UrlStatus::Valid));
                    cache.persist()
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        // Whichever write landed last, the file is whole.
        let reopened = ResultCache::open(&path, 2);
        assert!((1..=4).contains(&reopened.len()));
        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_corrupt_file_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, b"{ not json").unwrap();

        let cache = ResultCache::open(&path, 4);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_unwritable_path_is_an_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        // A path below a regular file can never be created.
        let cache = ResultCache::open(file.path().join("cache.json"), 1);
        cache.set(result("https://a.example", UrlStatus::Valid));
        assert!(matches!(cache.persist(), Err(CacheError::Write { .. })));
    }

    #[test]
    fn test_in_memory_persist_is_noop() {
        let cache = ResultCache::in_memory(1);
        cache.set(result("https://a.example", UrlStatus::Valid));
        assert!(cache.persist().is_ok());
    }
}

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use awsnews_core::{ArticleRecord, ArticleSource, Clock, Result};
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// There is one upstream dataset, so every list query shares one key.
pub const SNAPSHOT_KEY: &str = "articles";

pub type Snapshot = Arc<Vec<ArticleRecord>>;

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub records: Snapshot,
    pub fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Fresh while `now - fetched_at < ttl`. A clock that has moved backwards counts as stale.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        match (now - self.fetched_at).to_std() {
            Ok(age) => age < ttl,
            Err(_) => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Time-boxed holder for the latest article index snapshot.
///
/// The lock is never held across the upstream call. Two callers that both see an
/// expired entry will both fetch, and whichever store lands last is kept.
pub struct SnapshotCache {
    source: Arc<dyn ArticleSource>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
    stats: RwLock<CacheStats>,
}

impl SnapshotCache {
    pub fn new(source: Arc<dyn ArticleSource>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            source,
            clock,
            ttl,
            entries: RwLock::new(HashMap::new()),
            stats: RwLock::new(CacheStats { hits: 0, misses: 0 }),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached snapshot while fresh, otherwise refetches and stores it.
    pub async fn get_snapshot(&self) -> Result<Snapshot> {
        let now = self.clock.now();

        if let Some(entry) = self.entries.read().await.get(SNAPSHOT_KEY) {
            if entry.is_fresh(now, self.ttl) {
                debug!("Snapshot cache hit ({} records)", entry.records.len());
                self.stats.write().await.hits += 1;
                return Ok(entry.records.clone());
            }
        }

        debug!("Snapshot cache miss, fetching article index");
        self.stats.write().await.misses += 1;

        // A failed fetch leaves any previous entry untouched
        let records: Snapshot = Arc::new(self.source.fetch_all().await?);
        let entry = CacheEntry {
            records: records.clone(),
            fetched_at: self.clock.now(),
        };
        self.entries.write().await.insert(SNAPSHOT_KEY.to_string(), entry);
        info!("🗄️ Cached snapshot of {} articles", records.len());

        Ok(records)
    }

    /// The stored entry, fresh or not.
    pub async fn entry(&self) -> Option<CacheEntry> {
        self.entries.read().await.get(SNAPSHOT_KEY).cloned()
    }

    pub async fn stats(&self) -> CacheStats {
        *self.stats.read().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use awsnews_core::{Error, ManualClock, PostType};
    use chrono::{NaiveDate, TimeZone};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FakeSource {
        records: Mutex<Vec<ArticleRecord>>,
        fail: AtomicBool,
        calls: AtomicUsize,
    }

    impl FakeSource {
        fn new(records: Vec<ArticleRecord>) -> Self {
            Self {
                records: Mutex::new(records),
                fail: AtomicBool::new(false),
                calls: AtomicUsize::new(0),
            }
        }

        fn replace(&self, records: Vec<ArticleRecord>) {
            *self.records.lock().unwrap() = records;
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ArticleSource for FakeSource {
        async fn fetch_all(&self) -> Result<Vec<ArticleRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(Error::UpstreamUnavailable("API error: 503".to_string()));
            }
            Ok(self.records.lock().unwrap().clone())
        }
    }

    fn record(id: &str) -> ArticleRecord {
        ArticleRecord {
            id: id.to_string(),
            title: format!("Post {}", id),
            url: format!("https://aws.amazon.com/blogs/aws/{}/", id),
            slug: id.to_string(),
            category: "Compute".to_string(),
            post_type: PostType::Blog,
            published: NaiveDate::from_ymd_opt(2024, 5, 7).unwrap(),
            popular: false,
            regional_expansion: false,
        }
    }

    fn setup() -> (SnapshotCache, Arc<FakeSource>, Arc<ManualClock>) {
        let source = Arc::new(FakeSource::new(vec![record("a")]));
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 7, 12, 0, 0).unwrap()));
        let cache = SnapshotCache::new(source.clone(), clock.clone(), Duration::from_secs(300));
        (cache, source, clock)
    }

    #[tokio::test]
    async fn test_serves_cached_snapshot_within_window() {
        let (cache, source, clock) = setup();

        let first = cache.get_snapshot().await.unwrap();
        source.replace(vec![record("b")]);
        clock.advance(chrono::Duration::seconds(299));
        let second = cache.get_snapshot().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(second[0].id, "a");
        assert_eq!(source.calls(), 1);
        assert_eq!(cache.stats().await, CacheStats { hits: 1, misses: 1 });
    }

    #[tokio::test]
    async fn test_refetches_once_window_elapses() {
        let (cache, source, clock) = setup();

        cache.get_snapshot().await.unwrap();
        source.replace(vec![record("b")]);
        clock.advance(chrono::Duration::seconds(300));
        let refreshed = cache.get_snapshot().await.unwrap();

        assert_eq!(refreshed[0].id, "b");
        assert_eq!(source.calls(), 2);
        let entry = cache.entry().await.unwrap();
        assert_eq!(entry.fetched_at, clock.now());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_entry() {
        let (cache, source, clock) = setup();

        cache.get_snapshot().await.unwrap();
        clock.advance(chrono::Duration::minutes(10));
        source.fail.store(true, Ordering::SeqCst);

        let err = cache.get_snapshot().await.unwrap_err();
        assert!(matches!(err, Error::UpstreamUnavailable(_)));
        assert_eq!(cache.entry().await.unwrap().records[0].id, "a");

        // The stale entry is not served; the next call tries again
        source.fail.store(false, Ordering::SeqCst);
        source.replace(vec![record("c")]);
        assert_eq!(cache.get_snapshot().await.unwrap()[0].id, "c");
        assert_eq!(source.calls(), 3);
    }

    #[test]
    fn test_entry_freshness_bounds() {
        let fetched_at = Utc.with_ymd_and_hms(2024, 5, 7, 12, 0, 0).unwrap();
        let entry = CacheEntry {
            records: Arc::new(vec![]),
            fetched_at,
        };
        let ttl = Duration::from_secs(300);

        assert!(entry.is_fresh(fetched_at, ttl));
        assert!(entry.is_fresh(fetched_at + chrono::Duration::seconds(299), ttl));
        assert!(!entry.is_fresh(fetched_at + chrono::Duration::seconds(300), ttl));
        assert!(!entry.is_fresh(fetched_at - chrono::Duration::seconds(1), ttl));
    }
}

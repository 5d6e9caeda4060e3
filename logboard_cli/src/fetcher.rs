//! Detail fetching with cache consultation

use crate::cache::DetailCache;
use crate::client::DetailSource;
use logboard_common::{ApiError, EntryDetail};
use std::sync::Arc;

/// Resolves entry detail records, consulting the cache before the
/// network and populating it on success.
///
/// No retry and no in-flight deduplication: two concurrent fetches
/// for the same identifier may both hit the network and both write the
/// cache, which is harmless because detail records are immutable.
#[derive(Clone)]
pub struct DetailFetcher {
    cache: Arc<dyn DetailCache>,
    source: Arc<dyn DetailSource>,
}

impl DetailFetcher {
    pub fn new(cache: Arc<dyn DetailCache>, source: Arc<dyn DetailSource>) -> Self {
        Self { cache, source }
    }

    /// Resolve the detail record for `entry_id`.
    ///
    /// A cache hit resolves without any network traffic. On a network
    /// or parse failure nothing is cached, so the user can retry by
    /// reopening the entry.
    pub async fn fetch_detail(&self, entry_id: &str) -> Result<EntryDetail, ApiError> {
        if let Some(record) = self.cache.get(entry_id) {
            tracing::debug!(entry_id, "detail cache hit");
            return Ok(record);
        }

        match self.source.fetch(entry_id).await {
            Ok(record) => {
                self.cache.put(entry_id, record.clone());
                Ok(record)
            }
            Err(err) => {
                tracing::warn!(entry_id, error = %err, "detail fetch failed");
                Err(ApiError::for_entry(entry_id, err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fake source that counts how often the network is hit
    struct CountingSource {
        records: HashMap<String, EntryDetail>,
        calls: AtomicUsize,
    }

    impl CountingSource {
        fn with_record(entry_id: &str, record: EntryDetail) -> Self {
            let mut records = HashMap::new();
            records.insert(entry_id.to_string(), record);
            Self {
                records,
                calls: AtomicUsize::new(0),
            }
        }

        fn empty() -> Self {
            Self {
                records: HashMap::new(),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl DetailSource for CountingSource {
        async fn fetch(&self, entry_id: &str) -> Result<EntryDetail, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.records
                .get(entry_id)
                .cloned()
                .ok_or_else(|| ApiError::Network("connection refused".to_string()))
        }
    }

    fn sample_detail() -> EntryDetail {
        EntryDetail {
            ip_address: "10.1.2.3".to_string(),
            timestamp: "2025-03-02 10:15:00".to_string(),
            method: "POST".to_string(),
            path: "/login".to_string(),
            protocol: Some("HTTP/1.1".to_string()),
            status_code: 302,
            response_size: 0,
            user_agent: "Mozilla/5.0".to_string(),
            referrer: Some("/".to_string()),
            parameters: vec![],
        }
    }

    #[tokio::test]
    async fn test_second_fetch_hits_cache() {
        let cache = Arc::new(MemoryCache::new());
        let source = Arc::new(CountingSource::with_record("7", sample_detail()));
        let fetcher = DetailFetcher::new(cache, source.clone());

        let first = fetcher.fetch_detail("7").await.unwrap();
        let second = fetcher.fetch_detail("7").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_failure_caches_nothing() {
        let cache = Arc::new(MemoryCache::new());
        let source = Arc::new(CountingSource::empty());
        let fetcher = DetailFetcher::new(cache.clone(), source.clone());

        let err = fetcher.fetch_detail("42").await.unwrap_err();
        match err {
            ApiError::FetchFailure { entry_id, .. } => assert_eq!(entry_id, "42"),
            other => panic!("expected FetchFailure, got {:?}", other),
        }
        assert!(cache.is_empty());

        // The failure is not sticky: a retry goes back to the network
        let _ = fetcher.fetch_detail("42").await;
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_cache_preloaded_entry_skips_network() {
        let cache = Arc::new(MemoryCache::new());
        cache.put("9", sample_detail());
        let source = Arc::new(CountingSource::empty());
        let fetcher = DetailFetcher::new(cache, source.clone());

        let record = fetcher.fetch_detail("9").await.unwrap();
        assert_eq!(record.path, "/login");
        assert_eq!(source.calls(), 0);
    }
}

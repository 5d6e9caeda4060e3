//! Session-scoped cache for entry detail records

use dashmap::DashMap;
use logboard_common::EntryDetail;

/// Key/value store for previously fetched detail records.
///
/// Records are immutable once created, so there is no eviction and no
/// invalidation; the store lives for the session and is naturally
/// bounded by how many entries the user inspects. The backing medium
/// is an implementation detail behind this trait.
pub trait DetailCache: Send + Sync {
    fn get(&self, entry_id: &str) -> Option<EntryDetail>;
    fn put(&self, entry_id: &str, record: EntryDetail);
}

/// In-memory cache over a concurrent map.
///
/// Writes are idempotent per key (the same identifier always maps to
/// the same record), so concurrent fetches for one key may both write
/// without coordination; last write wins.
#[derive(Default)]
pub struct MemoryCache {
    entries: DashMap<String, EntryDetail>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DetailCache for MemoryCache {
    fn get(&self, entry_id: &str) -> Option<EntryDetail> {
        self.entries.get(entry_id).map(|r| r.value().clone())
    }

    fn put(&self, entry_id: &str, record: EntryDetail) {
        self.entries.insert(entry_id.to_string(), record);
    }
}

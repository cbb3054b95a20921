//! Memoized statistics keyed by record-set content.
//!
//! Wraps a [`StatsAggregator`] so repeated requests for an unchanged record
//! set reuse the previous [`StatsSnapshot`]. The cache key is a SHA-256
//! fingerprint of the serialized records, so any change to any field of any
//! record (or to record order) forces a recompute.

use sha2::{Digest, Sha256};

use booking_core::models::Record;

use crate::aggregator::{StatsAggregator, StatsSnapshot};

/// Stable content fingerprint of a record set.
///
/// Records are hashed in order with a length prefix per record so that
/// `[{a}, {b}]` and `[{ab}]` cannot collide.
pub fn fingerprint(records: &[Record]) -> String {
    let mut hasher = Sha256::new();
    hasher.update((records.len() as u64).to_le_bytes());
    for record in records {
        let json = serde_json::to_string(record).unwrap_or_default();
        hasher.update((json.len() as u64).to_le_bytes());
        hasher.update(json.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

// ── StatsCache ────────────────────────────────────────────────────────────────

/// Single-entry memo around [`StatsAggregator::aggregate`].
///
/// # Example
/// ```
/// use booking_core::models::Record;
/// use booking_data::cache::StatsCache;
/// use booking_data::aggregator::StatsAggregator;
///
/// let mut cache = StatsCache::new(StatsAggregator::default());
/// let records = vec![Record::new().with("category", "internal")];
/// assert_eq!(cache.get(&records).total(), 1);
/// assert_eq!(cache.get(&records).total(), 1);
/// assert_eq!(cache.hits(), 1);
/// ```
pub struct StatsCache {
    aggregator: StatsAggregator,
    /// Fingerprint of the record set behind `snapshot`.
    key: Option<String>,
    snapshot: Option<StatsSnapshot>,
    hits: u64,
    misses: u64,
}

impl StatsCache {
    pub fn new(aggregator: StatsAggregator) -> Self {
        Self {
            aggregator,
            key: None,
            snapshot: None,
            hits: 0,
            misses: 0,
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Snapshot for `records`, recomputed only when their content changed.
    pub fn get(&mut self, records: &[Record]) -> &StatsSnapshot {
        let key = fingerprint(records);

        if self.key.as_deref() == Some(key.as_str()) && self.snapshot.is_some() {
            self.hits += 1;
            tracing::debug!(key = %key, "returning cached booking stats");
        } else {
            self.misses += 1;
            tracing::debug!(key = %key, records = records.len(), "recomputing booking stats");
            self.snapshot = None;
            self.key = Some(key);
        }

        let aggregator = &self.aggregator;
        self.snapshot
            .get_or_insert_with(|| aggregator.aggregate(records))
    }

    /// Discard the cached snapshot, forcing the next [`get`](Self::get) to recompute.
    pub fn invalidate(&mut self) {
        self.key = None;
        self.snapshot = None;
        tracing::debug!("booking stats cache invalidated");
    }

    /// Fingerprint of the currently cached record set, if any.
    pub fn cached_key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use booking_core::time_utils::DateTimeParser;

    fn make_cache() -> StatsCache {
        StatsCache::new(StatsAggregator::new(DateTimeParser::new("UTC")))
    }

    fn sample() -> Vec<Record> {
        vec![
            Record::new()
                .with("category", "internal")
                .with("department", "A")
                .with("start", "2024-05-05 09:00:00"),
            Record::new()
                .with("category", "external")
                .with("department", "B")
                .with("start", "2024-05-06 09:00:00"),
        ]
    }

    #[test]
    fn test_cache_miss_on_first_call() {
        let mut cache = make_cache();
        assert!(cache.cached_key().is_none());

        let total = cache.get(&sample()).total();
        assert_eq!(total, 2);
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.hits(), 0);
        assert!(cache.cached_key().is_some());
    }

    #[test]
    fn test_cache_hit_for_equal_content() {
        let mut cache = make_cache();
        let first = cache.get(&sample()).clone();

        // A distinct allocation with identical content still hits.
        let second = cache.get(&sample()).clone();

        assert_eq!(first, second);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);
    }

    #[test]
    fn test_cache_recomputes_on_change() {
        let mut cache = make_cache();
        let mut records = sample();
        assert_eq!(cache.get(&records).internal(), 1);

        records.push(Record::new().with("category", "internal"));
        assert_eq!(cache.get(&records).internal(), 2);
        assert_eq!(cache.misses(), 2);

        records[0] = Record::new().with("category", "external");
        assert_eq!(cache.get(&records).internal(), 1);
        assert_eq!(cache.misses(), 3);
        assert_eq!(cache.hits(), 0);
    }

    #[test]
    fn test_invalidate_forces_recompute() {
        let mut cache = make_cache();
        let records = sample();
        cache.get(&records);

        cache.invalidate();
        assert!(cache.cached_key().is_none());

        cache.get(&records);
        assert_eq!(cache.misses(), 2);
        assert_eq!(cache.hits(), 0);
    }

    #[test]
    fn test_fingerprint_is_order_sensitive_and_stable() {
        let records = sample();
        let mut reversed = records.clone();
        reversed.reverse();

        assert_eq!(fingerprint(&records), fingerprint(&sample()));
        assert_ne!(fingerprint(&records), fingerprint(&reversed));
        assert_ne!(fingerprint(&[]), fingerprint(&records));
        assert_eq!(fingerprint(&[]).len(), 64);
    }
}

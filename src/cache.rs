// =============================================================================
// Result Cache — namespaced TTL store for computed analysis payloads
// =============================================================================
//
// Maps string keys to opaque serialized payloads inside independent
// namespaces (raw bar data, valuation, financials, margin trading, index
// constituents, full analysis results). Entries expire `expire_hours` after
// they were written:
//
//   * lazy expiry  — an expired entry is a miss on read
//   * purge        — an explicit sweep deletes every expired entry
//   * write policy — insert-or-replace; a rewrite resets `created_at`
//
// The cache is the only shared resource between concurrent analyses. Every
// public operation takes the lock exactly once, so get and set are single
// atomic steps with no read-then-write races.
//
// Methods with an `_at` suffix take an explicit `now`, which is how the
// tests simulate clock advancement past the TTL.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Independent cache namespaces, one per payload kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CacheNamespace {
    StockBasic,
    StockValuation,
    StockFinancial,
    MarginTrading,
    IndexConstituents,
    AnalysisResult,
}

impl CacheNamespace {
    pub const ALL: [CacheNamespace; 6] = [
        Self::StockBasic,
        Self::StockValuation,
        Self::StockFinancial,
        Self::MarginTrading,
        Self::IndexConstituents,
        Self::AnalysisResult,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StockBasic => "stock_basic",
            Self::StockValuation => "stock_valuation",
            Self::StockFinancial => "stock_financial",
            Self::MarginTrading => "margin_trading",
            Self::IndexConstituents => "index_constituents",
            Self::AnalysisResult => "analysis_result",
        }
    }
}

impl std::fmt::Display for CacheNamespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable cache entry. Overwritten wholesale, never patched.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    payload: String,
    created_at: DateTime<Utc>,
}

/// Aggregate cache statistics for monitoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_records: usize,
    pub expired_records: usize,
    pub valid_records: usize,
    /// Entry count per namespace.
    pub table_stats: BTreeMap<String, usize>,
    /// Approximate storage footprint: key plus payload bytes.
    pub storage_bytes: usize,
    pub oldest_entry: Option<DateTime<Utc>>,
    pub newest_entry: Option<DateTime<Utc>>,
    pub cache_expire_hours: i64,
    pub status: String,
}

/// TTL-keyed result cache shared by concurrent analysis calls.
pub struct ResultCache {
    stores: RwLock<HashMap<CacheNamespace, HashMap<String, CacheEntry>>>,
    expire_hours: i64,
}

impl ResultCache {
    pub fn new(expire_hours: i64) -> Self {
        info!(expire_hours, "result cache initialised");
        Self {
            stores: RwLock::new(HashMap::new()),
            expire_hours,
        }
    }

    /// Whether an entry created at `created_at` has outlived the TTL.
    pub fn is_expired(&self, created_at: DateTime<Utc>) -> bool {
        self.is_expired_at(created_at, Utc::now())
    }

    pub fn is_expired_at(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now > created_at + Duration::hours(self.expire_hours)
    }

    /// Fetch a payload; an expired entry is a miss.
    pub fn get(&self, namespace: CacheNamespace, key: &str) -> Option<String> {
        self.get_at(namespace, key, Utc::now())
    }

    pub fn get_at(
        &self,
        namespace: CacheNamespace,
        key: &str,
        now: DateTime<Utc>,
    ) -> Option<String> {
        let stores = self.stores.read();
        let entry = stores.get(&namespace)?.get(key)?;
        if self.is_expired_at(entry.created_at, now) {
            debug!(%namespace, key, "cache entry expired, treating as miss");
            return None;
        }
        Some(entry.payload.clone())
    }

    /// Insert or replace; a rewrite fully overwrites the prior entry and
    /// resets its creation time.
    pub fn set(&self, namespace: CacheNamespace, key: &str, payload: impl Into<String>) {
        self.set_at(namespace, key, payload, Utc::now());
    }

    pub fn set_at(
        &self,
        namespace: CacheNamespace,
        key: &str,
        payload: impl Into<String>,
        now: DateTime<Utc>,
    ) {
        let mut stores = self.stores.write();
        stores.entry(namespace).or_default().insert(
            key.to_string(),
            CacheEntry {
                payload: payload.into(),
                created_at: now,
            },
        );
    }

    /// Delete every expired entry across all namespaces; returns the number
    /// removed.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Utc::now())
    }

    pub fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut stores = self.stores.write();
        let mut removed = 0;
        for entries in stores.values_mut() {
            let before = entries.len();
            entries.retain(|_, e| !self.is_expired_at(e.created_at, now));
            removed += before - entries.len();
        }
        if removed > 0 {
            info!(removed, "purged expired cache entries");
        }
        removed
    }

    /// Per-namespace and aggregate counts plus the storage footprint.
    pub fn stats(&self) -> CacheStats {
        self.stats_at(Utc::now())
    }

    pub fn stats_at(&self, now: DateTime<Utc>) -> CacheStats {
        let stores = self.stores.read();

        let mut table_stats = BTreeMap::new();
        let mut total = 0;
        let mut expired = 0;
        let mut storage_bytes = 0;
        let mut oldest: Option<DateTime<Utc>> = None;
        let mut newest: Option<DateTime<Utc>> = None;

        for namespace in CacheNamespace::ALL {
            let entries = stores.get(&namespace);
            let count = entries.map(|e| e.len()).unwrap_or(0);
            table_stats.insert(namespace.as_str().to_string(), count);
            total += count;

            if let Some(entries) = entries {
                for (key, entry) in entries {
                    if self.is_expired_at(entry.created_at, now) {
                        expired += 1;
                    }
                    storage_bytes += key.len() + entry.payload.len();
                    oldest = Some(oldest.map_or(entry.created_at, |o| o.min(entry.created_at)));
                    newest = Some(newest.map_or(entry.created_at, |n| n.max(entry.created_at)));
                }
            }
        }

        CacheStats {
            total_records: total,
            expired_records: expired,
            valid_records: total - expired,
            table_stats,
            storage_bytes,
            oldest_entry: oldest,
            newest_entry: newest,
            cache_expire_hours: self.expire_hours,
            status: if total > 0 { "active" } else { "empty" }.to_string(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-06-01T09:30:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn set_then_get_round_trips() {
        let cache = ResultCache::new(6);
        cache.set(CacheNamespace::AnalysisResult, "abc", r#"{"x":1}"#);
        assert_eq!(
            cache.get(CacheNamespace::AnalysisResult, "abc").as_deref(),
            Some(r#"{"x":1}"#)
        );
    }

    #[test]
    fn miss_for_unknown_key_and_namespace() {
        let cache = ResultCache::new(6);
        cache.set(CacheNamespace::StockBasic, "abc", "v");
        assert!(cache.get(CacheNamespace::StockBasic, "other").is_none());
        // Namespaces are independent: same key, different namespace.
        assert!(cache.get(CacheNamespace::StockValuation, "abc").is_none());
    }

    #[test]
    fn entry_expires_after_ttl() {
        let cache = ResultCache::new(6);
        let now = t0();
        cache.set_at(CacheNamespace::AnalysisResult, "k", "v", now);

        // Within the TTL: hit.
        let later = now + Duration::hours(5);
        assert!(cache.get_at(CacheNamespace::AnalysisResult, "k", later).is_some());

        // TTL + 1 hour: lazy expiry turns the entry into a miss.
        let expired = now + Duration::hours(7);
        assert!(cache.get_at(CacheNamespace::AnalysisResult, "k", expired).is_none());
    }

    #[test]
    fn rewrite_resets_created_at() {
        let cache = ResultCache::new(6);
        let now = t0();
        cache.set_at(CacheNamespace::StockBasic, "k", "old", now);

        // Rewrite five hours later with new content.
        let rewrite = now + Duration::hours(5);
        cache.set_at(CacheNamespace::StockBasic, "k", "new", rewrite);

        // Seven hours after the original write the entry would have been
        // expired; the rewrite reset the clock.
        let check = now + Duration::hours(7);
        assert_eq!(
            cache.get_at(CacheNamespace::StockBasic, "k", check).as_deref(),
            Some("new")
        );
    }

    #[test]
    fn purge_removes_only_expired() {
        let cache = ResultCache::new(6);
        let now = t0();
        cache.set_at(CacheNamespace::StockBasic, "old", "v", now);
        cache.set_at(CacheNamespace::AnalysisResult, "fresh", "v", now + Duration::hours(5));

        let removed = cache.purge_expired_at(now + Duration::hours(7));
        assert_eq!(removed, 1);
        assert!(cache
            .get_at(CacheNamespace::AnalysisResult, "fresh", now + Duration::hours(7))
            .is_some());
    }

    #[test]
    fn stats_report_expired_and_per_namespace_counts() {
        let cache = ResultCache::new(6);
        let now = t0();
        cache.set_at(CacheNamespace::StockBasic, "a", "1234", now);
        cache.set_at(CacheNamespace::StockBasic, "b", "12", now + Duration::hours(4));
        cache.set_at(CacheNamespace::AnalysisResult, "c", "123", now + Duration::hours(4));

        let stats = cache.stats_at(now + Duration::hours(7));
        assert_eq!(stats.total_records, 3);
        assert_eq!(stats.expired_records, 1); // "a" outlived the TTL
        assert_eq!(stats.valid_records, 2);
        assert_eq!(stats.table_stats["stock_basic"], 2);
        assert_eq!(stats.table_stats["analysis_result"], 1);
        assert_eq!(stats.table_stats["margin_trading"], 0);
        assert_eq!(stats.storage_bytes, "a1234".len() + "b12".len() + "c123".len());
        assert_eq!(stats.oldest_entry, Some(now));
        assert_eq!(stats.cache_expire_hours, 6);
        assert_eq!(stats.status, "active");
    }

    #[test]
    fn empty_cache_stats() {
        let cache = ResultCache::new(6);
        let stats = cache.stats();
        assert_eq!(stats.total_records, 0);
        assert_eq!(stats.status, "empty");
        assert!(stats.oldest_entry.is_none());
        // Every namespace is reported even when empty.
        assert_eq!(stats.table_stats.len(), CacheNamespace::ALL.len());
    }
}

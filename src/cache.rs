//! In-memory analysis cache with read-time TTL.
//!
//! Staleness is a read-time check: `get` stops returning an entry once it is
//! older than the TTL, but the entry stays in the map until the periodic
//! `sweep` removes it. No LRU, no capacity bound.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::clock::Clock;

/// Freshness window for reads (30 minutes).
pub const ANALYSIS_CACHE_TTL_SECS: u64 = 1_800;
/// Physical removal age used by the maintenance sweep (1 hour).
pub const ANALYSIS_CACHE_SWEEP_AGE_SECS: u64 = 3_600;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub report: String,
    /// Unix seconds at insertion; freshness is measured against this.
    pub inserted_at: u64,
    /// ISO timestamp stamped at generation time; returned verbatim on hits.
    pub created_at: String,
    pub data_sources: usize,
    pub session_id: String,
}

pub struct AnalysisCache {
    inner: Mutex<HashMap<String, CacheEntry>>,
    ttl_secs: u64,
    clock: Arc<dyn Clock>,
}

impl AnalysisCache {
    pub fn new(ttl_secs: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
            ttl_secs,
            clock,
        }
    }

    /// Store `entry` under `key`, stamping `inserted_at` with the current time.
    pub fn put(&self, key: &str, mut entry: CacheEntry) {
        entry.inserted_at = self.clock.now_unix();
        let mut map = self.inner.lock().expect("cache mutex poisoned");
        map.insert(key.to_string(), entry);
    }

    /// Fresh entry or `None`. A stale entry is treated as a miss and left in place.
    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        let now = self.clock.now_unix();
        let map = self.inner.lock().expect("cache mutex poisoned");
        map.get(key)
            .filter(|e| now.saturating_sub(e.inserted_at) < self.ttl_secs)
            .cloned()
    }

    /// Remove every entry older than `max_age_secs`. Called by the maintenance
    /// task, not by `get`. Returns the number of entries dropped.
    pub fn sweep(&self, max_age_secs: u64) -> usize {
        let now = self.clock.now_unix();
        let mut map = self.inner.lock().expect("cache mutex poisoned");
        let before = map.len();
        map.retain(|_, e| now.saturating_sub(e.inserted_at) <= max_age_secs);
        before - map.len()
    }

    /// Total entries including stale-but-unswept ones.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("cache mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

//! Lightweight usage-tracking sessions keyed by a derived id.
//!
//! Purely observational: nothing reads these back to authorize requests.
//! Sessions older than a day are dropped by the maintenance sweep.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use sha2::{Digest, Sha256};

use crate::clock::Clock;

/// Sessions older than this are removed by `cleanup`.
pub const SESSION_MAX_AGE_SECS: u64 = 86_400;

#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub api_key_hash: String,
    pub created_at: u64,
    pub request_count: u64,
    pub last_request_at: u64,
}

pub struct SessionStore {
    inner: Mutex<HashMap<String, SessionRecord>>,
    clock: Arc<dyn Clock>,
}

impl SessionStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Record one request for an API key, creating the tracking session on
    /// first use. Returns the derived session id.
    pub fn record_usage(&self, api_key: &str) -> String {
        let now = self.clock.now_unix();
        let hash = key_hash(api_key);
        let session_id = format!("api_key_{}", &hash[..12]);
        let mut map = self.inner.lock().expect("session mutex poisoned");
        let record = map.entry(session_id.clone()).or_insert(SessionRecord {
            api_key_hash: hash,
            created_at: now,
            request_count: 0,
            last_request_at: now,
        });
        record.request_count += 1;
        record.last_request_at = now;
        session_id
    }

    pub fn get(&self, session_id: &str) -> Option<SessionRecord> {
        let map = self.inner.lock().expect("session mutex poisoned");
        map.get(session_id).cloned()
    }

    /// Drop sessions older than `max_age_secs` since creation.
    pub fn cleanup(&self, max_age_secs: u64) -> usize {
        let now = self.clock.now_unix();
        let mut map = self.inner.lock().expect("session mutex poisoned");
        let before = map.len();
        map.retain(|_, s| now.saturating_sub(s.created_at) <= max_age_secs);
        before - map.len()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("session mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn key_hash(api_key: &str) -> String {
    let mut h = Sha256::new();
    h.update(api_key.as_bytes());
    format!("{:x}", h.finalize())
}

//! Per-identity rate limiting over two trailing windows (minute, hour).
//!
//! Each identity keeps the timestamps of its requests in the trailing hour.
//! Trimming to the hour is amortized: at most once per `TRIM_INTERVAL_SECS`
//! per identity, so the list may transiently hold older entries between trims.
//! The periodic sweep drops identities with no recent request at all.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::clock::Clock;

const MINUTE_WINDOW_SECS: u64 = 60;
const HOUR_WINDOW_SECS: u64 = 3_600;
/// Amortized per-identity trim cadence.
const TRIM_INTERVAL_SECS: u64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    MinuteLimitExceeded,
    HourLimitExceeded,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::MinuteLimitExceeded => "MINUTE_LIMIT_EXCEEDED",
            RejectReason::HourLimitExceeded => "HOUR_LIMIT_EXCEEDED",
        }
    }
}

#[derive(Debug, Default)]
struct RateWindow {
    requests: Vec<u64>,
    last_trimmed: u64,
}

pub struct RateLimiter {
    inner: Mutex<HashMap<String, RateWindow>>,
    requests_per_minute: usize,
    requests_per_hour: usize,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(requests_per_minute: usize, requests_per_hour: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
            requests_per_minute,
            requests_per_hour,
            clock,
        }
    }

    /// Minute window is checked first, then the hour window; on allow the
    /// current timestamp is recorded.
    pub fn check_and_record(&self, identity: &str) -> Result<(), RejectReason> {
        let now = self.clock.now_unix();
        let mut map = self.inner.lock().expect("rate limiter mutex poisoned");
        let window = map.entry(identity.to_string()).or_insert_with(|| RateWindow {
            requests: Vec::new(),
            last_trimmed: now,
        });

        if now.saturating_sub(window.last_trimmed) > TRIM_INTERVAL_SECS {
            window
                .requests
                .retain(|&ts| now.saturating_sub(ts) < HOUR_WINDOW_SECS);
            window.last_trimmed = now;
        }

        let last_minute = window
            .requests
            .iter()
            .filter(|&&ts| now.saturating_sub(ts) < MINUTE_WINDOW_SECS)
            .count();
        if last_minute >= self.requests_per_minute {
            return Err(RejectReason::MinuteLimitExceeded);
        }

        let last_hour = window
            .requests
            .iter()
            .filter(|&&ts| now.saturating_sub(ts) < HOUR_WINDOW_SECS)
            .count();
        if last_hour >= self.requests_per_hour {
            return Err(RejectReason::HourLimitExceeded);
        }

        window.requests.push(now);
        Ok(())
    }

    /// Drop identities with no request in the trailing hour; trim the rest.
    /// Returns the number of identities removed.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now_unix();
        let mut map = self.inner.lock().expect("rate limiter mutex poisoned");
        let before = map.len();
        map.retain(|_, w| {
            w.requests
                .retain(|&ts| now.saturating_sub(ts) < HOUR_WINDOW_SECS);
            w.last_trimmed = now;
            !w.requests.is_empty()
        });
        before - map.len()
    }

    /// Tracked identity count (for diagnostics/tests).
    pub fn tracked_identities(&self) -> usize {
        self.inner.lock().expect("rate limiter mutex poisoned").len()
    }
}

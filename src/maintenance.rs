//! Periodic maintenance: session cleanup, rate-limiter sweep, cache sweep.
//! Runs for the process lifetime; the returned handle is aborted at shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::cache::{AnalysisCache, ANALYSIS_CACHE_SWEEP_AGE_SECS};
use crate::rate_limiter::RateLimiter;
use crate::sessions::{SessionStore, SESSION_MAX_AGE_SECS};

pub const MAINTENANCE_INTERVAL_SECS: u64 = 300;

#[derive(Clone)]
pub struct MaintenanceTargets {
    pub cache: Arc<AnalysisCache>,
    pub limiter: Arc<RateLimiter>,
    pub boundary_limiter: Arc<RateLimiter>,
    pub sessions: Arc<SessionStore>,
}

/// One sweep pass; called by the loop and directly by tests.
pub fn run_sweep_once(t: &MaintenanceTargets) {
    let sessions_removed = t.sessions.cleanup(SESSION_MAX_AGE_SECS);
    let identities_removed = t.limiter.sweep() + t.boundary_limiter.sweep();
    let cache_removed = t.cache.sweep(ANALYSIS_CACHE_SWEEP_AGE_SECS);
    tracing::debug!(
        sessions_removed,
        identities_removed,
        cache_removed,
        "maintenance sweep complete"
    );
}

/// Spawn the background loop. First tick fires after one full interval.
pub fn spawn_maintenance(targets: MaintenanceTargets) -> JoinHandle<()> {
    tokio::spawn(async move {
        let period = Duration::from_secs(MAINTENANCE_INTERVAL_SECS);
        loop {
            tokio::time::sleep(period).await;
            run_sweep_once(&targets);
        }
    })
}

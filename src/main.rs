//! Sector Analysis API — Binary Entrypoint
//! Boots the Axum HTTP server: settings, shared state, routes, and the
//! periodic maintenance task (cancelled on shutdown).

use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sector_analysis_api::api::{create_router, AppState};
use sector_analysis_api::cache::{AnalysisCache, ANALYSIS_CACHE_TTL_SECS};
use sector_analysis_api::clock::{Clock, SystemClock};
use sector_analysis_api::collect::DataCollector;
use sector_analysis_api::config::Settings;
use sector_analysis_api::maintenance::{spawn_maintenance, MaintenanceTargets};
use sector_analysis_api::metrics::Metrics;
use sector_analysis_api::news_search::GoogleNewsRss;
use sector_analysis_api::orchestrator::Orchestrator;
use sector_analysis_api::persist::FileReportSink;
use sector_analysis_api::rate_limiter::RateLimiter;
use sector_analysis_api::report::GeminiGenerator;
use sector_analysis_api::sessions::SessionStore;

/// Blanket boundary cap, independent of the configurable limiter.
const BOUNDARY_REQUESTS_PER_MINUTE: usize = 10;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("sector_analysis_api=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let settings = Arc::new(Settings::from_env());
    tracing::info!(
        debug = settings.debug,
        gemini_configured = !settings.gemini_api_key.is_empty(),
        "starting Sector Analysis API"
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let metrics = Metrics::init(ANALYSIS_CACHE_TTL_SECS);

    let cache = Arc::new(AnalysisCache::new(ANALYSIS_CACHE_TTL_SECS, clock.clone()));
    let limiter = Arc::new(RateLimiter::new(
        settings.requests_per_minute,
        settings.requests_per_hour,
        clock.clone(),
    ));
    let boundary_limiter = Arc::new(RateLimiter::new(
        BOUNDARY_REQUESTS_PER_MINUTE,
        // Boundary layer only enforces the minute cap; hour stays open.
        usize::MAX,
        clock.clone(),
    ));
    let sessions = Arc::new(SessionStore::new(clock.clone()));

    let collector = Arc::new(DataCollector::new(Arc::new(GoogleNewsRss::new())));
    let generator = Arc::new(GeminiGenerator::new(&settings.gemini_api_key).await);
    let sink = Arc::new(FileReportSink::new(&settings.report_dir));
    let orchestrator = Arc::new(Orchestrator::new(
        collector,
        generator,
        cache.clone(),
        sink,
        clock.clone(),
    ));

    let maintenance = spawn_maintenance(MaintenanceTargets {
        cache,
        limiter: limiter.clone(),
        boundary_limiter: boundary_limiter.clone(),
        sessions: sessions.clone(),
    });

    let state = AppState {
        settings,
        orchestrator,
        limiter,
        boundary_limiter,
        sessions,
    };
    let router = create_router(state).merge(metrics.router());

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], 8000));
    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    // Interrupt the maintenance loop mid-sleep; no final sweep.
    maintenance.abort();
    tracing::info!("shut down");
    Ok(())
}

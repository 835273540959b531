//! Shared fixture for HTTP integration tests: an in-process router wired to
//! scripted collaborators, driven through `tower::ServiceExt::oneshot`.
#![allow(dead_code)] // each test binary uses a different slice of the fixture

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use tower::ServiceExt;

use sector_analysis_api::api::{create_router, AppState};
use sector_analysis_api::cache::{AnalysisCache, ANALYSIS_CACHE_TTL_SECS};
use sector_analysis_api::clock::ManualClock;
use sector_analysis_api::collect::SectorCollector;
use sector_analysis_api::config::Settings;
use sector_analysis_api::orchestrator::Orchestrator;
use sector_analysis_api::persist::MemorySink;
use sector_analysis_api::rate_limiter::RateLimiter;
use sector_analysis_api::report::{fallback_report, ReportGenerator};
use sector_analysis_api::sessions::SessionStore;
use sector_analysis_api::types::SectorSnapshot;

pub struct ScriptedCollector {
    pub calls: AtomicUsize,
    pub fail: bool,
}

#[async_trait]
impl SectorCollector for ScriptedCollector {
    async fn collect(&self, sector: &str) -> Result<SectorSnapshot> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // Real collection suspends on I/O; give concurrent requests a chance
        // to interleave the same way.
        tokio::task::yield_now().await;
        if self.fail {
            anyhow::bail!("search provider unreachable");
        }
        Ok(SectorSnapshot {
            sector: sector.to_string(),
            news_items: vec![],
            companies: sector_analysis_api::sectors::companies_for(sector),
            company_news: vec![],
            market_news: vec![],
            collected_at: "2026-08-29T00:00:00Z".into(),
            data_points: 5,
        })
    }
}

pub enum GeneratorMode {
    /// Healthy provider returning a short canned report.
    Healthy,
    /// Provider degraded internally: always serves the fallback template.
    Degraded,
    /// Wrapping fault the orchestrator must translate to a 500.
    WrappingFault,
}

pub struct ScriptedGenerator {
    pub calls: AtomicUsize,
    pub mode: GeneratorMode,
}

#[async_trait]
impl ReportGenerator for ScriptedGenerator {
    async fn generate(&self, snapshot: &SectorSnapshot) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.mode {
            GeneratorMode::Healthy => Ok(format!(
                "# Market Analysis Report: {} Sector\n\n## Executive Summary\n- All clear\n",
                snapshot.sector
            )),
            GeneratorMode::Degraded => Ok(fallback_report(&snapshot.sector)),
            GeneratorMode::WrappingFault => anyhow::bail!("generator panicked"),
        }
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }
}

pub struct TestApp {
    pub router: Router,
    pub collector: Arc<ScriptedCollector>,
    pub generator: Arc<ScriptedGenerator>,
    pub sink: Arc<MemorySink>,
    pub clock: Arc<ManualClock>,
}

pub struct TestAppConfig {
    pub requests_per_minute: usize,
    pub boundary_per_minute: usize,
    pub collector_fails: bool,
    pub generator_mode: GeneratorMode,
    pub sink_fails: bool,
    pub debug: bool,
}

impl Default for TestAppConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: 100,
            boundary_per_minute: 100,
            collector_fails: false,
            generator_mode: GeneratorMode::Healthy,
            sink_fails: false,
            debug: false,
        }
    }
}

pub fn build_app(cfg: TestAppConfig) -> TestApp {
    let clock = ManualClock::new(1_700_000_000);
    let settings = Arc::new(Settings {
        gemini_api_key: String::new(),
        api_key: "configured-key".into(),
        requests_per_minute: cfg.requests_per_minute,
        requests_per_hour: 100_000,
        debug: cfg.debug,
        report_dir: "unused".into(),
    });

    let collector = Arc::new(ScriptedCollector {
        calls: AtomicUsize::new(0),
        fail: cfg.collector_fails,
    });
    let generator = Arc::new(ScriptedGenerator {
        calls: AtomicUsize::new(0),
        mode: cfg.generator_mode,
    });
    let sink = Arc::new(if cfg.sink_fails {
        MemorySink::failing()
    } else {
        MemorySink::new()
    });

    let cache = Arc::new(AnalysisCache::new(ANALYSIS_CACHE_TTL_SECS, clock.clone()));
    let orchestrator = Arc::new(Orchestrator::new(
        collector.clone(),
        generator.clone(),
        cache,
        sink.clone(),
        clock.clone(),
    ));
    let limiter = Arc::new(RateLimiter::new(
        cfg.requests_per_minute,
        100_000,
        clock.clone(),
    ));
    let boundary_limiter = Arc::new(RateLimiter::new(
        cfg.boundary_per_minute,
        usize::MAX,
        clock.clone(),
    ));
    let sessions = Arc::new(SessionStore::new(clock.clone()));

    let router = create_router(AppState {
        settings,
        orchestrator,
        limiter,
        boundary_limiter,
        sessions,
    });

    TestApp {
        router,
        collector,
        generator,
        sink,
        clock,
    }
}

/// GET with optional extra headers; returns the raw response.
pub async fn get_with_headers(
    app: &Router,
    uri: &str,
    headers: &[(&str, &str)],
) -> Response<Body> {
    let mut req = Request::builder().method("GET").uri(uri);
    for (k, v) in headers {
        req = req.header(*k, *v);
    }
    app.clone()
        .oneshot(req.body(Body::empty()).expect("request build"))
        .await
        .expect("router response")
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    get_with_headers(app, uri, &[]).await
}

pub async fn body_json(resp: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

pub async fn body_string(resp: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    String::from_utf8(bytes.to_vec()).expect("utf8 body")
}

pub fn assert_status(resp: &Response<Body>, expected: StatusCode) {
    assert_eq!(resp.status(), expected);
}

/// Error bodies always carry `{error, detail, timestamp}`.
pub async fn assert_error_shape(resp: Response<Body>) -> serde_json::Value {
    let json = body_json(resp).await;
    assert!(json.get("error").is_some(), "missing error field: {json}");
    assert!(json.get("detail").is_some(), "missing detail field: {json}");
    assert!(
        json.get("timestamp").is_some(),
        "missing timestamp field: {json}"
    );
    json
}

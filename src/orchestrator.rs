//! Request-scoped analysis pipeline:
//! validate -> cache check -> collect -> generate -> persist -> respond.
//!
//! Persistence is best-effort and never changes the outcome. There is no
//! per-key single-flight: concurrent misses for the same sector each run the
//! full pipeline.

use metrics::counter;
use std::sync::Arc;
use thiserror::Error;

use crate::cache::{AnalysisCache, CacheEntry};
use crate::clock::Clock;
use crate::collect::SectorCollector;
use crate::persist::{artifact_content, artifact_filename, ReportSink};
use crate::report::ReportGenerator;

/// Constant caller-scope suffix: the cache is shared across callers per sector.
const CACHE_KEY_SUFFIX: &str = "anonymous";

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Sector name cannot be empty")]
    InvalidInput,
    #[error("Error collecting market data: {0}")]
    UpstreamData(String),
    #[error("Failed to generate analysis report: {0}")]
    Generation(String),
}

#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub sector: String,
    pub analysis_report: String,
    /// ISO timestamp; for cache hits this is the cached creation time.
    pub timestamp: String,
    pub data_sources: usize,
    pub session_id: String,
    pub cache_hit: bool,
}

pub struct Orchestrator {
    collector: Arc<dyn SectorCollector>,
    generator: Arc<dyn ReportGenerator>,
    cache: Arc<AnalysisCache>,
    sink: Arc<dyn ReportSink>,
    clock: Arc<dyn Clock>,
}

impl Orchestrator {
    pub fn new(
        collector: Arc<dyn SectorCollector>,
        generator: Arc<dyn ReportGenerator>,
        cache: Arc<AnalysisCache>,
        sink: Arc<dyn ReportSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            collector,
            generator,
            cache,
            sink,
            clock,
        }
    }

    /// Trim + lowercase; empty input is rejected before any external call.
    pub fn normalize_sector(sector: &str) -> Result<String, AnalysisError> {
        let s = sector.trim().to_lowercase();
        if s.is_empty() {
            return Err(AnalysisError::InvalidInput);
        }
        Ok(s)
    }

    pub async fn analyze(&self, sector: &str) -> Result<AnalysisOutcome, AnalysisError> {
        let sector = Self::normalize_sector(sector)?;
        counter!("analysis_requests_total").increment(1);

        let cache_key = format!("{sector}_{CACHE_KEY_SUFFIX}");
        if let Some(hit) = self.cache.get(&cache_key) {
            counter!("analysis_cache_hits_total").increment(1);
            tracing::info!(sector = %sector, "returning cached analysis");
            return Ok(AnalysisOutcome {
                sector,
                analysis_report: hit.report,
                timestamp: hit.created_at,
                data_sources: hit.data_sources,
                session_id: hit.session_id,
                cache_hit: true,
            });
        }
        counter!("analysis_cache_misses_total").increment(1);

        tracing::info!(sector = %sector, "collecting sector data");
        let snapshot = self
            .collector
            .collect(&sector)
            .await
            .map_err(|e| AnalysisError::UpstreamData(e.to_string()))?;

        tracing::info!(sector = %sector, data_points = snapshot.data_points, "generating analysis");
        let report = self
            .generator
            .generate(&snapshot)
            .await
            .map_err(|e| AnalysisError::Generation(e.to_string()))?;

        let session_id = format!("anonymous_{}", self.clock.now_unix());
        let created_at = chrono::Utc::now().to_rfc3339();

        // Best-effort artifact write; failure is logged and swallowed.
        let now = chrono::Utc::now();
        let filename = artifact_filename(&sector, now);
        let content = artifact_content(&sector, &session_id, snapshot.data_points, &report, now);
        if let Err(e) = self.sink.store(&filename, &content).await {
            tracing::error!(error = ?e, sector = %sector, "failed to persist analysis report");
        }

        self.cache.put(
            &cache_key,
            CacheEntry {
                report: report.clone(),
                inserted_at: 0, // stamped by the cache
                created_at: created_at.clone(),
                data_sources: snapshot.data_points,
                session_id: session_id.clone(),
            },
        );

        Ok(AnalysisOutcome {
            sector,
            analysis_report: report,
            timestamp: created_at,
            data_sources: snapshot.data_points,
            session_id,
            cache_hit: false,
        })
    }
}

use axum::{routing::get, Router};
use metrics::{describe_counter, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder and describe the service series.
    pub fn init(cache_ttl_secs: u64) -> Self {
        let builder = PrometheusBuilder::new();
        let handle = builder
            .install_recorder()
            .expect("prometheus: install recorder");

        describe_counter!(
            "analysis_requests_total",
            "Analysis requests entering the pipeline."
        );
        describe_counter!("analysis_cache_hits_total", "Analyses served from cache.");
        describe_counter!(
            "analysis_cache_misses_total",
            "Analyses that ran the full pipeline."
        );
        describe_counter!(
            "rate_limit_rejections_total",
            "Requests rejected by either rate-limit layer."
        );
        describe_counter!(
            "auth_failures_total",
            "Requests with a missing or unknown API key."
        );

        gauge!("analysis_cache_ttl_secs").set(cache_ttl_secs as f64);

        Self { handle }
    }

    /// Router exposing `/metrics` in the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

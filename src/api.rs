//! HTTP surface: routes, API-key gating, rate-limit layers, and JSON/HTML
//! response negotiation around the orchestrator.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use metrics::counter;
use serde::Serialize;
use tower_http::cors::CorsLayer;

use crate::auth::verify_api_key;
use crate::config::{Settings, APP_VERSION};
use crate::orchestrator::{AnalysisError, AnalysisOutcome, Orchestrator};
use crate::rate_limiter::RateLimiter;
use crate::render::{landing_page, markdown_to_html, report_page};
use crate::sessions::SessionStore;

/// Diagnostics header carrying HIT/MISS for the analysis cache.
pub const CACHE_HEADER: &str = "X-Analysis-Cache";

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub orchestrator: Arc<Orchestrator>,
    /// Configurable per-minute/per-hour limiter.
    pub limiter: Arc<RateLimiter>,
    /// Blanket 10 req/min boundary limiter; independent of the main one.
    pub boundary_limiter: Arc<RateLimiter>,
    pub sessions: Arc<SessionStore>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/analyze/{sector}", get(analyze_sector))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthCheck {
    status: &'static str,
    timestamp: String,
    version: &'static str,
    gemini_api_configured: bool,
}

#[derive(Serialize)]
pub struct SectorAnalysisResponse {
    pub sector: String,
    pub analysis_report: String,
    pub timestamp: String,
    pub data_sources: usize,
    pub session_id: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub detail: Option<String>,
    pub timestamp: String,
}

async fn root() -> Html<String> {
    Html(landing_page())
}

async fn health(State(state): State<AppState>) -> Json<HealthCheck> {
    Json(HealthCheck {
        status: "healthy",
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: APP_VERSION,
        gemini_api_configured: !state.settings.gemini_api_key.is_empty(),
    })
}

async fn analyze_sector(
    State(state): State<AppState>,
    Path(sector): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let Some(api_key) = verify_api_key(&headers, &query, &state.settings) else {
        counter!("auth_failures_total").increment(1);
        return error_response(
            StatusCode::UNAUTHORIZED,
            "Invalid or missing API Key",
            Some(
                "Use header 'x-api-key' or query parameter '?api_key=your-key'."
                    .to_string(),
            ),
        );
    };

    let identity = client_identity(&headers);
    for limiter in [&state.boundary_limiter, &state.limiter] {
        if let Err(reason) = limiter.check_and_record(&identity) {
            counter!("rate_limit_rejections_total").increment(1);
            return error_response(
                StatusCode::TOO_MANY_REQUESTS,
                "Rate limit exceeded",
                Some(reason.as_str().to_string()),
            );
        }
    }

    state.sessions.record_usage(&api_key);

    let outcome = match state.orchestrator.analyze(&sector).await {
        Ok(outcome) => outcome,
        Err(e) => {
            let status = match e {
                AnalysisError::InvalidInput => StatusCode::BAD_REQUEST,
                AnalysisError::UpstreamData(_) | AnalysisError::Generation(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            tracing::error!(error = %e, sector = %sector, "analysis failed");
            let detail = if state.settings.debug || status == StatusCode::BAD_REQUEST {
                Some(e.to_string())
            } else {
                Some("An unexpected error occurred".to_string())
            };
            let error = match status {
                StatusCode::BAD_REQUEST => "Invalid sector",
                _ => "Internal server error",
            };
            return error_response(status, error, detail);
        }
    };

    let cache_header = if outcome.cache_hit {
        HeaderValue::from_static("HIT")
    } else {
        HeaderValue::from_static("MISS")
    };
    let mut resp = if wants_html(&query, &headers) {
        let body = report_page(
            &outcome.sector,
            &outcome.timestamp,
            outcome.data_sources,
            &outcome.session_id,
            &markdown_to_html(&outcome.analysis_report),
        );
        Html(body).into_response()
    } else {
        json_outcome(outcome).into_response()
    };
    resp.headers_mut().insert(CACHE_HEADER, cache_header);
    resp
}

fn json_outcome(outcome: AnalysisOutcome) -> Json<SectorAnalysisResponse> {
    Json(SectorAnalysisResponse {
        sector: outcome.sector,
        analysis_report: outcome.analysis_report,
        timestamp: outcome.timestamp,
        data_sources: outcome.data_sources,
        session_id: outcome.session_id,
    })
}

fn error_response(status: StatusCode, error: &str, detail: Option<String>) -> Response {
    let body = ErrorResponse {
        error: error.to_string(),
        detail,
        timestamp: chrono::Utc::now().to_rfc3339(),
    };
    (status, Json(body)).into_response()
}

/// `format=auto|json|html`; `auto` renders HTML only for browser-looking
/// requests that accept text/html.
fn wants_html(query: &HashMap<String, String>, headers: &HeaderMap) -> bool {
    let format = query.get("format").map(String::as_str).unwrap_or("auto");
    match format {
        "html" => true,
        "json" => false,
        _ => {
            let ua = header_lower(headers, "user-agent");
            let accept = header_lower(headers, "accept");
            let browser_ua =
                ua.contains("mozilla") || ua.contains("chrome") || ua.contains("safari");
            browser_ua && accept.contains("text/html")
        }
    }
}

fn header_lower(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_lowercase()
}

/// Caller identity for rate limiting: first hop of `x-forwarded-for`, else a
/// shared placeholder (single origin when no proxy headers are present).
pub fn client_identity(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

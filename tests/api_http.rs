//! HTTP surface tests: routes, auth gating, response shapes, and JSON/HTML
//! format negotiation, all against an in-process router with scripted
//! collaborators.

mod common;

use axum::http::StatusCode;
use common::*;

const KEY: &str = "demo-key-123";

#[tokio::test]
async fn landing_page_needs_no_auth() {
    let app = build_app(TestAppConfig::default());
    let resp = get(&app.router, "/").await;
    assert_status(&resp, StatusCode::OK);
    let body = body_string(resp).await;
    assert!(body.contains("Sector Analysis API"));
    assert!(body.contains("/analyze/"));
}

#[tokio::test]
async fn health_reports_status_and_version() {
    let app = build_app(TestAppConfig::default());
    let resp = get(&app.router, "/health").await;
    assert_status(&resp, StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["gemini_api_configured"], false);
    assert!(json["version"].as_str().is_some_and(|v| !v.is_empty()));
    assert!(json["timestamp"].as_str().is_some());
}

#[tokio::test]
async fn missing_key_is_401_with_error_shape() {
    let app = build_app(TestAppConfig::default());
    let resp = get(&app.router, "/analyze/technology").await;
    assert_status(&resp, StatusCode::UNAUTHORIZED);
    let json = assert_error_shape(resp).await;
    assert_eq!(json["error"], "Invalid or missing API Key");
    assert_eq!(app.collector.calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unknown_key_is_401() {
    let app = build_app(TestAppConfig::default());
    let resp = get(&app.router, "/analyze/technology?api_key=not-a-key").await;
    assert_status(&resp, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn header_and_query_credentials_both_work() {
    let app = build_app(TestAppConfig::default());

    let resp = get_with_headers(&app.router, "/analyze/banking", &[("x-api-key", KEY)]).await;
    assert_status(&resp, StatusCode::OK);

    let resp = get(&app.router, "/analyze/banking?api_key=configured-key").await;
    assert_status(&resp, StatusCode::OK);
}

#[tokio::test]
async fn analyze_returns_json_payload_by_default() {
    let app = build_app(TestAppConfig::default());
    let resp = get_with_headers(&app.router, "/analyze/technology", &[("x-api-key", KEY)]).await;
    assert_status(&resp, StatusCode::OK);
    assert_eq!(
        resp.headers().get("X-Analysis-Cache").unwrap(),
        "MISS",
        "first request must be a cache miss"
    );
    let json = body_json(resp).await;
    assert_eq!(json["sector"], "technology");
    assert_eq!(json["data_sources"], 5);
    assert!(json["analysis_report"]
        .as_str()
        .unwrap()
        .contains("technology"));
    assert!(json["session_id"].as_str().unwrap().starts_with("anonymous_"));
    assert!(json["timestamp"].as_str().is_some());
}

#[tokio::test]
async fn sector_is_normalized_in_response() {
    let app = build_app(TestAppConfig::default());
    let resp = get_with_headers(
        &app.router,
        "/analyze/%20Technology%20",
        &[("x-api-key", KEY)],
    )
    .await;
    assert_status(&resp, StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["sector"], "technology");
}

#[tokio::test]
async fn blank_sector_is_400_before_any_external_call() {
    let app = build_app(TestAppConfig::default());
    let resp = get_with_headers(&app.router, "/analyze/%20%20", &[("x-api-key", KEY)]).await;
    assert_status(&resp, StatusCode::BAD_REQUEST);
    let json = assert_error_shape(resp).await;
    assert_eq!(json["error"], "Invalid sector");
    assert_eq!(app.collector.calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    assert_eq!(app.generator.calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn browser_request_gets_html_via_auto_negotiation() {
    let app = build_app(TestAppConfig::default());
    let resp = get_with_headers(
        &app.router,
        "/analyze/banking",
        &[
            ("x-api-key", KEY),
            ("user-agent", "Mozilla/5.0 (X11; Linux x86_64)"),
            ("accept", "text/html,application/xhtml+xml"),
        ],
    )
    .await;
    assert_status(&resp, StatusCode::OK);
    let body = body_string(resp).await;
    assert!(body.starts_with("<!DOCTYPE html>"));
    assert!(body.contains("Banking Sector"));
}

#[tokio::test]
async fn format_json_overrides_browser_headers() {
    let app = build_app(TestAppConfig::default());
    let resp = get_with_headers(
        &app.router,
        "/analyze/banking?format=json",
        &[
            ("x-api-key", KEY),
            ("user-agent", "Mozilla/5.0"),
            ("accept", "text/html"),
        ],
    )
    .await;
    assert_status(&resp, StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["sector"], "banking");
}

#[tokio::test]
async fn format_html_works_for_api_clients() {
    let app = build_app(TestAppConfig::default());
    let resp = get_with_headers(
        &app.router,
        "/analyze/banking?format=html",
        &[("x-api-key", KEY)],
    )
    .await;
    assert_status(&resp, StatusCode::OK);
    let body = body_string(resp).await;
    assert!(body.contains("<h1>"));
}

#[tokio::test]
async fn collector_failure_is_500_with_generic_detail() {
    let app = build_app(TestAppConfig {
        collector_fails: true,
        ..Default::default()
    });
    let resp = get_with_headers(&app.router, "/analyze/banking", &[("x-api-key", KEY)]).await;
    assert_status(&resp, StatusCode::INTERNAL_SERVER_ERROR);
    let json = assert_error_shape(resp).await;
    assert_eq!(json["error"], "Internal server error");
    // Non-debug mode hides internals.
    assert_eq!(json["detail"], "An unexpected error occurred");
}

#[tokio::test]
async fn debug_mode_exposes_failure_detail() {
    let app = build_app(TestAppConfig {
        collector_fails: true,
        debug: true,
        ..Default::default()
    });
    let resp = get_with_headers(&app.router, "/analyze/banking", &[("x-api-key", KEY)]).await;
    assert_status(&resp, StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(resp).await;
    assert!(json["detail"]
        .as_str()
        .unwrap()
        .contains("search provider unreachable"));
}

#[tokio::test]
async fn generator_wrapping_fault_is_500() {
    let app = build_app(TestAppConfig {
        generator_mode: GeneratorMode::WrappingFault,
        ..Default::default()
    });
    let resp = get_with_headers(&app.router, "/analyze/banking", &[("x-api-key", KEY)]).await;
    assert_status(&resp, StatusCode::INTERNAL_SERVER_ERROR);
}

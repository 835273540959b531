// src/config.rs
// Environment-backed settings, read once at process start.

pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone)]
pub struct Settings {
    /// Gemini credential; empty means the generator degrades to templates.
    pub gemini_api_key: String,
    /// Service credential checked alongside the fixed demo keys.
    pub api_key: String,
    pub requests_per_minute: usize,
    pub requests_per_hour: usize,
    /// When set, error responses carry the real failure detail.
    pub debug: bool,
    /// Directory for persisted markdown reports.
    pub report_dir: String,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            gemini_api_key: std::env::var("GEMINI_API_KEY").unwrap_or_default(),
            api_key: std::env::var("API_KEY")
                .unwrap_or_else(|_| "default-api-key-123".to_string()),
            requests_per_minute: parse_env("REQUESTS_PER_MINUTE", 10),
            requests_per_hour: parse_env("REQUESTS_PER_HOUR", 100),
            debug: std::env::var("DEBUG")
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(false),
            report_dir: std::env::var("REPORT_DIR")
                .unwrap_or_else(|_| "markdown-analysis-reports".to_string()),
        }
    }
}

fn parse_env(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// src/auth.rs
// API-key gating: credential via `x-api-key` header or `api_key` query
// parameter, matched against the configured key plus fixed demo keys.

use axum::http::HeaderMap;
use std::collections::HashMap;

use crate::config::Settings;

/// Demo keys accepted alongside the configured credential.
pub const DEMO_KEYS: [&str; 3] = ["demo-key-123", "guest-access-456", "public-api-789"];

/// Returns the accepted key, or `None` for a missing/unknown credential.
pub fn verify_api_key(
    headers: &HeaderMap,
    query: &HashMap<String, String>,
    settings: &Settings,
) -> Option<String> {
    let presented = headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .or_else(|| query.get("api_key").cloned())?;

    if presented == settings.api_key || DEMO_KEYS.contains(&presented.as_str()) {
        Some(presented)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings {
            gemini_api_key: String::new(),
            api_key: "configured-key".into(),
            requests_per_minute: 10,
            requests_per_hour: 100,
            debug: false,
            report_dir: "reports".into(),
        }
    }

    #[test]
    fn accepts_header_credential() {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", "demo-key-123".parse().unwrap());
        let out = verify_api_key(&headers, &HashMap::new(), &settings());
        assert_eq!(out.as_deref(), Some("demo-key-123"));
    }

    #[test]
    fn accepts_query_credential() {
        let mut query = HashMap::new();
        query.insert("api_key".to_string(), "configured-key".to_string());
        let out = verify_api_key(&HeaderMap::new(), &query, &settings());
        assert_eq!(out.as_deref(), Some("configured-key"));
    }

    #[test]
    fn header_takes_precedence_over_query() {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", "guest-access-456".parse().unwrap());
        let mut query = HashMap::new();
        query.insert("api_key".to_string(), "wrong".to_string());
        let out = verify_api_key(&headers, &query, &settings());
        assert_eq!(out.as_deref(), Some("guest-access-456"));
    }

    #[test]
    fn rejects_missing_and_unknown_keys() {
        assert!(verify_api_key(&HeaderMap::new(), &HashMap::new(), &settings()).is_none());
        let mut query = HashMap::new();
        query.insert("api_key".to_string(), "nope".to_string());
        assert!(verify_api_key(&HeaderMap::new(), &query, &settings()).is_none());
    }
}

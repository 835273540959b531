// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod auth;
pub mod cache;
pub mod clock;
pub mod collect;
pub mod config;
pub mod maintenance;
pub mod metrics;
pub mod news_search;
pub mod orchestrator;
pub mod persist;
pub mod rate_limiter;
pub mod render;
pub mod report;
pub mod sectors;
pub mod sessions;
pub mod types;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::orchestrator::{AnalysisError, AnalysisOutcome, Orchestrator};
pub use crate::types::{CompanyNews, NewsItem, SectorSnapshot};

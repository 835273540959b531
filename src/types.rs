// src/types.rs
use serde::{Deserialize, Serialize};

/// One news search result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewsItem {
    pub title: String,
    pub source: String,
    /// Publish date as reported by the feed (RFC3339 when parseable).
    pub published: String,
    /// Short body excerpt, normalized text.
    pub excerpt: String,
    pub url: String,
}

/// News gathered for a single company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyNews {
    pub company: String,
    pub items: Vec<NewsItem>,
}

/// Everything collected for one sector at one point in time.
/// Created fresh per request, consumed by the report generator, discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorSnapshot {
    pub sector: String,
    pub news_items: Vec<NewsItem>,
    pub companies: Vec<String>,
    pub company_news: Vec<CompanyNews>,
    pub market_news: Vec<NewsItem>,
    /// ISO timestamp of collection.
    pub collected_at: String,
    pub data_points: usize,
}

impl SectorSnapshot {
    /// data_points = sector news count + companies we collected news for.
    pub fn count_data_points(news_items: &[NewsItem], company_news: &[CompanyNews]) -> usize {
        news_items.len() + company_news.len()
    }
}

//! Sector data collection: composes the news search collaborator into one
//! `SectorSnapshot` per request.
//!
//! Sub-call failures are swallowed and contribute an empty piece; only a
//! wrapping failure surfaces as a collection error.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::news_search::NewsSearch;
use crate::sectors;
use crate::types::{CompanyNews, NewsItem, SectorSnapshot};

/// Target number of sector news items after deduplication.
const SECTOR_NEWS_LIMIT: usize = 10;
/// Companies we fetch dedicated news for.
const COMPANY_NEWS_COUNT: usize = 3;
/// Pause between per-company searches so the upstream provider is not hammered.
const COMPANY_CALL_DELAY_MS: u64 = 500;

#[async_trait]
pub trait SectorCollector: Send + Sync {
    async fn collect(&self, sector: &str) -> Result<SectorSnapshot>;
}

pub struct DataCollector {
    search: Arc<dyn NewsSearch>,
    /// Inter-call delay; tests set this to zero.
    company_delay: Duration,
}

impl DataCollector {
    pub fn new(search: Arc<dyn NewsSearch>) -> Self {
        Self {
            search,
            company_delay: Duration::from_millis(COMPANY_CALL_DELAY_MS),
        }
    }

    pub fn with_company_delay(mut self, delay: Duration) -> Self {
        self.company_delay = delay;
        self
    }

    /// Three templated queries, merged and deduplicated by URL.
    async fn sector_news(&self, sector: &str) -> Vec<NewsItem> {
        let queries = [
            format!("{sector} sector India market news"),
            format!("{sector} industry India stock market"),
            format!("{sector} companies India financial news"),
        ];
        let per_query = SECTOR_NEWS_LIMIT / queries.len();

        let mut all = Vec::new();
        for q in &queries {
            match self.search.search(q, per_query).await {
                Ok(mut items) => all.append(&mut items),
                Err(e) => {
                    tracing::warn!(error = ?e, query = %q, "sector news search failed");
                }
            }
        }

        let mut seen = HashSet::new();
        let mut unique = Vec::with_capacity(all.len());
        for item in all {
            if seen.insert(item.url.clone()) {
                unique.push(item);
            }
        }
        unique.truncate(SECTOR_NEWS_LIMIT);
        unique
    }

    async fn company_news(&self, companies: &[String]) -> Vec<CompanyNews> {
        let mut out = Vec::new();
        for (i, company) in companies.iter().take(COMPANY_NEWS_COUNT).enumerate() {
            if i > 0 && !self.company_delay.is_zero() {
                tokio::time::sleep(self.company_delay).await;
            }
            let query = format!("{company} India stock price financial results");
            let items = match self.search.search(&query, 3).await {
                Ok(items) => items,
                Err(e) => {
                    tracing::warn!(error = ?e, company = %company, "company news search failed");
                    Vec::new()
                }
            };
            out.push(CompanyNews {
                company: company.clone(),
                items,
            });
        }
        out
    }

    async fn market_news(&self) -> Vec<NewsItem> {
        match self
            .search
            .search("Sensex Nifty Indian stock market today", 5)
            .await
        {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(error = ?e, "market indices search failed");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl SectorCollector for DataCollector {
    async fn collect(&self, sector: &str) -> Result<SectorSnapshot> {
        let news_items = self.sector_news(sector).await;
        let companies = sectors::companies_for(sector);
        let company_news = self.company_news(&companies).await;
        let market_news = self.market_news().await;

        let data_points = SectorSnapshot::count_data_points(&news_items, &company_news);
        tracing::info!(
            sector = %sector,
            news = news_items.len(),
            companies = companies.len(),
            data_points,
            "sector data collected"
        );

        Ok(SectorSnapshot {
            sector: sector.to_string(),
            news_items,
            companies,
            company_news,
            market_news,
            collected_at: chrono::Utc::now().to_rfc3339(),
            data_points,
        })
    }
}

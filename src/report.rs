//! Report generation: provider abstraction + the Gemini implementation with
//! a deterministic template fallback.
//!
//! The generator never fails visibly: an unavailable provider or an empty
//! response degrades to the template; a transport/API error degrades to the
//! template behind a visible error banner.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::sectors::title_case;
use crate::types::SectorSnapshot;

/// Model identifiers tried in preference order at construction time.
const MODEL_CANDIDATES: [&str; 4] = [
    "gemini-1.5-flash",
    "gemini-1.5-pro",
    "gemini-pro-latest",
    "gemini-pro",
];

#[async_trait]
pub trait ReportGenerator: Send + Sync {
    /// Produce a markdown report for the snapshot. Implementations are
    /// expected to degrade internally rather than error; an `Err` here is a
    /// wrapping fault the orchestrator translates to a 500.
    async fn generate(&self, snapshot: &SectorSnapshot) -> Result<String>;
    fn provider_name(&self) -> &'static str;
}

// ------------------------------------------------------------
// Gemini provider
// ------------------------------------------------------------

pub struct GeminiGenerator {
    http: reqwest::Client,
    api_key: String,
    /// Selected once at construction; `None` means fully degraded.
    model: Option<String>,
}

#[derive(Serialize)]
struct GenerateReq<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResp {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: RespContent,
}

#[derive(Deserialize)]
struct RespContent {
    #[serde(default)]
    parts: Vec<RespPart>,
}

#[derive(Deserialize)]
struct RespPart {
    #[serde(default)]
    text: String,
}

impl GeminiGenerator {
    /// Probes the candidate models with a trivial prompt and keeps the first
    /// one that answers. With no key or no responsive model, the generator
    /// stays degraded for the process lifetime (no re-probe).
    pub async fn new(api_key: &str) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("sector-analysis-api/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(60))
            .build()
            .expect("reqwest client");

        let mut gen = Self {
            http,
            api_key: api_key.to_string(),
            model: None,
        };

        if gen.api_key.is_empty() {
            tracing::warn!("Gemini API key not configured; analysis will use templates");
            return gen;
        }

        for candidate in MODEL_CANDIDATES {
            match gen.call_model(candidate, "Hello").await {
                Ok(text) if !text.is_empty() => {
                    tracing::info!(model = candidate, "Gemini model selected");
                    gen.model = Some(candidate.to_string());
                    break;
                }
                Ok(_) => {
                    tracing::warn!(model = candidate, "empty probe response, trying next");
                }
                Err(e) => {
                    tracing::warn!(model = candidate, error = ?e, "model probe failed");
                }
            }
        }

        if gen.model.is_none() {
            tracing::error!("no Gemini model responded; analysis will use templates");
        }
        gen
    }

    async fn call_model(&self, model: &str, prompt: &str) -> Result<String> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{model}:generateContent?key={}",
            self.api_key
        );
        let req = GenerateReq {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };
        let resp = self.http.post(&url).json(&req).send().await?;
        if !resp.status().is_success() {
            anyhow::bail!("gemini returned status {}", resp.status());
        }
        let body: GenerateResp = resp.json().await?;
        let text = body
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.trim().to_string())
            .unwrap_or_default();
        Ok(text)
    }
}

#[async_trait]
impl ReportGenerator for GeminiGenerator {
    async fn generate(&self, snapshot: &SectorSnapshot) -> Result<String> {
        let Some(model) = self.model.as_deref() else {
            tracing::warn!(sector = %snapshot.sector, "generator degraded, using template");
            return Ok(fallback_report(&snapshot.sector));
        };

        let prompt = format_prompt(snapshot);
        match self.call_model(model, &prompt).await {
            Ok(text) if !text.is_empty() => Ok(text),
            Ok(_) => {
                tracing::error!(sector = %snapshot.sector, "empty response from model");
                Ok(fallback_report(&snapshot.sector))
            }
            Err(e) => {
                tracing::error!(sector = %snapshot.sector, error = ?e, "generation failed");
                Ok(error_report(&snapshot.sector, &e.to_string()))
            }
        }
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }
}

// ------------------------------------------------------------
// Prompt + templates
// ------------------------------------------------------------

/// Build the analysis prompt from collected data.
pub fn format_prompt(snapshot: &SectorSnapshot) -> String {
    let now = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S");
    let mut prompt = format!(
        "# Market Analysis Request for {} Sector\n\n\
         ## Analysis Date: {now}\n\n\
         ## Sector Information:\n\
         - Sector: {}\n\
         - Data Collection Timestamp: {}\n\
         - Number of Data Points: {}\n\n\
         ## Recent Sector News:\n",
        snapshot.sector.to_uppercase(),
        snapshot.sector,
        snapshot.collected_at,
        snapshot.data_points
    );

    for (i, news) in snapshot.news_items.iter().take(5).enumerate() {
        let excerpt: String = news.excerpt.chars().take(200).collect();
        prompt.push_str(&format!(
            "\n### News {}:\n**Title:** {}\n**Source:** {}\n**Date:** {}\n**Summary:** {excerpt}...\n",
            i + 1,
            news.title,
            news.source,
            news.published
        ));
    }

    if !snapshot.companies.is_empty() {
        prompt.push_str(&format!(
            "\n## Major Companies in {} Sector:\n",
            snapshot.sector
        ));
        for company in &snapshot.companies {
            prompt.push_str(&format!("- {company}\n"));
        }
    }

    if !snapshot.company_news.is_empty() {
        prompt.push_str("\n## Company-Specific News:\n");
        for cn in snapshot.company_news.iter().take(3) {
            prompt.push_str(&format!("\n### {}:\n", cn.company));
            for news in cn.items.iter().take(2) {
                prompt.push_str(&format!("- **{}** ({})\n", news.title, news.published));
            }
        }
    }

    if !snapshot.market_news.is_empty() {
        prompt.push_str("\n## Overall Market Context:\n");
        for news in snapshot.market_news.iter().take(3) {
            let excerpt: String = news.excerpt.chars().take(100).collect();
            prompt.push_str(&format!("- **{}** - {excerpt}...\n", news.title));
        }
    }

    prompt.push_str(&format!(
        "\n\n## Analysis Requirements:\n\n\
         Please provide a comprehensive market analysis report for the {} sector in India \
         with the following structure:\n\n\
         1. **Executive Summary** - current sentiment, key trends, sector outlook\n\
         2. **Market Analysis** - performance, drivers and challenges, regulation, competition\n\
         3. **Trade Opportunities** - investment ideas, short-term trades, long-term themes, risk assessment\n\
         4. **Key Metrics & Indicators** - metrics to watch, upcoming catalysts\n\
         5. **Risk Analysis** - sector, market, and regulatory risks with mitigations\n\
         6. **Recommendations** - Buy/Hold/Sell views, allocation, time horizon\n\n\
         Format the response as a well-structured markdown document. Use bullet points, \
         headers, and formatting to make it easily readable. Base your analysis strictly \
         on the provided data and current market conditions.\n",
        snapshot.sector
    ));

    prompt
}

/// Deterministic template used whenever the provider cannot answer.
pub fn fallback_report(sector: &str) -> String {
    let now = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S");
    let title = title_case(sector);
    format!(
        "# Market Analysis Report: {title} Sector\n\n\
         ## Generated on: {now}\n\n\
         ## Executive Summary\n\
         This is a template analysis report for the {sector} sector. AI-generated insights \
         were not available for this run.\n\n\
         ## Market Analysis\n\
         - **Sector Focus:** {title}\n\
         - **Market:** Indian Stock Market\n\
         - **Analysis Type:** Basic Template\n\n\
         ## Trade Opportunities\n\
         ### Investment Themes\n\
         1. **Growth Opportunities:** Look for companies with strong fundamentals\n\
         2. **Value Plays:** Identify undervalued stocks in the sector\n\
         3. **Dividend Stocks:** Consider companies with consistent dividend history\n\n\
         ## Risk Analysis\n\
         ### Key Risks\n\
         - Market volatility\n\
         - Regulatory changes\n\
         - Economic conditions\n\
         - Sector-specific challenges\n\n\
         ### Risk Mitigation\n\
         - Diversification across multiple stocks\n\
         - Regular portfolio review\n\
         - Stop-loss mechanisms\n\n\
         ## Recommendations\n\
         - **Time Horizon:** Medium to long-term (1-3 years)\n\
         - **Risk Level:** Moderate\n\
         - **Portfolio Allocation:** Consider sector exposure within a broader portfolio\n\n\
         ---\n\
         *Note: This is a template analysis. For AI-powered insights, configure the \
         Gemini API key.*\n"
    )
}

/// Fallback prefixed with a visible banner naming the failure, so a degraded
/// run after an error is distinguishable from a quietly degraded one.
pub fn error_report(sector: &str, error: &str) -> String {
    format!(
        "# Market Analysis Report: {} Sector\n\n\
         ## Error in Analysis\n\n\
         An error occurred while generating the AI analysis: {error}\n\n\
         ---\n\n{}",
        title_case(sector),
        fallback_report(sector)
    )
}

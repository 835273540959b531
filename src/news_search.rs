//! News search collaborator: a narrow trait plus the Google News RSS
//! implementation used in production. Everything behind the trait is
//! replaceable in tests.

use anyhow::{Context, Result};
use async_trait::async_trait;
use quick_xml::de::from_str;
use serde::Deserialize;
use std::time::Duration;

use crate::types::NewsItem;

#[async_trait]
pub trait NewsSearch: Send + Sync {
    /// Return up to `limit` recent news items for a free-text query.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<NewsItem>>;
    fn name(&self) -> &'static str;
}

// ------------------------------------------------------------
// RSS wire format
// ------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
    source: Option<Source>,
}

/// `<source url="...">Name</source>` — the name is the element text.
#[derive(Debug, Deserialize)]
struct Source {
    #[serde(rename = "$text")]
    name: Option<String>,
}

fn parse_rfc2822_to_rfc3339(ts: &str) -> String {
    chrono::DateTime::parse_from_rfc2822(ts)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|_| ts.to_string())
}

// ------------------------------------------------------------
// Google News search feed
// ------------------------------------------------------------

/// Searches the Google News RSS endpoint. One HTTP GET per query.
pub struct GoogleNewsRss {
    http: reqwest::Client,
}

impl GoogleNewsRss {
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .user_agent("sector-analysis-api/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client");
        Self { http }
    }

    fn feed_url(query: &str) -> String {
        let q: String = url_encode(query);
        format!("https://news.google.com/rss/search?q={q}&hl=en-IN&gl=IN&ceid=IN:en")
    }

    fn parse_feed(xml: &str, limit: usize) -> Result<Vec<NewsItem>> {
        let rss: Rss = from_str(xml).context("parsing news rss xml")?;
        let mut out = Vec::with_capacity(rss.channel.item.len().min(limit));
        for it in rss.channel.item {
            let title = normalize_text(it.title.as_deref().unwrap_or_default());
            if title.is_empty() {
                continue;
            }
            out.push(NewsItem {
                title,
                source: it
                    .source
                    .and_then(|s| s.name)
                    .map(|s| normalize_text(&s))
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| "Google News".to_string()),
                published: it
                    .pub_date
                    .as_deref()
                    .map(parse_rfc2822_to_rfc3339)
                    .unwrap_or_default(),
                excerpt: normalize_text(it.description.as_deref().unwrap_or_default()),
                url: it.link.unwrap_or_default(),
            });
            if out.len() >= limit {
                break;
            }
        }
        Ok(out)
    }
}

impl Default for GoogleNewsRss {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NewsSearch for GoogleNewsRss {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<NewsItem>> {
        let url = Self::feed_url(query);
        let body = self
            .http
            .get(&url)
            .send()
            .await
            .context("news feed get()")?
            .text()
            .await
            .context("news feed .text()")?;
        Self::parse_feed(&body, limit)
    }

    fn name(&self) -> &'static str {
        "google-news-rss"
    }
}

fn url_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

/// Normalize feed text: entity decode, strip tags, ASCII quotes, collapse
/// whitespace, cap length.
pub fn normalize_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out = out.trim().to_string();

    if out.chars().count() > 500 {
        out = out.chars().take(500).collect();
    }

    out
}

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use nr_core::{Article, Error, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::utils::{http_client, parse_datetime};
use super::Collector;

const DEFAULT_BASE_URL: &str = "https://api.tavily.com";
const SOURCE_NAME: &str = "Tavily Search";

#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// One of `day`, `week`, `month`, `year`
    pub time_range: String,
    pub max_results: usize,
    pub include_domains: Vec<String>,
    pub exclude_domains: Vec<String>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            time_range: "week".to_string(),
            max_results: 10,
            include_domains: Vec::new(),
            exclude_domains: Vec::new(),
        }
    }
}

/// Search window in days for a `time_range` name; unknown names mean a week.
pub fn time_range_to_days(time_range: &str) -> u32 {
    match time_range {
        "day" => 1,
        "week" => 7,
        "month" => 30,
        "year" => 365,
        _ => 7,
    }
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    topic: &'a str,
    days: u32,
    max_results: usize,
    include_domains: &'a [String],
    exclude_domains: &'a [String],
    include_images: bool,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Deserialize)]
struct SearchResult {
    title: Option<String>,
    url: Option<String>,
    #[serde(default)]
    content: String,
    score: Option<f64>,
    published_date: Option<String>,
    #[serde(default)]
    images: Vec<Value>,
    image: Option<String>,
}

impl SearchResult {
    fn image_url(&self) -> Option<String> {
        // Images come back as plain URLs, or as {url, description} objects
        // when descriptions are requested.
        self.images
            .first()
            .and_then(|image| match image {
                Value::String(url) => Some(url.clone()),
                other => other.get("url").and_then(Value::as_str).map(str::to_string),
            })
            .or_else(|| self.image.clone())
    }

    fn into_article(self, query: &str) -> Option<Article> {
        let image_url = self.image_url();
        let url = self.url?;
        let title = self
            .title
            .filter(|title| !title.trim().is_empty())
            .unwrap_or_else(|| "Untitled".to_string());

        let mut article = Article::new(title, url, self.content, SOURCE_NAME)
            .with_keywords(vec![query.to_string()]);
        article.image_url = image_url;
        article.published_at = self.published_date.as_deref().and_then(parse_datetime);
        article.score = self.score;
        Some(article)
    }
}

/// News search through the Tavily API, one query per keyword.
pub struct TavilyCollector {
    client: Client,
    api_key: String,
    base_url: String,
    keywords: Vec<String>,
    options: SearchOptions,
}

impl TavilyCollector {
    pub fn new(api_key: impl Into<String>, keywords: Vec<String>, options: SearchOptions) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(Error::Collection("Tavily API key is required".to_string()));
        }
        Ok(Self {
            client: http_client(Duration::from_secs(30)),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            keywords,
            options,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Article>> {
        let request = SearchRequest {
            query,
            topic: "news",
            days: time_range_to_days(&self.options.time_range),
            max_results: self.options.max_results,
            include_domains: &self.options.include_domains,
            exclude_domains: &self.options.exclude_domains,
            include_images: true,
        };

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Collection(format!(
                "Tavily search failed ({}): {}",
                status, body
            )));
        }

        let body = response.json::<SearchResponse>().await?;
        let total = body.results.len();
        let articles: Vec<Article> = body
            .results
            .into_iter()
            .filter_map(|result| result.into_article(query))
            .collect();
        if articles.len() < total {
            debug!("Skipped {} Tavily results without URL", total - articles.len());
        }
        Ok(articles)
    }
}

impl fmt::Debug for TavilyCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TavilyCollector")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("keywords", &self.keywords)
            .field("options", &self.options)
            .finish()
    }
}

#[async_trait]
impl Collector for TavilyCollector {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn collect(&self) -> Result<Vec<Article>> {
        let mut articles = Vec::new();
        for keyword in &self.keywords {
            let found = self.search(keyword).await?;
            info!("🔎 {} results for {:?}", found.len(), keyword);
            articles.extend(found);
        }
        Ok(articles)
    }
}

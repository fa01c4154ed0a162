use std::time::Duration;

use async_trait::async_trait;
use nr_core::{Article, Result};
use reqwest::Client;
use scraper::Html;
use serde::Deserialize;
use tracing::{info, warn};
use url::Url;

use super::utils::{element_text, fetch_html, http_client, parse_datetime, parse_selector, parse_url, select_first};
use super::Collector;

/// CSS selectors locating articles on a listing page. Unset selectors use defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteSelectors {
    pub article: Option<String>,
    pub title: Option<String>,
    pub link: Option<String>,
    pub content: Option<String>,
    pub date: Option<String>,
}

impl SiteSelectors {
    pub fn article(&self) -> &str {
        self.article.as_deref().unwrap_or("article")
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("h2 a, h3 a")
    }

    pub fn link(&self) -> &str {
        self.link.as_deref().unwrap_or("a")
    }

    pub fn content(&self) -> &str {
        self.content.as_deref().unwrap_or("p")
    }

    pub fn date(&self) -> &str {
        self.date.as_deref().unwrap_or("time")
    }
}

fn default_site_name() -> String {
    "Unknown".to_string()
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_site_name")]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub selectors: SiteSelectors,
}

/// Pull article records out of a listing page.
///
/// Elements with no title or no link are skipped; links are resolved
/// against `base_url`. Only an unparsable selector is an error.
pub fn extract_articles(html: &str, base_url: &Url, selectors: &SiteSelectors, source: &str) -> Result<Vec<Article>> {
    let article_selector = parse_selector(selectors.article())?;
    let title_selector = parse_selector(selectors.title())?;
    let link_selector = parse_selector(selectors.link())?;
    let content_selector = parse_selector(selectors.content())?;
    let date_selector = parse_selector(selectors.date())?;

    let document = Html::parse_document(html);
    let mut articles = Vec::new();

    for element in document.select(&article_selector) {
        let title = match select_first(&element, &title_selector).map(|el| element_text(&el)) {
            Some(title) if !title.is_empty() => title,
            _ => continue,
        };

        let url = match select_first(&element, &link_selector)
            .and_then(|el| el.value().attr("href"))
            .and_then(|href| base_url.join(href.trim()).ok())
        {
            Some(url) => url,
            None => continue,
        };

        let content = select_first(&element, &content_selector)
            .map(|el| element_text(&el))
            .unwrap_or_default();

        let published_at = select_first(&element, &date_selector)
            .and_then(|el| el.value().attr("datetime"))
            .and_then(parse_datetime);

        let mut article = Article::new(title, url.to_string(), content, source);
        article.published_at = published_at;
        articles.push(article);
    }

    Ok(articles)
}

/// Scrapes the configured listing pages.
pub struct SiteCollector {
    client: Client,
    sites: Vec<SiteConfig>,
}

impl SiteCollector {
    pub fn new(sites: Vec<SiteConfig>) -> Self {
        Self {
            client: http_client(Duration::from_secs(30)),
            sites,
        }
    }

    pub fn sites(&self) -> &[SiteConfig] {
        &self.sites
    }

    pub async fn scrape_site(&self, site: &SiteConfig) -> Result<Vec<Article>> {
        let base_url = parse_url(&site.url)?;
        let html = fetch_html(&self.client, base_url.as_str()).await?;
        extract_articles(&html, &base_url, &site.selectors, &site.name)
    }
}

#[async_trait]
impl Collector for SiteCollector {
    fn name(&self) -> &str {
        "Web Scraper"
    }

    async fn collect(&self) -> Result<Vec<Article>> {
        let mut articles = Vec::new();
        for site in self.sites.iter().filter(|site| site.enabled) {
            match self.scrape_site(site).await {
                Ok(found) => {
                    info!("🌐 {} articles from {}", found.len(), site.name);
                    articles.extend(found);
                }
                Err(e) => warn!("Failed to scrape {} ({}): {}", site.name, site.url, e),
            }
        }
        Ok(articles)
    }
}

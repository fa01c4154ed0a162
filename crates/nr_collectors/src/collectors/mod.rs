use async_trait::async_trait;
use nr_core::{Article, Result};

pub mod site;
pub mod tavily;

/// Browser-like user agent sent with page fetches; several news sites refuse bare clients.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[async_trait]
pub trait Collector: Send + Sync {
    /// Returns the name of the collector, used in logs
    fn name(&self) -> &str;

    /// Collects every article this collector is configured for
    async fn collect(&self) -> Result<Vec<Article>>;
}

/// Common utilities for collectors
pub(crate) mod utils {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
    use nr_core::{Error, Result};
    use reqwest::Client;
    use scraper::{ElementRef, Html, Selector};
    use std::time::Duration;
    use url::Url;

    pub fn http_client(timeout: Duration) -> Client {
        Client::builder()
            .user_agent(super::USER_AGENT)
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new())
    }

    pub fn parse_url(url: &str) -> Result<Url> {
        Url::parse(url).map_err(|e| Error::Collection(format!("Failed to parse URL {}: {}", url, e)))
    }

    pub fn parse_selector(selector: &str) -> Result<Selector> {
        Selector::parse(selector)
            .map_err(|e| Error::Collection(format!("Invalid selector {:?}: {:?}", selector, e)))
    }

    /// Fetch a page body, treating non-2xx statuses as collection errors.
    pub async fn fetch_html(client: &Client, url: &str) -> Result<String> {
        let response = client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Collection(format!("Failed to fetch {}: HTTP {}", url, status)));
        }
        Ok(response.text().await?)
    }

    /// Whitespace-normalized text of an element.
    pub fn element_text(element: &ElementRef) -> String {
        element
            .text()
            .flat_map(str::split_whitespace)
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn select_first<'a>(element: &ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
        element.select(selector).next()
    }

    pub fn document_attr(document: &Html, selector: &str, attr: &str) -> Option<String> {
        let selector = Selector::parse(selector).ok()?;
        document
            .select(&selector)
            .filter_map(|el| el.value().attr(attr))
            .map(str::trim)
            .find(|value| !value.is_empty())
            .map(str::to_string)
    }

    /// Parse the timestamp formats found in feeds and `datetime` attributes.
    ///
    /// Accepts RFC 3339 (with `Z` or an offset), RFC 2822, naive ISO
    /// date-times (taken as UTC) and bare dates. Anything else is `None`.
    pub fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        if let Ok(date) = DateTime::parse_from_rfc3339(value) {
            return Some(date.with_timezone(&Utc));
        }
        if let Ok(date) = DateTime::parse_from_rfc2822(value) {
            return Some(date.with_timezone(&Utc));
        }
        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(date) = NaiveDateTime::parse_from_str(value, format) {
                return Some(date.and_utc());
            }
        }
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|date| date.and_utc())
    }

}

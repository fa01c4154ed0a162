use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use nr_core::Article;
use reqwest::Client;
use scraper::{Html, Selector};
use tokio::sync::Semaphore;
use tracing::{debug, info};

use crate::collectors::utils::{document_attr, fetch_html, http_client};

const ICON_MARKERS: [&str; 7] = ["icon", "logo", "avatar", "favicon", "sprite", "1x1", "pixel"];
const DEFAULT_CONCURRENCY: usize = 8;

/// True when an image URL looks like an icon, logo or tracking pixel.
pub fn is_icon_or_logo(src: &str) -> bool {
    let src = src.to_lowercase();
    ICON_MARKERS.iter().any(|marker| src.contains(marker))
}

/// Find a preview image in an article page.
///
/// Tries `og:image`, then `twitter:image`, then the first `<img>` whose
/// `src` (or `data-src`) does not look like an icon.
pub fn extract_og_image(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    if let Some(image) = document_attr(&document, "meta[property='og:image']", "content") {
        return Some(image);
    }
    if let Some(image) = document_attr(&document, "meta[name='twitter:image']", "content") {
        return Some(image);
    }

    let img_selector = Selector::parse("img").ok()?;
    document
        .select(&img_selector)
        .filter_map(|img| {
            let attrs = img.value();
            attrs
                .attr("src")
                .filter(|src| !src.is_empty())
                .or_else(|| attrs.attr("data-src"))
        })
        .find(|src| !src.is_empty() && !is_icon_or_logo(src))
        .map(str::to_string)
}

/// Fills in `image_url` for articles that lack one by fetching their pages.
pub struct ImageEnricher {
    client: Client,
    semaphore: Arc<Semaphore>,
}

impl Default for ImageEnricher {
    fn default() -> Self {
        Self::new(DEFAULT_CONCURRENCY)
    }
}

impl ImageEnricher {
    pub fn new(concurrency: usize) -> Self {
        Self {
            client: http_client(Duration::from_secs(10)),
            semaphore: Arc::new(Semaphore::new(concurrency.max(1))),
        }
    }

    /// Preview image of the page at `url`; any failure means no image.
    pub async fn fetch_image_url(&self, url: &str) -> Option<String> {
        match fetch_html(&self.client, url).await {
            Ok(html) => extract_og_image(&html),
            Err(e) => {
                debug!("No preview image for {}: {}", url, e);
                None
            }
        }
    }

    /// Enrich every article without an image. Order is preserved, and each
    /// task owns exactly one article, so `image_url` has a single writer.
    pub async fn enrich(&self, articles: Vec<Article>) -> Vec<Article> {
        let tasks = articles.into_iter().map(|mut article| {
            let semaphore = self.semaphore.clone();
            async move {
                if article.image_url.is_some() {
                    return article;
                }
                if let Ok(_permit) = semaphore.acquire().await {
                    article.image_url = self.fetch_image_url(&article.url).await;
                }
                article
            }
        });

        let articles = join_all(tasks).await;
        let with_images = articles.iter().filter(|a| a.image_url.is_some()).count();
        info!("🖼️ {}/{} articles have a preview image", with_images, articles.len());
        articles
    }
}

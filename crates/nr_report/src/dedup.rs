use std::collections::HashSet;

use nr_core::Article;
use tracing::debug;

use crate::similarity;

pub const DEFAULT_TITLE_SIMILARITY_THRESHOLD: f64 = 0.8;

/// Drops exact-URL duplicates and articles whose title is a near-duplicate
/// of an article already kept.
///
/// The filter is stable: surviving articles keep their relative input order.
#[derive(Debug, Clone)]
pub struct Deduplicator {
    threshold: f64,
}

impl Default for Deduplicator {
    fn default() -> Self {
        Self::new(DEFAULT_TITLE_SIMILARITY_THRESHOLD)
    }
}

impl Deduplicator {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn deduplicate(&self, articles: Vec<Article>) -> Vec<Article> {
        let mut seen_urls: HashSet<String> = HashSet::new();
        let mut kept_titles: Vec<String> = Vec::new();
        let mut unique = Vec::with_capacity(articles.len());

        for article in articles {
            if seen_urls.contains(article.identity()) {
                debug!("Dropping duplicate URL: {}", article.url);
                continue;
            }

            let title = article.title.to_lowercase();
            if self.is_similar_to_kept(&title, &kept_titles) {
                debug!("Dropping near-duplicate title: {}", article.title);
                continue;
            }

            seen_urls.insert(article.identity().to_string());
            kept_titles.push(title);
            unique.push(article);
        }

        unique
    }

    fn is_similar_to_kept(&self, title: &str, kept_titles: &[String]) -> bool {
        kept_titles
            .iter()
            .any(|kept| similarity::ratio(title, kept) >= self.threshold)
    }
}

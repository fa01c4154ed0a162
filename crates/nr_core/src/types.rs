use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A collected news article.
///
/// The URL is the article's identity: two records with the same URL string
/// describe the same article, whatever their other fields say.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub url: String,
    pub content: String,
    pub source: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    pub collected_at: DateTime<Utc>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub score: Option<f64>,
}

impl Article {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        content: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            content: content.into(),
            source: source.into(),
            image_url: None,
            published_at: None,
            collected_at: Utc::now(),
            keywords: Vec::new(),
            score: None,
        }
    }

    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    pub fn with_published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = Some(published_at);
        self
    }

    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = keywords;
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    /// Identity key used for exact-duplicate detection
    pub fn identity(&self) -> &str {
        &self.url
    }
}

/// A generated report, built once per pipeline run and read by delivery channels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub title: String,
    pub date: NaiveDate,
    pub articles: Vec<Article>,
    pub summary: String,
    pub content_markdown: String,
    pub content_html: String,
    pub content_text: String,
    #[serde(default)]
    pub recipients: Vec<String>,
}

impl Report {
    pub fn article_count(&self) -> usize {
        self.articles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_the_url() {
        let a = Article::new("OpenAI releases GPT-5", "https://example.com/a", "body", "Example");
        let b = Article::new("Something else entirely", "https://example.com/a", "other", "Mirror");
        let c = Article::new("OpenAI releases GPT-5", "https://example.com/A", "body", "Example");

        assert_eq!(a.identity(), b.identity());
        assert_ne!(a.identity(), c.identity());
        assert_ne!(a, b);
    }

    #[test]
    fn test_builder_sets_optional_fields() {
        let article = Article::new("Title", "https://example.com", "", "src")
            .with_image_url("https://example.com/img.png")
            .with_keywords(vec!["ai".to_string()])
            .with_score(0.7);

        assert_eq!(article.image_url.as_deref(), Some("https://example.com/img.png"));
        assert_eq!(article.keywords, vec!["ai"]);
        assert_eq!(article.score, Some(0.7));
        assert!(article.published_at.is_none());
    }
}

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use nr_core::{Article, Error, Report, Result, TextGenerator};
use tracing::{debug, info};

use crate::dedup::{Deduplicator, DEFAULT_TITLE_SIMILARITY_THRESHOLD};
use crate::markdown::{markdown_to_html, markdown_to_text};
use crate::render::DocumentRenderer;
use crate::summary::clean_summary;

/// Everything the assembler needs to know about the report it builds.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub title: String,
    pub highlight_count: usize,
    /// Keep at most this many articles after deduplication
    pub max_articles: Option<usize>,
    pub deduplicate: bool,
    pub similarity_threshold: f64,
    /// Summary prompt template, see [`TextGenerator::summarize`]
    pub prompt: Option<String>,
    pub focus: Option<String>,
    pub recipients: Vec<String>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            title: "AI News Weekly Report".to_string(),
            highlight_count: 10,
            max_articles: Some(50),
            deduplicate: true,
            similarity_threshold: DEFAULT_TITLE_SIMILARITY_THRESHOLD,
            prompt: None,
            focus: None,
            recipients: Vec::new(),
        }
    }
}

/// Ask the model for a summary exactly once and clean it up.
async fn summarize(
    model: &dyn TextGenerator,
    articles: &[Article],
    prompt: Option<&str>,
    focus: Option<&str>,
) -> Result<String> {
    let raw = model.summarize(articles, prompt, focus).await?;
    let summary = clean_summary(&raw);
    if summary.is_empty() {
        return Err(Error::Generation(format!(
            "{} returned an empty summary",
            model.name()
        )));
    }
    Ok(summary)
}

/// Produce the full markdown report: one summarize call, then rendering.
pub async fn generate_full_report(
    model: &dyn TextGenerator,
    articles: &[Article],
    title: &str,
    prompt: Option<&str>,
    highlight_count: usize,
    focus: Option<&str>,
) -> Result<String> {
    let summary = summarize(model, articles, prompt, focus).await?;
    Ok(DocumentRenderer::new(model.name(), highlight_count).render(title, &summary, articles))
}

pub struct ReportAssembler {
    model: Arc<dyn TextGenerator>,
    options: ReportOptions,
}

impl ReportAssembler {
    pub fn new(model: Arc<dyn TextGenerator>, options: ReportOptions) -> Self {
        Self { model, options }
    }

    pub fn options(&self) -> &ReportOptions {
        &self.options
    }

    /// Deduplicate (when enabled) and cap the collected articles, keeping their order.
    pub fn prepare_articles(&self, articles: Vec<Article>) -> Vec<Article> {
        let collected = articles.len();
        let mut articles = if self.options.deduplicate {
            let dedup = Deduplicator::new(self.options.similarity_threshold);
            let unique = dedup.deduplicate(articles);
            info!(
                "🧹 {} articles after deduplication ({} collected, title threshold {:.2})",
                unique.len(),
                collected,
                dedup.threshold()
            );
            unique
        } else {
            articles
        };

        if let Some(max) = self.options.max_articles {
            if articles.len() > max {
                articles.truncate(max);
                info!("✂️ Limited to {} articles", max);
            }
        }

        articles
    }

    pub async fn generate_report(&self, articles: Vec<Article>) -> Result<Report> {
        self.generate_report_for_date(articles, Local::now().date_naive())
            .await
    }

    pub async fn generate_report_for_date(&self, articles: Vec<Article>, date: NaiveDate) -> Result<Report> {
        if articles.is_empty() {
            return Err(Error::EmptyInput);
        }

        info!("🧠 Generating summary with {}", self.model.name());
        let summary = summarize(
            self.model.as_ref(),
            &articles,
            self.options.prompt.as_deref(),
            self.options.focus.as_deref(),
        )
        .await?;
        debug!("Summary: {}", summary);

        let renderer = DocumentRenderer::new(self.model.name(), self.options.highlight_count);
        let content_markdown = renderer.render(&self.options.title, &summary, &articles);
        let content_text = markdown_to_text(&content_markdown);
        let content_html = markdown_to_html(&content_markdown);

        Ok(Report {
            title: self.options.title.clone(),
            date,
            articles,
            summary,
            content_markdown,
            content_html,
            content_text,
            recipients: self.options.recipients.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct CountingModel {
        reply: String,
        calls: AtomicUsize,
    }

    impl CountingModel {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for CountingModel {
        fn name(&self) -> &str {
            "Mock"
        }

        async fn summarize(&self, _articles: &[Article], _prompt: Option<&str>, _focus: Option<&str>) -> Result<String> {
            // Each call answers differently, so a second call would be visible.
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("{} (call {})", self.reply, n + 1))
        }
    }

    #[derive(Debug)]
    struct FailingModel;

    #[async_trait]
    impl TextGenerator for FailingModel {
        fn name(&self) -> &str {
            "Failing"
        }

        async fn summarize(&self, _articles: &[Article], _prompt: Option<&str>, _focus: Option<&str>) -> Result<String> {
            Err(Error::Generation("API unavailable".to_string()))
        }
    }

    const TITLES: [&str; 4] = [
        "Google unveils Gemini 2",
        "Nvidia posts record quarter",
        "EU passes AI act",
        "Robots learn to fold laundry",
    ];

    fn articles(n: usize) -> Vec<Article> {
        TITLES
            .iter()
            .take(n)
            .enumerate()
            .map(|(i, title)| {
                Article::new(
                    *title,
                    format!("https://news.example/{}", i + 1),
                    format!("Body {}", i + 1),
                    "Wire",
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn test_summary_is_computed_once_and_reused() {
        let model = Arc::new(CountingModel::new("## Executive Summary\n\nA calm week."));
        let assembler = ReportAssembler::new(model.clone(), ReportOptions::default());

        let report = assembler.generate_report(articles(3)).await.unwrap();

        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
        assert_eq!(report.summary, "A calm week. (call 1)");
        assert!(report
            .content_markdown
            .contains("## 1. Executive Summary\n\nA calm week. (call 1)\n\n"));
        assert!(report.content_markdown.contains("using Mock*"));
    }

    #[tokio::test]
    async fn test_renditions_derive_from_markdown() {
        let options = ReportOptions {
            title: "Robotics Digest".to_string(),
            recipients: vec!["team@example.com".to_string()],
            ..ReportOptions::default()
        };
        let assembler = ReportAssembler::new(Arc::new(CountingModel::new("Summary.")), options);
        let date = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();

        let report = assembler.generate_report_for_date(articles(2), date).await.unwrap();

        assert_eq!(report.title, "Robotics Digest");
        assert_eq!(report.date, date);
        assert_eq!(report.articles.len(), 2);
        assert_eq!(report.recipients, vec!["team@example.com"]);
        assert_eq!(report.content_html, markdown_to_html(&report.content_markdown));
        assert_eq!(report.content_text, markdown_to_text(&report.content_markdown));
        assert!(report.content_text.starts_with("Robotics Digest"));
    }

    #[tokio::test]
    async fn test_report_is_dated_today() {
        let assembler = ReportAssembler::new(Arc::new(CountingModel::new("S")), ReportOptions::default());
        let before = Local::now().date_naive();
        let report = assembler.generate_report(articles(1)).await.unwrap();
        let after = Local::now().date_naive();
        assert!(report.date == before || report.date == after);
    }

    #[tokio::test]
    async fn test_generation_failure_is_fatal() {
        let assembler = ReportAssembler::new(Arc::new(FailingModel), ReportOptions::default());
        let result = assembler.generate_report(articles(2)).await;
        assert!(matches!(result, Err(Error::Generation(_))));
    }

    #[tokio::test]
    async fn test_empty_generation_is_fatal() {
        let assembler = ReportAssembler::new(Arc::new(EmptyModel("  \n")), ReportOptions::default());
        let result = assembler.generate_report(articles(2)).await;
        assert!(matches!(result, Err(Error::Generation(_))));
    }

    #[tokio::test]
    async fn test_boilerplate_only_summary_is_fatal() {
        let model = EmptyModel("## Executive Summary\n\nAI News Weekly Report\n*Source: Wire*\n");
        let assembler = ReportAssembler::new(Arc::new(model), ReportOptions::default());
        let result = assembler.generate_report(articles(2)).await;
        assert!(matches!(result, Err(Error::Generation(message)) if message.contains("empty summary")));
    }

    #[derive(Debug)]
    struct EmptyModel(&'static str);

    #[async_trait]
    impl TextGenerator for EmptyModel {
        fn name(&self) -> &str {
            "Empty"
        }

        async fn summarize(&self, _articles: &[Article], _prompt: Option<&str>, _focus: Option<&str>) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    #[tokio::test]
    async fn test_empty_input_is_rejected() {
        let model = Arc::new(CountingModel::new("S"));
        let assembler = ReportAssembler::new(model.clone(), ReportOptions::default());
        let result = assembler.generate_report(Vec::new()).await;
        assert!(matches!(result, Err(Error::EmptyInput)));
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_prepare_articles_dedups_then_caps() {
        let mut input = articles(4);
        input.insert(1, input[0].clone());
        let options = ReportOptions {
            max_articles: Some(3),
            ..ReportOptions::default()
        };
        let assembler = ReportAssembler::new(Arc::new(CountingModel::new("S")), options);

        let prepared = assembler.prepare_articles(input);
        let urls: Vec<_> = prepared.iter().map(|a| a.url.as_str()).collect();
        assert_eq!(
            urls,
            vec!["https://news.example/1", "https://news.example/2", "https://news.example/3"]
        );
    }

    #[test]
    fn test_prepare_articles_without_dedup() {
        let mut input = articles(2);
        input.push(input[0].clone());
        let options = ReportOptions {
            deduplicate: false,
            max_articles: None,
            ..ReportOptions::default()
        };
        let assembler = ReportAssembler::new(Arc::new(CountingModel::new("S")), options);
        assert_eq!(assembler.prepare_articles(input).len(), 3);
    }

    #[tokio::test]
    async fn test_generate_full_report() {
        let model = CountingModel::new("Short summary.");
        let markdown = generate_full_report(&model, &articles(3), "Weekly", None, 2, None)
            .await
            .unwrap();

        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
        assert!(markdown.starts_with("# Weekly\n\n"));
        assert!(markdown.contains("**2.2."));
        assert!(markdown.contains("**3.1.**"));
    }
}

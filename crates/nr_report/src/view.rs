use nr_core::{Article, Report};

const ELLIPSIS: &str = "...";

/// Cut `text` to at most `max_len` characters, ending with "..." when cut.
pub fn truncate(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let keep = max_len.saturating_sub(ELLIPSIS.len());
    let mut truncated: String = text.chars().take(keep).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

/// Read-only projections of a [`Report`] used by delivery channels.
#[derive(Debug, Clone, Copy)]
pub struct ReportView<'a> {
    report: &'a Report,
}

impl<'a> ReportView<'a> {
    pub fn new(report: &'a Report) -> Self {
        Self { report }
    }

    pub fn title(&self) -> &'a str {
        &self.report.title
    }

    pub fn date_label(&self) -> String {
        self.report.date.format("%Y-%m-%d").to_string()
    }

    pub fn article_count(&self) -> usize {
        self.report.article_count()
    }

    pub fn top_articles(&self, n: usize) -> &'a [Article] {
        let end = n.min(self.report.articles.len());
        &self.report.articles[..end]
    }

    /// Compact one-line description, "title — date — N articles"
    pub fn headline(&self) -> String {
        format!(
            "{} — {} — {} articles",
            self.report.title,
            self.date_label(),
            self.article_count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn report(articles: usize) -> Report {
        Report {
            title: "AI Weekly".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            articles: (0..articles)
                .map(|i| Article::new(format!("A{}", i), format!("https://a.example/{}", i), "", "src"))
                .collect(),
            summary: String::new(),
            content_markdown: String::new(),
            content_html: String::new(),
            content_text: String::new(),
            recipients: Vec::new(),
        }
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Hello World", 8), "Hello...");
        assert_eq!(truncate("Hello World", 11), "Hello World");
        assert_eq!(truncate("Hello World", 100), "Hello World");
        assert_eq!(truncate("Hello", 2), "...");
        assert_eq!(truncate("héllo wörld", 8), "héllo...");
    }

    #[test]
    fn test_top_articles() {
        let report = report(7);
        let view = ReportView::new(&report);
        assert_eq!(view.top_articles(5).len(), 5);
        assert_eq!(view.top_articles(5)[0].title, "A0");
        assert_eq!(view.top_articles(50).len(), 7);
        assert!(view.top_articles(0).is_empty());
    }

    #[test]
    fn test_headline() {
        let report = report(3);
        assert_eq!(ReportView::new(&report).headline(), "AI Weekly — 2025-06-02 — 3 articles");
    }
}

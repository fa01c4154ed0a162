use std::fmt::Write;

use lazy_static::lazy_static;
use nr_core::Article;
use regex::Regex;
use tracing::warn;

/// Characters of article content quoted under "Related News".
pub const RELATED_EXCERPT_CHARS: usize = 200;

const UNTITLED: &str = "Untitled";

lazy_static! {
    static ref HEADER_MARKER: Regex = Regex::new(r"(?m)^#{1,6}[ \t]+").unwrap();
    static ref BULLET_MARKER: Regex = Regex::new(r"(?m)^\*[ \t]+").unwrap();
}

/// Strip header and bullet markers so an article body reads as prose inside the report.
pub fn clean_article_content(content: &str) -> String {
    let content = HEADER_MARKER.replace_all(content, "");
    let content = BULLET_MARKER.replace_all(&content, "");
    content.trim().to_string()
}

fn display_title(article: &Article) -> &str {
    if article.title.trim().is_empty() {
        warn!("Article without title: {}", article.url);
        UNTITLED
    } else {
        &article.title
    }
}

fn published_date(article: &Article) -> Option<String> {
    article
        .published_at
        .map(|published| published.format("%Y-%m-%d").to_string())
}

/// Projects a title, a ranked article list and an executive summary into the
/// report's markdown document.
///
/// The first `highlight_count` articles are rendered in full (with image when
/// known) under "Highlight News"; the rest become short citations under
/// "Related News".
#[derive(Debug, Clone)]
pub struct DocumentRenderer {
    provider_name: String,
    highlight_count: usize,
}

impl DocumentRenderer {
    pub fn new(provider_name: impl Into<String>, highlight_count: usize) -> Self {
        Self {
            provider_name: provider_name.into(),
            highlight_count,
        }
    }

    pub fn render(&self, title: &str, summary: &str, articles: &[Article]) -> String {
        let mut doc = String::new();
        let split = self.highlight_count.min(articles.len());
        let (highlights, related) = articles.split_at(split);

        self.write_header(&mut doc, title, summary);
        for (i, article) in highlights.iter().enumerate() {
            write_highlight(&mut doc, i + 1, article);
        }
        if !related.is_empty() {
            doc.push_str("## 3. Related News\n\n");
            for (i, article) in related.iter().enumerate() {
                write_related(&mut doc, i + 1, article);
            }
        }

        doc
    }

    fn write_header(&self, doc: &mut String, title: &str, summary: &str) {
        let _ = write!(
            doc,
            "# {title}\n\n\
             *Generated by AI News Reporter using {provider}*\n\n\
             ---\n\n\
             ## 1. Executive Summary\n\n\
             {summary}\n\n\
             ---\n\n\
             ## 2. Highlight News\n\n",
            title = title,
            provider = self.provider_name,
            summary = summary,
        );
    }
}

fn write_highlight(doc: &mut String, index: usize, article: &Article) {
    let title = display_title(article);

    let _ = write!(doc, "**2.{}. [{}]({})**\n\n", index, title, article.url);
    if let Some(image_url) = &article.image_url {
        let _ = write!(doc, "![{}]({})\n\n", title, image_url);
    }
    let _ = write!(doc, "{}\n\n", clean_article_content(&article.content));
    let _ = write!(doc, "*Source: {}*", article.source);
    if let Some(date) = published_date(article) {
        let _ = write!(doc, " | *Published: {}*", date);
    }
    doc.push_str("\n\n---\n\n");
}

fn write_related(doc: &mut String, index: usize, article: &Article) {
    let title = display_title(article);

    let _ = write!(doc, "**3.{}.** [{}]({})", index, title, article.url);
    if let Some(date) = published_date(article) {
        let _ = write!(doc, " ({})", date);
    }

    let excerpt: String = article.content.chars().take(RELATED_EXCERPT_CHARS).collect();
    let ellipsis = if article.content.chars().count() > RELATED_EXCERPT_CHARS {
        "..."
    } else {
        ""
    };
    let _ = write!(doc, "\n\n{}{}\n\n", clean_article_content(&excerpt), ellipsis);
}

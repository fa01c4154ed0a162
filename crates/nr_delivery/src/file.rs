use std::path::{Path, PathBuf};

use async_trait::async_trait;
use nr_core::{Delivery, Error, Report, Result};
use serde_json::json;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Markdown,
    Html,
    Json,
}

impl OutputFormat {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "markdown" => Some(Self::Markdown),
            "html" => Some(Self::Html),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Html => "html",
            Self::Json => "json",
        }
    }

    fn render(&self, report: &Report) -> Result<String> {
        match self {
            Self::Markdown => Ok(report.content_markdown.clone()),
            Self::Html => Ok(report.content_html.clone()),
            Self::Json => Ok(serde_json::to_string_pretty(&report_json(report))?),
        }
    }
}

fn report_json(report: &Report) -> serde_json::Value {
    let articles: Vec<_> = report
        .articles
        .iter()
        .map(|article| {
            json!({
                "title": article.title,
                "url": article.url,
                "source": article.source,
                "published_at": article.published_at.map(|date| date.to_rfc3339()),
            })
        })
        .collect();

    json!({
        "title": report.title,
        "date": report.date.format("%Y-%m-%d").to_string(),
        "summary": report.summary,
        "article_count": report.article_count(),
        "articles": articles,
    })
}

/// Writes `report_YYYYMMDD.{md,html,json}` files into an output directory.
#[derive(Debug, Clone)]
pub struct FileDelivery {
    output_dir: PathBuf,
    formats: Vec<String>,
}

impl FileDelivery {
    pub fn new(output_dir: impl Into<PathBuf>, formats: Vec<String>) -> Self {
        let formats = if formats.is_empty() {
            vec!["markdown".to_string()]
        } else {
            formats
        };
        Self {
            output_dir: output_dir.into(),
            formats,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn report_path(&self, report: &Report, format: OutputFormat) -> PathBuf {
        self.output_dir.join(format!(
            "report_{}.{}",
            report.date.format("%Y%m%d"),
            format.extension()
        ))
    }

    /// Write every configured format, returning the paths written.
    pub async fn write_all(&self, report: &Report) -> Result<Vec<PathBuf>> {
        tokio::fs::create_dir_all(&self.output_dir).await.map_err(|e| {
            Error::Delivery(format!(
                "Failed to create {}: {}",
                self.output_dir.display(),
                e
            ))
        })?;

        let mut written = Vec::new();
        for name in &self.formats {
            let format = match OutputFormat::parse(name) {
                Some(format) => format,
                None => {
                    warn!("Skipping unknown report format: {}", name);
                    continue;
                }
            };

            let path = self.report_path(report, format);
            let contents = format.render(report)?;
            tokio::fs::write(&path, contents)
                .await
                .map_err(|e| Error::Delivery(format!("Failed to write {} file: {}", name, e)))?;
            written.push(path);
        }
        Ok(written)
    }
}

#[async_trait]
impl Delivery for FileDelivery {
    fn name(&self) -> &str {
        "File"
    }

    async fn deliver(&self, report: &Report) -> Result<()> {
        for path in self.write_all(report).await? {
            info!("💾 Report saved to {}", path.display());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::report;

    #[test]
    fn test_output_format_parse() {
        assert_eq!(OutputFormat::parse("markdown"), Some(OutputFormat::Markdown));
        assert_eq!(OutputFormat::parse(" HTML "), Some(OutputFormat::Html));
        assert_eq!(OutputFormat::parse("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("pdf"), None);
    }

    #[tokio::test]
    async fn test_default_format_is_markdown() {
        let dir = tempfile::tempdir().unwrap();
        let delivery = FileDelivery::new(dir.path(), Vec::new());
        let report = report(1);

        delivery.deliver(&report).await.unwrap();

        let path = dir.path().join("report_20250602.md");
        assert_eq!(std::fs::read_to_string(path).unwrap(), report.content_markdown);
    }

    #[tokio::test]
    async fn test_writes_all_formats_and_skips_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("nested/reports");
        let formats = ["markdown", "html", "json", "pdf"].map(String::from).to_vec();
        let delivery = FileDelivery::new(&output, formats);
        let report = report(2);

        let written = delivery.write_all(&report).await.unwrap();
        assert_eq!(written.len(), 3);
        assert_eq!(
            std::fs::read_to_string(output.join("report_20250602.html")).unwrap(),
            report.content_html
        );

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(output.join("report_20250602.json")).unwrap()).unwrap();
        assert_eq!(json["title"], "AI Weekly");
        assert_eq!(json["date"], "2025-06-02");
        assert_eq!(json["article_count"], 2);
        assert_eq!(json["articles"][0]["url"], "https://news.example/1");
        assert_eq!(json["articles"][0]["published_at"], "2025-06-01T12:00:00+00:00");
        assert!(json["articles"][1]["published_at"].is_null());
        assert!(!output.join("report_20250602.pdf").exists());
    }
}

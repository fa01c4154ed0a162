use std::fmt;

use nr_core::{Article, Result, TextGenerator};

use super::NO_ARTICLES_SUMMARY;

const LEAD_STORIES: usize = 3;

/// Offline backend: builds a summary from the article titles.
#[derive(Default)]
pub struct DummyModel;

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel").finish()
    }
}

impl DummyModel {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl TextGenerator for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn summarize(&self, articles: &[Article], _prompt: Option<&str>, focus: Option<&str>) -> Result<String> {
        if articles.is_empty() {
            return Ok(NO_ARTICLES_SUMMARY.to_string());
        }

        let leads: Vec<String> = articles
            .iter()
            .take(LEAD_STORIES)
            .map(|article| format!("[{}]({})", article.title, article.url))
            .collect();
        let plural = if articles.len() == 1 { "" } else { "s" };

        let mut summary = format!(
            "This report covers {} article{}. Leading stories: {}.",
            articles.len(),
            plural,
            leads.join(", ")
        );
        if let Some(focus) = focus.map(str::trim).filter(|f| !f.is_empty()) {
            summary.push_str(&format!(" Focus: {}.", focus));
        }
        Ok(summary)
    }
}

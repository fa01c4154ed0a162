use std::sync::Arc;

use nr_core::{Article, Error, Result, TextGenerator};
use reqwest::Response;
use serde::Serialize;

use crate::Config;

pub mod claude;
pub mod dummy;
pub mod openai;

pub use claude::ClaudeModel;
pub use dummy::DummyModel;
pub use openai::OpenAIModel;

/// Returned instead of calling a backend when there is nothing to summarize.
pub const NO_ARTICLES_SUMMARY: &str = "No articles to summarize.";

pub const DEFAULT_SUMMARY_PROMPT: &str = "You are a professional news analyst specializing in artificial intelligence and technology.

Write a brief 2-3 sentence executive summary of the key AI developments this week.

IMPORTANT RULES:
- Write ONLY 2-3 SHORT sentences. Be concise.
- NO headers, NO subsections, NO bullet points, NO numbered lists.
- Include inline source links using [Source Name](URL) format.
- Example: \"This week saw major advances in AI healthcare with [Utah's prescription AI initiative](url) and [OpenAI's Torch acquisition](url).\"
{focus}
Here are the articles to analyze:

{articles}
";

#[derive(Serialize)]
pub(crate) struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

/// Format articles as the context block handed to the model.
pub fn format_articles_for_context(articles: &[Article]) -> String {
    articles
        .iter()
        .enumerate()
        .map(|(i, article)| {
            let image_line = article
                .image_url
                .as_ref()
                .map(|url| format!("- **Image**: {}\n", url))
                .unwrap_or_default();
            let published = article
                .published_at
                .map(|date| date.format("%Y-%m-%d %H:%M:%S%:z").to_string())
                .unwrap_or_else(|| "Unknown".to_string());

            format!(
                "\n### Article {}: {}\n- **Source**: {}\n- **URL**: {}\n{}- **Published**: {}\n\n{}\n",
                i + 1,
                article.title,
                article.source,
                article.url,
                image_line,
                published,
                article.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Fill a prompt template with the article context and the optional focus line.
///
/// Templates may use `{articles}` and `{focus}`. A template without
/// `{articles}` gets the context appended after a blank line.
pub fn build_prompt(articles: &[Article], template: Option<&str>, focus: Option<&str>) -> String {
    let template = template.unwrap_or(DEFAULT_SUMMARY_PROMPT);
    let context = format_articles_for_context(articles);
    let focus_text = match focus.map(str::trim) {
        Some(focus) if !focus.is_empty() => format!("\nFOCUS: {}\n", focus),
        _ => String::new(),
    };

    let prompt = template.replace("{focus}", &focus_text);
    if prompt.contains("{articles}") {
        prompt.replace("{articles}", &context)
    } else {
        format!("{}\n\n{}", prompt, context)
    }
}

/// Turn a non-2xx API response into a generation error carrying the body.
pub(crate) async fn check_status(response: Response, provider: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::Generation(format!("{} API error ({}): {}", provider, status, body)))
}

pub(crate) fn non_empty(text: Option<String>, provider: &str) -> Result<String> {
    text.filter(|t| !t.trim().is_empty())
        .ok_or_else(|| Error::Generation(format!("{} returned an empty completion", provider)))
}

/// Build the backend named by `config.provider`.
pub fn create_model(config: &Config) -> Result<Arc<dyn TextGenerator>> {
    match config.provider.to_lowercase().as_str() {
        "claude" => Ok(Arc::new(ClaudeModel::new(config)?)),
        "openai" => Ok(Arc::new(OpenAIModel::new(config)?)),
        "dummy" => Ok(Arc::new(DummyModel::new())),
        other => Err(Error::Config(format!(
            "Unknown LLM provider: {}. Supported: claude, openai, dummy",
            other
        ))),
    }
}

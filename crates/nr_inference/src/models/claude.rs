use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use nr_core::{Article, Error, Result, TextGenerator};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{build_prompt, check_status, non_empty, ChatMessage, NO_ARTICLES_SUMMARY};
use crate::Config;

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const PROVIDER_NAME: &str = "Claude (Anthropic)";

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

/// Anthropic Messages API backend.
pub struct ClaudeModel {
    client: Arc<Client>,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    base_url: String,
}

impl ClaudeModel {
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| Error::Generation("Anthropic API key is required".to_string()))?;

        Ok(Self {
            client: Arc::new(Client::new()),
            api_key,
            model: config.model_name.clone().unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl fmt::Debug for ClaudeModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClaudeModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl TextGenerator for ClaudeModel {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn summarize(&self, articles: &[Article], prompt: Option<&str>, focus: Option<&str>) -> Result<String> {
        if articles.is_empty() {
            return Ok(NO_ARTICLES_SUMMARY.to_string());
        }

        let prompt = build_prompt(articles, prompt, focus);
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
        };

        debug!("Requesting summary of {} articles from {}", articles.len(), self.model);
        let response = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await?;

        let response = check_status(response, "Claude").await?;
        let body = response.json::<MessagesResponse>().await?;
        non_empty(body.content.into_iter().find_map(|block| block.text), "Claude")
    }
}

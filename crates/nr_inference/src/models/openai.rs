use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use nr_core::{Article, Error, Result, TextGenerator};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{build_prompt, check_status, non_empty, ChatMessage, NO_ARTICLES_SUMMARY};
use crate::Config;

pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: Option<String>,
}

/// OpenAI Chat Completions backend.
pub struct OpenAIModel {
    client: Arc<Client>,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    base_url: String,
}

impl OpenAIModel {
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| Error::Generation("OpenAI API key is required".to_string()))?;

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
}

impl fmt::Debug for OpenAIModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAIModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl TextGenerator for OpenAIModel {
    fn name(&self) -> &str {
        "OpenAI"
    }

    async fn summarize(&self, articles: &[Article], prompt: Option<&str>, focus: Option<&str>) -> Result<String> {
        if articles.is_empty() {
            return Ok(NO_ARTICLES_SUMMARY.to_string());
        }

        let prompt = build_prompt(articles, prompt, focus);
        let request = ChatRequest {
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
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        let response = check_status(response, "OpenAI").await?;
        let body = response.json::<ChatResponse>().await?;
        non_empty(
            body.choices.into_iter().next().and_then(|choice| choice.message.content),
            "OpenAI",
        )
    }
}

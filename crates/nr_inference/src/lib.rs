use std::fmt;

pub mod models;

/// Settings shared by every text-generation backend.
#[derive(Clone)]
pub struct Config {
    /// Backend name: `claude`, `openai` or `dummy`
    pub provider: String,
    pub api_key: Option<String>,
    pub model_name: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Overrides the provider's API root, e.g. for a proxy
    pub base_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: "claude".to_string(),
            api_key: None,
            model_name: None,
            max_tokens: 4096,
            temperature: 0.3,
            base_url: None,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model_name", &self.model_name)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("base_url", &self.base_url)
            .finish()
    }
}

pub mod prelude {
    pub use super::models::create_model;
    pub use super::Config;
    pub use nr_core::{Article, Error, Result, TextGenerator};
}

pub use models::create_model;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_api_key() {
        let config = Config {
            api_key: Some("sk-secret".to_string()),
            ..Config::default()
        };
        let printed = format!("{:?}", config);
        assert!(printed.contains("<redacted>"));
        assert!(!printed.contains("sk-secret"));
    }

    #[tokio::test]
    async fn test_inference_pipeline() {
        let config = Config {
            provider: "dummy".to_string(),
            ..Config::default()
        };
        let model = create_model(&config).unwrap();
        let article = nr_core::Article::new("Test Article", "http://test.com", "Body", "test");
        let summary = model.summarize(&[article], None, None).await.unwrap();
        assert!(summary.contains("Test Article"));
    }
}

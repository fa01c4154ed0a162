use std::fmt;

use async_trait::async_trait;

use crate::types::Article;
use crate::Result;

/// A text-generation backend able to synthesize an executive summary.
#[async_trait]
pub trait TextGenerator: Send + Sync + fmt::Debug {
    /// Display name of the provider, e.g. "Claude (Anthropic)"
    fn name(&self) -> &str;

    /// Summarize a batch of articles.
    ///
    /// `prompt` is a template that may contain `{articles}` and `{focus}` placeholders.
    async fn summarize(
        &self,
        articles: &[Article],
        prompt: Option<&str>,
        focus: Option<&str>,
    ) -> Result<String>;
}

use std::fmt;
use std::path::{Path, PathBuf};

use nr_collectors::{SearchOptions, SiteConfig};
use nr_core::{Error, Result};
use nr_delivery::SmtpConfig;
use nr_report::ReportOptions;
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Secrets and process-level settings, read from the environment.
#[derive(Clone)]
pub struct Settings {
    pub anthropic_api_key: String,
    pub openai_api_key: String,
    pub tavily_api_key: String,
    pub smtp: SmtpConfig,
    pub slack_webhook_url: String,
    pub log_level: String,
    pub config_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            anthropic_api_key: String::new(),
            openai_api_key: String::new(),
            tavily_api_key: String::new(),
            smtp: SmtpConfig::default(),
            slack_webhook_url: String::new(),
            log_level: "INFO".to_string(),
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |value: &str| if value.is_empty() { "" } else { "<redacted>" };
        f.debug_struct("Settings")
            .field("anthropic_api_key", &redact(&self.anthropic_api_key))
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("tavily_api_key", &redact(&self.tavily_api_key))
            .field("smtp", &self.smtp)
            .field("slack_webhook_url", &redact(&self.slack_webhook_url))
            .field("log_level", &self.log_level)
            .field("config_path", &self.config_path)
            .finish()
    }
}

/// Load and parse a variable, keeping the default when it is unset.
fn load_env_var<T, F>(lookup: &F, name: &str, target: &mut T) -> Result<()>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(name) {
        *target = value
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid {name}: {e}")))?;
    }
    Ok(())
}

fn load_env_string<F>(lookup: &F, name: &str, target: &mut String)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(name) {
        *target = value;
    }
}

fn load_env_path<F>(lookup: &F, name: &str, target: &mut PathBuf)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(name) {
        *target = PathBuf::from(value);
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();
        load_env_string(&lookup, "ANTHROPIC_API_KEY", &mut settings.anthropic_api_key);
        load_env_string(&lookup, "OPENAI_API_KEY", &mut settings.openai_api_key);
        load_env_string(&lookup, "TAVILY_API_KEY", &mut settings.tavily_api_key);
        load_env_string(&lookup, "SMTP_HOST", &mut settings.smtp.host);
        load_env_var(&lookup, "SMTP_PORT", &mut settings.smtp.port)?;
        load_env_string(&lookup, "SMTP_USER", &mut settings.smtp.user);
        load_env_string(&lookup, "SMTP_PASSWORD", &mut settings.smtp.password);
        load_env_string(&lookup, "SLACK_WEBHOOK_URL", &mut settings.slack_webhook_url);
        load_env_string(&lookup, "LOG_LEVEL", &mut settings.log_level);
        load_env_path(&lookup, "CONFIG_PATH", &mut settings.config_path);
        Ok(settings)
    }

    /// API key for an inference provider, if one is set.
    pub fn api_key_for(&self, provider: &str) -> Option<String> {
        let key = match provider.to_lowercase().as_str() {
            "claude" => &self.anthropic_api_key,
            "openai" => &self.openai_api_key,
            _ => return None,
        };
        (!key.is_empty()).then(|| key.clone())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub enabled: bool,
    pub time_range: String,
    pub max_results_per_keyword: usize,
    pub include_domains: Vec<String>,
    pub exclude_domains: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            time_range: "week".to_string(),
            max_results_per_keyword: 10,
            include_domains: Vec::new(),
            exclude_domains: Vec::new(),
        }
    }
}

impl SearchConfig {
    pub fn options(&self) -> SearchOptions {
        SearchOptions {
            time_range: self.time_range.clone(),
            max_results: self.max_results_per_keyword,
            include_domains: self.include_domains.clone(),
            exclude_domains: self.exclude_domains.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub enabled: bool,
    /// `daily` or `weekly`
    #[serde(rename = "type")]
    pub kind: String,
    pub day_of_week: String,
    /// `HH:MM`, 24-hour clock
    pub time: String,
    /// `UTC` or a fixed offset such as `+09:00`
    pub timezone: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            kind: "weekly".to_string(),
            day_of_week: "monday".to_string(),
            time: "09:00".to_string(),
            timezone: "UTC".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub enabled: bool,
    pub recipients: Vec<String>,
    pub subject_prefix: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            recipients: Vec::new(),
            subject_prefix: "[AI News Weekly]".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SlackConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub enabled: bool,
    pub output_dir: PathBuf,
    pub formats: Vec<String>,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            output_dir: PathBuf::from("./reports"),
            formats: vec!["markdown".to_string()],
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    pub email: EmailConfig,
    pub slack: SlackConfig,
    pub file: FileConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: String,
    pub model: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub summary_prompt: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "claude".to_string(),
            model: None,
            max_tokens: 4096,
            temperature: 0.3,
            summary_prompt: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub title: String,
    pub max_articles: usize,
    pub deduplicate: bool,
    pub highlight_count: usize,
    pub focus: String,
    pub similarity_threshold: f64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        let options = ReportOptions::default();
        Self {
            title: options.title,
            max_articles: 50,
            deduplicate: options.deduplicate,
            highlight_count: options.highlight_count,
            focus: String::new(),
            similarity_threshold: options.similarity_threshold,
        }
    }
}

/// The YAML application configuration. Every section and field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub keywords: Vec<String>,
    pub sites: Vec<SiteConfig>,
    pub search: SearchConfig,
    pub schedule: ScheduleConfig,
    pub delivery: DeliveryConfig,
    pub llm: LlmConfig,
    pub report: ReportConfig,
}

impl AppConfig {
    pub fn from_yaml(contents: &str) -> Result<Self> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents).map_err(|e| Error::Config(format!("Invalid configuration: {}", e)))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::Config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    pub fn enabled_sites(&self) -> Vec<SiteConfig> {
        self.sites.iter().filter(|site| site.enabled).cloned().collect()
    }

    pub fn report_options(&self) -> ReportOptions {
        let focus = self.report.focus.trim();
        ReportOptions {
            title: self.report.title.clone(),
            highlight_count: self.report.highlight_count,
            max_articles: (self.report.max_articles > 0).then_some(self.report.max_articles),
            deduplicate: self.report.deduplicate,
            similarity_threshold: self.report.similarity_threshold,
            prompt: self.llm.summary_prompt.clone(),
            focus: (!focus.is_empty()).then(|| focus.to_string()),
            recipients: self.delivery.email.recipients.clone(),
        }
    }

    pub fn inference_config(&self, settings: &Settings) -> nr_inference::Config {
        nr_inference::Config {
            provider: self.llm.provider.clone(),
            api_key: settings.api_key_for(&self.llm.provider),
            model_name: self.llm.model.clone(),
            max_tokens: self.llm.max_tokens,
            temperature: self.llm.temperature,
            base_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings.smtp.host, "smtp.gmail.com");
        assert_eq!(settings.smtp.port, 587);
        assert_eq!(settings.log_level, "INFO");
        assert_eq!(settings.config_path, PathBuf::from("config.yaml"));
        assert_eq!(settings.api_key_for("claude"), None);
    }

    #[test]
    fn test_settings_from_environment() {
        let settings = Settings::from_lookup(lookup(&[
            ("ANTHROPIC_API_KEY", "sk-ant"),
            ("OPENAI_API_KEY", "sk-oai"),
            ("SMTP_PORT", "2525"),
            ("SMTP_USER", "bot@example.com"),
            ("CONFIG_PATH", "/etc/ai-news.yaml"),
        ]))
        .unwrap();

        assert_eq!(settings.smtp.port, 2525);
        assert_eq!(settings.smtp.user, "bot@example.com");
        assert_eq!(settings.config_path, PathBuf::from("/etc/ai-news.yaml"));
        assert_eq!(settings.api_key_for("Claude").as_deref(), Some("sk-ant"));
        assert_eq!(settings.api_key_for("openai").as_deref(), Some("sk-oai"));
        assert_eq!(settings.api_key_for("dummy"), None);
        assert!(!format!("{:?}", settings).contains("sk-ant"));
    }

    #[test]
    fn test_invalid_port_is_config_error() {
        let result = Settings::from_lookup(lookup(&[("SMTP_PORT", "smtp")]));
        assert!(matches!(result, Err(Error::Config(message)) if message.contains("SMTP_PORT")));
    }

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = AppConfig::from_yaml("").unwrap();
        assert!(config.keywords.is_empty());
        assert!(config.search.enabled);
        assert_eq!(config.schedule.kind, "weekly");
        assert!(config.delivery.file.enabled);
        assert_eq!(config.delivery.file.formats, vec!["markdown"]);
        assert_eq!(config.llm.provider, "claude");
        assert_eq!(config.report.title, "AI News Weekly Report");
        assert_eq!(config.report.max_articles, 50);
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = r#"
keywords: ["LLM", "robotics"]
sites:
  - name: Lab Blog
    url: https://lab.example/news
    selectors:
      article: div.post
  - url: https://other.example
    enabled: false
schedule:
  type: daily
  time: "07:30"
delivery:
  email:
    enabled: true
    recipients: [team@example.com]
llm:
  provider: dummy
  summary_prompt: "Summarize {articles}"
report:
  focus: "  open models "
  max_articles: 20
"#;
        let config = AppConfig::from_yaml(yaml).unwrap();

        assert_eq!(config.keywords, vec!["LLM", "robotics"]);
        assert_eq!(config.sites.len(), 2);
        assert_eq!(config.sites[1].name, "Unknown");
        assert_eq!(config.enabled_sites().len(), 1);
        assert_eq!(config.enabled_sites()[0].selectors.article(), "div.post");
        assert_eq!(config.schedule.kind, "daily");
        assert_eq!(config.schedule.day_of_week, "monday");
        assert_eq!(config.delivery.email.subject_prefix, "[AI News Weekly]");

        let options = config.report_options();
        assert_eq!(options.max_articles, Some(20));
        assert_eq!(options.focus.as_deref(), Some("open models"));
        assert_eq!(options.prompt.as_deref(), Some("Summarize {articles}"));
        assert_eq!(options.recipients, vec!["team@example.com"]);
    }

    #[test]
    fn test_zero_max_articles_means_no_cap() {
        let config = AppConfig::from_yaml("report:\n  max_articles: 0\n").unwrap();
        assert_eq!(config.report_options().max_articles, None);
        assert_eq!(AppConfig::default().report_options().max_articles, Some(50));
    }

    #[test]
    fn test_inference_config_picks_provider_key() {
        let settings = Settings {
            openai_api_key: "sk-oai".to_string(),
            ..Settings::default()
        };
        let mut config = AppConfig::default();
        config.llm.provider = "openai".to_string();
        config.llm.model = Some("gpt-4.1".to_string());

        let inference = config.inference_config(&settings);
        assert_eq!(inference.api_key.as_deref(), Some("sk-oai"));
        assert_eq!(inference.model_name.as_deref(), Some("gpt-4.1"));
        assert_eq!(inference.max_tokens, 4096);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "keywords: [agents]").unwrap();
        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.keywords, vec!["agents"]);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = AppConfig::load(&dir.path().join("missing.yaml"));
        assert!(matches!(result, Err(Error::Config(message)) if message.contains("not found")));
    }

    #[test]
    fn test_malformed_yaml_is_config_error() {
        let result = AppConfig::from_yaml("keywords: {not: [a list");
        assert!(matches!(result, Err(Error::Config(_))));
    }
}

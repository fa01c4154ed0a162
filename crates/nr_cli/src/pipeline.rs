use nr_collectors::{CollectorManager, ImageEnricher, SiteCollector, TavilyCollector};
use nr_core::{Delivery, Error, Report, Result};
use nr_delivery::{EmailDelivery, FileDelivery, WebhookDelivery};
use nr_inference::create_model;
use nr_report::ReportAssembler;

use crate::config::{AppConfig, Settings};
use crate::logging::Logger;

pub fn build_collectors(settings: &Settings, config: &AppConfig, logger: &Logger) -> CollectorManager {
    let mut manager = CollectorManager::new();

    if config.search.enabled {
        if settings.tavily_api_key.is_empty() {
            logger.warn("TAVILY_API_KEY is not set, skipping web search");
        } else if config.keywords.is_empty() {
            logger.warn("No keywords configured, skipping web search");
        } else {
            match TavilyCollector::new(
                settings.tavily_api_key.clone(),
                config.keywords.clone(),
                config.search.options(),
            ) {
                Ok(collector) => manager.add_collector(Box::new(collector)),
                Err(e) => logger.warn(&format!("Web search disabled: {}", e)),
            }
        }
    }

    let sites = config.enabled_sites();
    if !sites.is_empty() {
        manager.add_collector(Box::new(SiteCollector::new(sites)));
    }

    manager
}

/// Enabled channels, in delivery order: file, email, then chat.
pub fn build_deliveries(settings: &Settings, config: &AppConfig, logger: &Logger) -> Vec<Box<dyn Delivery>> {
    let mut deliveries: Vec<Box<dyn Delivery>> = Vec::new();
    let delivery = &config.delivery;

    if delivery.file.enabled {
        deliveries.push(Box::new(FileDelivery::new(
            delivery.file.output_dir.clone(),
            delivery.file.formats.clone(),
        )));
    }

    if delivery.email.enabled {
        deliveries.push(Box::new(EmailDelivery::new(
            settings.smtp.clone(),
            delivery.email.recipients.clone(),
            delivery.email.subject_prefix.clone(),
        )));
    }

    if delivery.slack.enabled {
        match WebhookDelivery::new(settings.slack_webhook_url.clone()) {
            Ok(webhook) => deliveries.push(Box::new(webhook)),
            Err(_) => logger.warn("Slack delivery is enabled but SLACK_WEBHOOK_URL is not set"),
        }
    }

    deliveries
}

/// Hand the report to every channel. Returns how many succeeded.
pub async fn deliver_report(report: &Report, deliveries: &[Box<dyn Delivery>], logger: &Logger) -> usize {
    let mut delivered = 0;
    for delivery in deliveries {
        match delivery.deliver(report).await {
            Ok(()) => {
                logger.info(&format!("✅ {} delivery succeeded", delivery.name()));
                delivered += 1;
            }
            Err(e) => logger.error(&format!("{} delivery failed: {}", delivery.name(), e)),
        }
    }
    if delivered == 0 {
        logger.warn("No delivery methods succeeded");
    }
    delivered
}

/// One end-to-end run: collect, deduplicate, enrich, summarize, deliver.
pub async fn run_report(settings: &Settings, config: &AppConfig, logger: &Logger) -> Result<Report> {
    let logger = logger.clone().with_prefix("[run]");

    let manager = build_collectors(settings, config, &logger);
    if manager.is_empty() {
        logger.warn("No collectors are enabled");
    } else {
        logger.info(&format!("🔎 Collecting from {}", manager.collector_names().join(", ")));
    }

    let articles = manager.collect_all().await;
    if articles.is_empty() {
        return Err(Error::Collection(
            "No articles collected. Check your keywords, sites and API keys".to_string(),
        ));
    }
    logger.info(&format!("📰 Collected {} articles", articles.len()));

    let model = create_model(&config.inference_config(settings))?;
    let assembler = ReportAssembler::new(model.clone(), config.report_options());

    let articles = assembler.prepare_articles(articles);
    let articles = ImageEnricher::default().enrich(articles).await;

    logger.info(&format!(
        "🧠 Summarizing {} articles for '{}' with {}",
        articles.len(),
        assembler.options().title,
        model.name()
    ));
    let report = assembler.generate_report(articles).await?;
    logger.info(&format!("📝 Report ready: {}", report.title));

    let deliveries = build_deliveries(settings, config, &logger);
    deliver_report(&report, &deliveries, &logger).await;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use nr_collectors::SiteConfig;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug)]
    struct RecordingDelivery {
        name: &'static str,
        fail: bool,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Delivery for RecordingDelivery {
        fn name(&self) -> &str {
            self.name
        }

        async fn deliver(&self, _report: &Report) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(Error::Delivery("offline".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn empty_report() -> Report {
        Report {
            title: "AI Weekly".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            articles: Vec::new(),
            summary: String::new(),
            content_markdown: String::new(),
            content_html: String::new(),
            content_text: String::new(),
            recipients: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_failed_delivery_does_not_stop_others() {
        let calls = Arc::new(AtomicUsize::new(0));
        let deliveries: Vec<Box<dyn Delivery>> = vec![
            Box::new(RecordingDelivery { name: "a", fail: true, calls: calls.clone() }),
            Box::new(RecordingDelivery { name: "b", fail: false, calls: calls.clone() }),
            Box::new(RecordingDelivery { name: "c", fail: true, calls: calls.clone() }),
        ];

        let delivered = deliver_report(&empty_report(), &deliveries, &Logger::new()).await;
        assert_eq!(delivered, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_build_deliveries_in_order() {
        let settings = Settings {
            slack_webhook_url: "https://hooks.example/abc".to_string(),
            ..Settings::default()
        };
        let mut config = AppConfig::default();
        config.delivery.email.enabled = true;
        config.delivery.slack.enabled = true;

        let deliveries = build_deliveries(&settings, &config, &Logger::new());
        let names: Vec<_> = deliveries.iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["File", "Email", "Slack"]);
    }

    #[test]
    fn test_slack_skipped_without_webhook() {
        let mut config = AppConfig::default();
        config.delivery.file.enabled = false;
        config.delivery.slack.enabled = true;
        assert!(build_deliveries(&Settings::default(), &config, &Logger::new()).is_empty());
    }

    #[test]
    fn test_search_needs_key_and_keywords() {
        let mut config = AppConfig::default();
        config.keywords = vec!["LLM".to_string()];
        let manager = build_collectors(&Settings::default(), &config, &Logger::new());
        assert!(manager.is_empty());

        let settings = Settings {
            tavily_api_key: "tvly-key".to_string(),
            ..Settings::default()
        };
        let manager = build_collectors(&settings, &config, &Logger::new());
        assert_eq!(manager.collector_names(), vec!["Tavily Search"]);
    }

    #[tokio::test]
    async fn test_no_articles_is_fatal() {
        let mut config = AppConfig::default();
        config.llm.provider = "dummy".to_string();
        let result = run_report(&Settings::default(), &config, &Logger::new()).await;
        assert!(matches!(result, Err(Error::Collection(_))));
    }

    #[tokio::test]
    async fn test_run_report_end_to_end() {
        let server = MockServer::start().await;
        let listing = r#"<html><body>
            <article><h2><a href="/posts/gemini">Google unveils Gemini 2</a></h2><p>Multimodal model.</p></article>
            <article><h2><a href="/posts/gemini-again">Google unveils Gemini 2!</a></h2><p>Same story.</p></article>
            <article><h2><a href="/posts/act">EU passes AI act</a></h2><p>Regulation.</p></article>
            </body></html>"#;
        Mock::given(method("GET"))
            .and(path("/news"))
            .respond_with(ResponseTemplate::new(200).set_body_string(listing))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/posts/gemini"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<html><head><meta property="og:image" content="https://img.example/gemini.png"></head></html>"#,
            ))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.search.enabled = false;
        config.llm.provider = "dummy".to_string();
        config.delivery.file.output_dir = dir.path().to_path_buf();
        config.sites = vec![SiteConfig {
            name: "Lab".to_string(),
            url: format!("{}/news", server.uri()),
            enabled: true,
            selectors: Default::default(),
        }];

        let report = run_report(&Settings::default(), &config, &Logger::new()).await.unwrap();

        assert_eq!(report.article_count(), 2);
        assert_eq!(report.articles[0].image_url.as_deref(), Some("https://img.example/gemini.png"));
        assert_eq!(report.articles[1].image_url, None);
        assert!(report.summary.contains("2 article"));

        let saved = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(saved, 1);
        let path = dir.path().join(format!("report_{}.md", report.date.format("%Y%m%d")));
        let markdown = std::fs::read_to_string(path).unwrap();
        assert_eq!(markdown, report.content_markdown);
        assert!(markdown.contains("EU passes AI act"));
    }
}

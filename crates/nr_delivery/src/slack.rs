use std::time::Duration;

use async_trait::async_trait;
use nr_core::{Delivery, Error, Report, Result};
use nr_report::{truncate, ReportView};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::info;

const SUMMARY_MAX_CHARS: usize = 2900;
const TITLE_MAX_CHARS: usize = 100;
const TOP_ARTICLES: usize = 5;

/// Block-kit message body for a report.
pub fn build_payload(report: &Report) -> Value {
    let view = ReportView::new(report);

    let mut blocks = vec![
        json!({
            "type": "header",
            "text": { "type": "plain_text", "text": view.title(), "emoji": true }
        }),
        json!({
            "type": "context",
            "elements": [{
                "type": "mrkdwn",
                "text": format!("*Date:* {} | *Articles:* {}", view.date_label(), view.article_count())
            }]
        }),
        json!({ "type": "divider" }),
        json!({
            "type": "section",
            "text": { "type": "mrkdwn", "text": truncate(&report.summary, SUMMARY_MAX_CHARS) }
        }),
        json!({ "type": "divider" }),
        json!({
            "type": "section",
            "text": { "type": "mrkdwn", "text": "*Top Sources:*" }
        }),
    ];

    for article in view.top_articles(TOP_ARTICLES) {
        let title = truncate(&article.title, TITLE_MAX_CHARS);
        let block = match &article.image_url {
            Some(image_url) => json!({
                "type": "section",
                "text": {
                    "type": "mrkdwn",
                    "text": format!("*<{}|{}>*\n_{}_", article.url, title, article.source)
                },
                "accessory": { "type": "image", "image_url": image_url, "alt_text": article.title }
            }),
            None => json!({
                "type": "section",
                "text": {
                    "type": "mrkdwn",
                    "text": format!("• *<{}|{}>* - _{}_", article.url, title, article.source)
                }
            }),
        };
        blocks.push(block);
    }

    json!({
        "text": format!("{} - {}", view.title(), view.date_label()),
        "blocks": blocks,
    })
}

/// Posts the report to a chat incoming-webhook URL.
#[derive(Debug, Clone)]
pub struct WebhookDelivery {
    client: Client,
    webhook_url: String,
}

impl WebhookDelivery {
    pub fn new(webhook_url: impl Into<String>) -> Result<Self> {
        let webhook_url = webhook_url.into();
        if webhook_url.trim().is_empty() {
            return Err(Error::Delivery("Webhook URL is required".to_string()));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Delivery(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, webhook_url })
    }
}

#[async_trait]
impl Delivery for WebhookDelivery {
    fn name(&self) -> &str {
        "Slack"
    }

    async fn deliver(&self, report: &Report) -> Result<()> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&build_payload(report))
            .send()
            .await
            .map_err(|e| Error::Delivery(format!("Webhook request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Delivery(format!("Webhook returned {}: {}", status, body)));
        }

        info!("💬 Report posted to {}", self.name());
        Ok(())
    }
}

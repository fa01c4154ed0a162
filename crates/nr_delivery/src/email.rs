use std::fmt;

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use nr_core::{Delivery, Error, Report, Result};
use tracing::info;

#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "smtp.gmail.com".to_string(),
            port: 587,
            user: String::new(),
            password: String::new(),
        }
    }
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox> {
    address
        .trim()
        .parse()
        .map_err(|e| Error::Delivery(format!("Invalid email address {:?}: {}", address, e)))
}

/// Sends the report as a multipart (plain text + HTML) email over STARTTLS.
#[derive(Debug, Clone)]
pub struct EmailDelivery {
    smtp: SmtpConfig,
    recipients: Vec<String>,
    subject_prefix: String,
}

impl EmailDelivery {
    pub fn new(smtp: SmtpConfig, recipients: Vec<String>, subject_prefix: impl Into<String>) -> Self {
        Self {
            smtp,
            recipients,
            subject_prefix: subject_prefix.into(),
        }
    }

    pub fn subject(&self, report: &Report) -> String {
        format!("{} {} - {}", self.subject_prefix, report.title, report.date)
    }

    /// Recipients carried by the report win over the configured list.
    pub fn recipients_for<'a>(&'a self, report: &'a Report) -> &'a [String] {
        if report.recipients.is_empty() {
            &self.recipients
        } else {
            &report.recipients
        }
    }

    pub fn build_message(&self, report: &Report) -> Result<Message> {
        let recipients = self.recipients_for(report);
        if recipients.is_empty() {
            return Err(Error::Delivery("No email recipients configured".to_string()));
        }
        if self.smtp.user.is_empty() || self.smtp.password.is_empty() {
            return Err(Error::Delivery("SMTP credentials not configured".to_string()));
        }

        let mut builder = Message::builder()
            .from(parse_mailbox(&self.smtp.user)?)
            .subject(self.subject(report));
        for recipient in recipients {
            builder = builder.to(parse_mailbox(recipient)?);
        }

        builder
            .multipart(MultiPart::alternative_plain_html(
                report.content_text.clone(),
                report.content_html.clone(),
            ))
            .map_err(|e| Error::Delivery(format!("Failed to build email: {}", e)))
    }
}

#[async_trait]
impl Delivery for EmailDelivery {
    fn name(&self) -> &str {
        "Email"
    }

    async fn deliver(&self, report: &Report) -> Result<()> {
        let message = self.build_message(report)?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.smtp.host)
            .map_err(|e| Error::Delivery(format!("Invalid SMTP host {}: {}", self.smtp.host, e)))?
            .port(self.smtp.port)
            .credentials(Credentials::new(self.smtp.user.clone(), self.smtp.password.clone()))
            .build();

        transport
            .send(message)
            .await
            .map_err(|e| Error::Delivery(format!("Failed to send email: {}", e)))?;

        info!("📧 Report sent to {} recipients", self.recipients_for(report).len());
        Ok(())
    }
}

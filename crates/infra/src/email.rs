//! Notification senders.
//!
//! `LogNotificationSender` is the default for local runs: it writes the
//! message to the structured log instead of delivering it, codes included,
//! which is exactly what you want on a development machine and never in
//! production. `HttpNotificationSender` posts to a transactional email API.

use async_trait::async_trait;
use serde::Serialize;

use passgate_identity::{EmailMessage, NotificationSender};

/// Logs messages instead of sending them.
#[derive(Debug, Default)]
pub struct LogNotificationSender;

#[async_trait]
impl NotificationSender for LogNotificationSender {
    async fn send(&self, message: EmailMessage) -> anyhow::Result<()> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            body = %message.body,
            "email delivery suppressed, logging instead"
        );
        Ok(())
    }
}

const DEFAULT_API_BASE: &str = "https://api.resend.com/emails";

#[derive(Debug, Serialize)]
struct OutboundEmail<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Delivers via an HTTP email API (Resend-compatible payload shape).
pub struct HttpNotificationSender {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    from: String,
}

impl HttpNotificationSender {
    pub fn new(api_key: String, from: String) -> Self {
        Self::with_api_base(DEFAULT_API_BASE.to_string(), api_key, from)
    }

    pub fn with_api_base(api_base: String, api_key: String, from: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base,
            api_key,
            from,
        }
    }
}

#[async_trait]
impl NotificationSender for HttpNotificationSender {
    async fn send(&self, message: EmailMessage) -> anyhow::Result<()> {
        let payload = OutboundEmail {
            from: &self.from,
            to: &message.to,
            subject: &message.subject,
            text: &message.body,
        };

        let response = self
            .client
            .post(&self.api_base)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("email API returned {status}: {body}");
        }

        tracing::debug!(to = %message.to, subject = %message.subject, "email dispatched");
        Ok(())
    }
}

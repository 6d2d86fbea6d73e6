//! The send capability consumed by the [`Mailer`](crate::Mailer).

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::config::MailerConfig;
use crate::error::Result;
use crate::response::Transaction;
use crate::schema::{MergeVar, SendRequest, SendTemplateRequest, WireMessage};

/// Per-send delivery options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Ask the API to queue the message and reply immediately.
    pub is_async: bool,
    /// Deliver at a later time instead of now.
    pub send_at: Option<DateTime<Utc>>,
}

/// Submits wire payloads to the remote API.
///
/// Implementations return the decoded reply as a [`Transaction`], including
/// error replies. `Err` is reserved for failures to reach the API at all.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_raw(&self, message: &WireMessage, delivery: &Delivery) -> Result<Transaction>;

    async fn send_template(
        &self,
        template_name: &str,
        template_content: &[MergeVar],
        message: &WireMessage,
        delivery: &Delivery,
    ) -> Result<Transaction>;
}

/// JSON-over-HTTPS client for the transactional API.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpTransport {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn from_config(config: &MailerConfig) -> Result<Self> {
        Self::new(
            config.apikey.trim(),
            config.base_url.as_str(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post(&self, path: &str, json: String) -> Result<Transaction> {
        let url = format!("{}/{path}", self.base_url);
        tracing::debug!(target: "mandrill", "POST {url}");
        let resp = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .body(json)
            .send()
            .await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        tracing::trace!(target: "mandrill", "Received {status} response {body}");
        Ok(Transaction::from_reply(status, &body))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send_raw(&self, message: &WireMessage, delivery: &Delivery) -> Result<Transaction> {
        let json = serde_json::to_string(&SendRequest {
            key: &self.api_key,
            message,
            is_async: delivery.is_async,
            send_at: delivery.send_at,
        })?;
        self.post("messages/send.json", json).await
    }

    async fn send_template(
        &self,
        template_name: &str,
        template_content: &[MergeVar],
        message: &WireMessage,
        delivery: &Delivery,
    ) -> Result<Transaction> {
        let json = serde_json::to_string(&SendTemplateRequest {
            key: &self.api_key,
            template_name,
            template_content,
            message,
            is_async: delivery.is_async,
            send_at: delivery.send_at,
        })?;
        self.post("messages/send-template.json", json).await
    }
}

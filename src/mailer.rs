//! Composing and sending messages.

use std::sync::{Arc, Mutex};

use serde_json::{Map, Value};

use crate::attachment::{MagicSniffer, MimeSniffer};
use crate::config::MailerConfig;
use crate::error::{ConfigError, MailError, Result};
use crate::message::Message;
use crate::response::{classify, Transaction};
use crate::transport::{Delivery, HttpTransport, Transport};

/// Bodies produced by rendering an application view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedView {
    pub html: Option<String>,
    pub text: Option<String>,
}

/// Renders application views into message bodies.
///
/// Only used outside template mode; remote templates are rendered by the API.
pub trait ViewRenderer: Send + Sync {
    fn render(&self, view: &str, params: &Map<String, Value>) -> Result<RenderedView>;
}

/// Builds messages with the configured defaults and sends them through a
/// [`Transport`].
///
/// Every send stores the raw reply, available from
/// [`last_transaction`](Mailer::last_transaction).
pub struct Mailer<T = HttpTransport> {
    config: MailerConfig,
    transport: T,
    sniffer: Arc<dyn MimeSniffer>,
    renderer: Option<Arc<dyn ViewRenderer>>,
    last_transaction: Mutex<Option<Transaction>>,
}

impl Mailer<HttpTransport> {
    /// Create a mailer talking to the HTTP API described by `config`.
    pub fn from_config(config: MailerConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::from_config(&config)?;
        Ok(Self::new(config, transport)?)
    }

    /// Create a mailer from `MANDRILL_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_config(MailerConfig::from_env()?)
    }
}

impl<T: Transport> Mailer<T> {
    pub fn new(config: MailerConfig, transport: T) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            transport,
            sniffer: Arc::new(MagicSniffer),
            renderer: None,
            last_transaction: Mutex::new(None),
        })
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn ViewRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn with_sniffer(mut self, sniffer: Arc<dyn MimeSniffer>) -> Self {
        self.sniffer = sniffer;
        self
    }

    pub fn config(&self) -> &MailerConfig {
        &self.config
    }

    /// The underlying API client.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// An empty message carrying the configured sender defaults.
    pub fn message(&self) -> Message {
        Message::new(self.config.sender.clone()).with_sniffer(self.sniffer.clone())
    }

    /// Compose a message for `view`.
    ///
    /// In template mode the view names a remote template and `params` become
    /// its content; view rendering is skipped. Otherwise the configured
    /// [`ViewRenderer`] fills in the bodies.
    pub fn compose(&self, view: Option<&str>, params: &Map<String, Value>) -> Result<Message> {
        let mut message = self.message();

        if self.config.use_mandrill_templates {
            message.set_template_data(
                view.unwrap_or_default(),
                params.clone(),
                self.config.template_language,
            );
            if self.config.use_template_defaults {
                message.enable_template_defaults();
            }
            return Ok(message);
        }

        let Some(view) = view else {
            return Ok(message);
        };
        let renderer = self.renderer.as_ref().ok_or_else(|| MailError::Render {
            view: view.to_string(),
            reason: "no view renderer configured".to_string(),
        })?;
        let rendered = renderer.render(view, params)?;
        if let Some(html) = rendered.html {
            message.set_html_body(html);
        }
        if let Some(text) = rendered.text {
            message.set_text_body(text);
        }
        Ok(message)
    }

    /// Send `message`, returning whether every recipient was accepted.
    ///
    /// Transport failures are logged and reported as `false`; the raw reply
    /// or error is kept in [`last_transaction`](Mailer::last_transaction).
    pub async fn send(&self, message: &Message) -> bool {
        tracing::info!(
            target: "mandrill",
            "Sending email \"{}\" to \"{}\"",
            message.subject().unwrap_or_default(),
            message.to().addresses().collect::<Vec<_>>().join(", ")
        );

        let wire = message.to_wire();
        let delivery = Delivery {
            is_async: message.is_async(),
            send_at: message.send_at(),
        };
        let result = if self.config.use_mandrill_templates {
            self.transport
                .send_template(
                    message.template_name().unwrap_or_default(),
                    message.template_content(),
                    &wire,
                    &delivery,
                )
                .await
        } else {
            self.transport.send_raw(&wire, &delivery).await
        };

        let transaction = match result {
            Ok(transaction) => transaction,
            Err(err) => Transaction::Error(err.to_string()),
        };
        let success = classify(&transaction);
        *self.lock_last() = Some(transaction);
        success
    }

    /// The raw reply of the most recent send, if any.
    pub fn last_transaction(&self) -> Option<Transaction> {
        self.lock_last().clone()
    }

    fn lock_last(&self) -> std::sync::MutexGuard<'_, Option<Transaction>> {
        self.last_transaction
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

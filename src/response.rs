//! Interpreting the remote API's reply to a send call.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Delivery state reported for one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SendStatus {
    Sent,
    Queued,
    Scheduled,
    Rejected,
    Invalid,
    /// Any value the API may add later.
    Other(String),
}

impl SendStatus {
    pub fn as_str(&self) -> &str {
        match self {
            SendStatus::Sent => "sent",
            SendStatus::Queued => "queued",
            SendStatus::Scheduled => "scheduled",
            SendStatus::Rejected => "rejected",
            SendStatus::Invalid => "invalid",
            SendStatus::Other(other) => other,
        }
    }
}

impl From<String> for SendStatus {
    fn from(status: String) -> Self {
        match status.as_str() {
            "sent" => SendStatus::Sent,
            "queued" => SendStatus::Queued,
            "scheduled" => SendStatus::Scheduled,
            "rejected" => SendStatus::Rejected,
            "invalid" => SendStatus::Invalid,
            _ => SendStatus::Other(status),
        }
    }
}

impl From<&str> for SendStatus {
    fn from(status: &str) -> Self {
        status.to_string().into()
    }
}

impl From<SendStatus> for String {
    fn from(status: SendStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for SendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a successful send reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientStatus {
    pub email: String,
    pub status: SendStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reject_reason: Option<String>,
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl RecipientStatus {
    pub fn new(email: impl Into<String>, status: impl Into<SendStatus>) -> Self {
        Self {
            email: email.into(),
            status: status.into(),
            reject_reason: None,
            id: None,
        }
    }

    pub fn with_reject_reason(mut self, reason: impl Into<String>) -> Self {
        self.reject_reason = Some(reason.into());
        self
    }
}

/// Structured error body returned by the API, e.g.
/// `{"status":"error","code":-1,"name":"Invalid_Key","message":"Invalid API key"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    pub message: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.name, self.code) {
            (Some(name), Some(code)) => write!(f, "{name} ({code}): {}", self.message),
            (Some(name), None) => write!(f, "{name}: {}", self.message),
            _ => f.write_str(&self.message),
        }
    }
}

/// The raw outcome of a send call, kept for inspection after the fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Transaction {
    /// Per-recipient statuses.
    Recipients(Vec<RecipientStatus>),
    /// A structured API error.
    Api(ApiError),
    /// A raw error message, from the API or the transport.
    Error(String),
}

impl Transaction {
    /// Decode an HTTP reply into a transaction.
    pub fn from_reply(status: u16, body: &str) -> Self {
        if (200..300).contains(&status) {
            if let Ok(recipients) = serde_json::from_str::<Vec<RecipientStatus>>(body) {
                return Transaction::Recipients(recipients);
            }
        }
        if let Ok(error) = serde_json::from_str::<ApiError>(body) {
            return Transaction::Api(error);
        }
        let body = body.trim();
        if body.is_empty() {
            Transaction::Error(format!("unexpected HTTP status {status} with empty body"))
        } else {
            Transaction::Error(body.to_string())
        }
    }

    /// Per-recipient statuses, empty for error transactions.
    pub fn recipients(&self) -> &[RecipientStatus] {
        match self {
            Transaction::Recipients(recipients) => recipients,
            _ => &[],
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(self, Transaction::Recipients(_))
    }
}

/// Classify a transaction as delivered or not, logging each recipient outcome.
///
/// Errors always fail. Otherwise the send succeeds unless a recipient is
/// `invalid` or `rejected`. Statuses the API may add later leave the result
/// unchanged.
pub fn classify(transaction: &Transaction) -> bool {
    let recipients = match transaction {
        Transaction::Recipients(recipients) => recipients,
        Transaction::Api(error) => {
            tracing::error!(target: "mandrill", "A mandrill error occurred: {error}");
            return false;
        }
        Transaction::Error(message) => {
            tracing::error!(target: "mandrill", "A mandrill error occurred: {message}");
            return false;
        }
    };

    let mut success = true;
    for recipient in recipients {
        let email = &recipient.email;
        match &recipient.status {
            SendStatus::Invalid => {
                success = false;
                tracing::warn!(
                    target: "mandrill",
                    "the email for \"{email}\" has not been sent: status \"invalid\""
                );
            }
            SendStatus::Rejected => {
                success = false;
                tracing::warn!(
                    target: "mandrill",
                    "the email for \"{email}\" has been rejected: reason \"{}\"",
                    recipient.reject_reason.as_deref().unwrap_or_default()
                );
            }
            SendStatus::Queued => {
                tracing::info!(
                    target: "mandrill",
                    "the email for \"{email}\" is now in a queue waiting to be sent."
                );
            }
            SendStatus::Scheduled => {
                tracing::info!(
                    target: "mandrill",
                    "the email submission for \"{email}\" has been scheduled."
                );
            }
            SendStatus::Sent => {
                tracing::info!(target: "mandrill", "the email for \"{email}\" has been sent.");
            }
            SendStatus::Other(status) => {
                tracing::debug!(
                    target: "mandrill",
                    "ignoring unknown status \"{status}\" for \"{email}\""
                );
            }
        }
    }
    success
}

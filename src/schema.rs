use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::attachment::Attachment;
use crate::error::ConfigError;

/// Placeholder syntax used by a remote template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeLanguage {
    #[default]
    Mailchimp,
    Handlebars,
}

impl MergeLanguage {
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeLanguage::Mailchimp => "mailchimp",
            MergeLanguage::Handlebars => "handlebars",
        }
    }
}

impl fmt::Display for MergeLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergeLanguage {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mailchimp" => Ok(MergeLanguage::Mailchimp),
            "handlebars" => Ok(MergeLanguage::Handlebars),
            other => Err(ConfigError::InvalidTemplateLanguage(other.to_string())),
        }
    }
}

/// A `{name, content}` pair, used for merge vars and template content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeVar {
    pub name: String,
    pub content: Value,
}

impl MergeVar {
    pub fn new(name: impl Into<String>, content: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Merge vars targeted at a single recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipientMergeVars {
    pub rcpt: String,
    pub vars: Vec<MergeVar>,
}

/// Metadata attached to a single recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipientMetadata {
    pub rcpt: String,
    pub values: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipientType {
    To,
    Cc,
    Bcc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireRecipient {
    pub email: String,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: RecipientType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headers {
    #[serde(rename = "Reply-To")]
    pub reply_to: String,
}

/// The `message` record expected by the remote API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireMessage {
    pub headers: Headers,
    pub html: Option<String>,
    pub text: Option<String>,
    pub subject: Option<String>,
    pub from_email: Option<String>,
    pub from_name: Option<String>,
    pub to: Vec<WireRecipient>,
    pub track_opens: bool,
    pub track_clicks: bool,
    pub tags: Vec<String>,
    pub merge_language: MergeLanguage,
    pub global_merge_vars: Vec<MergeVar>,
    pub merge_vars: Vec<RecipientMergeVars>,
    pub metadata: Map<String, Value>,
    pub recipient_metadata: Vec<RecipientMetadata>,
    pub google_analytics_domains: Vec<String>,
    pub google_analytics_campaign: Option<String>,
    pub attachments: Vec<Attachment>,
    pub images: Vec<Attachment>,
    pub subaccount: Option<String>,
    pub important: bool,
}

/// Body of `messages/send.json`.
#[derive(Debug, Serialize)]
pub struct SendRequest<'a> {
    pub key: &'a str,
    pub message: &'a WireMessage,
    #[serde(rename = "async")]
    pub is_async: bool,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_send_at"
    )]
    pub send_at: Option<DateTime<Utc>>,
}

/// Body of `messages/send-template.json`.
#[derive(Debug, Serialize)]
pub struct SendTemplateRequest<'a> {
    pub key: &'a str,
    pub template_name: &'a str,
    pub template_content: &'a [MergeVar],
    pub message: &'a WireMessage,
    #[serde(rename = "async")]
    pub is_async: bool,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_send_at"
    )]
    pub send_at: Option<DateTime<Utc>>,
}

/// The API takes UTC timestamps as `YYYY-MM-DD HH:MM:SS`.
fn serialize_send_at<S>(send_at: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match send_at {
        Some(at) => serializer.serialize_str(&at.format("%Y-%m-%d %H:%M:%S").to_string()),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_merge_language_parse() {
        assert_eq!("mailchimp".parse::<MergeLanguage>(), Ok(MergeLanguage::Mailchimp));
        assert_eq!("handlebars".parse::<MergeLanguage>(), Ok(MergeLanguage::Handlebars));
        assert_eq!(
            "jinja".parse::<MergeLanguage>(),
            Err(ConfigError::InvalidTemplateLanguage("jinja".into()))
        );
    }

    #[test]
    fn test_recipient_serializes_type() {
        let recipient = WireRecipient {
            email: "a@example.com".into(),
            name: None,
            kind: RecipientType::Bcc,
        };
        let value = serde_json::to_value(&recipient).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"email": "a@example.com", "name": null, "type": "bcc"})
        );
    }

    #[test]
    fn test_send_at_format() {
        let message = crate::Message::default().to_wire();
        let request = SendRequest {
            key: "k",
            message: &message,
            is_async: true,
            send_at: Some(Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap()),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["send_at"], "2026-03-04 05:06:07");
        assert_eq!(value["async"], true);
    }

    #[test]
    fn test_send_at_omitted_when_unset() {
        let message = crate::Message::default().to_wire();
        let request = SendTemplateRequest {
            key: "k",
            template_name: "welcome",
            template_content: &[],
            message: &message,
            is_async: false,
            send_at: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("send_at").is_none());
        assert_eq!(value["template_name"], "welcome");
    }
}

//! Mailer configuration.
//!
//! Build a [`MailerConfig`] in code, deserialize it from the host
//! application's own config, or read it from the environment:
//!
//! | Variable | Required | Description |
//! |----------|----------|-------------|
//! | `MANDRILL_APIKEY` | Yes | API key |
//! | `MANDRILL_USE_TEMPLATES` | No | Send through remote templates (default: false) |
//! | `MANDRILL_USE_TEMPLATE_DEFAULTS` | No | Let templates supply an unset sender (default: true) |
//! | `MANDRILL_TEMPLATE_LANGUAGE` | No | `mailchimp` (default) or `handlebars` |
//! | `MANDRILL_APP_NAME` | No | Default from name |
//! | `MANDRILL_ADMIN_EMAIL` | No | Default from address |
//! | `MANDRILL_BASE_URL` | No | API root (default: `https://mandrillapp.com/api/1.0`) |
//! | `MANDRILL_TIMEOUT` | No | Request timeout in seconds (default: 30) |

use serde::Deserialize;

use crate::error::ConfigError;
use crate::message::SenderDefaults;
use crate::schema::MergeLanguage;

pub const DEFAULT_BASE_URL: &str = "https://mandrillapp.com/api/1.0";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MailerConfig {
    /// API key. Surrounding whitespace is ignored.
    pub apikey: String,

    /// Send through remote templates instead of raw messages.
    #[serde(default)]
    pub use_mandrill_templates: bool,

    /// In template mode, leave an unset sender for the template to fill in.
    #[serde(default = "default_true")]
    pub use_template_defaults: bool,

    #[serde(default)]
    pub template_language: MergeLanguage,

    /// Sender used when a message does not set one.
    #[serde(default)]
    pub sender: SenderDefaults,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

impl MailerConfig {
    pub fn new(apikey: impl Into<String>) -> Self {
        Self {
            apikey: apikey.into(),
            use_mandrill_templates: false,
            use_template_defaults: true,
            template_language: MergeLanguage::Mailchimp,
            sender: SenderDefaults::default(),
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }

    /// Read the configuration from `MANDRILL_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`, which maps a variable name
    /// to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let apikey = lookup("MANDRILL_APIKEY").ok_or(ConfigError::Missing("MANDRILL_APIKEY"))?;
        let mut config = Self::new(apikey);

        if let Some(value) = lookup("MANDRILL_USE_TEMPLATES") {
            config.use_mandrill_templates = parse_bool("MANDRILL_USE_TEMPLATES", &value)?;
        }
        if let Some(value) = lookup("MANDRILL_USE_TEMPLATE_DEFAULTS") {
            config.use_template_defaults = parse_bool("MANDRILL_USE_TEMPLATE_DEFAULTS", &value)?;
        }
        if let Some(value) = lookup("MANDRILL_TEMPLATE_LANGUAGE") {
            config.template_language = value.trim().parse()?;
        }
        if let Some(name) = lookup("MANDRILL_APP_NAME") {
            config.sender.name = name;
        }
        if let Some(address) = lookup("MANDRILL_ADMIN_EMAIL") {
            config.sender.address = address;
        }
        if let Some(base_url) = lookup("MANDRILL_BASE_URL") {
            config.base_url = base_url;
        }
        if let Some(value) = lookup("MANDRILL_TIMEOUT") {
            config.timeout_secs = value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "MANDRILL_TIMEOUT",
                value,
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Fail fast on an unusable configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.apikey.trim().is_empty() {
            return Err(ConfigError::EmptyApiKey);
        }
        Ok(())
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        }),
    }
}

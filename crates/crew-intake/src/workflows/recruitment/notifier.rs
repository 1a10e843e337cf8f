use async_trait::async_trait;
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use super::domain::Application;
use crate::config::NotifierConfig;

/// Embed color used for every application post (white).
pub const EMBED_COLOR: u32 = 0xFF_FF_FF;

/// Chat message posted to the webhook, in the embed shape chat platforms expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookMessage {
    pub content: String,
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    pub title: String,
    pub color: u32,
    pub fields: Vec<EmbedField>,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl EmbedField {
    fn inline(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            value: value.into(),
            inline: true,
        }
    }
}

impl WebhookMessage {
    /// Mention the applicant and list the submitted fields.
    pub fn for_application(application: &Application, title: &str) -> Self {
        let works_elsewhere = if application.works_elsewhere { "Yes" } else { "No" };

        Self {
            content: format!("<@{}>", application.external_chat_id),
            embeds: vec![Embed {
                title: title.to_string(),
                color: EMBED_COLOR,
                fields: vec![
                    EmbedField::inline("Name", application.name.as_str()),
                    EmbedField::inline("Age", application.age.to_string()),
                    EmbedField::inline("Works elsewhere", works_elsewhere),
                    EmbedField::inline("Chat ID", application.external_chat_id.as_str()),
                    EmbedField::inline("Referred by", application.referred_by.as_str()),
                ],
                timestamp: application
                    .submitted_at
                    .to_rfc3339_opts(SecondsFormat::Millis, true),
            }],
        }
    }
}

/// Outbound delivery capability so the service can be driven without network access.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &WebhookMessage) -> Result<(), NotifierError>;
}

/// Delivery failures. Transport details are logged where they happen and never carried here.
#[derive(Debug, thiserror::Error)]
pub enum NotifierError {
    #[error("webhook URL not configured")]
    NotConfigured,
    #[error("webhook rejected the message with status {status}")]
    Rejected { status: u16 },
    #[error("webhook request failed")]
    Transport,
}

/// Posts messages as JSON to the configured chat webhook.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: Option<String>,
}

impl WebhookNotifier {
    pub fn new(config: &NotifierConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            url: config.webhook_url.clone(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, message: &WebhookMessage) -> Result<(), NotifierError> {
        let url = self.url.as_deref().ok_or(NotifierError::NotConfigured)?;

        let response = self
            .client
            .post(url)
            .json(message)
            .send()
            .await
            .map_err(|err| {
                // The URL embeds the webhook token.
                error!(error = %err.without_url(), "webhook request failed");
                NotifierError::Transport
            })?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            warn!(status = status.as_u16(), "webhook rejected message");
            Err(NotifierError::Rejected {
                status: status.as_u16(),
            })
        }
    }
}

//! # Delivery Module
//!
//! Sinks that record an accepted submission outside the bot: a workflow
//! webhook receiving the record as JSON, or a channel receiving a short
//! summary. Delivery is attempted once; the caller decides what to do with
//! the returned error.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::bot::ui_builder::format_submission_summary;
use crate::config::SinkConfig;
use crate::errors::DeliveryError;
use crate::localization::LocalizationManager;
use crate::slack::SlackClient;
use crate::submission::SubmissionRecord;

#[async_trait]
pub trait SubmissionSink: Send + Sync {
    /// Hand one record to the sink
    async fn deliver(&self, record: &SubmissionRecord) -> Result<(), DeliveryError>;

    /// Short name for logs
    fn name(&self) -> &'static str;
}

/// POSTs the record as JSON to a workflow webhook
pub struct WebhookSink {
    http: reqwest::Client,
    url: String,
}

impl WebhookSink {
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }
}

#[async_trait]
impl SubmissionSink for WebhookSink {
    async fn deliver(&self, record: &SubmissionRecord) -> Result<(), DeliveryError> {
        let response = self.http.post(&self.url).json(record).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        debug!(status = status.as_u16(), "Webhook accepted submission");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "webhook"
    }
}

/// Posts a two-line summary to a channel
pub struct ChannelSink {
    slack: Arc<SlackClient>,
    localization: Arc<LocalizationManager>,
    channel: String,
}

impl ChannelSink {
    pub fn new(
        slack: Arc<SlackClient>,
        localization: Arc<LocalizationManager>,
        channel: impl Into<String>,
    ) -> Self {
        Self {
            slack,
            localization,
            channel: channel.into(),
        }
    }
}

#[async_trait]
impl SubmissionSink for ChannelSink {
    async fn deliver(&self, record: &SubmissionRecord) -> Result<(), DeliveryError> {
        let text = format_submission_summary(record, &self.localization);
        self.slack.chat_post_message(&self.channel, &text).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "channel"
    }
}

/// Stands in when no sink is configured; every delivery fails
pub struct UnconfiguredSink;

#[async_trait]
impl SubmissionSink for UnconfiguredSink {
    async fn deliver(&self, _record: &SubmissionRecord) -> Result<(), DeliveryError> {
        Err(DeliveryError::NotConfigured)
    }

    fn name(&self) -> &'static str {
        "unconfigured"
    }
}

/// Build the sink selected by the configuration
pub fn sink_from_config(
    config: &SinkConfig,
    http: reqwest::Client,
    slack: Arc<SlackClient>,
    localization: Arc<LocalizationManager>,
) -> Arc<dyn SubmissionSink> {
    let sink: Arc<dyn SubmissionSink> = match config {
        SinkConfig::Webhook { url } => Arc::new(WebhookSink::new(http, url.clone())),
        SinkConfig::Channel { channel } => {
            Arc::new(ChannelSink::new(slack, localization, channel.clone()))
        }
        SinkConfig::Unconfigured => Arc::new(UnconfiguredSink),
    };
    info!(sink = sink.name(), "Delivery sink ready");
    sink
}

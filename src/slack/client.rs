//! Minimal Slack Web API client covering the calls the bot makes.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use super::blocks::ModalView;
use crate::errors::SlackError;

/// Error code Slack returns when `views.update` carries an outdated hash
const HASH_CONFLICT: &str = "hash_conflict";

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Slack Web API client bound to one bot token
#[derive(Debug, Clone)]
pub struct SlackClient {
    http: reqwest::Client,
    token: String,
    api_base: String,
}

impl SlackClient {
    pub fn new(http: reqwest::Client, token: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            http,
            token: token.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    async fn call<T: Serialize + ?Sized>(&self, method: &str, body: &T) -> Result<(), SlackError> {
        let url = format!("{}/{}", self.api_base, method);
        let http_error = |source: reqwest::Error| SlackError::Http {
            method: method.to_string(),
            source,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await
            .map_err(http_error)?;
        let api: ApiResponse = response.json().await.map_err(http_error)?;

        if api.ok {
            debug!(method, "Slack API call succeeded");
            Ok(())
        } else {
            Err(SlackError::Api {
                method: method.to_string(),
                error: api.error.unwrap_or_else(|| "unknown_error".to_string()),
            })
        }
    }

    /// Open a modal in response to a trigger
    pub async fn views_open(&self, trigger_id: &str, view: &ModalView) -> Result<(), SlackError> {
        self.call("views.open", &json!({ "trigger_id": trigger_id, "view": view }))
            .await
    }

    /// Replace an open modal
    ///
    /// `hash` must come from the event that triggered the update; an outdated
    /// one yields [`SlackError::StaleView`].
    pub async fn views_update(
        &self,
        view_id: &str,
        hash: &str,
        view: &ModalView,
    ) -> Result<(), SlackError> {
        let body = json!({ "view_id": view_id, "hash": hash, "view": view });
        match self.call("views.update", &body).await {
            Err(SlackError::Api { error, .. }) if error == HASH_CONFLICT => Err(SlackError::StaleView {
                view_id: view_id.to_string(),
            }),
            other => other,
        }
    }

    pub async fn chat_post_message(&self, channel: &str, text: &str) -> Result<(), SlackError> {
        self.call("chat.postMessage", &json!({ "channel": channel, "text": text }))
            .await
    }

    /// Message visible only to `user`
    pub async fn chat_post_ephemeral(
        &self,
        channel: &str,
        user: &str,
        text: &str,
    ) -> Result<(), SlackError> {
        self.call(
            "chat.postEphemeral",
            &json!({ "channel": channel, "user": user, "text": text }),
        )
        .await
    }
}

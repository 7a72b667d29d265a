//! Inbound Slack payloads: slash commands and interactivity events.

use std::collections::HashMap;

use serde::Deserialize;

use super::blocks::{Block, ModalView, OptionObject, Text};
use crate::submission::FieldValues;

/// Form-encoded body of a slash command
#[derive(Debug, Clone, Deserialize)]
pub struct SlashCommand {
    pub command: String,
    pub trigger_id: String,
    pub user_id: String,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub text: String,
}

/// Form-encoded envelope of an interactivity request
#[derive(Debug, Clone, Deserialize)]
pub struct InteractionForm {
    pub payload: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Interaction {
    BlockActions(BlockActions),
    ViewSubmission(ViewSubmission),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlockActions {
    pub user: User,
    #[serde(default)]
    pub view: Option<ViewPayload>,
    #[serde(default)]
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Action {
    pub action_id: String,
    #[serde(default)]
    pub block_id: String,
    #[serde(default)]
    pub selected_option: Option<OptionObject>,
    #[serde(default)]
    pub value: Option<String>,
}

impl Action {
    /// The value the user picked or typed
    pub fn selected_value(&self) -> Option<&str> {
        self.selected_option
            .as_ref()
            .map(|option| option.value.as_str())
            .or(self.value.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViewSubmission {
    pub user: User,
    pub view: ViewPayload,
}

/// A view as Slack reports it back, including its revision hash and state
#[derive(Debug, Clone, Deserialize)]
pub struct ViewPayload {
    pub id: String,
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub callback_id: String,
    pub title: Text,
    #[serde(default)]
    pub submit: Option<Text>,
    #[serde(default)]
    pub close: Option<Text>,
    #[serde(default)]
    pub private_metadata: String,
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub state: ViewState,
}

impl ViewPayload {
    /// Replacement modal that keeps this view's envelope and swaps the blocks
    pub fn with_blocks(&self, blocks: Vec<Block>) -> ModalView {
        ModalView {
            kind: "modal".to_string(),
            callback_id: self.callback_id.clone(),
            title: self.title.clone(),
            submit: self.submit.clone(),
            close: self.close.clone(),
            private_metadata: self.private_metadata.clone(),
            blocks,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewState {
    /// block id → action id → value
    #[serde(default)]
    pub values: HashMap<String, HashMap<String, StateValue>>,
}

impl ViewState {
    /// Flatten the state to one value per block
    pub fn field_values(&self) -> FieldValues {
        self.values
            .iter()
            .filter_map(|(block_id, actions)| {
                actions
                    .values()
                    .find_map(StateValue::resolved)
                    .map(|value| (block_id.clone(), value.to_string()))
            })
            .collect()
    }
}

/// Current value of one element, whichever shape its type uses
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StateValue {
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub selected_option: Option<OptionObject>,
    #[serde(default)]
    pub selected_date: Option<String>,
    #[serde(default)]
    pub selected_user: Option<String>,
}

impl StateValue {
    pub fn resolved(&self) -> Option<&str> {
        self.value
            .as_deref()
            .or(self.selected_option.as_ref().map(|o| o.value.as_str()))
            .or(self.selected_date.as_deref())
            .or(self.selected_user.as_deref())
    }
}

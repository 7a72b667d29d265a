//! Block Kit wire types and their conversion to and from [`FormView`].
//!
//! Only the subset the intake modal uses is modelled: input blocks holding a
//! text, email, URL, date, static select or user select element. Anything else
//! Slack echoes back deserializes as [`Block::Unsupported`] and is skipped.

use serde::{Deserialize, Serialize};

use crate::view::{Field, FieldKind, FormView, SelectOption, NO_SELECTION};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextType {
    #[default]
    PlainText,
    Mrkdwn,
}

/// Text object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Text {
    #[serde(rename = "type", default)]
    pub kind: TextType,
    pub text: String,
}

impl Text {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            kind: TextType::PlainText,
            text: text.into(),
        }
    }
}

/// Option object of a static select
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionObject {
    pub text: Text,
    pub value: String,
}

impl From<&SelectOption> for OptionObject {
    fn from(option: &SelectOption) -> Self {
        Self {
            text: Text::plain(&option.label),
            value: option.value.clone(),
        }
    }
}

impl From<&OptionObject> for SelectOption {
    fn from(option: &OptionObject) -> Self {
        Self {
            label: option.text.text.clone(),
            value: option.value.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Input(InputBlock),
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputBlock {
    pub block_id: String,
    pub label: Text,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub dispatch_action: bool,
    pub element: Element,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Element {
    PlainTextInput {
        action_id: String,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        multiline: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        initial_value: Option<String>,
    },
    EmailTextInput {
        action_id: String,
    },
    UrlTextInput {
        action_id: String,
    },
    Datepicker {
        action_id: String,
    },
    StaticSelect {
        action_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placeholder: Option<Text>,
        #[serde(default)]
        options: Vec<OptionObject>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        initial_option: Option<OptionObject>,
    },
    UsersSelect {
        action_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placeholder: Option<Text>,
    },
}

/// Modal definition sent with `views.open` and `views.update`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModalView {
    #[serde(rename = "type")]
    pub kind: String,
    pub callback_id: String,
    pub title: Text,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit: Option<Text>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close: Option<Text>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub private_metadata: String,
    pub blocks: Vec<Block>,
}

/// Render a view as Block Kit blocks
pub fn render(view: &FormView) -> Vec<Block> {
    view.fields().iter().map(render_field).collect()
}

fn render_field(field: &Field) -> Block {
    let action_id = field.block_id.clone();
    let element = match &field.kind {
        FieldKind::Text {
            multiline,
            initial_value,
        } => Element::PlainTextInput {
            action_id,
            multiline: *multiline,
            initial_value: initial_value.clone(),
        },
        FieldKind::Email => Element::EmailTextInput { action_id },
        FieldKind::Url => Element::UrlTextInput { action_id },
        FieldKind::Date => Element::Datepicker { action_id },
        FieldKind::Select {
            placeholder,
            options,
            initial_value,
        } => {
            let mut rendered: Vec<OptionObject> = options.iter().map(OptionObject::from).collect();
            if rendered.is_empty() {
                rendered.push(OptionObject::from(&SelectOption::plain(NO_SELECTION)));
            }
            let initial_option = initial_value
                .as_deref()
                .and_then(|value| rendered.iter().find(|o| o.value == value).cloned());
            Element::StaticSelect {
                action_id,
                placeholder: Some(Text::plain(placeholder)),
                options: rendered,
                initial_option,
            }
        }
        FieldKind::User => Element::UsersSelect {
            action_id,
            placeholder: None,
        },
    };

    Block::Input(InputBlock {
        block_id: field.block_id.clone(),
        label: Text::plain(&field.label),
        optional: field.optional,
        dispatch_action: field.dispatch_action,
        element,
    })
}

/// Rebuild a view from the blocks Slack sends back with an event
pub fn parse(blocks: &[Block]) -> FormView {
    FormView::new(
        blocks
            .iter()
            .filter_map(|block| match block {
                Block::Input(input) => Some(parse_input(input)),
                Block::Unsupported => None,
            })
            .collect(),
    )
}

fn parse_input(input: &InputBlock) -> Field {
    let kind = match &input.element {
        Element::PlainTextInput {
            multiline,
            initial_value,
            ..
        } => FieldKind::Text {
            multiline: *multiline,
            initial_value: initial_value.clone(),
        },
        Element::EmailTextInput { .. } => FieldKind::Email,
        Element::UrlTextInput { .. } => FieldKind::Url,
        Element::Datepicker { .. } => FieldKind::Date,
        Element::StaticSelect {
            placeholder,
            options,
            initial_option,
            ..
        } => {
            let mut parsed: Vec<SelectOption> = options.iter().map(SelectOption::from).collect();
            // A lone placeholder option means the select has nothing to offer
            if parsed.len() == 1 && parsed[0].value == NO_SELECTION {
                parsed.clear();
            }
            FieldKind::Select {
                placeholder: placeholder.as_ref().map(|p| p.text.clone()).unwrap_or_default(),
                options: parsed,
                initial_value: initial_option.as_ref().map(|o| o.value.clone()),
            }
        }
        Element::UsersSelect { .. } => FieldKind::User,
    };

    Field {
        block_id: input.block_id.clone(),
        label: input.label.text.clone(),
        optional: input.optional,
        dispatch_action: input.dispatch_action,
        kind,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_select_renders_placeholder_option() {
        let view = FormView::new(vec![Field::new(
            "description",
            "Description",
            FieldKind::Select {
                placeholder: "Choose description".into(),
                options: vec![],
                initial_value: None,
            },
        )
        .dispatching()]);

        let json = serde_json::to_value(render(&view)).unwrap();
        assert_eq!(
            json,
            json!([{
                "type": "input",
                "block_id": "description",
                "label": {"type": "plain_text", "text": "Description"},
                "dispatch_action": true,
                "element": {
                    "type": "static_select",
                    "action_id": "description",
                    "placeholder": {"type": "plain_text", "text": "Choose description"},
                    "options": [{"text": {"type": "plain_text", "text": "—"}, "value": "—"}]
                }
            }])
        );

        // And the placeholder disappears again on the way back
        assert_eq!(parse(&render(&view)), view);
    }

    #[test]
    fn test_text_input_rendering() {
        let view = FormView::new(vec![Field::new(
            "jobNumber",
            "Job #",
            FieldKind::Text {
                multiline: false,
                initial_value: Some("#7".into()),
            },
        )]);

        let json = serde_json::to_value(render(&view)).unwrap();
        assert_eq!(json[0]["element"]["type"], "plain_text_input");
        assert_eq!(json[0]["element"]["initial_value"], "#7");
        assert!(json[0].get("optional").is_none());
        assert!(json[0]["element"].get("multiline").is_none());
    }

    #[test]
    fn test_parse_tolerates_slack_extras() {
        let blocks: Vec<Block> = serde_json::from_value(json!([
            {
                "type": "input",
                "block_id": "client",
                "label": {"type": "plain_text", "text": "Client", "emoji": true},
                "optional": false,
                "dispatch_action": false,
                "element": {"type": "plain_text_input", "action_id": "client", "dispatch_action_config": {}}
            },
            {"type": "divider", "block_id": "xyz"},
            {
                "type": "input",
                "block_id": "date",
                "label": {"type": "plain_text", "text": "Date"},
                "optional": true,
                "element": {"type": "datepicker", "action_id": "date"}
            }
        ]))
        .unwrap();

        assert_eq!(blocks[1], Block::Unsupported);
        let view = parse(&blocks);
        assert_eq!(view.block_ids().collect::<Vec<_>>(), vec!["client", "date"]);
        assert!(view.field("date").unwrap().optional);
        assert_eq!(view.field("date").unwrap().kind, FieldKind::Date);
    }

    #[test]
    fn test_initial_option_resolved_from_options() {
        let view = FormView::new(vec![Field::new(
            "status",
            "Status",
            FieldKind::Select {
                placeholder: "Choose status".into(),
                options: vec![SelectOption::plain("OPEN"), SelectOption::plain("CLOSED")],
                initial_value: Some("CLOSED".into()),
            },
        )]);

        let json = serde_json::to_value(render(&view)).unwrap();
        assert_eq!(json[0]["element"]["initial_option"]["value"], "CLOSED");
    }
}

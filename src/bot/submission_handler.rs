//! Submission Handler module for the intake modal's final submit

use std::collections::BTreeMap;

use tracing::{debug, error, info, warn};

use crate::errors::DeliveryError;
use crate::selection::description_block;
use crate::server::AppState;
use crate::slack::blocks::parse;
use crate::slack::payload::ViewSubmission;
use crate::submission::{handle_catalog_submit, FieldError, SubmissionRecord};
use crate::view::block_ids;

use super::ui_builder::{format_confirmation, format_delivery_failure};

/// Result of reviewing a view submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Keep the modal open and show these messages, keyed by block id
    Rejected(BTreeMap<String, String>),
    /// The modal closes; the record still has to be delivered
    Accepted(SubmissionRecord),
}

/// Validate a submission and build its record
///
/// Runs before the submission is acknowledged, so it must not perform any
/// side effect. Errors are keyed by the block ids of the submitted view, so a
/// Description error points at the current revision of that block.
pub fn review_submission(state: &AppState, submission: &ViewSubmission) -> SubmissionOutcome {
    let values = submission.view.state.field_values();

    match handle_catalog_submit(&state.catalog, &values) {
        Ok(record) => {
            debug!(user_id = %submission.user.id, job_number = %record.job_number, "Submission accepted");
            SubmissionOutcome::Accepted(record)
        }
        Err(errors) => {
            info!(user_id = %submission.user.id, %errors, "Submission rejected");
            let messages = errors.render(|error| {
                let key = match error {
                    FieldError::Required => "validation-required",
                    FieldError::UnknownItem => "validation-unknown-item",
                    FieldError::DescriptionMismatch => "validation-description-mismatch",
                };
                state.localization.get_message(key, None)
            });

            let view = parse(&submission.view.blocks);
            let description_id = description_block(&view)
                .map(|field| field.block_id.clone())
                .unwrap_or_else(|| block_ids::DESCRIPTION.to_string());
            let messages = messages
                .into_iter()
                .map(|(field, message)| {
                    if field == block_ids::DESCRIPTION {
                        (description_id.clone(), message)
                    } else {
                        (field, message)
                    }
                })
                .collect();
            SubmissionOutcome::Rejected(messages)
        }
    }
}

/// Deliver an accepted record and tell the user how it went
///
/// The notice goes to `channel_id` when known, otherwise to the user's direct
/// messages. Failing to post the notice is only logged.
pub async fn deliver_submission(
    state: &AppState,
    record: &SubmissionRecord,
    user_id: &str,
    channel_id: Option<&str>,
) -> Result<(), DeliveryError> {
    let result = state.sink.deliver(record).await;

    let notice = match &result {
        Ok(()) => {
            info!(
                user_id = %user_id,
                job_number = %record.job_number,
                sink = state.sink.name(),
                "Submission delivered"
            );
            format_confirmation(record, &state.list_name, &state.localization)
        }
        Err(e) => {
            error!(
                user_id = %user_id,
                job_number = %record.job_number,
                sink = state.sink.name(),
                error = %e,
                "Failed to deliver submission"
            );
            format_delivery_failure(record, &state.list_name, &e.to_string(), &state.localization)
        }
    };

    let channel = channel_id.filter(|c| !c.is_empty()).unwrap_or(user_id);
    if let Err(e) = state
        .slack
        .chat_post_ephemeral(channel, user_id, &notice)
        .await
    {
        warn!(user_id = %user_id, error = %e, "Failed to post submission notice");
    }

    result
}

//! # Submission Tests
//!
//! Validation, Custom resolution and delivery of accepted submissions.

mod helpers;

use std::sync::Arc;

use axum::http::StatusCode;

use helpers::{app_state, RecordingSink, SlackStub, WebhookStub};
use project_intake::bot::{deliver_submission, review_submission, SubmissionOutcome};
use project_intake::catalog::CUSTOM_SENTINEL;
use project_intake::delivery::{SubmissionSink, UnconfiguredSink, WebhookSink};
use project_intake::errors::DeliveryError;
use project_intake::slack::payload::Interaction;
use project_intake::submission::{handle_submit, FieldValues, SubmissionRecord};

fn complete_values(description: &str) -> FieldValues {
    [
        ("jobNumber", "#42"),
        ("client", "Acme Co"),
        ("clientEmail", "orders@acme.test"),
        ("quantity", "250"),
        ("item", "Stickers"),
        ("description", description),
    ]
    .into_iter()
    .collect()
}

fn sample_record() -> SubmissionRecord {
    handle_submit(&complete_values("Die Cut")).unwrap()
}

/// Test Custom resolves to the typed text
#[test]
fn test_custom_description_uses_typed_text() {
    let mut values = complete_values(CUSTOM_SENTINEL);
    values.insert("customDescription", "  Foo  ");

    let record = handle_submit(&values).unwrap();
    assert_eq!(record.description, "Foo");
}

/// Test Custom without typed text keeps the sentinel
#[test]
fn test_custom_description_without_text() {
    let mut values = complete_values(CUSTOM_SENTINEL);
    values.insert("customDescription", "   ");

    let record = handle_submit(&values).unwrap();
    assert_eq!(record.description, CUSTOM_SENTINEL);
}

/// Test the Stickers example produces the expected record
#[test]
fn test_stickers_record() {
    let record = sample_record();
    assert_eq!(record.job_number, "#42");
    assert_eq!(record.item, "Stickers");
    assert_eq!(record.description, "Die Cut");
    assert_eq!(record.notes, "");
}

/// Test review maps validation failures to localized, field-keyed messages
#[tokio::test]
async fn test_review_rejects_missing_fields() -> anyhow::Result<()> {
    let slack = SlackStub::start().await?;
    let (state, _dir) = app_state(&slack, Arc::new(RecordingSink::default()))?;

    let view = helpers::open_view_payload(1)?;
    let payload = helpers::submission(&view, &[("client", "Acme Co")], &[]);
    let Interaction::ViewSubmission(submission) = serde_json::from_value::<Interaction>(payload)? else {
        panic!("expected a view submission");
    };

    match review_submission(&state, &submission) {
        SubmissionOutcome::Rejected(errors) => {
            assert!(!errors.contains_key("client"));
            for field in ["clientEmail", "quantity", "item", "description"] {
                assert_eq!(errors.get(field).map(String::as_str), Some("Required"));
            }
        }
        SubmissionOutcome::Accepted(record) => panic!("unexpected record: {record:?}"),
    }
    Ok(())
}

/// Test one accepted submission results in exactly one delivery
#[tokio::test]
async fn test_deliver_once_and_confirm() -> anyhow::Result<()> {
    let slack = SlackStub::start().await?;
    let sink = Arc::new(RecordingSink::default());
    let (state, _dir) = app_state(&slack, sink.clone())?;

    deliver_submission(&state, &sample_record(), "U1", None).await?;

    assert_eq!(sink.records(), vec![sample_record()]);
    let notices = slack.calls("chat.postEphemeral");
    assert_eq!(notices.len(), 1);
    // Without a channel the notice goes to the user directly
    assert_eq!(notices[0].body["channel"], "U1");
    Ok(())
}

/// Test a failing notice does not turn a delivery into a failure
#[tokio::test]
async fn test_notice_failure_is_not_fatal() -> anyhow::Result<()> {
    let slack = SlackStub::failing(&[("chat.postEphemeral", "channel_not_found")]).await?;
    let sink = Arc::new(RecordingSink::default());
    let (state, _dir) = app_state(&slack, sink.clone())?;

    deliver_submission(&state, &sample_record(), "U1", Some("C1")).await?;
    assert_eq!(sink.records().len(), 1);
    Ok(())
}

/// Test the webhook receives the record as JSON
#[tokio::test]
async fn test_webhook_sink_posts_record() -> anyhow::Result<()> {
    let webhook = WebhookStub::start(StatusCode::OK).await?;
    let sink = WebhookSink::new(reqwest::Client::new(), webhook.url.clone());

    sink.deliver(&sample_record()).await?;

    let received = webhook.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0]["client_email"], "orders@acme.test");
    assert_eq!(received[0]["quantity"], "250");
    Ok(())
}

/// Test a non-success webhook status surfaces as a delivery error
#[tokio::test]
async fn test_webhook_sink_non_success_status() -> anyhow::Result<()> {
    let webhook = WebhookStub::start(StatusCode::BAD_GATEWAY).await?;
    let sink = WebhookSink::new(reqwest::Client::new(), webhook.url.clone());

    match sink.deliver(&sample_record()).await {
        Err(DeliveryError::Status { status, body }) => {
            assert_eq!(status, 502);
            assert_eq!(body, "rejected");
        }
        other => panic!("unexpected result: {other:?}"),
    }
    Ok(())
}

/// Test the channel sink posts a summary to the configured channel
#[tokio::test]
async fn test_channel_sink_posts_summary() -> anyhow::Result<()> {
    let slack = SlackStub::start().await?;
    let (state, _dir) = app_state(&slack, Arc::new(UnconfiguredSink))?;
    let sink = project_intake::delivery::ChannelSink::new(
        Arc::clone(&state.slack),
        Arc::clone(&state.localization),
        "C0PROJECTS",
    );

    sink.deliver(&sample_record()).await?;

    let posts = slack.calls("chat.postMessage");
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].body["channel"], "C0PROJECTS");
    let text = posts[0].body["text"].as_str().unwrap_or_default();
    assert!(text.contains("#42"));
    assert!(text.contains("Acme Co"));
    assert!(text.contains("250 × Stickers: Die Cut"));
    Ok(())
}

/// Test delivery without a sink fails and the user is told
#[tokio::test]
async fn test_unconfigured_sink() -> anyhow::Result<()> {
    let slack = SlackStub::start().await?;
    let (state, _dir) = app_state(&slack, Arc::new(UnconfiguredSink))?;

    let result = deliver_submission(&state, &sample_record(), "U1", Some("C1")).await;
    assert!(matches!(result, Err(DeliveryError::NotConfigured)));
    assert_eq!(slack.calls("chat.postEphemeral").len(), 1);
    Ok(())
}

//! # Server Module
//!
//! HTTP receiver for Slack. Slash commands and interactivity requests are
//! signature-checked, acknowledged quickly and handed to the bot handlers.
//! Work that talks back to Slack after the acknowledgement runs on spawned
//! tasks.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde_json::json;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::bot::{
    callback_handler, command_handler, deliver_submission, review_submission, SubmissionOutcome,
    INTAKE_CALLBACK_ID,
};
use crate::catalog::Catalog;
use crate::counter::JobCounter;
use crate::delivery::SubmissionSink;
use crate::errors::SlackError;
use crate::localization::LocalizationManager;
use crate::slack::payload::{InteractionForm, ViewSubmission};
use crate::slack::{Interaction, SignatureVerifier, SlackClient, SlashCommand};

/// Slack bodies are small; anything larger is not a Slack request
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Shared state handed to every request
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub counter: Arc<JobCounter>,
    pub slack: Arc<SlackClient>,
    pub sink: Arc<dyn SubmissionSink>,
    pub localization: Arc<LocalizationManager>,
    pub verifier: Arc<SignatureVerifier>,
    pub list_name: String,
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let slack_routes = Router::new()
        .route("/slack/commands", post(slash_command))
        .route("/slack/interactions", post(interaction))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            verify_slack_signature,
        ));

    Router::new()
        .route("/health", get(health))
        .merge(slack_routes)
        .with_state(state)
}

/// Bind the listener and serve until Ctrl+C
pub async fn serve(state: AppState, port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(%addr, "Listening for Slack requests");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
}

async fn health() -> &'static str {
    "ok"
}

/// Reject requests whose Slack signature does not match the raw body
async fn verify_slack_signature(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, "Failed to read request body");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    if let Err(e) = state.verifier.verify_headers(&parts.headers, &bytes) {
        warn!(path = %parts.uri.path(), error = %e, "Rejected unsigned request");
        return StatusCode::UNAUTHORIZED.into_response();
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

async fn slash_command(
    State(state): State<AppState>,
    Form(command): Form<SlashCommand>,
) -> StatusCode {
    tokio::spawn(async move {
        if let Err(e) = command_handler(&state, &command).await {
            error!(user_id = %command.user_id, error = %e, "Failed to open intake modal");
        }
    });

    StatusCode::OK
}

async fn interaction(
    State(state): State<AppState>,
    Form(form): Form<InteractionForm>,
) -> Response {
    let interaction: Interaction = match serde_json::from_str(&form.payload) {
        Ok(interaction) => interaction,
        Err(e) => {
            warn!(error = %e, "Malformed interaction payload");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    match interaction {
        Interaction::BlockActions(actions) => {
            match callback_handler(&state, &actions).await {
                Ok(()) => {}
                Err(e @ SlackError::StaleView { .. }) => {
                    warn!(user_id = %actions.user.id, error = %e, "Skipped update of a stale view");
                }
                Err(e) => {
                    error!(user_id = %actions.user.id, error = %e, "Failed to update intake modal");
                }
            }
            StatusCode::OK.into_response()
        }
        Interaction::ViewSubmission(submission) => view_submission(state, submission),
        Interaction::Other => {
            debug!("Ignoring unsupported interaction type");
            StatusCode::OK.into_response()
        }
    }
}

fn view_submission(state: AppState, submission: ViewSubmission) -> Response {
    if submission.view.callback_id != INTAKE_CALLBACK_ID {
        debug!(callback_id = %submission.view.callback_id, "Ignoring submission of another view");
        return StatusCode::OK.into_response();
    }

    match review_submission(&state, &submission) {
        SubmissionOutcome::Rejected(errors) => Json(json!({
            "response_action": "errors",
            "errors": errors,
        }))
        .into_response(),
        SubmissionOutcome::Accepted(record) => {
            tokio::spawn(async move {
                let channel_id = Some(submission.view.private_metadata.as_str());
                // Logged at error level and reported to the user inside
                if let Err(e) =
                    deliver_submission(&state, &record, &submission.user.id, channel_id).await
                {
                    debug!(job_number = %record.job_number, error = %e, "Delivery finished with an error");
                }
            });
            StatusCode::OK.into_response()
        }
    }
}

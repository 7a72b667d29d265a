//! # Error Types Module
//!
//! This module defines the error types shared by the Slack client, the
//! delivery sinks, the request verifier and the catalog loader.

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by Slack Web API calls
#[derive(Debug, Error)]
pub enum SlackError {
    /// The view hash sent with `views.update` no longer matches the view
    #[error("stale view version for view {view_id}")]
    StaleView { view_id: String },
    /// Slack answered with `ok: false`
    #[error("{method} failed: {error}")]
    Api { method: String, error: String },
    /// Transport or response decoding failure
    #[error("{method} request failed: {source}")]
    Http {
        method: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Errors raised while handing a submission to its sink
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Neither a webhook URL nor a target channel is configured
    #[error("no delivery sink configured")]
    NotConfigured,
    /// The webhook answered outside the 2xx range
    #[error("webhook POST failed: {status} {body}")]
    Status { status: u16, body: String },
    /// The webhook could not be reached
    #[error("webhook request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Posting the summary to the channel failed
    #[error("channel post failed: {0}")]
    Slack(#[from] SlackError),
}

/// Errors raised while reading a catalog source
///
/// None of these are fatal: the loader logs them and moves on to the next
/// source, ending with the built-in catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed JSON catalog {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("malformed CSV catalog {}: {source}", .path.display())]
    Csv { path: PathBuf, source: csv::Error },
    #[error("unreadable spreadsheet {}: {message}", .path.display())]
    Spreadsheet { path: PathBuf, message: String },
    #[error("catalog source {} has no usable rows", .path.display())]
    Empty { path: PathBuf },
}

/// Reasons an inbound Slack request fails verification
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("missing {0} header")]
    MissingHeader(&'static str),
    #[error("request timestamp is not a number")]
    InvalidTimestamp,
    #[error("request timestamp is outside the accepted window")]
    StaleTimestamp,
    #[error("signature does not match")]
    Mismatch,
}

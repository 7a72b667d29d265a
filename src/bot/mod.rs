//! Bot module for handling Slack interactions
//!
//! This module is split into several submodules:
//! - `command_handler`: Opens the intake modal for the slash command
//! - `callback_handler`: Drives the dependent Item → Description fields
//! - `submission_handler`: Validates submissions and delivers the record
//! - `ui_builder`: Builds the modal and formats user-facing messages

pub mod callback_handler;
pub mod command_handler;
pub mod submission_handler;
pub mod ui_builder;

// Re-export main handler functions for use by the server
pub use callback_handler::callback_handler;
pub use command_handler::command_handler;
pub use submission_handler::{deliver_submission, review_submission, SubmissionOutcome};

// Re-export builders that are used elsewhere
pub use ui_builder::{build_initial_view, build_modal, format_submission_summary, INTAKE_CALLBACK_ID};

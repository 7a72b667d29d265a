//! Slack plumbing
//!
//! - `blocks`: Block Kit wire types and conversion to and from form views
//! - `payload`: inbound slash command and interactivity payloads
//! - `client`: outbound Web API calls
//! - `signature`: inbound request verification

pub mod blocks;
pub mod client;
pub mod payload;
pub mod signature;

pub use blocks::{Block, ModalView};
pub use client::SlackClient;
pub use payload::{Interaction, SlashCommand, ViewPayload};
pub use signature::SignatureVerifier;

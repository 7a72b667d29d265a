//! # Project Intake Bot
//!
//! A Slack bot that opens a project intake modal from a slash command. The
//! Item and Description selects are driven by a catalog loaded at startup,
//! every modal gets a job number from a persistent counter, and accepted
//! submissions are delivered to a workflow webhook or posted to a channel.

pub mod bot;
pub mod catalog;
pub mod config;
pub mod counter;
pub mod delivery;
pub mod errors;
pub mod localization;
pub mod selection;
pub mod server;
pub mod slack;
pub mod submission;
pub mod view;

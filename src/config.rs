//! # Configuration Module
//!
//! This module defines the runtime configuration of the bot: Slack
//! credentials, catalog source paths, the counter file and the delivery sink.
//! Everything is read from the environment once at startup.

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use log::warn;

// Defaults used when a variable is absent
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SLACK_API_BASE: &str = "https://slack.com/api";
pub const DEFAULT_ITEMS_JSON_PATH: &str = "items.json";
pub const DEFAULT_XLSX_PATH: &str = "items.xlsx";
pub const DEFAULT_ITEMS_CSV_PATH: &str = "items.csv";
pub const DEFAULT_JOB_COUNTER_FILE: &str = "job_counter.json";
pub const DEFAULT_LIST_NAME: &str = "Projects";

/// Catalog source files, in priority order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSources {
    /// Structured JSON file (`{"Item": ["Desc", ...]}`)
    pub json_path: PathBuf,
    /// Spreadsheet, first sheet is read
    pub xlsx_path: PathBuf,
    /// Delimited file with a header row
    pub csv_path: PathBuf,
}

impl Default for CatalogSources {
    fn default() -> Self {
        Self {
            json_path: PathBuf::from(DEFAULT_ITEMS_JSON_PATH),
            xlsx_path: PathBuf::from(DEFAULT_XLSX_PATH),
            csv_path: PathBuf::from(DEFAULT_ITEMS_CSV_PATH),
        }
    }
}

/// Where accepted submissions are sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkConfig {
    /// POST the record as JSON to a workflow webhook
    Webhook { url: String },
    /// Post a summary message to a channel
    Channel { channel: String },
    /// Nothing configured; delivery fails when attempted
    Unconfigured,
}

/// Slack credentials and API location
#[derive(Debug, Clone)]
pub struct SlackConfig {
    pub bot_token: String,
    pub signing_secret: String,
    /// Overridable so tests can point the client at a local stub
    pub api_base: String,
}

/// Configuration structure for the whole bot
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub slack: SlackConfig,
    pub catalog: CatalogSources,
    pub counter_file: PathBuf,
    pub sink: SinkConfig,
    /// Name of the list or board shown in confirmations
    pub list_name: String,
}

impl Config {
    /// Read the configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read the configuration through an arbitrary lookup function
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let bot_token = get("SLACK_BOT_TOKEN").context("SLACK_BOT_TOKEN must be set")?;
        let signing_secret =
            get("SLACK_SIGNING_SECRET").context("SLACK_SIGNING_SECRET must be set")?;

        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("PORT is not a valid port number: {raw}"))?,
            None => DEFAULT_PORT,
        };

        let defaults = CatalogSources::default();
        let catalog = CatalogSources {
            json_path: get("ITEMS_JSON_PATH").map(PathBuf::from).unwrap_or(defaults.json_path),
            xlsx_path: get("XLSX_PATH").map(PathBuf::from).unwrap_or(defaults.xlsx_path),
            csv_path: get("ITEMS_CSV_PATH").map(PathBuf::from).unwrap_or(defaults.csv_path),
        };

        let sink = resolve_sink(
            get("DELIVERY_SINK"),
            get("WORKFLOW_WEBHOOK_URL"),
            get("SLACK_TARGET_CHANNEL"),
        )?;

        Ok(Self {
            port,
            slack: SlackConfig {
                bot_token,
                signing_secret,
                api_base: get("SLACK_API_BASE").unwrap_or_else(|| DEFAULT_SLACK_API_BASE.to_string()),
            },
            catalog,
            counter_file: get("JOB_COUNTER_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_JOB_COUNTER_FILE)),
            sink,
            list_name: get("LIST_NAME").unwrap_or_else(|| DEFAULT_LIST_NAME.to_string()),
        })
    }
}

/// Pick the delivery sink
///
/// An explicit `DELIVERY_SINK` wins. Without one, a webhook URL is preferred
/// over a channel. A selected sink whose target is missing degrades to
/// [`SinkConfig::Unconfigured`] so the bot still starts.
pub fn resolve_sink(
    explicit: Option<String>,
    webhook_url: Option<String>,
    channel: Option<String>,
) -> Result<SinkConfig> {
    let sink = match explicit.as_deref().map(|s| s.trim().to_ascii_lowercase()) {
        Some(kind) if kind == "webhook" => match webhook_url {
            Some(url) => SinkConfig::Webhook { url },
            None => {
                warn!("DELIVERY_SINK=webhook but WORKFLOW_WEBHOOK_URL is missing");
                SinkConfig::Unconfigured
            }
        },
        Some(kind) if kind == "channel" => match channel {
            Some(channel) => SinkConfig::Channel { channel },
            None => {
                warn!("DELIVERY_SINK=channel but SLACK_TARGET_CHANNEL is missing");
                SinkConfig::Unconfigured
            }
        },
        Some(other) => bail!("DELIVERY_SINK must be 'webhook' or 'channel', got '{other}'"),
        None => match (webhook_url, channel) {
            (Some(url), _) => SinkConfig::Webhook { url },
            (None, Some(channel)) => SinkConfig::Channel { channel },
            (None, None) => SinkConfig::Unconfigured,
        },
    };
    Ok(sink)
}

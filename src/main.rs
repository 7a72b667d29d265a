use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use project_intake::catalog;
use project_intake::config::Config;
use project_intake::counter::JobCounter;
use project_intake::delivery::sink_from_config;
use project_intake::localization::LocalizationManager;
use project_intake::server::{self, AppState};
use project_intake::slack::{SignatureVerifier, SlackClient};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    init_tracing();

    info!("Starting project intake bot");

    let config = Config::from_env()?;

    let catalog = catalog::load(&config.catalog);
    info!(items = catalog.len(), "Catalog ready");

    let counter = JobCounter::new(&config.counter_file);
    info!(path = %counter.path().display(), next = counter.current() + 1, "Job counter ready");

    let localization = Arc::new(LocalizationManager::new()?);
    let http = reqwest::Client::new();
    let slack = Arc::new(SlackClient::new(
        http.clone(),
        config.slack.bot_token.clone(),
        config.slack.api_base.clone(),
    ));
    let sink = sink_from_config(&config.sink, http, Arc::clone(&slack), Arc::clone(&localization));

    let state = AppState {
        catalog: Arc::new(catalog),
        counter: Arc::new(counter),
        slack,
        sink,
        localization,
        verifier: Arc::new(SignatureVerifier::new(config.slack.signing_secret.clone())),
        list_name: config.list_name.clone(),
    };

    server::serve(state, config.port).await
}

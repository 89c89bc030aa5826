//! SmartLPD - license plate detection and traffic fine client
//!
//! Terminal front end over the detection, fine check and fine
//! management controllers.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use smartlpd_core::{Config, FileStore};
use smartlpd_net::ApiClient;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod busy;
mod camera;
mod cli;
mod platform;
mod state;
mod terminal;
mod ui;
mod viewmodel;

#[cfg(test)]
mod testing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so command output stays clean
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = cli::Cli::parse();
    tracing::debug!("Starting SmartLPD v{}", env!("CARGO_PKG_VERSION"));
    platform::log_platform_info();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load_default(),
    }
    .context("Failed to load configuration")?;
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }
    tracing::debug!(base_url = %config.base_url, mock_login = config.mock_login, "Configuration loaded");

    let store = FileStore::open_default().context("Failed to open session store")?;
    tracing::debug!(path = %store.path().display(), "Session store opened");

    let backend = ApiClient::new(&config.base_url, config.request_timeout())
        .context("Failed to create HTTP client")?;
    let ui = Arc::new(terminal::TerminalUi::new(
        cli.yes,
        config.resolved_download_dir(),
    ));

    let app_state = Arc::new(state::AppState::new(
        config,
        Arc::new(store),
        Arc::new(backend),
        ui.clone(),
        Arc::new(camera::NoCamera),
    ));
    let controllers = viewmodel::Controllers::new(app_state);

    cli::run(cli.command, &controllers, &ui).await?;
    Ok(())
}

mod cli;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use onstream::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = Config::locate(cli.config.as_deref(), Path::new("."));
    let config = Config::load(&config_path)?;
    init_tracing(config.debug);
    if config_path.exists() {
        tracing::debug!("loaded config from {}", config_path.display());
    } else {
        tracing::warn!("config file {} not found, using defaults", config_path.display());
    }

    let source = MalSource::new(&config.base_url, Duration::from_millis(config.request_timeout_ms))
        .context("building HTTP client")?;
    let mut aggregator = Aggregator::new(&config, Arc::new(source));
    if config.cache_ttl_secs > 0 {
        aggregator = aggregator.with_storage(Arc::new(MemoryStorage::new()));
    }

    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => {
            let port = port.unwrap_or(config.port);
            match aggregator.username() {
                Some(u) => tracing::info!("username: {u}"),
                None => tracing::warn!("username not configured; set `username` in {}", config_path.display()),
            }
            tracing::info!("add a browser source in OBS: http://localhost:{port}/list?status=READING");
            if config.debug { tracing::debug!("debug logging is enabled"); }
            let public_dir = Some(config.public_dir.clone());
            onstream::api::serve(Arc::new(AppState { aggregator, public_dir, port })).await
        }
        Commands::Fetch { status, media, mixed, sort, speed } => {
            let both = media.eq_ignore_ascii_case("both");
            let request = ListRequest {
                status,
                media: MediaKind::parse_or_default(&media),
                mixed: mixed || both,
                sort: SortKey::parse(&sort),
                speed,
            };
            let result = aggregator.aggregate(&request).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
    }
}

fn init_tracing(debug: bool) {
    let default = if debug { "info,onstream=debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

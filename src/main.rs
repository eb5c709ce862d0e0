// SPDX-License-Identifier: MIT
// Copyright 2026 SEQHER Web Team

//! SEQHER site server
//!
//! `seqher-site` serves program pages and visitor sessions.
//! `seqher-site prerender <dir>` writes every program page to disk and exits.

use anyhow::Context;
use seqher_site::{
    backend::{Backend, Surface},
    config::Config,
    prerender::prerender_site,
    services::AssetTable,
    AppState,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

enum Command {
    Serve,
    Prerender(PathBuf),
}

fn parse_args() -> anyhow::Result<Command> {
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        None | Some("serve") => Ok(Command::Serve),
        Some("prerender") => {
            let dir = args
                .next()
                .context("usage: seqher-site prerender <output-dir>")?;
            Ok(Command::Prerender(PathBuf::from(dir)))
        }
        Some(other) => anyhow::bail!("unknown command: {other}"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured JSON logging for GCP
    init_logging();

    let command = parse_args()?;

    // Load configuration from environment
    let config = Config::from_env().context("Failed to load configuration")?;

    let assets = AssetTable::builtin().context("Failed to load image table")?;

    match command {
        Command::Prerender(out_dir) => {
            let backend = Backend::initialize(&config, Surface::Prerender).await;
            let state = AppState::new(config, backend, assets);

            let written = prerender_site(&state.programs, &out_dir).await?;
            tracing::info!(count = written.len(), dir = %out_dir.display(), "Prerender complete");
            Ok(())
        }
        Command::Serve => {
            tracing::info!(port = config.port, "Starting SEQHER site");

            let backend = Backend::initialize(&config, Surface::Interactive).await;
            let addr = format!("0.0.0.0:{}", config.port);
            let state = Arc::new(AppState::new(config, backend, assets));

            // Build router
            let app = seqher_site::routes::create_router(state);

            // Start server
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("binding {addr}"))?;
            tracing::info!(address = %addr, "Server listening");

            axum::serve(listener, app).await?;
            Ok(())
        }
    }
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("seqher_site=debug,info"));

    tracing_subscriber::registry().with(filter).with(format).init();
}

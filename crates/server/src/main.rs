//! Notes index server
//!
//! Builds `notes.json` at startup, rebuilds it whenever a note changes, and
//! serves:
//!
//! - `GET /api/commits` - recent git commits
//! - `GET /api/rebuild` - force a rebuild of notes.json

use anyhow::{Context, Result};
use clap::Parser;
use notes_indexer::{ChangeMonitor, GitGateway, NotesAggregator};
use notes_server::{api_routes, AppState, Args};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let config = args.indexer_config();
    let vcs = Arc::new(GitGateway::new(&config.repo_dir).with_timeout(config.git_timeout));
    let aggregator = Arc::new(NotesAggregator::from_config(&config, vcs));

    aggregator
        .rebuild()
        .await
        .with_context(|| format!("initial build of {}", config.output_path.display()))?;
    if args.once {
        return Ok(());
    }

    let monitor = ChangeMonitor::new(aggregator.clone(), config.poll_interval).start();

    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;
    log::info!("API server running on http://{}", listener.local_addr()?);
    log::info!("  GET /api/commits - get recent git commits");
    log::info!("  GET /api/rebuild - force rebuild of {}", config.output_path.display());

    axum::serve(listener, api_routes(AppState::new(aggregator)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Shutting down...");
    monitor.shutdown().await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::warn!("Cannot listen for Ctrl-C ({err}); running until killed");
        std::future::pending::<()>().await;
    }
}

//! Crypto Info webhook server.
//!
//! Responsibilities:
//! - LINE webhook (`POST /callback`): signature check, command replies
//! - Health check (`GET /api/health`)
//! - Optional scheduled broadcast of the balance and rate report

mod routes;
mod scheduler;
mod state;

#[cfg(test)]
mod testing;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use cinfo_core::workspace::{load_config, resolve_config_path};
use cinfo_core::Credentials;

use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config_path = resolve_config_path(None)?;
    let config = load_config(&config_path)?;

    tracing::info!("Crypto Info server starting...");

    let state = Arc::new(AppState::from_config(&config, &Credentials::from_env())?);

    if let Some(secs) = config.server.broadcast_interval_secs {
        scheduler::spawn_broadcast(state.dispatcher.clone(), Duration::from_secs(secs));
    }

    let app = routes::app(state);

    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address: {}", config.server.bind))?;
    tracing::info!("Listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

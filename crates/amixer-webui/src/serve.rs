//! HTTP server loop.

use std::sync::Arc;

use anyhow::{Context, Result};
use mixconf::MixerConfig;
use mixctl::{MixerService, SystemRunner};
use tracing::{info, warn};

use crate::web::{self, WebState};

/// Bind, serve until SIGINT/SIGTERM, then drain.
pub async fn run(config: &MixerConfig) -> Result<()> {
    let service = MixerService::new(&config.mixer, Arc::new(SystemRunner));

    info!("ALSA mixer web service starting");
    info!("   amixer: {}", config.mixer.amixer);
    info!("   Card registry: {}", config.mixer.card_registry.display());
    info!(
        "   Persist with {} store: {}",
        config.mixer.alsactl,
        service.persists()
    );

    let app = web::router(WebState::new(service));

    let addr = config.bind.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received SIGINT, shutting down...");
        }
        _ = terminate() => {
            info!("Received SIGTERM, shutting down...");
        }
    }
}

#[cfg(unix)]
async fn terminate() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            warn!("Failed to install SIGTERM handler: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}

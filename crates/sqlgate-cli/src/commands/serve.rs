//! `sqlgate serve` - run the gateway.
//!
//! Startup failures end the process with a non-zero status; SIGINT or
//! SIGTERM ends it cleanly after the tunnel is torn down.

use super::args::GatewayArgs;
use anyhow::{Context, Result};
use sqlgate_runtime::SessionController;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub async fn run(args: GatewayArgs) -> Result<()> {
    let config = args.into_config();

    for (key, value) in config.summary() {
        info!(setting = key, value = %value, "Configuration");
    }

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_token.cancel();
    });

    SessionController::new(config)
        .run(shutdown)
        .await
        .context("sqlgate gateway failed")?;

    info!("sqlgate stopped");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable, listening for Ctrl-C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    info!("shutdown signal received");
}

//! Gavel matching engine service.
//!
//! Initializes logging and configuration, recovers book state from the
//! snapshot if one exists, then runs the matching loop and the three
//! WebSocket channels until a shutdown signal arrives.

use anyhow::{Context, Result};
use tracing::{error, info};

use gavel_service::{
    graceful_shutdown, initialize_logging, load_config, setup_signal_handlers, Service,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config().context("failed to load configuration")?;
    initialize_logging(&config.logging)?;

    info!("starting gavel matching engine v{}", env!("CARGO_PKG_VERSION"));
    info!(symbol = %config.engine.symbol, "single-instrument continuous double auction");

    let service = Service::new(&config).context("failed to initialize service")?;
    let (gateway, engine) = service.into_parts();

    let shutdown = setup_signal_handlers()?;

    let engine_handle = tokio::spawn(async move {
        if let Err(e) = engine.run().await {
            // persistence is the only fatal path inside the loop
            error!("matching core stopped with error: {e:#}");
        }
    });
    let gateway_handle = tokio::spawn(async move {
        if let Err(e) = gateway.start().await {
            error!("gateway stopped with error: {e}");
        }
    });

    info!("gavel is running; press Ctrl+C to shut down");
    let _ = shutdown.await;

    info!("shutdown signal received; stopping");
    graceful_shutdown(engine_handle, gateway_handle, config.service.shutdown_timeout_secs).await;

    info!("gavel shutdown complete");
    Ok(())
}

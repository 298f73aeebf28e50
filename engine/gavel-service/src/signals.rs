//! Signal handling for graceful shutdown

use anyhow::{Context, Result};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{error, info, warn};

/// Resolve once SIGINT or SIGTERM arrives.
pub fn setup_signal_handlers() -> Result<oneshot::Receiver<()>> {
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    #[cfg(unix)]
    let sigterm_flag = {
        let flag = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
        signal_hook::flag::register(signal_hook::consts::SIGTERM, flag.clone())
            .context("failed to register SIGTERM handler")?;
        flag
    };

    tokio::spawn(async move {
        #[cfg(unix)]
        let sigterm = async move {
            use std::sync::atomic::Ordering;
            while !sigterm_flag.load(Ordering::Relaxed) {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        };
        #[cfg(not(unix))]
        let sigterm = std::future::pending::<()>();

        tokio::select! {
            result = tokio::signal::ctrl_c() => match result {
                Ok(()) => info!("Ctrl+C received"),
                Err(e) => error!("failed to listen for Ctrl+C: {e}"),
            },
            _ = sigterm => info!("SIGTERM received"),
        }
        let _ = shutdown_tx.send(());
    });

    Ok(shutdown_rx)
}

/// Stop intake first, then give the core a bounded window to drain.
/// Dropping the gateway closes the engine queue, so an idle core exits on
/// its own; a wedged one is abandoned after the timeout.
pub async fn graceful_shutdown(
    engine: JoinHandle<()>,
    gateway: JoinHandle<()>,
    timeout_secs: u64,
) {
    gateway.abort();
    let _ = gateway.await;
    info!("gateway stopped; waiting for the matching core to drain");

    match timeout(Duration::from_secs(timeout_secs), engine).await {
        Ok(Ok(())) => info!("matching core stopped"),
        Ok(Err(e)) => {
            if !e.is_cancelled() {
                error!("matching core task failed: {e}");
            }
        }
        Err(_) => warn!("matching core did not stop within {timeout_secs}s; abandoning it"),
    }
}

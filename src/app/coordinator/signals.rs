//! Signal handling for graceful shutdown
//!
//! Bridges CTRL-C and SIGTERM into the run-level cancellation channel so an
//! interrupted run can persist its resume ledger and report a distinguished
//! cancelled outcome.

use tokio::signal;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::info;

/// Create the shutdown broadcast channel for one run
pub fn create_shutdown_channel() -> (broadcast::Sender<()>, broadcast::Receiver<()>) {
    broadcast::channel(1)
}

/// Spawn a background task that broadcasts shutdown on CTRL-C or SIGTERM
pub fn spawn_signal_handler(shutdown_tx: broadcast::Sender<()>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let ctrl_c = async {
            signal::ctrl_c()
                .await
                .expect("Failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("Failed to install signal handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received Ctrl+C, cancelling run");
            },
            _ = terminate => {
                info!("Received terminate signal, cancelling run");
            },
        }

        let _ = shutdown_tx.send(());
    })
}

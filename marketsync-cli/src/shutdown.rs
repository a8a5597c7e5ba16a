//! Interrupt handling.

use marketsync_sdk::cancel::CancelHandle;
use tokio::task::JoinHandle;

/// Spawns a task that fires `handle` on the first Ctrl+C.
pub fn spawn_interrupt_handler(handle: CancelHandle) -> JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Received Ctrl+C, cancelling");
                handle.cancel();
            }
            Err(e) => tracing::warn!("Failed to install Ctrl+C handler: {}", e),
        }
    })
}

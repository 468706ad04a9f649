//! OS signal handling.
//!
//! # Responsibilities
//! - Register the Ctrl-C handler
//! - Translate the first signal into a [`Shutdown`] trigger
//! - Exit immediately on the second signal
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Tokio keeps its OS handler installed for the life of the process, so the
//!   forced exit on a repeated Ctrl-C is done here

use std::future::Future;
use std::io;
use tokio::task::JoinHandle;

use crate::lifecycle::shutdown::Shutdown;

/// Exit status used when a second Ctrl-C forces the process down.
pub const FORCED_EXIT_CODE: i32 = 130;

/// Spawn a task that triggers `shutdown` on Ctrl-C and exits on a second one.
pub fn spawn_ctrl_c_handler(shutdown: Shutdown) -> JoinHandle<()> {
    tokio::spawn(handle_interrupts(shutdown, tokio::signal::ctrl_c, || {
        std::process::exit(FORCED_EXIT_CODE);
    }))
}

/// Trigger `shutdown` on the first interrupt and call `force_exit` on the second.
pub async fn handle_interrupts<F, Fut, X>(shutdown: Shutdown, mut next_interrupt: F, force_exit: X)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = io::Result<()>>,
    X: FnOnce(),
{
    if let Err(e) = next_interrupt().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        return;
    }
    tracing::warn!("Interrupt received, cancelling (press Ctrl-C again to exit now)");
    shutdown.trigger();

    match next_interrupt().await {
        Ok(()) => {
            tracing::warn!(code = FORCED_EXIT_CODE, "Second interrupt received, exiting");
            force_exit();
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        }
    }
}

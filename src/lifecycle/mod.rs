//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGINT (Ctrl-C) → Shutdown::trigger
//!     second SIGINT   → process exit (130)
//!
//! Shutdown (shutdown.rs):
//!     trigger → every ShutdownSignal resolves
//!     → in-flight RPC call, funding barrier and poll sleep abort
//!     → binary exits non-zero
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::{Shutdown, ShutdownSignal};
pub use signals::spawn_ctrl_c_handler;

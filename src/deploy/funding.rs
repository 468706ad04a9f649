//! The funding barrier between fee estimation and submission.
//!
//! # Design Decisions
//! - The operator line is read on a dedicated OS thread and handed back over a
//!   oneshot channel. A blocking read cannot be interrupted, so on cancellation
//!   the thread is left behind and nothing in the runtime waits for it

use starknet_types_core::felt::Felt;
use std::io::{self, BufRead, BufReader};
use thiserror::Error;
use tokio::sync::oneshot;

use crate::lifecycle::ShutdownSignal;
use crate::starknet::fee::Fri;

#[derive(Debug, Error)]
pub enum FundingError {
    #[error("cancelled while waiting for funding")]
    Cancelled,

    #[error("failed to read operator input: {0}")]
    Input(#[from] io::Error),
}

/// What the operator is asked to send, and where.
#[derive(Debug, Clone)]
pub struct FundingRequest {
    pub address: Felt,
    pub amount: Fri,
    pub faucet_url: String,
}

/// Blocks the deployment until the address is believed to be funded.
#[allow(async_fn_in_trait)]
pub trait FundingGate {
    async fn wait_for_funding(&mut self, request: &FundingRequest) -> Result<(), FundingError>;
}

type OperatorInput = Box<dyn BufRead + Send>;

/// Waits for one line of operator input, stdin unless told otherwise.
pub struct ConsoleFundingGate {
    shutdown: ShutdownSignal,
    input: Option<OperatorInput>,
}

impl ConsoleFundingGate {
    pub fn new(shutdown: ShutdownSignal) -> Self {
        Self {
            shutdown,
            input: None,
        }
    }

    /// Read the confirmation line from `input` instead of stdin.
    pub fn with_input<R: BufRead + Send + 'static>(mut self, input: R) -> Self {
        self.input = Some(Box::new(input));
        self
    }

    fn take_input(&mut self) -> OperatorInput {
        self.input
            .take()
            .unwrap_or_else(|| Box::new(BufReader::new(io::stdin())))
    }
}

impl std::fmt::Debug for ConsoleFundingGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleFundingGate")
            .field("shutdown", &self.shutdown)
            .field("custom_input", &self.input.is_some())
            .finish()
    }
}

/// Read one line from `input` on its own thread.
///
/// The receiver yields the byte count of the line, `0` on end of input.
fn spawn_line_reader(mut input: OperatorInput) -> io::Result<oneshot::Receiver<io::Result<usize>>> {
    let (tx, rx) = oneshot::channel();
    std::thread::Builder::new()
        .name("funding-input".to_string())
        .spawn(move || {
            let mut line = String::new();
            let _ = tx.send(input.read_line(&mut line));
        })?;
    Ok(rx)
}

impl FundingGate for ConsoleFundingGate {
    async fn wait_for_funding(&mut self, request: &FundingRequest) -> Result<(), FundingError> {
        tracing::info!(
            address = %format!("{:#x}", request.address),
            amount_fri = request.amount.0,
            "Waiting for operator to fund the account"
        );

        let line = spawn_line_reader(self.take_input())?;

        tokio::select! {
            read = line => {
                let read = read.map_err(|_| {
                    io::Error::new(io::ErrorKind::BrokenPipe, "input reader stopped")
                })?;
                if read? == 0 {
                    tracing::warn!("stdin closed, continuing without confirmation");
                }
                Ok(())
            }
            _ = self.shutdown.cancelled() => Err(FundingError::Cancelled),
        }
    }
}

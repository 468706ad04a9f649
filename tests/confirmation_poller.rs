//! Confirmation poller behaviour against a scripted node.

use std::time::Duration;

use account_bootstrap::deploy::{ConfirmationPoller, PollError};
use account_bootstrap::lifecycle::Shutdown;
use account_bootstrap::starknet::types::{ExecutionStatus, FinalityStatus};

mod common;
use common::{MockNode, StatusStep, SUBMITTED_TX_HASH};

const FAST: Duration = Duration::from_millis(1);

#[tokio::test]
async fn test_accepted_after_pending_attempts() {
    let node = MockNode::accepted_after(4);
    let mut progress = Vec::new();

    let receipt = ConfirmationPoller::new(&node, FAST, 10)
        .poll(SUBMITTED_TX_HASH, |attempt| progress.push(attempt))
        .await
        .unwrap();

    assert_eq!(receipt.transaction_hash, SUBMITTED_TX_HASH);
    assert_eq!(receipt.execution_status, ExecutionStatus::Succeeded);
    assert_eq!(MockNode::count(&node.status_calls), 4);
    assert_eq!(MockNode::count(&node.receipt_calls), 1);
    assert_eq!(progress, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_timeout_after_exactly_max_attempts() {
    let node = MockNode::new().with_statuses(Vec::new(), FinalityStatus::Received);
    let mut dots = 0;

    let result = ConfirmationPoller::new(&node, FAST, 7)
        .poll(SUBMITTED_TX_HASH, |_| dots += 1)
        .await;

    assert_eq!(result.unwrap_err(), PollError::Timeout { attempts: 7 });
    assert_eq!(MockNode::count(&node.status_calls), 7);
    assert_eq!(MockNode::count(&node.receipt_calls), 0);
    assert_eq!(dots, 7);
}

#[tokio::test]
async fn test_lookup_errors_are_retried() {
    let node = MockNode::new().with_statuses(
        vec![
            StatusStep::LookupError,
            StatusStep::LookupError,
            StatusStep::Status(FinalityStatus::AcceptedOnL1),
        ],
        FinalityStatus::AcceptedOnL1,
    );

    let receipt = ConfirmationPoller::new(&node, FAST, 5)
        .poll(SUBMITTED_TX_HASH, |_| {})
        .await
        .unwrap();

    assert_eq!(receipt.transaction_hash, SUBMITTED_TX_HASH);
    assert_eq!(MockNode::count(&node.status_calls), 3);
}

#[tokio::test]
async fn test_rejected_stops_immediately() {
    let node = MockNode::new().with_statuses(
        vec![
            StatusStep::Status(FinalityStatus::Received),
            StatusStep::Rejected("Invalid transaction nonce"),
        ],
        FinalityStatus::Received,
    );

    let result = ConfirmationPoller::new(&node, FAST, 60)
        .poll(SUBMITTED_TX_HASH, |_| {})
        .await;

    assert_eq!(
        result.unwrap_err(),
        PollError::Rejected {
            reason: Some("Invalid transaction nonce".to_string())
        }
    );
    assert_eq!(MockNode::count(&node.status_calls), 2);
}

#[tokio::test]
async fn test_missing_receipt_counts_as_attempt() {
    let mut node = MockNode::new().with_statuses(Vec::new(), FinalityStatus::AcceptedOnL2);
    node.receipt_available = false;

    let result = ConfirmationPoller::new(&node, FAST, 3)
        .poll(SUBMITTED_TX_HASH, |_| {})
        .await;

    assert_eq!(result.unwrap_err(), PollError::Timeout { attempts: 3 });
    assert_eq!(MockNode::count(&node.status_calls), 3);
    assert_eq!(MockNode::count(&node.receipt_calls), 3);
}

#[tokio::test]
async fn test_cancellation_interrupts_sleep() {
    let node = MockNode::new().with_statuses(Vec::new(), FinalityStatus::Received);
    let shutdown = Shutdown::new();

    let trigger = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.trigger();
    });

    let started = std::time::Instant::now();
    let result = ConfirmationPoller::new(&node, Duration::from_secs(30), 60)
        .with_shutdown(shutdown.subscribe())
        .poll(SUBMITTED_TX_HASH, |_| {})
        .await;

    assert_eq!(result.unwrap_err(), PollError::Cancelled);
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(MockNode::count(&node.status_calls), 1);
}

#[tokio::test]
async fn test_already_cancelled_makes_no_calls() {
    let node = MockNode::accepted_after(1);
    let shutdown = Shutdown::new();
    shutdown.trigger();

    let result = ConfirmationPoller::new(&node, FAST, 5)
        .with_shutdown(shutdown.subscribe())
        .poll(SUBMITTED_TX_HASH, |_| {})
        .await;

    assert_eq!(result.unwrap_err(), PollError::Cancelled);
    assert_eq!(MockNode::count(&node.status_calls), 0);
}

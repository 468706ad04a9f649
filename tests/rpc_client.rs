//! JSON-RPC client against a local HTTP endpoint.

use serde_json::json;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use url::Url;

use account_bootstrap::config::RpcConfig;
use account_bootstrap::starknet::provider::StarknetRpc;
use account_bootstrap::starknet::types::{BlockId, FinalityStatus, StarknetError};
use account_bootstrap::starknet::{Felt, JsonRpcClient};

mod common;
use common::{rpc_error, rpc_result, start_rpc_backend};

fn rpc_config(expected_chain_id: Option<&str>) -> RpcConfig {
    RpcConfig {
        url: None,
        timeout_secs: 5,
        expected_chain_id: expected_chain_id.map(str::to_string),
    }
}

#[tokio::test]
async fn test_connect_performs_chain_id_handshake() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let addr = start_rpc_backend(move |method, _params| {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            assert_eq!(method, "starknet_chainId");
            rpc_result(json!("0x534e5f5345504f4c4941"))
        }
    })
    .await;

    let url = Url::parse(&format!("http://{addr}")).unwrap();
    let (_client, chain_id) = JsonRpcClient::connect(url, &rpc_config(Some("0x534e5f5345504f4c4941")))
        .await
        .unwrap();

    assert_eq!(chain_id, Felt::from_hex("0x534e5f5345504f4c4941").unwrap());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_connect_rejects_other_chain() {
    let addr = start_rpc_backend(|_, _| async { rpc_result(json!("0x534e5f4d41494e")) }).await;

    let url = Url::parse(&format!("http://{addr}")).unwrap();
    let result = JsonRpcClient::connect(url, &rpc_config(Some("0x534e5f5345504f4c4941"))).await;

    assert!(matches!(result, Err(StarknetError::ChainMismatch { .. })));
}

#[tokio::test]
async fn test_rpc_error_object_is_surfaced() {
    let addr = start_rpc_backend(|_, _| async { rpc_error(29, "Transaction hash not found") }).await;

    let client = JsonRpcClient::new(Url::parse(&format!("http://{addr}")).unwrap(), 5).unwrap();
    let result = client.transaction_status(Felt::from(0x1u64)).await;

    match result {
        Err(StarknetError::Rpc { code, message, .. }) => {
            assert_eq!(code, 29);
            assert_eq!(message, "Transaction hash not found");
        }
        other => panic!("expected RPC error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_http_failure_is_transport_error() {
    let addr = start_rpc_backend(|_, _| async { (503, "overloaded".to_string()) }).await;

    let client = JsonRpcClient::new(Url::parse(&format!("http://{addr}")).unwrap(), 5).unwrap();
    let result = client.chain_id().await;

    assert!(matches!(result, Err(StarknetError::Transport(_))));
}

#[tokio::test]
async fn test_status_and_block_decoding() {
    let addr = start_rpc_backend(|method, params| async move {
        match method.as_str() {
            "starknet_getTransactionStatus" => {
                assert_eq!(params["transaction_hash"], json!("0xabc"));
                rpc_result(json!({
                    "finality_status": "ACCEPTED_ON_L2",
                    "execution_status": "SUCCEEDED"
                }))
            }
            "starknet_getBlockWithTxHashes" => {
                assert_eq!(params["block_id"], json!("latest"));
                rpc_result(json!({
                    "block_hash": "0x10",
                    "block_number": 7,
                    "status": "ACCEPTED_ON_L2",
                    "parent_hash": "0x9",
                    "transactions": ["0xabc"]
                }))
            }
            other => rpc_error(-32601, &format!("method {other} not found")),
        }
    })
    .await;

    let client = JsonRpcClient::new(Url::parse(&format!("http://{addr}")).unwrap(), 5).unwrap();

    let status = client.transaction_status(Felt::from(0xabcu64)).await.unwrap();
    assert_eq!(status.finality_status, FinalityStatus::AcceptedOnL2);

    let block = client.block_with_tx_hashes(BlockId::Latest).await.unwrap();
    let block = block.block.expect("finalized block");
    assert_eq!(block.block_number, 7);
    assert_eq!(block.transactions, vec![Felt::from(0xabcu64)]);
}

#[tokio::test]
async fn test_estimate_fee_request_shape() {
    let addr = start_rpc_backend(|method, params| async move {
        assert_eq!(method, "starknet_estimateFee");
        assert_eq!(params["request"][0]["type"], json!("DEPLOY_ACCOUNT"));
        assert_eq!(params["request"][0]["version"], json!("0x100000000000000000000000000000003"));
        assert_eq!(params["simulation_flags"], json!([]));
        rpc_result(json!([{
            "l1_gas_consumed": "0x0",
            "l1_gas_price": "0x3b9aca00",
            "l2_gas_consumed": "0x3e8",
            "l2_gas_price": "0x3b9aca00",
            "l1_data_gas_consumed": "0x80",
            "l1_data_gas_price": "0x3e8",
            "overall_fee": "0xe8d4a51000",
            "unit": "FRI"
        }]))
    })
    .await;

    let keys = account_bootstrap::starknet::KeyPair::from_private_key(Felt::from(7u64)).unwrap();
    let query = account_bootstrap::starknet::transaction::DeployAccountTransaction::for_public_key(
        keys.public_key(),
        Felt::from(0x1234u64),
    )
    .sign(&keys, Felt::from(1u64), true)
    .unwrap();

    let client = JsonRpcClient::new(Url::parse(&format!("http://{addr}")).unwrap(), 5).unwrap();
    let estimate = client.estimate_deploy_account_fee(&query).await.unwrap();

    assert_eq!(estimate.l2_gas_consumed, 1000);
    assert_eq!(estimate.l2_gas_price, 1_000_000_000);
    assert_eq!(estimate.overall_fee, 1_000_000_000_000);
}

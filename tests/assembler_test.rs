//! Pipeline integration tests against a mock JSON-RPC endpoint.
//!
//! One mockito server plays the node and the fee-estimation service at
//! the same URL, routed by JSON-RPC method name, which mirrors how the
//! production endpoint multiplexes both surfaces.

use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use solana_sdk::{
    hash::Hash,
    instruction::{AccountMeta, Instruction},
    message::VersionedMessage,
    pubkey::Pubkey,
    signature::Signature,
    system_program,
};

use mcswap::{
    tx::{compute_limit, poll_status},
    McSwapError, PriorityTier, TxArtifact, TxRequest, TxStatus,
};

// Compute-budget payload discriminators (borsh enum tags).
const SET_UNIT_LIMIT_TAG: u8 = 2;
const SET_UNIT_PRICE_TAG: u8 = 3;

fn caller_instruction() -> Instruction {
    Instruction::new_with_bytes(
        system_program::id(),
        &[2, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0],
        vec![
            AccountMeta::new(Pubkey::new_unique(), true),
            AccountMeta::new(Pubkey::new_unique(), false),
        ],
    )
}

async fn mock_blockhash(server: &mut ServerGuard) -> mockito::Mock {
    server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({"method": "getLatestBlockhash"})))
        .with_body(
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": {
                    "context": { "slot": 12345 },
                    "value": {
                        "blockhash": Hash::new_unique().to_string(),
                        "lastValidBlockHeight": 1000
                    }
                }
            })
            .to_string(),
        )
        .expect_at_least(1)
        .create_async()
        .await
}

async fn mock_simulation_ok(server: &mut ServerGuard, units_consumed: u64) -> mockito::Mock {
    server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({"method": "simulateTransaction"})))
        .with_body(
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": {
                    "context": { "slot": 12345 },
                    "value": {
                        "err": null,
                        "logs": ["Program log: ok"],
                        "accounts": null,
                        "unitsConsumed": units_consumed,
                        "returnData": null
                    }
                }
            })
            .to_string(),
        )
        .create_async()
        .await
}

async fn mock_fee_estimate(server: &mut ServerGuard, estimate: f64) -> mockito::Mock {
    server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({"method": "getPriorityFeeEstimate"})))
        .with_body(
            json!({
                "jsonrpc": "2.0",
                "id": "1",
                "result": { "priorityFeeEstimate": estimate }
            })
            .to_string(),
        )
        .create_async()
        .await
}

/// Scenario A: consumed=50,000 at tolerance 1.1 and an 8,000 estimate
/// floored to 10,000 yield [price, limit, caller ix] and an unsigned
/// transaction.
#[tokio::test]
async fn assembles_with_budget_injection_in_observed_order() {
    let mut server = Server::new_async().await;
    let _blockhash = mock_blockhash(&mut server).await;
    let _sim = mock_simulation_ok(&mut server, 50_000).await;
    let _fee = mock_fee_estimate(&mut server, 8_000.0).await;

    let request = TxRequest::new(server.url(), Pubkey::new_unique(), vec![caller_instruction()]);
    let artifact = mcswap::assemble(request).await.expect("assembly succeeds");

    let tx = artifact.transaction().expect("unreduced artifact").clone();
    let VersionedMessage::V0(message) = &tx.message else {
        panic!("expected v0 message");
    };
    assert_eq!(message.instructions.len(), 3);

    // leading order is price then limit, caller instruction last
    let price_ix = &message.instructions[0];
    assert_eq!(price_ix.data[0], SET_UNIT_PRICE_TAG);
    assert_eq!(
        u64::from_le_bytes(price_ix.data[1..9].try_into().unwrap()),
        10_000, // floored from 8,000
    );

    let limit_ix = &message.instructions[1];
    assert_eq!(limit_ix.data[0], SET_UNIT_LIMIT_TAG);
    assert_eq!(
        u32::from_le_bytes(limit_ix.data[1..5].try_into().unwrap()),
        55_000, // ceil(50,000 * 1.1)
    );

    assert_eq!(message.instructions[2].data, caller_instruction().data);

    // unsigned: placeholder signatures only
    assert!(tx.signatures.iter().all(|s| *s == Signature::default()));
}

/// Scenario B / P5: a simulation error aborts assembly with the program
/// logs attached, and the fee-estimation service is never called.
#[tokio::test]
async fn simulation_error_aborts_before_fee_estimation() {
    let mut server = Server::new_async().await;
    let _blockhash = mock_blockhash(&mut server).await;
    let _sim = server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({"method": "simulateTransaction"})))
        .with_body(
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": {
                    "context": { "slot": 12345 },
                    "value": {
                        "err": { "InstructionError": [0, { "Custom": 1 }] },
                        "logs": ["Program failed: insufficient funds"],
                        "accounts": null,
                        "unitsConsumed": 0,
                        "returnData": null
                    }
                }
            })
            .to_string(),
        )
        .create_async()
        .await;
    let fee = server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({"method": "getPriorityFeeEstimate"})))
        .expect(0)
        .create_async()
        .await;

    let request = TxRequest::new(server.url(), Pubkey::new_unique(), vec![caller_instruction()]);
    let err = mcswap::assemble(request).await.unwrap_err();

    match err {
        McSwapError::Simulation { logs, .. } => {
            assert_eq!(logs, vec!["Program failed: insufficient funds".to_string()]);
        }
        other => panic!("expected simulation error, got {other:?}"),
    }
    fee.assert_async().await;
}

/// P8: with both stages disabled, nothing beyond the blockhash fetch
/// touches the network and the caller's list compiles untouched.
#[tokio::test]
async fn disabled_stages_skip_network_calls() {
    let mut server = Server::new_async().await;
    let _blockhash = mock_blockhash(&mut server).await;
    let sim = server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({"method": "simulateTransaction"})))
        .expect(0)
        .create_async()
        .await;
    let fee = server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({"method": "getPriorityFeeEstimate"})))
        .expect(0)
        .create_async()
        .await;

    let mut request =
        TxRequest::new(server.url(), Pubkey::new_unique(), vec![caller_instruction()]);
    request.compute = false;
    request.fees = false;
    let artifact = mcswap::assemble(request).await.expect("assembly succeeds");

    let tx = artifact.transaction().expect("unreduced artifact");
    let VersionedMessage::V0(message) = &tx.message else {
        panic!("expected v0 message");
    };
    assert_eq!(message.instructions.len(), 1);

    sim.assert_async().await;
    fee.assert_async().await;
}

/// P6 variant: a single enabled stage injects exactly one budget
/// instruction.
#[tokio::test]
async fn fee_only_injects_single_price_instruction() {
    let mut server = Server::new_async().await;
    let _blockhash = mock_blockhash(&mut server).await;
    let _fee = mock_fee_estimate(&mut server, 25_000.0).await;

    let mut request =
        TxRequest::new(server.url(), Pubkey::new_unique(), vec![caller_instruction()]);
    request.compute = false;
    let artifact = mcswap::assemble(request).await.expect("assembly succeeds");

    let tx = artifact.transaction().expect("unreduced artifact");
    let VersionedMessage::V0(message) = &tx.message else {
        panic!("expected v0 message");
    };
    assert_eq!(message.instructions.len(), 2);
    assert_eq!(message.instructions[0].data[0], SET_UNIT_PRICE_TAG);
    assert_eq!(
        u64::from_le_bytes(message.instructions[0].data[1..9].try_into().unwrap()),
        25_000,
    );
}

/// P1: identical inputs against a deterministic backend estimate the
/// same unit count.
#[tokio::test]
async fn compute_estimation_is_idempotent() {
    let mut server = Server::new_async().await;
    let _sim = mock_simulation_ok(&mut server, 77_000).await;

    let payer = Pubkey::new_unique();
    let instructions = vec![caller_instruction()];
    let blockhash = Hash::new_unique();

    let first = compute_limit(&server.url(), &payer, &instructions, 1.2, blockhash, None)
        .await
        .expect("first estimate");
    let second = compute_limit(&server.url(), &payer, &instructions, 1.2, blockhash, None)
        .await
        .expect("second estimate");
    assert_eq!(first, second);
    assert_eq!(first, 92_400); // ceil(77,000 * 1.2)
}

/// P7: serialize+encode reduces to text that decodes back to the exact
/// wire bytes.
#[tokio::test]
async fn serialized_artifact_round_trips_through_base64() {
    let mut server = Server::new_async().await;
    let _blockhash = mock_blockhash(&mut server).await;
    let _sim = mock_simulation_ok(&mut server, 50_000).await;
    let _fee = mock_fee_estimate(&mut server, 20_000.0).await;

    let mut request =
        TxRequest::new(server.url(), Pubkey::new_unique(), vec![caller_instruction()]);
    request.serialize = true;
    request.encode = true;
    let artifact = mcswap::assemble(request).await.expect("assembly succeeds");

    let TxArtifact::Base64(text) = &artifact else {
        panic!("expected base64 artifact");
    };
    let bytes = artifact.to_bytes().expect("decodes");
    let decoded: solana_sdk::transaction::VersionedTransaction =
        bincode::deserialize(&bytes).expect("valid wire bytes");
    assert_eq!(bincode::serialize(&decoded).unwrap(), bytes);
    assert!(!text.is_empty());
}

/// Scenario C: a status source that never reaches a terminal state
/// resolves as a timeout after max * interval seconds, not a hang.
#[tokio::test]
async fn poll_status_times_out_after_budget() {
    let mut server = Server::new_async().await;
    let _status = server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({"method": "getSignatureStatuses"})))
        .with_body(
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": {
                    "context": { "slot": 12345 },
                    "value": [{
                        "slot": 12345,
                        "confirmations": 1,
                        "status": { "Ok": null },
                        "err": null,
                        "confirmationStatus": "processed"
                    }]
                }
            })
            .to_string(),
        )
        .expect(3)
        .create_async()
        .await;

    let signature = Signature::default();
    let status = poll_status(&server.url(), &signature, 3, 1)
        .await
        .expect("poll completes");
    assert_eq!(status, TxStatus::TimedOut { waited_secs: 3 });
}

/// Finalized-with-error resolves as a failure carrying the error string.
#[tokio::test]
async fn poll_status_reports_finalized_error() {
    let mut server = Server::new_async().await;
    let _status = server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({"method": "getSignatureStatuses"})))
        .with_body(
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": {
                    "context": { "slot": 12345 },
                    "value": [{
                        "slot": 12345,
                        "confirmations": null,
                        "status": { "Err": { "InstructionError": [0, { "Custom": 6 }] } },
                        "err": { "InstructionError": [0, { "Custom": 6 }] },
                        "confirmationStatus": "finalized"
                    }]
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let status = poll_status(&server.url(), &Signature::default(), 2, 1)
        .await
        .expect("poll completes");
    assert!(matches!(status, TxStatus::Failed(_)));
}

/// Configuration errors fail fast: no mock is ever hit.
#[tokio::test]
async fn config_errors_never_touch_the_network() {
    let mut server = Server::new_async().await;
    let blockhash = server
        .mock("POST", "/")
        .expect(0)
        .create_async()
        .await;

    let request = TxRequest::new(server.url(), Pubkey::new_unique(), vec![]);
    let err = mcswap::assemble(request).await.unwrap_err();
    assert!(matches!(err, McSwapError::Config(_)));
    blockhash.assert_async().await;
}

/// P4: the Extreme alias reaches the fee service as "VeryHigh".
#[tokio::test]
async fn extreme_tier_normalized_before_fee_call() {
    let mut server = Server::new_async().await;
    let _blockhash = mock_blockhash(&mut server).await;
    let fee = server
        .mock("POST", "/")
        .match_body(Matcher::AllOf(vec![
            Matcher::PartialJson(json!({"method": "getPriorityFeeEstimate"})),
            Matcher::Regex("VeryHigh".to_string()),
        ]))
        .with_body(
            json!({
                "jsonrpc": "2.0",
                "id": "1",
                "result": { "priorityFeeEstimate": 15_000 }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let mut request =
        TxRequest::new(server.url(), Pubkey::new_unique(), vec![caller_instruction()]);
    request.compute = false;
    request.priority = PriorityTier::Extreme;
    mcswap::assemble(request).await.expect("assembly succeeds");
    fee.assert_async().await;
}

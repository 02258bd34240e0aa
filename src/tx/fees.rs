//! Priority-fee estimation against the fee market.

use serde::Deserialize;
use solana_sdk::{
    address_lookup_table::AddressLookupTableAccount,
    hash::Hash,
    instruction::Instruction,
    pubkey::Pubkey,
};
use tracing::debug;

use crate::{error::McSwapError, types::PriorityTier};

/// Minimum accepted estimate in micro-lamports per compute unit.
///
/// Guards against degenerate zero/near-zero estimates that would leave
/// the transaction chronically under-priced under contention.
pub const FEE_FLOOR_MICRO_LAMPORTS: u64 = 10_000;

#[derive(Debug, Deserialize)]
struct FeeEstimateResponse {
    result: Option<FeeEstimateResult>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct FeeEstimateResult {
    #[serde(rename = "priorityFeeEstimate")]
    priority_fee_estimate: f64,
}

/// Ask the fee-estimation service for a micro-lamports-per-unit price at
/// the given urgency tier.
///
/// The draft transaction is serialized as-is (no unit-limit prefix),
/// base58-encoded, and POSTed as a `getPriorityFeeEstimate` JSON-RPC
/// call. Transport and parse failures are not retried; the assembler
/// treats them as fatal unless fee injection was disabled.
pub async fn fee_estimate(
    rpc_url: &str,
    payer: &Pubkey,
    tier: PriorityTier,
    instructions: &[Instruction],
    blockhash: Hash,
    tables: Option<&[AddressLookupTableAccount]>,
) -> Result<u64, McSwapError> {
    let tx = super::compile_unsigned(payer, instructions, tables, blockhash)?;
    let wire = bincode::serialize(&tx)
        .map_err(|e| McSwapError::FeeEstimation(format!("draft serialize failed: {e}")))?;
    let encoded = bs58::encode(wire).into_string();

    let body = serde_json::json!({
        "jsonrpc": "2.0",
        "id": "1",
        "method": "getPriorityFeeEstimate",
        "params": [{
            "transaction": encoded,
            "options": { "priorityLevel": tier.as_str() },
        }],
    });

    let response = reqwest::Client::new()
        .post(rpc_url)
        .json(&body)
        .send()
        .await
        .map_err(|e| McSwapError::FeeEstimation(format!("request failed: {e}")))?;
    let payload: FeeEstimateResponse = response
        .json()
        .await
        .map_err(|e| McSwapError::FeeEstimation(format!("unparseable response: {e}")))?;

    if let Some(err) = payload.error {
        return Err(McSwapError::FeeEstimation(format!(
            "service error: {err}"
        )));
    }
    let raw = payload
        .result
        .ok_or_else(|| McSwapError::FeeEstimation("response missing result".to_string()))?
        .priority_fee_estimate;

    let estimate = apply_floor(raw);
    debug!(tier = tier.as_str(), raw, estimate, "priority fee estimated");
    Ok(estimate)
}

/// Truncate the service's (possibly fractional) estimate and raise it to
/// the floor.
fn apply_floor(raw: f64) -> u64 {
    let truncated = if raw.is_finite() && raw > 0.0 {
        raw as u64
    } else {
        0
    };
    truncated.max(FEE_FLOOR_MICRO_LAMPORTS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_raises_low_estimates() {
        assert_eq!(apply_floor(0.0), FEE_FLOOR_MICRO_LAMPORTS);
        assert_eq!(apply_floor(1.0), FEE_FLOOR_MICRO_LAMPORTS);
        assert_eq!(apply_floor(9_999.9), FEE_FLOOR_MICRO_LAMPORTS);
        assert_eq!(apply_floor(-5.0), FEE_FLOOR_MICRO_LAMPORTS);
        assert_eq!(apply_floor(f64::NAN), FEE_FLOOR_MICRO_LAMPORTS);
    }

    #[test]
    fn floor_passes_market_estimates() {
        assert_eq!(apply_floor(10_000.0), 10_000);
        assert_eq!(apply_floor(250_000.7), 250_000);
    }

    #[test]
    fn response_parses_integer_and_float_estimates() {
        let payload: FeeEstimateResponse =
            serde_json::from_str(r#"{"result":{"priorityFeeEstimate":8000}}"#).unwrap();
        assert_eq!(payload.result.unwrap().priority_fee_estimate, 8_000.0);

        let payload: FeeEstimateResponse =
            serde_json::from_str(r#"{"result":{"priorityFeeEstimate":12345.6}}"#).unwrap();
        assert_eq!(payload.result.unwrap().priority_fee_estimate, 12_345.6);
    }

    #[test]
    fn response_surfaces_service_errors() {
        let payload: FeeEstimateResponse = serde_json::from_str(
            r#"{"error":{"code":-32600,"message":"bad request"}}"#,
        )
        .unwrap();
        assert!(payload.result.is_none());
        assert!(payload.error.is_some());
    }
}

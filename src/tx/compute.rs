//! Compute-unit estimation via dry-run simulation.

use solana_rpc_client_api::config::RpcSimulateTransactionConfig;
use solana_sdk::{
    address_lookup_table::AddressLookupTableAccount,
    commitment_config::CommitmentConfig,
    compute_budget::ComputeBudgetInstruction,
    hash::Hash,
    instruction::Instruction,
    pubkey::Pubkey,
};
use tracing::{debug, warn};

use crate::{error::McSwapError, rpc};

/// Unit limit used for the simulation probe: the protocol's hard
/// per-transaction ceiling, so the draft never fails for lack of budget.
pub const SIMULATION_UNIT_LIMIT: u32 = 1_400_000;

/// Simulate `instructions` and return a unit limit sized to the observed
/// consumption.
///
/// A disposable message is built with a max-limit probe instruction in
/// front, simulated with signature verification off and blockhash
/// replacement on (the node may substitute a fresher hash for accuracy).
/// On success the result is `ceil(consumed * tolerance)`; tolerance covers
/// state drift between simulation and inclusion. No clamping to the
/// protocol ceiling happens here.
///
/// A simulation-reported execution error comes back as
/// [`McSwapError::Simulation`] with the program logs, and is fatal for the
/// whole assembly.
pub async fn compute_limit(
    rpc_url: &str,
    payer: &Pubkey,
    instructions: &[Instruction],
    tolerance: f64,
    blockhash: Hash,
    tables: Option<&[AddressLookupTableAccount]>,
) -> Result<u32, McSwapError> {
    let mut probe = Vec::with_capacity(instructions.len() + 1);
    probe.push(ComputeBudgetInstruction::set_compute_unit_limit(
        SIMULATION_UNIT_LIMIT,
    ));
    probe.extend_from_slice(instructions);

    let tx = super::compile_unsigned(payer, &probe, tables, blockhash)?;

    let config = RpcSimulateTransactionConfig {
        sig_verify: false,
        replace_recent_blockhash: true,
        commitment: Some(CommitmentConfig::confirmed()),
        ..Default::default()
    };
    let response = rpc::client(rpc_url)
        .simulate_transaction_with_config(&tx, config)
        .await?;
    let result = response.value;

    if let Some(err) = result.err {
        let logs = result.logs.unwrap_or_default();
        warn!(error = %err, log_lines = logs.len(), "simulation reported execution error");
        return Err(McSwapError::Simulation {
            message: format!("error during simulation: {err}"),
            logs,
        });
    }

    let consumed = result.units_consumed.ok_or_else(|| {
        McSwapError::transport("simulation response missing consumed units")
    })?;
    let limit = scale_limit(consumed, tolerance);
    debug!(consumed, tolerance, limit, "compute limit estimated");
    Ok(limit)
}

/// `ceil(consumed * tolerance)`, saturating at the u32 boundary.
fn scale_limit(consumed: u64, tolerance: f64) -> u32 {
    let scaled = (consumed as f64 * tolerance).ceil();
    if scaled >= u32::MAX as f64 {
        u32::MAX
    } else {
        scaled as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_is_ceil_of_product() {
        assert_eq!(scale_limit(50_000, 1.1), 55_000);
        assert_eq!(scale_limit(100, 1.0), 100);
        // 333 * 1.1 = 366.3 -> 367
        assert_eq!(scale_limit(333, 1.1), 367);
    }

    #[test]
    fn scale_is_monotonic_in_tolerance() {
        let consumed = 123_456;
        let mut last = 0;
        for tolerance in [1.0, 1.05, 1.1, 1.2, 1.5, 2.0] {
            let limit = scale_limit(consumed, tolerance);
            assert!(limit >= last, "tolerance {tolerance} regressed");
            last = limit;
        }
    }

    #[test]
    fn scale_saturates_at_u32() {
        assert_eq!(scale_limit(u64::MAX, 2.0), u32::MAX);
    }
}

//! Bounded signature-status polling.

use std::time::Duration;

use solana_sdk::signature::Signature;
use solana_transaction_status::TransactionConfirmationStatus;
use tracing::{debug, warn};

use crate::{error::McSwapError, rpc, types::TxStatus};

/// Poll a signature's confirmation status every `interval_secs` seconds,
/// at most `max` times.
///
/// Resolves [`TxStatus::Finalized`] on finalized success,
/// [`TxStatus::Failed`] on a finalized on-chain error, and
/// [`TxStatus::TimedOut`] once the budget is spent — the loop always
/// terminates after `max * interval_secs` seconds. A failed status fetch
/// is logged and counts as a spent poll; it does not end the loop.
pub async fn poll_status(
    rpc_url: &str,
    signature: &Signature,
    max: u32,
    interval_secs: u64,
) -> Result<TxStatus, McSwapError> {
    let client = rpc::client(rpc_url);
    for attempt in 1..=max {
        tokio::time::sleep(Duration::from_secs(interval_secs)).await;

        match client.get_signature_statuses_with_history(&[*signature]).await {
            Ok(response) => {
                let status = response.value.into_iter().next().flatten();
                match status {
                    Some(status) => {
                        debug!(
                            attempt,
                            %signature,
                            confirmation = ?status.confirmation_status,
                            "signature status"
                        );
                        if matches!(
                            status.confirmation_status,
                            Some(TransactionConfirmationStatus::Finalized)
                        ) {
                            return Ok(match status.err {
                                Some(err) => TxStatus::Failed(err.to_string()),
                                None => TxStatus::Finalized,
                            });
                        }
                    }
                    None => debug!(attempt, %signature, "signature not yet known"),
                }
            }
            Err(e) => warn!(attempt, %signature, error = %e, "status fetch failed"),
        }
    }
    Ok(TxStatus::TimedOut {
        waited_secs: u64::from(max) * interval_secs,
    })
}

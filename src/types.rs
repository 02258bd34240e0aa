//! Shared value types for the assembly pipeline.

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use solana_sdk::transaction::VersionedTransaction;

use crate::error::McSwapError;

/// Urgency tier requested from the priority-fee estimation service.
///
/// `Extreme` is a caller-facing alias; it is normalized to `VeryHigh`
/// before any downstream use, so the estimation service never sees the
/// literal "Extreme".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriorityTier {
    Low,
    Medium,
    High,
    VeryHigh,
    Extreme,
}

impl Default for PriorityTier {
    fn default() -> Self {
        PriorityTier::Medium
    }
}

impl PriorityTier {
    /// Collapse the caller-facing alias onto its canonical tier.
    pub fn normalize(self) -> Self {
        match self {
            PriorityTier::Extreme => PriorityTier::VeryHigh,
            other => other,
        }
    }

    /// Wire string understood by the fee-estimation service.
    ///
    /// Normalizes first: there is no wire representation for `Extreme`.
    pub fn as_str(self) -> &'static str {
        match self.normalize() {
            PriorityTier::Low => "Low",
            PriorityTier::Medium => "Medium",
            PriorityTier::High => "High",
            PriorityTier::VeryHigh => "VeryHigh",
            PriorityTier::Extreme => unreachable!("normalized above"),
        }
    }
}

/// Result of a successful assembly, reduced as far as the request asked.
///
/// `serialize: false` yields `Transaction`; `serialize: true` yields
/// `Bytes`; `serialize + encode` yields `Base64`.
#[derive(Debug, Clone)]
pub enum TxArtifact {
    /// The compiled (and possibly signed) transaction object.
    Transaction(VersionedTransaction),
    /// Wire-format serialization of the transaction.
    Bytes(Vec<u8>),
    /// Base64 text encoding of the wire bytes.
    Base64(String),
}

impl TxArtifact {
    /// The contained transaction, when no reduction was requested.
    pub fn transaction(&self) -> Option<&VersionedTransaction> {
        match self {
            TxArtifact::Transaction(tx) => Some(tx),
            _ => None,
        }
    }

    /// Recover the wire bytes from any artifact form.
    pub fn to_bytes(&self) -> Result<Vec<u8>, McSwapError> {
        match self {
            TxArtifact::Transaction(tx) => bincode::serialize(tx)
                .map_err(|e| McSwapError::Compile(format!("serialize failed: {e}"))),
            TxArtifact::Bytes(bytes) => Ok(bytes.clone()),
            TxArtifact::Base64(text) => BASE64_STANDARD
                .decode(text)
                .map_err(|e| McSwapError::Compile(format!("base64 decode failed: {e}"))),
        }
    }
}

/// Terminal outcome of the bounded signature-status poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxStatus {
    /// Finalized without error.
    Finalized,
    /// Finalized with an on-chain error.
    Failed(String),
    /// The poll budget ran out before the signature finalized.
    TimedOut { waited_secs: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extreme_normalizes_to_very_high() {
        assert_eq!(PriorityTier::Extreme.normalize(), PriorityTier::VeryHigh);
        assert_eq!(PriorityTier::Extreme.as_str(), "VeryHigh");
    }

    #[test]
    fn canonical_tiers_are_stable() {
        assert_eq!(PriorityTier::Low.as_str(), "Low");
        assert_eq!(PriorityTier::Medium.as_str(), "Medium");
        assert_eq!(PriorityTier::High.as_str(), "High");
        assert_eq!(PriorityTier::VeryHigh.as_str(), "VeryHigh");
    }

    #[test]
    fn default_tier_is_medium() {
        assert_eq!(PriorityTier::default(), PriorityTier::Medium);
    }

    #[test]
    fn artifact_bytes_round_trip_through_base64() {
        let bytes = vec![7u8, 1, 2, 250];
        let encoded = TxArtifact::Base64(BASE64_STANDARD.encode(&bytes));
        assert_eq!(encoded.to_bytes().unwrap(), bytes);
    }
}

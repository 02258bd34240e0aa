//! Error types for the McSwap SDK
//!
//! Every fallible operation in the crate returns [`McSwapError`]. Variants
//! map one-to-one onto the failure classes a caller can meaningfully react
//! to: bad input caught before any network call, a simulation that proves
//! the transaction would fail on-chain, a fee-service problem, a plain
//! transport failure, or an on-chain state precondition that does not hold.

use thiserror::Error;

/// Error type covering the full assembly and catalog lifecycle.
#[derive(Error, Debug)]
pub enum McSwapError {
    /// A request field failed validation before any network call was made.
    ///
    /// Never retryable: the same input will fail the same way.
    #[error("configuration error: {0}")]
    Config(String),

    /// The simulated transaction would fail on-chain.
    ///
    /// Carries the program log output verbatim for diagnostics. Assembly
    /// aborts immediately on this error; no fee estimation or message
    /// compilation is attempted afterwards.
    #[error("simulation failed: {message}")]
    Simulation {
        message: String,
        /// Program log lines reported by the node, in emission order.
        logs: Vec<String>,
    },

    /// The priority-fee estimation service call failed or returned an
    /// unparseable response.
    #[error("fee estimation failed: {0}")]
    FeeEstimation(String),

    /// An underlying RPC call (blockhash fetch, account read, submission)
    /// failed or returned an absent result.
    ///
    /// No retry is performed here; retry policy belongs to the RPC
    /// transport, not this crate.
    #[error("rpc transport error: {0}")]
    Transport(String),

    /// An on-chain state precondition does not hold, or account data did
    /// not decode to the expected layout.
    ///
    /// Covers "no pending contract found", "pending contract already
    /// exists", and truncated/malformed account data.
    #[error("state error: {0}")]
    State(String),

    /// Message compilation failed (e.g. account-key overflow when
    /// resolving against lookup tables).
    #[error("message compile error: {0}")]
    Compile(String),

    /// Local signing failed.
    #[error("signing failed: {0}")]
    Signing(String),
}

impl McSwapError {
    /// Error category label for log fields.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Simulation { .. } => "simulation",
            Self::FeeEstimation(_) => "fee",
            Self::Transport(_) => "transport",
            Self::State(_) => "state",
            Self::Compile(_) => "compile",
            Self::Signing(_) => "signing",
        }
    }

    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config(reason.into())
    }

    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport(reason.into())
    }

    pub fn state(reason: impl Into<String>) -> Self {
        Self::State(reason.into())
    }
}

impl From<solana_client::client_error::ClientError> for McSwapError {
    fn from(err: solana_client::client_error::ClientError) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<solana_sdk::message::CompileError> for McSwapError {
    fn from(err: solana_sdk::message::CompileError) -> Self {
        Self::Compile(err.to_string())
    }
}

impl From<solana_sdk::signer::SignerError> for McSwapError {
    fn from(err: solana_sdk::signer::SignerError) -> Self {
        Self::Signing(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = McSwapError::config("missing rpc url");
        assert_eq!(err.to_string(), "configuration error: missing rpc url");

        let err = McSwapError::Simulation {
            message: "error during simulation".to_string(),
            logs: vec!["Program failed: insufficient funds".to_string()],
        };
        assert!(err.to_string().contains("error during simulation"));
    }

    #[test]
    fn categories_are_stable() {
        assert_eq!(McSwapError::config("x").category(), "config");
        assert_eq!(
            McSwapError::Simulation {
                message: String::new(),
                logs: vec![],
            }
            .category(),
            "simulation"
        );
        assert_eq!(McSwapError::transport("x").category(), "transport");
        assert_eq!(McSwapError::state("x").category(), "state");
    }
}

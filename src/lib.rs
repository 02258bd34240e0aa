//! McSwap client SDK
//!
//! Builds, fee-optimizes, and submits transactions against the McSwap
//! escrow programs: fungible tokens, NFTs, compressed NFTs, programmable
//! NFTs, and Metaplex Core assets.
//!
//! The per-standard builders in [`standards`] produce instruction lists;
//! [`tx::assemble`] turns any instruction list into a send-ready
//! versioned transaction — simulating for a compute-unit limit, pricing
//! it against the fee market, injecting both as budget instructions, and
//! optionally signing/serializing/encoding the result.

pub mod config;
pub mod error;
pub mod layout;
pub mod rpc;
pub mod standards;
pub mod state;
pub mod tx;
pub mod types;
pub mod units;

pub use config::ProgramConfig;
pub use error::McSwapError;
pub use tx::{assemble, poll_status, TxRequest};
pub use types::{PriorityTier, TxArtifact, TxStatus};

// Re-export commonly used types
pub use solana_sdk::{
    instruction::Instruction, pubkey::Pubkey, signature::Signature,
    transaction::VersionedTransaction,
};

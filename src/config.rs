//! Program identity configuration
//!
//! All on-chain identities the SDK talks to live in [`ProgramConfig`] and are
//! injected into the catalog builders at call time. [`ProgramConfig::default`]
//! returns the mainnet deployment; tests and alternative deployments build
//! their own value with distinct addresses.

use solana_sdk::{pubkey, pubkey::Pubkey};

/// On-chain identities for one deployment of the escrow programs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramConfig {
    /// Fungible (SPL<->SPL) escrow program.
    pub spl_program: Pubkey,
    /// NFT swap program.
    pub nft_program: Pubkey,
    /// Compressed-NFT swap program.
    pub cnft_program: Pubkey,
    /// Programmable-NFT swap program.
    pub pnft_program: Pubkey,
    /// Metaplex Core asset swap program.
    pub core_program: Pubkey,

    /// Protocol treasury receiving the lamport-denominated swap fee.
    pub treasury: Pubkey,
    /// Mint of the token in which the SPL program denominates its fee.
    pub fee_token_mint: Pubkey,

    /// Metaplex token-metadata program.
    pub metadata_program: Pubkey,
    /// Bubblegum program owning compressed-NFT trees.
    pub bubblegum_program: Pubkey,
    /// SPL account-compression program (cNFT merkle proofs).
    pub compression_program: Pubkey,
    /// SPL noop program used as the compression log wrapper.
    pub log_wrapper: Pubkey,
    /// Metaplex Core program (generic on-chain assets).
    pub mpl_core_program: Pubkey,
    /// Token auth rules program (programmable NFTs).
    pub rules_program: Pubkey,
    /// Shared rule-set account passed to pNFT transfers.
    pub rules_account: Pubkey,

    /// Pre-published lookup table covering the cNFT swap account set.
    pub cnft_lookup_table: Pubkey,
    /// Pre-published lookup table covering the SPL escrow account set.
    pub spl_lookup_table: Pubkey,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            spl_program: pubkey!("AAyM7XH9w7ApeSuEat8AwUW1AA7dBuj2vXv7SuUGpNUp"),
            nft_program: pubkey!("AyJBbGQzUQSvhivZnHMDCCk6eSLupkeBh4fvMAD8T4Xx"),
            cnft_program: pubkey!("6RUcK9T1hYAZGBxN82ERVDUi4vLAX4hN1zAyy3cU5jav"),
            pnft_program: pubkey!("2bY36scRMEUJHJToVGjJ2uY8PdSrRPr73siNwGbv1ZNT"),
            core_program: pubkey!("EYMc51BuTRTfc5XCYqSWW92risZvMP217N2VYaTdFMHh"),
            treasury: pubkey!("GUFxwDrsLzSQ27xxTVe4y9BARZ6cENWmjzwe8XPy7AKu"),
            fee_token_mint: pubkey!("AVm6WLmMuzdedAMjpXLYmSGjLLPPjjVWNuR6JJhJLWn3"),
            metadata_program: pubkey!("metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s"),
            bubblegum_program: pubkey!("BGUMAp9Gq7iTEuizy4pqaxsTyUCBK68MDfK752saRPUY"),
            compression_program: pubkey!("cmtDvXumGCrqC1Age74AVPhSRVXJMd8PJS91L8KbNCK"),
            log_wrapper: pubkey!("noopb9bkMVfRPU8AsbpTUg8AQkHtKwMYZiFUjNRtMmV"),
            mpl_core_program: pubkey!("CoREENxT6tW1HoK8ypY1SxRMZTcVPm7R94rH4PZNhX7d"),
            rules_program: pubkey!("auth9SigNpDKz4sJJ1DfCTuZrZNSAgh9sFD3rboVmgg"),
            rules_account: pubkey!("eBJLFYPxJmMGKuFwpDWkzxZeUrad92kZRC5BJLpzyT9"),
            cnft_lookup_table: pubkey!("6rztYc8onxK3FUku97XJrzvdZHqWavwx5xw8fB7QufCA"),
            spl_lookup_table: pubkey!("DnDkh579fNnBFUwLDeQWgfW6ukLMyt8DgLaVDVwecxmj"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_mainnet_deployment() {
        let config = ProgramConfig::default();
        assert_eq!(
            config.spl_program.to_string(),
            "AAyM7XH9w7ApeSuEat8AwUW1AA7dBuj2vXv7SuUGpNUp"
        );
        assert_eq!(
            config.treasury.to_string(),
            "GUFxwDrsLzSQ27xxTVe4y9BARZ6cENWmjzwe8XPy7AKu"
        );
    }

    #[test]
    fn injected_identities_are_distinct() {
        let config = ProgramConfig {
            spl_program: Pubkey::new_unique(),
            ..Default::default()
        };
        assert_ne!(config.spl_program, ProgramConfig::default().spl_program);
    }
}

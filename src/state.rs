//! On-chain account state records and their decoders.
//!
//! Each escrow program stores flat, fixed-offset account data: u8 flags,
//! little-endian u64 amounts, 32-byte keys. The structs here are snapshots;
//! only the on-chain programs ever mutate the accounts (state records are
//! created by a create instruction and closed when execute or cancel
//! succeeds).
//!
//! `LEN` constants double as the data-size filter for program-account
//! scans; the `*_OFFSET` constants are the memcmp anchor points for
//! sent/received queries.

use solana_sdk::pubkey::Pubkey;

use crate::{error::McSwapError, layout::ByteReader};

/// Program-state singleton for the lamport-fee programs (NFT, cNFT, pNFT,
/// Core).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramState {
    pub is_initialized: bool,
    /// Flat swap fee in lamports.
    pub fee_lamports: u64,
    /// Percentage of the fee routed to the dev treasury.
    pub dev_percentage: u8,
    pub dev_treasury: Pubkey,
    pub main_treasury: Pubkey,
}

impl ProgramState {
    pub const LEN: usize = 1 + 8 + 1 + 32 + 32;

    pub fn decode(data: &[u8]) -> Result<Self, McSwapError> {
        let mut reader = ByteReader::new(data);
        Ok(Self {
            is_initialized: reader.read_bool()?,
            fee_lamports: reader.read_u64()?,
            dev_percentage: reader.read_u8()?,
            dev_treasury: reader.read_pubkey()?,
            main_treasury: reader.read_pubkey()?,
        })
    }
}

/// Program-state singleton for the SPL escrow program, which denominates
/// its fee in a token instead of lamports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplProgramState {
    pub is_initialized: bool,
    /// Mint of the fee token.
    pub fee_token_mint: Pubkey,
    /// Flat swap fee in base units of the fee token.
    pub fee_tokens: u64,
    pub dev_percentage: u8,
    pub dev_treasury: Pubkey,
    pub main_treasury: Pubkey,
}

impl SplProgramState {
    pub const LEN: usize = 1 + 32 + 8 + 1 + 32 + 32;

    pub fn decode(data: &[u8]) -> Result<Self, McSwapError> {
        let mut reader = ByteReader::new(data);
        Ok(Self {
            is_initialized: reader.read_bool()?,
            fee_token_mint: reader.read_pubkey()?,
            fee_tokens: reader.read_u64()?,
            dev_percentage: reader.read_u8()?,
            dev_treasury: reader.read_pubkey()?,
            main_treasury: reader.read_pubkey()?,
        })
    }
}

/// Pending SPL<->SPL escrow contract.
///
/// Sides one and two are the initializer's deposit (escrowed in the temp
/// accounts); sides three and four are what the taker must bring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplSwapState {
    pub is_initialized: bool,
    /// Unix timestamp of contract creation.
    pub utime: u64,
    pub initializer: Pubkey,
    pub token1_mint: Pubkey,
    pub token1_amount: u64,
    pub temp_token1_account: Pubkey,
    pub token2_mint: Pubkey,
    pub token2_amount: u64,
    pub temp_token2_account: Pubkey,
    pub taker: Pubkey,
    pub token3_mint: Pubkey,
    pub token3_amount: u64,
    pub token4_mint: Pubkey,
    pub token4_amount: u64,
}

impl SplSwapState {
    pub const LEN: usize = 1 + 8 * 5 + 32 * 8;
    pub const INITIALIZER_OFFSET: usize = 1 + 8;
    pub const TAKER_OFFSET: usize = 1 + 8 + 32 + 32 + 8 + 32 + 32 + 8 + 32;

    pub fn decode(data: &[u8]) -> Result<Self, McSwapError> {
        let mut reader = ByteReader::new(data);
        Ok(Self {
            is_initialized: reader.read_bool()?,
            utime: reader.read_u64()?,
            initializer: reader.read_pubkey()?,
            token1_mint: reader.read_pubkey()?,
            token1_amount: reader.read_u64()?,
            temp_token1_account: reader.read_pubkey()?,
            token2_mint: reader.read_pubkey()?,
            token2_amount: reader.read_u64()?,
            temp_token2_account: reader.read_pubkey()?,
            taker: reader.read_pubkey()?,
            token3_mint: reader.read_pubkey()?,
            token3_amount: reader.read_u64()?,
            token4_mint: reader.read_pubkey()?,
            token4_amount: reader.read_u64()?,
        })
    }
}

/// Pending NFT swap contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NftSwapState {
    pub is_initialized: bool,
    pub utime: u64,
    /// True when the taker owes an NFT back; false for a pure sale.
    pub is_swap: bool,
    pub initializer: Pubkey,
    pub initializer_mint: Pubkey,
    pub temp_mint_account: Pubkey,
    pub taker: Pubkey,
    pub swap_mint: Pubkey,
    pub swap_lamports: u64,
    pub swap_token_mint: Pubkey,
    pub swap_tokens: u64,
}

impl NftSwapState {
    pub const LEN: usize = 1 + 8 + 1 + 32 * 6 + 8 * 2;
    pub const INITIALIZER_OFFSET: usize = 1 + 8 + 1;
    pub const TAKER_OFFSET: usize = 1 + 8 + 1 + 32 + 32 + 32;

    pub fn decode(data: &[u8]) -> Result<Self, McSwapError> {
        let mut reader = ByteReader::new(data);
        Ok(Self {
            is_initialized: reader.read_bool()?,
            utime: reader.read_u64()?,
            is_swap: reader.read_bool()?,
            initializer: reader.read_pubkey()?,
            initializer_mint: reader.read_pubkey()?,
            temp_mint_account: reader.read_pubkey()?,
            taker: reader.read_pubkey()?,
            swap_mint: reader.read_pubkey()?,
            swap_lamports: reader.read_u64()?,
            swap_token_mint: reader.read_pubkey()?,
            swap_tokens: reader.read_u64()?,
        })
    }
}

/// Pending compressed-NFT swap contract, including the merkle proof
/// anchors for both legs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CnftSwapState {
    pub is_initialized: bool,
    pub utime: u64,
    pub is_swap: bool,
    pub initializer: Pubkey,
    pub delegate: Pubkey,
    pub asset_id: Pubkey,
    pub merkle_tree: Pubkey,
    pub root: [u8; 32],
    pub data_hash: [u8; 32],
    pub creator_hash: [u8; 32],
    pub nonce: u64,
    pub swap_asset_id: Pubkey,
    pub swap_merkle_tree: Pubkey,
    pub swap_root: [u8; 32],
    pub swap_data_hash: [u8; 32],
    pub swap_creator_hash: [u8; 32],
    pub swap_nonce: u64,
    pub swap_leaf_owner: Pubkey,
    pub swap_delegate: Pubkey,
    pub swap_lamports: u64,
    pub swap_token_mint: Pubkey,
    pub swap_tokens: u64,
}

impl CnftSwapState {
    pub const LEN: usize = 2 + 8 * 5 + 32 * 15;
    pub const INITIALIZER_OFFSET: usize = 1 + 8 + 1;
    pub const SWAP_LEAF_OWNER_OFFSET: usize =
        1 + 8 + 1 + 32 * 7 + 8 + 32 * 5 + 8;

    pub fn decode(data: &[u8]) -> Result<Self, McSwapError> {
        let mut reader = ByteReader::new(data);
        Ok(Self {
            is_initialized: reader.read_bool()?,
            utime: reader.read_u64()?,
            is_swap: reader.read_bool()?,
            initializer: reader.read_pubkey()?,
            delegate: reader.read_pubkey()?,
            asset_id: reader.read_pubkey()?,
            merkle_tree: reader.read_pubkey()?,
            root: reader.read_bytes32()?,
            data_hash: reader.read_bytes32()?,
            creator_hash: reader.read_bytes32()?,
            nonce: reader.read_u64()?,
            swap_asset_id: reader.read_pubkey()?,
            swap_merkle_tree: reader.read_pubkey()?,
            swap_root: reader.read_bytes32()?,
            swap_data_hash: reader.read_bytes32()?,
            swap_creator_hash: reader.read_bytes32()?,
            swap_nonce: reader.read_u64()?,
            swap_leaf_owner: reader.read_pubkey()?,
            swap_delegate: reader.read_pubkey()?,
            swap_lamports: reader.read_u64()?,
            swap_token_mint: reader.read_pubkey()?,
            swap_tokens: reader.read_u64()?,
        })
    }
}

/// Pending programmable-NFT swap contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PnftSwapState {
    pub is_initialized: bool,
    pub utime: u64,
    pub is_swap: bool,
    pub initializer: Pubkey,
    pub initializer_mint: Pubkey,
    pub taker: Pubkey,
    pub swap_mint: Pubkey,
    pub swap_lamports: u64,
    pub swap_token_mint: Pubkey,
    pub swap_tokens: u64,
}

impl PnftSwapState {
    pub const LEN: usize = 1 + 8 + 1 + 32 * 5 + 8 * 2;
    pub const INITIALIZER_OFFSET: usize = 1 + 8 + 1;
    pub const TAKER_OFFSET: usize = 1 + 8 + 1 + 32 + 32;

    pub fn decode(data: &[u8]) -> Result<Self, McSwapError> {
        let mut reader = ByteReader::new(data);
        Ok(Self {
            is_initialized: reader.read_bool()?,
            utime: reader.read_u64()?,
            is_swap: reader.read_bool()?,
            initializer: reader.read_pubkey()?,
            initializer_mint: reader.read_pubkey()?,
            taker: reader.read_pubkey()?,
            swap_mint: reader.read_pubkey()?,
            swap_lamports: reader.read_u64()?,
            swap_token_mint: reader.read_pubkey()?,
            swap_tokens: reader.read_u64()?,
        })
    }
}

/// Pending Metaplex Core asset swap contract. Same shape as
/// [`PnftSwapState`] with asset addresses in place of mints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreSwapState {
    pub is_initialized: bool,
    pub utime: u64,
    pub is_swap: bool,
    pub initializer: Pubkey,
    pub initializer_asset: Pubkey,
    pub taker: Pubkey,
    pub swap_asset: Pubkey,
    pub swap_lamports: u64,
    pub swap_token_mint: Pubkey,
    pub swap_tokens: u64,
}

impl CoreSwapState {
    pub const LEN: usize = 1 + 8 + 1 + 32 * 5 + 8 * 2;
    pub const INITIALIZER_OFFSET: usize = 1 + 8 + 1;
    pub const TAKER_OFFSET: usize = 1 + 8 + 1 + 32 + 32;

    pub fn decode(data: &[u8]) -> Result<Self, McSwapError> {
        let mut reader = ByteReader::new(data);
        Ok(Self {
            is_initialized: reader.read_bool()?,
            utime: reader.read_u64()?,
            is_swap: reader.read_bool()?,
            initializer: reader.read_pubkey()?,
            initializer_asset: reader.read_pubkey()?,
            taker: reader.read_pubkey()?,
            swap_asset: reader.read_pubkey()?,
            swap_lamports: reader.read_u64()?,
            swap_token_mint: reader.read_pubkey()?,
            swap_tokens: reader.read_u64()?,
        })
    }
}

//! Compressed-NFT swaps.
//!
//! Compressed assets live as merkle leaves, so every movement needs the
//! leaf's proof path. Callers source proof data (root, hashes, nonce,
//! proof accounts) from a DAS-style indexer and pass it in; the builders
//! append proof accounts as trailing readonly metas, the way Bubblegum
//! transfers take them. Proofs go stale as trees churn: execute takes
//! fresh proof data for both legs rather than trusting what create saw.

use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program,
};
use spl_associated_token_account::get_associated_token_address;
use tracing::debug;

use crate::{
    config::ProgramConfig,
    error::McSwapError,
    layout::ByteWriter,
    rpc,
    state::CnftSwapState,
};

use super::{load_program_state, program_state_pda, require_no_pending, require_pending, swap_state_pda};

const IX_CREATE: u8 = 0;
const IX_EXECUTE: u8 = 1;
const IX_CANCEL: u8 = 2;

/// Proof material for one compressed asset, as returned by an indexer.
#[derive(Debug, Clone)]
pub struct CnftProof {
    pub asset_id: Pubkey,
    pub merkle_tree: Pubkey,
    pub root: [u8; 32],
    pub data_hash: [u8; 32],
    pub creator_hash: [u8; 32],
    /// Leaf index in the tree.
    pub nonce: u64,
    /// Proof path accounts, root-adjacent first.
    pub proof: Vec<Pubkey>,
}

/// Inputs to open a cNFT contract.
#[derive(Debug, Clone)]
pub struct CnftCreateArgs {
    pub initializer: Pubkey,
    /// The compressed asset being escrowed (delegated to the program).
    pub asset: CnftProof,
    /// Counterparty who may execute the contract.
    pub taker: Pubkey,
    /// Compressed asset requested back; `None` for a pure sale.
    pub swap_asset: Option<CnftProof>,
    pub swap_lamports: u64,
    pub swap_token_mint: Option<Pubkey>,
    pub swap_tokens: u64,
}

#[derive(Debug, Clone)]
pub struct CnftListing {
    pub address: Pubkey,
    pub state: CnftSwapState,
}

/// Bubblegum tree-authority PDA for a merkle tree.
pub fn tree_authority_pda(config: &ProgramConfig, merkle_tree: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[merkle_tree.as_ref()], &config.bubblegum_program).0
}

fn put_proof_fields(data: &mut ByteWriter, proof: &CnftProof) {
    data.put_pubkey(&proof.asset_id)
        .put_bytes32(&proof.root)
        .put_bytes32(&proof.data_hash)
        .put_bytes32(&proof.creator_hash)
        .put_u64(proof.nonce);
}

pub async fn create(
    rpc_url: &str,
    config: &ProgramConfig,
    args: &CnftCreateArgs,
) -> Result<Vec<Instruction>, McSwapError> {
    let counter_key = args
        .swap_asset
        .as_ref()
        .map(|a| a.asset_id)
        .unwrap_or(args.taker);
    let (swap_state, _) = swap_state_pda(&config.cnft_program, &args.asset.asset_id, &counter_key);
    require_no_pending(rpc_url, &swap_state).await?;
    let program_state = load_program_state(rpc_url, &config.cnft_program).await?;
    debug!(%swap_state, fee_lamports = program_state.fee_lamports, "opening cnft contract");

    let (state_pda, _) = program_state_pda(&config.cnft_program);

    let mut data = ByteWriter::with_capacity(1 + 1 + (32 * 4 + 8) * 2 + 32 + 8 + 8);
    data.put_u8(IX_CREATE).put_bool(args.swap_asset.is_some());
    put_proof_fields(&mut data, &args.asset);
    match &args.swap_asset {
        Some(counter) => {
            put_proof_fields(&mut data, counter);
            data.put_pubkey(&counter.merkle_tree);
        }
        None => {
            let empty = CnftProof {
                asset_id: Pubkey::default(),
                merkle_tree: Pubkey::default(),
                root: [0u8; 32],
                data_hash: [0u8; 32],
                creator_hash: [0u8; 32],
                nonce: 0,
                proof: Vec::new(),
            };
            put_proof_fields(&mut data, &empty);
            data.put_pubkey(&empty.merkle_tree);
        }
    }
    data.put_u64(args.swap_lamports).put_u64(args.swap_tokens);

    let mut accounts = vec![
        AccountMeta::new(args.initializer, true),
        AccountMeta::new_readonly(state_pda, false),
        AccountMeta::new(swap_state, false), // init
        AccountMeta::new_readonly(tree_authority_pda(config, &args.asset.merkle_tree), false),
        AccountMeta::new(args.asset.merkle_tree, false),
        AccountMeta::new_readonly(args.taker, false),
        AccountMeta::new_readonly(args.swap_token_mint.unwrap_or_default(), false),
        AccountMeta::new_readonly(config.bubblegum_program, false),
        AccountMeta::new_readonly(config.compression_program, false),
        AccountMeta::new_readonly(config.log_wrapper, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];
    accounts.extend(
        args.asset
            .proof
            .iter()
            .map(|node| AccountMeta::new_readonly(*node, false)),
    );

    Ok(vec![Instruction {
        program_id: config.cnft_program,
        accounts,
        data: data.into_bytes(),
    }])
}

/// Settle a pending contract. `asset` and `swap_asset` carry fresh proof
/// material for the escrowed leg and (when the contract is a two-way
/// swap) the taker's leg.
pub async fn execute(
    rpc_url: &str,
    config: &ProgramConfig,
    swap_state: &Pubkey,
    taker: &Pubkey,
    asset: &CnftProof,
    swap_asset: Option<&CnftProof>,
) -> Result<Vec<Instruction>, McSwapError> {
    let account = require_pending(rpc_url, swap_state).await?;
    let state = CnftSwapState::decode(&account.data)?;
    if state.swap_leaf_owner != *taker {
        return Err(McSwapError::state("pending contract names a different taker"));
    }
    if state.is_swap && swap_asset.is_none() {
        return Err(McSwapError::state(
            "contract is a two-way swap but no counter-asset proof was supplied",
        ));
    }
    let program_state = load_program_state(rpc_url, &config.cnft_program).await?;

    let mut data = ByteWriter::with_capacity(1 + (32 * 3 + 8) * 2);
    data.put_u8(IX_EXECUTE)
        .put_bytes32(&asset.root)
        .put_bytes32(&asset.data_hash)
        .put_bytes32(&asset.creator_hash)
        .put_u64(asset.nonce);
    if let Some(counter) = swap_asset {
        data.put_bytes32(&counter.root)
            .put_bytes32(&counter.data_hash)
            .put_bytes32(&counter.creator_hash)
            .put_u64(counter.nonce);
    }

    let mut accounts = vec![
        AccountMeta::new(*taker, true),
        AccountMeta::new(state.initializer, false),
        AccountMeta::new_readonly(program_state_pda(&config.cnft_program).0, false),
        AccountMeta::new(*swap_state, false), // closed on success
        AccountMeta::new_readonly(tree_authority_pda(config, &state.merkle_tree), false),
        AccountMeta::new(state.merkle_tree, false),
        AccountMeta::new(program_state.dev_treasury, false),
        AccountMeta::new(program_state.main_treasury, false),
        AccountMeta::new(
            get_associated_token_address(taker, &state.swap_token_mint),
            false,
        ),
        AccountMeta::new(
            get_associated_token_address(&state.initializer, &state.swap_token_mint),
            false,
        ),
        AccountMeta::new_readonly(config.bubblegum_program, false),
        AccountMeta::new_readonly(config.compression_program, false),
        AccountMeta::new_readonly(config.log_wrapper, false),
        AccountMeta::new_readonly(spl_token::id(), false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];
    if let Some(counter) = swap_asset {
        accounts.insert(
            6,
            AccountMeta::new_readonly(tree_authority_pda(config, &counter.merkle_tree), false),
        );
        accounts.insert(7, AccountMeta::new(counter.merkle_tree, false));
    }
    // proof paths: escrowed leg first, then the counter leg
    accounts.extend(
        asset
            .proof
            .iter()
            .map(|node| AccountMeta::new_readonly(*node, false)),
    );
    if let Some(counter) = swap_asset {
        accounts.extend(
            counter
                .proof
                .iter()
                .map(|node| AccountMeta::new_readonly(*node, false)),
        );
    }

    Ok(vec![Instruction {
        program_id: config.cnft_program,
        accounts,
        data: data.into_bytes(),
    }])
}

/// Reclaim the escrowed leaf delegation. `asset` must carry fresh proof
/// material for the escrowed asset.
pub async fn cancel(
    rpc_url: &str,
    config: &ProgramConfig,
    swap_state: &Pubkey,
    asset: &CnftProof,
) -> Result<Vec<Instruction>, McSwapError> {
    let account = require_pending(rpc_url, swap_state).await?;
    let state = CnftSwapState::decode(&account.data)?;

    let mut data = ByteWriter::with_capacity(1 + 32 * 3 + 8);
    data.put_u8(IX_CANCEL)
        .put_bytes32(&asset.root)
        .put_bytes32(&asset.data_hash)
        .put_bytes32(&asset.creator_hash)
        .put_u64(asset.nonce);

    let mut accounts = vec![
        AccountMeta::new(state.initializer, true),
        AccountMeta::new(*swap_state, false), // closed
        AccountMeta::new_readonly(tree_authority_pda(config, &state.merkle_tree), false),
        AccountMeta::new(state.merkle_tree, false),
        AccountMeta::new_readonly(config.bubblegum_program, false),
        AccountMeta::new_readonly(config.compression_program, false),
        AccountMeta::new_readonly(config.log_wrapper, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];
    accounts.extend(
        asset
            .proof
            .iter()
            .map(|node| AccountMeta::new_readonly(*node, false)),
    );

    Ok(vec![Instruction {
        program_id: config.cnft_program,
        accounts,
        data: data.into_bytes(),
    }])
}

pub async fn sent(
    rpc_url: &str,
    config: &ProgramConfig,
    wallet: &Pubkey,
) -> Result<Vec<CnftListing>, McSwapError> {
    listings(rpc_url, config, CnftSwapState::INITIALIZER_OFFSET, wallet).await
}

pub async fn received(
    rpc_url: &str,
    config: &ProgramConfig,
    wallet: &Pubkey,
) -> Result<Vec<CnftListing>, McSwapError> {
    listings(rpc_url, config, CnftSwapState::SWAP_LEAF_OWNER_OFFSET, wallet).await
}

async fn listings(
    rpc_url: &str,
    config: &ProgramConfig,
    offset: usize,
    wallet: &Pubkey,
) -> Result<Vec<CnftListing>, McSwapError> {
    let accounts = rpc::scan_program_accounts(
        rpc_url,
        &config.cnft_program,
        CnftSwapState::LEN as u64,
        offset,
        wallet.as_ref(),
    )
    .await?;
    accounts
        .into_iter()
        .map(|(address, account)| {
            Ok(CnftListing {
                address,
                state: CnftSwapState::decode(&account.data)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proof() -> CnftProof {
        CnftProof {
            asset_id: Pubkey::new_unique(),
            merkle_tree: Pubkey::new_unique(),
            root: [1u8; 32],
            data_hash: [2u8; 32],
            creator_hash: [3u8; 32],
            nonce: 42,
            proof: vec![Pubkey::new_unique(), Pubkey::new_unique()],
        }
    }

    #[test]
    fn tree_authority_is_keyed_by_tree() {
        let config = ProgramConfig::default();
        let a = tree_authority_pda(&config, &Pubkey::new_unique());
        let b = tree_authority_pda(&config, &Pubkey::new_unique());
        assert_ne!(a, b);
    }

    #[test]
    fn create_payload_carries_both_legs() {
        let asset = proof();
        let mut data = ByteWriter::with_capacity(256);
        data.put_u8(IX_CREATE).put_bool(true);
        put_proof_fields(&mut data, &asset);
        let bytes = data.into_bytes();
        // disc + flag + asset_id + three hashes + nonce
        assert_eq!(bytes.len(), 1 + 1 + 32 * 4 + 8);
        assert_eq!(bytes[2..34], asset.asset_id.to_bytes());
        assert_eq!(bytes[34..66], [1u8; 32]);
        assert_eq!(
            u64::from_le_bytes(bytes[130..138].try_into().unwrap()),
            42
        );
    }
}

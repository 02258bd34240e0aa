//! Metaplex Core asset swaps.
//!
//! Core assets are single accounts owned by the Core program, so escrow
//! is plain: create transfers the asset to the contract PDA, execute and
//! cancel transfer it back out via CPI into the Core program.

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
    state::CoreSwapState,
};

use super::{load_program_state, program_state_pda, require_no_pending, require_pending, swap_state_pda};

const IX_CREATE: u8 = 0;
const IX_EXECUTE: u8 = 1;
const IX_CANCEL: u8 = 2;

/// Inputs to open a Core asset contract.
#[derive(Debug, Clone)]
pub struct CoreCreateArgs {
    pub initializer: Pubkey,
    /// The Core asset being escrowed.
    pub initializer_asset: Pubkey,
    pub taker: Pubkey,
    /// Core asset requested back; `None` for a pure sale.
    pub swap_asset: Option<Pubkey>,
    pub swap_lamports: u64,
    pub swap_token_mint: Option<Pubkey>,
    pub swap_tokens: u64,
}

#[derive(Debug, Clone)]
pub struct CoreListing {
    pub address: Pubkey,
    pub state: CoreSwapState,
}

pub async fn create(
    rpc_url: &str,
    config: &ProgramConfig,
    args: &CoreCreateArgs,
) -> Result<Vec<Instruction>, McSwapError> {
    let (swap_state, _) =
        swap_state_pda(&config.core_program, &args.initializer_asset, &args.taker);
    require_no_pending(rpc_url, &swap_state).await?;
    let program_state = load_program_state(rpc_url, &config.core_program).await?;
    debug!(%swap_state, fee_lamports = program_state.fee_lamports, "opening core contract");

    let (state_pda, _) = program_state_pda(&config.core_program);

    let mut data = ByteWriter::with_capacity(1 + 1 + 8 + 8);
    data.put_u8(IX_CREATE)
        .put_bool(args.swap_asset.is_some())
        .put_u64(args.swap_lamports)
        .put_u64(args.swap_tokens);

    let ix = Instruction {
        program_id: config.core_program,
        accounts: vec![
            AccountMeta::new(args.initializer, true),
            AccountMeta::new_readonly(state_pda, false),
            AccountMeta::new(swap_state, false), // init, becomes asset owner
            AccountMeta::new(args.initializer_asset, false),
            AccountMeta::new_readonly(args.taker, false),
            AccountMeta::new_readonly(args.swap_asset.unwrap_or_default(), false),
            AccountMeta::new_readonly(args.swap_token_mint.unwrap_or_default(), false),
            AccountMeta::new_readonly(config.mpl_core_program, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: data.into_bytes(),
    };
    Ok(vec![ix])
}

pub async fn execute(
    rpc_url: &str,
    config: &ProgramConfig,
    initializer_asset: &Pubkey,
    taker: &Pubkey,
) -> Result<Vec<Instruction>, McSwapError> {
    let (swap_state, _) = swap_state_pda(&config.core_program, initializer_asset, taker);
    let account = require_pending(rpc_url, &swap_state).await?;
    let state = CoreSwapState::decode(&account.data)?;
    if state.taker != *taker {
        return Err(McSwapError::state("pending contract names a different taker"));
    }
    let program_state = load_program_state(rpc_url, &config.core_program).await?;

    let ix = Instruction {
        program_id: config.core_program,
        accounts: vec![
            AccountMeta::new(*taker, true),
            AccountMeta::new(state.initializer, false),
            AccountMeta::new_readonly(program_state_pda(&config.core_program).0, false),
            AccountMeta::new(swap_state, false), // closed on success
            AccountMeta::new(state.initializer_asset, false),
            AccountMeta::new(state.swap_asset, false),
            AccountMeta::new(
                get_associated_token_address(taker, &state.swap_token_mint),
                false,
            ),
            AccountMeta::new(
                get_associated_token_address(&state.initializer, &state.swap_token_mint),
                false,
            ),
            AccountMeta::new(program_state.dev_treasury, false),
            AccountMeta::new(program_state.main_treasury, false),
            AccountMeta::new_readonly(config.mpl_core_program, false),
            AccountMeta::new_readonly(spl_token::id(), false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: vec![IX_EXECUTE],
    };
    Ok(vec![ix])
}

pub async fn cancel(
    rpc_url: &str,
    config: &ProgramConfig,
    initializer_asset: &Pubkey,
    taker: &Pubkey,
) -> Result<Vec<Instruction>, McSwapError> {
    let (swap_state, _) = swap_state_pda(&config.core_program, initializer_asset, taker);
    let account = require_pending(rpc_url, &swap_state).await?;
    let state = CoreSwapState::decode(&account.data)?;

    let ix = Instruction {
        program_id: config.core_program,
        accounts: vec![
            AccountMeta::new(state.initializer, true),
            AccountMeta::new(swap_state, false), // closed
            AccountMeta::new(state.initializer_asset, false),
            AccountMeta::new_readonly(config.mpl_core_program, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: vec![IX_CANCEL],
    };
    Ok(vec![ix])
}

pub async fn sent(
    rpc_url: &str,
    config: &ProgramConfig,
    wallet: &Pubkey,
) -> Result<Vec<CoreListing>, McSwapError> {
    listings(rpc_url, config, CoreSwapState::INITIALIZER_OFFSET, wallet).await
}

pub async fn received(
    rpc_url: &str,
    config: &ProgramConfig,
    wallet: &Pubkey,
) -> Result<Vec<CoreListing>, McSwapError> {
    listings(rpc_url, config, CoreSwapState::TAKER_OFFSET, wallet).await
}

async fn listings(
    rpc_url: &str,
    config: &ProgramConfig,
    offset: usize,
    wallet: &Pubkey,
) -> Result<Vec<CoreListing>, McSwapError> {
    let accounts = rpc::scan_program_accounts(
        rpc_url,
        &config.core_program,
        CoreSwapState::LEN as u64,
        offset,
        wallet.as_ref(),
    )
    .await?;
    accounts
        .into_iter()
        .map(|(address, account)| {
            Ok(CoreListing {
                address,
                state: CoreSwapState::decode(&account.data)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_distinguishes_sale_from_swap() {
        let mut sale = ByteWriter::with_capacity(18);
        sale.put_u8(IX_CREATE).put_bool(false).put_u64(5).put_u64(0);
        let mut swap = ByteWriter::with_capacity(18);
        swap.put_u8(IX_CREATE).put_bool(true).put_u64(5).put_u64(0);
        assert_ne!(sale.into_bytes(), swap.into_bytes());
    }

    #[test]
    fn settle_and_reclaim_payloads_are_bare_discriminators() {
        assert_eq!(vec![IX_EXECUTE], [1u8].to_vec());
        assert_eq!(vec![IX_CANCEL], [2u8].to_vec());
    }
}

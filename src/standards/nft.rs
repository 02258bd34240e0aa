//! NFT swaps: one escrowed NFT against lamports, tokens, and/or another
//! NFT.
//!
//! `swap_mint: None` makes the contract a pure sale (`is_swap = 0`): the
//! taker pays the lamport/token side only.

use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program,
};
use spl_associated_token_account::{
    get_associated_token_address, instruction::create_associated_token_account_idempotent,
};
use tracing::debug;

use crate::{
    config::ProgramConfig,
    error::McSwapError,
    layout::ByteWriter,
    rpc,
    state::NftSwapState,
};

use super::{
    escrow_pda, load_program_state, program_state_pda, require_no_pending, require_pending,
    swap_state_pda,
};

const IX_CREATE: u8 = 0;
const IX_EXECUTE: u8 = 1;
const IX_CANCEL: u8 = 2;

/// Inputs to open an NFT contract.
#[derive(Debug, Clone)]
pub struct NftCreateArgs {
    pub initializer: Pubkey,
    /// The NFT the initializer escrows.
    pub initializer_mint: Pubkey,
    pub taker: Pubkey,
    /// NFT requested back from the taker; `None` for a pure sale.
    pub swap_mint: Option<Pubkey>,
    /// Lamports requested from the taker.
    pub swap_lamports: u64,
    /// Token payment requested from the taker, if any.
    pub swap_token_mint: Option<Pubkey>,
    pub swap_tokens: u64,
}

#[derive(Debug, Clone)]
pub struct NftListing {
    pub address: Pubkey,
    pub state: NftSwapState,
}

pub async fn create(
    rpc_url: &str,
    config: &ProgramConfig,
    args: &NftCreateArgs,
) -> Result<Vec<Instruction>, McSwapError> {
    let (swap_state, _) = swap_state_pda(&config.nft_program, &args.initializer_mint, &args.taker);
    require_no_pending(rpc_url, &swap_state).await?;
    let program_state = load_program_state(rpc_url, &config.nft_program).await?;
    debug!(%swap_state, fee_lamports = program_state.fee_lamports, "opening nft contract");

    let swap_mint = args.swap_mint.unwrap_or_default();
    let swap_token_mint = args.swap_token_mint.unwrap_or_default();
    let (state_pda, _) = program_state_pda(&config.nft_program);
    let (temp_mint_account, _) =
        escrow_pda(&config.nft_program, &swap_state, &args.initializer_mint);

    let mut data = ByteWriter::with_capacity(1 + 1 + 8 + 8);
    data.put_u8(IX_CREATE)
        .put_bool(args.swap_mint.is_some())
        .put_u64(args.swap_lamports)
        .put_u64(args.swap_tokens);

    let ix = Instruction {
        program_id: config.nft_program,
        accounts: vec![
            AccountMeta::new(args.initializer, true),
            AccountMeta::new_readonly(state_pda, false),
            AccountMeta::new(swap_state, false), // init
            AccountMeta::new(temp_mint_account, false), // init escrow
            AccountMeta::new(
                get_associated_token_address(&args.initializer, &args.initializer_mint),
                false,
            ),
            AccountMeta::new_readonly(args.initializer_mint, false),
            AccountMeta::new_readonly(args.taker, false),
            AccountMeta::new_readonly(swap_mint, false),
            AccountMeta::new_readonly(swap_token_mint, false),
            AccountMeta::new_readonly(spl_token::id(), false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: data.into_bytes(),
    };
    Ok(vec![ix])
}

pub async fn execute(
    rpc_url: &str,
    config: &ProgramConfig,
    initializer_mint: &Pubkey,
    taker: &Pubkey,
) -> Result<Vec<Instruction>, McSwapError> {
    let (swap_state, _) = swap_state_pda(&config.nft_program, initializer_mint, taker);
    let account = require_pending(rpc_url, &swap_state).await?;
    let state = NftSwapState::decode(&account.data)?;
    if state.taker != *taker {
        return Err(McSwapError::state("pending contract names a different taker"));
    }
    let program_state = load_program_state(rpc_url, &config.nft_program).await?;

    let mut instructions = Vec::with_capacity(3);
    // taker receives the escrowed NFT into a fresh ATA if needed
    instructions.push(create_associated_token_account_idempotent(
        taker,
        taker,
        &state.initializer_mint,
        &spl_token::id(),
    ));
    if state.is_swap {
        instructions.push(create_associated_token_account_idempotent(
            taker,
            &state.initializer,
            &state.swap_mint,
            &spl_token::id(),
        ));
    }

    let (state_pda, _) = program_state_pda(&config.nft_program);
    let ix = Instruction {
        program_id: config.nft_program,
        accounts: vec![
            AccountMeta::new(*taker, true),
            AccountMeta::new(state.initializer, false),
            AccountMeta::new_readonly(state_pda, false),
            AccountMeta::new(swap_state, false), // closed on success
            AccountMeta::new(state.temp_mint_account, false),
            AccountMeta::new(
                get_associated_token_address(taker, &state.initializer_mint),
                false,
            ),
            AccountMeta::new(
                get_associated_token_address(taker, &state.swap_mint),
                false,
            ),
            AccountMeta::new(
                get_associated_token_address(&state.initializer, &state.swap_mint),
                false,
            ),
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
            AccountMeta::new_readonly(state.initializer_mint, false),
            AccountMeta::new_readonly(state.swap_mint, false),
            AccountMeta::new_readonly(spl_token::id(), false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: vec![IX_EXECUTE],
    };
    instructions.push(ix);
    Ok(instructions)
}

pub async fn cancel(
    rpc_url: &str,
    config: &ProgramConfig,
    initializer_mint: &Pubkey,
    taker: &Pubkey,
) -> Result<Vec<Instruction>, McSwapError> {
    let (swap_state, _) = swap_state_pda(&config.nft_program, initializer_mint, taker);
    let account = require_pending(rpc_url, &swap_state).await?;
    let state = NftSwapState::decode(&account.data)?;

    let ix = Instruction {
        program_id: config.nft_program,
        accounts: vec![
            AccountMeta::new(state.initializer, true),
            AccountMeta::new(swap_state, false), // closed
            AccountMeta::new(state.temp_mint_account, false),
            AccountMeta::new(
                get_associated_token_address(&state.initializer, &state.initializer_mint),
                false,
            ),
            AccountMeta::new_readonly(state.initializer_mint, false),
            AccountMeta::new_readonly(spl_token::id(), false),
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
) -> Result<Vec<NftListing>, McSwapError> {
    listings(rpc_url, config, NftSwapState::INITIALIZER_OFFSET, wallet).await
}

pub async fn received(
    rpc_url: &str,
    config: &ProgramConfig,
    wallet: &Pubkey,
) -> Result<Vec<NftListing>, McSwapError> {
    listings(rpc_url, config, NftSwapState::TAKER_OFFSET, wallet).await
}

async fn listings(
    rpc_url: &str,
    config: &ProgramConfig,
    offset: usize,
    wallet: &Pubkey,
) -> Result<Vec<NftListing>, McSwapError> {
    let accounts = rpc::scan_program_accounts(
        rpc_url,
        &config.nft_program,
        NftSwapState::LEN as u64,
        offset,
        wallet.as_ref(),
    )
    .await?;
    accounts
        .into_iter()
        .map(|(address, account)| {
            Ok(NftListing {
                address,
                state: NftSwapState::decode(&account.data)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_payload_flags_pure_sale() {
        let mut data = ByteWriter::with_capacity(18);
        data.put_u8(IX_CREATE)
            .put_bool(false)
            .put_u64(1_000_000_000)
            .put_u64(0);
        let bytes = data.into_bytes();
        assert_eq!(bytes.len(), 18);
        assert_eq!(bytes[1], 0); // sale, not swap
        assert_eq!(
            u64::from_le_bytes(bytes[2..10].try_into().unwrap()),
            1_000_000_000
        );
    }

    #[test]
    fn swap_state_keyed_by_mint_and_taker() {
        let config = ProgramConfig::default();
        let mint = Pubkey::new_unique();
        let taker = Pubkey::new_unique();
        let (a, _) = swap_state_pda(&config.nft_program, &mint, &taker);
        let (b, _) = swap_state_pda(&config.nft_program, &mint, &Pubkey::new_unique());
        assert_ne!(a, b);
    }
}

//! Fungible (SPL<->SPL) escrow swaps.
//!
//! A contract escrows up to two token legs from the initializer and names
//! up to two legs the taker must bring. Unused legs carry the default
//! pubkey as a null mint and amount zero. The program's fee is
//! denominated in its fee token and settled through associated token
//! accounts at execution.

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
    state::SplSwapState,
};

use super::{
    escrow_pda, program_state_pda, require_no_pending, require_pending, swap_state_pda,
    load_spl_program_state,
};

const IX_CREATE: u8 = 0;
const IX_EXECUTE: u8 = 1;
const IX_CANCEL: u8 = 2;

/// Null-mint sentinel for an unused leg.
pub const NULL_MINT: Pubkey = Pubkey::new_from_array([0u8; 32]);

/// Inputs to open a fungible escrow contract.
#[derive(Debug, Clone)]
pub struct SplCreateArgs {
    pub initializer: Pubkey,
    pub taker: Pubkey,
    /// First escrowed leg (required).
    pub token1_mint: Pubkey,
    pub token1_amount: u64,
    /// Optional second escrowed leg.
    pub token2_mint: Option<Pubkey>,
    pub token2_amount: u64,
    /// First requested leg (required).
    pub token3_mint: Pubkey,
    pub token3_amount: u64,
    /// Optional second requested leg.
    pub token4_mint: Option<Pubkey>,
    pub token4_amount: u64,
}

/// A pending contract surfaced by [`sent`] or [`received`].
#[derive(Debug, Clone)]
pub struct SplListing {
    pub address: Pubkey,
    pub state: SplSwapState,
}

/// Build the instructions opening a contract. Fails with a state error if
/// the pair already has one pending.
pub async fn create(
    rpc_url: &str,
    config: &ProgramConfig,
    args: &SplCreateArgs,
) -> Result<Vec<Instruction>, McSwapError> {
    let (swap_state, _) = swap_state_pda(&config.spl_program, &args.initializer, &args.taker);
    require_no_pending(rpc_url, &swap_state).await?;
    let program_state = load_spl_program_state(rpc_url, &config.spl_program).await?;
    debug!(%swap_state, fee_tokens = program_state.fee_tokens, "opening spl contract");

    let token2_mint = args.token2_mint.unwrap_or(NULL_MINT);
    let token4_mint = args.token4_mint.unwrap_or(NULL_MINT);
    let (state_pda, _) = program_state_pda(&config.spl_program);
    let (temp_token1, _) = escrow_pda(&config.spl_program, &swap_state, &args.token1_mint);
    let (temp_token2, _) = escrow_pda(&config.spl_program, &swap_state, &token2_mint);

    let mut data = ByteWriter::with_capacity(1 + 8 * 4);
    data.put_u8(IX_CREATE)
        .put_u64(args.token1_amount)
        .put_u64(args.token2_amount)
        .put_u64(args.token3_amount)
        .put_u64(args.token4_amount);

    let ix = Instruction {
        program_id: config.spl_program,
        accounts: vec![
            AccountMeta::new(args.initializer, true),
            AccountMeta::new_readonly(state_pda, false),
            AccountMeta::new(swap_state, false), // init
            AccountMeta::new(temp_token1, false), // init escrow
            AccountMeta::new(temp_token2, false), // init escrow (null leg ok)
            AccountMeta::new(
                get_associated_token_address(&args.initializer, &args.token1_mint),
                false,
            ),
            AccountMeta::new(
                get_associated_token_address(&args.initializer, &token2_mint),
                false,
            ),
            AccountMeta::new(
                get_associated_token_address(&args.initializer, &program_state.fee_token_mint),
                false,
            ),
            AccountMeta::new(
                get_associated_token_address(
                    &program_state.dev_treasury,
                    &program_state.fee_token_mint,
                ),
                false,
            ),
            AccountMeta::new(
                get_associated_token_address(
                    &program_state.main_treasury,
                    &program_state.fee_token_mint,
                ),
                false,
            ),
            AccountMeta::new_readonly(args.taker, false),
            AccountMeta::new_readonly(args.token1_mint, false),
            AccountMeta::new_readonly(token2_mint, false),
            AccountMeta::new_readonly(args.token3_mint, false),
            AccountMeta::new_readonly(token4_mint, false),
            AccountMeta::new_readonly(spl_token::id(), false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: data.into_bytes(),
    };
    Ok(vec![ix])
}

/// Build the instructions settling a contract from the taker's side.
/// Companion ATA-creation instructions (idempotent) come first so every
/// receiving account exists when the program transfers into it.
pub async fn execute(
    rpc_url: &str,
    config: &ProgramConfig,
    initializer: &Pubkey,
    taker: &Pubkey,
) -> Result<Vec<Instruction>, McSwapError> {
    let (swap_state, _) = swap_state_pda(&config.spl_program, initializer, taker);
    let account = require_pending(rpc_url, &swap_state).await?;
    let state = SplSwapState::decode(&account.data)?;
    if state.taker != *taker {
        return Err(McSwapError::state("pending contract names a different taker"));
    }
    let program_state = load_spl_program_state(rpc_url, &config.spl_program).await?;

    let mut instructions = Vec::with_capacity(5);
    // receiving side of each live leg
    instructions.push(create_associated_token_account_idempotent(
        taker,
        taker,
        &state.token1_mint,
        &spl_token::id(),
    ));
    if state.token2_mint != NULL_MINT {
        instructions.push(create_associated_token_account_idempotent(
            taker,
            taker,
            &state.token2_mint,
            &spl_token::id(),
        ));
    }
    instructions.push(create_associated_token_account_idempotent(
        taker,
        initializer,
        &state.token3_mint,
        &spl_token::id(),
    ));
    if state.token4_mint != NULL_MINT {
        instructions.push(create_associated_token_account_idempotent(
            taker,
            initializer,
            &state.token4_mint,
            &spl_token::id(),
        ));
    }

    let (state_pda, _) = program_state_pda(&config.spl_program);
    let ix = Instruction {
        program_id: config.spl_program,
        accounts: vec![
            AccountMeta::new(*taker, true),
            AccountMeta::new(*initializer, false),
            AccountMeta::new_readonly(state_pda, false),
            AccountMeta::new(swap_state, false), // closed on success
            AccountMeta::new(state.temp_token1_account, false),
            AccountMeta::new(state.temp_token2_account, false),
            AccountMeta::new(
                get_associated_token_address(taker, &state.token1_mint),
                false,
            ),
            AccountMeta::new(
                get_associated_token_address(taker, &state.token2_mint),
                false,
            ),
            AccountMeta::new(
                get_associated_token_address(taker, &state.token3_mint),
                false,
            ),
            AccountMeta::new(
                get_associated_token_address(taker, &state.token4_mint),
                false,
            ),
            AccountMeta::new(
                get_associated_token_address(initializer, &state.token3_mint),
                false,
            ),
            AccountMeta::new(
                get_associated_token_address(initializer, &state.token4_mint),
                false,
            ),
            AccountMeta::new(
                get_associated_token_address(taker, &program_state.fee_token_mint),
                false,
            ),
            AccountMeta::new(
                get_associated_token_address(
                    &program_state.dev_treasury,
                    &program_state.fee_token_mint,
                ),
                false,
            ),
            AccountMeta::new(
                get_associated_token_address(
                    &program_state.main_treasury,
                    &program_state.fee_token_mint,
                ),
                false,
            ),
            AccountMeta::new_readonly(spl_token::id(), false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: vec![IX_EXECUTE],
    };
    instructions.push(ix);
    Ok(instructions)
}

/// Build the instruction reclaiming an open contract's escrow.
pub async fn cancel(
    rpc_url: &str,
    config: &ProgramConfig,
    initializer: &Pubkey,
    taker: &Pubkey,
) -> Result<Vec<Instruction>, McSwapError> {
    let (swap_state, _) = swap_state_pda(&config.spl_program, initializer, taker);
    let account = require_pending(rpc_url, &swap_state).await?;
    let state = SplSwapState::decode(&account.data)?;
    if state.initializer != *initializer {
        return Err(McSwapError::state(
            "pending contract names a different initializer",
        ));
    }

    let ix = Instruction {
        program_id: config.spl_program,
        accounts: vec![
            AccountMeta::new(*initializer, true),
            AccountMeta::new(swap_state, false), // closed
            AccountMeta::new(state.temp_token1_account, false),
            AccountMeta::new(state.temp_token2_account, false),
            AccountMeta::new(
                get_associated_token_address(initializer, &state.token1_mint),
                false,
            ),
            AccountMeta::new(
                get_associated_token_address(initializer, &state.token2_mint),
                false,
            ),
            AccountMeta::new_readonly(spl_token::id(), false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: vec![IX_CANCEL],
    };
    Ok(vec![ix])
}

/// Contracts `wallet` has opened and not yet settled.
pub async fn sent(
    rpc_url: &str,
    config: &ProgramConfig,
    wallet: &Pubkey,
) -> Result<Vec<SplListing>, McSwapError> {
    listings(rpc_url, config, SplSwapState::INITIALIZER_OFFSET, wallet).await
}

/// Contracts naming `wallet` as taker.
pub async fn received(
    rpc_url: &str,
    config: &ProgramConfig,
    wallet: &Pubkey,
) -> Result<Vec<SplListing>, McSwapError> {
    listings(rpc_url, config, SplSwapState::TAKER_OFFSET, wallet).await
}

async fn listings(
    rpc_url: &str,
    config: &ProgramConfig,
    offset: usize,
    wallet: &Pubkey,
) -> Result<Vec<SplListing>, McSwapError> {
    let accounts = rpc::scan_program_accounts(
        rpc_url,
        &config.spl_program,
        SplSwapState::LEN as u64,
        offset,
        wallet.as_ref(),
    )
    .await?;
    accounts
        .into_iter()
        .map(|(address, account)| {
            Ok(SplListing {
                address,
                state: SplSwapState::decode(&account.data)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> SplCreateArgs {
        SplCreateArgs {
            initializer: Pubkey::new_unique(),
            taker: Pubkey::new_unique(),
            token1_mint: Pubkey::new_unique(),
            token1_amount: 5_000,
            token2_mint: None,
            token2_amount: 0,
            token3_mint: Pubkey::new_unique(),
            token3_amount: 250,
            token4_mint: None,
            token4_amount: 0,
        }
    }

    #[test]
    fn create_payload_layout() {
        let args = args();
        let mut data = ByteWriter::with_capacity(33);
        data.put_u8(IX_CREATE)
            .put_u64(args.token1_amount)
            .put_u64(args.token2_amount)
            .put_u64(args.token3_amount)
            .put_u64(args.token4_amount);
        let bytes = data.into_bytes();
        assert_eq!(bytes.len(), 33);
        assert_eq!(bytes[0], IX_CREATE);
        assert_eq!(u64::from_le_bytes(bytes[1..9].try_into().unwrap()), 5_000);
        assert_eq!(u64::from_le_bytes(bytes[17..25].try_into().unwrap()), 250);
    }

    #[test]
    fn null_mint_is_default_pubkey() {
        assert_eq!(NULL_MINT, Pubkey::default());
    }

    #[test]
    fn escrow_pda_varies_with_mint() {
        let program = Pubkey::new_unique();
        let swap_state = Pubkey::new_unique();
        let (a, _) = escrow_pda(&program, &swap_state, &Pubkey::new_unique());
        let (b, _) = escrow_pda(&program, &swap_state, &Pubkey::new_unique());
        assert_ne!(a, b);
    }
}

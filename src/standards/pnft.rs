//! Programmable-NFT swaps.
//!
//! pNFTs cannot leave their owner's token account freely, so the escrow
//! works by delegation: create hands the program a transfer delegate on
//! the initializer's ATA, and execution moves both legs under the token
//! auth rules. Every builder threads the Metaplex metadata accounts
//! (metadata, master edition, token record) plus the shared rule set.

use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program, sysvar,
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
    state::PnftSwapState,
};

use super::{load_program_state, program_state_pda, require_no_pending, require_pending, swap_state_pda};

const IX_CREATE: u8 = 0;
const IX_EXECUTE: u8 = 1;
const IX_CANCEL: u8 = 2;

/// Inputs to open a pNFT contract.
#[derive(Debug, Clone)]
pub struct PnftCreateArgs {
    pub initializer: Pubkey,
    pub initializer_mint: Pubkey,
    pub taker: Pubkey,
    /// pNFT requested back; `None` for a pure sale.
    pub swap_mint: Option<Pubkey>,
    pub swap_lamports: u64,
    pub swap_token_mint: Option<Pubkey>,
    pub swap_tokens: u64,
}

#[derive(Debug, Clone)]
pub struct PnftListing {
    pub address: Pubkey,
    pub state: PnftSwapState,
}

/// Metaplex metadata PDA for a mint.
pub fn metadata_pda(config: &ProgramConfig, mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[b"metadata", config.metadata_program.as_ref(), mint.as_ref()],
        &config.metadata_program,
    )
    .0
}

/// Metaplex master-edition PDA for a mint.
pub fn edition_pda(config: &ProgramConfig, mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[
            b"metadata",
            config.metadata_program.as_ref(),
            mint.as_ref(),
            b"edition",
        ],
        &config.metadata_program,
    )
    .0
}

/// Token-record PDA binding a pNFT mint to one token account.
pub fn token_record_pda(config: &ProgramConfig, mint: &Pubkey, token_account: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[
            b"metadata",
            config.metadata_program.as_ref(),
            mint.as_ref(),
            b"token_record",
            token_account.as_ref(),
        ],
        &config.metadata_program,
    )
    .0
}

fn pnft_meta_accounts(config: &ProgramConfig, mint: &Pubkey, owner: &Pubkey) -> [AccountMeta; 3] {
    let ata = get_associated_token_address(owner, mint);
    [
        AccountMeta::new(metadata_pda(config, mint), false),
        AccountMeta::new_readonly(edition_pda(config, mint), false),
        AccountMeta::new(token_record_pda(config, mint, &ata), false),
    ]
}

pub async fn create(
    rpc_url: &str,
    config: &ProgramConfig,
    args: &PnftCreateArgs,
) -> Result<Vec<Instruction>, McSwapError> {
    let (swap_state, _) =
        swap_state_pda(&config.pnft_program, &args.initializer_mint, &args.taker);
    require_no_pending(rpc_url, &swap_state).await?;
    let program_state = load_program_state(rpc_url, &config.pnft_program).await?;
    debug!(%swap_state, fee_lamports = program_state.fee_lamports, "opening pnft contract");

    let swap_mint = args.swap_mint.unwrap_or_default();
    let swap_token_mint = args.swap_token_mint.unwrap_or_default();
    let (state_pda, _) = program_state_pda(&config.pnft_program);

    let mut data = ByteWriter::with_capacity(1 + 1 + 8 + 8);
    data.put_u8(IX_CREATE)
        .put_bool(args.swap_mint.is_some())
        .put_u64(args.swap_lamports)
        .put_u64(args.swap_tokens);

    let mut accounts = vec![
        AccountMeta::new(args.initializer, true),
        AccountMeta::new_readonly(state_pda, false),
        AccountMeta::new(swap_state, false), // init
        AccountMeta::new(
            get_associated_token_address(&args.initializer, &args.initializer_mint),
            false,
        ),
        AccountMeta::new_readonly(args.initializer_mint, false),
        AccountMeta::new_readonly(args.taker, false),
        AccountMeta::new_readonly(swap_mint, false),
        AccountMeta::new_readonly(swap_token_mint, false),
    ];
    accounts.extend(pnft_meta_accounts(config, &args.initializer_mint, &args.initializer));
    accounts.extend([
        AccountMeta::new_readonly(config.rules_program, false),
        AccountMeta::new_readonly(config.rules_account, false),
        AccountMeta::new_readonly(config.metadata_program, false),
        AccountMeta::new_readonly(sysvar::instructions::id(), false),
        AccountMeta::new_readonly(spl_token::id(), false),
        AccountMeta::new_readonly(system_program::id(), false),
    ]);

    Ok(vec![Instruction {
        program_id: config.pnft_program,
        accounts,
        data: data.into_bytes(),
    }])
}

pub async fn execute(
    rpc_url: &str,
    config: &ProgramConfig,
    initializer_mint: &Pubkey,
    taker: &Pubkey,
) -> Result<Vec<Instruction>, McSwapError> {
    let (swap_state, _) = swap_state_pda(&config.pnft_program, initializer_mint, taker);
    let account = require_pending(rpc_url, &swap_state).await?;
    let state = PnftSwapState::decode(&account.data)?;
    if state.taker != *taker {
        return Err(McSwapError::state("pending contract names a different taker"));
    }
    let program_state = load_program_state(rpc_url, &config.pnft_program).await?;

    let mut instructions = Vec::with_capacity(3);
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

    let (state_pda, _) = program_state_pda(&config.pnft_program);
    let mut accounts = vec![
        AccountMeta::new(*taker, true),
        AccountMeta::new(state.initializer, false),
        AccountMeta::new_readonly(state_pda, false),
        AccountMeta::new(swap_state, false), // closed on success
        AccountMeta::new(
            get_associated_token_address(&state.initializer, &state.initializer_mint),
            false,
        ),
        AccountMeta::new(
            get_associated_token_address(taker, &state.initializer_mint),
            false,
        ),
        AccountMeta::new_readonly(state.initializer_mint, false),
    ];
    accounts.extend(pnft_meta_accounts(config, &state.initializer_mint, &state.initializer));
    // receiving-side token record for the escrowed pNFT
    accounts.push(AccountMeta::new(
        token_record_pda(
            config,
            &state.initializer_mint,
            &get_associated_token_address(taker, &state.initializer_mint),
        ),
        false,
    ));
    if state.is_swap {
        accounts.push(AccountMeta::new(
            get_associated_token_address(taker, &state.swap_mint),
            false,
        ));
        accounts.push(AccountMeta::new(
            get_associated_token_address(&state.initializer, &state.swap_mint),
            false,
        ));
        accounts.push(AccountMeta::new_readonly(state.swap_mint, false));
        accounts.extend(pnft_meta_accounts(config, &state.swap_mint, taker));
        accounts.push(AccountMeta::new(
            token_record_pda(
                config,
                &state.swap_mint,
                &get_associated_token_address(&state.initializer, &state.swap_mint),
            ),
            false,
        ));
    }
    accounts.extend([
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
        AccountMeta::new_readonly(config.rules_program, false),
        AccountMeta::new_readonly(config.rules_account, false),
        AccountMeta::new_readonly(config.metadata_program, false),
        AccountMeta::new_readonly(sysvar::instructions::id(), false),
        AccountMeta::new_readonly(spl_token::id(), false),
        AccountMeta::new_readonly(system_program::id(), false),
    ]);

    instructions.push(Instruction {
        program_id: config.pnft_program,
        accounts,
        data: vec![IX_EXECUTE],
    });
    Ok(instructions)
}

pub async fn cancel(
    rpc_url: &str,
    config: &ProgramConfig,
    initializer_mint: &Pubkey,
    taker: &Pubkey,
) -> Result<Vec<Instruction>, McSwapError> {
    let (swap_state, _) = swap_state_pda(&config.pnft_program, initializer_mint, taker);
    let account = require_pending(rpc_url, &swap_state).await?;
    let state = PnftSwapState::decode(&account.data)?;

    let mut accounts = vec![
        AccountMeta::new(state.initializer, true),
        AccountMeta::new(swap_state, false), // closed, delegate revoked
        AccountMeta::new(
            get_associated_token_address(&state.initializer, &state.initializer_mint),
            false,
        ),
        AccountMeta::new_readonly(state.initializer_mint, false),
    ];
    accounts.extend(pnft_meta_accounts(config, &state.initializer_mint, &state.initializer));
    accounts.extend([
        AccountMeta::new_readonly(config.rules_program, false),
        AccountMeta::new_readonly(config.rules_account, false),
        AccountMeta::new_readonly(config.metadata_program, false),
        AccountMeta::new_readonly(sysvar::instructions::id(), false),
        AccountMeta::new_readonly(spl_token::id(), false),
        AccountMeta::new_readonly(system_program::id(), false),
    ]);

    Ok(vec![Instruction {
        program_id: config.pnft_program,
        accounts,
        data: vec![IX_CANCEL],
    }])
}

pub async fn sent(
    rpc_url: &str,
    config: &ProgramConfig,
    wallet: &Pubkey,
) -> Result<Vec<PnftListing>, McSwapError> {
    listings(rpc_url, config, PnftSwapState::INITIALIZER_OFFSET, wallet).await
}

pub async fn received(
    rpc_url: &str,
    config: &ProgramConfig,
    wallet: &Pubkey,
) -> Result<Vec<PnftListing>, McSwapError> {
    listings(rpc_url, config, PnftSwapState::TAKER_OFFSET, wallet).await
}

async fn listings(
    rpc_url: &str,
    config: &ProgramConfig,
    offset: usize,
    wallet: &Pubkey,
) -> Result<Vec<PnftListing>, McSwapError> {
    let accounts = rpc::scan_program_accounts(
        rpc_url,
        &config.pnft_program,
        PnftSwapState::LEN as u64,
        offset,
        wallet.as_ref(),
    )
    .await?;
    accounts
        .into_iter()
        .map(|(address, account)| {
            Ok(PnftListing {
                address,
                state: PnftSwapState::decode(&account.data)?,
            })
        })
        .collect()
}

//! Instruction catalog: one module per swap standard.
//!
//! Each module builds the create/execute/cancel instructions for its
//! escrow program and exposes sent/received queries over the pending
//! contracts. Builders return plain instruction lists; feeding them
//! through [`crate::tx::assemble`] is the caller's move.
//!
//! Account ordering in every builder mirrors the on-chain program's
//! expectations exactly; the payload is a one-byte discriminator followed
//! by fixed-width little-endian fields.

pub mod cnft;
pub mod core_asset;
pub mod nft;
pub mod pnft;
pub mod spl;

use solana_sdk::{account::Account, pubkey::Pubkey};

use crate::{
    error::McSwapError,
    rpc,
    state::{ProgramState, SplProgramState},
};

pub(crate) const SWAP_STATE_SEED: &[u8] = b"swap-state";
pub(crate) const PROGRAM_STATE_SEED: &[u8] = b"program-state";
pub(crate) const ESCROW_SEED: &[u8] = b"escrow";

/// Derive the pending-contract PDA for a pair of party-identifying keys.
pub fn swap_state_pda(program: &Pubkey, a: &Pubkey, b: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[SWAP_STATE_SEED, a.as_ref(), b.as_ref()], program)
}

/// Derive a program's state singleton PDA.
pub fn program_state_pda(program: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[PROGRAM_STATE_SEED], program)
}

/// Derive the escrow token account holding one deposited leg.
pub fn escrow_pda(program: &Pubkey, swap_state: &Pubkey, mint: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[ESCROW_SEED, swap_state.as_ref(), mint.as_ref()],
        program,
    )
}

/// Create-side precondition: the contract slot must be empty.
pub(crate) async fn require_no_pending(
    rpc_url: &str,
    swap_state: &Pubkey,
) -> Result<(), McSwapError> {
    if rpc::account_exists(rpc_url, swap_state).await? {
        return Err(McSwapError::state("pending contract already exists"));
    }
    Ok(())
}

/// Execute/cancel-side precondition: the contract must exist. Returns the
/// raw account for decoding.
pub(crate) async fn require_pending(
    rpc_url: &str,
    swap_state: &Pubkey,
) -> Result<Account, McSwapError> {
    rpc::fetch_account(rpc_url, swap_state)
        .await?
        .ok_or_else(|| McSwapError::state("no pending contract found"))
}

/// Load and decode the state singleton of a lamport-fee program.
pub(crate) async fn load_program_state(
    rpc_url: &str,
    program: &Pubkey,
) -> Result<ProgramState, McSwapError> {
    let (address, _) = program_state_pda(program);
    let account = rpc::fetch_account(rpc_url, &address)
        .await?
        .ok_or_else(|| McSwapError::state(format!("program state {address} not found")))?;
    let state = ProgramState::decode(&account.data)?;
    if !state.is_initialized {
        return Err(McSwapError::state(format!(
            "program state {address} not initialized"
        )));
    }
    Ok(state)
}

/// Load and decode the SPL escrow program's state singleton.
pub(crate) async fn load_spl_program_state(
    rpc_url: &str,
    program: &Pubkey,
) -> Result<SplProgramState, McSwapError> {
    let (address, _) = program_state_pda(program);
    let account = rpc::fetch_account(rpc_url, &address)
        .await?
        .ok_or_else(|| McSwapError::state(format!("program state {address} not found")))?;
    let state = SplProgramState::decode(&account.data)?;
    if !state.is_initialized {
        return Err(McSwapError::state(format!(
            "program state {address} not initialized"
        )));
    }
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_state_pda_is_deterministic_and_order_sensitive() {
        let program = Pubkey::new_unique();
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();

        let (pda1, bump1) = swap_state_pda(&program, &a, &b);
        let (pda2, bump2) = swap_state_pda(&program, &a, &b);
        assert_eq!(pda1, pda2);
        assert_eq!(bump1, bump2);

        let (reversed, _) = swap_state_pda(&program, &b, &a);
        assert_ne!(pda1, reversed);
    }

    #[test]
    fn pdas_differ_per_program() {
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();
        let (x, _) = swap_state_pda(&Pubkey::new_unique(), &a, &b);
        let (y, _) = swap_state_pda(&Pubkey::new_unique(), &a, &b);
        assert_ne!(x, y);
    }
}

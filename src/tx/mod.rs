//! Transaction assembly pipeline.
//!
//! [`assemble`] is the single entry point every swap operation goes
//! through: it fetches one blockhash, discovers real compute consumption
//! by simulating the draft ([`compute_limit`]), prices it against the
//! fee market ([`fee_estimate`]), injects both as leading budget
//! instructions, compiles a v0 message (optionally against address
//! lookup tables), and reduces the result as far as the request asked
//! (sign, serialize, base64-encode).
//!
//! [`poll_status`] is the bounded confirmation poll used after
//! submission.

mod assembler;
mod compute;
mod fees;
mod status;

pub use assembler::{assemble, TxRequest};
pub use compute::{compute_limit, SIMULATION_UNIT_LIMIT};
pub use fees::{fee_estimate, FEE_FLOOR_MICRO_LAMPORTS};
pub use status::poll_status;

use solana_sdk::{
    address_lookup_table::AddressLookupTableAccount,
    hash::Hash,
    instruction::Instruction,
    message::{v0, VersionedMessage},
    pubkey::Pubkey,
    signature::Signature,
    transaction::VersionedTransaction,
};

use crate::error::McSwapError;

/// Compile instructions into an unsigned v0 transaction.
///
/// Signature slots are filled with placeholder signatures so the wire
/// form is valid for simulation and fee estimation.
pub(crate) fn compile_unsigned(
    payer: &Pubkey,
    instructions: &[Instruction],
    tables: Option<&[AddressLookupTableAccount]>,
    blockhash: Hash,
) -> Result<VersionedTransaction, McSwapError> {
    let message = v0::Message::try_compile(
        payer,
        instructions,
        tables.unwrap_or(&[]),
        blockhash,
    )?;
    let message = VersionedMessage::V0(message);
    let signatures =
        vec![Signature::default(); message.header().num_required_signatures as usize];
    Ok(VersionedTransaction {
        signatures,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::{instruction::AccountMeta, system_program};

    #[test]
    fn compile_unsigned_fills_signature_slots() {
        let payer = Pubkey::new_unique();
        let ix = Instruction::new_with_bytes(
            system_program::id(),
            &[0],
            vec![AccountMeta::new(payer, true)],
        );
        let tx = compile_unsigned(&payer, &[ix], None, Hash::default()).unwrap();
        assert_eq!(
            tx.signatures.len(),
            tx.message.header().num_required_signatures as usize
        );
        assert!(tx.signatures.iter().all(|s| *s == Signature::default()));
        // wire form must round-trip through bincode for fee estimation
        let bytes = bincode::serialize(&tx).unwrap();
        let back: VersionedTransaction = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back.message, tx.message);
    }
}

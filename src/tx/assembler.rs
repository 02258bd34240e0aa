//! The assembly pipeline orchestrator.

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use solana_sdk::{
    address_lookup_table::AddressLookupTableAccount,
    compute_budget::ComputeBudgetInstruction,
    instruction::Instruction,
    message::{v0, VersionedMessage},
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    transaction::VersionedTransaction,
};
use tracing::{debug, info};

use crate::{
    error::McSwapError,
    rpc,
    types::{PriorityTier, TxArtifact},
};

use super::{compute_limit, fee_estimate};

/// One assembly request: the instructions to execute plus every knob the
/// pipeline recognizes, with the defaults spelled out.
///
/// Required inputs are constructor arguments; everything else defaults:
/// no signers (unsigned result), `Medium` priority, tolerance `1.1`, no
/// serialization or encoding, no lookup tables, compute budgeting and fee
/// estimation both enabled.
pub struct TxRequest {
    /// Target node / fee-estimation service address.
    pub rpc_url: String,
    /// Fee payer (first required signer of the compiled message).
    pub payer: Pubkey,
    /// Instructions to execute, in caller-intended order.
    pub instructions: Vec<Instruction>,
    /// Keypairs to sign with locally; empty means the caller signs
    /// out-of-band.
    pub signers: Vec<Keypair>,
    /// Urgency tier forwarded to the fee-estimation service.
    pub priority: PriorityTier,
    /// Safety multiplier applied to simulated compute consumption.
    pub tolerance: f64,
    /// Reduce the result to wire bytes.
    pub serialize: bool,
    /// Further reduce the wire bytes to base64 text. Requires
    /// `serialize`.
    pub encode: bool,
    /// Address lookup tables to compact the message's account list.
    pub tables: Option<Vec<AddressLookupTableAccount>>,
    /// Simulate and inject a compute-unit-limit instruction.
    pub compute: bool,
    /// Estimate and inject a compute-unit-price instruction.
    pub fees: bool,
}

impl TxRequest {
    pub fn new(rpc_url: impl Into<String>, payer: Pubkey, instructions: Vec<Instruction>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            payer,
            instructions,
            signers: Vec::new(),
            priority: PriorityTier::default(),
            tolerance: 1.1,
            serialize: false,
            encode: false,
            tables: None,
            compute: true,
            fees: true,
        }
    }

    /// Fail fast on inputs that can never assemble. Runs before any
    /// network call.
    pub fn validate(&self) -> Result<(), McSwapError> {
        if self.rpc_url.trim().is_empty() {
            return Err(McSwapError::config("missing rpc url"));
        }
        if self.instructions.is_empty() {
            return Err(McSwapError::config("missing instructions"));
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(McSwapError::config(format!(
                "tolerance must be a positive finite multiplier, got {}",
                self.tolerance
            )));
        }
        if self.encode && !self.serialize {
            return Err(McSwapError::config(
                "encode requires serialize",
            ));
        }
        Ok(())
    }
}

/// Assemble a transaction: one blockhash fetch, optional compute and fee
/// estimation with budget-instruction injection, v0 compilation, optional
/// signing and serialization.
///
/// Steps run strictly in order and the first failure wins. The blockhash
/// fetched here is reused for simulation, fee estimation, and the final
/// message — one consistent point-in-time reference, paid for once.
/// Blockhashes expire after the ledger's horizon; a caller that stalls
/// between assembly and submission owns that risk.
///
/// When both estimation stages are enabled the final instruction list is
/// `[unit-price, unit-limit, ...caller instructions]`: each stage
/// prepends independently and fee estimation runs second. Caller
/// instructions keep their relative order in every configuration.
pub async fn assemble(request: TxRequest) -> Result<TxArtifact, McSwapError> {
    request.validate()?;
    let TxRequest {
        rpc_url,
        payer,
        instructions,
        signers,
        priority,
        tolerance,
        serialize,
        encode,
        tables,
        compute,
        fees,
    } = request;

    let blockhash = rpc::latest_blockhash(&rpc_url).await?;
    let priority = priority.normalize();

    let mut working = instructions;

    if compute {
        let limit = compute_limit(
            &rpc_url,
            &payer,
            &working,
            tolerance,
            blockhash,
            tables.as_deref(),
        )
        .await?;
        working.insert(
            0,
            ComputeBudgetInstruction::set_compute_unit_limit(limit),
        );
        debug!(limit, "unit-limit instruction injected");
    }

    if fees {
        let price = fee_estimate(
            &rpc_url,
            &payer,
            priority,
            &working,
            blockhash,
            tables.as_deref(),
        )
        .await?;
        working.insert(
            0,
            ComputeBudgetInstruction::set_compute_unit_price(price),
        );
        debug!(price, "unit-price instruction injected");
    }

    let message = v0::Message::try_compile(
        &payer,
        &working,
        tables.as_deref().unwrap_or(&[]),
        blockhash,
    )?;
    let message = VersionedMessage::V0(message);

    let tx = if signers.is_empty() {
        let slots = message.header().num_required_signatures as usize;
        VersionedTransaction {
            signatures: vec![Signature::default(); slots],
            message,
        }
    } else {
        let signer_refs: Vec<&Keypair> = signers.iter().collect();
        VersionedTransaction::try_new(message, &signer_refs)?
    };

    info!(
        instruction_count = tx.message.instructions().len(),
        signed = !signers.is_empty(),
        "transaction assembled"
    );

    if !serialize {
        return Ok(TxArtifact::Transaction(tx));
    }
    let bytes = bincode::serialize(&tx)
        .map_err(|e| McSwapError::Compile(format!("serialize failed: {e}")))?;
    if !encode {
        return Ok(TxArtifact::Bytes(bytes));
    }
    Ok(TxArtifact::Base64(BASE64_STANDARD.encode(&bytes)))
}

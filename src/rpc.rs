//! Thin helpers over the nonblocking RPC client.
//!
//! Everything here runs at confirmed commitment and performs exactly one
//! round trip. No retry is attempted at this layer; retry policy, if any,
//! belongs to the transport underneath `solana-client`.

use solana_account_decoder::UiAccountEncoding;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_rpc_client_api::{
    config::{RpcAccountInfoConfig, RpcProgramAccountsConfig, RpcSendTransactionConfig},
    filter::{Memcmp, RpcFilterType},
};
use solana_sdk::{
    account::Account,
    address_lookup_table::{state::AddressLookupTable, AddressLookupTableAccount},
    commitment_config::CommitmentConfig,
    hash::Hash,
    pubkey::Pubkey,
    signature::Signature,
    transaction::VersionedTransaction,
};
use tracing::debug;

use crate::error::McSwapError;

/// Build a confirmed-commitment client for `url`.
pub fn client(url: &str) -> RpcClient {
    RpcClient::new_with_commitment(url.to_string(), CommitmentConfig::confirmed())
}

/// Fetch the current confirmed recent blockhash.
pub async fn latest_blockhash(url: &str) -> Result<Hash, McSwapError> {
    let blockhash = client(url).get_latest_blockhash().await?;
    debug!(%blockhash, "fetched recent blockhash");
    Ok(blockhash)
}

/// Fetch a single account, `None` if it does not exist.
pub async fn fetch_account(url: &str, address: &Pubkey) -> Result<Option<Account>, McSwapError> {
    let response = client(url)
        .get_account_with_commitment(address, CommitmentConfig::confirmed())
        .await?;
    Ok(response.value)
}

/// Whether an account currently exists at `address`.
pub async fn account_exists(url: &str, address: &Pubkey) -> Result<bool, McSwapError> {
    Ok(fetch_account(url, address).await?.is_some())
}

/// Scan a program's accounts with a data-size filter plus one byte-offset
/// equality filter.
pub async fn scan_program_accounts(
    url: &str,
    program: &Pubkey,
    data_size: u64,
    memcmp_offset: usize,
    memcmp_bytes: &[u8],
) -> Result<Vec<(Pubkey, Account)>, McSwapError> {
    let config = RpcProgramAccountsConfig {
        filters: Some(vec![
            RpcFilterType::DataSize(data_size),
            RpcFilterType::Memcmp(Memcmp::new_base58_encoded(memcmp_offset, memcmp_bytes)),
        ]),
        account_config: RpcAccountInfoConfig {
            encoding: Some(UiAccountEncoding::Base64),
            commitment: Some(CommitmentConfig::confirmed()),
            ..Default::default()
        },
        ..Default::default()
    };
    let accounts = client(url)
        .get_program_accounts_with_config(program, config)
        .await?;
    debug!(%program, count = accounts.len(), "program account scan");
    Ok(accounts)
}

/// Submit a signed transaction. Preflight is skipped and the node is told
/// not to retry; confirmation is the caller's business (see
/// [`crate::tx::status`]).
pub async fn send(url: &str, tx: &VersionedTransaction) -> Result<Signature, McSwapError> {
    let config = RpcSendTransactionConfig {
        skip_preflight: true,
        max_retries: Some(0),
        ..Default::default()
    };
    let signature = client(url)
        .send_transaction_with_config(tx, config)
        .await?;
    debug!(%signature, "transaction submitted");
    Ok(signature)
}

/// Load an address-lookup-table account and deserialize its address list,
/// ready to hand to the assembler.
pub async fn fetch_lookup_table(
    url: &str,
    address: &Pubkey,
) -> Result<AddressLookupTableAccount, McSwapError> {
    let account = fetch_account(url, address)
        .await?
        .ok_or_else(|| McSwapError::state(format!("lookup table {address} not found")))?;
    let table = AddressLookupTable::deserialize(&account.data)
        .map_err(|e| McSwapError::state(format!("lookup table {address} malformed: {e}")))?;
    Ok(AddressLookupTableAccount {
        key: *address,
        addresses: table.addresses.to_vec(),
    })
}

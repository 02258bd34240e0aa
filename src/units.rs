//! Conversion between raw base units and human-displayed decimal amounts.
//!
//! The math is pure once the mint's decimal count is known;
//! [`token_decimals`] is the only side-effecting entry point. Display
//! amounts travel as decimal strings, not floats, so token-scale values
//! never pick up binary rounding error.

use solana_sdk::{program_pack::Pack, pubkey::Pubkey};
use spl_token::state::Mint;

use crate::{error::McSwapError, rpc};

/// Decimal count of the native mint (wrapped SOL).
pub const NATIVE_DECIMALS: u8 = 9;

/// Convert a decimal display amount (e.g. `"1.5"`) to raw base units.
///
/// Rejects more fractional digits than the mint carries rather than
/// silently rounding.
pub fn to_base_units(display: &str, decimals: u8) -> Result<u64, McSwapError> {
    let display = display.trim();
    if display.is_empty() {
        return Err(McSwapError::config("empty amount"));
    }
    let (whole, frac) = match display.split_once('.') {
        Some((w, f)) => (w, f),
        None => (display, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(McSwapError::config(format!("invalid amount '{display}'")));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(McSwapError::config(format!("invalid amount '{display}'")));
    }
    if frac.len() > decimals as usize {
        return Err(McSwapError::config(format!(
            "amount '{display}' has more than {decimals} decimal places"
        )));
    }

    let scale = 10u128.pow(decimals as u32);
    let whole_part: u128 = if whole.is_empty() {
        0
    } else {
        whole
            .parse()
            .map_err(|_| McSwapError::config(format!("invalid amount '{display}'")))?
    };
    let frac_part: u128 = if frac.is_empty() {
        0
    } else {
        let padded = format!("{frac:0<width$}", width = decimals as usize);
        padded
            .parse()
            .map_err(|_| McSwapError::config(format!("invalid amount '{display}'")))?
    };

    let base = whole_part
        .checked_mul(scale)
        .and_then(|v| v.checked_add(frac_part))
        .ok_or_else(|| McSwapError::config(format!("amount '{display}' overflows")))?;
    u64::try_from(base)
        .map_err(|_| McSwapError::config(format!("amount '{display}' overflows")))
}

/// Convert raw base units to a decimal display string, trailing zeros
/// trimmed.
pub fn to_display_units(base: u64, decimals: u8) -> String {
    if decimals == 0 {
        return base.to_string();
    }
    let scale = 10u64.pow(decimals as u32);
    let whole = base / scale;
    let frac = base % scale;
    if frac == 0 {
        return whole.to_string();
    }
    let frac_str = format!("{frac:0>width$}", width = decimals as usize);
    format!("{whole}.{}", frac_str.trim_end_matches('0'))
}

/// Insert thousands separators into a decimal display string.
pub fn commas(display: &str) -> String {
    let (whole, frac) = match display.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (display, None),
    };
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    match frac {
        Some(f) => format!("{grouped}.{f}"),
        None => grouped,
    }
}

/// Decimal count for a mint. The native mint short-circuits to 9; any
/// other mint costs one account read.
pub async fn token_decimals(rpc_url: &str, mint: &Pubkey) -> Result<u8, McSwapError> {
    if *mint == spl_token::native_mint::id() {
        return Ok(NATIVE_DECIMALS);
    }
    let account = rpc::fetch_account(rpc_url, mint)
        .await?
        .ok_or_else(|| McSwapError::state(format!("mint {mint} not found")))?;
    if account.data.len() < Mint::LEN {
        return Err(McSwapError::state(format!(
            "mint {mint} account data too short"
        )));
    }
    let state = Mint::unpack_from_slice(&account.data[..Mint::LEN])
        .map_err(|e| McSwapError::state(format!("mint {mint} malformed: {e}")))?;
    Ok(state.decimals)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_units_whole_and_fraction() {
        assert_eq!(to_base_units("1", 9).unwrap(), 1_000_000_000);
        assert_eq!(to_base_units("1.5", 9).unwrap(), 1_500_000_000);
        assert_eq!(to_base_units("0.000000001", 9).unwrap(), 1);
        assert_eq!(to_base_units(".5", 6).unwrap(), 500_000);
        assert_eq!(to_base_units("42", 0).unwrap(), 42);
    }

    #[test]
    fn base_units_rejects_bad_input() {
        assert!(to_base_units("", 9).is_err());
        assert!(to_base_units(".", 9).is_err());
        assert!(to_base_units("1.2.3", 9).is_err());
        assert!(to_base_units("-1", 9).is_err());
        assert!(to_base_units("1,5", 9).is_err());
        // one fractional digit too many
        assert!(to_base_units("0.0000000001", 9).is_err());
        // u64 overflow
        assert!(to_base_units("18446744073709.551616", 6).is_err());
    }

    #[test]
    fn display_units_trims_trailing_zeros() {
        assert_eq!(to_display_units(1_500_000_000, 9), "1.5");
        assert_eq!(to_display_units(1_000_000_000, 9), "1");
        assert_eq!(to_display_units(1, 9), "0.000000001");
        assert_eq!(to_display_units(0, 9), "0");
        assert_eq!(to_display_units(42, 0), "42");
    }

    #[test]
    fn display_round_trips_base() {
        for base in [0u64, 1, 999, 1_000_000_000, 123_456_789_012] {
            let display = to_display_units(base, 9);
            assert_eq!(to_base_units(&display, 9).unwrap(), base);
        }
    }

    #[test]
    fn commas_groups_thousands() {
        assert_eq!(commas("1234567"), "1,234,567");
        assert_eq!(commas("1234567.891"), "1,234,567.891");
        assert_eq!(commas("999"), "999");
        assert_eq!(commas("0.5"), "0.5");
    }
}

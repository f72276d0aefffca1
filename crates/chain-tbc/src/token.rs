use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::TbcError;

/// Decimal places of the native TBC coin.
pub const TBC_DECIMALS: u32 = 6;

/// Largest supported number of decimal places (10^18 still fits a `u64`).
pub const MAX_DECIMALS: u32 = 18;

/// Description of a fungible token contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FungibleTokenInfo {
    pub contract_txid: Option<String>,
    pub code_script: String,
    pub tape_script: String,
    pub total_supply: u64,
    pub decimal: u8,
    pub name: String,
    pub symbol: String,
}

impl FungibleTokenInfo {
    /// Scale a human amount of this token into base units.
    pub fn to_base_units(&self, amount: Decimal) -> Result<u64, TbcError> {
        to_base_units(amount, u32::from(self.decimal))
    }

    /// Render a base-unit amount of this token as a human amount.
    pub fn from_base_units(&self, units: u64) -> Result<Decimal, TbcError> {
        from_base_units(units, u32::from(self.decimal))
    }
}

/// Read-only snapshot of an NFT's metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonFungibleTokenInfo {
    pub collection_id: String,
    pub collection_index: u64,
    pub collection_name: String,
    pub code_balance: u64,
    pub p2pkh_balance: u64,
    pub name: String,
    pub symbol: String,
    /// Opaque attribute blob, passed through untouched.
    pub attributes: String,
    pub description: String,
    pub transfer_count: u64,
    pub icon: String,
}

/// Scale a human amount into base units with `decimals` fractional digits.
///
/// Fails if the amount is negative, carries more fractional digits than
/// `decimals`, or does not fit a `u64` once scaled.
pub fn to_base_units(amount: Decimal, decimals: u32) -> Result<u64, TbcError> {
    let factor = scale_factor(decimals)?;

    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(TbcError::InvalidArgument(format!(
            "amount must not be negative: {amount}"
        )));
    }
    if amount.normalize().scale() > decimals {
        return Err(TbcError::InvalidArgument(format!(
            "amount {amount} has more than {decimals} decimal places"
        )));
    }

    amount
        .checked_mul(Decimal::from(factor))
        .and_then(|scaled| scaled.to_u64())
        .ok_or_else(|| TbcError::InvalidArgument(format!("amount {amount} is out of range")))
}

/// Render `units` base units as a human amount with `decimals` places.
pub fn from_base_units(units: u64, decimals: u32) -> Result<Decimal, TbcError> {
    scale_factor(decimals)?;
    Ok(Decimal::from_i128_with_scale(i128::from(units), decimals).normalize())
}

fn scale_factor(decimals: u32) -> Result<u64, TbcError> {
    if decimals > MAX_DECIMALS {
        return Err(TbcError::InvalidArgument(format!(
            "decimal places must be at most {MAX_DECIMALS}, got {decimals}"
        )));
    }
    Ok(10u64.pow(decimals))
}

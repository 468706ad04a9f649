//! Fee arithmetic in FRI, the smallest STRK unit.
//!
//! All currency math is done with checked `u128` integers; amounts are shown
//! as exact decimal strings, never through floating point.

use std::fmt;

use crate::starknet::types::{
    FeeEstimate, ResourceBounds, ResourceBoundsMapping, StarknetError, StarknetResult,
};

/// Decimal exponent of STRK.
pub const STRK_DECIMALS: u32 = 18;

/// FRI per STRK.
pub const FRI_PER_STRK: u128 = 10u128.pow(STRK_DECIMALS);

/// An amount of FRI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Fri(pub u128);

impl Fri {
    /// Exact STRK rendering, e.g. `0.000001` for 10^12 FRI.
    pub fn to_strk_string(self) -> String {
        let whole = self.0 / FRI_PER_STRK;
        let fraction = self.0 % FRI_PER_STRK;
        if fraction == 0 {
            return whole.to_string();
        }
        let digits = format!("{fraction:0width$}", width = STRK_DECIMALS as usize);
        format!("{whole}.{}", digits.trim_end_matches('0'))
    }
}

impl fmt::Display for Fri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} STRK", self.to_strk_string())
    }
}

fn overflow(what: &str) -> StarknetError {
    StarknetError::ArithmeticOverflow(format!("{what} exceeds u128"))
}

/// Worst-case fee for the given bounds.
///
/// The tip is a per-unit surcharge on L2 gas:
/// `l1_gas + l1_data_gas + l2_gas.max_amount * (l2_gas.max_price + tip)`,
/// then scaled by `multiplier_percent / 100`, rounding up.
pub fn overall_fee(
    bounds: &ResourceBoundsMapping,
    tip: u64,
    multiplier_percent: u32,
) -> StarknetResult<Fri> {
    let cost = |bound: &ResourceBounds, surcharge: u128, what: &str| -> StarknetResult<u128> {
        let price = bound
            .max_price_per_unit
            .checked_add(surcharge)
            .ok_or_else(|| overflow(what))?;
        (bound.max_amount as u128)
            .checked_mul(price)
            .ok_or_else(|| overflow(what))
    };

    let l1_gas = cost(&bounds.l1_gas, 0, "L1 gas fee")?;
    let l1_data_gas = cost(&bounds.l1_data_gas, 0, "L1 data gas fee")?;
    let l2_gas = cost(&bounds.l2_gas, tip as u128, "L2 gas fee")?;

    let total = l1_gas
        .checked_add(l1_data_gas)
        .and_then(|sum| sum.checked_add(l2_gas))
        .ok_or_else(|| overflow("total fee"))?;

    // Round up so a padded estimate never shows less than the bounds allow.
    let scaled = scale_ceil(total, multiplier_percent).ok_or_else(|| overflow("scaled fee"))?;

    Ok(Fri(scaled))
}

fn scale_ceil(value: u128, percent: u32) -> Option<u128> {
    value
        .checked_mul(percent as u128)?
        .checked_add(99)
        .map(|scaled| scaled / 100)
}

/// Derive resource bounds from a node estimate, padding amounts and prices by `multiplier_percent`.
pub fn resource_bounds_from_estimate(
    estimate: &FeeEstimate,
    multiplier_percent: u32,
) -> StarknetResult<ResourceBoundsMapping> {
    let bound = |amount: u64, price: u128, kind: &str| -> StarknetResult<ResourceBounds> {
        let max_amount = scale_ceil(amount as u128, multiplier_percent)
            .and_then(|scaled| u64::try_from(scaled).ok())
            .ok_or_else(|| {
                StarknetError::ArithmeticOverflow(format!("{kind} max amount exceeds u64"))
            })?;
        let max_price_per_unit = scale_ceil(price, multiplier_percent).ok_or_else(|| {
            StarknetError::ArithmeticOverflow(format!("{kind} max price exceeds u128"))
        })?;
        Ok(ResourceBounds {
            max_amount,
            max_price_per_unit,
        })
    };

    Ok(ResourceBoundsMapping {
        l1_gas: bound(estimate.l1_gas_consumed, estimate.l1_gas_price, "L1 gas")?,
        l1_data_gas: bound(
            estimate.l1_data_gas_consumed,
            estimate.l1_data_gas_price,
            "L1 data gas",
        )?,
        l2_gas: bound(estimate.l2_gas_consumed, estimate.l2_gas_price, "L2 gas")?,
    })
}

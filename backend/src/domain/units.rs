//! Token unit conversion.
//!
//! The ledger denominates balances and transfers in indivisible base units,
//! 10^8 per whole token. Conversions use exact decimal arithmetic; amounts
//! never pass through floating point.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Base units per whole token.
pub const BASE_UNITS_PER_TOKEN: u64 = 100_000_000;

/// Conversion failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnitConversionError {
    /// Amount is zero or negative.
    #[error("amount must be greater than zero")]
    NotPositive,
    /// Amount is smaller than one base unit and would floor to zero.
    #[error("amount is below the smallest transferable unit (1e-8)")]
    BelowResolution,
    /// Amount overflows the base-unit range.
    #[error("amount is too large to represent in base units")]
    OutOfRange,
}

/// Convert a whole-token amount to integer base units, flooring any
/// sub-base-unit remainder.
///
/// Rejects non-positive amounts and amounts that floor to zero, so a transfer
/// below base-unit resolution fails loudly rather than silently sending
/// nothing.
///
/// # Examples
/// ```
/// use backend::domain::units::to_base_units;
/// use rust_decimal::Decimal;
///
/// let amount: Decimal = "1.23456789".parse().unwrap();
/// assert_eq!(to_base_units(amount), Ok(123_456_789));
/// ```
pub fn to_base_units(amount: Decimal) -> Result<u64, UnitConversionError> {
    if amount.is_zero() || amount.is_sign_negative() {
        return Err(UnitConversionError::NotPositive);
    }
    let scaled = amount
        .checked_mul(Decimal::from(BASE_UNITS_PER_TOKEN))
        .ok_or(UnitConversionError::OutOfRange)?;
    let floored = scaled.floor();
    let units = floored.to_u64().ok_or(UnitConversionError::OutOfRange)?;
    if units == 0 {
        return Err(UnitConversionError::BelowResolution);
    }
    Ok(units)
}

/// Scale a base-unit total back to whole tokens for display.
///
/// # Examples
/// ```
/// use backend::domain::units::display_tokens;
///
/// assert_eq!(display_tokens(50_000_000).to_string(), "0.5");
/// ```
pub fn display_tokens(base_units: u64) -> Decimal {
    Decimal::from_i128_with_scale(i128::from(base_units), 8).normalize()
}

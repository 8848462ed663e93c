//! Scaled fixed-point arithmetic for the reward accumulator.
//!
//! Reward-per-token values are u128 integers scaled by
//! [`SCALE`](weir_core::constants::SCALE) (1e18). All operations multiply
//! first and divide last with u128 intermediates; division truncates toward
//! zero. The truncation rule is part of the payout semantics: remainders
//! below one subunit per settlement accumulate as unclaimable dust and must
//! never be rounded up.

use weir_core::constants::SCALE;
use weir_core::error::AccrualError;

/// Compute `a * b / divisor` with a checked multiply and truncating divide.
///
/// # Errors
///
/// - [`AccrualError::DivisionByZero`] if `divisor` is zero
/// - [`AccrualError::ArithmeticOverflow`] if `a * b` exceeds u128
pub fn mul_div(a: u128, b: u128, divisor: u128) -> Result<u128, AccrualError> {
    if divisor == 0 {
        return Err(AccrualError::DivisionByZero);
    }
    let product = a.checked_mul(b).ok_or(AccrualError::ArithmeticOverflow)?;
    Ok(product / divisor)
}

/// Scale a subunit amount up into accumulator precision.
pub fn to_scaled(amount: u64) -> u128 {
    // u64::MAX * SCALE < u128::MAX, so this cannot overflow.
    amount as u128 * SCALE
}

/// Scale an accumulator value down to subunits, truncating the remainder.
pub fn from_scaled(value: u128) -> u128 {
    value / SCALE
}

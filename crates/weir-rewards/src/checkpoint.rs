//! Per-account reward settlement against the global index.
//!
//! Each position snapshots the reward-per-token value it was last settled
//! at. The reward earned since is `balance * (current - paid) / SCALE`,
//! added to the already-settled `accrued_reward`. Any operation that
//! mutates a balance or zeroes the accrued amount settles the account
//! first, immediately after the global settle.

use weir_core::constants::SCALE;
use weir_core::error::AccrualError;
use weir_core::types::Position;

use crate::accumulator::mul_div;

/// Reward earned by `position` as of `current_rpt`, in subunits.
///
/// Pure: computed fresh from the position and the supplied index value,
/// never read from storage except for the settled component.
pub fn earned(position: &Position, current_rpt: u128) -> Result<u64, AccrualError> {
    let paid = position.reward_per_token_paid;
    let delta = current_rpt
        .checked_sub(paid)
        .ok_or(AccrualError::IndexRegression { paid, current: current_rpt })?;
    let gained = mul_div(position.balance as u128, delta, SCALE)?;
    let total = gained
        .checked_add(position.accrued_reward as u128)
        .ok_or(AccrualError::ArithmeticOverflow)?;
    u64::try_from(total).map_err(|_| AccrualError::ArithmeticOverflow)
}

/// Settle `position` at `current_rpt`: fold the earned amount into
/// `accrued_reward` and advance the paid snapshot. Returns the settled
/// amount.
///
/// Compute-then-commit: an arithmetic error leaves the position untouched.
pub fn settle(position: &mut Position, current_rpt: u128) -> Result<u64, AccrualError> {
    let total = earned(position, current_rpt)?;
    position.accrued_reward = total;
    position.reward_per_token_paid = current_rpt;
    Ok(total)
}

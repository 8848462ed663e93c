//! Pool constants. All monetary values in subunits (1 unit = 10^8 subunits).

/// Subunits per display unit.
pub const UNIT: u64 = 100_000_000;

/// Fixed-point scale for reward-per-token accounting.
///
/// Reward-per-token values carry 18 decimal places so that per-second
/// accrual on a large pool still moves the accumulator. Every division by
/// `SCALE` truncates; the sub-`SCALE` remainder is dust that stays in the
/// pool rather than being paid out.
pub const SCALE: u128 = 1_000_000_000_000_000_000;

/// Basis-point denominator: 1% = 100 bps, 100% = 10,000 bps.
pub const BPS_PRECISION: u64 = 10_000;

/// Seconds in a 365-day year, the denominator of the APR-to-rate conversion.
pub const SECONDS_PER_YEAR: u64 = 31_536_000;

/// Seconds per day. Used by time-advance arithmetic in tests and examples.
pub const SECONDS_PER_DAY: u64 = 86_400;

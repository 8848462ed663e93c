//! # weir-rewards — Continuous reward accrual engine.
//!
//! All calculations use integer arithmetic only for determinism.
//!
//! This crate implements the pool's continuous-time interest model without
//! ever iterating over participants:
//! - **Scaled accumulator**: reward-per-token values carry 18 decimal
//!   places; every division truncates, so per-settlement dust stays in the
//!   pool instead of being rounded out.
//! - **Global index**: [`RewardIndex`] advances `reward_per_token_stored`
//!   from the elapsed time, the derived emission rate, and the staked total.
//! - **Per-account checkpoints**: [`checkpoint`] settles each account
//!   against the index lazily, exactly once per touching operation.

pub mod accumulator;
pub mod checkpoint;
pub mod index;

pub use accumulator::mul_div;
pub use index::{RewardIndex, derive_rate};

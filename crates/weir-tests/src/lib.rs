//! Scenario and adversarial test suite for the Weir staking pool.
//!
//! This crate contains integration tests that drive the public engine
//! surface end to end: literal payout scenarios, property-based invariant
//! sweeps over operation sequences, and concurrency/atomicity attacks.

pub mod helpers;

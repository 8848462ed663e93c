//! # weir-engine
//! Orchestration layer of the Weir staking pool.
//!
//! Wires the accrual math from weir-rewards behind the public pool
//! operations: per-account stake bookkeeping, role and pause gating, an
//! append-only event log, and a single critical section per operation that
//! also spans the external asset transfer.

pub mod access;
pub mod engine;
pub mod events;
pub mod ledger;

pub use access::AccessController;
pub use engine::{ExitReceipt, StakingEngine};
pub use events::{EventLog, EventRecord, PoolEvent};
pub use ledger::StakeLedger;

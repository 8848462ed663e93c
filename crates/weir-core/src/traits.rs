//! Trait interfaces for the Weir staking pool.
//!
//! These traits define the contracts between crates and collaborators:
//! - [`AssetLedger`] — the external balance-transfer ledger holding the
//!   pool's custody (weir-core ships [`MemoryAssetLedger`](crate::asset::MemoryAssetLedger))
//! - [`Clock`] — the time source read once per operation (weir-engine consumes)

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::AssetError;
use crate::types::AccountId;

/// The external balance-transfer ledger the pool moves the underlying
/// asset through.
///
/// The pool holds deposited principal and funded rewards in a single
/// custody balance on this ledger. Implementations must be atomic per
/// call: a returned error means no balance moved. The engine never
/// assumes a transfer succeeded without checking; any failure aborts the
/// surrounding pool operation.
pub trait AssetLedger: Send + Sync {
    /// Move `amount` from `from` into the pool's custody.
    ///
    /// Implementations with approve/transfer-from semantics debit the
    /// caller's allowance for the pool.
    fn transfer_into(&mut self, from: AccountId, amount: u64) -> Result<(), AssetError>;

    /// Move `amount` out of the pool's custody to `to`.
    fn transfer_out_of(&mut self, to: AccountId, amount: u64) -> Result<(), AssetError>;

    /// The pool's current custody balance (principal plus funded rewards).
    fn custody_balance(&self) -> u64;
}

/// Shared-handle ledger: an engine can own one handle while the embedder
/// keeps another for minting, approvals, and balance queries.
impl<L: AssetLedger> AssetLedger for Arc<parking_lot::Mutex<L>> {
    fn transfer_into(&mut self, from: AccountId, amount: u64) -> Result<(), AssetError> {
        self.lock().transfer_into(from, amount)
    }

    fn transfer_out_of(&mut self, to: AccountId, amount: u64) -> Result<(), AssetError> {
        self.lock().transfer_out_of(to, amount)
    }

    fn custody_balance(&self) -> u64 {
        self.lock().custody_balance()
    }
}

/// Time source for reward settlement, in Unix seconds.
///
/// Time is an external input: the engine reads it once at the start of an
/// operation and never observes it advancing mid-operation.
pub trait Clock: Send + Sync {
    /// Current time in Unix seconds.
    fn now(&self) -> u64;
}

/// Wall-clock time via chrono.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        // Pre-1970 system time reads as 0 rather than wrapping.
        chrono::Utc::now().timestamp().max(0) as u64
    }
}

/// Manually advanced clock for tests.
///
/// Clones share the underlying instant, so a test can keep a handle while
/// the engine owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock starting at `start` Unix seconds.
    pub fn new(start: u64) -> Self {
        Self { now: Arc::new(AtomicU64::new(start)) }
    }

    /// Advance the clock by `secs` seconds.
    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }

    /// Set the clock to an absolute instant.
    pub fn set(&self, now: u64) {
        self.now.store(now, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

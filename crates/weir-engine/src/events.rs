//! Append-only event log consumed by external observers.
//!
//! The engine's contract is "emit exactly once per successful
//! state-changing call, after all state mutation is finalized". Records
//! are sequence-numbered in emission order; a dashboard polls
//! [`EventLog::since`] with the last sequence number it has seen.

use serde::{Deserialize, Serialize};

use weir_core::types::{AccountId, Role};

/// A pool state transition visible to observers.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum PoolEvent {
    /// `account` deposited `amount` subunits of principal.
    Staked { account: AccountId, amount: u64 },
    /// `account` withdrew `amount` subunits of principal.
    Withdrawn { account: AccountId, amount: u64 },
    /// `account` was paid `amount` subunits of accrued reward.
    RewardPaid { account: AccountId, amount: u64 },
    /// `funder` added `amount` subunits to the reward pool.
    RewardAdded { funder: AccountId, amount: u64 },
    /// The annualized rate changed.
    AprUpdated { old_bps: u16, new_bps: u16 },
    /// User-facing operations were paused.
    Paused { by: AccountId },
    /// User-facing operations were resumed.
    Unpaused { by: AccountId },
    /// `account` was granted `role`.
    RoleGranted { role: Role, account: AccountId, by: AccountId },
    /// `role` was revoked from `account`.
    RoleRevoked { role: Role, account: AccountId, by: AccountId },
}

/// An event with its position in the log.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EventRecord {
    /// Zero-based, gapless sequence number.
    pub seq: u64,
    /// The event payload.
    pub event: PoolEvent,
}

/// Append-only, ordered event storage.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event, returning its sequence number.
    pub fn append(&mut self, event: PoolEvent) -> u64 {
        let seq = self.records.len() as u64;
        self.records.push(EventRecord { seq, event });
        seq
    }

    /// All records in emission order.
    pub fn all(&self) -> &[EventRecord] {
        &self.records
    }

    /// Records with `seq >= from`, for incremental polling.
    ///
    /// Sequence numbers are dense, so the offset doubles as an index.
    pub fn since(&self, from: u64) -> &[EventRecord] {
        let start = (from as usize).min(self.records.len());
        &self.records[start..]
    }

    /// Number of records emitted so far.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing has been emitted.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

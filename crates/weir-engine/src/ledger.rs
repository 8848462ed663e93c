//! Per-account staked balances and the pool-wide total.
//!
//! Positions are created lazily on first contact and never deleted: a
//! zeroed balance can still carry an unclaimed accrued reward. The ledger
//! maintains `total_staked == Σ balance` across every mutation; callers
//! sequence settlement and external transfers around these mutations.

use std::collections::HashMap;

use weir_core::error::StakeError;
use weir_core::types::{AccountId, Position};

/// Staked-balance bookkeeping for one pool.
#[derive(Debug, Clone, Default)]
pub struct StakeLedger {
    accounts: HashMap<AccountId, Position>,
    total_staked: u64,
}

impl StakeLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of all staked balances in subunits.
    pub fn total_staked(&self) -> u64 {
        self.total_staked
    }

    /// Staked balance of `account` in subunits.
    pub fn balance_of(&self, account: &AccountId) -> u64 {
        self.accounts.get(account).map_or(0, |p| p.balance)
    }

    /// Settled, unclaimed reward of `account` in subunits.
    pub fn accrued_reward(&self, account: &AccountId) -> u64 {
        self.accounts.get(account).map_or(0, |p| p.accrued_reward)
    }

    /// The position of `account`, if it has ever touched the pool.
    pub fn position(&self, account: &AccountId) -> Option<&Position> {
        self.accounts.get(account)
    }

    /// Mutable position of `account`, created empty on first contact.
    pub fn position_mut(&mut self, account: AccountId) -> &mut Position {
        self.accounts.entry(account).or_default()
    }

    /// Add `amount` to `account`'s balance and the pool total.
    pub fn credit(&mut self, account: AccountId, amount: u64) -> Result<(), StakeError> {
        if amount == 0 {
            return Err(StakeError::InvalidAmount);
        }
        let new_total = self
            .total_staked
            .checked_add(amount)
            .ok_or(StakeError::BalanceOverflow)?;
        let position = self.accounts.entry(account).or_default();
        // balance <= total_staked, so this cannot overflow once the total fits.
        position.balance += amount;
        self.total_staked = new_total;
        Ok(())
    }

    /// Remove `amount` from `account`'s balance and the pool total.
    pub fn debit(&mut self, account: AccountId, amount: u64) -> Result<(), StakeError> {
        if amount == 0 {
            return Err(StakeError::InvalidAmount);
        }
        let have = self.balance_of(&account);
        if have < amount {
            return Err(StakeError::InsufficientStake { have, need: amount });
        }
        let position = self.accounts.entry(account).or_default();
        position.balance -= amount;
        self.total_staked -= amount;
        Ok(())
    }

    /// Zero `account`'s accrued reward, returning the amount taken.
    pub(crate) fn take_accrued(&mut self, account: AccountId) -> u64 {
        let position = self.accounts.entry(account).or_default();
        std::mem::take(&mut position.accrued_reward)
    }

    /// Copy of `account`'s position for rollback, `None` if never created.
    pub(crate) fn snapshot_position(&self, account: &AccountId) -> Option<Position> {
        self.accounts.get(account).copied()
    }

    /// Restore a snapshot taken by [`snapshot_position`](Self::snapshot_position).
    ///
    /// A `None` snapshot removes the lazily created entry so a failed
    /// operation leaves no trace of the account.
    pub(crate) fn restore_position(
        &mut self,
        account: AccountId,
        snapshot: Option<Position>,
        total_staked: u64,
    ) {
        match snapshot {
            Some(position) => {
                self.accounts.insert(account, position);
            }
            None => {
                self.accounts.remove(&account);
            }
        }
        self.total_staked = total_staked;
    }

    /// Number of positions ever created.
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether no position has ever been created.
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Recompute the balance sum from scratch. Audit helper for tests;
    /// always equals [`total_staked`](Self::total_staked).
    pub fn sum_balances(&self) -> u64 {
        self.accounts.values().map(|p| p.balance).sum()
    }
}

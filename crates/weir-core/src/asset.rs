//! In-memory reference implementation of the [`AssetLedger`] collaborator.
//!
//! A standard transferable-balance ledger with approve/transfer-from
//! semantics: holders approve the pool's custody account as a spender, and
//! [`AssetLedger::transfer_into`] draws on that allowance. Suitable for
//! tests and in-process embedders; production deployments adapt whatever
//! ledger actually holds the asset to the same trait.

use std::collections::HashMap;

use crate::error::AssetError;
use crate::traits::AssetLedger;
use crate::types::AccountId;

/// In-memory balance ledger with allowances and a designated custody account.
///
/// Every transfer either fully applies or returns an error with no balance
/// moved, which is what the staking engine's all-or-nothing operations
/// rely on.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetLedger {
    /// Account balances in subunits.
    balances: HashMap<AccountId, u64>,
    /// Allowances: (owner, spender) → remaining approved amount.
    allowances: HashMap<(AccountId, AccountId), u64>,
    /// The pool's custody account.
    custody: AccountId,
}

impl MemoryAssetLedger {
    /// Create an empty ledger with the given custody account.
    pub fn new(custody: AccountId) -> Self {
        Self {
            balances: HashMap::new(),
            allowances: HashMap::new(),
            custody,
        }
    }

    /// The custody account identifier.
    pub fn custody_account(&self) -> AccountId {
        self.custody
    }

    /// Credit `amount` new subunits to `account`. Saturates at `u64::MAX`.
    pub fn mint(&mut self, account: AccountId, amount: u64) {
        let balance = self.balances.entry(account).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    /// Set the allowance of `spender` over `owner`'s balance.
    ///
    /// Overwrites any previous allowance, matching approve semantics.
    pub fn approve(&mut self, owner: AccountId, spender: AccountId, amount: u64) {
        self.allowances.insert((owner, spender), amount);
    }

    /// Current balance of `account` in subunits.
    pub fn balance_of(&self, account: &AccountId) -> u64 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Remaining allowance of `spender` over `owner`'s balance.
    pub fn allowance(&self, owner: &AccountId, spender: &AccountId) -> u64 {
        self.allowances.get(&(*owner, *spender)).copied().unwrap_or(0)
    }

    fn move_balance(&mut self, from: AccountId, to: AccountId, amount: u64) -> Result<(), AssetError> {
        let have = self.balance_of(&from);
        if have < amount {
            return Err(AssetError::InsufficientFunds { have, need: amount });
        }
        // Both entries exist or default to 0; the subtraction cannot
        // underflow after the check above.
        *self.balances.entry(from).or_insert(0) -= amount;
        let to_balance = self.balances.entry(to).or_insert(0);
        *to_balance = to_balance.saturating_add(amount);
        Ok(())
    }
}

impl AssetLedger for MemoryAssetLedger {
    fn transfer_into(&mut self, from: AccountId, amount: u64) -> Result<(), AssetError> {
        let custody = self.custody;
        let allowed = self.allowance(&from, &custody);
        if allowed < amount {
            return Err(AssetError::InsufficientAllowance { allowed, need: amount });
        }
        self.move_balance(from, custody, amount)?;
        self.allowances.insert((from, custody), allowed - amount);
        Ok(())
    }

    fn transfer_out_of(&mut self, to: AccountId, amount: u64) -> Result<(), AssetError> {
        let custody = self.custody;
        self.move_balance(custody, to, amount)
    }

    fn custody_balance(&self) -> u64 {
        self.balance_of(&self.custody)
    }
}

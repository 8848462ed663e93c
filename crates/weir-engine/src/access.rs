//! Role grants and the pause flag.
//!
//! An explicit capability model: a mapping from role tag to the set of
//! accounts holding it, checked by a guard at the top of each gated
//! operation. Pause state gates user-facing mutating operations only;
//! admin operations stay callable while paused.

use std::collections::{HashMap, HashSet};

use weir_core::error::AccessError;
use weir_core::types::{AccountId, Role};

/// Role membership and pause state for one pool.
#[derive(Debug, Clone, Default)]
pub struct AccessController {
    grants: HashMap<Role, HashSet<AccountId>>,
    paused: bool,
}

impl AccessController {
    /// Create a controller with `admin` holding every role.
    pub fn new(admin: AccountId) -> Self {
        let mut controller = Self::default();
        for role in [Role::Admin, Role::Pauser, Role::RewardAdmin] {
            controller.grant(role, admin);
        }
        controller
    }

    /// Whether `account` holds `role`.
    pub fn has_role(&self, account: &AccountId, role: Role) -> bool {
        self.grants
            .get(&role)
            .is_some_and(|holders| holders.contains(account))
    }

    /// Guard: fail with `Unauthorized` unless `account` holds `role`.
    pub fn require(&self, account: AccountId, role: Role) -> Result<(), AccessError> {
        if self.has_role(&account, role) {
            Ok(())
        } else {
            Err(AccessError::Unauthorized { account, role })
        }
    }

    /// Guard: fail with `Paused` while the pool is paused.
    pub fn require_active(&self) -> Result<(), AccessError> {
        if self.paused {
            Err(AccessError::Paused)
        } else {
            Ok(())
        }
    }

    /// Grant `role` to `account`. Returns true if the grant is new.
    pub fn grant(&mut self, role: Role, account: AccountId) -> bool {
        self.grants.entry(role).or_default().insert(account)
    }

    /// Revoke `role` from `account`. Returns true if it was held.
    pub fn revoke(&mut self, role: Role, account: AccountId) -> bool {
        self.grants
            .get_mut(&role)
            .is_some_and(|holders| holders.remove(&account))
    }

    /// Number of accounts holding `role`.
    pub fn holder_count(&self, role: Role) -> usize {
        self.grants.get(&role).map_or(0, HashSet::len)
    }

    /// Whether user-facing operations are paused.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Set the pause flag.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }
}

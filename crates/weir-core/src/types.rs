//! Core pool types: account identifiers, staking positions, role tags.
//!
//! All monetary values are in subunits (1 unit = 10^8 subunits) and use u64;
//! reward-per-token accumulators are u128 scaled by
//! [`SCALE`](crate::constants::SCALE).

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 32-byte account identifier.
///
/// Opaque to the pool: embedders map whatever addressing scheme they use
/// (public key hashes, user ids) onto it.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
)]
pub struct AccountId(pub [u8; 32]);

impl AccountId {
    /// The zero account (32 zero bytes).
    pub const ZERO: Self = Self([0u8; 32]);

    /// Create an AccountId from a byte array.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Return the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl From<[u8; 32]> for AccountId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for AccountId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A participant's staking position.
///
/// Created lazily on first stake and never deleted: a zeroed balance can
/// still carry an unclaimed `accrued_reward`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Position {
    /// Currently staked amount in subunits.
    pub balance: u64,
    /// Global reward-per-token value at this account's last settlement,
    /// scaled by [`SCALE`](crate::constants::SCALE).
    pub reward_per_token_paid: u128,
    /// Settled, unclaimed reward in subunits.
    pub accrued_reward: u64,
}

/// Capability tags checked by the access controller.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// May grant and revoke roles.
    Admin,
    /// May pause and unpause user-facing operations.
    Pauser,
    /// May tune the APR and fund the reward pool.
    RewardAdmin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Admin => "admin",
            Self::Pauser => "pauser",
            Self::RewardAdmin => "reward-admin",
        };
        write!(f, "{name}")
    }
}

/// Point-in-time view of the global pool state, for dashboards and logs.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolSnapshot {
    /// Sum of all staked balances in subunits.
    pub total_staked: u64,
    /// Configured annualized rate in basis points.
    pub apr_bps: u16,
    /// Derived emission rate in subunits per second.
    pub reward_rate: u64,
    /// Stored reward-per-token accumulator (1e18-scaled).
    pub reward_per_token_stored: u128,
    /// Unix time of the last global settlement.
    pub last_update_time: u64,
    /// Custody balance not owed back as principal, in subunits.
    pub reward_pool: u64,
    /// Whether user-facing operations are paused.
    pub paused: bool,
}

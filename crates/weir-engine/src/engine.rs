//! The staking engine: public pool operations behind one critical section.
//!
//! Every mutating operation follows the same shape:
//! 1. read the clock once, take the pool lock;
//! 2. cheap guards (pause flag, role, zero amount);
//! 3. settle the global index, then the subject account;
//! 4. ledger mutation and the external asset transfer, still under the lock;
//! 5. re-derive the emission rate if the staked total changed;
//! 6. append events only after all state mutation is finalized.
//!
//! A snapshot of the index and the subject position is taken before the
//! settle; any failure after it restores the snapshot, so an aborted
//! operation leaves no observable state change. The asset transfer happens
//! inside the critical section, so a reentrant call issued from a transfer
//! blocks until the current operation commits or aborts.

use parking_lot::Mutex;
use tracing::{debug, info};

use weir_core::error::{EngineError, StakeError};
use weir_core::traits::{AssetLedger, Clock};
use weir_core::types::{AccountId, PoolSnapshot, Position, Role};
use weir_rewards::checkpoint;
use weir_rewards::index::RewardIndex;

use crate::access::AccessController;
use crate::events::{EventLog, EventRecord, PoolEvent};
use crate::ledger::StakeLedger;

/// Amounts returned to the caller by [`StakingEngine::exit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExitReceipt {
    /// Principal withdrawn, in subunits.
    pub withdrawn: u64,
    /// Reward paid out, in subunits.
    pub reward: u64,
}

/// Everything guarded by the pool lock, the external ledger included.
struct PoolState<L> {
    index: RewardIndex,
    stakes: StakeLedger,
    access: AccessController,
    events: EventLog,
    asset: L,
}

impl<L: AssetLedger> PoolState<L> {
    /// Custody balance not owed back as principal.
    fn reward_pool(&self) -> u64 {
        self.asset
            .custody_balance()
            .saturating_sub(self.stakes.total_staked())
    }
}

/// Undo record for one operation: the global index plus the subject
/// position. Restoring it rewinds every accrual-side mutation.
#[derive(Clone, Copy)]
struct OpSnapshot {
    index: RewardIndex,
    position: Option<Position>,
    total_staked: u64,
}

impl OpSnapshot {
    fn take<L>(state: &PoolState<L>, account: &AccountId) -> Self {
        Self {
            index: state.index,
            position: state.stakes.snapshot_position(account),
            total_staked: state.stakes.total_staked(),
        }
    }

    fn restore<L>(self, state: &mut PoolState<L>, account: AccountId) {
        state.index = self.index;
        state
            .stakes
            .restore_position(account, self.position, self.total_staked);
    }
}

/// The shared staking pool.
///
/// One instance owns the whole pool state behind a single mutex; operations
/// are atomic state transitions and may be issued from any thread.
pub struct StakingEngine<L, C> {
    state: Mutex<PoolState<L>>,
    clock: C,
}

impl<L: AssetLedger, C: Clock> StakingEngine<L, C> {
    /// Create a pool over `asset` custody, granting every role to `admin`.
    ///
    /// The APR starts at zero; nothing accrues until
    /// [`set_rate`](Self::set_rate) configures a rate.
    pub fn new(asset: L, clock: C, admin: AccountId) -> Self {
        let now = clock.now();
        Self {
            state: Mutex::new(PoolState {
                index: RewardIndex::new(now),
                stakes: StakeLedger::new(),
                access: AccessController::new(admin),
                events: EventLog::new(),
                asset,
            }),
            clock,
        }
    }

    // ── User operations ─────────────────────────────────────────────────

    /// Deposit `amount` subunits of principal from `caller`.
    ///
    /// Settles the caller first so the new deposit does not retroactively
    /// earn over the elapsed interval.
    pub fn stake(&self, caller: AccountId, amount: u64) -> Result<(), EngineError> {
        let now = self.clock.now();
        let mut state = self.state.lock();
        Self::stake_locked(&mut state, now, caller, amount)
    }

    /// Withdraw `amount` subunits of principal to `caller`.
    pub fn withdraw(&self, caller: AccountId, amount: u64) -> Result<(), EngineError> {
        let now = self.clock.now();
        let mut state = self.state.lock();
        Self::withdraw_locked(&mut state, now, caller, amount)
    }

    /// Pay out `caller`'s settled reward. Returns the amount paid.
    pub fn claim_reward(&self, caller: AccountId) -> Result<u64, EngineError> {
        let now = self.clock.now();
        let mut state = self.state.lock();
        Self::claim_locked(&mut state, now, caller)
    }

    /// Withdraw the full balance and claim any reward in one atomic step.
    ///
    /// A zero accrued reward is not an error here; a zero balance with a
    /// pending reward still pays the reward.
    pub fn exit(&self, caller: AccountId) -> Result<ExitReceipt, EngineError> {
        let now = self.clock.now();
        let mut state = self.state.lock();
        Self::exit_locked(&mut state, now, caller)
    }

    // ── Admin operations (callable while paused) ────────────────────────

    /// Set the annualized rate in basis points. Requires `RewardAdmin`.
    ///
    /// The index is settled at the old rate first, so the change never
    /// reprices elapsed time.
    pub fn set_rate(&self, caller: AccountId, apr_bps: u16) -> Result<(), EngineError> {
        let now = self.clock.now();
        let mut state = self.state.lock();
        state.access.require(caller, Role::RewardAdmin)?;

        let total = state.stakes.total_staked();
        state.index.settle(now, total)?;
        let old_bps = state.index.set_apr(apr_bps);
        state.index.recalc_rate(total);

        state.events.append(PoolEvent::AprUpdated { old_bps, new_bps: apr_bps });
        info!(old_bps, new_bps = apr_bps, "apr updated");
        Ok(())
    }

    /// Move `amount` from `caller` into custody as claimable rewards.
    /// Requires `RewardAdmin`.
    ///
    /// Funding raises the ceiling checked by
    /// [`claim_reward`](Self::claim_reward) and nothing else; the emission
    /// rate is a function of the staked total and the APR alone.
    pub fn fund_rewards(&self, caller: AccountId, amount: u64) -> Result<(), EngineError> {
        let mut state = self.state.lock();
        state.access.require(caller, Role::RewardAdmin)?;
        if amount == 0 {
            return Err(StakeError::InvalidAmount.into());
        }

        state
            .asset
            .transfer_into(caller, amount)
            .map_err(EngineError::TransferFailed)?;

        state.events.append(PoolEvent::RewardAdded { funder: caller, amount });
        info!(funder = %caller, amount, "reward pool funded");
        Ok(())
    }

    /// Pause user-facing operations. Requires `Pauser`.
    pub fn pause(&self, caller: AccountId) -> Result<(), EngineError> {
        let mut state = self.state.lock();
        state.access.require(caller, Role::Pauser)?;
        state.access.set_paused(true);
        state.events.append(PoolEvent::Paused { by: caller });
        info!(by = %caller, "pool paused");
        Ok(())
    }

    /// Resume user-facing operations. Requires `Pauser`.
    pub fn unpause(&self, caller: AccountId) -> Result<(), EngineError> {
        let mut state = self.state.lock();
        state.access.require(caller, Role::Pauser)?;
        state.access.set_paused(false);
        state.events.append(PoolEvent::Unpaused { by: caller });
        info!(by = %caller, "pool unpaused");
        Ok(())
    }

    /// Grant `role` to `account`. Requires `Admin`.
    /// Returns true if the grant is new.
    pub fn grant_role(
        &self,
        caller: AccountId,
        role: Role,
        account: AccountId,
    ) -> Result<bool, EngineError> {
        let mut state = self.state.lock();
        state.access.require(caller, Role::Admin)?;
        let changed = state.access.grant(role, account);
        if changed {
            state.events.append(PoolEvent::RoleGranted { role, account, by: caller });
            info!(%role, account = %account, "role granted");
        }
        Ok(changed)
    }

    /// Revoke `role` from `account`. Requires `Admin`.
    /// Returns true if the role was held.
    pub fn revoke_role(
        &self,
        caller: AccountId,
        role: Role,
        account: AccountId,
    ) -> Result<bool, EngineError> {
        let mut state = self.state.lock();
        state.access.require(caller, Role::Admin)?;
        let changed = state.access.revoke(role, account);
        if changed {
            state.events.append(PoolEvent::RoleRevoked { role, account, by: caller });
            info!(%role, account = %account, "role revoked");
        }
        Ok(changed)
    }

    // ── Views ───────────────────────────────────────────────────────────

    /// The reward-per-token accumulator as of now (1e18-scaled).
    pub fn reward_per_token(&self) -> Result<u128, EngineError> {
        let now = self.clock.now();
        let state = self.state.lock();
        let total = state.stakes.total_staked();
        Ok(state.index.current_reward_per_token(now, total)?)
    }

    /// Reward `account` could claim as of now, in subunits.
    ///
    /// Computed fresh from the live index; nothing is settled.
    pub fn earned(&self, account: &AccountId) -> Result<u64, EngineError> {
        let now = self.clock.now();
        let state = self.state.lock();
        let total = state.stakes.total_staked();
        let rpt = state.index.current_reward_per_token(now, total)?;
        let position = state.stakes.position(account).copied().unwrap_or_default();
        Ok(checkpoint::earned(&position, rpt)?)
    }

    /// Custody balance not owed back as principal, in subunits. This, not a
    /// separate ledger, bounds claimable rewards.
    pub fn reward_pool(&self) -> u64 {
        self.state.lock().reward_pool()
    }

    /// Sum of all staked balances in subunits.
    pub fn total_staked(&self) -> u64 {
        self.state.lock().stakes.total_staked()
    }

    /// Staked balance of `account` in subunits.
    pub fn balance_of(&self, account: &AccountId) -> u64 {
        self.state.lock().stakes.balance_of(account)
    }

    /// Current emission rate in subunits per second.
    pub fn reward_rate(&self) -> u64 {
        self.state.lock().index.reward_rate
    }

    /// Configured annualized rate in basis points.
    pub fn apr_bps(&self) -> u16 {
        self.state.lock().index.apr_bps
    }

    /// Whether user-facing operations are paused.
    pub fn is_paused(&self) -> bool {
        self.state.lock().access.is_paused()
    }

    /// Whether `account` holds `role`.
    pub fn has_role(&self, account: &AccountId, role: Role) -> bool {
        self.state.lock().access.has_role(account, role)
    }

    /// Point-in-time view of the global pool state.
    pub fn snapshot(&self) -> PoolSnapshot {
        let state = self.state.lock();
        PoolSnapshot {
            total_staked: state.stakes.total_staked(),
            apr_bps: state.index.apr_bps,
            reward_rate: state.index.reward_rate,
            reward_per_token_stored: state.index.reward_per_token_stored,
            last_update_time: state.index.last_update_time,
            reward_pool: state.reward_pool(),
            paused: state.access.is_paused(),
        }
    }

    /// All emitted events in order.
    pub fn events(&self) -> Vec<EventRecord> {
        self.state.lock().events.all().to_vec()
    }

    /// Events with `seq >= from`, for incremental polling.
    pub fn events_since(&self, from: u64) -> Vec<EventRecord> {
        self.state.lock().events.since(from).to_vec()
    }

    // ── Internals ───────────────────────────────────────────────────────

    /// Settle the global index and, when given, the subject account.
    ///
    /// The literal first state mutation of every operation that changes
    /// the staked total or the APR, or that reads or claims rewards.
    fn settle_locked(
        state: &mut PoolState<L>,
        now: u64,
        account: Option<AccountId>,
    ) -> Result<(), EngineError> {
        let total = state.stakes.total_staked();
        let rpt = state.index.settle(now, total)?;
        if let Some(account) = account {
            let position = state.stakes.position_mut(account);
            checkpoint::settle(position, rpt)?;
        }
        Ok(())
    }

    fn stake_locked(
        state: &mut PoolState<L>,
        now: u64,
        caller: AccountId,
        amount: u64,
    ) -> Result<(), EngineError> {
        state.access.require_active()?;
        if amount == 0 {
            return Err(StakeError::InvalidAmount.into());
        }

        let snapshot = OpSnapshot::take(state, &caller);
        if let Err(err) = Self::settle_locked(state, now, Some(caller)) {
            snapshot.restore(state, caller);
            return Err(err);
        }
        if let Err(err) = state.stakes.credit(caller, amount) {
            snapshot.restore(state, caller);
            return Err(err.into());
        }
        if let Err(err) = state.asset.transfer_into(caller, amount) {
            snapshot.restore(state, caller);
            return Err(EngineError::TransferFailed(err));
        }

        let total = state.stakes.total_staked();
        state.index.recalc_rate(total);
        state.events.append(PoolEvent::Staked { account: caller, amount });
        debug!(account = %caller, amount, total, "staked");
        Ok(())
    }

    fn withdraw_locked(
        state: &mut PoolState<L>,
        now: u64,
        caller: AccountId,
        amount: u64,
    ) -> Result<(), EngineError> {
        state.access.require_active()?;
        if amount == 0 {
            return Err(StakeError::InvalidAmount.into());
        }

        let snapshot = OpSnapshot::take(state, &caller);
        if let Err(err) = Self::settle_locked(state, now, Some(caller)) {
            snapshot.restore(state, caller);
            return Err(err);
        }
        if let Err(err) = state.stakes.debit(caller, amount) {
            snapshot.restore(state, caller);
            return Err(err.into());
        }
        if let Err(err) = state.asset.transfer_out_of(caller, amount) {
            snapshot.restore(state, caller);
            return Err(EngineError::TransferFailed(err));
        }

        let total = state.stakes.total_staked();
        state.index.recalc_rate(total);
        state.events.append(PoolEvent::Withdrawn { account: caller, amount });
        debug!(account = %caller, amount, total, "withdrawn");
        Ok(())
    }

    fn claim_locked(
        state: &mut PoolState<L>,
        now: u64,
        caller: AccountId,
    ) -> Result<u64, EngineError> {
        state.access.require_active()?;

        let snapshot = OpSnapshot::take(state, &caller);
        if let Err(err) = Self::settle_locked(state, now, Some(caller)) {
            snapshot.restore(state, caller);
            return Err(err);
        }

        let reward = state.stakes.accrued_reward(&caller);
        if reward == 0 {
            snapshot.restore(state, caller);
            return Err(EngineError::NoReward);
        }
        let available = state.reward_pool();
        if reward > available {
            snapshot.restore(state, caller);
            return Err(EngineError::InsufficientRewardPool { available, requested: reward });
        }

        state.stakes.take_accrued(caller);
        if let Err(err) = state.asset.transfer_out_of(caller, reward) {
            snapshot.restore(state, caller);
            return Err(EngineError::TransferFailed(err));
        }

        state.events.append(PoolEvent::RewardPaid { account: caller, amount: reward });
        debug!(account = %caller, reward, "reward paid");
        Ok(reward)
    }

    fn exit_locked(
        state: &mut PoolState<L>,
        now: u64,
        caller: AccountId,
    ) -> Result<ExitReceipt, EngineError> {
        state.access.require_active()?;

        let snapshot = OpSnapshot::take(state, &caller);
        if let Err(err) = Self::settle_locked(state, now, Some(caller)) {
            snapshot.restore(state, caller);
            return Err(err);
        }

        let withdrawn = state.stakes.balance_of(&caller);
        let reward = state.stakes.accrued_reward(&caller);

        // Withdrawing principal moves custody and the staked total in
        // lockstep, so the reward ceiling can be checked up front.
        if reward > 0 {
            let available = state.reward_pool();
            if reward > available {
                snapshot.restore(state, caller);
                return Err(EngineError::InsufficientRewardPool { available, requested: reward });
            }
        }

        let payout = match withdrawn.checked_add(reward) {
            Some(payout) => payout,
            None => {
                snapshot.restore(state, caller);
                return Err(StakeError::BalanceOverflow.into());
            }
        };
        if payout == 0 {
            // Nothing staked, nothing accrued: succeed without leaving a
            // lazily created position behind.
            snapshot.restore(state, caller);
            return Ok(ExitReceipt::default());
        }

        if withdrawn > 0 {
            if let Err(err) = state.stakes.debit(caller, withdrawn) {
                snapshot.restore(state, caller);
                return Err(err.into());
            }
        }
        state.stakes.take_accrued(caller);

        // Principal and reward leave custody as one transfer, so a rejected
        // transfer aborts the whole exit.
        if let Err(err) = state.asset.transfer_out_of(caller, payout) {
            snapshot.restore(state, caller);
            return Err(EngineError::TransferFailed(err));
        }

        let total = state.stakes.total_staked();
        state.index.recalc_rate(total);
        if withdrawn > 0 {
            state.events.append(PoolEvent::Withdrawn { account: caller, amount: withdrawn });
        }
        if reward > 0 {
            state.events.append(PoolEvent::RewardPaid { account: caller, amount: reward });
        }
        debug!(account = %caller, withdrawn, reward, "exited");
        Ok(ExitReceipt { withdrawn, reward })
    }
}

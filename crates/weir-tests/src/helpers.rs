//! Shared test helpers for scenario and adversarial tests.

use std::sync::Arc;

use parking_lot::Mutex;
use weir_core::asset::MemoryAssetLedger;
use weir_core::traits::AssetLedger;
use weir_core::traits::ManualClock;
use weir_core::types::AccountId;
use weir_engine::StakingEngine;

/// The ledger handle shared between the engine and the test harness.
pub type SharedLedger = Arc<Mutex<MemoryAssetLedger>>;

/// The admin account every pool boots with.
pub const ADMIN: AccountId = AccountId([0xAD; 32]);

/// The pool's custody account on the asset ledger.
pub const CUSTODY: AccountId = AccountId([0xCC; 32]);

/// Simple account id from a seed byte.
pub fn account(seed: u8) -> AccountId {
    AccountId([seed; 32])
}

/// A pool wired to an in-memory asset ledger and a manual clock.
pub struct TestPool {
    pub engine: StakingEngine<SharedLedger, ManualClock>,
    pub asset: SharedLedger,
    pub clock: ManualClock,
}

impl TestPool {
    /// Boot a fresh pool at a fixed epoch with [`ADMIN`] holding every role.
    pub fn new() -> Self {
        let asset: SharedLedger = Arc::new(Mutex::new(MemoryAssetLedger::new(CUSTODY)));
        let clock = ManualClock::new(1_700_000_000);
        let engine = StakingEngine::new(Arc::clone(&asset), clock.clone(), ADMIN);
        Self { engine, asset, clock }
    }

    /// Mint `amount` to `account` and approve the pool to pull it.
    pub fn give(&self, account: AccountId, amount: u64) {
        let mut ledger = self.asset.lock();
        ledger.mint(account, amount);
        let custody = ledger.custody_account();
        let allowance = ledger.allowance(&account, &custody).saturating_add(amount);
        ledger.approve(account, custody, allowance);
    }

    /// Fund the reward pool with freshly minted subunits via [`ADMIN`].
    pub fn fund_rewards(&self, amount: u64) {
        self.give(ADMIN, amount);
        self.engine
            .fund_rewards(ADMIN, amount)
            .expect("admin funding succeeds");
    }

    /// `account`'s free balance on the asset ledger.
    pub fn wallet_of(&self, account: &AccountId) -> u64 {
        self.asset.lock().balance_of(account)
    }

    /// Total subunits in existence on the asset ledger across the given
    /// accounts plus custody. Conservation checks compare this to minted.
    pub fn circulating(&self, accounts: &[AccountId]) -> u64 {
        let ledger = self.asset.lock();
        let users: u64 = accounts.iter().map(|a| ledger.balance_of(a)).sum();
        users + ledger.custody_balance()
    }
}

impl Default for TestPool {
    fn default() -> Self {
        Self::new()
    }
}

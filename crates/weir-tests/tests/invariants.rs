//! Property-based invariant sweeps over randomized operation sequences.
//!
//! Each case replays a random mix of stakes, withdrawals, claims, exits,
//! rate changes, funding, pauses, and time jumps, re-asserting the global
//! invariants after every single operation:
//! - the staked total equals the sum of account balances
//! - the stored reward-per-token accumulator never decreases
//! - the emission rate always equals its defining formula
//! - custody never drops below the staked total (principal is never paid
//!   out as reward)

use proptest::prelude::*;
use weir_core::constants::UNIT;
use weir_core::traits::AssetLedger;
use weir_rewards::derive_rate;
use weir_tests::helpers::{ADMIN, TestPool, account};

/// One randomized engine call.
#[derive(Clone, Debug)]
enum Op {
    Stake { seed: u8, amount: u64 },
    Withdraw { seed: u8, amount: u64 },
    Claim { seed: u8 },
    Exit { seed: u8 },
    SetRate { bps: u16 },
    Fund { amount: u64 },
    Pause,
    Unpause,
    Advance { secs: u32 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..4, 1u64..100 * UNIT).prop_map(|(seed, amount)| Op::Stake { seed, amount }),
        (0u8..4, 1u64..100 * UNIT).prop_map(|(seed, amount)| Op::Withdraw { seed, amount }),
        (0u8..4).prop_map(|seed| Op::Claim { seed }),
        (0u8..4).prop_map(|seed| Op::Exit { seed }),
        (0u16..=20_000).prop_map(|bps| Op::SetRate { bps }),
        (1u64..1_000 * UNIT).prop_map(|amount| Op::Fund { amount }),
        Just(Op::Pause),
        Just(Op::Unpause),
        (1u32..90 * 86_400).prop_map(|secs| Op::Advance { secs }),
    ]
}

fn assert_invariants(pool: &TestPool, prev_rpt: &mut u128) {
    let accounts: Vec<_> = (0u8..4).map(account).collect();

    let balance_sum: u64 = accounts.iter().map(|a| pool.engine.balance_of(a)).sum();
    assert_eq!(pool.engine.total_staked(), balance_sum);

    let snap = pool.engine.snapshot();
    assert!(
        snap.reward_per_token_stored >= *prev_rpt,
        "accumulator regressed: {} < {}",
        snap.reward_per_token_stored,
        *prev_rpt
    );
    *prev_rpt = snap.reward_per_token_stored;

    assert_eq!(snap.reward_rate, derive_rate(snap.total_staked, snap.apr_bps));

    let custody = pool.asset.lock().custody_balance();
    assert!(
        custody >= snap.total_staked,
        "custody {} below staked total {}",
        custody,
        snap.total_staked
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn invariants_hold_across_any_sequence(ops in proptest::collection::vec(op_strategy(), 1..60)) {
        let pool = TestPool::new();
        let mut prev_rpt = 0u128;

        for op in ops {
            match op {
                Op::Stake { seed, amount } => {
                    pool.give(account(seed), amount);
                    let _ = pool.engine.stake(account(seed), amount);
                }
                Op::Withdraw { seed, amount } => {
                    let _ = pool.engine.withdraw(account(seed), amount);
                }
                Op::Claim { seed } => {
                    let _ = pool.engine.claim_reward(account(seed));
                }
                Op::Exit { seed } => {
                    let _ = pool.engine.exit(account(seed));
                }
                Op::SetRate { bps } => {
                    pool.engine.set_rate(ADMIN, bps).unwrap();
                }
                Op::Fund { amount } => {
                    pool.fund_rewards(amount);
                }
                Op::Pause => pool.engine.pause(ADMIN).unwrap(),
                Op::Unpause => pool.engine.unpause(ADMIN).unwrap(),
                Op::Advance { secs } => pool.clock.advance(secs as u64),
            }
            assert_invariants(&pool, &mut prev_rpt);
        }
    }

    #[test]
    fn earned_grows_while_position_is_live(
        stake in 1u64..1_000 * UNIT,
        apr in 100u16..=20_000,
        steps in proptest::collection::vec(60u64..86_400, 1..10),
    ) {
        let pool = TestPool::new();
        pool.engine.set_rate(ADMIN, apr).unwrap();

        let alice = account(1);
        pool.give(alice, stake);
        pool.engine.stake(alice, stake).unwrap();

        let live = pool.engine.reward_rate() > 0;
        let mut prev = pool.engine.earned(&alice).unwrap();
        for step in steps {
            pool.clock.advance(step);
            let now = pool.engine.earned(&alice).unwrap();
            prop_assert!(now >= prev, "earned shrank between settlements: {} < {}", now, prev);
            if live {
                prop_assert!(now > prev, "live position failed to accrue over {}s", step);
            }
            prev = now;
        }
    }

    #[test]
    fn claims_never_overdraw_the_reward_pool(
        stake in 1u64..100 * UNIT,
        funding in 0u64..UNIT,
        apr in 1_000u16..=20_000,
        days in 1u64..120,
    ) {
        let pool = TestPool::new();
        pool.engine.set_rate(ADMIN, apr).unwrap();
        if funding > 0 {
            pool.fund_rewards(funding);
        }

        let alice = account(1);
        pool.give(alice, stake);
        pool.engine.stake(alice, stake).unwrap();
        pool.clock.advance(days * 86_400);

        let accrued = pool.engine.earned(&alice).unwrap();
        let available = pool.engine.reward_pool();
        let result = pool.engine.claim_reward(alice);

        if accrued == 0 {
            prop_assert!(matches!(result, Err(weir_core::error::EngineError::NoReward)));
        } else if accrued > available {
            prop_assert!(
                matches!(
                    result,
                    Err(weir_core::error::EngineError::InsufficientRewardPool { .. })
                ),
                "expected InsufficientRewardPool error"
            );
        } else {
            prop_assert_eq!(result.unwrap(), accrued);
        }

        let custody = pool.asset.lock().custody_balance();
        prop_assert!(custody >= pool.engine.total_staked());
    }
}

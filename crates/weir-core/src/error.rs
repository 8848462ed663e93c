//! Error types for the Weir staking pool.
use thiserror::Error;

use crate::types::{AccountId, Role};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccrualError {
    #[error("arithmetic overflow")] ArithmeticOverflow,
    #[error("division by zero")] DivisionByZero,
    #[error("reward index regressed: paid {paid} > current {current}")] IndexRegression { paid: u128, current: u128 },
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StakeError {
    #[error("amount must be greater than zero")] InvalidAmount,
    #[error("insufficient stake: have {have}, need {need}")] InsufficientStake { have: u64, need: u64 },
    #[error("balance overflow")] BalanceOverflow,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessError {
    #[error("account {account} is missing role {role}")] Unauthorized { account: AccountId, role: Role },
    #[error("pool is paused")] Paused,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    #[error("insufficient funds: have {have}, need {need}")] InsufficientFunds { have: u64, need: u64 },
    #[error("insufficient allowance: allowed {allowed}, need {need}")] InsufficientAllowance { allowed: u64, need: u64 },
    #[error("transfer rejected: {0}")] Rejected(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error(transparent)] Accrual(#[from] AccrualError),
    #[error(transparent)] Stake(#[from] StakeError),
    #[error(transparent)] Access(#[from] AccessError),
    #[error("no reward accrued")] NoReward,
    #[error("reward pool too small: available {available}, requested {requested}")] InsufficientRewardPool { available: u64, requested: u64 },
    #[error("asset transfer failed: {0}")] TransferFailed(AssetError),
}

use thiserror::Error;

use crate::entities::Role;
use crate::values::{Address, Amount, Bps};

/// Failures reported by the underlying asset ledger
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Insufficient token balance for {holder}: requested {requested}, available {available}")]
    InsufficientBalance {
        holder: Address,
        requested: Amount,
        available: Amount,
    },
}

/// Every failure a vault operation can surface to its caller.
///
/// All of them are caller-correctable and none leaves partial state behind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VaultError {
    #[error("Unauthorized: {caller} lacks role {required}")]
    Unauthorized { caller: Address, required: Role },

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Insufficient balance for {holder}: requested {requested}, available {available}")]
    InsufficientBalance {
        holder: Address,
        requested: Amount,
        available: Amount,
    },

    #[error("Exceeds liquidation allowance of {holder}: requested {requested}, allowed {allowance}")]
    ExceedsAllowance {
        holder: Address,
        requested: Amount,
        allowance: Amount,
    },

    #[error("Deposit limit exceeded: limit {limit}, total assets would be {attempted}")]
    DepositLimitExceeded { limit: Amount, attempted: Amount },

    #[error("Debt allocation exceeded: total debt ratio would be {total} bps")]
    AllocationExceeded { total: Bps },

    #[error("Fee too high: {fee} bps exceeds cap of {max} bps")]
    FeeTooHigh { fee: Bps, max: Bps },

    #[error("Insufficient liquidity: requested {requested}, idle {idle}")]
    InsufficientLiquidity { requested: Amount, idle: Amount },

    #[error("Strategy not found: {0}")]
    StrategyNotFound(Address),

    #[error("Strategy already active: {0}")]
    StrategyAlreadyActive(Address),

    #[error("Invalid debt bounds: min {min} > max {max}")]
    InvalidDebtBounds { min: Amount, max: Amount },

    #[error("Vault is in emergency shutdown")]
    EmergencyShutdown,

    #[error("Already initialized")]
    AlreadyInitialized,

    #[error("Vault not registered with configuration: {0}")]
    VaultNotRegistered(Address),

    #[error("Arithmetic overflow")]
    MathOverflow,

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Vault actor unavailable: {0}")]
    Actor(String),
}

pub type VaultResult<T> = std::result::Result<T, VaultError>;

impl VaultError {
    pub fn unauthorized(caller: &Address, required: Role) -> Self {
        VaultError::Unauthorized {
            caller: caller.clone(),
            required,
        }
    }
}

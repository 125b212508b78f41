use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

mod math;

pub use math::{mul_div, pow10};

/// Amount of the underlying asset or of vault shares, in base units.
/// Accounting is integer-only with floor division.
pub type Amount = u128;

/// Rate in basis points (1 bps = 0.01%)
pub type Bps = u32;

/// Timestamp in UTC
pub type Timestamp = DateTime<Utc>;

/// Denominator of every basis-point rate
pub const FEE_MAX: Bps = 10_000;

/// Upper bound for performance fees (vault-level and strategy-level)
pub const MAX_PERFORMANCE_FEE: Bps = FEE_MAX / 2;

/// Upper bound for the management fee
pub const MAX_MANAGEMENT_FEE: Bps = FEE_MAX;

/// Upper bound for the partner fee
pub const MAX_PARTNER_FEE: Bps = FEE_MAX;

/// Sum of all strategy debt ratios may not exceed this
pub const MAX_DEBT_RATIO: Bps = FEE_MAX;

/// Seconds in a year (365.2425 days)
pub const SECS_PER_YEAR: u64 = 31_556_952;

/// Identity of an account, vault, strategy or token
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Mint a fresh, unique identity
    pub fn generate() -> Self {
        Self(format!("0x{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

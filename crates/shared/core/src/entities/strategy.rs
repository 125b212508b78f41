use serde::{Deserialize, Serialize};

use crate::values::{Amount, Bps, Timestamp};

/// Parameters a strategy is registered with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyParams {
    /// Share of vault assets the strategy may manage, in bps
    pub debt_ratio: Bps,

    /// Smallest debt increase worth sending on a harvest
    pub min_debt_per_harvest: Amount,

    /// Largest debt increase sent on a single harvest
    pub max_debt_per_harvest: Amount,

    /// Strategy-level performance fee, paid to the strategy
    pub performance_fee: Bps,
}

impl StrategyParams {
    /// Unbounded per-harvest debt, no strategist fee
    pub fn new(debt_ratio: Bps) -> Self {
        Self {
            debt_ratio,
            min_debt_per_harvest: 0,
            max_debt_per_harvest: Amount::MAX,
            performance_fee: 0,
        }
    }

    pub fn with_debt_bounds(mut self, min: Amount, max: Amount) -> Self {
        self.min_debt_per_harvest = min;
        self.max_debt_per_harvest = max;
        self
    }

    pub fn with_performance_fee(mut self, fee: Bps) -> Self {
        self.performance_fee = fee;
        self
    }
}

/// Accounting record of one registered strategy.
///
/// Strategies are never removed: revoking sets the debt ratio to zero and
/// the strategy divests on its following harvests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyRecord {
    pub performance_fee: Bps,
    pub activation: Timestamp,
    pub debt_ratio: Bps,
    pub min_debt_per_harvest: Amount,
    pub max_debt_per_harvest: Amount,
    pub last_report: Timestamp,
    /// Assets currently lent to the strategy
    pub total_debt: Amount,
    pub total_gain: Amount,
    pub total_loss: Amount,
    /// While set, the whole debt is delegated and exempt from management fees
    pub delegated: bool,
}

impl StrategyRecord {
    pub fn new(params: &StrategyParams, now: Timestamp) -> Self {
        Self {
            performance_fee: params.performance_fee,
            activation: now,
            debt_ratio: params.debt_ratio,
            min_debt_per_harvest: params.min_debt_per_harvest,
            max_debt_per_harvest: params.max_debt_per_harvest,
            last_report: now,
            total_debt: 0,
            total_gain: 0,
            total_loss: 0,
            delegated: false,
        }
    }

    pub fn delegated_assets(&self) -> Amount {
        if self.delegated { self.total_debt } else { 0 }
    }

    pub fn is_retired(&self) -> bool {
        self.debt_ratio == 0
    }
}

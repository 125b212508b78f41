use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::fee::{FeeEngine, FeeRates, HarvestFees, HarvestInput, check_performance_fee};
use super::strategy::{StrategyParams, StrategyRecord};
use crate::error::{VaultError, VaultResult};
use crate::values::{Address, Amount, Bps, MAX_DEBT_RATIO, Timestamp, mul_div};

/// Gain, loss and debt repayment claimed by a strategy report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestReport {
    pub gain: Amount,
    pub loss: Amount,
    pub debt_payment: Amount,
}

/// Vault-wide state a harvest is evaluated against
#[derive(Debug, Clone, Copy)]
pub struct HarvestContext {
    /// Vault total assets before the report
    pub total_assets: Amount,
    /// Assets held by the vault itself
    pub total_idle: Amount,
    pub emergency_shutdown: bool,
    pub now: Timestamp,
    pub rates: FeeRates,
}

/// Net asset movement settling a harvest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetTransfer {
    None,
    /// Vault sends assets to the strategy
    ToStrategy(Amount),
    /// Strategy sends assets to the vault
    FromStrategy(Amount),
}

/// Outcome of a strategy report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtAdjustment {
    pub gain: Amount,
    pub loss: Amount,
    /// Debt repayment actually accepted (capped at the outstanding debt)
    pub debt_payment: Amount,
    /// New debt extended to the strategy
    pub credit: Amount,
    /// Debt the strategy should still return
    pub debt_outstanding: Amount,
    pub fees: HarvestFees,
    pub transfer: NetTransfer,
}

/// Per-strategy debt allocation with a global 100% cap
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrategyAllocationTable {
    strategies: HashMap<Address, StrategyRecord>,
    /// Sum of all strategy debt ratios
    debt_ratio: Bps,
    /// Sum of all strategy debts
    total_debt: Amount,
}

impl StrategyAllocationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn debt_ratio(&self) -> Bps {
        self.debt_ratio
    }

    pub fn total_debt(&self) -> Amount {
        self.total_debt
    }

    pub fn get(&self, strategy: &Address) -> Option<&StrategyRecord> {
        self.strategies.get(strategy)
    }

    pub fn contains(&self, strategy: &Address) -> bool {
        self.strategies.contains_key(strategy)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Address, &StrategyRecord)> {
        self.strategies.iter()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    fn require(&self, strategy: &Address) -> VaultResult<&StrategyRecord> {
        self.strategies
            .get(strategy)
            .ok_or_else(|| VaultError::StrategyNotFound(strategy.clone()))
    }

    fn require_mut(&mut self, strategy: &Address) -> VaultResult<&mut StrategyRecord> {
        self.strategies
            .get_mut(strategy)
            .ok_or_else(|| VaultError::StrategyNotFound(strategy.clone()))
    }

    fn ratio_after_change(&self, old: Bps, new: Bps) -> VaultResult<Bps> {
        let total = self.debt_ratio - old + new;
        if total > MAX_DEBT_RATIO {
            return Err(VaultError::AllocationExceeded { total });
        }
        Ok(total)
    }

    /// Register a new strategy
    pub fn add_strategy(
        &mut self,
        strategy: &Address,
        params: &StrategyParams,
        now: Timestamp,
    ) -> VaultResult<()> {
        check_performance_fee(params.performance_fee)?;
        if params.min_debt_per_harvest > params.max_debt_per_harvest {
            return Err(VaultError::InvalidDebtBounds {
                min: params.min_debt_per_harvest,
                max: params.max_debt_per_harvest,
            });
        }
        if self.strategies.contains_key(strategy) {
            return Err(VaultError::StrategyAlreadyActive(strategy.clone()));
        }
        let total = self.ratio_after_change(0, params.debt_ratio)?;

        self.strategies
            .insert(strategy.clone(), StrategyRecord::new(params, now));
        self.debt_ratio = total;
        Ok(())
    }

    pub fn update_performance_fee(&mut self, strategy: &Address, fee: Bps) -> VaultResult<()> {
        check_performance_fee(fee)?;
        self.require_mut(strategy)?.performance_fee = fee;
        Ok(())
    }

    pub fn update_debt_ratio(&mut self, strategy: &Address, debt_ratio: Bps) -> VaultResult<()> {
        let old = self.require(strategy)?.debt_ratio;
        let total = self.ratio_after_change(old, debt_ratio)?;

        self.require_mut(strategy)?.debt_ratio = debt_ratio;
        self.debt_ratio = total;
        Ok(())
    }

    pub fn update_min_debt_per_harvest(&mut self, strategy: &Address, min: Amount) -> VaultResult<()> {
        let record = self.require_mut(strategy)?;
        if min > record.max_debt_per_harvest {
            return Err(VaultError::InvalidDebtBounds {
                min,
                max: record.max_debt_per_harvest,
            });
        }
        record.min_debt_per_harvest = min;
        Ok(())
    }

    pub fn update_max_debt_per_harvest(&mut self, strategy: &Address, max: Amount) -> VaultResult<()> {
        let record = self.require_mut(strategy)?;
        if record.min_debt_per_harvest > max {
            return Err(VaultError::InvalidDebtBounds {
                min: record.min_debt_per_harvest,
                max,
            });
        }
        record.max_debt_per_harvest = max;
        Ok(())
    }

    /// Retire a strategy: zero its debt ratio so it divests
    pub fn revoke(&mut self, strategy: &Address) -> VaultResult<()> {
        self.update_debt_ratio(strategy, 0)
    }

    /// Set or clear the delegated flag
    pub fn set_delegation(&mut self, strategy: &Address, delegated: bool) -> VaultResult<Amount> {
        let record = self.require_mut(strategy)?;
        record.delegated = delegated;
        Ok(record.delegated_assets())
    }

    pub fn delegated_assets(&self, strategy: &Address) -> VaultResult<Amount> {
        Ok(self.require(strategy)?.delegated_assets())
    }

    /// Delegated assets across all strategies
    pub fn total_delegated(&self) -> Amount {
        self.strategies
            .values()
            .map(StrategyRecord::delegated_assets)
            .sum()
    }

    /// New debt the strategy may take on its next harvest
    pub fn credit_available(
        &self,
        strategy: &Address,
        total_assets: Amount,
        total_idle: Amount,
        emergency_shutdown: bool,
    ) -> VaultResult<Amount> {
        let record = self.require(strategy)?;
        if emergency_shutdown {
            return Ok(0);
        }

        let vault_debt_limit = ratio_of(self.debt_ratio, total_assets)?;
        let strategy_debt_limit = ratio_of(record.debt_ratio, total_assets)?;

        if strategy_debt_limit <= record.total_debt || vault_debt_limit <= self.total_debt {
            return Ok(0);
        }

        let available = (strategy_debt_limit - record.total_debt)
            .min(vault_debt_limit - self.total_debt)
            .min(total_idle);

        if available < record.min_debt_per_harvest {
            return Ok(0);
        }
        Ok(available.min(record.max_debt_per_harvest))
    }

    /// Debt the strategy holds above its allocation
    pub fn debt_outstanding(
        &self,
        strategy: &Address,
        total_assets: Amount,
        emergency_shutdown: bool,
    ) -> VaultResult<Amount> {
        let record = self.require(strategy)?;
        if emergency_shutdown || self.debt_ratio == 0 {
            return Ok(record.total_debt);
        }

        let strategy_debt_limit = ratio_of(record.debt_ratio, total_assets)?;
        Ok(record.total_debt.saturating_sub(strategy_debt_limit))
    }

    /// Settle a strategy report: book the loss, assess fees on the gain,
    /// accept debt repayment and extend new credit.
    ///
    /// The returned fees are in asset units and still have to be minted as
    /// shares at the pre-gain price. The transfer settles `gain +
    /// debt_payment` against `credit` in a single movement.
    pub fn report_harvest(
        &mut self,
        strategy: &Address,
        report: &HarvestReport,
        ctx: &HarvestContext,
    ) -> VaultResult<DebtAdjustment> {
        let record = self.require(strategy)?;
        if report.loss > record.total_debt {
            return Err(VaultError::InvalidAmount(format!(
                "reported loss {} exceeds strategy debt {}",
                report.loss, record.total_debt
            )));
        }

        // Losses hit the share price immediately
        let debt_after_loss = record.total_debt - report.loss;
        let total_assets = ctx.total_assets - report.loss;

        let elapsed_secs = (ctx.now - record.last_report).num_seconds().max(0) as u64;
        let fees = FeeEngine::assess(
            &ctx.rates,
            &HarvestInput {
                gain: report.gain,
                strategy_debt: debt_after_loss,
                delegated_assets: if record.delegated { debt_after_loss } else { 0 },
                elapsed_secs,
                strategy_performance_fee: record.performance_fee,
            },
        )?;

        {
            let record = self.require_mut(strategy)?;
            record.total_debt = debt_after_loss;
            record.total_loss += report.loss;
            record.total_gain = record
                .total_gain
                .checked_add(report.gain)
                .ok_or(VaultError::MathOverflow)?;
        }
        self.total_debt -= report.loss;

        let credit = self.credit_available(
            strategy,
            total_assets,
            ctx.total_idle,
            ctx.emergency_shutdown,
        )?;
        let mut debt = self.debt_outstanding(strategy, total_assets, ctx.emergency_shutdown)?;
        let debt_payment = report.debt_payment.min(debt);

        if debt_payment > 0 {
            self.require_mut(strategy)?.total_debt -= debt_payment;
            self.total_debt -= debt_payment;
            debt -= debt_payment;
        }
        if credit > 0 {
            self.require_mut(strategy)?.total_debt += credit;
            self.total_debt += credit;
        }

        let total_available = report
            .gain
            .checked_add(debt_payment)
            .ok_or(VaultError::MathOverflow)?;
        let transfer = if total_available < credit {
            NetTransfer::ToStrategy(credit - total_available)
        } else if total_available > credit {
            NetTransfer::FromStrategy(total_available - credit)
        } else {
            NetTransfer::None
        };

        let record = self.require_mut(strategy)?;
        record.last_report = ctx.now;
        let debt_outstanding = if record.debt_ratio == 0 || ctx.emergency_shutdown {
            record.total_debt
        } else {
            debt
        };

        Ok(DebtAdjustment {
            gain: report.gain,
            loss: report.loss,
            debt_payment,
            credit,
            debt_outstanding,
            fees,
            transfer,
        })
    }
}

/// `ratio / MAX_DEBT_RATIO` of `total_assets`
fn ratio_of(ratio: Bps, total_assets: Amount) -> VaultResult<Amount> {
    mul_div(
        Amount::from(ratio),
        total_assets,
        Amount::from(MAX_DEBT_RATIO),
    )
    .ok_or(VaultError::MathOverflow)
}

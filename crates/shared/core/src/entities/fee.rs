use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{VaultError, VaultResult};
use crate::values::{
    Amount, Bps, FEE_MAX, MAX_MANAGEMENT_FEE, MAX_PARTNER_FEE, MAX_PERFORMANCE_FEE,
    SECS_PER_YEAR, mul_div,
};

/// Convert a basis-point rate to a decimal fraction (450 -> 0.0450)
pub fn bps_to_decimal(bps: Bps) -> Decimal {
    Decimal::new(i64::from(bps), 4)
}

fn check_cap(fee: Bps, max: Bps) -> VaultResult<()> {
    if fee > max {
        return Err(VaultError::FeeTooHigh { fee, max });
    }
    Ok(())
}

/// Reject a vault-level or strategy-level performance fee above FEE_MAX / 2
pub fn check_performance_fee(fee: Bps) -> VaultResult<()> {
    check_cap(fee, MAX_PERFORMANCE_FEE)
}

/// Reject a management fee above FEE_MAX
pub fn check_management_fee(fee: Bps) -> VaultResult<()> {
    check_cap(fee, MAX_MANAGEMENT_FEE)
}

/// Reject a partner fee above FEE_MAX
pub fn check_partner_fee(fee: Bps) -> VaultResult<()> {
    check_cap(fee, MAX_PARTNER_FEE)
}

/// Vault-level fee rates as held by the configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeRates {
    /// Annual fee on non-delegated strategy debt, paid to rewards
    pub management_fee: Bps,

    /// Share of realized gains paid to rewards
    pub performance_fee: Bps,

    /// Share of realized gains paid to the partner
    pub partner_fee: Bps,
}

impl FeeRates {
    pub fn new(management_fee: Bps, performance_fee: Bps, partner_fee: Bps) -> Self {
        Self {
            management_fee,
            performance_fee,
            partner_fee,
        }
    }

    /// All rates zero
    pub fn zero() -> Self {
        Self::new(0, 0, 0)
    }

    /// Check every rate against its cap
    pub fn validate(&self) -> VaultResult<()> {
        check_management_fee(self.management_fee)?;
        check_performance_fee(self.performance_fee)?;
        check_partner_fee(self.partner_fee)
    }
}

impl Default for FeeRates {
    fn default() -> Self {
        Self {
            management_fee: 200,   // 2% per year
            performance_fee: 1000, // 10% of gains
            partner_fee: 0,
        }
    }
}

/// What a single strategy report exposes to fee assessment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarvestInput {
    /// Realized gain being reported
    pub gain: Amount,

    /// Strategy debt before the report
    pub strategy_debt: Amount,

    /// Portion of the debt exempt from management fees
    pub delegated_assets: Amount,

    /// Seconds since the strategy last reported
    pub elapsed_secs: u64,

    /// Strategy-level performance fee, paid to the strategy itself
    pub strategy_performance_fee: Bps,
}

/// Fees charged on one harvest, in asset units
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestFees {
    /// Time-based fee, paid to rewards
    pub management: Amount,
    /// Vault-level performance fee, paid to rewards
    pub performance: Amount,
    /// Strategy-level performance fee, paid to the strategy
    pub strategist: Amount,
    /// Partner fee, paid to the partner
    pub partner: Amount,
}

impl HarvestFees {
    pub fn total(&self) -> Amount {
        self.management + self.performance + self.strategist + self.partner
    }

    /// Portion that goes to rewards
    pub fn governance(&self) -> Amount {
        self.management + self.performance
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Split the shares minted for `total()` assets among the recipients.
    /// Flooring dust stays with rewards.
    pub fn split_shares(&self, minted: Amount) -> VaultResult<FeeShares> {
        let total = self.total();
        if total == 0 || minted == 0 {
            return Ok(FeeShares::default());
        }

        let strategist = mul_div(self.strategist, minted, total).ok_or(VaultError::MathOverflow)?;
        let partner = mul_div(self.partner, minted, total).ok_or(VaultError::MathOverflow)?;
        Ok(FeeShares {
            rewards: minted - strategist - partner,
            strategist,
            partner,
        })
    }
}

/// Shares handed to each fee recipient after a harvest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeShares {
    pub rewards: Amount,
    pub strategist: Amount,
    pub partner: Amount,
}

/// Fee math for strategy harvests.
///
/// Vault-level and strategy-level performance fees are independent and
/// additive. The sum of all fees never exceeds the reported gain.
pub struct FeeEngine;

impl FeeEngine {
    /// `(debt - delegated) * rate * elapsed / (SECS_PER_YEAR * FEE_MAX)`
    pub fn management_fee(
        debt: Amount,
        delegated: Amount,
        rate: Bps,
        elapsed_secs: u64,
    ) -> VaultResult<Amount> {
        let chargeable = debt.saturating_sub(delegated);
        if chargeable == 0 || rate == 0 || elapsed_secs == 0 {
            return Ok(0);
        }
        let numerator = Amount::from(rate) * Amount::from(elapsed_secs);
        let denominator = Amount::from(SECS_PER_YEAR) * Amount::from(FEE_MAX);
        mul_div(chargeable, numerator, denominator).ok_or(VaultError::MathOverflow)
    }

    /// `gain * rate / FEE_MAX`
    pub fn gain_fee(gain: Amount, rate: Bps) -> VaultResult<Amount> {
        mul_div(gain, Amount::from(rate), Amount::from(FEE_MAX)).ok_or(VaultError::MathOverflow)
    }

    /// Assess all fees for one harvest, clamped to the gain
    pub fn assess(rates: &FeeRates, input: &HarvestInput) -> VaultResult<HarvestFees> {
        let mut fees = HarvestFees {
            management: Self::management_fee(
                input.strategy_debt,
                input.delegated_assets,
                rates.management_fee,
                input.elapsed_secs,
            )?,
            ..Default::default()
        };

        if input.gain > 0 {
            fees.performance = Self::gain_fee(input.gain, rates.performance_fee)?;
            fees.strategist = Self::gain_fee(input.gain, input.strategy_performance_fee)?;
            fees.partner = Self::gain_fee(input.gain, rates.partner_fee)?;
        }

        let total = fees
            .management
            .checked_add(fees.performance)
            .and_then(|t| t.checked_add(fees.strategist))
            .and_then(|t| t.checked_add(fees.partner))
            .ok_or(VaultError::MathOverflow)?;

        if total <= input.gain {
            return Ok(fees);
        }

        log::debug!(
            "Fees {} exceed gain {}, scaling down to the gain",
            total,
            input.gain
        );
        Self::clamp(fees, total, input.gain)
    }

    /// Scale every component by `gain / total`; dust goes to management
    fn clamp(fees: HarvestFees, total: Amount, gain: Amount) -> VaultResult<HarvestFees> {
        let scale = |part: Amount| mul_div(part, gain, total).ok_or(VaultError::MathOverflow);

        let mut clamped = HarvestFees {
            management: scale(fees.management)?,
            performance: scale(fees.performance)?,
            strategist: scale(fees.strategist)?,
            partner: scale(fees.partner)?,
        };
        clamped.management += gain - clamped.total();
        Ok(clamped)
    }
}

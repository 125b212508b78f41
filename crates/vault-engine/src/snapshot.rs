use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strata_core::entities::bps_to_decimal;
use strata_core::values::mul_div;
use strata_core::{Address, Amount, Bps, FEE_MAX, Timestamp, VaultError, VaultResult};

use crate::vault::SnapshotInputs;

/// Point-in-time view of a vault for reporting
///
/// Raw amounts stay integral; price and rates are also given as decimals
/// for display (price in whole asset units, rates as fractions).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaultSnapshot {
    pub address: Address,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: Amount,
    pub total_assets: Amount,
    pub total_idle: Amount,
    pub total_debt: Amount,
    pub debt_ratio: Bps,
    pub deposit_limit: Amount,
    pub emergency_shutdown: bool,
    /// Raw price, scaled by `10^decimals`
    pub price_per_share: Amount,
    /// Price of one whole share in whole asset units
    pub share_price: Decimal,
    /// False when the configuration does not service this vault (rates are zero)
    pub registered: bool,
    pub management_fee: Decimal,
    pub performance_fee: Decimal,
    pub partner_fee: Decimal,
    pub strategies: usize,
    pub open_liquidations: usize,
    pub last_report: Timestamp,
}

impl VaultSnapshot {
    pub(crate) fn build(
        address: Address,
        name: String,
        symbol: String,
        inputs: SnapshotInputs,
    ) -> VaultResult<Self> {
        let share_price = price_to_decimal(inputs.price_per_share, inputs.decimals)?;

        Ok(Self {
            address,
            name,
            symbol,
            decimals: inputs.decimals,
            total_supply: inputs.total_supply,
            total_assets: inputs.total_assets,
            total_idle: inputs.total_idle,
            total_debt: inputs.total_debt,
            debt_ratio: inputs.debt_ratio,
            deposit_limit: inputs.deposit_limit,
            emergency_shutdown: inputs.emergency_shutdown,
            price_per_share: inputs.price_per_share,
            share_price,
            registered: inputs.registered,
            management_fee: bps_to_decimal(inputs.rates.management_fee),
            performance_fee: bps_to_decimal(inputs.rates.performance_fee),
            partner_fee: bps_to_decimal(inputs.rates.partner_fee),
            strategies: inputs.strategies,
            open_liquidations: inputs.open_liquidations,
            last_report: inputs.last_report,
        })
    }

    /// Share of vault assets lent to strategies, as a fraction
    pub fn utilization(&self) -> Decimal {
        if self.total_assets == 0 {
            return Decimal::ZERO;
        }
        mul_div(self.total_debt, Amount::from(FEE_MAX), self.total_assets)
            .and_then(|bps| Bps::try_from(bps).ok())
            .map(bps_to_decimal)
            .unwrap_or(Decimal::ZERO)
    }
}

/// Largest scale a `Decimal` can carry
const MAX_DECIMAL_SCALE: u32 = 28;

/// `raw / 10^decimals` as a decimal. Digits beyond what a `Decimal` holds
/// are truncated, so very fine-grained assets lose precision, not the price.
fn price_to_decimal(raw: Amount, decimals: u8) -> VaultResult<Decimal> {
    let mut raw = raw;
    let mut scale = u32::from(decimals);
    loop {
        if scale <= MAX_DECIMAL_SCALE {
            let fitted = i128::try_from(raw)
                .ok()
                .and_then(|mantissa| Decimal::try_from_i128_with_scale(mantissa, scale).ok());
            if let Some(price) = fitted {
                return Ok(price.normalize());
            }
        }
        if scale == 0 {
            return Err(VaultError::MathOverflow);
        }
        raw /= 10;
        scale -= 1;
    }
}

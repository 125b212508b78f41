use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{VaultError, VaultResult};
use crate::values::{Address, Amount, mul_div, pow10};

/// Per-holder share balances and total supply.
///
/// Conversions between shares and assets take the vault's current total
/// assets as an argument: the ledger does not know where assets sit.
/// All conversions floor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareLedger {
    /// Decimals of the underlying asset (shares use the same)
    decimals: u8,

    /// Outstanding shares
    total_supply: Amount,

    /// Share balance per holder (zero balances are not stored)
    balances: HashMap<Address, Amount>,
}

impl ShareLedger {
    /// Create an empty ledger for an asset with the given decimals
    pub fn new(decimals: u8) -> Self {
        Self {
            decimals,
            total_supply: 0,
            balances: HashMap::new(),
        }
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    pub fn balance_of(&self, holder: &Address) -> Amount {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    /// Iterate over all non-zero balances
    pub fn balances(&self) -> impl Iterator<Item = (&Address, &Amount)> {
        self.balances.iter()
    }

    /// Shares that `amount` of assets buys at the current price
    pub fn shares_for_amount(&self, amount: Amount, total_assets: Amount) -> VaultResult<Amount> {
        if amount == 0 {
            return Err(VaultError::InvalidAmount(
                "asset amount must be non-zero".to_string(),
            ));
        }
        if self.total_supply == 0 {
            return Ok(amount);
        }
        if total_assets == 0 {
            return Err(VaultError::InvalidAmount(
                "outstanding shares are not backed by any assets".to_string(),
            ));
        }
        mul_div(amount, self.total_supply, total_assets).ok_or(VaultError::MathOverflow)
    }

    /// Shares paid out for `fees` assets. When outstanding shares are backed
    /// by nothing, fees are dropped rather than minted.
    pub fn shares_for_fees(&self, fees: Amount, total_assets: Amount) -> VaultResult<Amount> {
        if fees == 0 || (self.total_supply > 0 && total_assets == 0) {
            return Ok(0);
        }
        self.shares_for_amount(fees, total_assets)
    }

    /// Assets that `shares` are worth at the current price
    pub fn share_value(&self, shares: Amount, total_assets: Amount) -> VaultResult<Amount> {
        if self.total_supply == 0 {
            return Ok(shares);
        }
        mul_div(shares, total_assets, self.total_supply).ok_or(VaultError::MathOverflow)
    }

    /// Price of one whole share, scaled by `10^decimals`
    pub fn price_per_share(&self, total_assets: Amount) -> VaultResult<Amount> {
        let unit = pow10(self.decimals).ok_or(VaultError::MathOverflow)?;
        if self.total_supply == 0 {
            return Ok(unit);
        }
        mul_div(unit, total_assets, self.total_supply).ok_or(VaultError::MathOverflow)
    }

    /// Mint shares for `amount` of assets entering a vault that held
    /// `total_assets_before`. Returns the minted share count.
    pub fn issue_shares(
        &mut self,
        holder: &Address,
        amount: Amount,
        total_assets_before: Amount,
    ) -> VaultResult<Amount> {
        let shares = self.shares_for_amount(amount, total_assets_before)?;
        if shares == 0 {
            return Err(VaultError::InvalidAmount(format!(
                "{} assets are worth less than one share",
                amount
            )));
        }

        self.total_supply = self
            .total_supply
            .checked_add(shares)
            .ok_or(VaultError::MathOverflow)?;
        *self.balances.entry(holder.clone()).or_insert(0) += shares;
        Ok(shares)
    }

    /// Mint an exact share count, used to pay fees in shares
    pub fn mint_shares(&mut self, holder: &Address, shares: Amount) -> VaultResult<()> {
        if shares == 0 {
            return Ok(());
        }
        self.total_supply = self
            .total_supply
            .checked_add(shares)
            .ok_or(VaultError::MathOverflow)?;
        *self.balances.entry(holder.clone()).or_insert(0) += shares;
        Ok(())
    }

    /// Burn `shares` from `holder`, returning the assets they were worth
    /// against `total_assets`.
    pub fn burn_shares(
        &mut self,
        holder: &Address,
        shares: Amount,
        total_assets: Amount,
    ) -> VaultResult<Amount> {
        if shares == 0 {
            return Err(VaultError::InvalidAmount(
                "share amount must be non-zero".to_string(),
            ));
        }
        let available = self.balance_of(holder);
        if available < shares {
            return Err(VaultError::InsufficientBalance {
                holder: holder.clone(),
                requested: shares,
                available,
            });
        }

        let value = self.share_value(shares, total_assets)?;
        self.debit(holder, shares);
        self.total_supply -= shares;
        Ok(value)
    }

    /// Move shares between holders
    pub fn transfer(&mut self, from: &Address, to: &Address, shares: Amount) -> VaultResult<()> {
        let available = self.balance_of(from);
        if available < shares {
            return Err(VaultError::InsufficientBalance {
                holder: from.clone(),
                requested: shares,
                available,
            });
        }
        if shares == 0 || from == to {
            return Ok(());
        }

        self.debit(from, shares);
        *self.balances.entry(to.clone()).or_insert(0) += shares;
        Ok(())
    }

    fn debit(&mut self, holder: &Address, shares: Amount) {
        if let Some(balance) = self.balances.get_mut(holder) {
            *balance -= shares;
            if *balance == 0 {
                self.balances.remove(holder);
            }
        }
    }
}

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::role::Role;
use crate::error::{VaultError, VaultResult};
use crate::values::{Address, Amount};

/// Liquidation state of a single holder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LiquidationRequest {
    NoRequest,
    /// Holder allows the liquidator to redeem up to this many shares
    Requested(Amount),
}

impl LiquidationRequest {
    pub fn allowance(&self) -> Amount {
        match self {
            LiquidationRequest::NoRequest => 0,
            LiquidationRequest::Requested(amount) => *amount,
        }
    }
}

/// Holder-authorized liquidation allowances and the liquidator allowed to
/// consume them.
///
/// Allowances are set, never accumulated: a new request replaces the old
/// one and a zero request clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LiquidationRegistry {
    liquidator: Option<Address>,
    pending: HashMap<Address, Amount>,
}

impl LiquidationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn liquidator(&self) -> Option<&Address> {
        self.liquidator.as_ref()
    }

    pub fn set_liquidator(&mut self, liquidator: Option<Address>) {
        self.liquidator = liquidator;
    }

    pub fn is_liquidator(&self, caller: &Address) -> bool {
        self.liquidator.as_ref() == Some(caller)
    }

    /// Set the holder's allowance to exactly `amount`
    pub fn adjust(&mut self, holder: &Address, amount: Amount) -> LiquidationRequest {
        if amount == 0 {
            self.pending.remove(holder);
            return LiquidationRequest::NoRequest;
        }
        self.pending.insert(holder.clone(), amount);
        LiquidationRequest::Requested(amount)
    }

    pub fn pending(&self, holder: &Address) -> Amount {
        self.pending.get(holder).copied().unwrap_or(0)
    }

    pub fn state(&self, holder: &Address) -> LiquidationRequest {
        match self.pending.get(holder) {
            Some(amount) => LiquidationRequest::Requested(*amount),
            None => LiquidationRequest::NoRequest,
        }
    }

    /// Number of holders with an open request
    pub fn open_requests(&self) -> usize {
        self.pending.len()
    }

    /// Check that `caller` may liquidate `amount` shares of `holder`
    pub fn authorize(&self, caller: &Address, holder: &Address, amount: Amount) -> VaultResult<()> {
        if !self.is_liquidator(caller) {
            return Err(VaultError::unauthorized(caller, Role::Liquidator));
        }
        let allowance = self.pending(holder);
        if amount > allowance {
            return Err(VaultError::ExceedsAllowance {
                holder: holder.clone(),
                requested: amount,
                allowance,
            });
        }
        Ok(())
    }

    /// Reduce the holder's allowance after an executed liquidation
    pub fn consume(&mut self, holder: &Address, amount: Amount) -> LiquidationRequest {
        let remaining = self.pending(holder).saturating_sub(amount);
        self.adjust(holder, remaining)
    }
}

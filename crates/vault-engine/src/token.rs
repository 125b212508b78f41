//! In-memory asset ledger

use dashmap::DashMap;
use std::sync::Arc;
use strata_core::{Address, Amount, TokenError};
use strata_ports::AssetLedger;

/// In-memory fungible token
///
/// Thread-safe balance storage using DashMap. Cloning shares the balances,
/// so a vault, its strategies and the test holding the token all see the
/// same ledger.
#[derive(Debug, Clone)]
pub struct InMemoryToken {
    address: Address,
    symbol: String,
    decimals: u8,
    balances: Arc<DashMap<Address, Amount>>,
}

impl InMemoryToken {
    pub fn new(symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            address: Address::generate(),
            symbol: symbol.into(),
            decimals,
            balances: Arc::new(DashMap::new()),
        }
    }

    /// Create new units out of thin air
    pub fn mint(&self, to: &Address, amount: Amount) {
        *self.balances.entry(to.clone()).or_insert(0) += amount;
    }

    /// Sum of all balances
    pub fn total_supply(&self) -> Amount {
        self.balances.iter().map(|entry| *entry.value()).sum()
    }
}

impl AssetLedger for InMemoryToken {
    fn asset(&self) -> &Address {
        &self.address
    }

    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn decimals(&self) -> u8 {
        self.decimals
    }

    fn balance_of(&self, holder: &Address) -> Amount {
        self.balances.get(holder).map(|b| *b.value()).unwrap_or(0)
    }

    fn transfer(&self, from: &Address, to: &Address, amount: Amount) -> Result<(), TokenError> {
        // Debit first, never holding two entries at once
        {
            let mut balance = self.balances.entry(from.clone()).or_insert(0);
            if *balance < amount {
                return Err(TokenError::InsufficientBalance {
                    holder: from.clone(),
                    requested: amount,
                    available: *balance,
                });
            }
            *balance -= amount;
        }
        *self.balances.entry(to.clone()).or_insert(0) += amount;
        Ok(())
    }
}

//! Strategy collaborator
//!
//! A minimal strategy that keeps whatever the vault lends it on its own
//! balance. Gains are simulated by minting to the strategy's address, losses
//! by moving tokens away from it.

use log::info;
use std::sync::Arc;
use strata_core::{Address, Amount, DebtAdjustment, HarvestReport, Role, VaultError, VaultResult};
use strata_ports::AssetLedger;

use crate::vault::Vault;

/// A strategy bound to one vault and one asset
#[derive(Clone)]
pub struct Strategy {
    address: Address,
    vault: Address,
    strategist: Address,
    keeper: Address,
    rewards: Address,
    token: Arc<dyn AssetLedger>,
}

impl std::fmt::Debug for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Strategy")
            .field("address", &self.address)
            .field("vault", &self.vault)
            .field("strategist", &self.strategist)
            .field("keeper", &self.keeper)
            .finish()
    }
}

impl Strategy {
    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn vault(&self) -> &Address {
        &self.vault
    }

    pub fn strategist(&self) -> &Address {
        &self.strategist
    }

    pub fn keeper(&self) -> &Address {
        &self.keeper
    }

    pub fn rewards(&self) -> &Address {
        &self.rewards
    }

    /// Everything the strategy manages: its asset balance
    pub fn estimated_total_assets(&self) -> Amount {
        self.token.balance_of(&self.address)
    }

    fn require_strategist(&self, caller: &Address) -> VaultResult<()> {
        if *caller != self.strategist {
            return Err(VaultError::unauthorized(caller, Role::Strategist));
        }
        Ok(())
    }

    fn require_vault(&self, vault: &Vault) -> VaultResult<()> {
        if *vault.address() != self.vault {
            return Err(VaultError::unauthorized(&self.address, Role::Strategy));
        }
        Ok(())
    }

    /// Strategist, keeper, or the vault's governance or management
    fn require_operator(&self, caller: &Address, vault: &Vault) -> VaultResult<()> {
        let authorized =
            *caller == self.strategist || *caller == self.keeper || vault.is_manager(caller);
        if !authorized {
            return Err(VaultError::unauthorized(caller, Role::Keeper));
        }
        self.require_vault(vault)
    }

    /// Strategist only
    pub fn set_keeper(&mut self, caller: &Address, keeper: Address) -> VaultResult<()> {
        self.require_strategist(caller)?;
        self.keeper = keeper;
        Ok(())
    }

    /// Work out gain, loss and debt repayment from the current holdings and
    /// report them to the vault.
    ///
    /// Callable by the strategist, the keeper, or the vault's governance or
    /// management.
    pub fn harvest(&self, caller: &Address, vault: &mut Vault) -> VaultResult<DebtAdjustment> {
        self.require_operator(caller, vault)?;

        let report = self.prepare_report(vault)?;
        let adjustment = vault.report(&self.address, report)?;

        info!(
            "Strategy {} harvested by {}: {:?}",
            self.address, caller, adjustment.transfer
        );
        Ok(adjustment)
    }

    fn prepare_report(&self, vault: &Vault) -> VaultResult<HarvestReport> {
        let record = vault
            .strategy(&self.address)
            .ok_or_else(|| VaultError::StrategyNotFound(self.address.clone()))?;
        let outstanding = vault.debt_outstanding(&self.address)?;
        let held = self.estimated_total_assets();

        // Repay first, then measure what is left against what is still owed
        let debt_payment = outstanding.min(held);
        let remaining = held - debt_payment;
        let debt = record.total_debt.saturating_sub(debt_payment);

        let (gain, loss) = if remaining > debt {
            (remaining - debt, 0)
        } else {
            (0, debt - remaining)
        };

        Ok(HarvestReport {
            gain,
            loss,
            debt_payment,
        })
    }

    /// Hand the vault shares the strategy earned as fees to its rewards
    /// address. Same callers as `harvest`.
    pub fn distribute_rewards(&self, caller: &Address, vault: &mut Vault) -> VaultResult<Amount> {
        self.require_operator(caller, vault)?;

        let shares = vault.balance_of(&self.address);
        if shares > 0 {
            vault.transfer(&self.address, &self.rewards, shares)?;
            info!(
                "Strategy {} sent {} fee shares to {}",
                self.address, shares, self.rewards
            );
        }
        Ok(shares)
    }

    /// Strategist only: flip whether the vault treats this strategy's debt
    /// as delegated
    pub fn toggle_delegation(&self, caller: &Address, vault: &mut Vault) -> VaultResult<Amount> {
        self.require_strategist(caller)?;
        self.require_vault(vault)?;

        let delegated = vault
            .strategy(&self.address)
            .map(|record| record.delegated)
            .ok_or_else(|| VaultError::StrategyNotFound(self.address.clone()))?;
        vault.set_strategy_delegation(&self.address, !delegated)
    }

    pub fn delegated_assets(&self, vault: &Vault) -> VaultResult<Amount> {
        vault.delegated_assets(&self.address)
    }
}

/// Deploys strategies and clones of existing ones
pub struct StrategyFactory;

impl StrategyFactory {
    /// New strategy for `vault`; the strategist also starts as keeper and
    /// rewards recipient
    pub fn deploy(vault: &Vault, strategist: Address) -> Strategy {
        let strategy = Strategy {
            address: Address::generate(),
            vault: vault.address().clone(),
            keeper: strategist.clone(),
            rewards: strategist.clone(),
            strategist,
            token: vault.token(),
        };
        info!("Deployed strategy {} for {}", strategy.address, strategy.vault);
        strategy
    }

    /// Independent instance sharing the template's vault and asset, with a
    /// fresh address and its own operators
    pub fn clone_strategy(
        template: &Strategy,
        strategist: Address,
        rewards: Address,
        keeper: Address,
    ) -> Strategy {
        let clone = Strategy {
            address: Address::generate(),
            vault: template.vault.clone(),
            strategist,
            keeper,
            rewards,
            token: Arc::clone(&template.token),
        };
        info!("Cloned strategy {} into {}", template.address, clone.address);
        clone
    }
}

//! Vault orchestration
//!
//! A [`Vault`] composes the share ledger, the strategy allocation table and
//! the liquidation registry behind one consistency boundary. Every mutating
//! entry point:
//!
//! 1. checks the caller's role (guard clauses, before any mutation)
//! 2. runs against a cloned draft of the vault state
//! 3. moves tokens as its last step
//! 4. commits the draft only if all of the above succeeded

use log::{debug, info, warn};
use std::sync::Arc;
use strata_config::VaultConfig;
use strata_core::{
    Address, Amount, Bps, DebtAdjustment, FeeRates, HarvestContext, HarvestReport,
    LiquidationRegistry, LiquidationRequest, NetTransfer, Role, ShareLedger,
    StrategyAllocationTable, StrategyParams, StrategyRecord, Timestamp, VaultError, VaultResult,
};
use strata_ports::{AssetLedger, Clock};

use crate::snapshot::VaultSnapshot;

/// Mutable accounting state, cloned into a draft for every operation
#[derive(Debug, Clone)]
struct VaultState {
    governance: Address,
    shares: ShareLedger,
    strategies: StrategyAllocationTable,
    liquidations: LiquidationRegistry,
    /// Assets held by the vault itself
    total_idle: Amount,
    deposit_limit: Amount,
    emergency_shutdown: bool,
    last_report: Timestamp,
}

impl VaultState {
    fn total_assets(&self) -> Amount {
        self.total_idle + self.strategies.total_debt()
    }
}

/// Read-only collaborators handed to an operation
struct Env<'a> {
    address: &'a Address,
    token: &'a dyn AssetLedger,
    config: &'a VaultConfig,
    now: Timestamp,
}

impl Env<'_> {
    /// Pass if `caller` holds any of `roles`. Governance is the vault's
    /// own; every other role is read from the configuration.
    fn authorize(&self, state: &VaultState, caller: &Address, roles: &[Role]) -> VaultResult<()> {
        let allowed = roles.iter().any(|role| match role {
            Role::Governance => state.governance == *caller,
            Role::Strategy => state.strategies.contains(caller),
            Role::Liquidator => state.liquidations.is_liquidator(caller),
            other => self.config.has_role(caller, *other),
        });
        if allowed {
            Ok(())
        } else {
            Err(VaultError::unauthorized(
                caller,
                roles.first().copied().unwrap_or(Role::Governance),
            ))
        }
    }

    fn pay_out(&self, to: &Address, amount: Amount) -> VaultResult<()> {
        self.token.transfer(self.address, to, amount)?;
        Ok(())
    }

    fn pull_in(&self, from: &Address, amount: Amount) -> VaultResult<()> {
        self.token.transfer(from, self.address, amount)?;
        Ok(())
    }
}

/// A yield vault over one underlying asset
pub struct Vault {
    address: Address,
    name: String,
    symbol: String,
    token: Arc<dyn AssetLedger>,
    config: Arc<VaultConfig>,
    clock: Arc<dyn Clock>,
    state: VaultState,
}

impl std::fmt::Debug for Vault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vault")
            .field("address", &self.address)
            .field("name", &self.name)
            .field("asset", self.token.asset())
            .field("state", &self.state)
            .finish()
    }
}

impl Vault {
    /// Create a vault named `"<SYMBOL> Vault"` / `"yfv-<SYMBOL>"` with a
    /// zero deposit limit, no liquidator and no strategies
    pub fn new(
        token: Arc<dyn AssetLedger>,
        config: Arc<VaultConfig>,
        governance: Address,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let name = format!("{} Vault", token.symbol());
        let symbol = format!("yfv-{}", token.symbol());
        let state = VaultState {
            governance,
            shares: ShareLedger::new(token.decimals()),
            strategies: StrategyAllocationTable::new(),
            liquidations: LiquidationRegistry::new(),
            total_idle: 0,
            deposit_limit: 0,
            emergency_shutdown: false,
            last_report: clock.now(),
        };

        Self {
            address: Address::generate(),
            name,
            symbol,
            token,
            config,
            clock,
            state,
        }
    }

    /// Override the display name and share symbol
    pub fn with_name(mut self, name: impl Into<String>, symbol: impl Into<String>) -> Self {
        self.name = name.into();
        self.symbol = symbol.into();
        self
    }

    /// Run `op` against a draft of the state, committing only on success.
    ///
    /// The draft is a full clone of the state, share balances and pending
    /// liquidations included, so every mutating call costs time linear in
    /// the number of holders and strategies.
    fn transact<T>(
        &mut self,
        op: &str,
        f: impl FnOnce(&Env<'_>, &mut VaultState) -> VaultResult<T>,
    ) -> VaultResult<T> {
        let env = Env {
            address: &self.address,
            token: self.token.as_ref(),
            config: self.config.as_ref(),
            now: self.clock.now(),
        };
        let mut draft = self.state.clone();

        match f(&env, &mut draft) {
            Ok(value) => {
                self.state = draft;
                Ok(value)
            }
            Err(err) => {
                warn!("{} on {} rejected: {}", op, self.address, err);
                Err(err)
            }
        }
    }

    // ========================================================================
    // Governance setters
    // ========================================================================

    pub fn set_deposit_limit(&mut self, caller: &Address, limit: Amount) -> VaultResult<()> {
        self.transact("set_deposit_limit", |env, s| {
            env.authorize(s, caller, &[Role::Governance])?;
            s.deposit_limit = limit;
            info!("Deposit limit of {} set to {}", env.address, limit);
            Ok(())
        })
    }

    /// Designate (or clear) the identity allowed to execute liquidations
    pub fn set_liquidator(&mut self, caller: &Address, liquidator: Option<Address>) -> VaultResult<()> {
        self.transact("set_liquidator", |env, s| {
            env.authorize(s, caller, &[Role::Governance])?;
            info!("Liquidator of {} set to {:?}", env.address, liquidator);
            s.liquidations.set_liquidator(liquidator);
            Ok(())
        })
    }

    pub fn set_governance(&mut self, caller: &Address, governance: Address) -> VaultResult<()> {
        self.transact("set_governance", |env, s| {
            env.authorize(s, caller, &[Role::Governance])?;
            info!("Governance of {} moved to {}", env.address, governance);
            s.governance = governance;
            Ok(())
        })
    }

    /// Guardian or governance may activate; only governance may deactivate
    pub fn set_emergency_shutdown(&mut self, caller: &Address, active: bool) -> VaultResult<()> {
        self.transact("set_emergency_shutdown", |env, s| {
            if active {
                env.authorize(s, caller, &[Role::Guardian, Role::Governance])?;
            } else {
                env.authorize(s, caller, &[Role::Governance])?;
            }
            s.emergency_shutdown = active;
            warn!("Emergency shutdown of {} set to {}", env.address, active);
            Ok(())
        })
    }

    // ========================================================================
    // Deposits & withdrawals
    // ========================================================================

    /// Deposit `amount` of the asset from `caller`, returning minted shares
    pub fn deposit(&mut self, caller: &Address, amount: Amount) -> VaultResult<Amount> {
        self.transact("deposit", |env, s| {
            if s.emergency_shutdown {
                return Err(VaultError::EmergencyShutdown);
            }
            if amount == 0 {
                return Err(VaultError::InvalidAmount(
                    "deposit amount must be non-zero".to_string(),
                ));
            }
            let total_assets = s.total_assets();
            let attempted = total_assets
                .checked_add(amount)
                .ok_or(VaultError::MathOverflow)?;
            if attempted > s.deposit_limit {
                return Err(VaultError::DepositLimitExceeded {
                    limit: s.deposit_limit,
                    attempted,
                });
            }

            let shares = s.shares.issue_shares(caller, amount, total_assets)?;
            s.total_idle += amount;
            env.pull_in(caller, amount)?;

            info!(
                "{} deposited {} into {} for {} shares",
                caller, amount, env.address, shares
            );
            Ok(shares)
        })
    }

    /// Deposit the caller's whole balance, capped by the remaining limit
    pub fn deposit_all(&mut self, caller: &Address) -> VaultResult<Amount> {
        let amount = self
            .token
            .balance_of(caller)
            .min(self.available_deposit_limit());
        self.deposit(caller, amount)
    }

    /// Redeem `shares` for assets paid out of idle funds
    pub fn withdraw(&mut self, caller: &Address, shares: Amount) -> VaultResult<Amount> {
        self.transact("withdraw", |env, s| {
            let total_assets = s.total_assets();
            let value = s.shares.burn_shares(caller, shares, total_assets)?;
            if value == 0 {
                return Err(VaultError::InvalidAmount(format!(
                    "{} shares are worth no assets",
                    shares
                )));
            }
            if value > s.total_idle {
                return Err(VaultError::InsufficientLiquidity {
                    requested: value,
                    idle: s.total_idle,
                });
            }
            s.total_idle -= value;
            env.pay_out(caller, value)?;

            info!(
                "{} withdrew {} from {} burning {} shares",
                caller, value, env.address, shares
            );
            Ok(value)
        })
    }

    pub fn withdraw_all(&mut self, caller: &Address) -> VaultResult<Amount> {
        let shares = self.balance_of(caller);
        self.withdraw(caller, shares)
    }

    /// Move shares from the caller to `to`
    pub fn transfer(&mut self, caller: &Address, to: &Address, shares: Amount) -> VaultResult<()> {
        self.transact("transfer", |_, s| s.shares.transfer(caller, to, shares))
    }

    // ========================================================================
    // Liquidations
    // ========================================================================

    /// Set the caller's own liquidation allowance to exactly `amount`
    pub fn adjust_liquidation_request(
        &mut self,
        caller: &Address,
        amount: Amount,
    ) -> VaultResult<LiquidationRequest> {
        self.transact("adjust_liquidation_request", |env, s| {
            let request = s.liquidations.adjust(caller, amount);
            info!(
                "{} liquidation request on {} now {:?}",
                caller, env.address, request
            );
            Ok(request)
        })
    }

    /// Burn `amount` of the holder's shares and pay the holder the assets.
    /// Designated liquidator only, within the holder's allowance.
    pub fn liquidate(&mut self, caller: &Address, amount: Amount, holder: &Address) -> VaultResult<Amount> {
        self.transact("liquidate", |env, s| {
            s.liquidations.authorize(caller, holder, amount)?;

            let total_assets = s.total_assets();
            let value = s.shares.burn_shares(holder, amount, total_assets)?;
            if value > s.total_idle {
                return Err(VaultError::InsufficientLiquidity {
                    requested: value,
                    idle: s.total_idle,
                });
            }
            s.total_idle -= value;
            s.liquidations.consume(holder, amount);
            env.pay_out(holder, value)?;

            info!(
                "{} liquidated {} shares of {} on {} for {}",
                caller, amount, holder, env.address, value
            );
            Ok(value)
        })
    }

    // ========================================================================
    // Strategies
    // ========================================================================

    /// Register a strategy. Governance only.
    pub fn add_strategy(
        &mut self,
        caller: &Address,
        strategy: &Address,
        params: StrategyParams,
    ) -> VaultResult<()> {
        self.transact("add_strategy", |env, s| {
            env.authorize(s, caller, &[Role::Governance])?;
            s.strategies.add_strategy(strategy, &params, env.now)?;
            info!(
                "Strategy {} added to {} with debt ratio {} bps",
                strategy, env.address, params.debt_ratio
            );
            Ok(())
        })
    }

    /// Governance only; capped at FEE_MAX / 2
    pub fn update_strategy_performance_fee(
        &mut self,
        caller: &Address,
        strategy: &Address,
        fee: Bps,
    ) -> VaultResult<()> {
        self.transact("update_strategy_performance_fee", |env, s| {
            env.authorize(s, caller, &[Role::Governance])?;
            s.strategies.update_performance_fee(strategy, fee)
        })
    }

    pub fn update_strategy_debt_ratio(
        &mut self,
        caller: &Address,
        strategy: &Address,
        debt_ratio: Bps,
    ) -> VaultResult<()> {
        self.transact("update_strategy_debt_ratio", |env, s| {
            env.authorize(s, caller, &[Role::Governance, Role::Management])?;
            s.strategies.update_debt_ratio(strategy, debt_ratio)
        })
    }

    pub fn update_strategy_min_debt_per_harvest(
        &mut self,
        caller: &Address,
        strategy: &Address,
        min: Amount,
    ) -> VaultResult<()> {
        self.transact("update_strategy_min_debt_per_harvest", |env, s| {
            env.authorize(s, caller, &[Role::Governance, Role::Management])?;
            s.strategies.update_min_debt_per_harvest(strategy, min)
        })
    }

    pub fn update_strategy_max_debt_per_harvest(
        &mut self,
        caller: &Address,
        strategy: &Address,
        max: Amount,
    ) -> VaultResult<()> {
        self.transact("update_strategy_max_debt_per_harvest", |env, s| {
            env.authorize(s, caller, &[Role::Governance, Role::Management])?;
            s.strategies.update_max_debt_per_harvest(strategy, max)
        })
    }

    /// Zero the strategy's debt ratio so it divests. Governance or guardian.
    pub fn revoke_strategy(&mut self, caller: &Address, strategy: &Address) -> VaultResult<()> {
        self.transact("revoke_strategy", |env, s| {
            env.authorize(s, caller, &[Role::Governance, Role::Guardian])?;
            s.strategies.revoke(strategy)?;
            info!("Strategy {} revoked on {}", strategy, env.address);
            Ok(())
        })
    }

    /// Flag the calling strategy's debt as delegated (or not)
    pub fn set_strategy_delegation(&mut self, strategy: &Address, delegated: bool) -> VaultResult<Amount> {
        self.transact("set_strategy_delegation", |env, s| {
            env.authorize(s, strategy, &[Role::Strategy])?;
            let delegated_assets = s.strategies.set_delegation(strategy, delegated)?;
            debug!(
                "Strategy {} on {} delegated={} ({} assets)",
                strategy, env.address, delegated, delegated_assets
            );
            Ok(delegated_assets)
        })
    }

    /// Strategy report: book gain/loss, pay fees in shares, settle debt
    pub fn report(&mut self, strategy: &Address, report: HarvestReport) -> VaultResult<DebtAdjustment> {
        self.transact("report", |env, s| {
            env.authorize(s, strategy, &[Role::Strategy])?;

            let required = report
                .gain
                .checked_add(report.debt_payment)
                .ok_or(VaultError::MathOverflow)?;
            let held = env.token.balance_of(strategy);
            if held < required {
                return Err(VaultError::InsufficientBalance {
                    holder: strategy.clone(),
                    requested: required,
                    available: held,
                });
            }

            let rates = env.config.fee_rates(env.address)?;
            let total_assets = s.total_assets();
            let adjustment = s.strategies.report_harvest(
                strategy,
                &report,
                &HarvestContext {
                    total_assets,
                    total_idle: s.total_idle,
                    emergency_shutdown: s.emergency_shutdown,
                    now: env.now,
                    rates,
                },
            )?;

            // Fee shares are priced before the gain lands in the vault
            let fees = adjustment.fees;
            if !fees.is_empty() {
                let pre_gain_assets = total_assets - report.loss;
                let minted = s.shares.shares_for_fees(fees.total(), pre_gain_assets)?;
                let split = fees.split_shares(minted)?;
                s.shares.mint_shares(&env.config.rewards(), split.rewards)?;
                s.shares.mint_shares(strategy, split.strategist)?;
                s.shares.mint_shares(&env.config.partner(), split.partner)?;
                debug!(
                    "Harvest fees on {}: {:?} minted as {:?}",
                    env.address, fees, split
                );
            }

            s.total_idle = s
                .total_idle
                .checked_add(adjustment.gain)
                .and_then(|idle| idle.checked_add(adjustment.debt_payment))
                .and_then(|idle| idle.checked_sub(adjustment.credit))
                .ok_or(VaultError::MathOverflow)?;
            s.last_report = env.now;

            match adjustment.transfer {
                NetTransfer::ToStrategy(amount) => env.pay_out(strategy, amount)?,
                NetTransfer::FromStrategy(amount) => env.pull_in(strategy, amount)?,
                NetTransfer::None => {}
            }

            info!(
                "Strategy {} reported to {}: gain {} loss {} debt payment {} credit {}",
                strategy,
                env.address,
                adjustment.gain,
                adjustment.loss,
                adjustment.debt_payment,
                adjustment.credit
            );
            Ok(adjustment)
        })
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.state.shares.decimals()
    }

    pub fn token(&self) -> Arc<dyn AssetLedger> {
        Arc::clone(&self.token)
    }

    pub fn config(&self) -> &Arc<VaultConfig> {
        &self.config
    }

    pub fn governance(&self) -> &Address {
        &self.state.governance
    }

    /// Whether `caller` may act as governance or management of this vault
    pub fn is_manager(&self, caller: &Address) -> bool {
        self.state.governance == *caller || self.config.has_role(caller, Role::Management)
    }

    pub fn total_supply(&self) -> Amount {
        self.state.shares.total_supply()
    }

    pub fn balance_of(&self, holder: &Address) -> Amount {
        self.state.shares.balance_of(holder)
    }

    pub fn total_assets(&self) -> Amount {
        self.state.total_assets()
    }

    pub fn total_idle(&self) -> Amount {
        self.state.total_idle
    }

    pub fn total_debt(&self) -> Amount {
        self.state.strategies.total_debt()
    }

    pub fn debt_ratio(&self) -> Bps {
        self.state.strategies.debt_ratio()
    }

    /// Value of one whole share, scaled by `10^decimals`
    pub fn price_per_share(&self) -> VaultResult<Amount> {
        self.state.shares.price_per_share(self.state.total_assets())
    }

    pub fn deposit_limit(&self) -> Amount {
        self.state.deposit_limit
    }

    pub fn available_deposit_limit(&self) -> Amount {
        self.state
            .deposit_limit
            .saturating_sub(self.state.total_assets())
    }

    pub fn emergency_shutdown(&self) -> bool {
        self.state.emergency_shutdown
    }

    pub fn last_report(&self) -> Timestamp {
        self.state.last_report
    }

    pub fn liquidator(&self) -> Option<&Address> {
        self.state.liquidations.liquidator()
    }

    pub fn pending_liquidations(&self, holder: &Address) -> Amount {
        self.state.liquidations.pending(holder)
    }

    pub fn liquidation_request(&self, holder: &Address) -> LiquidationRequest {
        self.state.liquidations.state(holder)
    }

    pub fn strategy(&self, strategy: &Address) -> Option<StrategyRecord> {
        self.state.strategies.get(strategy).cloned()
    }

    pub fn credit_available(&self, strategy: &Address) -> VaultResult<Amount> {
        self.state.strategies.credit_available(
            strategy,
            self.state.total_assets(),
            self.state.total_idle,
            self.state.emergency_shutdown,
        )
    }

    pub fn debt_outstanding(&self, strategy: &Address) -> VaultResult<Amount> {
        self.state.strategies.debt_outstanding(
            strategy,
            self.state.total_assets(),
            self.state.emergency_shutdown,
        )
    }

    pub fn delegated_assets(&self, strategy: &Address) -> VaultResult<Amount> {
        self.state.strategies.delegated_assets(strategy)
    }

    /// Reporting view with decimal price and rates
    pub fn snapshot(&self) -> VaultResult<VaultSnapshot> {
        let rates = self.config.fee_rates(&self.address).ok();
        VaultSnapshot::build(
            self.address.clone(),
            self.name.clone(),
            self.symbol.clone(),
            SnapshotInputs {
                decimals: self.decimals(),
                total_supply: self.total_supply(),
                total_assets: self.total_assets(),
                total_idle: self.total_idle(),
                total_debt: self.total_debt(),
                debt_ratio: self.debt_ratio(),
                deposit_limit: self.deposit_limit(),
                emergency_shutdown: self.emergency_shutdown(),
                price_per_share: self.price_per_share()?,
                rates: rates.unwrap_or_else(FeeRates::zero),
                registered: rates.is_some(),
                strategies: self.state.strategies.len(),
                open_liquidations: self.state.liquidations.open_requests(),
                last_report: self.last_report(),
            },
        )
    }
}

/// Raw figures a snapshot is built from
pub(crate) struct SnapshotInputs {
    pub decimals: u8,
    pub total_supply: Amount,
    pub total_assets: Amount,
    pub total_idle: Amount,
    pub total_debt: Amount,
    pub debt_ratio: Bps,
    pub deposit_limit: Amount,
    pub emergency_shutdown: bool,
    pub price_per_share: Amount,
    pub rates: FeeRates,
    pub registered: bool,
    pub strategies: usize,
    pub open_liquidations: usize,
    pub last_report: Timestamp,
}

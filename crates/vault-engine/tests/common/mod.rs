//! Shared fixtures: named accounts, a configured vault over a fresh token
//! and a strategy attached at 40% of the vault.

#![allow(dead_code)]

use std::sync::Arc;
use vault_engine::{
    Address, Amount, AssetLedger, InMemoryToken, ManualClock, Strategy, StrategyFactory,
    StrategyParams, Vault, VaultConfig,
};

/// Token decimals every test runs over
pub const DECIMALS: [u8; 3] = [2, 8, 18];

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn unit(decimals: u8) -> Amount {
    10u128.pow(u32::from(decimals))
}

#[derive(Debug, Clone)]
pub struct Accounts {
    pub gov: Address,
    pub rewards: Address,
    pub guardian: Address,
    pub management: Address,
    pub partner: Address,
    pub approver: Address,
    pub strategist: Address,
    pub keeper: Address,
    pub liquidator: Address,
    pub rando: Address,
}

impl Accounts {
    pub fn new() -> Self {
        Self {
            gov: Address::new("gov"),
            rewards: Address::new("rewards"),
            guardian: Address::new("guardian"),
            management: Address::new("management"),
            partner: Address::new("partner"),
            approver: Address::new("approver"),
            strategist: Address::new("strategist"),
            keeper: Address::new("keeper"),
            liquidator: Address::new("liquidator"),
            rando: Address::new("rando"),
        }
    }
}

pub struct Fixture {
    pub accounts: Accounts,
    pub token: InMemoryToken,
    pub config: Arc<VaultConfig>,
    pub clock: ManualClock,
    pub vault: Vault,
}

impl Fixture {
    /// Empty vault with an unlimited deposit limit and the liquidator set.
    /// Governance starts with 1000 whole tokens.
    pub fn new(decimals: u8) -> Self {
        init_logger();
        let accounts = Accounts::new();
        let a = &accounts;

        let token = InMemoryToken::new("TKN", decimals);
        token.mint(&a.gov, 1_000 * unit(decimals));

        let config = Arc::new(VaultConfig::new(a.gov.clone()));
        config
            .initialize(
                &a.gov,
                a.partner.clone(),
                a.management.clone(),
                a.guardian.clone(),
                a.rewards.clone(),
                a.approver.clone(),
            )
            .unwrap();
        config.whitelist(&a.approver, &a.gov).unwrap();

        let clock = ManualClock::starting_now();
        let mut vault = Vault::new(
            Arc::new(token.clone()),
            Arc::clone(&config),
            a.gov.clone(),
            Arc::new(clock.clone()),
        );
        vault.set_deposit_limit(&a.gov, Amount::MAX).unwrap();
        vault
            .set_liquidator(&a.gov, Some(a.liquidator.clone()))
            .unwrap();
        config.add_vault(&a.gov, vault.address()).unwrap();

        Self {
            accounts,
            token,
            config,
            clock,
            vault,
        }
    }

    /// Vault holding half of governance's tokens
    pub fn seeded(decimals: u8) -> Self {
        let mut f = Self::new(decimals);
        let half = f.token.balance_of(&f.accounts.gov) / 2;
        f.vault.deposit(&f.accounts.gov, half).unwrap();
        f
    }

    pub fn gov(&self) -> Address {
        self.accounts.gov.clone()
    }

    pub fn unit(&self) -> Amount {
        unit(self.vault.decimals())
    }

    pub fn vault_token_balance(&self) -> Amount {
        self.token.balance_of(self.vault.address())
    }

    /// Strategy at 40% debt ratio, unbounded per-harvest debt and a 10%
    /// strategist fee; optionally a clone of a freshly deployed template
    pub fn add_strategy(&mut self, cloned: bool) -> Strategy {
        let a = &self.accounts;
        let mut strategy = StrategyFactory::deploy(&self.vault, a.strategist.clone());
        if cloned {
            strategy = StrategyFactory::clone_strategy(
                &strategy,
                a.strategist.clone(),
                a.rewards.clone(),
                a.keeper.clone(),
            );
        }
        strategy
            .set_keeper(&a.strategist, a.keeper.clone())
            .unwrap();

        self.vault
            .add_strategy(
                &a.gov,
                strategy.address(),
                StrategyParams::new(4_000).with_performance_fee(1_000),
            )
            .unwrap();
        strategy
    }

    /// Simulate strategy profit: governance sends it tokens
    pub fn airdrop(&self, strategy: &Strategy, amount: Amount) {
        self.token
            .transfer(&self.accounts.gov, strategy.address(), amount)
            .unwrap();
    }

    pub fn assert_accounting_consistent(&self) {
        assert_eq!(
            self.vault.total_assets(),
            self.vault.total_idle() + self.vault.total_debt()
        );
        assert_eq!(self.vault_token_balance(), self.vault.total_idle());
    }
}

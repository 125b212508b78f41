//! Harvest fees
//!
//! Vault-level performance fee and management fee go to rewards, the
//! strategy-level performance fee to the strategy, the partner fee to the
//! partner. All are paid in freshly minted shares and never exceed the gain.

mod common;

use chrono::Duration;
use common::{DECIMALS, Fixture};
use vault_engine::{FEE_MAX, StrategyFactory, StrategyParams, VaultError};

const YEAR_DAYS: i64 = 365;

/// Configure the vault rates, failing the test on any rejection
fn set_rates(f: &Fixture, management: u32, performance: u32, partner: u32) {
    let a = &f.accounts;
    let vault = f.vault.address();
    f.config.update_management_fee(&a.gov, vault, management).unwrap();
    f.config.update_performance_fee(&a.gov, vault, performance).unwrap();
    f.config.update_partner_fee(&a.partner, vault, partner).unwrap();
}

#[test]
fn test_performance_fees() {
    for decimals in DECIMALS {
        let mut f = Fixture::seeded(decimals);
        let a = f.accounts.clone();
        set_rates(&f, 0, 450, 0);

        let strategy = StrategyFactory::deploy(&f.vault, a.strategist.clone());
        f.vault
            .add_strategy(
                &a.gov,
                strategy.address(),
                StrategyParams::new(2_000)
                    .with_debt_bounds(1_000, 1_000)
                    .with_performance_fee(50),
            )
            .unwrap();

        assert_eq!(f.vault.balance_of(&a.rewards), 0);
        assert_eq!(f.vault.balance_of(strategy.address()), 0);

        let one = f.unit();
        f.airdrop(&strategy, one);
        f.clock.advance(Duration::seconds(1));
        strategy.harvest(&a.strategist, &mut f.vault).unwrap();

        assert_eq!(f.vault.balance_of(&a.rewards), one * 450 / 10_000);
        assert_eq!(f.vault.balance_of(strategy.address()), one * 50 / 10_000);
        f.assert_accounting_consistent();
    }
}

#[test]
fn test_partner_fees() {
    for decimals in DECIMALS {
        let mut f = Fixture::seeded(decimals);
        let a = f.accounts.clone();
        set_rates(&f, 0, 0, 1_000);

        let strategy = StrategyFactory::deploy(&f.vault, a.strategist.clone());
        f.vault
            .add_strategy(
                &a.gov,
                strategy.address(),
                StrategyParams::new(2_000).with_debt_bounds(1_000, 1_000),
            )
            .unwrap();

        let one = f.unit();
        f.airdrop(&strategy, one);
        f.clock.advance(Duration::seconds(1));
        strategy.harvest(&a.strategist, &mut f.vault).unwrap();

        assert_eq!(f.vault.balance_of(&a.partner), one / 10);
        assert_eq!(f.vault.balance_of(&a.rewards), 0);
        assert_eq!(f.vault.balance_of(strategy.address()), 0);
    }
}

#[test]
fn test_zero_fees() {
    for decimals in DECIMALS {
        let mut f = Fixture::seeded(decimals);
        let a = f.accounts.clone();
        set_rates(&f, 0, 0, 0);

        let strategy = StrategyFactory::deploy(&f.vault, a.strategist.clone());
        f.vault
            .add_strategy(
                &a.gov,
                strategy.address(),
                StrategyParams::new(2_000).with_debt_bounds(1_000, 1_000),
            )
            .unwrap();

        let supply_before = f.vault.total_supply();
        f.airdrop(&strategy, f.unit());
        f.clock.advance(Duration::seconds(1));
        strategy.harvest(&a.strategist, &mut f.vault).unwrap();

        let vault = f.vault.address();
        assert_eq!(f.config.management_fee(vault).unwrap(), 0);
        assert_eq!(f.config.performance_fee(vault).unwrap(), 0);
        assert_eq!(f.vault.strategy(strategy.address()).unwrap().performance_fee, 0);
        assert_eq!(f.vault.balance_of(&a.rewards), 0);
        assert_eq!(f.vault.balance_of(strategy.address()), 0);
        assert_eq!(f.vault.balance_of(&a.partner), 0);
        assert_eq!(f.vault.total_supply(), supply_before);
        // The whole gain went to depositors
        assert_eq!(f.vault.total_assets(), supply_before + f.unit());
    }
}

#[test]
fn test_max_fees() {
    let mut f = Fixture::seeded(18);
    let a = f.accounts.clone();
    let vault = f.vault.address().clone();

    // Performance fee capped at half of FEE_MAX
    f.config
        .update_performance_fee(&a.gov, &vault, FEE_MAX / 2)
        .unwrap();
    assert!(matches!(
        f.config.update_performance_fee(&a.gov, &vault, FEE_MAX / 2 + 1),
        Err(VaultError::FeeTooHigh { .. })
    ));

    // Management fee capped at FEE_MAX
    f.config.update_management_fee(&a.gov, &vault, FEE_MAX).unwrap();
    assert!(f
        .config
        .update_management_fee(&a.gov, &vault, FEE_MAX + 1)
        .is_err());

    // Strategy fee checked on registration
    let strategy = StrategyFactory::deploy(&f.vault, a.strategist.clone());
    let too_high = StrategyParams::new(2_000)
        .with_debt_bounds(1_000, 1_000)
        .with_performance_fee(FEE_MAX / 2 + 1);
    assert!(f.vault.add_strategy(&a.gov, strategy.address(), too_high).is_err());
    assert!(f.vault.strategy(strategy.address()).is_none());

    // ...and on update, whatever the vault-level fee is
    let at_cap = StrategyParams::new(2_000)
        .with_debt_bounds(1_000, 1_000)
        .with_performance_fee(FEE_MAX / 2);
    f.vault.add_strategy(&a.gov, strategy.address(), at_cap).unwrap();
    assert!(f
        .vault
        .update_strategy_performance_fee(&a.gov, strategy.address(), FEE_MAX / 2 + 1)
        .is_err());

    f.config.update_performance_fee(&a.gov, &vault, 0).unwrap();
    f.vault
        .update_strategy_performance_fee(&a.gov, strategy.address(), FEE_MAX / 2)
        .unwrap();
    assert!(f
        .vault
        .update_strategy_performance_fee(&a.gov, strategy.address(), FEE_MAX / 2 + 1)
        .is_err());
    assert_eq!(
        f.vault.strategy(strategy.address()).unwrap().performance_fee,
        FEE_MAX / 2
    );
}

#[test]
fn test_strategy_fee_update_is_governance_only() {
    let mut f = Fixture::seeded(18);
    let strategy = f.add_strategy(false);
    let management = f.accounts.management.clone();

    let result = f
        .vault
        .update_strategy_performance_fee(&management, strategy.address(), 0);
    assert!(matches!(result, Err(VaultError::Unauthorized { .. })));
}

#[test]
fn test_delegated_fees() {
    for cloned in [false, true] {
        let mut f = Fixture::seeded(18);
        let a = f.accounts.clone();
        let strategy = f.add_strategy(cloned);

        // Make sure funds are in the strategy
        f.clock.advance(Duration::seconds(1));
        strategy.harvest(&a.keeper, &mut f.vault).unwrap();
        assert!(strategy.estimated_total_assets() > 0);

        // No performance fees, only management
        f.config
            .update_performance_fee(&a.gov, f.vault.address(), 0)
            .unwrap();
        f.vault
            .update_strategy_performance_fee(&a.gov, strategy.address(), 0)
            .unwrap();

        // A year at 2% management fee
        let before = f.vault.balance_of(&a.rewards);
        f.clock.advance(Duration::days(YEAR_DAYS));
        f.airdrop(&strategy, f.unit());
        strategy.harvest(&a.keeper, &mut f.vault).unwrap();
        assert!(f.vault.balance_of(&a.rewards) > before);

        strategy.toggle_delegation(&a.strategist, &mut f.vault).unwrap();
        assert_eq!(
            strategy.delegated_assets(&f.vault).unwrap(),
            f.vault.strategy(strategy.address()).unwrap().total_debt
        );

        // Delegated assets pay no management fee
        let before = f.vault.balance_of(&a.rewards);
        f.clock.advance(Duration::days(YEAR_DAYS));
        f.airdrop(&strategy, f.unit());
        strategy.harvest(&a.keeper, &mut f.vault).unwrap();
        assert_eq!(f.vault.balance_of(&a.rewards), before);
    }
}

#[test]
fn test_only_strategist_toggles_delegation() {
    let mut f = Fixture::seeded(18);
    let strategy = f.add_strategy(false);
    let keeper = f.accounts.keeper.clone();

    assert!(strategy.toggle_delegation(&keeper, &mut f.vault).is_err());
    assert_eq!(strategy.delegated_assets(&f.vault).unwrap(), 0);
}

#[test]
fn test_gain_less_than_fees() {
    for decimals in DECIMALS {
        let mut f = Fixture::seeded(decimals);
        let a = f.accounts.clone();
        let strategy = f.add_strategy(false);

        f.clock.advance(Duration::seconds(1));
        strategy.harvest(&a.keeper, &mut f.vault).unwrap();
        assert!(strategy.estimated_total_assets() > 0);

        f.airdrop(&strategy, f.unit());

        // Nobody has earned fees yet
        assert_eq!(f.vault.balance_of(&a.rewards), 0);
        assert_eq!(f.vault.balance_of(strategy.address()), 0);

        f.config
            .update_performance_fee(&a.gov, f.vault.address(), 1_000)
            .unwrap();
        f.vault
            .update_strategy_performance_fee(&a.gov, strategy.address(), 1_000)
            .unwrap();

        // A year of 2% management fee on 40% of the vault dwarfs the gain
        f.clock.advance(Duration::days(YEAR_DAYS));
        let price_before = f.vault.price_per_share().unwrap();
        let supply_before = f.vault.total_supply();
        strategy.harvest(&a.keeper, &mut f.vault).unwrap();

        // 100% of the profit went to fees, no more, no less
        assert_eq!(f.vault.price_per_share().unwrap(), price_before);
        assert_eq!(f.vault.total_supply(), supply_before + f.unit());
        assert!(f.vault.balance_of(&a.rewards) > 0);
        assert!(f.vault.balance_of(strategy.address()) > 0);
        assert!(f.vault.balance_of(&a.rewards) > f.vault.balance_of(strategy.address()));
    }
}

#[test]
fn test_harvest_requires_registered_vault() {
    let mut f = Fixture::seeded(18);
    let a = f.accounts.clone();
    let strategy = f.add_strategy(false);

    // A vault the configuration does not service cannot price fees
    let mut orphan = vault_engine::Vault::new(
        f.vault.token(),
        std::sync::Arc::clone(&f.config),
        a.gov.clone(),
        std::sync::Arc::new(f.clock.clone()),
    );
    orphan
        .add_strategy(&a.gov, strategy.address(), StrategyParams::new(1_000))
        .unwrap();
    let result = orphan.report(strategy.address(), Default::default());
    assert!(matches!(result, Err(VaultError::VaultNotRegistered(_))));
}

#[test]
fn test_strategy_fee_shares_go_to_rewards() {
    let mut f = Fixture::seeded(18);
    let a = f.accounts.clone();
    let strategy = f.add_strategy(false);
    strategy.harvest(&a.keeper, &mut f.vault).unwrap();

    f.airdrop(&strategy, f.unit());
    strategy.harvest(&a.keeper, &mut f.vault).unwrap();
    let earned = f.vault.balance_of(strategy.address());
    assert_eq!(earned, f.unit() / 10);

    assert!(strategy.distribute_rewards(&a.rando, &mut f.vault).is_err());
    assert_eq!(f.vault.balance_of(strategy.address()), earned);

    let sent = strategy.distribute_rewards(&a.keeper, &mut f.vault).unwrap();
    assert_eq!(sent, earned);
    assert_eq!(f.vault.balance_of(strategy.rewards()), earned);
    assert_eq!(f.vault.balance_of(strategy.address()), 0);

    // Nothing left to send
    assert_eq!(strategy.distribute_rewards(&a.keeper, &mut f.vault).unwrap(), 0);
}

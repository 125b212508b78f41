//! Vault actors: settings-driven deployment, the registry and serialized
//! access from concurrent callers

mod common;

use std::sync::Arc;
use vault_engine::{
    Address, AssetLedger, DeploymentSettings, InMemoryToken, ManualClock, NetTransfer,
    StrategyFactory, StrategyParams, VaultError, VaultRegistry, deploy,
};

const SETTINGS: &str = r#"{
    "governance": "gov",
    "roles": {
        "partner": "partner",
        "management": "management",
        "guardian": "guardian",
        "rewards": "rewards",
        "approver": "approver"
    },
    "tokens": ["WETH", "USDC"],
    "liquidator": "liquidator"
}"#;

struct Deployed {
    weth: InMemoryToken,
    usdc: InMemoryToken,
    registry: VaultRegistry,
}

fn deploy_family(settings: &str) -> Deployed {
    common::init_logger();
    let weth = InMemoryToken::new("WETH", 18);
    let usdc = InMemoryToken::new("USDC", 6);
    let tokens: Vec<Arc<dyn AssetLedger>> = vec![Arc::new(weth.clone()), Arc::new(usdc.clone())];

    let settings = DeploymentSettings::from_json(settings).unwrap();
    let registry = VaultRegistry::new();
    let deployment = deploy(
        &settings,
        &tokens,
        Arc::new(ManualClock::starting_now()),
        &registry,
    )
    .unwrap();
    assert_eq!(deployment.vaults.len(), 2);

    Deployed {
        weth,
        usdc,
        registry,
    }
}

#[tokio::test]
async fn test_deploy_registers_one_vault_per_token() {
    let d = deploy_family(SETTINGS);
    assert_eq!(d.registry.len(), 2);

    let weth_vault = d.registry.find_by_name("WETH Vault").unwrap();
    let usdc_vaults = d.registry.vaults_for_asset(d.usdc.asset());
    assert_eq!(usdc_vaults.len(), 1);
    assert_ne!(usdc_vaults[0].address(), weth_vault.address());

    let snapshot = weth_vault.snapshot().await.unwrap();
    assert_eq!(snapshot.symbol, "yfv-WETH");
    assert_eq!(snapshot.decimals, 18);
    assert_eq!(snapshot.deposit_limit, u128::MAX);
    assert!(snapshot.registered);

    let liquidator = weth_vault
        .query(|vault| vault.liquidator().cloned())
        .await
        .unwrap();
    assert_eq!(liquidator, Some(Address::new("liquidator")));
}

#[tokio::test]
async fn test_deploy_rejects_missing_ledger() {
    common::init_logger();
    let settings = DeploymentSettings::from_json(SETTINGS).unwrap();
    let weth: Arc<dyn AssetLedger> = Arc::new(InMemoryToken::new("WETH", 18));
    let registry = VaultRegistry::new();

    let result = deploy(
        &settings,
        &[weth],
        Arc::new(ManualClock::starting_now()),
        &registry,
    );
    assert!(result.is_err());
    assert!(registry.is_empty());
}

#[tokio::test]
async fn test_concurrent_deposits_are_serialized() {
    let d = deploy_family(SETTINGS);
    let vault = d.registry.find_by_name("WETH Vault").unwrap();

    let mut tasks = Vec::new();
    for i in 0..20u128 {
        let depositor = Address::new(format!("depositor-{}", i));
        d.weth.mint(&depositor, 1_000 + i);
        let handle = vault.clone();
        tasks.push(tokio::spawn(async move {
            handle
                .execute(move |v| v.deposit(&depositor, 1_000 + i))
                .await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let expected: u128 = (0..20u128).map(|i| 1_000 + i).sum();
    let (supply, assets) = vault
        .query(|v| (v.total_supply(), v.total_assets()))
        .await
        .unwrap();
    assert_eq!(supply, expected);
    assert_eq!(assets, expected);
    assert_eq!(d.weth.balance_of(vault.address()), expected);
}

#[tokio::test]
async fn test_concurrent_deposits_respect_limit() {
    let settings = SETTINGS.replace(
        r#""liquidator": "liquidator""#,
        r#""liquidator": "liquidator", "deposit_limit": 5000"#,
    );
    let d = deploy_family(&settings);
    let vault = d.registry.find_by_name("WETH Vault").unwrap();

    let mut tasks = Vec::new();
    for i in 0..10 {
        let depositor = Address::new(format!("depositor-{}", i));
        d.weth.mint(&depositor, 1_000);
        let handle = vault.clone();
        tasks.push(tokio::spawn(async move {
            handle.execute(move |v| v.deposit(&depositor, 1_000)).await
        }));
    }

    let mut accepted = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(err) => assert!(matches!(err, VaultError::DepositLimitExceeded { .. })),
        }
    }

    assert_eq!(accepted, 5);
    let assets = vault.query(|v| v.total_assets()).await.unwrap();
    assert_eq!(assets, 5_000);
}

#[tokio::test]
async fn test_harvest_through_handle() {
    let d = deploy_family(SETTINGS);
    let vault = d.registry.find_by_name("WETH Vault").unwrap();
    let gov = Address::new("gov");
    let strategist = Address::new("strategist");
    d.weth.mint(&gov, 1_000);

    let depositor = gov.clone();
    vault
        .execute(move |v| v.deposit(&depositor, 1_000))
        .await
        .unwrap();

    let strategy = vault
        .execute(move |v| {
            let strategy = StrategyFactory::deploy(v, strategist);
            v.add_strategy(&gov, strategy.address(), StrategyParams::new(5_000))?;
            Ok(strategy)
        })
        .await
        .unwrap();

    let harvester = strategy.clone();
    let keeper = strategy.keeper().clone();
    let adjustment = vault
        .execute(move |v| harvester.harvest(&keeper, v))
        .await
        .unwrap();

    assert_eq!(adjustment.transfer, NetTransfer::ToStrategy(500));
    assert_eq!(strategy.estimated_total_assets(), 500);

    let snapshot = vault.snapshot().await.unwrap();
    assert_eq!(snapshot.total_debt, 500);
    assert_eq!(snapshot.total_idle, 500);
    assert_eq!(snapshot.strategies, 1);
}

#[tokio::test]
async fn test_shutdown_returns_vault() {
    let d = deploy_family(SETTINGS);
    let handle = d.registry.find_by_name("USDC Vault").unwrap();
    let depositor = Address::new("alice");
    d.usdc.mint(&depositor, 250);

    let alice = depositor.clone();
    handle
        .execute(move |v| v.deposit(&alice, 250))
        .await
        .unwrap();

    let vault = handle.shutdown().await.unwrap();
    assert_eq!(vault.balance_of(&depositor), 250);
    assert_eq!(vault.name(), "USDC Vault");

    let result = handle.execute(|v| v.withdraw_all(&Address::new("alice"))).await;
    assert!(matches!(result, Err(VaultError::Actor(_))));
    assert!(!handle.is_alive());

    // The registry entry outlives the actor until removed
    assert!(d.registry.remove(handle.address()).is_some());
    assert_eq!(d.registry.len(), 1);
}

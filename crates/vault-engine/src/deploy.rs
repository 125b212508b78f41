//! Settings-driven deployment of a vault family

use log::info;
use std::sync::Arc;
use strata_config::VaultConfig;
use strata_ports::{AssetLedger, Clock};

use crate::actor::VaultHandle;
use crate::registry::VaultRegistry;
use crate::settings::{DeploymentSettings, SettingsError, SettingsResult};
use crate::vault::Vault;

/// Configuration and vaults produced by one deployment
#[derive(Debug)]
pub struct Deployment {
    pub config: Arc<VaultConfig>,
    /// One handle per listed token, in listing order
    pub vaults: Vec<VaultHandle>,
}

/// Deploy the configuration and one vault per listed token, then register
/// every vault with the configuration and `registry`.
///
/// `tokens` must hold a ledger for every listed symbol. Must be called
/// from within a tokio runtime.
pub fn deploy(
    settings: &DeploymentSettings,
    tokens: &[Arc<dyn AssetLedger>],
    clock: Arc<dyn Clock>,
    registry: &VaultRegistry,
) -> SettingsResult<Deployment> {
    settings.validate()?;
    let gov = &settings.governance;

    let config = Arc::new(VaultConfig::with_default_rates(gov.clone(), settings.fees));
    let roles = settings.roles.clone();
    config.initialize(
        gov,
        roles.partner,
        roles.management,
        roles.guardian,
        roles.rewards,
        roles.approver.clone(),
    )?;
    config.whitelist(&roles.approver, gov)?;

    // Build every vault before starting any actor
    let mut vaults = Vec::with_capacity(settings.tokens.len());
    for symbol in &settings.tokens {
        let token = tokens
            .iter()
            .find(|token| token.symbol() == symbol)
            .ok_or_else(|| SettingsError::Invalid(format!("no ledger for token {}", symbol)))?;

        let mut vault = Vault::new(
            Arc::clone(token),
            Arc::clone(&config),
            gov.clone(),
            Arc::clone(&clock),
        );
        vault.set_deposit_limit(gov, settings.effective_deposit_limit())?;
        if let Some(liquidator) = &settings.liquidator {
            vault.set_liquidator(gov, Some(liquidator.clone()))?;
        }
        config.add_vault(gov, vault.address())?;

        info!("{} deployed at {}", vault.name(), vault.address());
        vaults.push(vault);
    }

    let handles = vaults.into_iter().map(|vault| registry.deploy(vault)).collect();
    Ok(Deployment {
        config,
        vaults: handles,
    })
}

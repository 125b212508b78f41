//! Deployment settings
//!
//! JSON description of a vault family: who holds the configuration roles,
//! the fee rates new vaults start with, which assets get a vault and how
//! each vault is set up after deployment.
//!
//! ```json
//! {
//!   "governance": "0xgov",
//!   "roles": {
//!     "partner": "0xpartner",
//!     "management": "0xmanagement",
//!     "guardian": "0xguardian",
//!     "rewards": "0xrewards",
//!     "approver": "0xapprover"
//!   },
//!   "fees": { "management_fee": 200, "performance_fee": 1000, "partner_fee": 0 },
//!   "tokens": ["BTC.b", "WAVAX", "USDC"],
//!   "deposit_limit": null,
//!   "liquidator": "0xliquidator"
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use strata_core::{Address, Amount, FeeRates, VaultError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid settings: {0}")]
    Invalid(String),

    #[error("Deployment failed: {0}")]
    Deploy(#[from] VaultError),
}

pub type SettingsResult<T> = std::result::Result<T, SettingsError>;

/// Holders of the configuration roles besides governance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSettings {
    pub partner: Address,
    pub management: Address,
    pub guardian: Address,
    pub rewards: Address,
    pub approver: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentSettings {
    pub governance: Address,
    pub roles: RoleSettings,

    /// Rates every new vault starts with
    #[serde(default)]
    pub fees: FeeRates,

    /// Symbols of the assets to deploy a vault for
    pub tokens: Vec<String>,

    /// Deposit limit set after deployment; unlimited when absent
    #[serde(default)]
    pub deposit_limit: Option<Amount>,

    #[serde(default)]
    pub liquidator: Option<Address>,
}

impl DeploymentSettings {
    pub fn from_file(path: impl AsRef<Path>) -> SettingsResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> SettingsResult<Self> {
        let settings: Self = serde_json::from_str(raw)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> SettingsResult<()> {
        self.fees
            .validate()
            .map_err(|err| SettingsError::Invalid(err.to_string()))?;

        if self.tokens.is_empty() {
            return Err(SettingsError::Invalid("no tokens to deploy".to_string()));
        }
        let mut seen = HashSet::new();
        for symbol in &self.tokens {
            if symbol.trim().is_empty() {
                return Err(SettingsError::Invalid("empty token symbol".to_string()));
            }
            if !seen.insert(symbol.as_str()) {
                return Err(SettingsError::Invalid(format!(
                    "token {} listed twice",
                    symbol
                )));
            }
        }
        Ok(())
    }

    /// Deposit limit to apply, `Amount::MAX` when unlimited
    pub fn effective_deposit_limit(&self) -> Amount {
        self.deposit_limit.unwrap_or(Amount::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn test_parse_with_defaults() {
        let settings = DeploymentSettings::from_json(SETTINGS).unwrap();

        assert_eq!(settings.governance, Address::new("gov"));
        assert_eq!(settings.fees, FeeRates::default());
        assert_eq!(settings.tokens, vec!["WETH", "USDC"]);
        assert_eq!(settings.effective_deposit_limit(), Amount::MAX);
        assert_eq!(settings.liquidator, Some(Address::new("liquidator")));
    }

    #[test]
    fn test_fee_caps_checked() {
        let mut settings = DeploymentSettings::from_json(SETTINGS).unwrap();
        settings.fees.performance_fee = 5_001;

        assert!(matches!(settings.validate(), Err(SettingsError::Invalid(_))));
    }

    #[test]
    fn test_duplicate_tokens_rejected() {
        let raw = SETTINGS.replace(r#"["WETH", "USDC"]"#, r#"["WETH", "WETH"]"#);
        assert!(matches!(
            DeploymentSettings::from_json(&raw),
            Err(SettingsError::Invalid(_))
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            DeploymentSettings::from_json("{"),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            DeploymentSettings::from_file("/nonexistent/settings.json"),
            Err(SettingsError::Io(_))
        ));
    }
}

//! Strata Vault Engine
//!
//! Yield vaults over a single asset. Depositors receive shares; the vault
//! lends idle assets to strategies, charges fees on the gains they report
//! and lets holders pre-authorize a liquidator to redeem their shares.
//!
//! ## Architecture
//!
//! ```text
//!                 ┌──────────────────────────────────────────┐
//!  VaultHandle ──►│ VaultActor (one task per vault)          │
//!                 │  ┌────────────────────────────────────┐  │
//!                 │  │ Vault                              │  │
//!                 │  │  - ShareLedger         (shares)    │  │
//!                 │  │  - StrategyAllocation  (debt)      │  │
//!                 │  │  - LiquidationRegistry (requests)  │  │
//!                 │  └──────┬──────────────────┬──────────┘  │
//!                 └─────────┼──────────────────┼─────────────┘
//!                           │                  │
//!                    VaultConfig          AssetLedger
//!              (roles, fee rates)    (underlying token)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vault_engine::{InMemoryToken, Vault, VaultActor};
//!
//! let mut vault = Vault::new(token, config, gov.clone(), clock);
//! vault.set_deposit_limit(&gov, u128::MAX)?;
//!
//! let handle = VaultActor::spawn(vault);
//! let shares = handle.execute(move |v| v.deposit(&alice, 1_000)).await?;
//! ```

pub mod actor;
pub mod deploy;
pub mod registry;
pub mod settings;
pub mod snapshot;
pub mod strategy;
pub mod token;
pub mod vault;

pub use actor::{VaultActor, VaultHandle};
pub use deploy::{Deployment, deploy};
pub use registry::VaultRegistry;
pub use settings::{DeploymentSettings, RoleSettings, SettingsError, SettingsResult};
pub use snapshot::VaultSnapshot;
pub use strategy::{Strategy, StrategyFactory};
pub use token::InMemoryToken;
pub use vault::Vault;

// Re-export the domain and collaborator types callers need
pub use strata_clock::{ManualClock, SystemClock};
pub use strata_config::{ConfigRoles, VaultConfig};
pub use strata_core::{
    Address, Amount, Bps, DebtAdjustment, FEE_MAX, FeeRates, HarvestReport, LiquidationRequest,
    NetTransfer, Role, StrategyParams, StrategyRecord, VaultError, VaultResult,
};
pub use strata_ports::{AssetLedger, Clock};

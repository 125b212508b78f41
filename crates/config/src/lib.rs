//! Strata Configuration
//!
//! The configuration object shared by a family of vaults. It owns the
//! role identities vaults check callers against, the per-vault fee rates
//! and the whitelist deciding who may register vaults.
//!
//! Reads are lock-free or behind short read locks, so vault actors can
//! consult it concurrently.

mod config;
mod roles;

pub use config::VaultConfig;
pub use roles::ConfigRoles;

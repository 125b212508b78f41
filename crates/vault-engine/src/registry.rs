//! Registry of running vaults

use dashmap::DashMap;
use log::info;
use std::sync::Arc;
use strata_core::Address;

use crate::actor::{VaultActor, VaultHandle};
use crate::vault::Vault;

#[derive(Debug, Clone)]
struct Entry {
    handle: VaultHandle,
    asset: Address,
    name: String,
}

/// Concurrent map of vault address to actor handle
///
/// Cloning shares the underlying map.
#[derive(Debug, Clone, Default)]
pub struct VaultRegistry {
    vaults: Arc<DashMap<Address, Entry>>,
}

impl VaultRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start an actor for `vault` and register it.
    /// Must be called from within a tokio runtime.
    pub fn deploy(&self, vault: Vault) -> VaultHandle {
        let asset = vault.token().asset().clone();
        let name = vault.name().to_string();
        let handle = VaultActor::spawn(vault);
        self.register(handle.clone(), asset, name);
        handle
    }

    pub fn register(&self, handle: VaultHandle, asset: Address, name: String) {
        info!("Registered {} ({}) for asset {}", name, handle.address(), asset);
        self.vaults.insert(
            handle.address().clone(),
            Entry {
                handle,
                asset,
                name,
            },
        );
    }

    pub fn get(&self, vault: &Address) -> Option<VaultHandle> {
        self.vaults.get(vault).map(|entry| entry.handle.clone())
    }

    /// Handles of every vault over `asset`
    pub fn vaults_for_asset(&self, asset: &Address) -> Vec<VaultHandle> {
        self.vaults
            .iter()
            .filter(|entry| entry.asset == *asset)
            .map(|entry| entry.handle.clone())
            .collect()
    }

    pub fn find_by_name(&self, name: &str) -> Option<VaultHandle> {
        self.vaults
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.handle.clone())
    }

    pub fn remove(&self, vault: &Address) -> Option<VaultHandle> {
        self.vaults.remove(vault).map(|(_, entry)| entry.handle)
    }

    pub fn len(&self) -> usize {
        self.vaults.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vaults.is_empty()
    }
}

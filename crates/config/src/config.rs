use dashmap::{DashMap, DashSet};
use log::{info, warn};
use parking_lot::RwLock;
use strata_core::entities::{check_management_fee, check_partner_fee, check_performance_fee};
use strata_core::{Address, Bps, FeeRates, Role, VaultError, VaultResult};

use crate::roles::ConfigRoles;

#[derive(Debug)]
struct RoleState {
    roles: ConfigRoles,
    initialized: bool,
}

/// Configuration collaborator shared by vaults
///
/// Every mutating call takes the caller's identity and checks it against
/// the stored roles before touching any state.
#[derive(Debug)]
pub struct VaultConfig {
    state: RwLock<RoleState>,
    /// Rates a newly registered vault starts with
    default_rates: FeeRates,
    fees: DashMap<Address, FeeRates>,
    whitelist: DashSet<Address>,
}

impl VaultConfig {
    /// Deploy a configuration owned by `governance`, which holds every role
    /// until `initialize` hands them out
    pub fn new(governance: Address) -> Self {
        Self::with_default_rates(governance, FeeRates::default())
    }

    pub fn with_default_rates(governance: Address, default_rates: FeeRates) -> Self {
        Self {
            state: RwLock::new(RoleState {
                roles: ConfigRoles::single(&governance),
                initialized: false,
            }),
            default_rates,
            fees: DashMap::new(),
            whitelist: DashSet::new(),
        }
    }

    fn require(&self, caller: &Address, role: Role) -> VaultResult<()> {
        if self.state.read().roles.has_role(caller, role) {
            Ok(())
        } else {
            warn!("{} rejected: not {}", caller, role);
            Err(VaultError::unauthorized(caller, role))
        }
    }

    fn require_fee_admin(&self, caller: &Address) -> VaultResult<()> {
        let state = self.state.read();
        let roles = &state.roles;
        if roles.has_role(caller, Role::Governance) || roles.has_role(caller, Role::Management) {
            Ok(())
        } else {
            Err(VaultError::unauthorized(caller, Role::Management))
        }
    }

    /// Hand out the configuration roles. Governance only, once.
    pub fn initialize(
        &self,
        caller: &Address,
        partner: Address,
        management: Address,
        guardian: Address,
        rewards: Address,
        approver: Address,
    ) -> VaultResult<()> {
        let mut state = self.state.write();
        if !state.roles.has_role(caller, Role::Governance) {
            return Err(VaultError::unauthorized(caller, Role::Governance));
        }
        if state.initialized {
            return Err(VaultError::AlreadyInitialized);
        }

        state.roles.partner = partner;
        state.roles.management = management;
        state.roles.guardian = guardian;
        state.roles.rewards = rewards;
        state.roles.approver = approver;
        state.initialized = true;

        info!("Configuration initialized by {}", caller);
        Ok(())
    }

    // ========================================================================
    // Whitelist & registration
    // ========================================================================

    /// Allow `identity` to register vaults. Approver only.
    pub fn whitelist(&self, caller: &Address, identity: &Address) -> VaultResult<()> {
        self.require(caller, Role::Approver)?;
        self.whitelist.insert(identity.clone());
        info!("Whitelisted {}", identity);
        Ok(())
    }

    pub fn revoke_whitelist(&self, caller: &Address, identity: &Address) -> VaultResult<()> {
        self.require(caller, Role::Approver)?;
        self.whitelist.remove(identity);
        info!("Removed {} from whitelist", identity);
        Ok(())
    }

    pub fn is_whitelisted(&self, identity: &Address) -> bool {
        self.whitelist.contains(identity)
    }

    /// Start servicing `vault` with the default fee rates. Registering an
    /// already known vault keeps its current rates.
    pub fn add_vault(&self, caller: &Address, vault: &Address) -> VaultResult<()> {
        if !self.is_whitelisted(caller) {
            warn!("add_vault rejected: {} is not whitelisted", caller);
            return Err(VaultError::unauthorized(caller, Role::Approver));
        }
        self.fees
            .entry(vault.clone())
            .or_insert_with(|| {
                info!("Registered vault {}", vault);
                self.default_rates
            });
        Ok(())
    }

    pub fn is_registered(&self, vault: &Address) -> bool {
        self.fees.contains_key(vault)
    }

    // ========================================================================
    // Fee parameters
    // ========================================================================

    /// Current rates of a registered vault
    pub fn fee_rates(&self, vault: &Address) -> VaultResult<FeeRates> {
        self.fees
            .get(vault)
            .map(|entry| *entry.value())
            .ok_or_else(|| VaultError::VaultNotRegistered(vault.clone()))
    }

    pub fn management_fee(&self, vault: &Address) -> VaultResult<Bps> {
        Ok(self.fee_rates(vault)?.management_fee)
    }

    pub fn performance_fee(&self, vault: &Address) -> VaultResult<Bps> {
        Ok(self.fee_rates(vault)?.performance_fee)
    }

    pub fn partner_fee(&self, vault: &Address) -> VaultResult<Bps> {
        Ok(self.fee_rates(vault)?.partner_fee)
    }

    fn update_rates(
        &self,
        vault: &Address,
        apply: impl FnOnce(&mut FeeRates),
    ) -> VaultResult<()> {
        let mut entry = self
            .fees
            .get_mut(vault)
            .ok_or_else(|| VaultError::VaultNotRegistered(vault.clone()))?;
        apply(entry.value_mut());
        Ok(())
    }

    /// Governance or management; capped at FEE_MAX
    pub fn update_management_fee(&self, caller: &Address, vault: &Address, fee: Bps) -> VaultResult<()> {
        self.require_fee_admin(caller)?;
        check_management_fee(fee)?;
        self.update_rates(vault, |rates| rates.management_fee = fee)?;
        info!("Management fee of {} set to {} bps", vault, fee);
        Ok(())
    }

    /// Governance or management; capped at FEE_MAX / 2
    pub fn update_performance_fee(&self, caller: &Address, vault: &Address, fee: Bps) -> VaultResult<()> {
        self.require_fee_admin(caller)?;
        check_performance_fee(fee)?;
        self.update_rates(vault, |rates| rates.performance_fee = fee)?;
        info!("Performance fee of {} set to {} bps", vault, fee);
        Ok(())
    }

    /// Partner only; capped at FEE_MAX
    pub fn update_partner_fee(&self, caller: &Address, vault: &Address, fee: Bps) -> VaultResult<()> {
        self.require(caller, Role::Partner)?;
        check_partner_fee(fee)?;
        self.update_rates(vault, |rates| rates.partner_fee = fee)?;
        info!("Partner fee of {} set to {} bps", vault, fee);
        Ok(())
    }

    // ========================================================================
    // Roles
    // ========================================================================

    /// Snapshot of the current role holders
    pub fn roles(&self) -> ConfigRoles {
        self.state.read().roles.clone()
    }

    pub fn has_role(&self, caller: &Address, role: Role) -> bool {
        self.state.read().roles.has_role(caller, role)
    }

    pub fn governance(&self) -> Address {
        self.state.read().roles.governance.clone()
    }

    pub fn rewards(&self) -> Address {
        self.state.read().roles.rewards.clone()
    }

    pub fn partner(&self) -> Address {
        self.state.read().roles.partner.clone()
    }

    fn rotate(&self, caller: &Address, role: Role, identity: Address) -> VaultResult<()> {
        let mut state = self.state.write();
        if !state.roles.has_role(caller, Role::Governance) {
            return Err(VaultError::unauthorized(caller, Role::Governance));
        }
        let slot = match role {
            Role::Management => &mut state.roles.management,
            Role::Guardian => &mut state.roles.guardian,
            Role::Rewards => &mut state.roles.rewards,
            Role::Partner => &mut state.roles.partner,
            Role::Approver => &mut state.roles.approver,
            _ => return Err(VaultError::unauthorized(caller, role)),
        };
        info!("{} rotated from {} to {}", role, slot, identity);
        *slot = identity;
        Ok(())
    }

    pub fn update_management(&self, caller: &Address, identity: Address) -> VaultResult<()> {
        self.rotate(caller, Role::Management, identity)
    }

    pub fn update_guardian(&self, caller: &Address, identity: Address) -> VaultResult<()> {
        self.rotate(caller, Role::Guardian, identity)
    }

    pub fn update_rewards(&self, caller: &Address, identity: Address) -> VaultResult<()> {
        self.rotate(caller, Role::Rewards, identity)
    }

    pub fn update_partner(&self, caller: &Address, identity: Address) -> VaultResult<()> {
        self.rotate(caller, Role::Partner, identity)
    }

    pub fn update_approver(&self, caller: &Address, identity: Address) -> VaultResult<()> {
        self.rotate(caller, Role::Approver, identity)
    }
}

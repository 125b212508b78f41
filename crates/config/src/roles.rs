use serde::{Deserialize, Serialize};
use strata_core::{Address, Role};

/// Identities holding the configuration-level roles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigRoles {
    pub governance: Address,
    pub management: Address,
    pub guardian: Address,
    pub rewards: Address,
    pub partner: Address,
    pub approver: Address,
}

impl ConfigRoles {
    /// Every role held by a single identity, as right after deployment
    pub fn single(owner: &Address) -> Self {
        Self {
            governance: owner.clone(),
            management: owner.clone(),
            guardian: owner.clone(),
            rewards: owner.clone(),
            partner: owner.clone(),
            approver: owner.clone(),
        }
    }

    /// Identity holding `role`, if it is a configuration role
    pub fn holder(&self, role: Role) -> Option<&Address> {
        match role {
            Role::Governance => Some(&self.governance),
            Role::Management => Some(&self.management),
            Role::Guardian => Some(&self.guardian),
            Role::Rewards => Some(&self.rewards),
            Role::Partner => Some(&self.partner),
            Role::Approver => Some(&self.approver),
            _ => None,
        }
    }

    pub fn has_role(&self, caller: &Address, role: Role) -> bool {
        self.holder(role) == Some(caller)
    }
}

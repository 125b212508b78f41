use serde::{Deserialize, Serialize};

/// Roles an entry point can require of its caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Owns the vault: strategies, limits, liquidator
    Governance,
    /// Day-to-day operator, shares fee and debt-ratio duties with governance
    Management,
    /// May trigger emergency shutdown and revoke strategies
    Guardian,
    /// Receives governance fees
    Rewards,
    /// Receives partner fees and sets the partner fee rate
    Partner,
    /// Controls the configuration whitelist
    Approver,
    /// Operates a strategy
    Strategist,
    /// Automation allowed to harvest a strategy
    Keeper,
    /// A registered strategy reporting to its vault
    Strategy,
    /// Designated executor of holder-approved liquidations
    Liquidator,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Governance => write!(f, "GOVERNANCE"),
            Role::Management => write!(f, "MANAGEMENT"),
            Role::Guardian => write!(f, "GUARDIAN"),
            Role::Rewards => write!(f, "REWARDS"),
            Role::Partner => write!(f, "PARTNER"),
            Role::Approver => write!(f, "APPROVER"),
            Role::Strategist => write!(f, "STRATEGIST"),
            Role::Keeper => write!(f, "KEEPER"),
            Role::Strategy => write!(f, "STRATEGY"),
            Role::Liquidator => write!(f, "LIQUIDATOR"),
        }
    }
}

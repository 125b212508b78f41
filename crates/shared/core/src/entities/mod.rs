mod allocation;
mod fee;
mod liquidation;
mod role;
mod share_ledger;
mod strategy;

pub use allocation::{
    DebtAdjustment, HarvestContext, HarvestReport, NetTransfer, StrategyAllocationTable,
};
pub use fee::{
    FeeEngine, FeeRates, FeeShares, HarvestFees, HarvestInput, bps_to_decimal,
    check_management_fee, check_partner_fee, check_performance_fee,
};
pub use liquidation::{LiquidationRegistry, LiquidationRequest};
pub use role::Role;
pub use share_ledger::ShareLedger;
pub use strategy::{StrategyParams, StrategyRecord};

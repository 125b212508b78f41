//! Strata Core Domain
//!
//! Pure accounting types for the Strata vault engine.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod entities;
pub mod error;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{
    // Allocation
    DebtAdjustment,
    // Fees
    FeeEngine,
    FeeRates,
    FeeShares,
    HarvestContext,
    HarvestFees,
    HarvestReport,
    // Liquidation
    LiquidationRegistry,
    LiquidationRequest,
    NetTransfer,
    // Access control
    Role,
    // Shares
    ShareLedger,
    StrategyAllocationTable,
    StrategyParams,
    StrategyRecord,
};
pub use error::{TokenError, VaultError, VaultResult};
pub use values::{Address, Amount, Bps, FEE_MAX, Timestamp};

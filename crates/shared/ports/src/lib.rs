//! Strata Ports
//!
//! Port definitions (traits) for the Strata vault engine.
//! These define the boundaries between vault accounting and the outside
//! world: time and the underlying asset.

mod clock;
mod ledger;

pub use clock::Clock;
pub use ledger::AssetLedger;
pub use strata_core::TokenError;

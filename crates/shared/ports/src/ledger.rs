use strata_core::{Address, Amount, TokenError};

/// Port for the underlying asset a vault holds
///
/// Vaults, strategies and depositors are all plain holders on the ledger.
/// A transfer either moves the full amount or fails without effect.
pub trait AssetLedger: Send + Sync {
    /// Identity of the asset
    fn asset(&self) -> &Address;

    /// Ticker symbol, used to name vaults
    fn symbol(&self) -> &str;

    /// Decimals of the asset's base unit
    fn decimals(&self) -> u8;

    fn balance_of(&self, holder: &Address) -> Amount;

    /// Move `amount` from `from` to `to`
    fn transfer(&self, from: &Address, to: &Address, amount: Amount) -> Result<(), TokenError>;
}

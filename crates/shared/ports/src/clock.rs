use strata_core::Timestamp;

/// Port for time abstraction
///
/// Harvest fees accrue over time, so the vault reads time through this
/// trait:
/// - Real system time for production
/// - Manually advanced time for deterministic tests
pub trait Clock: Send + Sync {
    /// Get the current time according to this clock
    fn now(&self) -> Timestamp;

    /// Get the clock's name/identifier for debugging
    fn name(&self) -> &str {
        "Clock"
    }
}

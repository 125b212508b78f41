//! Strata Clock Infrastructure
//!
//! Time sources for vaults:
//!
//! - [`SystemClock`]: wall-clock time, for production
//! - [`ManualClock`]: frozen time that only moves when told to, for tests
//!   that need management fees to accrue over a known duration
//!
//! ## Usage
//!
//! ```ignore
//! use strata_clock::{Clock, ManualClock};
//! use chrono::Duration;
//!
//! let clock = ManualClock::starting_now();
//! let before = clock.now();
//! clock.advance(Duration::days(365));
//! assert_eq!(clock.now() - before, Duration::days(365));
//! ```

mod manual;
mod system;

pub use manual::ManualClock;
pub use system::SystemClock;

// Re-export the Clock trait for convenience
pub use strata_ports::Clock;

use chrono::{Duration, Utc};
use parking_lot::RwLock;
use std::sync::Arc;
use strata_core::Timestamp;
use strata_ports::Clock;

/// Clock that only moves when advanced explicitly
///
/// Cloning shares the underlying time, so a test can hold one handle and
/// give another to a vault.
#[derive(Debug, Clone)]
pub struct ManualClock {
    current: Arc<RwLock<Timestamp>>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            current: Arc::new(RwLock::new(start)),
        }
    }

    /// Frozen at the current wall time
    pub fn starting_now() -> Self {
        Self::new(Utc::now())
    }

    /// Move time forward (or backward, for a negative duration)
    pub fn advance(&self, by: Duration) {
        let mut current = self.current.write();
        *current += by;
    }

    /// Jump to an absolute time
    pub fn set_time(&self, time: Timestamp) {
        *self.current.write() = time;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.current.read()
    }

    fn name(&self) -> &str {
        "ManualClock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_manual_clock_is_frozen() {
        let clock = ManualClock::starting_now();
        let time1 = clock.now();
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert_eq!(clock.now(), time1);
    }

    #[test]
    fn test_advance_and_set() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let clock = ManualClock::new(start);

        clock.advance(Duration::hours(6));
        assert_eq!(clock.now(), start + Duration::hours(6));

        let later = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        clock.set_time(later);
        assert_eq!(clock.now(), later);
    }

    #[test]
    fn test_clones_share_time() {
        let clock = ManualClock::starting_now();
        let handle = clock.clone();
        let before = clock.now();

        handle.advance(Duration::seconds(30));
        assert_eq!(clock.now() - before, Duration::seconds(30));
    }
}

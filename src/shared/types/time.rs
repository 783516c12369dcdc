//! Creation timestamps
//!
//! BSON dates keep millisecond precision, so timestamps are truncated to
//! whole milliseconds before they are handed out. That keeps a record read
//! back from the store identical to the one returned at creation.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};

/// Hands out strictly increasing, millisecond-precision UTC timestamps.
///
/// Two calls in the same millisecond get consecutive milliseconds, so
/// records created in sequence always sort in creation order.
#[derive(Debug, Default)]
pub struct MonotonicClock {
    last_millis: AtomicI64,
}

impl MonotonicClock {
    pub const fn new() -> Self {
        Self {
            last_millis: AtomicI64::new(0),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        let wall = Utc::now().timestamp_millis();
        let mut last = self.last_millis.load(Ordering::Acquire);
        loop {
            let next = wall.max(last + 1);
            match self.last_millis.compare_exchange_weak(
                last,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return DateTime::from_timestamp_millis(next).unwrap_or_else(Utc::now),
                Err(current) => last = current,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_are_strictly_increasing() {
        let clock = MonotonicClock::new();
        let mut previous = clock.now();
        for _ in 0..1_000 {
            let current = clock.now();
            assert!(current > previous);
            previous = current;
        }
    }

    #[test]
    fn timestamps_have_millisecond_precision() {
        let clock = MonotonicClock::new();
        let ts = clock.now();
        assert_eq!(ts.timestamp_subsec_nanos() % 1_000_000, 0);
    }

    #[test]
    fn timestamps_track_wall_clock() {
        let clock = MonotonicClock::new();
        let before = Utc::now() - chrono::Duration::milliseconds(1);
        let ts = clock.now();
        let after = Utc::now() + chrono::Duration::seconds(1);
        assert!(ts >= before && ts <= after);
    }
}

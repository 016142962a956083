use time::OffsetDateTime;

/// Source of the current instant, swapped for a fixed one in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;

    fn now_millis(&self) -> i64 {
        (self.now().unix_timestamp_nanos() / 1_000_000) as i64
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

#[cfg(any(test, feature = "mock"))]
pub use fixed::FixedClock;

#[cfg(any(test, feature = "mock"))]
mod fixed {
    use std::sync::RwLock;

    use time::{Duration, OffsetDateTime};

    use super::Clock;

    pub struct FixedClock(RwLock<OffsetDateTime>);

    impl FixedClock {
        pub fn new(now: OffsetDateTime) -> Self {
            Self(RwLock::new(now))
        }

        pub fn set(&self, now: OffsetDateTime) {
            if let Ok(mut guard) = self.0.write() {
                *guard = now;
            }
        }

        pub fn advance(&self, by: Duration) {
            if let Ok(mut guard) = self.0.write() {
                *guard += by;
            }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> OffsetDateTime {
            match self.0.read() {
                Ok(guard) => *guard,
                Err(poisoned) => *poisoned.into_inner(),
            }
        }
    }
}

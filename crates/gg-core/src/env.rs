//! Deterministic time seam.
//!
//! The engine never calls `std::time::Instant::now()` directly so that
//! tests can drive timers without real sleeps. No async runtime is
//! needed: the engine is single-threaded and non-blocking by
//! construction, so unlike a networked client this seam carries only a
//! clock, not a sleep primitive.

use std::ops::Sub;
use std::time::{Duration, Instant};

/// Supplies the current time to the engine.
pub trait Clock {
    /// An opaque, ordered timestamp this clock produces.
    type Instant: Copy + Ord + Sub<Output = Duration>;

    /// The current time.
    fn now(&self) -> Self::Instant;
}

/// Production clock backed by [`std::time::Instant`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::cell::Cell;
    use std::time::Duration;

    use super::Clock;

    /// A clock whose time only advances when explicitly told to.
    #[derive(Debug, Default)]
    pub struct TestClock {
        elapsed: Cell<Duration>,
    }

    impl TestClock {
        pub fn advance(&self, by: Duration) {
            self.elapsed.set(self.elapsed.get() + by);
        }
    }

    impl Clock for TestClock {
        type Instant = Duration;

        fn now(&self) -> Duration {
            self.elapsed.get()
        }
    }
}

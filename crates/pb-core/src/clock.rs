//! Clock sources for stage timing.
//!
//! A comparison reads all of its timestamps from one clock. The simulated
//! clock lets tests assert exact durations without sleeping.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// A source of elapsed time since the clock's origin.
pub trait Clock: Send + Sync {
    /// Time elapsed since the clock was created.
    fn now(&self) -> Duration;

    /// Elapsed time between an earlier reading and now.
    fn since(&self, earlier: Duration) -> Duration {
        self.now().saturating_sub(earlier)
    }
}

/// Wall-clock timing backed by `std::time::Instant`.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Create a clock whose origin is the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Simulated clock with nanosecond precision.
///
/// Time only advances via `advance_ns`/`advance_ms`, or by a fixed
/// tick applied after every reading when created with [`SimClock::ticking`].
pub struct SimClock {
    /// Current time in nanoseconds since the origin
    now_ns: AtomicU64,
    /// Nanoseconds added after each `now()` reading
    tick_ns: u64,
}

/// Bounds for time operations.
const TIME_NS_MAX: u64 = u64::MAX - 1_000_000_000_000;

impl SimClock {
    /// Create a frozen clock starting at time 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            now_ns: AtomicU64::new(0),
            tick_ns: 0,
        }
    }

    /// Create a clock that advances by `tick` after every reading.
    #[must_use]
    pub fn ticking(tick: Duration) -> Self {
        let tick_ns = u64::try_from(tick.as_nanos()).unwrap_or(TIME_NS_MAX);
        debug_assert!(tick_ns <= TIME_NS_MAX, "Tick too large");
        Self {
            now_ns: AtomicU64::new(0),
            tick_ns,
        }
    }

    /// Current time in nanoseconds, without ticking.
    #[must_use]
    pub fn now_ns(&self) -> u64 {
        self.now_ns.load(Ordering::Acquire)
    }

    /// Current time in milliseconds, without ticking.
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.now_ns() / 1_000_000
    }

    /// Advance time by the given number of nanoseconds.
    pub fn advance_ns(&self, delta_ns: u64) {
        let current = self.now_ns.load(Ordering::Acquire);
        debug_assert!(
            current <= TIME_NS_MAX - delta_ns,
            "Time advance would overflow"
        );

        self.now_ns.fetch_add(delta_ns, Ordering::Release);
    }

    /// Advance time by the given number of milliseconds.
    pub fn advance_ms(&self, delta_ms: u64) {
        self.advance_ns(delta_ms * 1_000_000);
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SimClock {
    fn now(&self) -> Duration {
        let reading = self.now_ns.fetch_add(self.tick_ns, Ordering::AcqRel);
        Duration::from_nanos(reading)
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

//! A source for the current time.
//!
//! Timezone offsets depend on daylight saving rules at a particular instant,
//! so anything that needs "now" takes a [Clock] instead of reading the system
//! time directly. Tests pin the time with [FixedClock].

use time::OffsetDateTime;

/// Something that can tell the current time.
pub trait Clock {
    /// The current instant.
    fn now(&self) -> OffsetDateTime;
}

/// Reads the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}

//! Detection clock seam.
//!
//! Change records are stamped with the time they were classified. The clock
//! is injected so tests can pin timestamps.

use chrono::{DateTime, Utc};

/// Source of detection timestamps
pub trait DetectionClock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock UTC time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl DetectionClock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl DetectionClock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

impl<C: DetectionClock + ?Sized> DetectionClock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

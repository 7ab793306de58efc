//! Time source for walk bookkeeping.
//!
//! The engine reads the clock in exactly two places: `Diagnostics::record`
//! stamps each recovered error with `occurred_at`, and the runner stamps the
//! `WalkReport` with `finished_at`. Walk logic never reads it.

use chrono::{DateTime, Utc};

/// Supplies `occurred_at` and `finished_at` timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the host's UTC time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

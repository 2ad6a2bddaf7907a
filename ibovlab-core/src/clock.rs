//! Wall-clock abstraction.
//!
//! The price window always ends "today", which makes real runs
//! non-reproducible. Everything that needs the date asks a `Clock` so tests
//! can pin it.

use chrono::NaiveDate;

pub trait Clock: Send + Sync {
    /// Current local calendar date.
    fn today(&self) -> NaiveDate;
}

/// The machine's local clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// A clock frozen on one date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

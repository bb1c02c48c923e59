//! Clock
//!
//! "Today" decides whether a paid ticket has expired. It is always passed in,
//! never read from a global, so expiry can be evaluated for any day.

use jiff::{Zoned, civil::Date};

/// Source of the current calendar date.
pub trait Clock: Send + Sync {
    /// The current date in the storefront's time zone.
    fn today(&self) -> Date;
}

/// Reads the system clock in the local time zone.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> Date {
        Zoned::now().date()
    }
}

/// Always reports the same date.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub Date);

impl Clock for FixedClock {
    fn today(&self) -> Date {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_reports_its_date() {
        let date = Date::constant(2026, 10, 16);

        assert_eq!(FixedClock(date).today(), date);
    }
}

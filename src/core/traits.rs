//! Core traits
//!
//! The only seam the engine needs from the outside world besides storage is
//! the calendar: overdue checks and loan dates are all relative to "today".

use chrono::{Local, NaiveDate};
use std::sync::Mutex;

/// Source of the current date
pub trait Clock: Send + Sync {
    /// Today's date in the library's local calendar
    fn today(&self) -> NaiveDate;
}

/// Wall clock in local time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Manually driven clock for tests and simulations
#[derive(Debug)]
pub struct FixedClock {
    today: Mutex<NaiveDate>,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        FixedClock {
            today: Mutex::new(today),
        }
    }

    /// Move the clock to a new date
    pub fn set(&self, today: NaiveDate) {
        *self.today.lock().unwrap_or_else(|e| e.into_inner()) = today;
    }

    /// Move the clock forward by `days`
    pub fn advance_days(&self, days: u64) {
        let mut today = self.today.lock().unwrap_or_else(|e| e.into_inner());
        *today = today
            .checked_add_days(chrono::Days::new(days))
            .unwrap_or(NaiveDate::MAX);
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        *self.today.lock().unwrap_or_else(|e| e.into_inner())
    }
}

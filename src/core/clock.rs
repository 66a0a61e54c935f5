//! Clock abstraction
//!
//! Log events and rotation decisions read "now" through a [`Clock`] so tests
//! can pin time instead of depending on the OS clock.

use chrono::{DateTime, Local, Utc};
use parking_lot::Mutex;
use std::sync::Arc;

/// Source of the current time
pub trait Clock: Send + Sync {
    /// Current local time
    fn now_local(&self) -> DateTime<Local>;

    /// Current UTC time
    fn now_utc(&self) -> DateTime<Utc> {
        self.now_local().with_timezone(&Utc)
    }
}

/// Shared clock handle
pub type SharedClock = Arc<dyn Clock>;

/// The operating system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_local(&self) -> DateTime<Local> {
        Local::now()
    }

    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that returns a settable instant
///
/// ```
/// use rust_pattern_logger::core::{Clock, FixedClock};
/// use chrono::{TimeZone, Utc};
///
/// let at = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
/// let clock = FixedClock::new(at);
/// assert_eq!(clock.now_utc(), at);
/// ```
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock() = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now_local(&self) -> DateTime<Local> {
        self.now.lock().with_timezone(&Local)
    }

    fn now_utc(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Clock used when none is configured
pub fn system_clock() -> SharedClock {
    Arc::new(SystemClock)
}

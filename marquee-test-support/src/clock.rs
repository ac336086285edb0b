use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Mutex;

use marquee_core::Clock;

/// A clock that only moves when a test moves it.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Fixed, arbitrary starting point shared by the test suites.
    pub fn default_start() -> Self {
        Self::new(Utc.with_ymd_and_hms(2026, 3, 14, 19, 30, 0).unwrap())
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = to;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

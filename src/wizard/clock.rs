//! Time source used by the wizard for debouncing and date rules.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::NaiveDate;

use crate::forms::fields::calendar_today;

pub trait Clock {
    /// Monotonic instant driving the persistence debounce.
    fn now(&self) -> Instant;
    /// Calendar day that date validators compare against.
    fn today(&self) -> NaiveDate;
}

/// Wall clock; calendar days follow [`calendar_today`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn today(&self) -> NaiveDate {
        calendar_today()
    }
}

#[derive(Debug)]
struct ManualState {
    now: Instant,
    today: NaiveDate,
}

/// Clock that only moves when told to. Clones share the same time, so a
/// handle kept outside the wizard can advance the wizard's clock.
#[derive(Debug, Clone)]
pub struct ManualClock {
    state: Arc<Mutex<ManualState>>,
}

impl ManualClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            state: Arc::new(Mutex::new(ManualState {
                now: Instant::now(),
                today,
            })),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.now += by;
    }

    pub fn set_today(&self, today: NaiveDate) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.today = today;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).now
    }

    fn today(&self) -> NaiveDate {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).today
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_uses_the_server_calendar_day() {
        let before = calendar_today();
        let day = SystemClock.today();
        let after = calendar_today();
        assert!(day == before || day == after);
    }

    #[test]
    fn manual_clock_handles_are_shared() {
        let clock = ManualClock::new(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap());
        let handle = clock.clone();
        let start = clock.now();
        handle.advance(Duration::from_millis(1500));
        handle.set_today(NaiveDate::from_ymd_opt(2026, 10, 17).unwrap());
        assert_eq!(clock.now() - start, Duration::from_millis(1500));
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2026, 10, 17).unwrap());
    }
}

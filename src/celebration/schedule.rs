//! Date matching and the timers a celebration runs on.

use std::collections::HashMap;
use std::rc::Rc;

use fastrand::Rng;

use super::config::Birthday;
use crate::calendar::MonthDay;
use crate::platform::{Scheduler, TimerHandle};

/// Period of the background birthday check.
pub const CHECK_INTERVAL_MS: u32 = 60_000;
/// Pause between a date match and the visuals going up.
pub const SETTLE_MS: u32 = 100;
/// Pause between the host resuming the module and the restart.
pub const RESUME_DELAY_MS: u32 = 500;
/// Delay before the first confetti burst of a session.
pub const FIRST_CONFETTI_MS: u32 = 1000;
const CONFETTI_GAP_MS: (u32, u32) = (2000, 8000);

/// First entry whose date falls on `today`.
pub fn find_celebrant(birthdays: &[Birthday], today: MonthDay) -> Option<&Birthday> {
    birthdays.iter().find(|b| today.matches(&b.date))
}

/// Wait before the next confetti burst.
pub fn confetti_gap(rng: &mut Rng) -> u32 {
    rng.u32(CONFETTI_GAP_MS.0..CONFETTI_GAP_MS.1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timer {
    /// The one-off check after the startup delay.
    Startup,
    Periodic,
    /// Session start after a match or resume.
    Settle,
    /// End of a finite session.
    Expiry,
    Confetti,
    /// Forced check after the host resumes.
    Recheck,
}

impl Timer {
    /// Timers that belong to a single session.
    pub const SESSION: [Timer; 3] = [Timer::Settle, Timer::Expiry, Timer::Confetti];
}

/// Named one-shot timers. Arming a timer replaces its pending callback.
pub struct Timers {
    scheduler: Rc<dyn Scheduler>,
    armed: HashMap<Timer, TimerHandle>,
}

impl Timers {
    pub fn new(scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            scheduler,
            armed: HashMap::new(),
        }
    }

    pub fn arm(&mut self, timer: Timer, delay_ms: u32, callback: impl FnOnce() + 'static) {
        self.disarm(timer);
        let handle = self.scheduler.set_timeout(delay_ms, Box::new(callback));
        self.armed.insert(timer, handle);
    }

    pub fn disarm(&mut self, timer: Timer) {
        if let Some(handle) = self.armed.remove(&timer) {
            self.scheduler.clear_timeout(handle);
        }
    }

    pub fn disarm_session(&mut self) {
        for timer in Timer::SESSION {
            self.disarm(timer);
        }
    }

    pub fn disarm_all(&mut self) {
        for (_, handle) in self.armed.drain() {
            self.scheduler.clear_timeout(handle);
        }
    }
}

impl Drop for Timers {
    fn drop(&mut self) {
        self.disarm_all();
    }
}

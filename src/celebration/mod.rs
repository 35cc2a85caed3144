//! The celebration controller.
//!
//! A [`Celebration`] checks the birthday list on a timer and, on a match,
//! takes over the screen: message overlay, dimmed widgets, fireworks and
//! a chain of confetti bursts. It moves between three phases:
//!
//! ```text
//! Idle --match--> Celebrating --expiry/stop--> Idle
//!                  |        ^
//!            suspend        resume (date still matches)
//!                  v        |
//!                  Suspended --resume (no match)--> Idle
//! ```
//!
//! A session that ran to its end is not restarted by the periodic check
//! for the rest of that day. Forced checks ignore this.

pub mod config;
pub mod messages;
pub mod schedule;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use fastrand::Rng;

use crate::calendar::MonthDay;
use crate::engine::{Confetti, Deadline, EffectDuration, Fireworks};
use crate::platform::{OverlayContent, Platform, WidgetTreatment};

pub use config::{Birthday, Birthdays, Config};
pub use messages::Messages;
use schedule::{
    CHECK_INTERVAL_MS, FIRST_CONFETTI_MS, RESUME_DELAY_MS, SETTLE_MS, Timer, Timers,
    confetti_gap, find_celebrant,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Celebrating,
    /// Visuals torn down by the host, celebrant remembered.
    Suspended,
}

struct Inner {
    this: Weak<RefCell<Inner>>,
    config: Config,
    platform: Platform,
    fireworks: Option<Fireworks>,
    confetti: Confetti,
    timers: Timers,
    phase: Phase,
    celebrant: Option<String>,
    /// The last session that ran to its end.
    finished: Option<(MonthDay, String)>,
    confetti_until: Deadline,
    rng: Rng,
}

impl Inner {
    /// Run `action` on this controller after `delay_ms`, unless it is gone.
    fn after(&mut self, timer: Timer, delay_ms: u32, action: impl FnOnce(&mut Inner) + 'static) {
        let this = self.this.clone();
        self.timers.arm(timer, delay_ms, move || {
            if let Some(inner) = this.upgrade() {
                action(&mut inner.borrow_mut());
            }
        });
    }

    fn schedule_checks(&mut self) {
        log::info!(
            "[Birthday] Scheduling birthday checks, first in {}ms",
            self.config.startup_delay
        );
        self.after(Timer::Startup, self.config.startup_delay, |inner| {
            inner.check(false);
        });
        self.arm_periodic();
    }

    fn arm_periodic(&mut self) {
        self.after(Timer::Periodic, CHECK_INTERVAL_MS, |inner| {
            inner.arm_periodic();
            inner.check(false);
        });
    }

    fn todays_celebrant(&self, today: MonthDay) -> crate::error::Result<Option<String>> {
        let entries = self.config.birthdays.entries()?;
        Ok(find_celebrant(entries, today).map(|b| b.name.clone()))
    }

    fn check(&mut self, force: bool) -> bool {
        let today = self.platform.clock.today();
        log::debug!("[Birthday] Checking birthdays for {}", today);
        if !force && self.phase == Phase::Suspended {
            log::debug!("[Birthday] Suspended, skipping check");
            return false;
        }
        let name = match self.todays_celebrant(today) {
            Ok(name) => name,
            Err(err) => {
                log::error!("[Birthday] {}", err);
                return false;
            }
        };
        let Some(name) = name else {
            if force && self.phase != Phase::Idle {
                log::info!("[Birthday] No birthday on {} any more, cleaning up", today);
                self.end();
            }
            return false;
        };
        if !force {
            if self.phase == Phase::Celebrating {
                return false;
            }
            if self
                .finished
                .as_ref()
                .is_some_and(|(day, who)| *day == today && *who == name)
            {
                log::debug!("[Birthday] Celebration for {} already ran today", name);
                return false;
            }
        }
        log::info!("[Birthday] Found birthday for {} on {}", name, today);
        self.begin(name, SETTLE_MS);
        true
    }

    fn begin(&mut self, name: String, delay_ms: u32) {
        self.celebrant = Some(name.clone());
        self.phase = Phase::Celebrating;
        self.after(Timer::Settle, delay_ms, move |inner| inner.launch(&name));
    }

    fn launch(&mut self, name: &str) {
        log::info!("[Birthday] Starting celebration for {}", name);
        self.clear_visuals();

        let message = messages::compose(self.config.messages.as_ref(), name, &mut self.rng);
        let debug = self.config.debug.then(|| {
            messages::debug_panel(
                name,
                self.config.immersive_mode,
                self.fireworks.is_some(),
                self.platform.clock.time_of_day(),
            )
        });
        self.platform
            .stage
            .show_overlay(&OverlayContent { message, debug });
        self.treat_widgets();

        let style = self.config.firework_style;
        let platform = self.platform.clone();
        let fireworks = self
            .fireworks
            .get_or_insert_with(|| Fireworks::new(style, platform));
        if let Err(err) = fireworks.start(self.config.firework_duration) {
            log::error!("[Birthday] Fireworks unavailable: {}", err);
        }

        if let Err(err) = self.confetti.init() {
            log::error!("[Birthday] Confetti unavailable: {}", err);
        }
        let now = self.platform.clock.now();
        self.confetti_until = Deadline::after(now, self.config.confetti_duration);
        self.after(Timer::Confetti, FIRST_CONFETTI_MS, Inner::confetti_burst);

        if let EffectDuration::Finite(ms) = self.config.firework_duration {
            log::info!("[Birthday] Celebration ends in {}ms", ms);
            let delay = u32::try_from(ms).unwrap_or(u32::MAX);
            self.after(Timer::Expiry, delay, |inner| {
                log::info!("[Birthday] Celebration duration elapsed");
                inner.stop();
            });
        }
    }

    fn confetti_burst(&mut self) {
        let now = self.platform.clock.now();
        if self.phase != Phase::Celebrating || self.confetti_until.has_passed(now) {
            log::debug!("[Birthday] Confetti chain finished");
            return;
        }
        if let Err(err) = self.confetti.fire() {
            log::warn!("[Birthday] Confetti burst failed: {}", err);
        }
        let gap = confetti_gap(&mut self.rng);
        self.after(Timer::Confetti, gap, Inner::confetti_burst);
    }

    fn treat_widgets(&self) {
        let stage = &self.platform.stage;
        stage.remove_backdrop();
        let treatment = if self.config.immersive_mode {
            log::debug!("[Birthday] Immersive mode, dimming other widgets");
            stage.show_backdrop();
            WidgetTreatment::Dimmed
        } else {
            WidgetTreatment::Normal
        };
        for widget in stage.widgets() {
            stage.treat_widget(&widget, treatment);
        }
    }

    /// Take down every visual and session timer. Phase is left alone.
    fn clear_visuals(&mut self) {
        self.timers.disarm_session();
        let stage = &self.platform.stage;
        stage.remove_backdrop();
        if let Some(fireworks) = self.fireworks.as_mut() {
            fireworks.cleanup();
        }
        self.confetti.cleanup();
        stage.remove_overlay();
        for widget in stage.widgets() {
            stage.treat_widget(&widget, WidgetTreatment::Normal);
        }
    }

    fn end(&mut self) {
        self.clear_visuals();
        self.phase = Phase::Idle;
        self.celebrant = None;
    }

    /// End the session and remember it so the periodic check leaves the
    /// celebrant alone for the rest of the day.
    fn stop(&mut self) {
        if let Some(name) = self.celebrant.take() {
            log::info!("[Birthday] Stopping celebration for {}", name);
            self.finished = Some((self.platform.clock.today(), name));
        }
        self.end();
    }

    fn suspend(&mut self) {
        if self.phase != Phase::Celebrating {
            log::debug!("[Birthday] No active celebration to suspend");
            return;
        }
        log::info!("[Birthday] Suspending celebration for {:?}", self.celebrant);
        self.clear_visuals();
        self.phase = Phase::Suspended;
    }

    fn resume(&mut self) {
        if self.phase != Phase::Suspended {
            self.after(Timer::Recheck, RESUME_DELAY_MS, |inner| {
                inner.check(true);
            });
            return;
        }
        let today = self.platform.clock.today();
        match self.todays_celebrant(today) {
            Ok(Some(name)) => {
                log::info!("[Birthday] Birthday still on for {}, restarting", name);
                self.begin(name, RESUME_DELAY_MS);
            }
            Ok(None) => {
                log::warn!("[Birthday] Birthday is over, not resuming");
                self.end();
            }
            Err(err) => {
                log::error!("[Birthday] {}", err);
                self.end();
            }
        }
    }
}

/// Watches the calendar and runs birthday celebrations on a [`Platform`].
pub struct Celebration {
    inner: Rc<RefCell<Inner>>,
}

impl Celebration {
    pub fn new(config: Config, platform: Platform) -> Self {
        let inner = Rc::new_cyclic(|this| {
            RefCell::new(Inner {
                this: this.clone(),
                confetti: Confetti::new(platform.clone()),
                timers: Timers::new(Rc::clone(&platform.scheduler)),
                fireworks: None,
                config,
                platform,
                phase: Phase::Idle,
                celebrant: None,
                finished: None,
                confetti_until: Deadline::Never,
                rng: Rng::new(),
            })
        });
        Self { inner }
    }

    pub fn with_seed(self, seed: u64) -> Self {
        self.inner.borrow_mut().rng = Rng::with_seed(seed);
        self
    }

    /// Begin checking: once after the startup delay, then every minute.
    pub fn start(&self) {
        self.inner.borrow_mut().schedule_checks();
    }

    /// Look for a birthday today and start a session on a match. A forced
    /// check restarts a running session and ends one whose day is over.
    /// Returns whether a session was started.
    pub fn check(&self, force: bool) -> bool {
        self.inner.borrow_mut().check(force)
    }

    /// End the current session, if any.
    pub fn stop(&self) {
        self.inner.borrow_mut().stop();
    }

    pub fn suspend(&self) {
        self.inner.borrow_mut().suspend();
    }

    pub fn resume(&self) {
        self.inner.borrow_mut().resume();
    }

    pub fn phase(&self) -> Phase {
        self.inner.borrow().phase
    }

    pub fn celebrant(&self) -> Option<String> {
        self.inner.borrow().celebrant.clone()
    }

    pub fn config(&self) -> Config {
        self.inner.borrow().config.clone()
    }
}

impl Drop for Celebration {
    fn drop(&mut self) {
        if let Ok(mut inner) = self.inner.try_borrow_mut() {
            inner.timers.disarm_all();
            inner.end();
        }
    }
}

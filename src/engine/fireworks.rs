//! The fireworks engine.
//!
//! One engine drives whichever [`Effect`] the configured style builds. The
//! engine owns the surface, the deadline and the frame loop; the effect
//! only simulates and draws.

use std::cell::RefCell;
use std::rc::Rc;

use fastrand::Rng;

use super::{Animate, Deadline, EffectDuration, Flow, FrameLoop, SurfaceSlot};
use crate::effects::{Effect, FireworkStyle, World};
use crate::error::Result;
use crate::platform::Platform;
use crate::render::{Layer, SurfaceSpec};

struct Show {
    label: FireworkStyle,
    effect: Box<dyn Effect>,
    slot: SurfaceSlot,
    deadline: Deadline,
    rng: Rng,
}

impl Show {
    fn halt(&mut self) {
        self.effect.clear();
        self.slot.release();
    }
}

impl Animate for Show {
    fn frame(&mut self, now: f64) -> Flow {
        if self.deadline.has_passed(now) {
            log::info!("[Fireworks] {} finished, duration elapsed", self.label);
            self.halt();
            return Flow::Stop;
        }
        let Show {
            label,
            effect,
            slot,
            rng,
            ..
        } = self;
        let Some(surface) = slot.active() else {
            log::warn!("[Fireworks] {} surface went away, stopping", label);
            return Flow::Stop;
        };
        surface.clear();
        surface.fade(effect.trail_fade());
        let mut world = World {
            now,
            size: surface.size(),
            rng,
        };
        effect.step(&mut world);
        effect.draw(&mut **surface);
        Flow::Continue
    }
}

pub struct Fireworks {
    show: Rc<RefCell<Show>>,
    frames: FrameLoop,
    platform: Platform,
}

impl Fireworks {
    pub fn new(style: FireworkStyle, platform: Platform) -> Self {
        let effect = style.build();
        let slot = SurfaceSlot::new(
            Rc::clone(&platform.stage),
            SurfaceSpec {
                marker: effect.marker(),
                layer: Layer::FIREWORKS,
            },
        );
        Self {
            show: Rc::new(RefCell::new(Show {
                label: style,
                effect,
                slot,
                deadline: Deadline::Never,
                rng: Rng::new(),
            })),
            frames: FrameLoop::new(Rc::clone(&platform.scheduler)),
            platform,
        }
    }

    /// Fix the random sequence, for reproducible runs.
    pub fn with_seed(self, seed: u64) -> Self {
        self.show.borrow_mut().rng = Rng::with_seed(seed);
        self
    }

    pub fn style(&self) -> FireworkStyle {
        self.show.borrow().label
    }

    /// Put the surface up, (re)set the deadline and start the loop. Calling
    /// this while running only moves the deadline.
    pub fn start(&mut self, duration: EffectDuration) -> Result<()> {
        let now = self.platform.clock.now();
        {
            let mut show = self.show.borrow_mut();
            log::info!("[Fireworks] Starting {} for {:?}", show.label, duration);
            show.slot.ensure()?;
            show.deadline = Deadline::after(now, duration);
            if !self.frames.is_running() {
                show.effect.begin(now);
            }
        }
        if !self.frames.start(&self.show) {
            log::debug!("[Fireworks] Animation already running");
        }
        Ok(())
    }

    /// Run one frame by hand. Returns [`Flow::Stop`] once the engine has
    /// nothing left to do.
    pub fn update(&mut self, now: f64) -> Flow {
        let flow = self.show.borrow_mut().frame(now);
        if flow == Flow::Stop {
            self.frames.stop();
        }
        flow
    }

    /// Stop the loop and release everything. Safe to call repeatedly.
    pub fn cleanup(&mut self) {
        self.frames.stop();
        self.show.borrow_mut().halt();
    }

    pub fn is_running(&self) -> bool {
        self.frames.is_running()
    }

    pub fn population(&self) -> usize {
        self.show.borrow().effect.population()
    }

    pub fn is_attached(&self) -> bool {
        self.show.borrow().slot.is_attached()
    }
}

impl Drop for Fireworks {
    fn drop(&mut self) {
        self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::MonthDay;
    use crate::platform::headless::{FRAME_MS, Harness};
    use crate::platform::Stage;
    use glam::Vec2;

    fn harness() -> Harness {
        Harness::new(MonthDay::new(3, 15).unwrap(), Vec2::new(1280.0, 720.0))
    }

    #[test]
    fn test_start_attaches_and_runs() {
        let h = harness();
        let mut fireworks = Fireworks::new(FireworkStyle::Classic, h.platform()).with_seed(1);
        fireworks.start(EffectDuration::Unbounded).unwrap();
        h.scheduler.advance(FRAME_MS * 60.0);
        assert!(fireworks.is_running());
        assert_eq!(h.stage.attached("classic-firework-canvas"), 1);
        assert_eq!(h.stage.frames_drawn("classic-firework-canvas"), 60);
    }

    #[test]
    fn test_double_start_keeps_one_surface_and_loop() {
        let h = harness();
        let mut fireworks = Fireworks::new(FireworkStyle::Glow, h.platform());
        fireworks.start(EffectDuration::Unbounded).unwrap();
        fireworks.start(EffectDuration::Unbounded).unwrap();
        assert_eq!(h.stage.created("glow-firework-canvas"), 1);
        assert_eq!(h.scheduler.pending_frames(), 1);
        h.scheduler.advance(FRAME_MS * 3.0);
        assert_eq!(h.stage.frames_drawn("glow-firework-canvas"), 3);
    }

    #[test]
    fn test_finite_duration_stops_and_detaches() {
        let h = harness();
        let mut fireworks = Fireworks::new(FireworkStyle::CometTrail, h.platform());
        fireworks.start(EffectDuration::Finite(5000)).unwrap();
        h.scheduler.advance(4990.0);
        assert!(fireworks.is_running());
        h.scheduler.advance(FRAME_MS);
        assert!(!fireworks.is_running());
        assert_eq!(h.stage.attached_total(), 0);
        assert_eq!(h.scheduler.pending_frames(), 0);
        assert_eq!(fireworks.population(), 0);
    }

    #[test]
    fn test_restart_extends_deadline() {
        let h = harness();
        let mut fireworks = Fireworks::new(FireworkStyle::Classic, h.platform());
        fireworks.start(EffectDuration::Finite(1000)).unwrap();
        h.scheduler.advance(800.0);
        fireworks.start(EffectDuration::Finite(1000)).unwrap();
        h.scheduler.advance(800.0);
        assert!(fireworks.is_running());
    }

    #[test]
    fn test_cleanup_twice_leaves_nothing() {
        let h = harness();
        let mut fireworks = Fireworks::new(FireworkStyle::Megabombastic, h.platform());
        fireworks.start(EffectDuration::Unbounded).unwrap();
        h.scheduler.advance(FRAME_MS * 10.0);
        fireworks.cleanup();
        fireworks.cleanup();
        assert_eq!(h.stage.attached_total(), 0);
        assert_eq!(h.stage.resize_listeners(), 0);
        assert_eq!(h.scheduler.pending_frames(), 0);
        assert!(!fireworks.is_running());
    }

    #[test]
    fn test_cleanup_then_start_reinitialises() {
        let h = harness();
        let mut fireworks = Fireworks::new(FireworkStyle::Spiral, h.platform());
        fireworks.start(EffectDuration::Unbounded).unwrap();
        h.scheduler.advance(FRAME_MS * 5.0);
        fireworks.cleanup();
        fireworks.start(EffectDuration::Unbounded).unwrap();
        h.scheduler.advance(FRAME_MS);
        assert!(fireworks.is_running());
        assert_eq!(h.stage.attached("spiral-firework-canvas"), 1);
        assert_eq!(fireworks.population(), 30);
    }

    #[test]
    fn test_surface_refusal_is_an_error_and_stays_idle() {
        let h = harness();
        h.stage.refuse_surfaces(true);
        let mut fireworks = Fireworks::new(FireworkStyle::Classic, h.platform());
        assert!(fireworks.start(EffectDuration::Unbounded).is_err());
        assert!(!fireworks.is_running());
        assert_eq!(h.scheduler.pending_frames(), 0);
    }

    #[test]
    fn test_loop_stops_when_surface_is_removed_externally() {
        let h = harness();
        let mut fireworks = Fireworks::new(FireworkStyle::Classic, h.platform());
        fireworks.start(EffectDuration::Unbounded).unwrap();
        h.stage.remove_surfaces("classic-firework-canvas");
        h.scheduler.advance(FRAME_MS);
        assert!(!fireworks.is_running());
        fireworks.start(EffectDuration::Unbounded).unwrap();
        assert!(fireworks.is_running());
        assert_eq!(h.stage.attached("classic-firework-canvas"), 1);
    }

    #[test]
    fn test_manual_update_past_deadline() {
        let h = harness();
        let mut fireworks = Fireworks::new(FireworkStyle::Jellyfish, h.platform());
        fireworks.start(EffectDuration::Finite(100)).unwrap();
        assert_eq!(fireworks.update(50.0), Flow::Continue);
        assert_eq!(fireworks.update(100.0), Flow::Stop);
        assert!(!fireworks.is_attached());
        assert_eq!(h.scheduler.pending_frames(), 0);
    }
}

//! Cooperative animation loop.
//!
//! Each running loop owns a [`CancelToken`]. Every frame callback checks the
//! token before it touches the animated state, so a callback that was
//! already queued when the loop stopped returns without doing anything.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::platform::{FrameHandle, Scheduler};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// State advanced once per animation frame.
pub trait Animate {
    fn frame(&mut self, now: f64) -> Flow;
}

/// Shared stop flag for one run of a [`FrameLoop`].
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

struct Run {
    token: CancelToken,
    pending: Rc<Cell<Option<FrameHandle>>>,
}

/// Drives an [`Animate`] target from scheduler frames until it returns
/// [`Flow::Stop`] or the loop is stopped.
pub struct FrameLoop {
    scheduler: Rc<dyn Scheduler>,
    run: Option<Run>,
}

impl FrameLoop {
    pub fn new(scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            scheduler,
            run: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.run.as_ref().is_some_and(|r| !r.token.is_cancelled())
    }

    /// Begin driving `target`. Returns `false` and does nothing if a run is
    /// already live.
    pub fn start<A: Animate + 'static>(&mut self, target: &Rc<RefCell<A>>) -> bool {
        if self.is_running() {
            return false;
        }
        let run = Run {
            token: CancelToken::new(),
            pending: Rc::new(Cell::new(None)),
        };
        schedule(
            Rc::clone(&self.scheduler),
            Rc::downgrade(target),
            run.token.clone(),
            Rc::clone(&run.pending),
        );
        self.run = Some(run);
        true
    }

    /// Cancel the run and its queued frame. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if let Some(run) = self.run.take() {
            run.token.cancel();
            if let Some(handle) = run.pending.take() {
                self.scheduler.cancel_frame(handle);
            }
        }
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

fn schedule<A: Animate + 'static>(
    scheduler: Rc<dyn Scheduler>,
    target: Weak<RefCell<A>>,
    token: CancelToken,
    pending: Rc<Cell<Option<FrameHandle>>>,
) {
    let next = Rc::clone(&scheduler);
    let slot = Rc::clone(&pending);
    let handle = scheduler.request_frame(Box::new(move |now| {
        slot.set(None);
        if token.is_cancelled() {
            return;
        }
        let Some(target) = target.upgrade() else {
            token.cancel();
            return;
        };
        let flow = target.borrow_mut().frame(now);
        match flow {
            Flow::Continue if !token.is_cancelled() => {
                schedule(next, Rc::downgrade(&target), token, slot);
            }
            _ => token.cancel(),
        }
    }));
    pending.set(Some(handle));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::MonthDay;
    use crate::platform::headless::{FRAME_MS, ManualClock, ManualScheduler};

    struct Counter {
        frames: usize,
        stop_after: usize,
    }

    impl Animate for Counter {
        fn frame(&mut self, _now: f64) -> Flow {
            self.frames += 1;
            if self.frames >= self.stop_after {
                Flow::Stop
            } else {
                Flow::Continue
            }
        }
    }

    fn scheduler() -> Rc<ManualScheduler> {
        let clock = Rc::new(ManualClock::new(MonthDay::new(1, 1).unwrap()));
        Rc::new(ManualScheduler::new(clock))
    }

    #[test]
    fn test_runs_until_target_stops() {
        let sched = scheduler();
        let target = Rc::new(RefCell::new(Counter {
            frames: 0,
            stop_after: 3,
        }));
        let mut frames = FrameLoop::new(sched.clone());
        assert!(frames.start(&target));
        sched.advance(FRAME_MS * 10.0);
        assert_eq!(target.borrow().frames, 3);
        assert!(!frames.is_running());
        assert_eq!(sched.pending_frames(), 0);
    }

    #[test]
    fn test_second_start_is_refused_while_running() {
        let sched = scheduler();
        let target = Rc::new(RefCell::new(Counter {
            frames: 0,
            stop_after: usize::MAX,
        }));
        let mut frames = FrameLoop::new(sched.clone());
        assert!(frames.start(&target));
        assert!(!frames.start(&target));
        assert_eq!(sched.pending_frames(), 1);
        sched.advance(FRAME_MS * 4.0);
        assert_eq!(target.borrow().frames, 4);
    }

    #[test]
    fn test_stop_cancels_pending_frame_and_is_idempotent() {
        let sched = scheduler();
        let target = Rc::new(RefCell::new(Counter {
            frames: 0,
            stop_after: usize::MAX,
        }));
        let mut frames = FrameLoop::new(sched.clone());
        frames.start(&target);
        sched.advance(FRAME_MS);
        frames.stop();
        frames.stop();
        assert_eq!(sched.pending_frames(), 0);
        sched.advance(FRAME_MS * 5.0);
        assert_eq!(target.borrow().frames, 1);
    }

    #[test]
    fn test_restart_after_stop() {
        let sched = scheduler();
        let target = Rc::new(RefCell::new(Counter {
            frames: 0,
            stop_after: usize::MAX,
        }));
        let mut frames = FrameLoop::new(sched.clone());
        frames.start(&target);
        frames.stop();
        assert!(frames.start(&target));
        sched.advance(FRAME_MS * 2.0);
        assert_eq!(target.borrow().frames, 2);
        assert_eq!(sched.pending_frames(), 1);
    }

    #[test]
    fn test_stale_callback_checks_token() {
        let sched = scheduler();
        let target = Rc::new(RefCell::new(Counter {
            frames: 0,
            stop_after: usize::MAX,
        }));
        let mut frames = FrameLoop::new(sched.clone());
        frames.start(&target);
        // Cancel only the token, leaving the queued callback in place.
        if let Some(run) = &frames.run {
            run.token.cancel();
        }
        assert_eq!(sched.pending_frames(), 1);
        sched.run_frame();
        assert_eq!(target.borrow().frames, 0);
        assert!(!frames.is_running());
    }
}

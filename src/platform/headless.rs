//! An in-memory platform driven by hand.
//!
//! Time only moves when told to, frames and timers only run when pumped, and
//! surfaces record what they were asked to draw. Used by the test suite and
//! by hosts that want to simulate a celebration without a browser.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use chrono::NaiveTime;
use glam::Vec2;

use super::{
    Clock, FrameCallback, FrameHandle, OverlayContent, Platform, Scheduler, Stage, TimerCallback,
    TimerHandle, WidgetId, WidgetTreatment,
};
use crate::calendar::MonthDay;
use crate::error::{Error, Result};
use crate::render::{Blend, Fill, Path, Shape, Stroke, Style, Surface, SurfaceSpec};

/// Length of one simulated animation frame.
pub const FRAME_MS: f64 = 16.0;

pub struct ManualClock {
    now: Cell<f64>,
    today: Cell<MonthDay>,
}

impl ManualClock {
    pub fn new(today: MonthDay) -> Self {
        Self {
            now: Cell::new(0.0),
            today: Cell::new(today),
        }
    }

    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }

    pub fn set_today(&self, today: MonthDay) {
        self.today.set(today);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }

    fn today(&self) -> MonthDay {
        self.today.get()
    }

    /// Midnight plus the elapsed simulated time, wrapping daily.
    fn time_of_day(&self) -> NaiveTime {
        let secs = (self.now.get() / 1000.0) as u32 % 86_400;
        NaiveTime::from_num_seconds_from_midnight_opt(secs, 0).unwrap_or_default()
    }
}

struct PendingTimer {
    handle: TimerHandle,
    due: f64,
    callback: TimerCallback,
}

#[derive(Default)]
struct Queue {
    next: i32,
    frames: Vec<(FrameHandle, FrameCallback)>,
    timers: Vec<PendingTimer>,
}

impl Queue {
    fn next_id(&mut self) -> i32 {
        self.next += 1;
        self.next
    }
}

pub struct ManualScheduler {
    clock: Rc<ManualClock>,
    queue: RefCell<Queue>,
}

impl ManualScheduler {
    pub fn new(clock: Rc<ManualClock>) -> Self {
        Self {
            clock,
            queue: RefCell::new(Queue::default()),
        }
    }

    pub fn pending_frames(&self) -> usize {
        self.queue.borrow().frames.len()
    }

    pub fn pending_timers(&self) -> usize {
        self.queue.borrow().timers.len()
    }

    /// Run every frame callback queued before this call. Frames requested
    /// while running wait for the next call.
    pub fn run_frame(&self) -> usize {
        let batch = std::mem::take(&mut self.queue.borrow_mut().frames);
        let now = self.clock.now();
        let ran = batch.len();
        for (_, callback) in batch {
            callback(now);
        }
        ran
    }

    /// Fire every timer that is due, earliest first.
    pub fn run_timers(&self) -> usize {
        let mut fired = 0;
        loop {
            let next = {
                let mut queue = self.queue.borrow_mut();
                let now = self.clock.now();
                let due = queue
                    .timers
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.due <= now)
                    .min_by(|(_, a), (_, b)| {
                        a.due.total_cmp(&b.due).then(a.handle.0.cmp(&b.handle.0))
                    })
                    .map(|(i, _)| i);
                due.map(|i| queue.timers.remove(i))
            };
            match next {
                Some(timer) => {
                    (timer.callback)();
                    fired += 1;
                }
                None => break,
            }
        }
        fired
    }

    /// Move time forward in frame-sized steps, firing due timers and then
    /// one frame batch at every step.
    pub fn advance(&self, ms: f64) {
        let target = self.clock.now() + ms;
        while self.clock.now() < target {
            let step = FRAME_MS.min(target - self.clock.now());
            self.clock.advance(step);
            self.run_timers();
            self.run_frame();
        }
    }
}

impl Scheduler for ManualScheduler {
    fn request_frame(&self, callback: FrameCallback) -> FrameHandle {
        let mut queue = self.queue.borrow_mut();
        let handle = FrameHandle(queue.next_id());
        queue.frames.push((handle, callback));
        handle
    }

    fn cancel_frame(&self, handle: FrameHandle) {
        self.queue.borrow_mut().frames.retain(|(h, _)| *h != handle);
    }

    fn set_timeout(&self, delay_ms: u32, callback: TimerCallback) -> TimerHandle {
        let mut queue = self.queue.borrow_mut();
        let handle = TimerHandle(queue.next_id());
        queue.timers.push(PendingTimer {
            handle,
            due: self.clock.now() + delay_ms as f64,
            callback,
        });
        handle
    }

    fn clear_timeout(&self, handle: TimerHandle) {
        self.queue.borrow_mut().timers.retain(|t| t.handle != handle);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Circle,
    Arc,
    Rect,
    Polygon(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    Polyline(usize),
    Bezier,
    Circle,
}

/// One recorded draw call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawOp {
    Fill {
        shape: ShapeKind,
        alpha: f32,
        blend: Blend,
    },
    Stroke {
        path: PathKind,
        alpha: f32,
    },
}

/// A surface that exists on the stage. Records go away when their surface
/// is detached or dropped.
#[derive(Default)]
struct SurfaceRecord {
    id: usize,
    marker: &'static str,
    attached: bool,
    listening: bool,
    frames: usize,
    ops: Vec<DrawOp>,
}

impl SurfaceRecord {
    fn new(id: usize, marker: &'static str) -> Self {
        Self {
            id,
            marker,
            attached: false,
            listening: false,
            frames: 0,
            ops: Vec::new(),
        }
    }
}

#[derive(Default)]
struct StageState {
    viewport: Vec2,
    next_id: usize,
    surfaces: Vec<SurfaceRecord>,
    created: HashMap<&'static str, usize>,
    overlay: Option<OverlayContent>,
    backdrop: bool,
    widgets: Vec<(WidgetId, WidgetTreatment)>,
    refuse_surfaces: bool,
}

impl StageState {
    fn record(&mut self, id: usize) -> Option<&mut SurfaceRecord> {
        self.surfaces.iter_mut().find(|s| s.id == id)
    }

    fn forget(&mut self, id: usize) {
        self.surfaces.retain(|s| s.id != id);
    }
}

pub struct HeadlessStage {
    state: Rc<RefCell<StageState>>,
}

impl HeadlessStage {
    pub fn new(viewport: Vec2) -> Self {
        Self {
            state: Rc::new(RefCell::new(StageState {
                viewport,
                ..StageState::default()
            })),
        }
    }

    pub fn set_widgets<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state.borrow_mut().widgets = names
            .into_iter()
            .map(|n| (WidgetId(n.into()), WidgetTreatment::Normal))
            .collect();
    }

    /// Change the viewport; attached surfaces pick the new size up at once.
    pub fn set_viewport(&self, viewport: Vec2) {
        self.state.borrow_mut().viewport = viewport;
    }

    /// Make every following `create_surface` fail.
    pub fn refuse_surfaces(&self, refuse: bool) {
        self.state.borrow_mut().refuse_surfaces = refuse;
    }

    /// How many `marker` surfaces were ever created.
    pub fn created(&self, marker: &str) -> usize {
        self.state.borrow().created.get(marker).copied().unwrap_or(0)
    }

    /// Surfaces the stage still tracks, attached or not.
    pub fn live_surfaces(&self) -> usize {
        self.state.borrow().surfaces.len()
    }

    pub fn attached(&self, marker: &str) -> usize {
        self.state
            .borrow()
            .surfaces
            .iter()
            .filter(|s| s.marker == marker && s.attached)
            .count()
    }

    pub fn attached_total(&self) -> usize {
        self.state
            .borrow()
            .surfaces
            .iter()
            .filter(|s| s.attached)
            .count()
    }

    pub fn resize_listeners(&self) -> usize {
        self.state
            .borrow()
            .surfaces
            .iter()
            .filter(|s| s.listening)
            .count()
    }

    /// How many times the newest `marker` surface has been cleared.
    pub fn frames_drawn(&self, marker: &str) -> usize {
        self.newest(marker, |s| s.frames).unwrap_or(0)
    }

    /// Draw calls since the newest `marker` surface was last cleared.
    pub fn last_frame(&self, marker: &str) -> Vec<DrawOp> {
        self.newest(marker, |s| s.ops.clone()).unwrap_or_default()
    }

    pub fn overlay(&self) -> Option<OverlayContent> {
        self.state.borrow().overlay.clone()
    }

    pub fn backdrop_visible(&self) -> bool {
        self.state.borrow().backdrop
    }

    pub fn treatment(&self, name: &str) -> Option<WidgetTreatment> {
        self.state
            .borrow()
            .widgets
            .iter()
            .find(|(id, _)| id.0 == name)
            .map(|(_, t)| *t)
    }

    fn newest<T>(&self, marker: &str, f: impl FnOnce(&SurfaceRecord) -> T) -> Option<T> {
        self.state
            .borrow()
            .surfaces
            .iter()
            .rev()
            .find(|s| s.marker == marker)
            .map(f)
    }
}

impl Stage for HeadlessStage {
    fn viewport(&self) -> Vec2 {
        self.state.borrow().viewport
    }

    fn create_surface(&self, spec: SurfaceSpec) -> Result<Box<dyn Surface>> {
        let mut state = self.state.borrow_mut();
        if state.refuse_surfaces {
            return Err(Error::SurfaceUnavailable(format!(
                "no 2d context for {}",
                spec.marker
            )));
        }
        state.next_id += 1;
        let id = state.next_id;
        *state.created.entry(spec.marker).or_default() += 1;
        state.surfaces.push(SurfaceRecord::new(id, spec.marker));
        Ok(Box::new(RecordingSurface {
            id,
            marker: spec.marker,
            state: Rc::clone(&self.state),
        }))
    }

    fn remove_surfaces(&self, marker: &str) -> usize {
        let mut removed = 0;
        for surface in self.state.borrow_mut().surfaces.iter_mut() {
            if surface.marker == marker && surface.attached {
                surface.attached = false;
                removed += 1;
            }
        }
        removed
    }

    fn show_overlay(&self, content: &OverlayContent) {
        self.state.borrow_mut().overlay = Some(content.clone());
    }

    fn remove_overlay(&self) {
        self.state.borrow_mut().overlay = None;
    }

    fn show_backdrop(&self) {
        self.state.borrow_mut().backdrop = true;
    }

    fn remove_backdrop(&self) {
        self.state.borrow_mut().backdrop = false;
    }

    fn widgets(&self) -> Vec<WidgetId> {
        self.state
            .borrow()
            .widgets
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }

    fn treat_widget(&self, widget: &WidgetId, treatment: WidgetTreatment) {
        let mut state = self.state.borrow_mut();
        if let Some(entry) = state.widgets.iter_mut().find(|(id, _)| id == widget) {
            entry.1 = treatment;
        }
    }
}

struct RecordingSurface {
    id: usize,
    marker: &'static str,
    state: Rc<RefCell<StageState>>,
}

impl RecordingSurface {
    fn push(&self, op: DrawOp) {
        if let Some(record) = self.state.borrow_mut().record(self.id) {
            record.ops.push(op);
        }
    }
}

impl Surface for RecordingSurface {
    fn marker(&self) -> &str {
        self.marker
    }

    fn size(&self) -> Vec2 {
        self.state.borrow().viewport
    }

    fn is_attached(&self) -> bool {
        self.state
            .borrow()
            .surfaces
            .iter()
            .any(|s| s.id == self.id && s.attached)
    }

    fn attach(&mut self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.record(self.id).is_none() {
            state.surfaces.push(SurfaceRecord::new(self.id, self.marker));
        }
        if let Some(record) = state.record(self.id) {
            record.attached = true;
            record.listening = true;
        }
        Ok(())
    }

    fn detach(&mut self) {
        self.state.borrow_mut().forget(self.id);
    }

    fn clear(&mut self) {
        if let Some(record) = self.state.borrow_mut().record(self.id) {
            record.ops.clear();
            record.frames += 1;
        }
    }

    fn fill(&mut self, shape: &Shape<'_>, _fill: &Fill, style: &Style) {
        let shape = match shape {
            Shape::Circle { .. } => ShapeKind::Circle,
            Shape::Arc { .. } => ShapeKind::Arc,
            Shape::Rect { .. } => ShapeKind::Rect,
            Shape::Polygon(points) => ShapeKind::Polygon(points.len()),
        };
        self.push(DrawOp::Fill {
            shape,
            alpha: style.alpha,
            blend: style.blend,
        });
    }

    fn stroke(&mut self, path: &Path<'_>, _stroke: &Stroke, style: &Style) {
        let path = match path {
            Path::Polyline { points, .. } => PathKind::Polyline(points.len()),
            Path::Bezier { .. } => PathKind::Bezier,
            Path::Circle { .. } => PathKind::Circle,
        };
        self.push(DrawOp::Stroke {
            path,
            alpha: style.alpha,
        });
    }
}

impl Drop for RecordingSurface {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.try_borrow_mut() {
            state.forget(self.id);
        }
    }
}

/// A complete headless platform plus typed handles to its parts.
pub struct Harness {
    pub clock: Rc<ManualClock>,
    pub scheduler: Rc<ManualScheduler>,
    pub stage: Rc<HeadlessStage>,
}

impl Harness {
    pub fn new(today: MonthDay, viewport: Vec2) -> Self {
        let clock = Rc::new(ManualClock::new(today));
        let scheduler = Rc::new(ManualScheduler::new(Rc::clone(&clock)));
        Self {
            clock,
            scheduler,
            stage: Rc::new(HeadlessStage::new(viewport)),
        }
    }

    pub fn with_widgets<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stage.set_widgets(names);
        self
    }

    pub fn platform(&self) -> Platform {
        Platform {
            clock: self.clock.clone(),
            scheduler: self.scheduler.clone(),
            stage: self.stage.clone(),
        }
    }
}

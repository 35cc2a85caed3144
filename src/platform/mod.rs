//! Host collaborators.
//!
//! Everything the celebration needs from its surroundings (time, callback
//! scheduling, the page it draws on) goes through the traits here, bundled
//! into a [`Platform`] that is handed to each component explicitly.

pub mod headless;
#[cfg(target_arch = "wasm32")]
pub mod web;

use std::rc::Rc;

use chrono::NaiveTime;
use glam::Vec2;

use crate::calendar::MonthDay;
use crate::error::Result;
use crate::render::{Surface, SurfaceSpec};

pub trait Clock {
    /// Milliseconds on the same timeline the scheduler reports to frames.
    fn now(&self) -> f64;
    /// The local calendar day.
    fn today(&self) -> MonthDay;
    /// The local wall-clock time.
    fn time_of_day(&self) -> NaiveTime;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub i32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(pub i32);

/// Receives [`Clock::now`] at the time the frame runs.
pub type FrameCallback = Box<dyn FnOnce(f64)>;
pub type TimerCallback = Box<dyn FnOnce()>;

/// Cooperative single-threaded callback scheduling.
///
/// Callbacks never run inside the call that registers them, and a
/// cancelled handle never fires.
pub trait Scheduler {
    fn request_frame(&self, callback: FrameCallback) -> FrameHandle;
    fn cancel_frame(&self, handle: FrameHandle);
    fn set_timeout(&self, delay_ms: u32, callback: TimerCallback) -> TimerHandle;
    fn clear_timeout(&self, handle: TimerHandle);
}

/// Opaque reference to another dashboard widget.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WidgetId(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WidgetTreatment {
    #[default]
    Normal,
    Dimmed,
}

/// Text shown in the celebration overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayContent {
    pub message: String,
    pub debug: Option<Vec<String>>,
}

/// The page the celebration is drawn over.
pub trait Stage {
    fn viewport(&self) -> Vec2;

    /// Create a detached surface sized to the viewport.
    fn create_surface(&self, spec: SurfaceSpec) -> Result<Box<dyn Surface>>;

    /// Remove every surface carrying `marker`, returning how many went.
    fn remove_surfaces(&self, marker: &str) -> usize;

    /// Show the message container, creating it if needed.
    fn show_overlay(&self, content: &OverlayContent);
    fn remove_overlay(&self);

    fn show_backdrop(&self);
    fn remove_backdrop(&self);

    /// Every widget on the page except this one.
    fn widgets(&self) -> Vec<WidgetId>;
    fn treat_widget(&self, widget: &WidgetId, treatment: WidgetTreatment);
}

#[derive(Clone)]
pub struct Platform {
    pub clock: Rc<dyn Clock>,
    pub scheduler: Rc<dyn Scheduler>,
    pub stage: Rc<dyn Stage>,
}

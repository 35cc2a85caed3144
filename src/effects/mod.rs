//! Firework styles.
//!
//! Every style is an [`Effect`]: a strategy that owns its particles and
//! knows how to spawn, advance and draw them. [`crate::engine::Fireworks`]
//! supplies the frame loop, the surface and the deadline around it.

mod classic;
mod comet;
mod glow;
mod jellyfish;
mod kaleidoscope;
mod mega;
mod sparkle;
mod spiral;
mod waterfall;

use std::fmt;

use fastrand::Rng;
use glam::Vec2;
use serde::Deserialize;

use crate::render::{Bounds, Rgb, Surface};

pub use classic::Classic;
pub use comet::CometTrail;
pub use glow::Glow;
pub use jellyfish::Jellyfish;
pub use kaleidoscope::Kaleidoscope;
pub use mega::Megabombastic;
pub use sparkle::Sparkle;
pub use spiral::Spiral;
pub use waterfall::Waterfall;

/// What an effect sees during one simulation step.
pub struct World<'a> {
    /// Current time in ms.
    pub now: f64,
    /// Surface size in px.
    pub size: Vec2,
    pub rng: &'a mut Rng,
}

/// How far past the surface edge a particle may drift before it is culled.
pub(crate) const CULL_MARGIN: f32 = 50.0;

impl World<'_> {
    /// The region particles stay alive in.
    pub fn visible(&self) -> Bounds {
        Bounds::viewport(self.size).inflate(CULL_MARGIN)
    }
}

pub trait Effect {
    /// Class name of the surface this effect draws on.
    fn marker(&self) -> &'static str;

    /// Alpha of the black wash painted before every frame.
    fn trail_fade(&self) -> f32 {
        0.1
    }

    /// Called whenever the engine (re)starts the effect.
    fn begin(&mut self, _now: f64) {}

    /// Spawn, advance and cull.
    fn step(&mut self, world: &mut World<'_>);

    fn draw(&self, surface: &mut dyn Surface);

    /// Drop every particle and emitter.
    fn clear(&mut self);

    /// Live particles plus emitters, for diagnostics and tests.
    fn population(&self) -> usize;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FireworkStyle {
    #[default]
    Classic,
    #[serde(alias = "comet")]
    CometTrail,
    Spiral,
    Glow,
    Jellyfish,
    Kaleidoscope,
    #[serde(alias = "mega")]
    Megabombastic,
    Sparkle,
    Waterfall,
}

impl FireworkStyle {
    pub const ALL: [FireworkStyle; 9] = [
        FireworkStyle::Classic,
        FireworkStyle::CometTrail,
        FireworkStyle::Spiral,
        FireworkStyle::Glow,
        FireworkStyle::Jellyfish,
        FireworkStyle::Kaleidoscope,
        FireworkStyle::Megabombastic,
        FireworkStyle::Sparkle,
        FireworkStyle::Waterfall,
    ];

    pub fn build(self) -> Box<dyn Effect> {
        match self {
            FireworkStyle::Classic => Box::new(Classic::default()),
            FireworkStyle::CometTrail => Box::new(CometTrail::default()),
            FireworkStyle::Spiral => Box::new(Spiral::default()),
            FireworkStyle::Glow => Box::new(Glow::default()),
            FireworkStyle::Jellyfish => Box::new(Jellyfish::default()),
            FireworkStyle::Kaleidoscope => Box::new(Kaleidoscope::default()),
            FireworkStyle::Megabombastic => Box::new(Megabombastic::default()),
            FireworkStyle::Sparkle => Box::new(Sparkle::default()),
            FireworkStyle::Waterfall => Box::new(Waterfall::default()),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FireworkStyle::Classic => "classic",
            FireworkStyle::CometTrail => "comet-trail",
            FireworkStyle::Spiral => "spiral",
            FireworkStyle::Glow => "glow",
            FireworkStyle::Jellyfish => "jellyfish",
            FireworkStyle::Kaleidoscope => "kaleidoscope",
            FireworkStyle::Megabombastic => "megabombastic",
            FireworkStyle::Sparkle => "sparkle",
            FireworkStyle::Waterfall => "waterfall",
        }
    }
}

impl fmt::Display for FireworkStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Uniform sample in `[lo, hi)`.
pub(crate) fn between(rng: &mut Rng, lo: f32, hi: f32) -> f32 {
    lo + rng.f32() * (hi - lo)
}

/// Uniform sample in `[-magnitude, magnitude)`.
pub(crate) fn jitter(rng: &mut Rng, magnitude: f32) -> f32 {
    between(rng, -magnitude, magnitude)
}

pub(crate) fn pick<T: Copy>(rng: &mut Rng, items: &[T]) -> T {
    items[rng.usize(..items.len())]
}

/// Fires once per interval, where each interval may be drawn afresh.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Cadence {
    next: f64,
}

impl Cadence {
    /// Make the next check fire immediately.
    pub fn reset(&mut self, now: f64) {
        self.next = now;
    }

    /// Whether the interval has elapsed; if so, arm the next one.
    pub fn due(&mut self, now: f64, interval: impl FnOnce() -> f64) -> bool {
        if now < self.next {
            return false;
        }
        self.next = now + interval();
        true
    }
}

/// Ease-out cubic on `t` in `[0, 1]`.
pub(crate) fn ease_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

pub(crate) fn hexes<const N: usize>(packed: [u32; N]) -> [Rgb; N] {
    packed.map(Rgb::hex)
}

//! Two confetti cannons firing from the bottom corners.

use std::cell::RefCell;
use std::rc::Rc;

use fastrand::Rng;
use glam::Vec2;

use super::{Animate, Flow, FrameLoop, SurfaceSlot};
use crate::error::Result;
use crate::platform::Platform;
use crate::render::{Fill, Layer, Rgb, Shape, Style, Surface, SurfaceSpec};

const MARKER: &str = "confetti-canvas";
const PER_CANNON: usize = 15;
const VELOCITY: f32 = 45.0;
const SPREAD_DEG: f32 = 20.0;
const GRAVITY: f32 = 0.25;
const DRAG: f32 = 0.045;
/// Minimum alpha lost per frame, so every piece eventually disappears.
const MIN_FADE: f32 = 0.004;
const VISIBLE: f32 = 0.1;
const PALETTE: [u32; 5] = [0xff718d, 0xfdff6a, 0x58cffb, 0xffffff, 0x7b52ff];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

impl Side {
    fn origin(self, viewport: Vec2) -> Vec2 {
        let x = match self {
            Side::Left => viewport.x * 0.15,
            Side::Right => viewport.x * 0.85,
        };
        Vec2::new(x, viewport.y - 20.0)
    }

    fn heading_deg(self) -> f32 {
        match self {
            Side::Left => -45.0,
            Side::Right => -135.0,
        }
    }
}

#[derive(Debug, Clone)]
struct Piece {
    pos: Vec2,
    vel: Vec2,
    /// Rotation in degrees.
    wobble: f32,
    wobble_speed: f32,
    color: Rgb,
    size: f32,
    alpha: f32,
}

impl Piece {
    fn launch(side: Side, viewport: Vec2, color: Rgb, rng: &mut Rng) -> Self {
        let variation = (rng.f32() - 0.5) * 20.0;
        let spread = (rng.f32() - 0.5) * SPREAD_DEG;
        let angle = (side.heading_deg() + variation + spread).to_radians();
        let speed = VELOCITY * (0.95 + rng.f32() * 0.25);
        Self {
            pos: side.origin(viewport),
            vel: Vec2::new(angle.cos() * speed, angle.sin() * speed * 1.4),
            wobble: rng.f32() * 360.0,
            wobble_speed: rng.f32() * 2.0 - 1.0,
            color,
            size: rng.f32() * 6.0 + 4.0,
            alpha: 1.0,
        }
    }

    /// Advance one frame. Returns whether the piece is still alive.
    fn advance(&mut self, height: f32) -> bool {
        self.pos += self.vel;
        self.vel.y += GRAVITY;
        self.vel *= 1.0 - DRAG;
        self.wobble += self.wobble_speed;

        let speed_fade = (self.vel.length() / 6.0).min(1.0);
        let floor_fade = 1.0 - ((self.pos.y - height * 0.95) / (height * 0.05)).max(0.0);
        self.alpha = (self.alpha - MIN_FADE).min(speed_fade.min(floor_fade));
        self.alpha > VISIBLE && self.pos.y < height
    }

    fn draw(&self, surface: &mut dyn Surface) {
        let half = self.size / 2.0;
        surface.fill(
            &Shape::Rect {
                origin: Vec2::new(-half, -self.size / 4.0),
                size: Vec2::new(self.size, half),
            },
            &Fill::Linear {
                from: Vec2::new(-half, 0.0),
                to: Vec2::new(half, 0.0),
                start: self.color.into(),
                end: self.color.brighten(20).into(),
            },
            &Style::alpha(self.alpha)
                .additive()
                .at(self.pos, self.wobble.to_radians()),
        );
    }
}

struct Cannons {
    slot: SurfaceSlot,
    pieces: Vec<Piece>,
    palette: [Rgb; 5],
    rng: Rng,
}

impl Animate for Cannons {
    fn frame(&mut self, _now: f64) -> Flow {
        let Some(surface) = self.slot.active() else {
            log::warn!("[Confetti] Surface went away, stopping");
            return Flow::Stop;
        };
        surface.clear();
        let height = surface.size().y;
        self.pieces.retain_mut(|piece| piece.advance(height));
        for piece in &self.pieces {
            piece.draw(&mut **surface);
        }
        if self.pieces.is_empty() {
            log::debug!("[Confetti] All pieces landed");
            Flow::Stop
        } else {
            Flow::Continue
        }
    }
}

pub struct Confetti {
    cannons: Rc<RefCell<Cannons>>,
    frames: FrameLoop,
    platform: Platform,
}

impl Confetti {
    pub fn new(platform: Platform) -> Self {
        let slot = SurfaceSlot::new(
            Rc::clone(&platform.stage),
            SurfaceSpec {
                marker: MARKER,
                layer: Layer::CONFETTI,
            },
        );
        Self {
            cannons: Rc::new(RefCell::new(Cannons {
                slot,
                pieces: Vec::new(),
                palette: PALETTE.map(Rgb::hex),
                rng: Rng::new(),
            })),
            frames: FrameLoop::new(Rc::clone(&platform.scheduler)),
            platform,
        }
    }

    pub fn with_seed(self, seed: u64) -> Self {
        self.cannons.borrow_mut().rng = Rng::with_seed(seed);
        self
    }

    /// Put the surface up and drop any pieces still in flight.
    pub fn init(&mut self) -> Result<()> {
        let mut cannons = self.cannons.borrow_mut();
        cannons.slot.ensure()?;
        cannons.pieces.clear();
        Ok(())
    }

    /// Fire both cannons. A missing surface is put back up without
    /// dropping the pieces already in flight.
    pub fn fire(&mut self) -> Result<()> {
        self.cannons.borrow_mut().slot.ensure()?;
        let viewport = self.platform.stage.viewport();
        {
            let Cannons {
                pieces,
                palette,
                rng,
                ..
            } = &mut *self.cannons.borrow_mut();
            for _ in 0..PER_CANNON {
                for side in [Side::Left, Side::Right] {
                    let color = palette[rng.usize(..palette.len())];
                    pieces.push(Piece::launch(side, viewport, color, rng));
                }
            }
            log::debug!("[Confetti] Fired, {} pieces in flight", pieces.len());
        }
        self.frames.start(&self.cannons);
        Ok(())
    }

    /// Run one frame by hand.
    pub fn update(&mut self, now: f64) -> Flow {
        let flow = self.cannons.borrow_mut().frame(now);
        if flow == Flow::Stop {
            self.frames.stop();
        }
        flow
    }

    /// Stop the loop, drop every piece and take the surface down. Safe to
    /// call repeatedly.
    pub fn cleanup(&mut self) {
        self.frames.stop();
        let mut cannons = self.cannons.borrow_mut();
        cannons.pieces.clear();
        cannons.slot.release();
    }

    pub fn particle_count(&self) -> usize {
        self.cannons.borrow().pieces.len()
    }

    pub fn is_animating(&self) -> bool {
        self.frames.is_running()
    }

    pub fn is_attached(&self) -> bool {
        self.cannons.borrow().slot.is_attached()
    }
}

impl Drop for Confetti {
    fn drop(&mut self) {
        self.cleanup();
    }
}

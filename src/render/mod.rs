//! Drawing primitives shared by every effect.
//!
//! Effects only talk to [`Surface`]; the browser backs it with a Canvas 2D
//! context and the headless platform records what would have been drawn.

pub mod bounds;
#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod color;
pub mod shape;

use glam::Vec2;

use crate::error::Error;

pub use bounds::Bounds;
pub use color::{Rgb, Rgba};
pub use shape::{Blend, Fill, Path, Shadow, Shape, Stroke, Style, Transform};

/// Stacking order of an overlay element, as a CSS `z-index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Layer(pub i32);

impl Layer {
    pub const BACKDROP: Layer = Layer(999_997);
    pub const FIREWORKS: Layer = Layer(999_998);
    pub const CONFETTI: Layer = Layer(999_999);
}

/// What a [`Surface`] is created for: its marker class and stacking layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSpec {
    pub marker: &'static str,
    pub layer: Layer,
}

/// A full-viewport drawing surface owned by exactly one engine.
///
/// Attaching puts the surface on screen and starts tracking viewport
/// resizes; detaching removes both. Both are idempotent.
pub trait Surface {
    fn marker(&self) -> &str;
    fn size(&self) -> Vec2;
    fn is_attached(&self) -> bool;
    fn attach(&mut self) -> Result<(), Error>;
    fn detach(&mut self);

    fn clear(&mut self);
    fn fill(&mut self, shape: &Shape<'_>, fill: &Fill, style: &Style);
    fn stroke(&mut self, path: &Path<'_>, stroke: &Stroke, style: &Style);

    /// Paint a translucent black wash over everything, leaving fading trails.
    fn fade(&mut self, alpha: f32) {
        if alpha <= 0.0 {
            return;
        }
        let size = self.size();
        self.fill(
            &Shape::Rect {
                origin: Vec2::ZERO,
                size,
            },
            &Fill::Solid(Rgb::BLACK.with_alpha(alpha)),
            &Style::default(),
        );
    }
}

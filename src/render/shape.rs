use glam::Vec2;

use super::color::{Rgb, Rgba};

/// A closed region to fill.
#[derive(Debug, Clone, Copy)]
pub enum Shape<'a> {
    Circle { center: Vec2, radius: f32 },
    /// Circular sector from `start` to `end` radians, swept counter-clockwise.
    Arc {
        center: Vec2,
        radius: f32,
        start: f32,
        end: f32,
    },
    Rect { origin: Vec2, size: Vec2 },
    Polygon(&'a [Vec2]),
}

/// An open or closed outline to stroke.
#[derive(Debug, Clone, Copy)]
pub enum Path<'a> {
    Polyline { points: &'a [Vec2], closed: bool },
    Bezier {
        from: Vec2,
        c1: Vec2,
        c2: Vec2,
        to: Vec2,
    },
    Circle { center: Vec2, radius: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fill {
    Solid(Rgba),
    Linear {
        from: Vec2,
        to: Vec2,
        start: Rgba,
        end: Rgba,
    },
    Radial {
        center: Vec2,
        inner: f32,
        outer: f32,
        start: Rgba,
        end: Rgba,
    },
}

impl From<Rgb> for Fill {
    fn from(rgb: Rgb) -> Self {
        Fill::Solid(rgb.into())
    }
}

impl From<Rgba> for Fill {
    fn from(rgba: Rgba) -> Self {
        Fill::Solid(rgba)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Rgba,
    pub width: f32,
}

impl Stroke {
    pub fn new(color: impl Into<Rgba>, width: f32) -> Self {
        Self {
            color: color.into(),
            width,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Blend {
    #[default]
    Normal,
    /// Colors add up where shapes overlap (`lighter` in Canvas 2D).
    Additive,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    pub blur: f32,
    pub color: Rgb,
}

/// Translate, then rotate by `rotation` radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translate: Vec2,
    pub rotation: f32,
}

/// Per-draw state, restored after every call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub alpha: f32,
    pub blend: Blend,
    pub shadow: Option<Shadow>,
    pub transform: Option<Transform>,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            blend: Blend::Normal,
            shadow: None,
            transform: None,
        }
    }
}

impl Style {
    pub fn alpha(alpha: f32) -> Self {
        Self {
            alpha,
            ..Self::default()
        }
    }

    pub fn glow(mut self, blur: f32, color: Rgb) -> Self {
        self.shadow = Some(Shadow { blur, color });
        self
    }

    pub fn additive(mut self) -> Self {
        self.blend = Blend::Additive;
        self
    }

    pub fn at(mut self, translate: Vec2, rotation: f32) -> Self {
        self.transform = Some(Transform {
            translate,
            rotation,
        });
        self
    }
}

use std::f32::consts::TAU;

use glam::Vec2;

use super::{Cadence, Effect, World, between, hexes, pick};
use crate::engine::particle::polar;
use crate::render::{Path, Rgb, Stroke, Style, Surface};

const INTERVAL_MS: f64 = 1500.0;
const ALPHA_DECAY: f32 = 0.002;
const RINGS: [f32; 4] = [0.8, 0.6, 0.4, 0.2];

struct Vertex {
    angle: f32,
    offset: f32,
}

struct Pattern {
    center: Vec2,
    vertices: Vec<Vertex>,
    radius: f32,
    expansion: f32,
    rotation: f32,
    spin: f32,
    color: Rgb,
    alpha: f32,
}

impl Pattern {
    /// Outline at `scale` of the current radius, with every vertex turned
    /// by `twist` radians, in the pattern's own frame.
    fn outline(&self, scale: f32, twist: f32) -> Vec<Vec2> {
        self.vertices
            .iter()
            .map(|v| polar(v.angle + twist) * (self.radius * v.offset * scale))
            .collect()
    }
}

/// Slowly turning polygons that grow outwards with nested echoes.
pub struct Kaleidoscope {
    palette: [Rgb; 8],
    patterns: Vec<Pattern>,
    launches: Cadence,
}

impl Default for Kaleidoscope {
    fn default() -> Self {
        Self {
            palette: hexes([
                0xFF1493, 0x00FFFF, 0xFFD700, 0xFF4500, 0x7B68EE, 0x00FA9A, 0xFF69B4, 0x4169E1,
            ]),
            patterns: Vec::new(),
            launches: Cadence::default(),
        }
    }
}

impl Kaleidoscope {
    fn spawn(&mut self, world: &mut World<'_>) {
        let size = world.size;
        let segments = world.rng.usize(6..=9);
        let rng = &mut *world.rng;
        let vertices = (0..segments)
            .map(|i| Vertex {
                angle: i as f32 * TAU / segments as f32,
                offset: between(rng, 0.7, 1.0),
            })
            .collect();
        let spin = between(world.rng, 0.01, 0.03);
        self.patterns.push(Pattern {
            center: Vec2::new(
                between(world.rng, size.x * 0.1, size.x * 0.9),
                between(world.rng, size.y * 0.2, size.y * 0.8),
            ),
            vertices,
            radius: 0.0,
            expansion: between(world.rng, 0.5, 1.0),
            rotation: 0.0,
            spin: if world.rng.bool() { spin } else { -spin },
            color: pick(world.rng, &self.palette),
            alpha: 1.0,
        });
    }
}

impl Effect for Kaleidoscope {
    fn marker(&self) -> &'static str {
        "kaleidoscope-canvas"
    }

    fn begin(&mut self, now: f64) {
        self.launches.reset(now);
    }

    fn step(&mut self, world: &mut World<'_>) {
        if self.launches.due(world.now, || INTERVAL_MS) {
            self.spawn(world);
        }
        for pattern in &mut self.patterns {
            pattern.rotation += pattern.spin;
            pattern.radius += pattern.expansion;
            pattern.alpha -= ALPHA_DECAY;
        }
        self.patterns.retain(|p| p.alpha > 0.0);
    }

    fn draw(&self, surface: &mut dyn Surface) {
        for pattern in &self.patterns {
            let style = Style::alpha(pattern.alpha).at(pattern.center, pattern.rotation);
            let outer = pattern.outline(1.0, 0.0);
            surface.stroke(
                &Path::Polyline {
                    points: &outer,
                    closed: true,
                },
                &Stroke::new(pattern.color, 3.0),
                &style,
            );
            for scale in RINGS {
                let ring = pattern.outline(scale, pattern.rotation * (1.0 - scale));
                surface.stroke(
                    &Path::Polyline {
                        points: &ring,
                        closed: true,
                    },
                    &Stroke::new(pattern.color, 2.0),
                    &style,
                );
            }
        }
    }

    fn clear(&mut self) {
        self.patterns.clear();
    }

    fn population(&self) -> usize {
        self.patterns.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::testing;
    use crate::platform::headless::{DrawOp, PathKind};

    #[test]
    fn test_pattern_grows_and_fades() {
        let mut kaleidoscope = Kaleidoscope::default();
        let mut rng = fastrand::Rng::with_seed(12);
        let mut world = World {
            now: 0.0,
            size: testing::SIZE,
            rng: &mut rng,
        };
        kaleidoscope.step(&mut world);
        let pattern = &kaleidoscope.patterns[0];
        assert!((6..=9).contains(&pattern.vertices.len()));
        assert!(pattern.radius > 0.0);
        assert!((pattern.alpha - (1.0 - ALPHA_DECAY)).abs() < 1e-6);
        assert!((0.01..=0.03).contains(&pattern.spin.abs()));
    }

    #[test]
    fn test_lives_five_hundred_frames() {
        let mut kaleidoscope = Kaleidoscope::default();
        let mut rng = fastrand::Rng::with_seed(12);
        let mut world = World {
            now: 0.0,
            size: testing::SIZE,
            rng: &mut rng,
        };
        kaleidoscope.spawn(&mut world);
        kaleidoscope.launches.reset(f64::MAX);
        for _ in 0..490 {
            kaleidoscope.step(&mut world);
        }
        assert_eq!(kaleidoscope.population(), 1);
        for _ in 0..20 {
            kaleidoscope.step(&mut world);
        }
        assert_eq!(kaleidoscope.population(), 0);
    }

    #[test]
    fn test_draws_outline_and_four_rings() {
        let mut kaleidoscope = Kaleidoscope::default();
        let ops = testing::run(&mut kaleidoscope, 1, 3);
        let segments = kaleidoscope.patterns[0].vertices.len();
        assert_eq!(ops.len(), 1 + RINGS.len());
        assert!(ops.iter().all(|op| matches!(
            op,
            DrawOp::Stroke { path: PathKind::Polyline(n), .. } if *n == segments
        )));
    }
}

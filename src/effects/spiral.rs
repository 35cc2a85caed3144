use std::f32::consts::TAU;

use glam::Vec2;

use super::{Cadence, Effect, World, between, hexes, jitter, pick};
use crate::engine::particle::polar;
use crate::render::{Rgb, Shape, Style, Surface};

const INTERVAL_MS: f64 = 2000.0;
const ARMS: usize = 30;
const SLOWDOWN: f32 = 0.98;

struct Star {
    pos: Vec2,
    heading: Vec2,
    speed: f32,
    radius: f32,
    rotation: f32,
    spin: f32,
    color: Rgb,
    life: f32,
    initial_life: f32,
}

impl Star {
    fn alpha(&self) -> f32 {
        self.life / self.initial_life
    }

    /// Pentagon around the origin, in the star's own frame.
    fn outline(&self) -> [Vec2; 5] {
        std::array::from_fn(|i| polar(i as f32 * TAU / 5.0) * self.radius)
    }
}

/// Rings of spinning stars thrown out on evenly spaced headings.
pub struct Spiral {
    palette: [Rgb; 10],
    stars: Vec<Star>,
    launches: Cadence,
}

impl Default for Spiral {
    fn default() -> Self {
        Self {
            palette: hexes([
                0xFF69B4, 0x4B0082, 0x00FF7F, 0xFF4500, 0x1E90FF, 0xFFD700, 0xFF1493, 0x00CED1,
                0xFF8C00, 0x32CD32,
            ]),
            stars: Vec::new(),
            launches: Cadence::default(),
        }
    }
}

impl Spiral {
    fn burst(&mut self, world: &mut World<'_>) {
        let size = world.size;
        let center = Vec2::new(
            between(world.rng, size.x * 0.1, size.x * 0.9),
            between(world.rng, size.y * 0.2, size.y * 0.8),
        );
        let color = pick(world.rng, &self.palette);
        for i in 0..ARMS {
            let life = between(world.rng, 50.0, 150.0);
            self.stars.push(Star {
                pos: center,
                heading: polar(i as f32 * TAU / ARMS as f32),
                speed: between(world.rng, 3.0, 5.0),
                radius: between(world.rng, 1.0, 3.0),
                rotation: 0.0,
                spin: jitter(world.rng, 0.1),
                color,
                life,
                initial_life: life,
            });
        }
    }
}

impl Effect for Spiral {
    fn marker(&self) -> &'static str {
        "spiral-firework-canvas"
    }

    fn trail_fade(&self) -> f32 {
        0.15
    }

    fn begin(&mut self, now: f64) {
        self.launches.reset(now);
    }

    fn step(&mut self, world: &mut World<'_>) {
        if self.launches.due(world.now, || INTERVAL_MS) {
            self.burst(world);
        }
        for star in &mut self.stars {
            star.pos += star.heading * star.speed;
            star.rotation += star.spin;
            star.speed *= SLOWDOWN;
            star.life -= 1.0;
        }
        let visible = world.visible();
        self.stars
            .retain(|s| s.life > 0.0 && visible.contains(s.pos));
    }

    fn draw(&self, surface: &mut dyn Surface) {
        for star in &self.stars {
            let outline = star.outline();
            surface.fill(
                &Shape::Polygon(&outline),
                &star.color.into(),
                &Style::alpha(star.alpha()).at(star.pos, star.rotation),
            );
        }
    }

    fn clear(&mut self) {
        self.stars.clear();
    }

    fn population(&self) -> usize {
        self.stars.len()
    }
}

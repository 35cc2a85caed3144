use std::f32::consts::TAU;

use glam::Vec2;

use super::{Cadence, Effect, World, between, hexes, jitter, pick};
use crate::engine::particle::{Particle, Rocket, polar};
use crate::render::{Path, Rgb, Shape, Stroke, Style, Surface};

const ROCKET_SPEED: f32 = 8.0;
const ROCKET_TRAIL: usize = 5;
const BURST_SIZE: usize = 60;
const FRICTION: f32 = 0.98;
const GRAVITY: f32 = 0.15;

pub(super) const PALETTE: [u32; 12] = [
    0xff0000, 0xffa500, 0xffff00, 0x00ff00, 0x00ffff, 0x0000ff, 0xff00ff, 0xff1493, 0xFFD700,
    0x7FFFD4, 0xFF69B4, 0x32CD32,
];

struct Ember {
    core: Particle,
    decay: f32,
}

/// Rockets with short white tails that burst into glowing embers.
pub struct CometTrail {
    palette: [Rgb; 12],
    rockets: Vec<Rocket>,
    embers: Vec<Ember>,
    launches: Cadence,
}

impl Default for CometTrail {
    fn default() -> Self {
        Self {
            palette: hexes(PALETTE),
            rockets: Vec::new(),
            embers: Vec::new(),
            launches: Cadence::default(),
        }
    }
}

impl CometTrail {
    fn launch(&mut self, world: &mut World<'_>) {
        let size = world.size;
        let start = Vec2::new(world.rng.f32() * size.x, size.y);
        let target = Vec2::new(
            start.x + jitter(world.rng, 100.0),
            between(world.rng, size.y * 0.2, size.y * 0.5),
        );
        let color = pick(world.rng, &self.palette);
        self.rockets
            .push(Rocket::new(start, target, ROCKET_SPEED, color, ROCKET_TRAIL));
    }

    fn explode(&mut self, at: Vec2, color: Rgb, world: &mut World<'_>) {
        for _ in 0..BURST_SIZE {
            let vel = polar(world.rng.f32() * TAU) * between(world.rng, 4.0, 12.0);
            self.embers.push(Ember {
                core: Particle::new(at, vel, color),
                decay: between(world.rng, 0.02, 0.04),
            });
        }
    }
}

impl Effect for CometTrail {
    fn marker(&self) -> &'static str {
        "comet-trail-canvas"
    }

    fn trail_fade(&self) -> f32 {
        0.2
    }

    fn begin(&mut self, now: f64) {
        self.launches.reset(now);
    }

    fn step(&mut self, world: &mut World<'_>) {
        let rng = &mut *world.rng;
        if self
            .launches
            .due(world.now, || between(rng, 300.0, 500.0) as f64)
        {
            self.launch(world);
        }

        let mut bursts = Vec::new();
        self.rockets.retain_mut(|rocket| {
            if rocket.home(5.0) {
                bursts.push((rocket.pos, rocket.color));
                false
            } else {
                true
            }
        });
        for (at, color) in bursts {
            self.explode(at, color, world);
        }

        for ember in &mut self.embers {
            ember.core.integrate(GRAVITY, FRICTION);
            ember.core.alpha -= ember.decay;
        }
        let visible = world.visible();
        self.embers
            .retain(|e| e.core.is_visible() && visible.contains(e.core.pos));
    }

    fn draw(&self, surface: &mut dyn Surface) {
        for rocket in &self.rockets {
            if !rocket.trail.is_empty() {
                surface.stroke(
                    &Path::Polyline {
                        points: rocket.trail.points(),
                        closed: false,
                    },
                    &Stroke::new(Rgb::WHITE, 2.0),
                    &Style::default(),
                );
            }
            surface.fill(
                &Shape::Circle {
                    center: rocket.pos,
                    radius: 2.0,
                },
                &Rgb::WHITE.into(),
                &Style::default(),
            );
        }
        for ember in &self.embers {
            let p = &ember.core;
            surface.fill(
                &Shape::Circle {
                    center: p.pos,
                    radius: 2.0,
                },
                &p.color.into(),
                &Style::alpha(p.alpha).glow(4.0, p.color),
            );
        }
    }

    fn clear(&mut self) {
        self.rockets.clear();
        self.embers.clear();
    }

    fn population(&self) -> usize {
        self.rockets.len() + self.embers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::testing;
    use crate::platform::headless::FRAME_MS;

    #[test]
    fn test_launches_on_interval() {
        let mut comet = CometTrail::default();
        let mut rng = fastrand::Rng::with_seed(5);
        comet.begin(0.0);
        let mut launched = 0;
        for i in 0..63 {
            let before = comet.rockets.len();
            let mut world = World {
                now: i as f64 * FRAME_MS,
                size: testing::SIZE,
                rng: &mut rng,
            };
            comet.step(&mut world);
            if comet.rockets.len() > before {
                launched += 1;
            }
        }
        // 1000 ms at one launch every 300-500 ms.
        assert!((2..=4).contains(&launched), "launched {launched}");
    }

    #[test]
    fn test_rocket_bursts_into_sixty_embers() {
        let mut comet = CometTrail::default();
        let mut rng = fastrand::Rng::with_seed(5);
        let mut world = World {
            now: 0.0,
            size: testing::SIZE,
            rng: &mut rng,
        };
        comet.explode(Vec2::new(10.0, 10.0), Rgb::WHITE, &mut world);
        assert_eq!(comet.embers.len(), BURST_SIZE);
        assert!(comet.embers.iter().all(|e| (0.02..=0.04).contains(&e.decay)));
    }

    #[test]
    fn test_rockets_draw_tail_and_head() {
        let mut comet = CometTrail::default();
        let ops = testing::run(&mut comet, 3, 1);
        assert_eq!(comet.rockets.len(), 1);
        assert_eq!(testing::strokes(&ops), 1);
        assert_eq!(testing::fills(&ops), 1);
    }
}

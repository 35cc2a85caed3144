use glam::Vec2;

use super::{Effect, World, between, hexes, jitter, pick};
use crate::engine::particle::Particle;
use crate::render::{Bounds, Rgb, Shape, Style, Surface};

const BURST_CHANCE: f32 = 0.05;
const BURST_SIZE: usize = 50;
const GRAVITY: f32 = 0.05;
const ALPHA_DECAY: f32 = 0.005;
const RADIUS: f32 = 2.0;

struct Spark {
    core: Particle,
    life: f32,
}

/// Random bursts of 50 sparks that fall and fade.
pub struct Classic {
    palette: [Rgb; 10],
    sparks: Vec<Spark>,
}

impl Default for Classic {
    fn default() -> Self {
        Self {
            palette: hexes([
                0xFF0000, 0x00FF00, 0x0000FF, 0xFFFF00, 0xFF00FF, 0x00FFFF, 0xFFA500, 0xFFD700,
                0xFF1493, 0x7FFFD4,
            ]),
            sparks: Vec::new(),
        }
    }
}

impl Classic {
    fn burst(&mut self, world: &mut World<'_>) {
        let origin = Vec2::new(
            world.rng.f32() * world.size.x,
            between(world.rng, 100.0, (world.size.y - 100.0).max(100.0)),
        );
        let color = pick(world.rng, &self.palette);
        for _ in 0..BURST_SIZE {
            let vel = Vec2::new(jitter(world.rng, 4.0), jitter(world.rng, 4.0));
            self.sparks.push(Spark {
                core: Particle::new(origin, vel, color),
                life: between(world.rng, 50.0, 200.0),
            });
        }
    }

    fn advance(&mut self, visible: Bounds) {
        for spark in &mut self.sparks {
            spark.core.integrate(GRAVITY, 1.0);
            spark.core.alpha -= ALPHA_DECAY;
            spark.life -= 1.0;
        }
        self.sparks
            .retain(|s| s.life > 0.0 && visible.contains(s.core.pos));
    }
}

impl Effect for Classic {
    fn marker(&self) -> &'static str {
        "classic-firework-canvas"
    }

    fn step(&mut self, world: &mut World<'_>) {
        if world.rng.f32() < BURST_CHANCE {
            self.burst(world);
        }
        self.advance(world.visible());
    }

    fn draw(&self, surface: &mut dyn Surface) {
        for spark in &self.sparks {
            let p = &spark.core;
            surface.fill(
                &Shape::Circle {
                    center: p.pos,
                    radius: RADIUS,
                },
                &p.color.into(),
                &Style::alpha(p.alpha.max(0.0)),
            );
        }
    }

    fn clear(&mut self) {
        self.sparks.clear();
    }

    fn population(&self) -> usize {
        self.sparks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::testing;
    use fastrand::Rng;

    #[test]
    fn test_burst_is_fifty_sparks_inside_band() {
        let mut classic = Classic::default();
        let mut rng = Rng::with_seed(3);
        let mut world = World {
            now: 0.0,
            size: testing::SIZE,
            rng: &mut rng,
        };
        classic.burst(&mut world);
        assert_eq!(classic.population(), 50);
        let y = classic.sparks[0].core.pos.y;
        assert!((100.0..=testing::SIZE.y - 100.0).contains(&y));
    }

    #[test]
    fn test_sparks_expire_by_lifetime() {
        let mut classic = Classic::default();
        let mut rng = Rng::with_seed(3);
        let mut world = World {
            now: 0.0,
            size: testing::SIZE,
            rng: &mut rng,
        };
        classic.burst(&mut world);
        let visible = world.visible();
        classic.sparks[0].life = 1.0;
        classic.advance(visible);
        assert_eq!(classic.population(), 49);
        for spark in &mut classic.sparks {
            spark.life = 1.0;
        }
        classic.advance(visible);
        assert_eq!(classic.population(), 0);
    }

    #[test]
    fn test_sparks_leaving_the_surface_are_culled() {
        let mut classic = Classic::default();
        let mut rng = Rng::with_seed(3);
        let mut world = World {
            now: 0.0,
            size: testing::SIZE,
            rng: &mut rng,
        };
        classic.burst(&mut world);
        let visible = world.visible();
        classic.sparks[0].core.pos = Vec2::new(testing::SIZE.x + 200.0, 300.0);
        classic.sparks[1].core.pos = Vec2::new(300.0, -200.0);
        classic.sparks[2].core.pos = Vec2::new(-20.0, 300.0);
        classic.advance(visible);
        assert_eq!(classic.population(), 48);
    }

    #[test]
    fn test_draws_one_circle_per_spark() {
        let mut classic = Classic::default();
        let ops = testing::run(&mut classic, 120, 11);
        assert_eq!(testing::fills(&ops), classic.population());
    }
}

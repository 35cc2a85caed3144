use std::f32::consts::TAU;

use glam::Vec2;

use super::{Cadence, Effect, World, between, hexes, pick};
use crate::engine::particle::{Trail, polar};
use crate::render::{Path, Rgb, Shape, Stroke, Style, Surface};

const ROCKET_SPEED: f32 = 8.0;
const ROCKET_TRAIL: usize = 5;
const FUSE_MS: f64 = 2000.0;
const BURST_SIZE: usize = 60;
const GRAVITY: f32 = 0.15;
const FRICTION: f32 = 0.98;
const MAX_AGE_MS: f64 = 3000.0;

/// Flies in a straight line; explodes near its target or when the fuse runs out.
struct Shell {
    pos: Vec2,
    target: Vec2,
    heading: Vec2,
    trail: Trail,
    born: f64,
}

/// Moves along a fixed heading at a decaying speed, with gravity added on top.
struct Glint {
    pos: Vec2,
    heading: Vec2,
    speed: f32,
    color: Rgb,
    alpha: f32,
    decay: f32,
    born: f64,
}

/// Shells with bright trails and haloed sparks.
pub struct Glow {
    palette: [Rgb; 12],
    shells: Vec<Shell>,
    glints: Vec<Glint>,
    launches: Cadence,
}

impl Default for Glow {
    fn default() -> Self {
        Self {
            palette: hexes(super::comet::PALETTE),
            shells: Vec::new(),
            glints: Vec::new(),
            launches: Cadence::default(),
        }
    }
}

impl Glow {
    fn launch(&mut self, world: &mut World<'_>) {
        let size = world.size;
        let pos = Vec2::new(world.rng.f32() * size.x, size.y);
        let target = Vec2::new(
            world.rng.f32() * size.x,
            between(world.rng, size.y * 0.2, size.y * 0.5),
        );
        self.shells.push(Shell {
            pos,
            target,
            heading: (target - pos).normalize_or_zero(),
            trail: Trail::new(ROCKET_TRAIL),
            born: world.now,
        });
    }

    fn burst(&mut self, at: Vec2, world: &mut World<'_>) {
        let color = pick(world.rng, &self.palette);
        for _ in 0..BURST_SIZE {
            self.glints.push(Glint {
                pos: at,
                heading: polar(world.rng.f32() * TAU),
                speed: between(world.rng, 4.0, 12.0),
                color,
                alpha: 1.0,
                decay: between(world.rng, 0.02, 0.04),
                born: world.now,
            });
        }
    }
}

impl Effect for Glow {
    fn marker(&self) -> &'static str {
        "glow-firework-canvas"
    }

    fn begin(&mut self, now: f64) {
        self.launches.reset(now);
    }

    fn step(&mut self, world: &mut World<'_>) {
        let now = world.now;
        let rng = &mut *world.rng;
        if self.launches.due(now, || between(rng, 300.0, 500.0) as f64) {
            self.launch(world);
        }

        let mut bursts = Vec::new();
        self.shells.retain_mut(|shell| {
            shell.pos += shell.heading * ROCKET_SPEED;
            shell.trail.push(shell.pos);
            let arrived = shell.pos.distance(shell.target) < 5.0;
            if arrived || now - shell.born > FUSE_MS {
                bursts.push(shell.pos);
                false
            } else {
                true
            }
        });
        for at in bursts {
            self.burst(at, world);
        }

        for glint in &mut self.glints {
            glint.pos += glint.heading * glint.speed + Vec2::new(0.0, GRAVITY);
            glint.speed *= FRICTION;
            glint.alpha -= glint.decay;
        }
        let visible = world.visible();
        self.glints.retain(|g| {
            g.alpha > 0.0 && now - g.born < MAX_AGE_MS && visible.contains(g.pos)
        });
    }

    fn draw(&self, surface: &mut dyn Surface) {
        for shell in &self.shells {
            surface.stroke(
                &Path::Polyline {
                    points: shell.trail.points(),
                    closed: false,
                },
                &Stroke::new(Rgb::WHITE, 3.0),
                &Style::default(),
            );
        }
        for glint in &self.glints {
            surface.fill(
                &Shape::Circle {
                    center: glint.pos,
                    radius: 2.0,
                },
                &glint.color.with_alpha(glint.alpha).into(),
                &Style::default().glow(5.0, glint.color),
            );
        }
    }

    fn clear(&mut self) {
        self.shells.clear();
        self.glints.clear();
    }

    fn population(&self) -> usize {
        self.shells.len() + self.glints.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::testing;
    use crate::platform::headless::FRAME_MS;

    fn world(rng: &mut fastrand::Rng, now: f64) -> World<'_> {
        World {
            now,
            size: testing::SIZE,
            rng,
        }
    }

    #[test]
    fn test_fuse_explodes_shell_that_never_arrives() {
        let mut glow = Glow::default();
        let mut rng = fastrand::Rng::with_seed(2);
        glow.launches.reset(f64::MAX);
        glow.shells.push(Shell {
            pos: Vec2::new(0.0, 0.0),
            target: Vec2::new(-1.0e6, 0.0),
            heading: Vec2::new(-1.0, 0.0),
            trail: Trail::new(ROCKET_TRAIL),
            born: 0.0,
        });
        glow.step(&mut world(&mut rng, FRAME_MS));
        assert_eq!(glow.shells.len(), 1);
        glow.step(&mut world(&mut rng, FUSE_MS + FRAME_MS));
        assert!(glow.shells.is_empty());
        assert_eq!(glow.glints.len(), BURST_SIZE);
    }

    #[test]
    fn test_glints_cull_at_three_seconds() {
        let mut glow = Glow::default();
        let mut rng = fastrand::Rng::with_seed(2);
        glow.launches.reset(f64::MAX);
        glow.burst(Vec2::ZERO, &mut world(&mut rng, 0.0));
        for glint in &mut glow.glints {
            glint.decay = 0.0;
        }
        glow.step(&mut world(&mut rng, 2900.0));
        assert_eq!(glow.glints.len(), BURST_SIZE);
        glow.step(&mut world(&mut rng, 3000.0));
        assert!(glow.glints.is_empty());
    }

    #[test]
    fn test_draws_trails_and_glints() {
        let mut glow = Glow::default();
        let ops = testing::run(&mut glow, 2, 4);
        assert_eq!(testing::strokes(&ops), glow.shells.len());
        assert_eq!(testing::fills(&ops), glow.glints.len());
    }
}

use std::f32::consts::TAU;

use glam::Vec2;

use super::{Effect, World, between, jitter, pick};
use crate::engine::particle::{Rocket, Trail, polar};
use crate::render::{Fill, Path, Rgb, Rgba, Shape, Stroke, Style, Surface};

const ROCKET_CHANCE: f32 = 0.1;
const MAX_ROCKETS: usize = 3;
const PRIMARY_BURST: usize = 1000;
const SECONDARY_CHANCE: f32 = 0.02;
const TRAIL: usize = 20;
const GRAVITY: f32 = 0.15;
const GLOW_INTENSITY: f32 = 0.8;
const SMOKE_CHANCE: f32 = 0.3;
/// Upper bound on live particles; bursts are truncated to fit.
const PARTICLE_BUDGET: usize = 6000;

#[derive(Clone, Copy)]
struct Colors {
    primary: Rgb,
    secondary: Rgb,
    glow: Rgb,
}

const PALETTE: [[u32; 3]; 6] = [
    [0xFF1493, 0xFF69B4, 0xFF99CC],
    [0x4169E1, 0x1E90FF, 0x87CEEB],
    [0xFFD700, 0xFFA500, 0xFFFF00],
    [0xFF4500, 0xFF6347, 0xFF7F50],
    [0x7B68EE, 0x9370DB, 0xE6E6FA],
    [0x00FF00, 0x32CD32, 0x98FB98],
];

#[derive(Clone, Copy, PartialEq, Eq)]
enum Tier {
    Primary,
    Secondary,
}

struct Puff {
    pos: Vec2,
    size: f32,
    alpha: f32,
}

struct Shell {
    rocket: Rocket,
    colors: Colors,
    wobble: f32,
    smoke: Vec<Puff>,
}

struct Fragment {
    pos: Vec2,
    vel: Vec2,
    colors: Colors,
    tier: Tier,
    trail: Trail,
    alpha: f32,
    decay: f32,
    exploded: bool,
}

impl Fragment {
    fn size(&self) -> f32 {
        match self.tier {
            Tier::Primary => 3.0,
            Tier::Secondary => 2.0,
        }
    }
}

struct Shockwave {
    center: Vec2,
    radius: f32,
    color: Rgb,
    alpha: f32,
}

/// Heavy multi-stage bursts with trails, shockwaves and secondary explosions.
pub struct Megabombastic {
    palette: [Colors; 6],
    shells: Vec<Shell>,
    fragments: Vec<Fragment>,
    shockwaves: Vec<Shockwave>,
}

impl Default for Megabombastic {
    fn default() -> Self {
        Self {
            palette: PALETTE.map(|[primary, secondary, glow]| Colors {
                primary: Rgb::hex(primary),
                secondary: Rgb::hex(secondary),
                glow: Rgb::hex(glow),
            }),
            shells: Vec::new(),
            fragments: Vec::new(),
            shockwaves: Vec::new(),
        }
    }
}

impl Megabombastic {
    fn launch(&mut self, world: &mut World<'_>) {
        let size = world.size;
        let colors = pick(world.rng, &self.palette);
        let start = Vec2::new(world.rng.f32() * size.x, size.y);
        let target = Vec2::new(
            world.rng.f32() * size.x,
            between(world.rng, size.y * 0.2, size.y * 0.5),
        );
        let speed = between(world.rng, 15.0, 20.0);
        self.shells.push(Shell {
            rocket: Rocket::new(start, target, speed, colors.primary, TRAIL),
            colors,
            wobble: jitter(world.rng, 1.0),
            smoke: Vec::new(),
        });
    }

    /// Spawn up to `count` fragments, less if the budget is nearly spent.
    fn burst(
        &mut self,
        at: Vec2,
        colors: Colors,
        tier: Tier,
        count: usize,
        rng: &mut fastrand::Rng,
    ) {
        let room = PARTICLE_BUDGET.saturating_sub(self.fragments.len());
        let (lo, hi) = match tier {
            Tier::Primary => (6.0, 14.0),
            Tier::Secondary => (4.0, 10.0),
        };
        for _ in 0..count.min(room) {
            self.fragments.push(Fragment {
                pos: at,
                vel: polar(rng.f32() * TAU) * between(rng, lo, hi),
                colors,
                tier,
                trail: Trail::new(TRAIL),
                alpha: 1.0,
                decay: between(rng, 0.02, 0.04),
                exploded: false,
            });
        }
        self.shockwaves.push(Shockwave {
            center: at,
            radius: 1.0,
            color: colors.glow,
            alpha: 0.5,
        });
    }
}

impl Effect for Megabombastic {
    fn marker(&self) -> &'static str {
        "megabombastic-canvas"
    }

    fn step(&mut self, world: &mut World<'_>) {
        if world.rng.f32() < ROCKET_CHANCE && self.shells.len() < MAX_ROCKETS {
            self.launch(world);
        }

        let sway = (world.now * 0.01).sin() as f32;
        let rng = &mut *world.rng;
        let mut bursts = Vec::new();
        self.shells.retain_mut(|shell| {
            if shell.rocket.home(5.0) {
                bursts.push((shell.rocket.pos, shell.colors));
                return false;
            }
            shell.rocket.pos.x += sway * shell.wobble;
            if rng.f32() < SMOKE_CHANCE {
                shell.smoke.push(Puff {
                    pos: shell.rocket.pos,
                    size: between(rng, 1.0, 3.0),
                    alpha: 0.5,
                });
            }
            for puff in &mut shell.smoke {
                puff.pos.y -= 0.5;
                puff.alpha *= 0.95;
            }
            shell.smoke.retain(|p| p.alpha > 0.01);
            true
        });
        for (at, colors) in bursts {
            self.burst(at, colors, Tier::Primary, PRIMARY_BURST, rng);
        }

        let mut secondary = Vec::new();
        for fragment in &mut self.fragments {
            fragment.pos += fragment.vel;
            fragment.vel.y += GRAVITY;
            fragment.trail.push(fragment.pos);
            if fragment.tier == Tier::Primary
                && !fragment.exploded
                && rng.f32() < SECONDARY_CHANCE
            {
                fragment.exploded = true;
                secondary.push((fragment.pos, fragment.colors));
            }
            fragment.alpha -= fragment.decay;
        }
        self.fragments.retain(|f| f.alpha > 0.0);
        for (at, colors) in secondary {
            let count = rng.usize(250..750);
            self.burst(at, colors, Tier::Secondary, count, rng);
        }

        for wave in &mut self.shockwaves {
            wave.radius += 5.0;
            wave.alpha *= 0.95;
        }
        self.shockwaves.retain(|w| w.alpha > 0.01);
    }

    fn draw(&self, surface: &mut dyn Surface) {
        for shell in &self.shells {
            if shell.rocket.trail.len() > 1 {
                surface.stroke(
                    &Path::Polyline {
                        points: shell.rocket.trail.points(),
                        closed: false,
                    },
                    &Stroke::new(shell.colors.primary, 4.0),
                    &Style::default().glow(20.0, shell.colors.glow),
                );
            }
            for puff in &shell.smoke {
                surface.fill(
                    &Shape::Circle {
                        center: puff.pos,
                        radius: puff.size,
                    },
                    &Rgb::hex(0xC8C8C8).with_alpha(puff.alpha).into(),
                    &Style::default(),
                );
            }
        }
        for fragment in &self.fragments {
            let size = fragment.size();
            if fragment.trail.len() > 1 {
                surface.stroke(
                    &Path::Polyline {
                        points: fragment.trail.points(),
                        closed: false,
                    },
                    &Stroke::new(fragment.colors.secondary, size),
                    &Style::default().glow(15.0, fragment.colors.glow),
                );
            }
            let radius = size * 4.0;
            surface.fill(
                &Shape::Rect {
                    origin: fragment.pos - Vec2::splat(radius),
                    size: Vec2::splat(radius * 2.0),
                },
                &Fill::Radial {
                    center: fragment.pos,
                    inner: 0.0,
                    outer: radius,
                    start: fragment
                        .colors
                        .glow
                        .with_alpha(fragment.alpha.max(0.0) * GLOW_INTENSITY),
                    end: Rgba::TRANSPARENT,
                },
                &Style::default(),
            );
        }
        for wave in &self.shockwaves {
            surface.stroke(
                &Path::Circle {
                    center: wave.center,
                    radius: wave.radius,
                },
                &Stroke::new(wave.color.with_alpha(wave.alpha), 2.0),
                &Style::default(),
            );
        }
    }

    fn clear(&mut self) {
        self.shells.clear();
        self.fragments.clear();
        self.shockwaves.clear();
    }

    fn population(&self) -> usize {
        self.shells.len() + self.fragments.len()
    }
}

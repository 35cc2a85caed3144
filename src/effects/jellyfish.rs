use std::f32::consts::{PI, TAU};

use glam::Vec2;

use super::{Cadence, Effect, World, between, jitter, pick};
use crate::render::{Fill, Path, Rgb, Shape, Stroke, Style, Surface};

const MOTE_CHANCE: f32 = 0.3;
const DRIFT: f32 = 0.02;

#[derive(Clone, Copy)]
struct Colors {
    body: Rgb,
    tendrils: [Rgb; 3],
}

const PALETTE: [(u32, [u32; 3]); 5] = [
    (0xFF69B4, [0xFF1493, 0xFFB6C1, 0xFF69B4]),
    (0x4169E1, [0x1E90FF, 0x87CEEB, 0x4169E1]),
    (0x9932CC, [0xBA55D3, 0xDDA0DD, 0x9932CC]),
    (0x20B2AA, [0x48D1CC, 0x40E0D0, 0x20B2AA]),
    (0xFFD700, [0xFFA500, 0xFFFF00, 0xFFD700]),
];

struct Mote {
    pos: Vec2,
    vel: Vec2,
    size: f32,
    color: Rgb,
    alpha: f32,
    decay: f32,
}

struct Tendril {
    length: f32,
    phase: f32,
    speed: f32,
    motes: Vec<Mote>,
}

struct Jelly {
    pos: Vec2,
    size: f32,
    colors: Colors,
    phase: f32,
    speed: f32,
    wobble: f32,
    tendrils: Vec<Tendril>,
    pulse: f32,
    pulse_speed: f32,
    age: u32,
    max_age: u32,
}

impl Jelly {
    /// Start, two control points and end of tendril `index`.
    fn curve(&self, index: usize) -> [Vec2; 4] {
        let tendril = &self.tendrils[index];
        let spacing = PI / (self.tendrils.len().max(2) - 1) as f32;
        let angle = -PI + spacing * index as f32 + tendril.phase.sin() * self.wobble;
        let (sin, cos) = angle.sin_cos();
        let start = self.pos + Vec2::new(cos * self.size * 0.5, sin * self.size * 0.2);
        let len = tendril.length;
        [
            start,
            start + Vec2::new(cos * len * 0.5, len * 0.3),
            start + Vec2::new(cos * len * 0.8, len * 0.6),
            start + Vec2::new(cos * len, len),
        ]
    }

    fn bell_radius(&self) -> f32 {
        self.size * (1.0 + self.pulse.sin() * 0.1)
    }
}

fn bezier_point([p0, p1, p2, p3]: [Vec2; 4], t: f32) -> Vec2 {
    let u = 1.0 - t;
    p0 * u.powi(3) + p1 * (3.0 * u * u * t) + p2 * (3.0 * u * t * t) + p3 * t.powi(3)
}

/// Glowing jellyfish drifting up from below the screen.
pub struct Jellyfish {
    palette: [Colors; 5],
    jellies: Vec<Jelly>,
    launches: Cadence,
}

impl Default for Jellyfish {
    fn default() -> Self {
        Self {
            palette: PALETTE.map(|(body, tendrils)| Colors {
                body: Rgb::hex(body),
                tendrils: tendrils.map(Rgb::hex),
            }),
            jellies: Vec::new(),
            launches: Cadence::default(),
        }
    }
}

impl Jellyfish {
    fn spawn(&mut self, world: &mut World<'_>) {
        let size = between(world.rng, 40.0, 70.0);
        let count = world.rng.usize(8..=12);
        let rng = &mut *world.rng;
        let tendrils = (0..count)
            .map(|_| Tendril {
                length: size * between(rng, 1.5, 2.0),
                phase: rng.f32() * TAU,
                speed: between(rng, 0.02, 0.07),
                motes: Vec::new(),
            })
            .collect();
        self.jellies.push(Jelly {
            pos: Vec2::new(
                between(world.rng, world.size.x * 0.1, world.size.x * 0.9),
                world.size.y + 50.0,
            ),
            size,
            colors: pick(world.rng, &self.palette),
            phase: world.rng.f32() * TAU,
            speed: between(world.rng, 1.0, 3.0),
            wobble: between(world.rng, 0.5, 1.0),
            tendrils,
            pulse: 0.0,
            pulse_speed: between(world.rng, 0.01, 0.03),
            age: 0,
            max_age: world.rng.u32(300..500),
        });
    }
}

impl Effect for Jellyfish {
    fn marker(&self) -> &'static str {
        "jellyfish-canvas"
    }

    fn begin(&mut self, now: f64) {
        self.launches.reset(now);
    }

    fn step(&mut self, world: &mut World<'_>) {
        let now = world.now;
        let rng = &mut *world.rng;
        if self
            .launches
            .due(now, || between(rng, 1500.0, 2500.0) as f64)
        {
            self.spawn(world);
        }

        let rng = &mut *world.rng;
        self.jellies.retain_mut(|jelly| {
            jelly.age += 1;
            if jelly.age > jelly.max_age || jelly.pos.y < -100.0 {
                return false;
            }
            jelly.pos.y -= jelly.speed;
            jelly.pos.x += jelly.phase.sin() * jelly.wobble;
            jelly.phase += DRIFT;
            jelly.pulse += jelly.pulse_speed;

            for i in 0..jelly.tendrils.len() {
                if rng.f32() < MOTE_CHANCE {
                    let at = bezier_point(jelly.curve(i), rng.f32());
                    let color = pick(rng, &jelly.colors.tendrils);
                    jelly.tendrils[i].motes.push(Mote {
                        pos: at,
                        vel: Vec2::new(jitter(rng, 0.25), between(rng, -1.0, -0.5)),
                        size: between(rng, 1.0, 3.0),
                        color,
                        alpha: between(rng, 0.5, 1.0),
                        decay: between(rng, 0.01, 0.03),
                    });
                }
                let tendril = &mut jelly.tendrils[i];
                for mote in &mut tendril.motes {
                    mote.pos += mote.vel;
                    mote.alpha -= mote.decay;
                }
                tendril.motes.retain(|m| m.alpha > 0.0);
                tendril.phase += tendril.speed;
            }
            true
        });
    }

    fn draw(&self, surface: &mut dyn Surface) {
        for jelly in &self.jellies {
            let radius = jelly.bell_radius();
            let body = jelly.colors.body;
            let glow_center = jelly.pos - Vec2::new(0.0, radius * 0.3);
            surface.fill(
                &Shape::Arc {
                    center: jelly.pos,
                    radius,
                    start: 0.0,
                    end: PI,
                },
                &Fill::Radial {
                    center: glow_center,
                    inner: radius * 0.3,
                    outer: radius,
                    start: body.with_alpha(0.8),
                    end: body.with_alpha(0.2),
                },
                &Style::default().glow(15.0, body),
            );
            surface.fill(
                &Shape::Circle {
                    center: glow_center,
                    radius: radius * 0.6,
                },
                &body.with_alpha(0.2).into(),
                &Style::default(),
            );

            for (i, tendril) in jelly.tendrils.iter().enumerate() {
                let [from, c1, c2, to] = jelly.curve(i);
                let color = jelly.colors.tendrils[i % jelly.colors.tendrils.len()];
                surface.stroke(
                    &Path::Bezier { from, c1, c2, to },
                    &Stroke::new(color, 2.0),
                    &Style::default(),
                );
                for mote in &tendril.motes {
                    surface.fill(
                        &Shape::Circle {
                            center: mote.pos,
                            radius: mote.size,
                        },
                        &mote.color.with_alpha(mote.alpha).into(),
                        &Style::default(),
                    );
                }
            }
        }
    }

    fn clear(&mut self) {
        self.jellies.clear();
    }

    fn population(&self) -> usize {
        self.jellies
            .iter()
            .map(|j| 1 + j.tendrils.iter().map(|t| t.motes.len()).sum::<usize>())
            .sum()
    }
}

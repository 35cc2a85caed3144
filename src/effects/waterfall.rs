use glam::Vec2;

use super::{Cadence, Effect, World, between, jitter, pick};
use crate::render::{Rgb, Shape, Style, Surface};

const INTERVAL_MS: f64 = 800.0;
const GROWTH: f32 = 5.0;
const GRAVITY: f32 = 0.15;
const DROPLET_TTL: u32 = 50;

const PALETTE: [(u32, u32); 5] = [
    (0x00FFFF, 0x0000FF),
    (0xFF69B4, 0xFF1493),
    (0xFFD700, 0xFFA500),
    (0x7FFF00, 0x32CD32),
    (0xFF4500, 0x8B0000),
];

struct Droplet {
    pos: Vec2,
    base_x: f32,
    vel: Vec2,
    size: f32,
    phase: f32,
    phase_speed: f32,
    alpha: f32,
    age: u32,
}

struct Cascade {
    top: Vec2,
    width: f32,
    height: f32,
    max_height: f32,
    streams: usize,
    from: Rgb,
    to: Rgb,
    wind: f32,
    age: u32,
    max_age: u32,
    droplets: Vec<Droplet>,
}

impl Cascade {
    /// Horizontal offset of stream `i`, centred on the cascade.
    fn stream_offset(&self, i: usize) -> f32 {
        (i as f32 - (self.streams - 1) as f32 / 2.0) * (self.width / self.streams as f32)
    }

    fn color_at(&self, y: f32) -> Rgb {
        self.from.lerp(self.to, y / (self.top.y + self.max_height))
    }
}

/// Curtains of droplets that pour down and shift hue as they fall.
pub struct Waterfall {
    palette: [(Rgb, Rgb); 5],
    cascades: Vec<Cascade>,
    launches: Cadence,
}

impl Default for Waterfall {
    fn default() -> Self {
        Self {
            palette: PALETTE.map(|(from, to)| (Rgb::hex(from), Rgb::hex(to))),
            cascades: Vec::new(),
            launches: Cadence::default(),
        }
    }
}

impl Waterfall {
    fn spawn(&mut self, world: &mut World<'_>) {
        let size = world.size;
        let (from, to) = pick(world.rng, &self.palette);
        self.cascades.push(Cascade {
            top: Vec2::new(
                between(world.rng, size.x * 0.1, size.x * 0.9),
                world.rng.f32() * size.y * 0.3,
            ),
            width: between(world.rng, 50.0, 150.0),
            height: 0.0,
            max_height: between(world.rng, 300.0, 500.0),
            streams: world.rng.usize(3..=5),
            from,
            to,
            wind: jitter(world.rng, 0.05),
            age: 0,
            max_age: world.rng.u32(150..250),
            droplets: Vec::new(),
        });
    }
}

impl Effect for Waterfall {
    fn marker(&self) -> &'static str {
        "fireworks-canvas"
    }

    fn begin(&mut self, now: f64) {
        self.launches.reset(now);
    }

    fn step(&mut self, world: &mut World<'_>) {
        if self.launches.due(world.now, || INTERVAL_MS) {
            self.spawn(world);
        }

        let rng = &mut *world.rng;
        self.cascades.retain_mut(|cascade| {
            cascade.age += 1;
            if cascade.age > cascade.max_age {
                return false;
            }
            if cascade.height < cascade.max_height {
                cascade.height += GROWTH;
                for i in 0..cascade.streams {
                    let x = cascade.top.x + cascade.stream_offset(i);
                    cascade.droplets.push(Droplet {
                        pos: Vec2::new(x, cascade.top.y + cascade.height),
                        base_x: x,
                        vel: Vec2::new(jitter(rng, 1.0), between(rng, -7.0, -2.0)),
                        size: between(rng, 1.0, 3.0),
                        phase: rng.f32() * std::f32::consts::TAU,
                        phase_speed: between(rng, 0.01, 0.03),
                        alpha: between(rng, 0.5, 1.0),
                        age: 0,
                    });
                }
            }
            let wind = cascade.wind;
            cascade.droplets.retain_mut(|droplet| {
                droplet.age += 1;
                if droplet.age > DROPLET_TTL {
                    return false;
                }
                droplet.vel += Vec2::new(wind, GRAVITY);
                droplet.pos.y += droplet.vel.y;
                droplet.pos.x = droplet.base_x + droplet.phase.sin() * 2.0;
                droplet.phase += droplet.phase_speed;
                true
            });
            !cascade.droplets.is_empty()
        });
    }

    fn draw(&self, surface: &mut dyn Surface) {
        for cascade in &self.cascades {
            for droplet in &cascade.droplets {
                let fade = 1.0 - droplet.age as f32 / DROPLET_TTL as f32;
                surface.fill(
                    &Shape::Circle {
                        center: droplet.pos,
                        radius: droplet.size,
                    },
                    &cascade.color_at(droplet.pos.y).into(),
                    &Style::alpha(droplet.alpha * fade),
                );
            }
        }
    }

    fn clear(&mut self) {
        self.cascades.clear();
    }

    fn population(&self) -> usize {
        self.cascades.iter().map(|c| c.droplets.len()).sum()
    }
}

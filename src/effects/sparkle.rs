use glam::Vec2;

use super::{Cadence, Effect, World, between, ease_out, hexes, pick};
use crate::engine::particle::polar;
use crate::render::{Path, Rgb, Shape, Stroke, Style, Surface};

const RISE_MS: f64 = 1000.0;
const FUSE_MS: f64 = 800.0;
const RISE_PX: f32 = 800.0;
const SPARKS: usize = 80;
const SPARK_TTL_MS: f64 = 2000.0;
const TAIL_PX: f32 = 20.0;

/// A rocket climbing on a fixed easing curve.
struct Flare {
    x: f32,
    launched: f64,
    color: Rgb,
    pos: Vec2,
    alpha: f32,
}

/// A spark that glides to a fixed offset from its burst point.
struct Spark {
    origin: Vec2,
    offset: Vec2,
    color: Rgb,
    born: f64,
    /// Flight time in ms.
    duration: f64,
    pos: Vec2,
    alpha: f32,
}

/// Tweened rockets that pop into rings of glittering sparks.
pub struct Sparkle {
    palette: [Rgb; 10],
    flares: Vec<Flare>,
    sparks: Vec<Spark>,
    launches: Cadence,
}

impl Default for Sparkle {
    fn default() -> Self {
        Self {
            palette: hexes([
                0xff0000, 0xffa500, 0xffff00, 0x00ff00, 0x00ffff, 0x0000ff, 0xff00ff, 0xff1493,
                0xffd700, 0x00ff7f,
            ]),
            flares: Vec::new(),
            sparks: Vec::new(),
            launches: Cadence::default(),
        }
    }
}

impl Sparkle {
    /// How far rockets climb on a screen of `height` px.
    fn rise(height: f32) -> f32 {
        RISE_PX.min(height * 0.9)
    }

    fn flare_pos(x: f32, launched: f64, now: f64, height: f32) -> Vec2 {
        let t = ((now - launched) / RISE_MS) as f32;
        Vec2::new(x, height - Self::rise(height) * ease_out(t))
    }

    /// Opacity of a climbing rocket: solid for the first 70% of the climb.
    fn flare_alpha(launched: f64, now: f64) -> f32 {
        let t = ((now - launched) / RISE_MS) as f32;
        if t < 0.7 {
            1.0
        } else {
            (1.0 - (t - 0.7) / 0.3).clamp(0.0, 1.0)
        }
    }

    fn burst(&mut self, at: Vec2, color: Rgb, world: &mut World<'_>) {
        for i in 0..SPARKS {
            let degrees = i as f32 * 360.0 / SPARKS as f32 + world.rng.f32() * 20.0;
            let distance = between(world.rng, 100.0, 200.0) * between(world.rng, 0.7, 1.0);
            self.sparks.push(Spark {
                origin: at,
                offset: polar(degrees.to_radians()) * distance,
                color,
                born: world.now,
                duration: between(world.rng, 800.0, 1400.0) as f64,
                pos: at,
                alpha: 1.0,
            });
        }
    }
}

impl Effect for Sparkle {
    fn marker(&self) -> &'static str {
        "sparkle-canvas"
    }

    fn begin(&mut self, now: f64) {
        self.launches.reset(now);
    }

    fn step(&mut self, world: &mut World<'_>) {
        let now = world.now;
        let height = world.size.y;
        let rng = &mut *world.rng;
        if self
            .launches
            .due(now, || between(rng, 200.0, 1000.0) as f64)
        {
            let x = between(world.rng, 50.0, (world.size.x - 50.0).max(50.0));
            let color = pick(world.rng, &self.palette);
            self.flares.push(Flare {
                x,
                launched: now,
                color,
                pos: Vec2::new(x, height),
                alpha: 1.0,
            });
        }

        let mut bursts = Vec::new();
        self.flares.retain_mut(|flare| {
            flare.pos = Self::flare_pos(flare.x, flare.launched, now, height);
            flare.alpha = Self::flare_alpha(flare.launched, now);
            if now - flare.launched >= FUSE_MS {
                bursts.push((flare.pos + Vec2::new(0.0, 50.0), flare.color));
                return false;
            }
            true
        });
        for (at, color) in bursts {
            self.burst(at, color, world);
        }

        for spark in &mut self.sparks {
            let age = now - spark.born;
            let t = (age / spark.duration) as f32;
            spark.pos = spark.origin + spark.offset * ease_out(t);
            let fade_from = spark.duration * 0.9;
            spark.alpha = if age < fade_from {
                1.0
            } else {
                (1.0 - ((age - fade_from) / spark.duration) as f32).max(0.0)
            };
        }
        self.sparks.retain(|s| now - s.born < SPARK_TTL_MS);
    }

    fn draw(&self, surface: &mut dyn Surface) {
        for flare in &self.flares {
            let alpha = flare.alpha;
            let tail = [flare.pos, flare.pos + Vec2::new(0.0, TAIL_PX)];
            surface.stroke(
                &Path::Polyline {
                    points: &tail,
                    closed: false,
                },
                &Stroke::new(Rgb::hex(0xffc864).with_alpha(0.5), 2.0),
                &Style::alpha(alpha),
            );
            surface.fill(
                &Shape::Circle {
                    center: flare.pos,
                    radius: 1.5,
                },
                &Rgb::WHITE.into(),
                &Style::alpha(alpha).glow(12.0, Rgb::hex(0xffff00)),
            );
        }
        for spark in &self.sparks {
            surface.fill(
                &Shape::Circle {
                    center: spark.pos,
                    radius: 2.0,
                },
                &spark.color.into(),
                &Style::alpha(spark.alpha).glow(6.0, spark.color),
            );
        }
    }

    fn clear(&mut self) {
        self.flares.clear();
        self.sparks.clear();
    }

    fn population(&self) -> usize {
        self.flares.len() + self.sparks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::testing;

    fn world(rng: &mut fastrand::Rng, now: f64) -> World<'_> {
        World {
            now,
            size: testing::SIZE,
            rng,
        }
    }

    #[test]
    fn test_flare_bursts_after_fuse() {
        let mut sparkle = Sparkle::default();
        let mut rng = fastrand::Rng::with_seed(3);
        sparkle.begin(0.0);
        sparkle.step(&mut world(&mut rng, 0.0));
        assert_eq!(sparkle.flares.len(), 1);
        sparkle.launches.reset(f64::MAX);
        sparkle.step(&mut world(&mut rng, 784.0));
        assert_eq!(sparkle.flares.len(), 1);
        assert!(sparkle.flares[0].pos.y < testing::SIZE.y * 0.5);
        sparkle.step(&mut world(&mut rng, 800.0));
        assert!(sparkle.flares.is_empty());
        assert_eq!(sparkle.sparks.len(), SPARKS);
    }

    #[test]
    fn test_sparks_glide_out_and_expire() {
        let mut sparkle = Sparkle::default();
        let mut rng = fastrand::Rng::with_seed(3);
        sparkle.launches.reset(f64::MAX);
        sparkle.burst(Vec2::new(500.0, 300.0), Rgb::WHITE, &mut world(&mut rng, 0.0));
        sparkle.step(&mut world(&mut rng, 1500.0));
        for spark in &sparkle.sparks {
            let travelled = spark.pos.distance(spark.origin);
            assert!((70.0..=200.0).contains(&travelled), "travelled {travelled}");
            assert!(spark.alpha < 1.0);
        }
        sparkle.step(&mut world(&mut rng, 2000.0));
        assert!(sparkle.sparks.is_empty());
    }

    #[test]
    fn test_rise_is_capped_by_screen() {
        assert_eq!(Sparkle::rise(1080.0), 800.0);
        assert!((Sparkle::rise(500.0) - 450.0).abs() < 1e-3);
    }
}

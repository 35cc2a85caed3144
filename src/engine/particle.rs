use glam::Vec2;

use crate::render::Rgb;

/// Bounded history of prior positions, oldest first.
#[derive(Debug, Clone, Default)]
pub struct Trail {
    points: Vec<Vec2>,
    cap: usize,
}

impl Trail {
    pub fn new(cap: usize) -> Self {
        Self {
            points: Vec::with_capacity(cap),
            cap,
        }
    }

    /// Append a point, dropping the oldest once the cap is reached.
    pub fn push(&mut self, point: Vec2) {
        if self.cap == 0 {
            return;
        }
        if self.points.len() == self.cap {
            self.points.remove(0);
        }
        self.points.push(point);
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// The state every burst particle shares. Effects wrap it with their own
/// extras (spin, size, trail).
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: Rgb,
    pub alpha: f32,
    /// Frames lived so far.
    pub age: u32,
}

impl Particle {
    pub fn new(pos: Vec2, vel: Vec2, color: Rgb) -> Self {
        Self {
            pos,
            vel,
            color,
            alpha: 1.0,
            age: 0,
        }
    }

    /// One frame of motion: damp, fall, then move.
    pub fn integrate(&mut self, gravity: f32, friction: f32) {
        self.vel *= friction;
        self.vel.y += gravity;
        self.pos += self.vel;
        self.age += 1;
    }

    pub fn is_visible(&self) -> bool {
        self.alpha > 0.0
    }
}

/// A projectile homing in on a fixed target.
#[derive(Debug, Clone)]
pub struct Rocket {
    pub pos: Vec2,
    pub target: Vec2,
    pub speed: f32,
    pub color: Rgb,
    pub trail: Trail,
}

impl Rocket {
    pub fn new(pos: Vec2, target: Vec2, speed: f32, color: Rgb, trail: usize) -> Self {
        Self {
            pos,
            target,
            speed,
            color,
            trail: Trail::new(trail),
        }
    }

    /// Advance one frame towards the target, never overshooting it. Returns
    /// `true`, without moving, once the rocket is within `reach` of it.
    pub fn home(&mut self, reach: f32) -> bool {
        let delta = self.target - self.pos;
        if delta.length() < reach {
            return true;
        }
        self.pos += delta.clamp_length_max(self.speed);
        self.trail.push(self.pos);
        false
    }
}

/// Unit vector for `angle` radians, measured from +x towards +y (screen down).
pub fn polar(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

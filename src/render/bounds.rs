use glam::Vec2;

/// Axis-aligned rectangle in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    /// The full surface, origin at the top-left corner.
    pub fn viewport(size: Vec2) -> Self {
        Self {
            min: Vec2::ZERO,
            max: size,
        }
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Grow every edge outwards by `margin`.
    pub fn inflate(&self, margin: f32) -> Self {
        Self {
            min: self.min - Vec2::splat(margin),
            max: self.max + Vec2::splat(margin),
        }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_edges() {
        let b = Bounds::viewport(Vec2::new(100.0, 50.0));
        assert!(b.contains(Vec2::ZERO));
        assert!(b.contains(Vec2::new(100.0, 50.0)));
        assert!(!b.contains(Vec2::new(100.1, 10.0)));
        assert!(b.inflate(5.0).contains(Vec2::new(-4.0, 54.0)));
    }
}

use std::fmt;

/// An opaque 8-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::hex(0xFFFFFF);
    pub const BLACK: Rgb = Rgb::hex(0x000000);

    /// Build from a packed `0xRRGGBB` literal.
    pub const fn hex(packed: u32) -> Self {
        Self {
            r: ((packed >> 16) & 0xFF) as u8,
            g: ((packed >> 8) & 0xFF) as u8,
            b: (packed & 0xFF) as u8,
        }
    }

    pub const fn with_alpha(self, alpha: f32) -> Rgba {
        Rgba { rgb: self, alpha }
    }

    /// Shift every channel by `amount`, saturating at 0 and 255.
    pub fn brighten(self, amount: i16) -> Self {
        let shift = |c: u8| (c as i16 + amount).clamp(0, 255) as u8;
        Self {
            r: shift(self.r),
            g: shift(self.g),
            b: shift(self.b),
        }
    }

    /// Linear blend towards `other`; `t` is clamped to `[0, 1]`.
    pub fn lerp(self, other: Rgb, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).floor() as u8;
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// A color with straight (non-premultiplied) alpha in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub rgb: Rgb,
    pub alpha: f32,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgb::BLACK.with_alpha(0.0);
}

impl From<Rgb> for Rgba {
    fn from(rgb: Rgb) -> Self {
        rgb.with_alpha(1.0)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Rgb { r, g, b } = self.rgb;
        write!(f, "rgba({}, {}, {}, {})", r, g, b, self.alpha.clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_unpacks_channels() {
        let c = Rgb::hex(0xFF718D);
        assert_eq!((c.r, c.g, c.b), (0xFF, 0x71, 0x8D));
        assert_eq!(c.to_string(), "#ff718d");
    }

    #[test]
    fn test_brighten_saturates() {
        let c = Rgb::hex(0xF0F010).brighten(20);
        assert_eq!((c.r, c.g, c.b), (255, 255, 0x24));
        let d = Rgb::hex(0x050505).brighten(-20);
        assert_eq!(d, Rgb::BLACK);
    }

    #[test]
    fn test_lerp_endpoints_and_clamp() {
        let a = Rgb::hex(0x00FFFF);
        let b = Rgb::hex(0x0000FF);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 7.0), b);
        assert_eq!(a.lerp(b, 0.5), Rgb { r: 0, g: 127, b: 255 });
    }

    #[test]
    fn test_rgba_css() {
        assert_eq!(Rgb::BLACK.with_alpha(0.1).to_string(), "rgba(0, 0, 0, 0.1)");
        assert_eq!(Rgb::WHITE.with_alpha(3.0).to_string(), "rgba(255, 255, 255, 1)");
    }
}

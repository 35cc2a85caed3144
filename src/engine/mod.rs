pub mod confetti;
pub mod fireworks;
pub mod frame;
pub mod particle;
pub mod slot;

use serde::Deserialize;

use crate::error::Error;

pub use confetti::Confetti;
pub use fireworks::Fireworks;
pub use frame::{Animate, CancelToken, Flow, FrameLoop};
pub use slot::SurfaceSlot;

/// How long an effect keeps running once started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "RawDuration")]
pub enum EffectDuration {
    Finite(u64),
    #[default]
    Unbounded,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDuration {
    Millis(u64),
    Fractional(f64),
    Word(String),
}

impl TryFrom<RawDuration> for EffectDuration {
    type Error = Error;

    fn try_from(raw: RawDuration) -> Result<Self, Self::Error> {
        match raw {
            RawDuration::Millis(ms) => Ok(EffectDuration::Finite(ms)),
            RawDuration::Fractional(ms) if ms.is_finite() && ms >= 0.0 => {
                Ok(EffectDuration::Finite(ms.round() as u64))
            }
            RawDuration::Fractional(ms) if ms == f64::INFINITY => Ok(EffectDuration::Unbounded),
            RawDuration::Fractional(ms) => Err(Error::InvalidDuration(ms.to_string())),
            RawDuration::Word(word) => match word.to_ascii_lowercase().as_str() {
                "infinite" | "unbounded" => Ok(EffectDuration::Unbounded),
                _ => Err(Error::InvalidDuration(word)),
            },
        }
    }
}

/// The moment an effect ends, on the [`Clock`](crate::platform::Clock) timeline.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Deadline {
    At(f64),
    #[default]
    Never,
}

impl Deadline {
    pub fn after(now: f64, duration: EffectDuration) -> Self {
        match duration {
            EffectDuration::Finite(ms) => Deadline::At(now + ms as f64),
            EffectDuration::Unbounded => Deadline::Never,
        }
    }

    pub fn has_passed(&self, now: f64) -> bool {
        match self {
            Deadline::At(end) => now >= *end,
            Deadline::Never => false,
        }
    }
}

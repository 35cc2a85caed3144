//! Birthday celebrations for wall dashboards.
//!
//! Watches a list of birthdays and, when one falls on today, covers the
//! dashboard with a message, fireworks and confetti. The core runs on any
//! [`platform::Platform`]; the browser glue is only built for `wasm32`.

pub mod calendar;
pub mod celebration;
pub mod effects;
pub mod engine;
pub mod error;
#[cfg(target_arch = "wasm32")]
pub mod module;
pub mod platform;
pub mod render;

pub use calendar::MonthDay;
pub use celebration::{Birthday, Celebration, Config, Phase};
pub use effects::FireworkStyle;
pub use engine::{Confetti, EffectDuration, Fireworks};
pub use error::{Error, Result};
#[cfg(target_arch = "wasm32")]
pub use module::BirthdayModule;

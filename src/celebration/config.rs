//! Module configuration as the dashboard host passes it in.
//!
//! Keys are camelCase and every key is optional:
//!
//! ```json
//! {
//!   "birthdays": [{ "name": "Ada", "date": "03-15" }],
//!   "fireworkDuration": 5000,
//!   "confettiDuration": "infinite",
//!   "debug": false,
//!   "startupDelay": 2000,
//!   "immersiveMode": true,
//!   "fireworkStyle": "comet-trail",
//!   "messages": ["Happy birthday {name}!"]
//! }
//! ```

use serde::Deserialize;
use serde_json::Value;

use super::messages::Messages;
use crate::effects::FireworkStyle;
use crate::engine::EffectDuration;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Birthday {
    pub name: String,
    /// `MM-DD` or `MM-DD-YYYY`.
    pub date: String,
}

/// The birthday list, or whatever was configured in its place.
///
/// Entries are read one by one and bad ones are skipped with a warning.
/// A value that is not a list at all does not fail the whole configuration;
/// the scheduler reports it and skips its check instead.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum Birthdays {
    List(Vec<Birthday>),
    Malformed(Value),
}

impl From<Value> for Birthdays {
    fn from(value: Value) -> Self {
        let Value::Array(items) = value else {
            return Birthdays::Malformed(value);
        };
        let list = items
            .into_iter()
            .enumerate()
            .filter_map(|(i, item)| match serde_json::from_value::<Birthday>(item) {
                Ok(birthday) => Some(birthday),
                Err(err) => {
                    log::warn!("[Birthday] Skipping birthdays[{}]: {}", i, err);
                    None
                }
            })
            .collect();
        Birthdays::List(list)
    }
}

impl Default for Birthdays {
    fn default() -> Self {
        Birthdays::List(Vec::new())
    }
}

impl Birthdays {
    pub fn entries(&self) -> Result<&[Birthday]> {
        match self {
            Birthdays::List(list) => Ok(list),
            Birthdays::Malformed(_) => Err(Error::MalformedBirthdays),
        }
    }
}

impl From<Vec<Birthday>> for Birthdays {
    fn from(list: Vec<Birthday>) -> Self {
        Birthdays::List(list)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub birthdays: Birthdays,
    /// How long fireworks run; a finite value also ends the session.
    #[serde(default)]
    pub firework_duration: EffectDuration,
    /// How long confetti keeps refiring.
    #[serde(default)]
    pub confetti_duration: EffectDuration,
    #[serde(default)]
    pub debug: bool,
    /// Delay before the first check, in ms.
    #[serde(default = "default_startup_delay")]
    pub startup_delay: u32,
    /// Dim the other widgets while celebrating.
    #[serde(default = "default_true")]
    pub immersive_mode: bool,
    #[serde(default)]
    pub firework_style: FireworkStyle,
    /// Overrides the built-in messages.
    #[serde(default)]
    pub messages: Option<Messages>,
}

fn default_startup_delay() -> u32 {
    2000
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            birthdays: Birthdays::default(),
            firework_duration: EffectDuration::Unbounded,
            confetti_duration: EffectDuration::Unbounded,
            debug: false,
            startup_delay: default_startup_delay(),
            immersive_mode: true,
            firework_style: FireworkStyle::default(),
            messages: None,
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_birthdays(mut self, birthdays: impl Into<Birthdays>) -> Self {
        self.birthdays = birthdays.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_gives_defaults() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.startup_delay, 2000);
        assert!(config.immersive_mode);
        assert_eq!(config.firework_duration, EffectDuration::Unbounded);
        assert_eq!(config.firework_style, FireworkStyle::Classic);
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_json(
            r#"{
                "birthdays": [{"name": "Ada", "date": "03-15"}, {"name": "Alan", "date": "06-23-1912"}],
                "fireworkDuration": 5000,
                "confettiDuration": "infinite",
                "debug": true,
                "startupDelay": 10,
                "immersiveMode": false,
                "fireworkStyle": "waterfall",
                "messages": ["Yay {name}"]
            }"#,
        )
        .unwrap();
        let entries = config.birthdays.entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].date, "06-23-1912");
        assert_eq!(config.firework_duration, EffectDuration::Finite(5000));
        assert_eq!(config.confetti_duration, EffectDuration::Unbounded);
        assert!(config.debug);
        assert_eq!(config.startup_delay, 10);
        assert!(!config.immersive_mode);
        assert_eq!(config.firework_style, FireworkStyle::Waterfall);
        assert_eq!(
            config.messages,
            Some(Messages::List(vec!["Yay {name}".to_string()]))
        );
    }

    #[test]
    fn test_malformed_birthdays_still_parse() {
        let config = Config::from_json(r#"{"birthdays": {"Ada": "03-15"}}"#).unwrap();
        assert!(matches!(config.birthdays, Birthdays::Malformed(_)));
        assert!(matches!(
            config.birthdays.entries(),
            Err(Error::MalformedBirthdays)
        ));

    }

    #[test]
    fn test_bad_entries_are_skipped_and_the_rest_kept() {
        let config = Config::from_json(
            r#"{"birthdays": [
                {"name": "Ada"},
                {"name": "Alan", "date": "06-23"},
                "Grace 12-09",
                {"name": "Grace", "date": 1209},
                {"name": "Edsger", "date": "05-11"}
            ]}"#,
        )
        .unwrap();
        let names: Vec<_> = config
            .birthdays
            .entries()
            .unwrap()
            .iter()
            .map(|b| b.name.as_str())
            .collect();
        assert_eq!(names, ["Alan", "Edsger"]);
    }

    #[test]
    fn test_invalid_messages_are_kept_for_fallback() {
        let config = Config::from_json(r#"{"messages": "hello"}"#).unwrap();
        assert!(matches!(config.messages, Some(Messages::Invalid(_))));
    }

    #[test]
    fn test_bad_duration_is_a_config_error() {
        let err = Config::from_json(r#"{"fireworkDuration": "soon"}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}

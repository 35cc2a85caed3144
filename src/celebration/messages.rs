use chrono::NaiveTime;
use fastrand::Rng;
use serde::Deserialize;

pub const DEFAULT_MESSAGES: [&str; 3] = [
    "🎉 Happy Birthday, {name}! 🎂",
    "🎈 Best wishes on your special day, {name}! 🎁",
    "🌟 Have a fantastic birthday, {name}! 🎊",
];

/// Configured message overrides. Anything that is not a list of strings
/// is kept as `Invalid` so the defaults can be used instead.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Messages {
    List(Vec<String>),
    Invalid(serde_json::Value),
}

/// Pick a random message and put `name` into its first `{name}`.
pub fn compose(overrides: Option<&Messages>, name: &str, rng: &mut Rng) -> String {
    let custom: Vec<&str> = match overrides {
        Some(Messages::List(list)) if !list.is_empty() => {
            list.iter().map(String::as_str).collect()
        }
        Some(Messages::List(_)) => {
            log::debug!("[Birthday] Message list is empty, using defaults");
            Vec::new()
        }
        Some(Messages::Invalid(value)) => {
            log::warn!("[Birthday] Invalid messages {}, using defaults", value);
            Vec::new()
        }
        None => Vec::new(),
    };
    let pool: &[&str] = if custom.is_empty() {
        &DEFAULT_MESSAGES
    } else {
        &custom
    };
    let template = pool[rng.usize(..pool.len())];
    template.replacen("{name}", name, 1)
}

/// Lines of the debug panel shown under the message.
pub fn debug_panel(
    name: &str,
    immersive: bool,
    fireworks_ready: bool,
    time: NaiveTime,
) -> Vec<String> {
    vec![
        "Debug Info:".to_string(),
        format!("Name: {}", name),
        format!("ImmersiveMode: {}", immersive),
        "Wrapper exists: true".to_string(),
        format!("Fireworks initialized: {}", fireworks_ready),
        format!("Time: {}", time.format("%H:%M:%S")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_unset() {
        let mut rng = Rng::with_seed(1);
        for _ in 0..20 {
            let message = compose(None, "Ada", &mut rng);
            assert!(message.contains("Ada"));
            assert!(!message.contains("{name}"));
        }
    }

    #[test]
    fn test_overrides_are_used() {
        let mut rng = Rng::with_seed(1);
        let custom = Messages::List(vec!["Cheers {name}".into()]);
        assert_eq!(compose(Some(&custom), "Ada", &mut rng), "Cheers Ada");
    }

    #[test]
    fn test_only_first_placeholder_is_replaced() {
        let mut rng = Rng::with_seed(1);
        let custom = Messages::List(vec!["{name} and {name}".into()]);
        assert_eq!(compose(Some(&custom), "Ada", &mut rng), "Ada and {name}");
    }

    #[test]
    fn test_invalid_or_empty_overrides_fall_back() {
        let mut rng = Rng::with_seed(2);
        let invalid = Messages::Invalid(serde_json::json!({"en": "hi"}));
        let empty = Messages::List(Vec::new());
        for overrides in [&invalid, &empty] {
            let message = compose(Some(overrides), "Ada", &mut rng);
            assert!(
                DEFAULT_MESSAGES
                    .iter()
                    .any(|t| t.replacen("{name}", "Ada", 1) == message)
            );
        }
    }

    #[test]
    fn test_debug_panel_lines() {
        let time = NaiveTime::from_hms_opt(9, 5, 7).unwrap();
        let lines = debug_panel("Ada", true, false, time);
        assert_eq!(
            lines,
            vec![
                "Debug Info:",
                "Name: Ada",
                "ImmersiveMode: true",
                "Wrapper exists: true",
                "Fireworks initialized: false",
                "Time: 09:05:07",
            ]
        );
    }
}

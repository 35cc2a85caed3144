//! End-to-end celebrations on the headless platform.

use fete::platform::WidgetTreatment;
use fete::platform::headless::{FRAME_MS, Harness};
use fete::{Celebration, Config, EffectDuration, FireworkStyle, MonthDay, Phase};
use glam::Vec2;

const ADA: &str = r#"{"birthdays": [{"name": "Ada", "date": "03-15"}]}"#;

fn harness(month: u32, day: u32) -> Harness {
    Harness::new(MonthDay::new(month, day).unwrap(), Vec2::new(1920.0, 1080.0))
        .with_widgets(["clock", "calendar", "weather"])
}

/// Startup delay plus the settle pause plus a couple of frames.
fn boot(h: &Harness, config: &Config) {
    h.scheduler
        .advance(config.startup_delay as f64 + 100.0 + FRAME_MS * 2.0);
}

#[test]
fn test_celebrates_on_the_day() {
    let h = harness(3, 15);
    let config = Config::from_json(ADA).unwrap();
    let celebration = Celebration::new(config.clone(), h.platform());
    celebration.start();
    boot(&h, &config);

    assert_eq!(celebration.phase(), Phase::Celebrating);
    assert_eq!(celebration.celebrant().as_deref(), Some("Ada"));
    assert!(h.stage.overlay().unwrap().message.contains("Ada"));
    assert!(h.stage.backdrop_visible());
    for widget in ["clock", "calendar", "weather"] {
        assert_eq!(h.stage.treatment(widget), Some(WidgetTreatment::Dimmed));
    }
    assert_eq!(h.stage.attached("classic-firework-canvas"), 1);
    assert!(h.stage.frames_drawn("classic-firework-canvas") >= 1);
}

#[test]
fn test_quiet_on_other_days() {
    let h = harness(3, 16);
    let config = Config::from_json(ADA).unwrap();
    let celebration = Celebration::new(config.clone(), h.platform());
    celebration.start();
    boot(&h, &config);
    h.scheduler.advance(60_000.0);

    assert_eq!(celebration.phase(), Phase::Idle);
    assert!(h.stage.overlay().is_none());
    assert_eq!(h.stage.attached_total(), 0);
    assert_eq!(h.stage.treatment("clock"), Some(WidgetTreatment::Normal));
}

#[test]
fn test_full_date_with_year_matches() {
    let h = harness(12, 10);
    let config =
        Config::from_json(r#"{"birthdays": [{"name": "Ada", "date": "12-10-1815"}]}"#).unwrap();
    let celebration = Celebration::new(config, h.platform());
    assert!(celebration.check(false));
}

#[test]
fn test_five_second_show_stops_on_time() {
    let h = harness(3, 15);
    let config = Config::from_json(
        r#"{"birthdays": [{"name": "Ada", "date": "03-15"}], "fireworkDuration": 5000,
            "fireworkStyle": "kaleidoscope", "startupDelay": 0}"#,
    )
    .unwrap();
    assert_eq!(config.firework_duration, EffectDuration::Finite(5000));
    let celebration = Celebration::new(config, h.platform());
    celebration.start();
    // Session starts 100ms after the startup check.
    h.scheduler.advance(200.0);
    assert_eq!(h.stage.attached("kaleidoscope-canvas"), 1);
    h.scheduler.advance(4800.0);
    assert_eq!(h.stage.attached("kaleidoscope-canvas"), 1);
    h.scheduler.advance(200.0);
    assert_eq!(h.stage.attached("kaleidoscope-canvas"), 0);
    assert_eq!(celebration.phase(), Phase::Idle);
    assert_eq!(h.scheduler.pending_frames(), 0);
}

#[test]
fn test_finished_show_is_not_repeated_the_same_day() {
    let h = harness(3, 15);
    let config = Config::from_json(
        r#"{"birthdays": [{"name": "Ada", "date": "03-15"}], "fireworkDuration": 1000}"#,
    )
    .unwrap();
    let celebration = Celebration::new(config.clone(), h.platform());
    celebration.start();
    boot(&h, &config);
    h.scheduler.advance(1000.0);
    assert_eq!(celebration.phase(), Phase::Idle);

    h.scheduler.advance(120_000.0);
    assert_eq!(celebration.phase(), Phase::Idle);
    assert_eq!(h.stage.created("classic-firework-canvas"), 1);
}

#[test]
fn test_suspend_and_resume_on_the_same_day() {
    let h = harness(3, 15);
    let config = Config::from_json(ADA).unwrap();
    let celebration = Celebration::new(config.clone(), h.platform());
    celebration.start();
    boot(&h, &config);

    celebration.suspend();
    assert_eq!(celebration.phase(), Phase::Suspended);
    assert_eq!(h.stage.attached_total(), 0);
    assert_eq!(h.scheduler.pending_frames(), 0);
    assert_eq!(h.stage.treatment("clock"), Some(WidgetTreatment::Normal));

    celebration.resume();
    h.scheduler.advance(500.0 + FRAME_MS);
    assert_eq!(celebration.phase(), Phase::Celebrating);
    assert_eq!(celebration.celebrant().as_deref(), Some("Ada"));
    assert_eq!(h.stage.attached("classic-firework-canvas"), 1);
    assert!(h.stage.overlay().is_some());
}

#[test]
fn test_stop_twice_leaves_a_clean_page() {
    let h = harness(3, 15);
    let config = Config::from_json(ADA).unwrap();
    let celebration = Celebration::new(config.clone(), h.platform());
    celebration.start();
    boot(&h, &config);
    h.scheduler.advance(3000.0);

    celebration.stop();
    celebration.stop();
    assert_eq!(h.stage.attached_total(), 0);
    assert_eq!(h.stage.resize_listeners(), 0);
    assert_eq!(h.scheduler.pending_frames(), 0);
    assert!(h.stage.overlay().is_none());
    assert!(!h.stage.backdrop_visible());
}

#[test]
fn test_malformed_birthdays_are_skipped() {
    let h = harness(3, 15);
    let config = Config::from_json(r#"{"birthdays": {"name": "Ada", "date": "03-15"}}"#).unwrap();
    let celebration = Celebration::new(config.clone(), h.platform());
    celebration.start();
    boot(&h, &config);
    assert_eq!(celebration.phase(), Phase::Idle);
    assert!(h.stage.overlay().is_none());
}

#[test]
fn test_every_style_runs_under_the_controller() {
    for style in FireworkStyle::ALL {
        let h = harness(3, 15);
        let mut config = Config::from_json(ADA).unwrap();
        config.firework_style = style;
        let celebration = Celebration::new(config, h.platform());
        celebration.check(false);
        h.scheduler.advance(100.0 + FRAME_MS * 30.0);
        assert_eq!(h.stage.attached_total(), 2, "{style}");
        celebration.stop();
        assert_eq!(h.stage.attached_total(), 0, "{style}");
    }
}

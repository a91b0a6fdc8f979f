use std::time::Duration;

use frameintro_common::config::ShutterConfig;
use frameintro_model::state::AnimationPhase;
use frameintro_motion::shutter::{drive_at, total_duration};
use frameintro_motion::sink::RecordingSink;
use frameintro_motion::{FrameEasingDriver, FrameStatus};
use proptest::prelude::*;

fn config() -> ShutterConfig {
    ShutterConfig::default()
}

proptest! {
    #[test]
    fn closing_phase_matches_closed_form(elapsed in 0.0f64..=700.0) {
        let angle = drive_at(&config(), elapsed).drive_angle_deg;
        let expected = 40.0 * (1.0 - (1.0 - (1.0 - elapsed / 700.0).powi(3)));
        prop_assert!((angle - expected).abs() < 1e-9);
    }

    #[test]
    fn closing_phase_is_non_increasing(a in 0.0f64..=700.0, b in 0.0f64..=700.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let c = config();
        prop_assert!(drive_at(&c, hi).drive_angle_deg <= drive_at(&c, lo).drive_angle_deg + 1e-12);
    }

    #[test]
    fn opening_phase_matches_closed_form(elapsed in 700.001f64..=1700.0) {
        let angle = drive_at(&config(), elapsed).drive_angle_deg;
        let expected = 40.0 * ((elapsed - 700.0) / 1000.0).powi(3);
        prop_assert!((angle - expected).abs() < 1e-9);
    }

    #[test]
    fn opening_phase_is_non_decreasing(a in 700.001f64..=1700.0, b in 700.001f64..=1700.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let c = config();
        prop_assert!(drive_at(&c, hi).drive_angle_deg + 1e-12 >= drive_at(&c, lo).drive_angle_deg);
    }

    #[test]
    fn angle_stays_within_target(elapsed in 0.0f64..5000.0) {
        let angle = drive_at(&config(), elapsed).drive_angle_deg;
        prop_assert!((0.0..=40.0).contains(&angle));
    }

    #[test]
    fn cancelled_driver_never_writes_again(cancel_at in 0u64..1700, step in 1u64..120) {
        let log = RecordingSink::new();
        let mut driver = FrameEasingDriver::new(config(), log.clone());
        driver.start();

        let mut t = 0;
        while t < cancel_at {
            driver.frame(Duration::from_millis(t));
            t += step;
        }
        driver.cancel();
        let writes = log.len();

        for late in [t, t + step, 1700, 1701, 10_000] {
            prop_assert_eq!(driver.frame(Duration::from_millis(late)), FrameStatus::Inactive);
        }
        prop_assert_eq!(log.len(), writes);
        prop_assert!(!driver.is_settled());
    }
}

#[test]
fn curve_is_continuous_at_phase_boundary() {
    let c = config();
    let left = drive_at(&c, 700.0).drive_angle_deg;
    let right = drive_at(&c, 700.000_001).drive_angle_deg;
    assert_eq!(left, 0.0);
    assert!(right.abs() < 1e-9);
    assert_eq!(drive_at(&c, 700.000_001).phase, AnimationPhase::RunningUp);
}

#[test]
fn settled_value_is_target() {
    let c = config();
    assert_eq!(total_duration(&c), Duration::from_millis(1700));
    assert_eq!(drive_at(&c, 1700.0).drive_angle_deg, 40.0);
    let after = drive_at(&c, 1700.5);
    assert_eq!(after.phase, AnimationPhase::Settled);
    assert_eq!(after.drive_angle_deg, 40.0);
}

#[test]
fn custom_target_scales_curve() {
    let c = ShutterConfig {
        target_deg: 90.0,
        phase1_ms: 100,
        phase2_ms: 100,
        blades: 5,
    };
    assert_eq!(drive_at(&c, 0.0).drive_angle_deg, 90.0);
    assert_eq!(drive_at(&c, 100.0).drive_angle_deg, 0.0);
    assert!((drive_at(&c, 150.0).drive_angle_deg - 90.0 * 0.125).abs() < 1e-9);
}

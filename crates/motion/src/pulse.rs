//! Acknowledgement motion played when an activation is accepted.

use std::time::Duration;

use frameintro_common::clock::as_millis_f64;

use crate::ease::{progress, Ease};

/// Scale at the bottom of the press.
pub const PRESSED_SCALE: f64 = 0.9;

/// A scale-down then scale-up pulse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AckPulse {
    pub duration: Duration,
    pub min_scale: f64,
}

impl AckPulse {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            min_scale: PRESSED_SCALE,
        }
    }

    /// Scale `elapsed` into the pulse; `1.0` outside it.
    pub fn scale_at(&self, elapsed: Duration) -> f64 {
        let t = progress(as_millis_f64(elapsed), as_millis_f64(self.duration));
        let depth = 1.0 - self.min_scale;
        if t < 0.5 {
            1.0 - depth * Ease::OutCubic.apply(t * 2.0)
        } else {
            self.min_scale + depth * Ease::InCubic.apply((t - 0.5) * 2.0)
        }
    }

    pub fn is_complete(&self, elapsed: Duration) -> bool {
        elapsed >= self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pulse_shape() {
        let pulse = AckPulse::new(Duration::from_millis(100));
        assert_eq!(pulse.scale_at(Duration::ZERO), 1.0);
        assert!((pulse.scale_at(Duration::from_millis(50)) - PRESSED_SCALE).abs() < 1e-9);
        assert!((pulse.scale_at(Duration::from_millis(100)) - 1.0).abs() < 1e-9);
        assert!(pulse.scale_at(Duration::from_millis(25)) < 1.0);
    }

    #[test]
    fn test_pulse_stays_between_bounds() {
        let pulse = AckPulse::new(Duration::from_millis(100));
        for ms in 0..=120 {
            let s = pulse.scale_at(Duration::from_millis(ms));
            assert!((PRESSED_SCALE - 1e-9..=1.0 + 1e-9).contains(&s), "{ms}ms -> {s}");
        }
    }
}

//! The simulated pointer's walk to the dock anchor.

use std::time::Duration;

use frameintro_common::clock::as_millis_f64;
use frameintro_common::config::PointerScript;
use frameintro_model::viewport::{Point2D, ViewportSize};

use crate::ease::{progress, Ease};

/// An eased straight-line path between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerPath {
    pub from: Point2D,
    pub to: Point2D,
    pub duration: Duration,
    pub ease: Ease,
}

impl PointerPath {
    pub fn new(from: Point2D, to: Point2D, duration: Duration) -> Self {
        Self {
            from,
            to,
            duration,
            ease: Ease::InOutCubic,
        }
    }

    /// The scripted path mapped into a viewport.
    pub fn from_script(script: &PointerScript, viewport: ViewportSize) -> Self {
        Self::new(
            viewport.at_fraction(script.origin_x, script.origin_y),
            viewport.at_fraction(script.anchor_x, script.anchor_y),
            Duration::from_millis(script.travel_ms),
        )
    }

    /// Position `elapsed` after departure. Holds the end points outside
    /// the travel window.
    pub fn position_at(&self, elapsed: Duration) -> Point2D {
        let t = progress(as_millis_f64(elapsed), as_millis_f64(self.duration));
        Point2D::lerp(&self.from, &self.to, self.ease.apply(t))
    }

    pub fn is_complete(&self, elapsed: Duration) -> bool {
        elapsed >= self.duration
    }
}

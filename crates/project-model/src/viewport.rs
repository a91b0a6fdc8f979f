//! Viewport geometry and the pointer-driven meter levels.

use serde::{Deserialize, Serialize};

use frameintro_common::config::ViewportConfig;

/// Lower bound of every meter level.
pub const LEVEL_FLOOR: f64 = 10.0;
/// Upper bound of every meter level.
pub const LEVEL_CEILING: f64 = 100.0;

/// A 2D point in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const ORIGIN: Point2D = Point2D { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Linear interpolation between two points.
    pub fn lerp(a: &Point2D, b: &Point2D, t: f64) -> Point2D {
        let t = t.clamp(0.0, 1.0);
        Point2D {
            x: a.x + (b.x - a.x) * t,
            y: a.y + (b.y - a.y) * t,
        }
    }
}

/// Viewport dimensions in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

impl ViewportSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Map viewport fractions to a pixel position.
    pub fn at_fraction(&self, fx: f64, fy: f64) -> Point2D {
        Point2D::new(fx * self.width, fy * self.height)
    }
}

impl From<ViewportConfig> for ViewportSize {
    fn from(config: ViewportConfig) -> Self {
        Self::new(config.width, config.height)
    }
}

/// The three RGB meter levels, each in `[10, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelLevels {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl ChannelLevels {
    /// Levels for a pointer position within a viewport.
    ///
    /// Red follows x, green follows y and blue follows `x + y` against
    /// `width + height`. A degenerate viewport dimension counts as one
    /// pixel so the ratio stays finite.
    pub fn from_pointer(pointer: Point2D, viewport: ViewportSize) -> Self {
        let width = positive_or_one(viewport.width);
        let height = positive_or_one(viewport.height);
        Self {
            r: level(pointer.x / width),
            g: level(pointer.y / height),
            b: level((pointer.x + pointer.y) / (width + height)),
        }
    }
}

impl Default for ChannelLevels {
    fn default() -> Self {
        Self {
            r: LEVEL_FLOOR,
            g: LEVEL_FLOOR,
            b: LEVEL_FLOOR,
        }
    }
}

fn positive_or_one(v: f64) -> f64 {
    if v > 0.0 {
        v
    } else {
        1.0
    }
}

fn level(ratio: f64) -> f64 {
    let pct = ratio * 100.0;
    if pct.is_nan() {
        return LEVEL_FLOOR;
    }
    pct.clamp(LEVEL_FLOOR, LEVEL_CEILING)
}

//! Two-phase shutter easing.
//!
//! The drive angle starts at the target, eases out to zero over the first
//! phase, then eases back in to the target over the second. The driver
//! publishes one value per frame through a [`DriveSink`] and fires a
//! one-shot completion callback when it settles.

use std::time::Duration;

use frameintro_common::clock::as_millis_f64;
use frameintro_common::config::ShutterConfig;
use frameintro_model::state::{AnimationPhase, DriveFrame};

use crate::ease::{ease_in_cubic, ease_out_cubic, progress};
use crate::sink::DriveSink;

/// Evaluate the drive curve at `elapsed_ms` since the first frame.
///
/// Continuous at the phase boundary (zero from both sides); past the end
/// of the second phase it holds the target.
pub fn drive_at(config: &ShutterConfig, elapsed_ms: f64) -> DriveFrame {
    let phase1 = config.phase1_ms as f64;
    let phase2 = config.phase2_ms as f64;
    let target = config.target_deg;

    let (phase, angle) = if elapsed_ms <= phase1 {
        let t = progress(elapsed_ms, phase1);
        (AnimationPhase::RunningDown, target * (1.0 - ease_out_cubic(t)))
    } else if elapsed_ms <= phase1 + phase2 {
        let t = progress(elapsed_ms - phase1, phase2);
        (AnimationPhase::RunningUp, target * ease_in_cubic(t))
    } else {
        (AnimationPhase::Settled, target)
    };

    DriveFrame {
        phase,
        elapsed_ms,
        drive_angle_deg: angle,
    }
}

/// Total run length of the curve.
pub fn total_duration(config: &ShutterConfig) -> Duration {
    Duration::from_millis(config.phase1_ms + config.phase2_ms)
}

/// Base rotation of each of `blades` blades spaced evenly round the aperture.
pub fn blade_angles(blades: u32) -> Vec<f64> {
    if blades == 0 {
        return Vec::new();
    }
    let step = 360.0 / blades as f64;
    (0..blades).map(|i| step * i as f64).collect()
}

/// What the host should do after delivering a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// A value was written; request another frame.
    Continue,
    /// The final value was written on this frame. Stop requesting frames.
    Settled,
    /// Nothing was written: not started, already settled, or cancelled.
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DriverState {
    Idle,
    /// `started_at` is captured from the first delivered frame.
    Running { started_at: Option<Duration> },
    Settled,
    Cancelled,
}

/// Per-frame driver for the shutter curve.
///
/// The driver is the only writer of the drive angle. A frame delivered
/// after [`cancel`](Self::cancel) is dropped before it touches the sink,
/// which covers callbacks the host queued before teardown.
pub struct FrameEasingDriver<S: DriveSink> {
    config: ShutterConfig,
    sink: S,
    state: DriverState,
    last: Option<DriveFrame>,
    on_settled: Option<Box<dyn FnOnce()>>,
}

impl<S: DriveSink> FrameEasingDriver<S> {
    pub fn new(config: ShutterConfig, sink: S) -> Self {
        Self {
            config,
            sink,
            state: DriverState::Idle,
            last: None,
            on_settled: None,
        }
    }

    /// Register the completion callback. It runs at most once, on the
    /// frame that writes the settled value.
    pub fn on_settled(&mut self, callback: impl FnOnce() + 'static) {
        self.on_settled = Some(Box::new(callback));
    }

    /// Begin the loop. Only an idle driver starts; repeated calls are ignored.
    pub fn start(&mut self) {
        if self.state != DriverState::Idle {
            tracing::trace!(state = ?self.state, "shutter start ignored");
            return;
        }
        tracing::debug!(
            target_deg = self.config.target_deg,
            phase1_ms = self.config.phase1_ms,
            phase2_ms = self.config.phase2_ms,
            "shutter started"
        );
        self.state = DriverState::Running { started_at: None };
    }

    /// Deliver a display frame stamped `timestamp`.
    pub fn frame(&mut self, timestamp: Duration) -> FrameStatus {
        let started_at = match self.state {
            DriverState::Running { started_at } => started_at,
            DriverState::Cancelled => {
                tracing::trace!("frame after cancellation dropped");
                return FrameStatus::Inactive;
            }
            DriverState::Idle | DriverState::Settled => return FrameStatus::Inactive,
        };
        let started_at = started_at.unwrap_or(timestamp);
        self.state = DriverState::Running {
            started_at: Some(started_at),
        };

        let elapsed_ms = as_millis_f64(timestamp.saturating_sub(started_at));
        let frame = drive_at(&self.config, elapsed_ms);
        self.sink.set(frame.drive_angle_deg);
        self.last = Some(frame);

        if frame.phase == AnimationPhase::Settled {
            self.state = DriverState::Settled;
            tracing::debug!(elapsed_ms, "shutter settled");
            if let Some(callback) = self.on_settled.take() {
                callback();
            }
            return FrameStatus::Settled;
        }
        FrameStatus::Continue
    }

    /// Stop the loop. Idempotent; a settled driver stays settled.
    pub fn cancel(&mut self) {
        match self.state {
            DriverState::Idle | DriverState::Running { .. } => {
                tracing::debug!("shutter cancelled");
                self.state = DriverState::Cancelled;
                self.on_settled = None;
            }
            DriverState::Settled | DriverState::Cancelled => {}
        }
    }

    /// Whether the host should keep delivering frames.
    pub fn wants_frame(&self) -> bool {
        matches!(self.state, DriverState::Running { .. })
    }

    pub fn is_settled(&self) -> bool {
        self.state == DriverState::Settled
    }

    pub fn is_cancelled(&self) -> bool {
        self.state == DriverState::Cancelled
    }

    /// The most recently written frame.
    pub fn last_frame(&self) -> Option<DriveFrame> {
        self.last
    }

    /// Current drive angle; the target before the first frame.
    pub fn angle(&self) -> f64 {
        self.last
            .map(|f| f.drive_angle_deg)
            .unwrap_or(self.config.target_deg)
    }

    pub fn config(&self) -> &ShutterConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

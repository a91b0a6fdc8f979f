//! Viewfinder timecode: wall-clock seconds plus a 24-frame counter.
//!
//! Two interval timers drive it, a one-second wall-clock refresh and a
//! frame tick at 24 fps. Both are registered together and cancelled
//! together.

use std::fmt;
use std::time::Duration;

use chrono::NaiveTime;

use crate::timers::{TimerId, TimerQueue};

/// Frame tick period (24 fps).
pub const FRAME_INTERVAL: Duration = Duration::from_micros(41_670);
/// Wall-clock refresh period.
pub const WALL_INTERVAL: Duration = Duration::from_secs(1);
/// Frames per counter cycle.
pub const FRAMES_PER_CYCLE: u32 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HudTick {
    Wall,
    Frame,
}

/// Current timecode reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timecode {
    /// Last wall-clock refresh; blank until the first one.
    pub wall: Option<NaiveTime>,
    /// Frame counter in `0..24`.
    pub frame: u32,
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(wall) = self.wall {
            write!(f, "{}", wall.format("%H:%M:%S"))?;
        }
        write!(f, ":{:02}", self.frame)
    }
}

#[derive(Debug, Default)]
pub struct TimecodeTicker {
    timers: TimerQueue<HudTick>,
    wall_timer: Option<TimerId>,
    frame_timer: Option<TimerId>,
    timecode: Timecode,
}

impl TimecodeTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register both intervals from `now`. Does nothing if already running.
    pub fn start(&mut self, now: Duration) {
        if self.is_running() {
            return;
        }
        self.wall_timer = Some(self.timers.schedule_after(now, WALL_INTERVAL, HudTick::Wall));
        self.frame_timer = Some(
            self.timers
                .schedule_after(now, FRAME_INTERVAL, HudTick::Frame),
        );
        tracing::debug!("timecode started");
    }

    /// Fire due ticks, re-arming each interval from its own due time so
    /// the counter does not drift with the pump rate.
    pub fn advance<W>(&mut self, now: Duration, wall_now: W)
    where
        W: Fn() -> NaiveTime,
    {
        while let Some((id, due, tick)) = self.timers.pop_due(now) {
            match tick {
                HudTick::Wall if Some(id) == self.wall_timer => {
                    self.timecode.wall = Some(wall_now());
                    self.wall_timer = Some(self.timers.schedule_at(due + WALL_INTERVAL, tick));
                }
                HudTick::Frame if Some(id) == self.frame_timer => {
                    self.timecode.frame = (self.timecode.frame + 1) % FRAMES_PER_CYCLE;
                    self.frame_timer = Some(self.timers.schedule_at(due + FRAME_INTERVAL, tick));
                }
                _ => {}
            }
        }
    }

    /// Cancel both intervals. Idempotent.
    pub fn stop(&mut self) {
        let cancelled = self.timers.clear();
        self.wall_timer = None;
        self.frame_timer = None;
        if cancelled > 0 {
            tracing::debug!(cancelled, "timecode stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.wall_timer.is_some() || self.frame_timer.is_some()
    }

    pub fn timecode(&self) -> Timecode {
        self.timecode
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }
}

//! The host lifecycle around the shutter driver and the orchestrator.
//!
//! Mount starts both on one clock; teardown releases every timer and
//! listener either of them acquired. Dropping a session tears it down.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use chrono::NaiveTime;
use serde::Serialize;

use frameintro_common::clock::{as_millis_f64, Clock, ManualClock};
use frameintro_common::config::IntroConfig;
use frameintro_common::error::IntroResult;
use frameintro_model::event::{EventKind, InputEvent};
use frameintro_model::state::{AnimationPhase, OrchestrationState};
use frameintro_model::viewport::{ChannelLevels, Point2D};
use frameintro_motion::{DriveSink, FrameEasingDriver, FrameStatus};

use crate::listeners::ListenerRegistry;
use crate::orchestrator::{Cue, PhaseOrchestrator};
use crate::timecode::TimecodeTicker;

/// Source of the wall-clock time shown in the timecode.
pub type WallSource = Box<dyn Fn() -> NaiveTime>;

type IntroHook = Rc<RefCell<Option<Box<dyn FnOnce()>>>>;

/// What happened during one [`IntroSession::tick`].
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// Clock reading the tick ran at.
    pub at: Duration,
    /// Cues fired since the previous tick, in firing order.
    pub cues: Vec<Cue>,
    /// Outcome of the shutter frame.
    pub frame: FrameStatus,
}

impl TickReport {
    /// Whether the shutter settled on this tick.
    pub fn intro_completed(&self) -> bool {
        self.frame == FrameStatus::Settled
    }
}

/// Everything the rendering collaborator reads in one go.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub at_ms: f64,
    pub state: OrchestrationState,
    pub shutter_mounted: bool,
    pub drive_angle_deg: f64,
    pub drive_phase: Option<AnimationPhase>,
    pub levels: ChannelLevels,
    pub scroll_percent: f64,
    pub indicator: Option<Point2D>,
    pub dock_scale: f64,
    pub timecode: Option<String>,
}

/// One mount-to-teardown lifetime of the intro.
pub struct IntroSession<C: Clock, S: DriveSink> {
    clock: C,
    driver: FrameEasingDriver<S>,
    orchestrator: PhaseOrchestrator,
    listeners: ListenerRegistry,
    hud: TimecodeTicker,
    wall: WallSource,
    intro_hook: IntroHook,
    completions: Rc<Cell<u32>>,
    pending_cues: Vec<Cue>,
    mounted_at: Option<Duration>,
    torn_down: bool,
}

impl<C: Clock, S: DriveSink> IntroSession<C, S> {
    /// Build a session. The configuration is validated first.
    pub fn new(config: &IntroConfig, clock: C, sink: S) -> IntroResult<Self> {
        config.validate()?;
        Ok(Self {
            clock,
            driver: FrameEasingDriver::new(config.shutter, sink),
            orchestrator: PhaseOrchestrator::new(config),
            listeners: ListenerRegistry::new(),
            hud: TimecodeTicker::new(),
            wall: Box::new(|| chrono::Local::now().time()),
            intro_hook: Rc::new(RefCell::new(None)),
            completions: Rc::new(Cell::new(0)),
            pending_cues: Vec::new(),
            mounted_at: None,
            torn_down: false,
        })
    }

    /// Replace the wall-clock source of the timecode.
    pub fn with_wall_clock(mut self, wall: impl Fn() -> NaiveTime + 'static) -> Self {
        self.wall = Box::new(wall);
        self
    }

    /// Register the callback fired exactly once when the shutter settles.
    pub fn on_intro_complete(&mut self, hook: impl FnOnce() + 'static) {
        *self.intro_hook.borrow_mut() = Some(Box::new(hook));
    }

    /// Start the orchestrator and the shutter. A session mounts once.
    pub fn mount(&mut self) {
        if self.mounted_at.is_some() || self.torn_down {
            tracing::debug!("session mount ignored");
            return;
        }
        let now = self.clock.now();
        self.mounted_at = Some(now);

        let completions = self.completions.clone();
        let hook = self.intro_hook.clone();
        self.driver.on_settled(move || {
            completions.set(completions.get() + 1);
            tracing::info!("intro complete");
            if let Some(hook) = hook.borrow_mut().take() {
                hook();
            }
        });

        self.orchestrator.start(now, &mut self.listeners);
        self.driver.start();
        tracing::info!(now_ms = as_millis_f64(now), "session mounted");
    }

    /// Run one host frame: fire due timers, refresh the timecode and
    /// deliver a frame to the shutter while it wants one.
    pub fn tick(&mut self) -> TickReport {
        let now = self.clock.now();
        let mut cues = std::mem::take(&mut self.pending_cues);
        if !self.is_mounted() {
            return TickReport {
                at: now,
                cues,
                frame: FrameStatus::Inactive,
            };
        }

        cues.extend(self.orchestrator.advance(now));

        // The timecode runs from the dismissal itself, not from this frame.
        if let Some(dismissed_at) = self.orchestrator.loader_dismissed_at() {
            if !self.hud.is_running() {
                self.hud.start(dismissed_at);
            }
        }
        let wall = &self.wall;
        self.hud.advance(now, || wall());

        let frame = if self.driver.wants_frame() {
            self.driver.frame(now)
        } else {
            FrameStatus::Inactive
        };

        TickReport { at: now, cues, frame }
    }

    /// Deliver a host event at the current clock reading.
    ///
    /// Timers due before the event fire first. Pointer, scroll and key
    /// events only arrive while their listener is registered.
    pub fn dispatch(&mut self, event: &EventKind) {
        if !self.is_mounted() {
            return;
        }
        let now = self.clock.now();
        let fired = self.orchestrator.advance(now);
        self.pending_cues.extend(fired);

        if let Some(kind) = event.listener_kind() {
            if !self.listeners.is_listening(kind) {
                tracing::trace!(?kind, "no listener registered");
                return;
            }
        }
        self.orchestrator.handle_input(event, now);
    }

    /// Forward a real activation gesture. Safe to call repeatedly.
    pub fn activate(&mut self) -> bool {
        if !self.is_mounted() {
            return false;
        }
        let now = self.clock.now();
        self.orchestrator.activate(now)
    }

    /// Cancel the shutter loop, every timer and every listener. Idempotent.
    pub fn unmount(&mut self) {
        if !self.is_mounted() {
            self.torn_down = true;
            return;
        }
        self.torn_down = true;
        self.driver.cancel();
        self.orchestrator.stop(&mut self.listeners);
        self.hud.stop();
        self.pending_cues.clear();
        tracing::info!(
            leaked_timers = self.pending_timers(),
            leaked_listeners = self.listeners.len(),
            "session unmounted"
        );
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted_at.is_some() && !self.torn_down
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let now = self.clock.now();
        let state = self.orchestrator.snapshot();
        SessionSnapshot {
            at_ms: as_millis_f64(self.since_mount(now)),
            state,
            shutter_mounted: self.shutter_mounted(),
            drive_angle_deg: self.driver.angle(),
            drive_phase: self.driver.last_frame().map(|f| f.phase),
            levels: self.orchestrator.levels(),
            scroll_percent: self.orchestrator.scroll_percent(),
            indicator: self.orchestrator.indicator_position(now),
            dock_scale: self.orchestrator.acknowledgement_scale(now),
            timecode: self
                .hud
                .is_running()
                .then(|| self.hud.timecode().to_string()),
        }
    }

    /// Whether the shutter overlay is still on screen.
    pub fn shutter_mounted(&self) -> bool {
        self.is_mounted() && !self.driver.is_settled()
    }

    /// How many times the completion callback has run.
    pub fn intro_completions(&self) -> u32 {
        self.completions.get()
    }

    /// Timers still pending across the orchestrator and the timecode.
    pub fn pending_timers(&self) -> usize {
        self.orchestrator.pending_timers() + self.hud.pending_timers()
    }

    /// Global listeners still registered.
    pub fn active_listeners(&self) -> usize {
        self.listeners.len()
    }

    pub fn orchestrator(&self) -> &PhaseOrchestrator {
        &self.orchestrator
    }

    pub fn driver(&self) -> &FrameEasingDriver<S> {
        &self.driver
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn since_mount(&self, now: Duration) -> Duration {
        self.mounted_at
            .map(|at| now.saturating_sub(at))
            .unwrap_or_default()
    }
}

impl<S: DriveSink> IntroSession<ManualClock, S> {
    /// Drive the session on its manual clock from the current reading up
    /// to `until` after mount, one frame every `step`.
    ///
    /// Each scripted event is dispatched at its own timestamp (relative
    /// to mount), before the frame at or after it. `observe` sees every
    /// tick.
    pub fn run_script<F>(&mut self, events: &[InputEvent], step: Duration, until: Duration, mut observe: F)
    where
        F: FnMut(&TickReport, &Self),
    {
        let Some(mounted_at) = self.mounted_at else {
            return;
        };
        let step = step.max(Duration::from_millis(1));
        let end = mounted_at + until;
        let mut pending = events.iter().peekable();
        let mut next_frame = self.clock.now();

        while next_frame <= end && self.is_mounted() {
            while let Some(event) =
                pending.next_if(|e| mounted_at + Duration::from_millis(e.timestamp_ms) <= next_frame)
            {
                self.clock
                    .set(mounted_at + Duration::from_millis(event.timestamp_ms));
                self.dispatch(&event.kind);
            }
            self.clock.set(next_frame);
            let report = self.tick();
            observe(&report, self);
            next_frame += step;
        }
    }
}

impl<C: Clock, S: DriveSink> Drop for IntroSession<C, S> {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frameintro_common::clock::millis;
    use frameintro_motion::sink::RecordingSink;

    fn session() -> (IntroSession<ManualClock, RecordingSink>, ManualClock, RecordingSink) {
        let clock = ManualClock::new();
        let log = RecordingSink::new();
        let session = IntroSession::new(&IntroConfig::default(), clock.clone(), log.clone())
            .unwrap()
            .with_wall_clock(|| NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        (session, clock, log)
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = IntroConfig::default();
        config.timings.idle_threshold_ms = 0;
        assert!(IntroSession::new(&config, ManualClock::new(), RecordingSink::new()).is_err());
    }

    #[test]
    fn test_nothing_happens_before_mount() {
        let (mut session, clock, log) = session();
        clock.advance_ms(100);
        let report = session.tick();
        assert_eq!(report.frame, FrameStatus::Inactive);
        assert!(log.is_empty());
        assert!(!session.activate());
        assert_eq!(session.pending_timers(), 0);
    }

    #[test]
    fn test_completion_hook_runs_once() {
        let (mut session, clock, _log) = session();
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        session.on_intro_complete(move || counter.set(counter.get() + 1));
        session.mount();

        for _ in 0..200 {
            session.tick();
            clock.advance_ms(16);
        }
        assert_eq!(hits.get(), 1);
        assert_eq!(session.intro_completions(), 1);
        assert!(!session.shutter_mounted());
    }

    #[test]
    fn test_listener_gate_after_unmount() {
        let (mut session, clock, _log) = session();
        session.mount();
        assert_eq!(session.active_listeners(), 3);
        session.unmount();
        clock.advance_ms(10);
        session.dispatch(&EventKind::PointerMove { x: 1.0, y: 1.0 });
        assert_eq!(session.orchestrator().pointer(), Point2D::ORIGIN);
        assert_eq!(session.active_listeners(), 0);
        assert_eq!(session.pending_timers(), 0);
    }

    #[test]
    fn test_dispatch_fires_overdue_timers_first() {
        let (mut session, clock, _log) = session();
        session.mount();
        clock.set(millis(60_000));
        session.dispatch(&EventKind::Key { code: "KeyA".into() });
        let report = session.tick();
        assert!(report.cues.contains(&Cue::IdleTimeout));
        assert_eq!(session.orchestrator().idle_transitions(), 1);
        assert!(!session.snapshot().state.is_idle());
    }

    #[test]
    fn test_timecode_appears_after_loader() {
        let (mut session, clock, _log) = session();
        session.mount();
        clock.set(millis(3990));
        session.tick();
        assert_eq!(session.snapshot().timecode, None);

        clock.set(millis(4000));
        session.tick();
        clock.set(millis(5000));
        session.tick();
        assert_eq!(session.snapshot().timecode.as_deref(), Some("09:00:00:23"));
    }

    #[test]
    fn test_timecode_counts_from_dismissal_after_a_late_frame() {
        let (mut session, clock, _log) = session();
        session.mount();
        clock.set(millis(3999));
        session.tick();
        clock.set(millis(6000));
        session.tick();
        // 47 frame ticks fit between 4000 and 6000 ms
        assert_eq!(session.snapshot().timecode.as_deref(), Some("09:00:00:23"));
    }

    #[test]
    fn test_snapshot_serializes_for_the_host() {
        let (mut session, clock, _log) = session();
        session.mount();
        session.tick();
        clock.set(millis(1400));
        session.tick();

        let value = serde_json::to_value(session.snapshot()).unwrap();
        assert_eq!(value["state"]["loader_visible"], true);
        assert_eq!(value["drive_phase"], "running_up");
        assert_eq!(value["timecode"], serde_json::Value::Null);
        assert!(value["indicator"]["y"].as_f64().unwrap() > 450.0);
    }

    #[test]
    fn test_mount_twice_is_ignored() {
        let (mut session, _clock, _log) = session();
        session.mount();
        session.mount();
        assert_eq!(session.active_listeners(), 3);
    }
}

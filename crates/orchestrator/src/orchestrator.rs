//! The intro state machine.
//!
//! All timers are armed at mount from one table of delays and race
//! independently; their order is whatever the delays imply. Alongside them
//! runs the simulated pointer sequence, which guarantees an activation
//! even when nobody touches the page, and the idle watchdog, which keeps
//! running for the rest of the session.

use std::time::Duration;

use serde::Serialize;

use frameintro_common::clock::millis;
use frameintro_common::config::{IntroConfig, OrchestratorTimings, PointerScript};
use frameintro_model::event::{EventKind, InputKind};
use frameintro_model::state::{IdleState, OrchestrationState};
use frameintro_model::viewport::{ChannelLevels, Point2D, ViewportSize};
use frameintro_motion::{AckPulse, PointerPath};

use crate::idle::IdleWatchdog;
use crate::listeners::{ListenerId, ListenerRegistry};
use crate::timers::TimerQueue;

/// Timer payloads of the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cue {
    IntroStart,
    AssetsReady,
    LoaderDismiss,
    ExpansionCollapse,
    EnterContent,
    PointerDepart,
    PointerArrive,
    PointerSettle,
    AcknowledgeEnd,
    IdleTimeout,
}

/// Where the simulated pointer indicator is in its sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Indicator {
    Hidden,
    Waiting,
    Travelling { departed_at: Duration },
    Arrived,
}

/// Sequences the intro and classifies the session as active or idle.
///
/// The orchestrator is the only writer of [`OrchestrationState`]. Hosts
/// read it through [`snapshot`](Self::snapshot).
#[derive(Debug)]
pub struct PhaseOrchestrator {
    timings: OrchestratorTimings,
    script: PointerScript,
    state: OrchestrationState,
    timers: TimerQueue<Cue>,
    listeners: Vec<ListenerId>,
    watchdog: IdleWatchdog,
    running: bool,
    viewport: ViewportSize,
    pointer: Point2D,
    scroll_percent: f64,
    indicator: Indicator,
    acknowledging_since: Option<Duration>,
    acknowledgements: u32,
    loader_dismissed_at: Option<Duration>,
}

impl PhaseOrchestrator {
    pub fn new(config: &IntroConfig) -> Self {
        Self {
            timings: config.timings,
            script: config.pointer,
            state: OrchestrationState::default(),
            timers: TimerQueue::new(),
            listeners: Vec::new(),
            watchdog: IdleWatchdog::new(millis(config.timings.idle_threshold_ms)),
            running: false,
            viewport: config.viewport.into(),
            pointer: Point2D::ORIGIN,
            scroll_percent: 0.0,
            indicator: Indicator::Hidden,
            acknowledging_since: None,
            acknowledgements: 0,
            loader_dismissed_at: None,
        }
    }

    /// Mount: arm the timer table, the pointer sequence and the idle
    /// watchdog, and register the input listeners.
    ///
    /// Timers whose effect has already happened in an earlier mount are
    /// not re-armed. Calling `start` while running does nothing.
    pub fn start(&mut self, now: Duration, listeners: &mut ListenerRegistry) {
        if self.running {
            tracing::debug!("orchestrator already running");
            return;
        }
        self.running = true;

        let t = self.timings;
        if !self.state.intro_started {
            self.timers
                .schedule_after(now, millis(t.intro_start_ms), Cue::IntroStart);
        }
        if !self.state.assets_ready {
            self.timers
                .schedule_after(now, millis(t.assets_ready_ms), Cue::AssetsReady);
        }
        if self.state.loader_visible {
            self.timers
                .schedule_after(now, millis(t.loader_dismiss_ms), Cue::LoaderDismiss);
        }
        if !self.state.has_entered_content {
            self.timers.schedule_after(
                now,
                millis(t.expansion_collapse_ms),
                Cue::ExpansionCollapse,
            );
            self.timers
                .schedule_after(now, millis(t.enter_content_ms), Cue::EnterContent);
        }
        if self.script.enabled && !self.state.activation_consumed {
            self.indicator = Indicator::Waiting;
            self.timers
                .schedule_after(now, millis(self.script.delay_ms), Cue::PointerDepart);
        }

        for kind in InputKind::ALL {
            self.listeners.push(listeners.register(kind));
        }
        self.watchdog.arm(now, &mut self.timers);

        tracing::info!(
            pending_timers = self.timers.len(),
            listeners = self.listeners.len(),
            "orchestrator started"
        );
    }

    /// Teardown: cancel every timer and remove every listener. Idempotent.
    pub fn stop(&mut self, listeners: &mut ListenerRegistry) {
        if !self.running {
            return;
        }
        self.running = false;
        self.watchdog.disarm(&mut self.timers);
        let cancelled = self.timers.clear();
        let mut removed = 0;
        for id in self.listeners.drain(..) {
            if listeners.remove(id) {
                removed += 1;
            }
        }
        // An acknowledgement cut short still counts as completed.
        if self.acknowledging_since.take().is_some() && !self.state.has_entered_content {
            self.state.content_expanded = true;
        }
        if self.indicator != Indicator::Arrived {
            self.indicator = Indicator::Hidden;
        }
        tracing::info!(cancelled, removed, "orchestrator stopped");
    }

    /// Fire every timer due at or before `now`, in due order. Returns the
    /// cues that fired.
    pub fn advance(&mut self, now: Duration) -> Vec<Cue> {
        let mut fired = Vec::new();
        if !self.running {
            return fired;
        }
        while let Some((id, due, cue)) = self.timers.pop_due(now) {
            match cue {
                Cue::IdleTimeout => {
                    if !self.watchdog.expire(id, due) {
                        continue;
                    }
                }
                other => self.fire(other, due),
            }
            tracing::debug!(?cue, due_ms = due.as_millis() as u64, "cue fired");
            fired.push(cue);
        }
        fired
    }

    fn fire(&mut self, cue: Cue, due: Duration) {
        match cue {
            Cue::IntroStart => self.state.intro_started = true,
            Cue::AssetsReady => self.state.assets_ready = true,
            Cue::LoaderDismiss => {
                self.state.loader_visible = false;
                self.loader_dismissed_at = Some(due);
            }
            Cue::ExpansionCollapse => self.state.content_expanded = false,
            Cue::EnterContent => {
                self.state.has_entered_content = true;
                self.indicator = Indicator::Hidden;
            }
            Cue::PointerDepart => {
                self.indicator = Indicator::Travelling { departed_at: due };
                self.timers.schedule_after(
                    due,
                    millis(self.script.travel_ms),
                    Cue::PointerArrive,
                );
            }
            Cue::PointerArrive => {
                self.indicator = Indicator::Arrived;
                self.timers
                    .schedule_after(due, millis(self.script.settle_ms), Cue::PointerSettle);
            }
            Cue::PointerSettle => {
                if !self.state.activation_consumed {
                    tracing::info!("no activation received, synthesising one");
                    self.begin_activation(due);
                }
            }
            Cue::AcknowledgeEnd => {
                self.acknowledging_since = None;
                if !self.state.has_entered_content {
                    self.state.content_expanded = true;
                }
            }
            Cue::IdleTimeout => {}
        }
    }

    /// Process an activation gesture. Only the first call has any effect;
    /// returns whether this call was the one processed.
    pub fn activate(&mut self, now: Duration) -> bool {
        if !self.running {
            tracing::debug!("activation ignored while stopped");
            return false;
        }
        if self.state.activation_consumed {
            tracing::trace!("activation already consumed");
            return false;
        }
        self.begin_activation(now);
        true
    }

    fn begin_activation(&mut self, now: Duration) {
        self.state.activation_consumed = true;
        self.acknowledgements += 1;
        self.acknowledging_since = Some(now);
        self.timers.schedule_after(
            now,
            millis(self.timings.acknowledge_ms),
            Cue::AcknowledgeEnd,
        );
        tracing::info!(now_ms = now.as_millis() as u64, "activation consumed");
    }

    /// Deliver an input event received through one of the registered
    /// listeners.
    pub fn handle_input(&mut self, event: &EventKind, now: Duration) {
        if !self.running {
            return;
        }
        match event {
            EventKind::PointerMove { x, y } => self.pointer = Point2D::new(*x, *y),
            EventKind::Scroll { progress } => self.scroll_percent = progress.clamp(0.0, 1.0),
            EventKind::Key { .. } => {}
            EventKind::Activate => {
                self.activate(now);
                return;
            }
            EventKind::Resize { width, height } => {
                self.resize(ViewportSize::new(*width, *height));
                return;
            }
        }
        self.watchdog.record_activity(now, &mut self.timers);
    }

    /// Update the viewport used for level normalisation.
    pub fn resize(&mut self, viewport: ViewportSize) {
        self.viewport = viewport;
    }

    pub fn snapshot(&self) -> OrchestrationState {
        OrchestrationState {
            idle: self.watchdog.state(),
            ..self.state
        }
    }

    /// RGB meter levels for the last known pointer position.
    pub fn levels(&self) -> ChannelLevels {
        ChannelLevels::from_pointer(self.pointer, self.viewport)
    }

    pub fn pointer(&self) -> Point2D {
        self.pointer
    }

    pub fn scroll_percent(&self) -> f64 {
        self.scroll_percent
    }

    pub fn viewport(&self) -> ViewportSize {
        self.viewport
    }

    /// Position of the simulated pointer indicator, while it is shown.
    pub fn indicator_position(&self, now: Duration) -> Option<Point2D> {
        let path = PointerPath::from_script(&self.script, self.viewport);
        match self.indicator {
            Indicator::Hidden => None,
            Indicator::Waiting => Some(path.from),
            Indicator::Travelling { departed_at } => {
                Some(path.position_at(now.saturating_sub(departed_at)))
            }
            Indicator::Arrived => Some(path.to),
        }
    }

    /// Scale of the dock anchor; below 1.0 only during an acknowledgement.
    pub fn acknowledgement_scale(&self, now: Duration) -> f64 {
        match self.acknowledging_since {
            Some(since) => AckPulse::new(millis(self.timings.acknowledge_ms))
                .scale_at(now.saturating_sub(since)),
            None => 1.0,
        }
    }

    /// Due time of the loader-dismiss cue, once it has fired.
    pub fn loader_dismissed_at(&self) -> Option<Duration> {
        self.loader_dismissed_at
    }

    /// How many acknowledgement motions have been played.
    pub fn acknowledgements(&self) -> u32 {
        self.acknowledgements
    }

    pub fn idle_state(&self) -> IdleState {
        self.watchdog.state()
    }

    pub fn idle_transitions(&self) -> u32 {
        self.watchdog.idle_transitions()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn registered_listeners(&self) -> usize {
        self.listeners.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frameintro_common::config::IntroVariant;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn started(config: &IntroConfig) -> (PhaseOrchestrator, ListenerRegistry) {
        let mut listeners = ListenerRegistry::new();
        let mut orch = PhaseOrchestrator::new(config);
        orch.start(ms(0), &mut listeners);
        (orch, listeners)
    }

    #[test]
    fn test_start_arms_table_and_listeners() {
        let (orch, listeners) = started(&IntroConfig::default());
        // five table cues, pointer departure, idle countdown
        assert_eq!(orch.pending_timers(), 7);
        assert_eq!(listeners.len(), 3);
        for kind in InputKind::ALL {
            assert!(listeners.is_listening(kind));
        }
    }

    #[test]
    fn test_timer_table_effects() {
        let (mut orch, _listeners) = started(&IntroConfig::default());

        orch.advance(ms(799));
        assert!(!orch.snapshot().intro_started);
        orch.advance(ms(800));
        assert!(orch.snapshot().intro_started);

        orch.advance(ms(2999));
        assert!(!orch.snapshot().assets_ready);
        orch.advance(ms(3000));
        let s = orch.snapshot();
        assert!(s.assets_ready && s.loader_visible);

        orch.advance(ms(4000));
        assert!(!orch.snapshot().loader_visible);
        assert_eq!(orch.loader_dismissed_at(), Some(ms(4000)));

        orch.advance(ms(4999));
        assert!(!orch.snapshot().has_entered_content);
        orch.advance(ms(5000));
        assert!(orch.snapshot().has_entered_content);
    }

    #[test]
    fn test_simulated_activation_without_input() {
        let (mut orch, _listeners) = started(&IntroConfig::default());

        let fired = orch.advance(ms(2299));
        assert!(fired.contains(&Cue::PointerDepart));
        assert!(fired.contains(&Cue::PointerArrive));
        assert!(!orch.snapshot().activation_consumed);

        let fired = orch.advance(ms(2300));
        assert_eq!(fired, vec![Cue::PointerSettle]);
        assert!(orch.snapshot().activation_consumed);
        assert!(!orch.snapshot().content_expanded);

        orch.advance(ms(2400));
        assert!(orch.snapshot().content_expanded);
        assert_eq!(orch.acknowledgements(), 1);

        orch.advance(ms(4800));
        assert!(!orch.snapshot().content_expanded);
    }

    #[test]
    fn test_real_activation_preempts_synthetic() {
        let (mut orch, _listeners) = started(&IntroConfig::default());
        orch.advance(ms(1000));
        assert!(orch.activate(ms(1000)));
        orch.advance(ms(3000));
        assert_eq!(orch.acknowledgements(), 1);
        assert!(orch.snapshot().content_expanded);
    }

    #[test]
    fn test_double_activation_is_one_acknowledgement() {
        let (mut orch, _listeners) = started(&IntroConfig::default());
        assert!(orch.activate(ms(10)));
        assert!(!orch.activate(ms(10)));
        assert!(orch.snapshot().activation_consumed);
        assert_eq!(orch.acknowledgements(), 1);
        assert!(orch.acknowledgement_scale(ms(60)) < 1.0);
        orch.advance(ms(110));
        assert_eq!(orch.acknowledgement_scale(ms(200)), 1.0);
    }

    #[test]
    fn test_indicator_travels_to_anchor() {
        let (mut orch, _listeners) = started(&IntroConfig::default());
        let vp = orch.viewport();
        assert_eq!(orch.indicator_position(ms(0)), Some(vp.at_fraction(0.5, 0.5)));

        orch.advance(ms(1400));
        let mid = orch.indicator_position(ms(1400)).unwrap();
        assert!((mid.y - vp.at_fraction(0.5, 0.71).y).abs() < 1e-6);

        orch.advance(ms(2000));
        assert_eq!(orch.indicator_position(ms(2000)), Some(vp.at_fraction(0.5, 0.92)));

        orch.advance(ms(5000));
        assert_eq!(orch.indicator_position(ms(5000)), None);
    }

    #[test]
    fn test_pointer_disabled_never_activates() {
        let mut config = IntroConfig::default();
        config.pointer.enabled = false;
        let (mut orch, _listeners) = started(&config);
        assert_eq!(orch.pending_timers(), 6);
        orch.advance(ms(10_000));
        assert!(!orch.snapshot().activation_consumed);
        assert_eq!(orch.indicator_position(ms(10_000)), None);
    }

    #[test]
    fn test_input_keeps_session_active() {
        let (mut orch, _listeners) = started(&IntroConfig::default());
        orch.advance(ms(59_000));
        orch.handle_input(&EventKind::PointerMove { x: 10.0, y: 10.0 }, ms(59_000));
        orch.advance(ms(60_000));
        assert_eq!(orch.idle_state(), IdleState::Active);
        orch.advance(ms(119_000));
        assert_eq!(orch.idle_state(), IdleState::Idle);
        assert_eq!(orch.idle_transitions(), 1);
    }

    #[test]
    fn test_activation_and_resize_are_not_activity() {
        let config = IntroConfig::for_variant(IntroVariant::Simple);
        let (mut orch, _listeners) = started(&config);
        orch.handle_input(&EventKind::Resize { width: 100.0, height: 100.0 }, ms(29_000));
        orch.handle_input(&EventKind::Activate, ms(29_500));
        orch.advance(ms(30_000));
        assert_eq!(orch.idle_state(), IdleState::Idle);
        assert_eq!(orch.viewport(), ViewportSize::new(100.0, 100.0));
    }

    #[test]
    fn test_scroll_is_clamped_and_counts_as_activity() {
        let (mut orch, _listeners) = started(&IntroConfig::default());
        orch.handle_input(&EventKind::Scroll { progress: 1.4 }, ms(50_000));
        assert_eq!(orch.scroll_percent(), 1.0);
        orch.advance(ms(60_000));
        assert_eq!(orch.idle_state(), IdleState::Active);
    }

    #[test]
    fn test_stop_releases_everything() {
        let (mut orch, mut listeners) = started(&IntroConfig::default());
        orch.advance(ms(1000));
        orch.stop(&mut listeners);
        assert_eq!(orch.pending_timers(), 0);
        assert!(listeners.is_empty());
        assert!(orch.advance(ms(100_000)).is_empty());
        assert!(!orch.activate(ms(100_000)));

        orch.stop(&mut listeners);
        assert!(!orch.is_running());
    }

    #[test]
    fn test_remount_does_not_rearm_finished_cues() {
        let (mut orch, mut listeners) = started(&IntroConfig::default());
        orch.advance(ms(6000));
        orch.stop(&mut listeners);

        orch.start(ms(10_000), &mut listeners);
        // only the idle countdown is left to arm
        assert_eq!(orch.pending_timers(), 1);
        assert_eq!(listeners.len(), 3);
        let s = orch.snapshot();
        assert!(s.intro_started && s.has_entered_content && s.activation_consumed);
    }

    #[test]
    fn test_stop_mid_acknowledgement_completes_it() {
        let (mut orch, mut listeners) = started(&IntroConfig::default());
        orch.activate(ms(100));
        orch.stop(&mut listeners);
        assert!(orch.snapshot().content_expanded);
        assert_eq!(orch.acknowledgement_scale(ms(150)), 1.0);
    }

    #[test]
    fn test_loader_dismissal_keeps_its_due_time_when_late() {
        let (mut orch, _listeners) = started(&IntroConfig::default());
        orch.advance(ms(3999));
        assert_eq!(orch.loader_dismissed_at(), None);
        orch.advance(ms(6000));
        assert_eq!(orch.loader_dismissed_at(), Some(ms(4000)));
    }

    #[test]
    fn test_input_while_stopped_is_dropped() {
        let mut orch = PhaseOrchestrator::new(&IntroConfig::default());
        orch.handle_input(&EventKind::PointerMove { x: 500.0, y: 500.0 }, ms(0));
        assert_eq!(orch.pointer(), Point2D::ORIGIN);
        assert_eq!(orch.pending_timers(), 0);
    }
}

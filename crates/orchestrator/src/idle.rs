//! Idle detection over qualifying input.
//!
//! Every qualifying event supersedes the pending countdown with a fresh
//! one. Expiry marks the session idle; the next event makes it active
//! again and starts a new countdown, for as long as the watchdog is armed.

use std::time::Duration;

use frameintro_model::state::IdleState;

use crate::orchestrator::Cue;
use crate::timers::{TimerId, TimerQueue};

#[derive(Debug)]
pub struct IdleWatchdog {
    threshold: Duration,
    timer: Option<TimerId>,
    armed: bool,
    last_activity: Duration,
    state: IdleState,
    idle_transitions: u32,
}

impl IdleWatchdog {
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            timer: None,
            armed: false,
            last_activity: Duration::ZERO,
            state: IdleState::Active,
            idle_transitions: 0,
        }
    }

    /// Start watching from `now`, counting mount as activity.
    pub fn arm(&mut self, now: Duration, timers: &mut TimerQueue<Cue>) {
        self.armed = true;
        self.restart(now, timers);
    }

    /// Record a qualifying event. Returns true if this ended an idle spell.
    pub fn record_activity(&mut self, now: Duration, timers: &mut TimerQueue<Cue>) -> bool {
        if !self.armed {
            return false;
        }
        let woke = self.state == IdleState::Idle;
        self.restart(now, timers);
        if woke {
            tracing::debug!(now_ms = now.as_millis() as u64, "session active again");
        }
        woke
    }

    /// Handle a fired [`Cue::IdleTimeout`]. Returns true if the session
    /// just went idle.
    pub fn expire(&mut self, id: TimerId, due: Duration) -> bool {
        if self.timer != Some(id) {
            tracing::trace!(?id, "stale idle timer ignored");
            return false;
        }
        self.timer = None;
        if self.state == IdleState::Idle {
            return false;
        }
        self.state = IdleState::Idle;
        self.idle_transitions += 1;
        tracing::debug!(
            due_ms = due.as_millis() as u64,
            quiet_ms = due.saturating_sub(self.last_activity).as_millis() as u64,
            "session idle"
        );
        true
    }

    /// Stop watching and cancel the countdown. Idempotent.
    pub fn disarm(&mut self, timers: &mut TimerQueue<Cue>) {
        if let Some(id) = self.timer.take() {
            timers.cancel(id);
        }
        self.armed = false;
    }

    fn restart(&mut self, now: Duration, timers: &mut TimerQueue<Cue>) {
        if let Some(id) = self.timer.take() {
            timers.cancel(id);
        }
        self.last_activity = now;
        self.state = IdleState::Active;
        self.timer = Some(timers.schedule_after(now, self.threshold, Cue::IdleTimeout));
    }

    pub fn state(&self) -> IdleState {
        self.state
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    pub fn last_activity(&self) -> Duration {
        self.last_activity
    }

    /// When the pending countdown will expire, if one is pending.
    pub fn deadline(&self) -> Option<Duration> {
        self.timer.map(|_| self.last_activity + self.threshold)
    }

    /// How many times the session has gone idle.
    pub fn idle_transitions(&self) -> u32 {
        self.idle_transitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    /// Fire every idle timer due by `now`.
    fn pump(dog: &mut IdleWatchdog, timers: &mut TimerQueue<Cue>, now: Duration) {
        while let Some((id, due, cue)) = timers.pop_due(now) {
            assert_eq!(cue, Cue::IdleTimeout);
            dog.expire(id, due);
        }
    }

    #[test]
    fn test_goes_idle_after_threshold() {
        let mut timers = TimerQueue::new();
        let mut dog = IdleWatchdog::new(ms(60_000));
        dog.arm(ms(0), &mut timers);

        pump(&mut dog, &mut timers, ms(59_999));
        assert_eq!(dog.state(), IdleState::Active);

        pump(&mut dog, &mut timers, ms(60_000));
        assert_eq!(dog.state(), IdleState::Idle);
        assert_eq!(dog.idle_transitions(), 1);

        pump(&mut dog, &mut timers, ms(600_000));
        assert_eq!(dog.idle_transitions(), 1);
    }

    #[test]
    fn test_activity_supersedes_countdown() {
        let mut timers = TimerQueue::new();
        let mut dog = IdleWatchdog::new(ms(30_000));
        dog.arm(ms(0), &mut timers);

        dog.record_activity(ms(20_000), &mut timers);
        assert_eq!(timers.len(), 1);
        assert_eq!(dog.deadline(), Some(ms(50_000)));

        pump(&mut dog, &mut timers, ms(49_999));
        assert_eq!(dog.state(), IdleState::Active);
        pump(&mut dog, &mut timers, ms(50_000));
        assert_eq!(dog.state(), IdleState::Idle);
    }

    #[test]
    fn test_activity_wakes_and_rearms() {
        let mut timers = TimerQueue::new();
        let mut dog = IdleWatchdog::new(ms(1000));
        dog.arm(ms(0), &mut timers);
        pump(&mut dog, &mut timers, ms(1000));
        assert_eq!(dog.state(), IdleState::Idle);

        assert!(dog.record_activity(ms(1500), &mut timers));
        assert_eq!(dog.state(), IdleState::Active);
        pump(&mut dog, &mut timers, ms(2500));
        assert_eq!(dog.state(), IdleState::Idle);
        assert_eq!(dog.idle_transitions(), 2);
    }

    #[test]
    fn test_stale_timer_is_ignored() {
        let mut timers = TimerQueue::new();
        let mut dog = IdleWatchdog::new(ms(1000));
        dog.arm(ms(0), &mut timers);
        let stale = timers.schedule_at(ms(10), Cue::IdleTimeout);
        assert!(!dog.expire(stale, ms(10)));
        assert_eq!(dog.state(), IdleState::Active);
    }

    #[test]
    fn test_disarm_cancels_and_ignores_activity() {
        let mut timers = TimerQueue::new();
        let mut dog = IdleWatchdog::new(ms(1000));
        dog.arm(ms(0), &mut timers);
        dog.disarm(&mut timers);
        assert!(timers.is_empty());
        assert!(!dog.record_activity(ms(10), &mut timers));
        assert!(timers.is_empty());
        dog.disarm(&mut timers);
        assert!(!dog.is_armed());
    }

    proptest! {
        #[test]
        fn never_idle_while_gaps_stay_under_threshold(gaps in proptest::collection::vec(1u64..60_000, 1..40)) {
            let mut timers = TimerQueue::new();
            let mut dog = IdleWatchdog::new(ms(60_000));
            dog.arm(ms(0), &mut timers);

            let mut now = 0;
            for gap in gaps {
                now += gap;
                pump(&mut dog, &mut timers, ms(now - 1));
                prop_assert_eq!(dog.state(), IdleState::Active);
                dog.record_activity(ms(now), &mut timers);
                prop_assert_eq!(timers.len(), 1);
            }
            pump(&mut dog, &mut timers, ms(now + 60_000));
            prop_assert_eq!(dog.state(), IdleState::Idle);
            prop_assert_eq!(dog.idle_transitions(), 1);
        }
    }
}

use std::cell::Cell;
use std::rc::Rc;

use frameintro_common::clock::ManualClock;
use frameintro_common::config::IntroConfig;
use frameintro_model::event::EventKind;
use frameintro_motion::sink::RecordingSink;
use frameintro_motion::FrameStatus;
use frameintro_orchestrator::IntroSession;

fn mounted() -> (IntroSession<ManualClock, RecordingSink>, ManualClock, RecordingSink) {
    let clock = ManualClock::new();
    let log = RecordingSink::new();
    let mut session = IntroSession::new(&IntroConfig::default(), clock.clone(), log.clone()).unwrap();
    session.mount();
    (session, clock, log)
}

#[test]
fn unmount_releases_everything_at_any_point() {
    for stop_at in [0, 500, 1000, 2350, 4100, 5000, 70_000] {
        let (mut session, clock, _log) = mounted();
        let mut t = 0;
        while t <= stop_at {
            clock.set_ms(t);
            session.tick();
            t += 16;
        }
        assert!(session.pending_timers() > 0, "stop at {stop_at}");

        session.unmount();
        assert_eq!(session.pending_timers(), 0, "stop at {stop_at}");
        assert_eq!(session.active_listeners(), 0, "stop at {stop_at}");

        session.unmount();
        assert_eq!(session.pending_timers(), 0);
    }
}

#[test]
fn unmount_before_settle_suppresses_writes_and_completion() {
    let (mut session, clock, log) = mounted();
    let completed = Rc::new(Cell::new(false));
    let flag = completed.clone();
    session.on_intro_complete(move || flag.set(true));

    for t in (0..=1000).step_by(16) {
        clock.set_ms(t);
        session.tick();
    }
    let writes = log.len();
    session.unmount();

    for t in (1016..=3000).step_by(16) {
        clock.set_ms(t);
        assert_eq!(session.tick().frame, FrameStatus::Inactive);
    }
    assert_eq!(log.len(), writes);
    assert!(!completed.get());
    assert_eq!(session.intro_completions(), 0);
    assert!(session.driver().is_cancelled());
}

#[test]
fn unmounted_session_ignores_input_and_activation() {
    let (mut session, clock, _log) = mounted();
    session.unmount();
    clock.set_ms(100);
    session.dispatch(&EventKind::PointerMove { x: 10.0, y: 10.0 });
    assert!(!session.activate());
    assert!(!session.snapshot().state.activation_consumed);
    assert_eq!(session.pending_timers(), 0);
}

#[test]
fn unmount_after_settle_leaves_completion_intact() {
    let (mut session, clock, log) = mounted();
    for t in (0..=2000).step_by(16) {
        clock.set_ms(t);
        session.tick();
    }
    assert_eq!(session.intro_completions(), 1);
    session.unmount();
    assert!(session.driver().is_settled());
    assert_eq!(log.last(), Some(40.0));
}

#[test]
fn dropping_a_mounted_session_is_teardown() {
    let log = RecordingSink::new();
    let clock = ManualClock::new();
    {
        let mut session =
            IntroSession::new(&IntroConfig::default(), clock.clone(), log.clone()).unwrap();
        session.mount();
        clock.set_ms(16);
        session.tick();
    }
    assert_eq!(log.len(), 1);
}

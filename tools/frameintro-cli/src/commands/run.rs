//! Pump the intro in real time.

use std::path::PathBuf;
use std::time::Duration;

use frameintro_common::clock::{as_millis_f64, millis, Clock, MonotonicClock, RateController};
use frameintro_common::config::IntroConfig;
use frameintro_motion::sink::SharedDrive;
use frameintro_orchestrator::IntroSession;
use tokio::time::MissedTickBehavior;

pub async fn run(
    config: IntroConfig,
    script: Option<PathBuf>,
    fps: u32,
    status_hz: u32,
    duration_ms: Option<u64>,
) -> anyhow::Result<()> {
    let events = super::load_script(script.as_deref())?;

    let clock = MonotonicClock::start();
    let drive = SharedDrive::new(config.shutter.target_deg);
    let mut session = IntroSession::new(&config, clock, drive.clone())?;

    let mut frames = tokio::time::interval(Duration::from_secs_f64(1.0 / fps.max(1) as f64));
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut status = RateController::new(status_hz);
    let deadline = duration_ms.map(millis);
    let mut pending = events.iter().peekable();

    println!("Running intro ({:?}) at {fps} fps", config.variant);
    println!("  Started: {}", session.clock().epoch_wall());
    println!("Press Ctrl+C to stop...");
    println!();

    session.mount();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = frames.tick() => {}
            result = &mut ctrl_c => {
                result?;
                println!();
                break;
            }
        }

        let now = session.clock().now();
        while let Some(event) = pending.next_if(|e| millis(e.timestamp_ms) <= now) {
            session.dispatch(&event.kind);
        }

        let report = session.tick();
        let at_ms = as_millis_f64(report.at);
        for cue in &report.cues {
            println!("[{at_ms:>9.1} ms] cue {cue:?}");
        }
        if report.intro_completed() {
            let (property, value) = drive.css_property();
            println!("[{at_ms:>9.1} ms] shutter settled ({property}: {value})");
        }

        if status.should_tick(now) {
            let snapshot = session.snapshot();
            println!(
                "[{at_ms:>9.1} ms] drive {:>6.2} deg | loader {} | expanded {} | {:?} | rgb {:.0}/{:.0}/{:.0} | {}",
                snapshot.drive_angle_deg,
                snapshot.state.loader_visible,
                snapshot.state.content_expanded,
                snapshot.state.idle,
                snapshot.levels.r,
                snapshot.levels.g,
                snapshot.levels.b,
                snapshot.timecode.as_deref().unwrap_or("--")
            );
        }

        if deadline.is_some_and(|d| now >= d) {
            break;
        }
    }

    session.unmount();
    println!(
        "Stopped: {} timer(s), {} listener(s) left after teardown",
        session.pending_timers(),
        session.active_listeners()
    );

    Ok(())
}

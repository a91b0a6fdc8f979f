//! Replay the intro on a simulated clock.

use std::path::PathBuf;

use frameintro_common::clock::{as_millis_f64, millis, ManualClock};
use frameintro_common::config::IntroConfig;
use frameintro_motion::sink::SharedDrive;
use frameintro_orchestrator::{IntroSession, SessionSnapshot};
use serde_json::json;

pub fn run(
    config: IntroConfig,
    script: Option<PathBuf>,
    duration_ms: u64,
    step_ms: u64,
    json: bool,
) -> anyhow::Result<()> {
    let events = super::load_script(script.as_deref())?;

    if !json {
        println!("Simulating intro ({:?})", config.variant);
        println!("  Duration: {duration_ms} ms");
        println!("  Frame step: {step_ms} ms");
        println!("  Scripted events: {}", events.len());
        println!();
    }

    let clock = ManualClock::new();
    let drive = SharedDrive::new(config.shutter.target_deg);
    let mut session = IntroSession::new(&config, clock, drive.clone())?;
    session.mount();

    let mut previous: SessionSnapshot = session.snapshot();
    session.run_script(&events, millis(step_ms), millis(duration_ms), |report, s| {
        let at_ms = as_millis_f64(report.at);
        let snapshot = s.snapshot();

        for cue in &report.cues {
            if json {
                println!("{}", json!({ "at_ms": at_ms, "cue": cue }));
            } else {
                println!("[{at_ms:>9.1} ms] cue {cue:?}");
            }
        }
        if report.intro_completed() {
            let (property, value) = drive.css_property();
            if json {
                println!("{}", json!({ "at_ms": at_ms, "shutter": "settled", "drive": value }));
            } else {
                println!("[{at_ms:>9.1} ms] shutter settled ({property}: {value})");
            }
        }
        if snapshot.state.idle != previous.state.idle {
            if json {
                println!("{}", json!({ "at_ms": at_ms, "idle": snapshot.state.idle }));
            } else {
                println!("[{at_ms:>9.1} ms] session {:?}", snapshot.state.idle);
            }
        }
        previous = snapshot;
    });

    let snapshot = session.snapshot();
    let completions = session.intro_completions();
    session.unmount();
    let leaked_timers = session.pending_timers();
    let leaked_listeners = session.active_listeners();

    if json {
        println!(
            "{}",
            json!({
                "final": snapshot,
                "intro_completions": completions,
                "leaked_timers": leaked_timers,
                "leaked_listeners": leaked_listeners,
            })
        );
    } else {
        let state = &snapshot.state;
        println!();
        println!("Final state at {:.1} ms:", snapshot.at_ms);
        println!("  Drive angle: {:.2} deg", snapshot.drive_angle_deg);
        println!("  Intro completions: {completions}");
        println!("  Loader visible: {}", state.loader_visible);
        println!("  Entered content: {}", state.has_entered_content);
        println!("  Activation consumed: {}", state.activation_consumed);
        println!("  Idle: {:?}", state.idle);
        println!(
            "  Levels: r={:.1} g={:.1} b={:.1}",
            snapshot.levels.r, snapshot.levels.g, snapshot.levels.b
        );
        if let Some(timecode) = &snapshot.timecode {
            println!("  Timecode: {timecode}");
        }
        println!("  After teardown: {leaked_timers} timer(s), {leaked_listeners} listener(s)");
    }

    Ok(())
}

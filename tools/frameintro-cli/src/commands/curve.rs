//! Sample the shutter drive curve.

use frameintro_common::config::ShutterConfig;
use frameintro_motion::shutter::{blade_angles, drive_at, total_duration};
use frameintro_motion::sink::css_drive_value;

const BAR_WIDTH: usize = 40;

pub fn run(step_ms: u64, target: Option<f64>, json: bool) -> anyhow::Result<()> {
    let mut config = ShutterConfig::default();
    if let Some(target) = target {
        if !target.is_finite() || target <= 0.0 {
            anyhow::bail!("Target angle must be positive, got {target}");
        }
        config.target_deg = target;
    }

    let step = step_ms.max(1);
    let end = total_duration(&config).as_millis() as u64 + step;
    let frames: Vec<_> = (0..=end)
        .step_by(step as usize)
        .map(|ms| drive_at(&config, ms as f64))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&frames)?);
        return Ok(());
    }

    println!(
        "Shutter curve: {} deg, {} ms down, {} ms up",
        config.target_deg, config.phase1_ms, config.phase2_ms
    );
    let blades: Vec<String> = blade_angles(config.blades)
        .iter()
        .map(|a| format!("{a:.1}"))
        .collect();
    println!("  Blade base angles: {}", blades.join(", "));
    println!();

    for frame in &frames {
        let filled = ((frame.drive_angle_deg / config.target_deg) * BAR_WIDTH as f64).round() as usize;
        println!(
            "{:>7.0} ms  {:<11}  {:>9}  {}",
            frame.elapsed_ms,
            format!("{:?}", frame.phase),
            css_drive_value(frame.drive_angle_deg),
            "#".repeat(filled.min(BAR_WIDTH))
        );
    }

    Ok(())
}

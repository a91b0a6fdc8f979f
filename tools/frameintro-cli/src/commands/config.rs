//! Show, create, or validate the config file.

use std::path::PathBuf;

use frameintro_common::config::{config_file_path, IntroConfig, IntroVariant};

pub fn show(config: &IntroConfig) -> anyhow::Result<()> {
    println!("# {}", config_file_path().display());
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

pub fn init(output: Option<PathBuf>, variant: IntroVariant, force: bool) -> anyhow::Result<()> {
    let path = output.unwrap_or_else(config_file_path);
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    let config = IntroConfig::for_variant(variant);
    config.save_to(&path)?;
    println!("Wrote {variant:?} config to: {}", path.display());
    Ok(())
}

pub fn validate(path: Option<PathBuf>) -> anyhow::Result<()> {
    let path = path.unwrap_or_else(config_file_path);
    println!("Validating config at: {}", path.display());

    let config = IntroConfig::from_path(&path)
        .map_err(|e| anyhow::anyhow!("Invalid config: {e}"))?;

    let t = &config.timings;
    println!("  Variant: {:?}", config.variant);
    println!(
        "  Shutter: {} deg over {} + {} ms",
        config.shutter.target_deg, config.shutter.phase1_ms, config.shutter.phase2_ms
    );
    println!(
        "  Cues: intro-start {} ms, assets-ready {} ms, loader {} ms, collapse {} ms, enter {} ms",
        t.intro_start_ms,
        t.assets_ready_ms,
        t.loader_dismiss_ms,
        t.expansion_collapse_ms,
        t.enter_content_ms
    );
    if config.pointer.enabled {
        println!(
            "  Simulated activation at {} ms",
            config.pointer.activation_at_ms()
        );
    }
    println!("  Idle threshold: {} ms", t.idle_threshold_ms);
    println!("\nConfig is valid.");
    Ok(())
}

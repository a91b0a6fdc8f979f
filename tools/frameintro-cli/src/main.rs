//! frameintro CLI: drive the first-visit intro outside a browser.
//!
//! Usage:
//!   frameintro simulate [OPTIONS]    Replay the intro on a simulated clock
//!   frameintro curve [OPTIONS]       Sample the shutter drive curve
//!   frameintro config <ACTION>       Show, create, or validate the config file
//!   frameintro run [OPTIONS]         Pump the intro in real time

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use frameintro_common::config::{IntroVariant, LoggingConfig};

mod commands;

#[derive(Parser)]
#[command(
    name = "frameintro",
    about = "Shutter easing and intro choreography for first-visit landing pages",
    version,
    author
)]
struct Cli {
    /// Log the intro's timers and frames at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Timing preset selectable on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum VariantArg {
    SimulatedPointer,
    Simple,
}

impl From<VariantArg> for IntroVariant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::SimulatedPointer => IntroVariant::SimulatedPointer,
            VariantArg::Simple => IntroVariant::Simple,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Replay the intro on a simulated clock
    Simulate {
        /// JSONL input script to replay
        #[arg(short, long)]
        script: Option<PathBuf>,

        /// Config file (defaults to the standard location)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Timing preset, overriding the config's timer table
        #[arg(long, value_enum)]
        variant: Option<VariantArg>,

        /// How long to simulate after mount (milliseconds)
        #[arg(long, default_value = "8000")]
        duration_ms: u64,

        /// Frame step (milliseconds)
        #[arg(long, default_value = "16")]
        step_ms: u64,

        /// Print transitions as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Sample the shutter drive curve
    Curve {
        /// Sample spacing (milliseconds)
        #[arg(long, default_value = "50")]
        step_ms: u64,

        /// Target angle in degrees
        #[arg(long)]
        target: Option<f64>,

        /// Print samples as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show, create, or validate the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Pump the intro in real time until Ctrl+C
    Run {
        /// JSONL input script, replayed against wall time
        #[arg(short, long)]
        script: Option<PathBuf>,

        /// Config file (defaults to the standard location)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Timing preset, overriding the config's timer table
        #[arg(long, value_enum)]
        variant: Option<VariantArg>,

        /// Frame rate of the pump
        #[arg(long, default_value = "60")]
        fps: u32,

        /// Status lines per second
        #[arg(long, default_value = "2")]
        status_hz: u32,

        /// Stop after this many milliseconds instead of waiting for Ctrl+C
        #[arg(long)]
        duration_ms: Option<u64>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show {
        /// Config file (defaults to the standard location)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Timing preset, overriding the config's timer table
        #[arg(long, value_enum)]
        variant: Option<VariantArg>,
    },

    /// Write a default config file
    Init {
        /// Destination (defaults to the standard location)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Timing preset to write
        #[arg(long, value_enum, default_value = "simulated-pointer")]
        variant: VariantArg,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Check a config file against the intro's timing rules
    Validate {
        /// Config file (defaults to the standard location)
        path: Option<PathBuf>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging; --verbose only raises the timing crates
    let logging = LoggingConfig {
        json: cli.json_logs,
        show_targets: cli.verbose,
        ..LoggingConfig::default()
    };
    let logging = if cli.verbose {
        logging.with_timing_level("debug")
    } else {
        logging
    };
    frameintro_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Simulate {
            script,
            config,
            variant,
            duration_ms,
            step_ms,
            json,
        } => {
            let config = commands::load_config(config, variant.map(Into::into))?;
            commands::simulate::run(config, script, duration_ms, step_ms, json)
        }
        Commands::Curve {
            step_ms,
            target,
            json,
        } => commands::curve::run(step_ms, target, json),
        Commands::Config { action } => match action {
            ConfigAction::Show { config, variant } => {
                let config = commands::load_config(config, variant.map(Into::into))?;
                commands::config::show(&config)
            }
            ConfigAction::Init {
                output,
                variant,
                force,
            } => commands::config::init(output, variant.into(), force),
            ConfigAction::Validate { path } => commands::config::validate(path),
        },
        Commands::Run {
            script,
            config,
            variant,
            fps,
            status_hz,
            duration_ms,
        } => {
            let config = commands::load_config(config, variant.map(Into::into))?;
            commands::run::run(config, script, fps, status_hz, duration_ms).await
        }
    }
}

//! longcalc CLI - Main entry point

mod cli;
mod display;
mod input;
mod interactive;

use clap::{Parser, Subcommand};
use longcalc_foundation::{CalcConfig, ProgressMode};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// longcalc - long computation on a background worker with progress display
#[derive(Parser, Debug)]
#[command(name = "longcalc")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Progress payload shape (percent, message)
    #[arg(long, global = true)]
    mode: Option<ProgressMode>,

    /// Smallest n for which progress is reported
    #[arg(long, global = true)]
    threshold: Option<u64>,

    /// Report progress every STEP outer iterations
    #[arg(long, global = true)]
    step: Option<u64>,

    /// Send a startup notice even when progress is disabled
    #[arg(long, global = true)]
    startup_notice: bool,

    /// Use this config file instead of the global/project search
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute n³ once and exit
    Run {
        /// Non-negative integer n
        #[arg(allow_hyphen_values = true)]
        n: String,
    },
    /// Read numbers from stdin, one computation per line
    Interactive,
    /// Show the effective configuration
    Config {
        /// Write a config file with all defaults
        #[arg(long)]
        init: bool,

        /// With --init: write the global file instead of ./.longcalc/
        #[arg(long, requires = "init")]
        global: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Load configuration
    let mut config = match &args.config {
        Some(path) => CalcConfig::load_from(path)?,
        None => CalcConfig::load().unwrap_or_else(|e| {
            eprintln!("Warning: Failed to load config: {}", e);
            CalcConfig::default()
        }),
    };
    config.merge(overrides(&args));
    config.validate()?;
    tracing::debug!("Effective config: {:?}", config);

    match args.command {
        Command::Run { n } => cli::run_once(&config, &n).await?,
        Command::Interactive => interactive::run(&config).await?,
        Command::Config { init, global } => config_cmd(&config, init, global)?,
    }

    Ok(())
}

/// CLI flags as a config layer (applied last)
fn overrides(args: &Args) -> CalcConfig {
    CalcConfig {
        progress_mode: args.mode,
        progress_threshold: args.threshold,
        progress_step: args.step,
        emit_startup_notification_when_disabled: args.startup_notice.then_some(true),
        channel_capacity: None,
    }
}

fn config_cmd(config: &CalcConfig, init: bool, global: bool) -> anyhow::Result<()> {
    if init {
        let defaults = CalcConfig::with_defaults();
        if global {
            defaults.save_global()?;
        } else {
            defaults.save_project()?;
        }
        println!("✓ Config written ({})", if global { "global" } else { "project" });
        return Ok(());
    }

    let effective = CalcConfig {
        progress_mode: Some(config.progress_mode()),
        progress_threshold: Some(config.progress_threshold()),
        progress_step: Some(config.progress_step()),
        emit_startup_notification_when_disabled: Some(
            config.emit_startup_notification_when_disabled(),
        ),
        channel_capacity: Some(config.channel_capacity()),
    };
    println!("{}", serde_json::to_string_pretty(&effective)?);
    Ok(())
}

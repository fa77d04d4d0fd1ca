//! Steering Accuracy Monitor
//!
//! Command-line front end for the steer-telemetry bus client. It subscribes
//! to a live vehicle telemetry stream and adds:
//! - Engagement gating with a settle delay
//! - Tracking error statistics per speed band and angle bucket
//! - A live terminal table, redrawn in place

use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use std::path::PathBuf;
use steer_telemetry::{ControlLaw, SubMaster, DEFAULT_ADDR};

mod classifier;
mod config;
mod driver;
mod gate;
mod report;
mod signal;
mod speed_groups;
mod stats;

use config::AppConfig;
use driver::{DriverSettings, EndReason, StreamDriver};
use speed_groups::GroupSelection;

/// Steering Accuracy - live steering tracking error by speed band
#[derive(Parser, Debug)]
#[command(name = "steer-accuracy")]
#[command(about = "Measure steering angle tracking accuracy from live telemetry", long_about = None)]
#[command(version)]
struct Args {
    /// Lateral control law running on the vehicle [pid|indi|lqr|angle]
    #[arg(value_name = "CONTROL_TYPE")]
    control_type: ControlLaw,

    /// Bus address; anything but the default uses the network transport
    #[arg(long, value_name = "ADDR", default_value = DEFAULT_ADDR)]
    addr: String,

    /// Speed group to display [crawl|slow|medium|fast|veryfast|germany|all]
    #[arg(long, value_name = "GROUP", default_value = "all")]
    group: GroupSelection,

    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all log output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("Steering Accuracy v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using telemetry library v{}", steer_telemetry::VERSION);

    let config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };
    log::debug!("Configuration: {:?}", config);

    let running = signal::setup_ctrl_c_handler()?;

    let mut sm = SubMaster::connect(&args.addr, &config.bus)
        .with_context(|| format!("Failed to subscribe at {}", args.addr))?;

    let settings = DriverSettings {
        law: args.control_type,
        selection: args.group,
        settle_samples: config.gate.settle_samples,
        render_every: config.display.render_every,
    };
    let mut driver = StreamDriver::new(settings, io::stdout());
    let summary = driver.run(&mut sm, &running)?;

    match summary.end {
        EndReason::Interrupted => log::info!("Interrupted, exiting"),
        EndReason::StreamClosed => log::info!("Telemetry stream ended"),
    }
    log::debug!(
        "{} messages, {} countable, {} classified ({} in table), {} heartbeats conflated",
        summary.messages,
        summary.countable,
        summary.classified,
        driver.stats().total_samples(),
        summary.dropped_heartbeats
    );

    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

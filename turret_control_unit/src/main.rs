//! # Turret Control Unit
//!
//! Runs the aiming sequence against the simulated rig. The configuration is
//! read from one TOML file; a missing file falls back to the built-in
//! defaults. Ctrl-C stops both motors and ends the run.

use clap::Parser;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;

use turret_common::config::ConfigError;
use turret_common::consts::DEFAULT_CONFIG_PATH;
use turret_control_unit::config::TurretConfig;
use turret_control_unit::cycle::{CycleRunner, StopCause};
use turret_control_unit::state::machine::{TurretHardware, TurretStateMachine};
use turret_hal::{HotSpot, SimulationConfig, SimulationRig};

/// Turret Control Unit: thermal target tracking and firing sequence
#[derive(Parser, Debug)]
#[command(name = "turret_control_unit")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Two-axis thermal turret controller on simulated hardware")]
struct Args {
    /// Path to the configuration TOML.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Place a hot spot at COL,ROW (0-based sensor pixel) after start-up.
    #[arg(long, value_name = "COL,ROW", value_parser = parse_target)]
    target: Option<HotSpot>,

    /// Stop after this many control ticks.
    #[arg(long)]
    max_cycles: Option<u64>,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();

    let loaded = TurretConfig::load_validated(&args.config);
    // Logging settings come from the file when it loads.
    let config = loaded.as_ref().ok().cloned().unwrap_or_default();
    setup_tracing(&args, &config);

    info!("Turret Control Unit v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = match loaded {
        Ok(cfg) => {
            info!("Configuration: {}", args.config.display());
            cfg
        }
        Err(ConfigError::FileNotFound) => {
            warn!(
                "No configuration at {}, using defaults",
                args.config.display()
            );
            config
        }
        Err(e) => {
            error!("FATAL: {}: {e}", args.config.display());
            process::exit(1);
        }
    };

    if let Err(e) = run(&args, &config) {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("Turret Control Unit shutdown complete");
}

fn run(args: &Args, config: &TurretConfig) -> Result<(), Box<dyn std::error::Error>> {
    let period = config.cycle.period();
    let sim: SimulationConfig = config.simulation_params()?;
    let rig = SimulationRig::new(&sim.with_tick_period(period.as_secs_f64()));
    let hardware = TurretHardware {
        axes: rig.axes,
        sensor: rig.sensor,
        servo: rig.servo,
    };

    // The reference frame is captured here, before any target is placed.
    let mut machine = TurretStateMachine::new(config, hardware)?;
    if let Some(spot) = args.target {
        info!("Simulated target at col {:.1}, row {:.1}", spot.col, spot.row);
        machine.context_mut().sensor.set_target(Some(spot));
    }

    let cancel = Arc::new(AtomicBool::new(false));
    let c = cancel.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        c.store(true, Ordering::SeqCst);
    })?;

    let mut runner = CycleRunner::new(machine, period, cancel)?.with_max_cycles(args.max_cycles);
    let summary = runner.run()?;

    match summary.cause {
        StopCause::Terminated => info!("Stopped in {}", summary.final_state),
        StopCause::CycleLimit => info!("Cycle limit reached in {}", summary.final_state),
    }
    info!(
        "{} shots fired ({} servo moves) in {} cycles (avg {} ns, {} overruns)",
        summary.shots_fired,
        runner.machine().context().servo.moves(),
        summary.cycles,
        summary.stats.avg_cycle_ns(),
        summary.stats.overruns
    );
    if !summary.faults.is_empty() {
        warn!("Faults recorded: {:?}", summary.faults);
    }
    Ok(())
}

/// Parse `COL,ROW` into a hot spot.
fn parse_target(s: &str) -> Result<HotSpot, String> {
    let (col, row) = s
        .split_once(',')
        .ok_or_else(|| format!("expected COL,ROW, got '{s}'"))?;
    let col: f64 = col.trim().parse().map_err(|e| format!("column: {e}"))?;
    let row: f64 = row.trim().parse().map_err(|e| format!("row: {e}"))?;
    if !(0.0..32.0).contains(&col) || !(0.0..24.0).contains(&row) {
        return Err(format!("{col},{row} is outside the 32x24 sensor"));
    }
    Ok(HotSpot::at(col, row))
}

/// Setup tracing subscriber from CLI flags and the `[logging]` section.
fn setup_tracing(args: &Args, config: &TurretConfig) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        config.logging.level.into()
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json || config.logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}

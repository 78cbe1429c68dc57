//! Headless carry session: one client controller and the authoritative
//! server exchanging encoded frames in-process.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p carry-sim` to play the scripted session.
//! Run with `cargo run -p carry-sim -- --tick-rate 20 --log-level debug` to
//! watch it frame by frame.

mod session;

use std::path::PathBuf;
use std::process::ExitCode;

use carry_config::{CliArgs, Config};
use clap::Parser;
use tracing::{error, info};

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("carry-sim")
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Resolve config directory
    let config_dir = args.config.clone().unwrap_or_else(default_config_dir);

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    carry_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));
    info!(config = %config_dir.display(), tick_rate = config.sim.tick_rate, "carry-sim starting");

    let report = match session::run(&config) {
        Ok(report) => report,
        Err(e) => {
            error!("failed to set up session: {e}");
            return ExitCode::FAILURE;
        }
    };

    for phase in &report.phases {
        info!(
            phase = phase.name,
            frames = phase.frames,
            completed = phase.completed,
            "phase finished"
        );
    }
    info!(
        corrections = report.corrections,
        in_sync = report.in_sync,
        "session finished"
    );

    if report.succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Command-line arguments for the carry simulation.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug)]
#[command(name = "carry-sim", about = "Headless client/server carry session")]
pub struct CliArgs {
    /// Client frame rate in Hz.
    #[arg(long)]
    pub tick_rate: Option<u32>,

    /// Interact delay in seconds for blocks without their own.
    #[arg(long)]
    pub interact_delay: Option<f32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(rate) = args.tick_rate {
            self.sim.tick_rate = rate.max(1);
        }
        if let Some(delay) = args.interact_delay {
            self.interaction.default_interact_delay = delay;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

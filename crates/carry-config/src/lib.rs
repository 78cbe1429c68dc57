//! Configuration for the carry mechanic.
//!
//! Interaction timing, per-slot carry defaults, simulation settings and log
//! level persist to disk as a RON file. CLI flags parsed with clap override
//! the loaded values.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    CarryDefaultsConfig, Config, DebugConfig, InteractionConfig, SimConfig, SlotDefaults,
};
pub use error::ConfigError;

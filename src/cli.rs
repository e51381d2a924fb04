//! Command-line interface for Inkfall
//!
//! The simulation runs headlessly; a scenario file drives it, or a small
//! built-in demo scenario runs when none is given.

use clap::Parser;
use std::path::PathBuf;

/// Cloud-companion action simulation
#[derive(Parser, Debug)]
#[command(name = "inkfall")]
#[command(about = "Cloud-companion action simulation")]
#[command(version)]
pub struct Args {
    /// Run the specified JSON scenario file (default: built-in demo)
    #[arg(long, value_name = "SCENARIO_FILE")]
    pub scenario: Option<PathBuf>,

    /// Output path for the scenario report
    #[arg(long, value_name = "OUTPUT_PATH")]
    pub output: Option<PathBuf>,

    /// Maximum scenario duration in seconds (overrides the scenario file)
    #[arg(long)]
    pub max_duration: Option<f32>,

    /// Random seed for deterministic reproduction (overrides the scenario file)
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn parse_args() -> Args {
    Args::parse()
}

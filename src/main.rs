//! Inkfall - Cloud-Companion Action Prototype
//!
//! Runs a headless cloud-simulation scenario, either from a JSON file or
//! the built-in demo, and writes a JSON report on completion.

use inkfall::cli;
use inkfall::headless::{run_scenario, ScenarioConfig};

fn main() {
    let args = cli::parse_args();

    let mut config = match &args.scenario {
        Some(path) => match ScenarioConfig::load_from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading scenario: {}", e);
                std::process::exit(1);
            }
        },
        None => ScenarioConfig::demo(),
    };

    if let Some(output) = &args.output {
        config.output_path = Some(output.display().to_string());
    }
    if let Some(max_duration) = args.max_duration {
        config.max_duration_secs = max_duration;
    }
    if let Some(seed) = args.seed {
        config.random_seed = Some(seed);
    }

    match run_scenario(config) {
        Ok(result) => {
            println!(
                "Scenario finished in {:.1}s: {} combines, {} transforms, {} ink marks, peak combo {} (rank {})",
                result.duration,
                result.combines,
                result.transforms,
                result.ink_marks,
                result.peak_combo,
                result.peak_rank
            );
        }
        Err(e) => {
            eprintln!("Scenario error: {}", e);
            std::process::exit(1);
        }
    }
}

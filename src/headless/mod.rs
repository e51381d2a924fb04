//! Headless mode for agentic testing
//!
//! This module provides functionality to run cloud-simulation scenarios
//! without any graphical output, suitable for automated testing and tuning.
//!
//! ## Usage
//!
//! ```bash
//! # Run a headless scenario
//! cargo run --release -- --scenario scenario.json
//! ```
//!
//! ## JSON Configuration
//!
//! ```json
//! {
//!   "player_position": [0.0, 0.0, 0.0],
//!   "enemies": [[1.5, 0.0, 0.0]],
//!   "clouds": [{ "position": [0.0, 3.0, 0.0], "target": "player" }],
//!   "actions": [{ "time": 0.5, "action": "attack" }],
//!   "max_duration_secs": 30,
//!   "random_seed": 42
//! }
//! ```

pub mod config;
pub mod runner;

pub use config::ScenarioConfig;
pub use runner::{run_scenario, HeadlessState, ScenarioResult};

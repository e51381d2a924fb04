//! Inkfall - Cloud-Companion Action Prototype
//!
//! A simulation of autonomous cloud companions: clouds follow their targets,
//! rain ink onto the ground, merge into bigger clouds, transform into storm
//! clouds when enemies stray too close, and can be launched as projectiles
//! by the player.
//!
//! This library exposes the core simulation modules for testing and reuse.

pub mod cli;
pub mod combat;
pub mod headless;
pub mod settings;
pub mod sim;
pub mod world;

// Re-export commonly used types
pub use combat::{CombatPlugin, PlayerAction, PlayerCombatState};
pub use headless::ScenarioConfig;
pub use settings::Tuning;
pub use sim::components::{Cloud, CloudKind, CloudState};
pub use sim::log::{SimEventType, SimLog};
pub use sim::CloudPlugin;

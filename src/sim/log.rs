//! Simulation logging
//!
//! Records cloud lifecycle and combat events for diagnostics and post-run
//! analysis. The headless runner serializes the whole log to JSON.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// A single entry in the simulation log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimLogEntry {
    /// Timestamp in simulation time (seconds since scenario start)
    pub timestamp: f32,
    /// The type of event
    pub event_type: SimEventType,
    /// Human-readable description of the event
    pub message: String,
}

/// Types of simulation log events for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimEventType {
    /// A cloud was spawned
    CloudSpawned,
    /// A command was issued to a cloud (or rejected)
    Command,
    /// Launch flight diagnostics
    Launch,
    /// Two clouds merged into a big cloud
    Combine,
    /// A cloud transformed into a storm cloud
    Transform,
    /// A cloud decayed and despawned
    Decay,
    /// Ink was deposited
    Ink,
    /// Cloud activation / deactivation
    Activation,
    /// Player combat action
    Combat,
    /// Pickup spawned or collected
    Pickup,
}

/// The simulation log resource storing all events
#[derive(Resource, Default)]
pub struct SimLog {
    /// All log entries in chronological order
    pub entries: Vec<SimLogEntry>,
    /// Current simulation time
    pub sim_time: f32,
}

impl SimLog {
    /// Clear the log for a new run
    pub fn clear(&mut self) {
        self.entries.clear();
        self.sim_time = 0.0;
    }

    /// Add a new entry to the log
    pub fn log(&mut self, event_type: SimEventType, message: String) {
        self.entries.push(SimLogEntry {
            timestamp: self.sim_time,
            event_type,
            message,
        });
    }

    /// Get entries filtered by event type
    pub fn filter_by_type(&self, event_type: SimEventType) -> Vec<&SimLogEntry> {
        self.entries
            .iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    /// Count entries of a given event type
    pub fn count_of(&self, event_type: SimEventType) -> usize {
        self.entries
            .iter()
            .filter(|e| e.event_type == event_type)
            .count()
    }

    /// Get the last N entries
    pub fn recent(&self, count: usize) -> Vec<&SimLogEntry> {
        self.entries.iter().rev().take(count).rev().collect()
    }

    /// Serialize all entries to pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.entries)
    }
}

/// Advances the log clock. Runs first each tick so every entry logged this
/// tick carries the current timestamp.
pub fn tick_sim_clock(time: Res<Time>, mut log: ResMut<SimLog>) {
    log.sim_time += time.delta_secs();
}

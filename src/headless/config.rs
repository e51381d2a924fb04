//! JSON scenario parsing for headless mode
//!
//! Parses JSON scenario files describing an initial arrangement of the
//! player, enemies and clouds plus a timed action script, and converts the
//! string-typed fields into simulation types.

use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::combat::player::{PlayerAction, DEFAULT_ACTIVATION_SECS};
use crate::sim::components::CloudKind;

/// Headless scenario configuration loaded from JSON
#[derive(Debug, Clone, Resource, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Player spawn position
    #[serde(default)]
    pub player_position: [f32; 3],
    /// Enemy spawn positions
    #[serde(default)]
    pub enemies: Vec<[f32; 3]>,
    /// Clouds present at scenario start
    #[serde(default)]
    pub clouds: Vec<CloudPlacement>,
    /// Timed player actions
    #[serde(default)]
    pub actions: Vec<ScriptedAction>,
    /// Maximum scenario duration in seconds (default: 30)
    #[serde(default = "default_max_duration")]
    pub max_duration_secs: f32,
    /// Random seed for deterministic scenario reproduction
    #[serde(default)]
    pub random_seed: Option<u64>,
    /// Custom output path for the result summary (optional)
    #[serde(default)]
    pub output_path: Option<String>,
    /// Whether destroyed enemies drop pickups (default: true)
    #[serde(default = "default_pickups_enabled")]
    pub pickups_enabled: bool,
}

/// A cloud placed at scenario start
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudPlacement {
    pub position: [f32; 3],
    /// Follow target: "player", "enemy:N" (0-based), or absent for none
    #[serde(default)]
    pub target: Option<String>,
    /// Cloud kind name (default: "normal")
    #[serde(default = "default_kind")]
    pub kind: String,
}

/// A player action fired at a scenario timestamp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptedAction {
    /// Scenario time in seconds at which the action fires
    pub time: f32,
    /// Action name: attack, jump, slam, launch_enemy, launch_cloud,
    /// activate_cloud, burst_rain
    pub action: String,
    /// Activation duration (activate_cloud only)
    #[serde(default)]
    pub duration: Option<f32>,
}

/// Resolved follow target for a placed cloud
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetRef {
    Player,
    Enemy(usize),
}

fn default_max_duration() -> f32 {
    30.0
}

fn default_pickups_enabled() -> bool {
    true
}

fn default_kind() -> String {
    "normal".to_string()
}

impl ScenarioConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read scenario file: {}", e))?;

        let config: ScenarioConfig = serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse JSON: {}", e))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_duration_secs <= 0.0 {
            return Err("max_duration_secs must be positive".to_string());
        }

        for (i, cloud) in self.clouds.iter().enumerate() {
            Self::parse_kind(&cloud.kind)?;
            if let Some(target) = &cloud.target {
                let target = Self::parse_target(target)?;
                if let TargetRef::Enemy(index) = target {
                    if index >= self.enemies.len() {
                        return Err(format!(
                            "clouds[{}] targets enemy {} but only {} enemies are defined",
                            i,
                            index,
                            self.enemies.len()
                        ));
                    }
                }
            }
        }

        for (i, action) in self.actions.iter().enumerate() {
            if action.time < 0.0 {
                return Err(format!("actions[{}] has a negative timestamp", i));
            }
            action.to_player_action()?;
        }

        Ok(())
    }

    /// Parse a cloud kind name
    pub fn parse_kind(name: &str) -> Result<CloudKind, String> {
        match name {
            "normal" => Ok(CloudKind::Normal),
            "big" => Ok(CloudKind::Big),
            "storm" => Ok(CloudKind::Storm),
            _ => Err(format!(
                "Unknown cloud kind: '{}'. Valid kinds: normal, big, storm",
                name
            )),
        }
    }

    /// Parse a target reference ("player" or "enemy:N")
    pub fn parse_target(name: &str) -> Result<TargetRef, String> {
        if name == "player" {
            return Ok(TargetRef::Player);
        }
        if let Some(index) = name.strip_prefix("enemy:") {
            let index: usize = index
                .parse()
                .map_err(|_| format!("Invalid enemy index in target '{}'", name))?;
            return Ok(TargetRef::Enemy(index));
        }
        Err(format!(
            "Unknown target: '{}'. Valid targets: player, enemy:N",
            name
        ))
    }

    /// A small built-in scenario used when no file is given: one enemy, a
    /// short melee string, then a cloud launch.
    pub fn demo() -> Self {
        Self {
            player_position: [0.0, 0.0, 0.0],
            enemies: vec![[1.5, 0.0, 0.0]],
            clouds: Vec::new(),
            actions: vec![
                ScriptedAction {
                    time: 0.5,
                    action: "attack".to_string(),
                    duration: None,
                },
                ScriptedAction {
                    time: 1.0,
                    action: "attack".to_string(),
                    duration: None,
                },
                ScriptedAction {
                    time: 2.0,
                    action: "activate_cloud".to_string(),
                    duration: Some(3.0),
                },
                ScriptedAction {
                    time: 6.0,
                    action: "launch_cloud".to_string(),
                    duration: None,
                },
            ],
            max_duration_secs: default_max_duration(),
            random_seed: Some(42),
            output_path: None,
            pickups_enabled: true,
        }
    }
}

impl ScriptedAction {
    /// Convert to a [`PlayerAction`] event
    pub fn to_player_action(&self) -> Result<PlayerAction, String> {
        match self.action.as_str() {
            "attack" => Ok(PlayerAction::Attack),
            "jump" => Ok(PlayerAction::Jump),
            "slam" => Ok(PlayerAction::Slam),
            "launch_enemy" => Ok(PlayerAction::LaunchEnemy),
            "launch_cloud" => Ok(PlayerAction::LaunchCloud),
            "activate_cloud" => Ok(PlayerAction::ActivateCloud {
                duration: self.duration.unwrap_or(DEFAULT_ACTIVATION_SECS),
            }),
            "burst_rain" => Ok(PlayerAction::BurstRain),
            _ => Err(format!(
                "Unknown action: '{}'. Valid actions: attack, jump, slam, \
                 launch_enemy, launch_cloud, activate_cloud, burst_rain",
                self.action
            )),
        }
    }
}

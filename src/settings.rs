//! Gameplay tuning
//!
//! Every gameplay constant in one place, loadable from a RON file so numbers
//! can be tweaked without recompiling. Missing or malformed files fall back
//! to defaults with a warning.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// All gameplay tuning, grouped by system.
#[derive(Resource, Clone, Debug, Serialize, Deserialize, Default)]
pub struct Tuning {
    pub cloud: CloudTuning,
    pub weight: WeightTuning,
    pub combat: CombatTuning,
    pub powerup: PowerupTuning,
}

/// Cloud lifecycle and movement tuning.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CloudTuning {
    /// Height of the follow offset above the target
    pub follow_height: f32,
    pub follow_speed: f32,
    pub vertical_follow_speed: f32,
    /// Big clouds follow more sluggishly
    pub big_follow_speed: f32,
    pub big_vertical_follow_speed: f32,
    pub bob_amplitude: f32,
    pub bob_angular_speed: f32,
    /// Upward acceleration countering gravity during launch flight
    pub hover_force: f32,
    /// Ceiling above the launch origin
    pub max_launch_height: f32,
    /// Beyond this horizontal travel the flight starts braking
    pub launch_distance_limit: f32,
    /// Time after launch before the landing probe may re-acquire a target
    pub launch_lockout_secs: f32,
    /// Range of the downward landing probe
    pub retarget_probe_range: f32,
    /// Horizontal hit radius of actors for downward probes
    pub probe_hit_radius: f32,
    /// Seconds a targetless cloud lingers before despawning
    pub linger_time: f32,
    /// Radius of the proximity merge scan
    pub combine_radius: f32,
    /// Center distance treated as direct physical contact between clouds
    pub contact_distance: f32,
    /// Enemy distance that triggers transformation into a storm cloud
    pub proximity_distance: f32,
    pub rain_interval: f32,
    pub burst_rain_interval: f32,
    pub big_cloud_rain_interval: f32,
    pub storm_rain_interval: f32,
    /// Range of the downward ink probe
    pub ink_probe_range: f32,
    pub ink_size: f32,
    pub burst_ink_size: f32,
    /// Pickup scatter radius around a transformation
    pub pickup_scatter_radius: f32,
    /// Pickups spawn this far above the ground and fall
    pub pickup_drop_height: f32,
    /// Clouds spawn this far above their target
    pub spawn_height: f32,
    pub spawn_scale: f32,
    /// Scale added to the current cloud per combat hit
    pub growth_per_hit: f32,
}

impl Default for CloudTuning {
    fn default() -> Self {
        Self {
            follow_height: 3.0,
            follow_speed: 10.0,
            vertical_follow_speed: 2.0,
            big_follow_speed: 3.0,
            big_vertical_follow_speed: 1.0,
            bob_amplitude: 0.2,
            bob_angular_speed: 5.0,
            hover_force: 9.8,
            max_launch_height: 5.0,
            launch_distance_limit: 10.0,
            launch_lockout_secs: 1.0,
            retarget_probe_range: 3.5,
            probe_hit_radius: 0.75,
            linger_time: 3.0,
            combine_radius: 2.0,
            contact_distance: 1.0,
            proximity_distance: 5.0,
            rain_interval: 1.0,
            burst_rain_interval: 0.2,
            big_cloud_rain_interval: 0.5,
            storm_rain_interval: 0.3,
            ink_probe_range: 10.0,
            ink_size: 0.2,
            burst_ink_size: 0.3,
            pickup_scatter_radius: 2.0,
            pickup_drop_height: 1.0,
            spawn_height: 3.0,
            spawn_scale: 0.5,
            growth_per_hit: 0.1,
        }
    }
}

impl CloudTuning {
    /// Rain interval for a freshly spawned cloud of the given kind.
    pub fn rain_interval_for(&self, kind: crate::sim::components::CloudKind) -> f32 {
        use crate::sim::components::CloudKind;
        match kind {
            CloudKind::Normal => self.rain_interval,
            CloudKind::Big => self.big_cloud_rain_interval,
            CloudKind::Storm => self.storm_rain_interval,
        }
    }
}

/// Enemy weight resistance tuning.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WeightTuning {
    pub min_weight: f32,
    pub reduction_per_hit: f32,
    /// Idle seconds before weight snaps back to 1.0
    pub reset_delay: f32,
}

impl Default for WeightTuning {
    fn default() -> Self {
        Self {
            min_weight: 0.1,
            reduction_per_hit: 0.2,
            reset_delay: 3.0,
        }
    }
}

/// Player combat loop tuning.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CombatTuning {
    pub attack_range: f32,
    pub jump_force: f32,
    pub aerial_boost: f32,
    pub aerial_lift: f32,
    pub max_aerial_combo: u32,
    pub slam_force: f32,
    /// Base vertical launch velocity, divided by enemy weight
    pub base_launch_height: f32,
    pub cloud_launch_speed: f32,
    /// Enemy altitude that counts as a high juggle for combo purposes
    pub juggle_height: f32,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            attack_range: 2.0,
            jump_force: 10.0,
            aerial_boost: 3.0,
            aerial_lift: 2.0,
            max_aerial_combo: 3,
            slam_force: 15.0,
            base_launch_height: 10.0,
            cloud_launch_speed: 20.0,
            juggle_height: 1.5,
        }
    }
}

/// Superpower pickup tuning.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PowerupTuning {
    pub duration: f32,
    /// Player distance at which a pickup is collected
    pub pickup_radius: f32,
}

impl Default for PowerupTuning {
    fn default() -> Self {
        Self {
            duration: 10.0,
            pickup_radius: 1.0,
        }
    }
}

impl Tuning {
    fn tuning_path() -> PathBuf {
        PathBuf::from("tuning.ron")
    }

    /// Load tuning from file, or return defaults if the file is absent
    pub fn load() -> Self {
        Self::load_from(&Self::tuning_path())
    }

    fn load_from(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(contents) => match ron::from_str(&contents) {
                    Ok(tuning) => {
                        info!("Loaded tuning from {:?}", path);
                        tuning
                    }
                    Err(e) => {
                        warn!("Failed to parse tuning file: {}", e);
                        Self::default()
                    }
                },
                Err(e) => {
                    warn!("Failed to read tuning file: {}", e);
                    Self::default()
                }
            }
        } else {
            Self::default()
        }
    }

    /// Save tuning to file
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let path = Self::tuning_path();
        let contents = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        fs::write(&path, contents)?;
        info!("Saved tuning to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_round_trip_through_ron() {
        let tuning = Tuning::default();
        let text = ron::ser::to_string_pretty(&tuning, ron::ser::PrettyConfig::default()).unwrap();
        let back: Tuning = ron::from_str(&text).unwrap();
        assert_eq!(back.cloud.linger_time, tuning.cloud.linger_time);
        assert_eq!(back.weight.min_weight, tuning.weight.min_weight);
        assert_eq!(back.combat.slam_force, tuning.combat.slam_force);
    }

    #[test]
    fn test_weight_defaults_match_design() {
        let weight = WeightTuning::default();
        assert_eq!(weight.min_weight, 0.1);
        assert_eq!(weight.reduction_per_hit, 0.2);
        assert_eq!(weight.reset_delay, 3.0);
    }

    #[test]
    fn test_load_from_reads_edited_file() {
        let mut tuning = Tuning::default();
        tuning.cloud.linger_time = 7.5;
        tuning.combat.jump_force = 42.0;
        let text = ron::ser::to_string_pretty(&tuning, ron::ser::PrettyConfig::default()).unwrap();

        let path = std::env::temp_dir().join("inkfall_tuning_load_test.ron");
        fs::write(&path, text).unwrap();
        let loaded = Tuning::load_from(&path);
        fs::remove_file(&path).unwrap();

        assert_eq!(loaded.cloud.linger_time, 7.5);
        assert_eq!(loaded.combat.jump_force, 42.0);
    }

    #[test]
    fn test_load_from_missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("inkfall_tuning_missing_test.ron");
        let loaded = Tuning::load_from(&path);
        assert_eq!(loaded.cloud.linger_time, Tuning::default().cloud.linger_time);
    }

    #[test]
    fn test_load_from_garbage_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("inkfall_tuning_garbage_test.ron");
        fs::write(&path, "this is not ron").unwrap();
        let loaded = Tuning::load_from(&path);
        fs::remove_file(&path).unwrap();
        assert_eq!(loaded.combat.slam_force, Tuning::default().combat.slam_force);
    }
}

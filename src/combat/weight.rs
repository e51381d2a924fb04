//! Enemy weight resistance
//!
//! Each enemy carries a weight scalar in `[min_weight, 1.0]`. Hits shave it
//! down; leaving the enemy alone for a few seconds snaps it back to 1.0.
//! Launch height and aerial boost scale inversely with weight.

use bevy::prelude::*;

use crate::settings::WeightTuning;
use crate::sim::components::{Enemy, RenderColor};

/// Weight state attached to each enemy.
#[derive(Component)]
pub struct EnemyWeight {
    pub weight: f32,
    /// Counts down from the reset delay after every hit
    last_hit_timer: f32,
    original_color: Color,
}

impl EnemyWeight {
    pub fn new(original_color: Color) -> Self {
        Self {
            weight: 1.0,
            last_hit_timer: 0.0,
            original_color,
        }
    }

    /// Applies one hit's worth of weight reduction and restarts the idle
    /// reset clock.
    pub fn reduce(&mut self, tuning: &WeightTuning) {
        self.weight = (self.weight - tuning.reduction_per_hit).max(tuning.min_weight);
        self.last_hit_timer = tuning.reset_delay;
    }

    /// Magnitude of a weight-gated effect: `base / weight`.
    pub fn effect(&self, base: f32) -> f32 {
        base / self.weight
    }
}

/// Resets weight to 1.0 once the idle delay elapses.
pub fn tick_weight_recovery(time: Res<Time>, mut enemies: Query<&mut EnemyWeight>) {
    let dt = time.delta_secs();
    for mut weight in enemies.iter_mut() {
        if weight.last_hit_timer <= 0.0 {
            continue;
        }
        weight.last_hit_timer -= dt;
        if weight.last_hit_timer <= 0.0 && weight.weight < 1.0 {
            weight.weight = 1.0;
            debug!("enemy weight reset to 1.0");
        }
    }
}

/// Tints enemies toward red as their weight drops.
pub fn refresh_weight_color(mut enemies: Query<(&EnemyWeight, &mut RenderColor), With<Enemy>>) {
    for (weight, mut color) in enemies.iter_mut() {
        color.0 = Color::srgb(1.0, 0.0, 0.0).mix(&weight.original_color, weight.weight);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuning() -> WeightTuning {
        WeightTuning::default()
    }

    #[test]
    fn test_weight_floors_at_minimum() {
        let mut weight = EnemyWeight::new(Color::WHITE);
        for _ in 0..10 {
            weight.reduce(&tuning());
        }
        assert!((weight.weight - 0.1).abs() < f32::EPSILON);
    }

    #[test]
    fn test_effect_is_inverse_to_weight() {
        let mut weight = EnemyWeight::new(Color::WHITE);
        assert_eq!(weight.effect(10.0), 10.0);
        weight.reduce(&tuning());
        weight.reduce(&tuning());
        weight.reduce(&tuning());
        // 1.0 - 3 * 0.2 = 0.4
        assert!((weight.effect(10.0) - 25.0).abs() < 1e-4);
    }
}

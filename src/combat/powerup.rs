//! Superpower pickups
//!
//! Pickups dropped by cloud transformations grant the player a timed
//! superpower window, shown as a color swap that reverts on expiry.

use bevy::prelude::*;

use crate::settings::Tuning;
use crate::sim::components::{Pickup, Player, RenderColor};
use crate::sim::log::{SimEventType, SimLog};

/// The player's superpower window.
#[derive(Resource, Default)]
pub struct PowerupState {
    pub active: bool,
    pub timer: f32,
    /// Player color to restore when the window closes
    original_color: Option<Color>,
}

fn superpower_color() -> Color {
    Color::srgb(1.0, 0.1, 0.1)
}

/// Collects any pickup the player walks over.
pub fn collect_pickups(
    mut commands: Commands,
    tuning: Res<Tuning>,
    mut state: ResMut<PowerupState>,
    mut log: ResMut<SimLog>,
    mut players: Query<(&Transform, &mut RenderColor), With<Player>>,
    pickups: Query<(Entity, &Transform), (With<Pickup>, Without<Player>)>,
) {
    let Ok((player_transform, mut player_color)) = players.get_single_mut() else {
        return;
    };

    for (pickup, pickup_transform) in pickups.iter() {
        let distance = player_transform
            .translation
            .distance(pickup_transform.translation);
        if distance > tuning.powerup.pickup_radius {
            continue;
        }

        commands.entity(pickup).despawn();
        if !state.active {
            state.original_color = Some(player_color.0);
        }
        state.active = true;
        state.timer = tuning.powerup.duration;
        player_color.0 = superpower_color();
        log.log(
            SimEventType::Pickup,
            format!("superpower collected, active for {:.0}s", tuning.powerup.duration),
        );
    }
}

/// Counts the superpower window down and reverts the color swap.
pub fn tick_powerup(
    time: Res<Time>,
    mut state: ResMut<PowerupState>,
    mut log: ResMut<SimLog>,
    mut players: Query<&mut RenderColor, With<Player>>,
) {
    if !state.active {
        return;
    }
    state.timer -= time.delta_secs();
    if state.timer > 0.0 {
        return;
    }

    state.active = false;
    state.timer = 0.0;
    if let (Ok(mut color), Some(original)) = (players.get_single_mut(), state.original_color.take())
    {
        color.0 = original;
    }
    log.log(SimEventType::Pickup, "superpower expired".to_string());
}

//! Combat collaborator layer
//!
//! Player-side systems that sit next to the cloud simulation: melee combat
//! with weight resistance, style combo tracking, pickup collection, and the
//! active-cloud handle through which the player issues cloud commands.

use bevy::prelude::*;

pub mod combo;
pub mod player;
pub mod powerup;
pub mod weight;

pub use combo::{ComboState, StyleRank};
pub use player::{PlayerAction, PlayerCombatState};
pub use powerup::PowerupState;
pub use weight::EnemyWeight;

use crate::sim::{cloud, log, SimPhase};

pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<PlayerAction>()
            .init_resource::<PlayerCombatState>()
            .init_resource::<ComboState>()
            .init_resource::<PowerupState>()
            .add_systems(
                Update,
                (
                    weight::tick_weight_recovery,
                    combo::tick_combo,
                    powerup::tick_powerup,
                    weight::refresh_weight_color,
                    player::validate_current_cloud.before(player::process_player_actions),
                    // Player actions run after the clock but before the cloud
                    // command drain so commands issued this tick apply this
                    // tick.
                    player::process_player_actions
                        .after(log::tick_sim_clock)
                        .before(cloud::process_cloud_commands),
                )
                    .in_set(SimPhase::TimersAndState),
            )
            .add_systems(
                Update,
                powerup::collect_pickups.in_set(SimPhase::Movement),
            )
            // Handoffs are applied after the frame's resolvers have run, once
            // despawns and spawns from this tick are visible.
            .add_systems(PostUpdate, player::apply_cloud_handoffs);
    }
}

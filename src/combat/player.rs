//! Player combat loop
//!
//! Directly-reactive hit processing driven by scripted action events: melee
//! strikes that wear the enemy's weight down and feed the cloud system,
//! weight-gated enemy launches, aerial juggles and slams, and the cloud
//! commands the player may issue on their active cloud.
//!
//! This module is the owning side of the active-cloud handle: the handle
//! lives here and changes only through combat actions and the handoff
//! notifications the cloud resolvers emit.

use bevy::prelude::*;

use crate::settings::Tuning;
use crate::sim::cloud::spawn_cloud;
use crate::sim::components::{Cloud, CloudKind, Enemy, Player};
use crate::sim::events::{
    ActivateCloudEvent, BurstRainEvent, CloudHandoffEvent, LaunchCloudEvent, PrepareLaunchEvent,
};
use crate::sim::log::{SimEventType, SimLog};
use crate::world::{GroundPlane, Velocity};

use super::combo::ComboState;
use super::weight::EnemyWeight;

/// Default activation window when a scripted activate carries no duration.
pub const DEFAULT_ACTIVATION_SECS: f32 = 2.0;

/// Vertical tolerance for the grounded check.
const GROUNDED_EPSILON: f32 = 0.05;

/// A scripted player action. In the full game these come from device input;
/// here the scenario script (or a test) feeds them in.
#[derive(Event, Debug, Clone, Copy)]
pub enum PlayerAction {
    /// Melee strike at the nearest enemy in range
    Attack,
    Jump,
    /// Drive player and enemy downward mid-air
    Slam,
    /// Weight-gated vertical enemy launch
    LaunchEnemy,
    /// Launch the active cloud as a projectile
    LaunchCloud,
    /// Activate the active cloud for a duration
    ActivateCloud { duration: f32 },
    /// Trigger burst rain on the active cloud
    BurstRain,
}

/// Player-side combat bookkeeping, including the active-cloud handle.
#[derive(Resource, Default)]
pub struct PlayerCombatState {
    /// The player's active cloud. Mutated only by combat actions and by
    /// [`CloudHandoffEvent`] notifications.
    pub current_cloud: Option<Entity>,
    pub hit_count: u32,
    pub aerial_hit_count: u32,
}

/// Clears the handle if the cloud it points at no longer exists.
pub fn validate_current_cloud(
    mut state: ResMut<PlayerCombatState>,
    clouds: Query<(), With<Cloud>>,
) {
    if let Some(cloud) = state.current_cloud {
        if clouds.get(cloud).is_err() {
            debug!("active cloud is gone, clearing handle");
            state.current_cloud = None;
        }
    }
}

/// Applies handle-handoff notifications from the merge and transformation
/// resolvers.
pub fn apply_cloud_handoffs(
    mut state: ResMut<PlayerCombatState>,
    mut handoffs: EventReader<CloudHandoffEvent>,
) {
    for handoff in handoffs.read() {
        match handoff.replaces {
            None => state.current_cloud = Some(handoff.new_cloud),
            Some(old) => {
                if state.current_cloud == Some(old) {
                    state.current_cloud = Some(handoff.new_cloud);
                }
            }
        }
    }
}

/// Processes scripted player actions for this tick.
#[allow(clippy::too_many_arguments)]
pub fn process_player_actions(
    mut commands: Commands,
    mut actions: EventReader<PlayerAction>,
    tuning: Res<Tuning>,
    ground: Res<GroundPlane>,
    mut state: ResMut<PlayerCombatState>,
    mut combo: ResMut<ComboState>,
    mut log: ResMut<SimLog>,
    mut prepares: EventWriter<PrepareLaunchEvent>,
    mut launches: EventWriter<LaunchCloudEvent>,
    mut activations: EventWriter<ActivateCloudEvent>,
    mut bursts: EventWriter<BurstRainEvent>,
    mut players: Query<
        (Entity, &Transform, &mut Velocity),
        (With<Player>, Without<Enemy>, Without<Cloud>),
    >,
    mut enemies: Query<
        (Entity, &Transform, &mut Velocity, &mut EnemyWeight),
        (With<Enemy>, Without<Player>, Without<Cloud>),
    >,
    mut clouds: Query<(&Cloud, &mut Transform), (Without<Player>, Without<Enemy>)>,
) {
    let Ok((player, player_transform, mut player_velocity)) = players.get_single_mut() else {
        return;
    };
    let grounded = player_transform.translation.y <= ground.height + GROUNDED_EPSILON;

    for action in actions.read() {
        match *action {
            PlayerAction::Jump => {
                if grounded {
                    player_velocity.0.y = tuning.combat.jump_force;
                    log.log(SimEventType::Combat, "player jumped".to_string());
                }
            }

            PlayerAction::Attack => {
                let Some(enemy) =
                    nearest_enemy_in_range(&enemies, player_transform, tuning.combat.attack_range)
                else {
                    continue;
                };
                let Ok((enemy_entity, enemy_transform, mut enemy_velocity, mut weight)) =
                    enemies.get_mut(enemy)
                else {
                    continue;
                };

                combo.register_strike();
                state.hit_count += 1;
                weight.reduce(&tuning.weight);

                if !grounded && state.aerial_hit_count < tuning.combat.max_aerial_combo {
                    let boost = weight.effect(tuning.combat.aerial_boost);
                    player_velocity.0.y = boost;
                    enemy_velocity.0.y = boost;
                    state.aerial_hit_count += 1;
                    combo.add(1, false);
                } else if !grounded {
                    player_velocity.0.y = tuning.combat.aerial_lift;
                    combo.add(1, false);
                }

                if enemy_transform.translation.y > tuning.combat.juggle_height {
                    combo.add(1, false);
                }

                if state.hit_count == 2 && state.current_cloud.is_none() {
                    let spawn_at = enemy_transform.translation
                        + Vec3::Y * tuning.cloud.spawn_height;
                    let cloud = spawn_cloud(
                        &mut commands,
                        &tuning,
                        spawn_at,
                        Quat::IDENTITY,
                        Some(enemy_entity),
                        CloudKind::Normal,
                    );
                    state.current_cloud = Some(cloud);
                    log.log(
                        SimEventType::CloudSpawned,
                        "cloud spawned above the enemy".to_string(),
                    );
                }
                if let Some(current) = state.current_cloud {
                    if let Ok((_, mut cloud_transform)) = clouds.get_mut(current) {
                        cloud_transform.scale += Vec3::splat(tuning.cloud.growth_per_hit);
                    }
                }

                log.log(
                    SimEventType::Combat,
                    format!("player hit the enemy (combo {})", combo.count),
                );

                if state.hit_count > 2 {
                    commands.entity(enemy_entity).despawn();
                    state.hit_count = 0;
                    state.aerial_hit_count = 0;
                    log.log(SimEventType::Combat, "enemy destroyed".to_string());
                }
            }

            PlayerAction::LaunchEnemy => {
                if !grounded {
                    continue;
                }
                let Some(enemy) =
                    nearest_enemy_in_range(&enemies, player_transform, tuning.combat.attack_range)
                else {
                    continue;
                };
                let Ok((_, _, mut enemy_velocity, mut weight)) = enemies.get_mut(enemy) else {
                    continue;
                };
                let height = weight.effect(tuning.combat.base_launch_height);
                enemy_velocity.0 = Vec3::new(0.0, height, 0.0);
                combo.add(2, true);
                weight.reduce(&tuning.weight);
                log.log(
                    SimEventType::Combat,
                    format!("enemy launched at velocity {:.1}", height),
                );
            }

            PlayerAction::Slam => {
                if grounded {
                    continue;
                }
                let Some(enemy) = nearest_enemy(&enemies, player_transform) else {
                    continue;
                };
                let Ok((_, _, mut enemy_velocity, _)) = enemies.get_mut(enemy) else {
                    continue;
                };
                player_velocity.0.y = -tuning.combat.slam_force;
                enemy_velocity.0.y = -tuning.combat.slam_force;
                combo.add(2, true);
                state.aerial_hit_count = 0;
                log.log(SimEventType::Combat, "slam".to_string());
            }

            PlayerAction::LaunchCloud => {
                let Some(current) = state.current_cloud else {
                    debug!("launch_cloud with no active cloud");
                    continue;
                };
                let Ok((cloud, _)) = clouds.get(current) else {
                    state.current_cloud = None;
                    continue;
                };
                if cloud.target != Some(player) {
                    debug!("launch_cloud rejected: cloud is not escorting the player");
                    continue;
                }

                let mut direction = player_velocity.0;
                if direction.length() < 0.1 {
                    direction = *player_transform.forward();
                }
                direction = (direction.normalize_or_zero() + Vec3::Y * 0.05).normalize_or_zero();
                let velocity = direction * tuning.combat.cloud_launch_speed * 3.0;

                prepares.send(PrepareLaunchEvent {
                    cloud: current,
                    issuer: player,
                });
                launches.send(LaunchCloudEvent {
                    cloud: current,
                    velocity,
                });
                state.current_cloud = None;
                log.log(SimEventType::Combat, "player launched the cloud".to_string());
            }

            PlayerAction::ActivateCloud { duration } => {
                if let Some(current) = state.current_cloud {
                    activations.send(ActivateCloudEvent {
                        cloud: current,
                        duration,
                    });
                }
            }

            PlayerAction::BurstRain => {
                if let Some(current) = state.current_cloud {
                    bursts.send(BurstRainEvent { cloud: current });
                }
            }
        }
    }
}

type EnemyQuery<'w, 's, 'a, 'b, 'c> = Query<
    'w,
    's,
    (Entity, &'a Transform, &'b mut Velocity, &'c mut EnemyWeight),
    (With<Enemy>, Without<Player>, Without<Cloud>),
>;

fn nearest_enemy(enemies: &EnemyQuery, player: &Transform) -> Option<Entity> {
    enemies
        .iter()
        .map(|(entity, transform, _, _)| {
            (entity, transform.translation.distance(player.translation))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(entity, _)| entity)
}

fn nearest_enemy_in_range(
    enemies: &EnemyQuery,
    player: &Transform,
    range: f32,
) -> Option<Entity> {
    enemies
        .iter()
        .map(|(entity, transform, _, _)| {
            (entity, transform.translation.distance(player.translation))
        })
        .filter(|(_, distance)| *distance < range)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(entity, _)| entity)
}

//! Cloud entity core
//!
//! Spawning, command processing, target liveness, activation windows, and
//! the targetless decay path. This is the single authoritative state
//! machine; movement and the merge/transform resolvers act on the state it
//! maintains but never set `Cloud::state` themselves except through the
//! transitions defined here and in `movement`.

use bevy::prelude::*;

use crate::settings::Tuning;
use crate::world::{probe_below, Body, GroundPlane, ProbeTag, Velocity};

use super::components::*;
use super::events::*;
use super::log::{SimEventType, SimLog};

/// Render color of an activated cloud.
pub fn activated_color() -> Color {
    Color::srgb(1.0, 1.0, 0.0)
}

/// Spawns a cloud entity and returns its handle.
///
/// This is the `spawn_cloud` entry point of the public contract; callers
/// that need the handle back (the combat layer) call it directly, while
/// scenario scripts go through [`SpawnCloudEvent`].
pub fn spawn_cloud(
    commands: &mut Commands,
    tuning: &Tuning,
    position: Vec3,
    rotation: Quat,
    target: Option<Entity>,
    kind: CloudKind,
) -> Entity {
    let cloud = Cloud::new(kind, target, tuning.cloud.linger_time);
    let color = cloud.original_color;
    let scale = match kind {
        CloudKind::Normal => tuning.cloud.spawn_scale,
        CloudKind::Big | CloudKind::Storm => 1.0,
    };
    commands
        .spawn((
            cloud,
            InkEmitter::new(tuning.cloud.rain_interval_for(kind)),
            RenderColor(color),
            Transform {
                translation: position,
                rotation,
                scale: Vec3::splat(scale),
            },
            Velocity::default(),
            Body::kinematic(),
        ))
        .id()
}

/// Handles scenario-driven spawn requests.
pub fn spawn_requested_clouds(
    mut commands: Commands,
    tuning: Res<Tuning>,
    mut log: ResMut<SimLog>,
    mut requests: EventReader<SpawnCloudEvent>,
) {
    for request in requests.read() {
        spawn_cloud(
            &mut commands,
            &tuning,
            request.position,
            Quat::IDENTITY,
            request.target,
            request.kind,
        );
        log.log(
            SimEventType::CloudSpawned,
            format!(
                "{} spawned at {:.1} {:.1} {:.1}",
                request.kind.name(),
                request.position.x,
                request.position.y,
                request.position.z
            ),
        );
    }
}

/// Processes the command events of the public contract.
///
/// Prepare commands are drained before launch commands so a caller may issue
/// both in the same tick. Invalid-state commands are ignored with a debug
/// log.
pub fn process_cloud_commands(
    mut commands: Commands,
    tuning: Res<Tuning>,
    mut log: ResMut<SimLog>,
    mut prepares: EventReader<PrepareLaunchEvent>,
    mut launches: EventReader<LaunchCloudEvent>,
    mut activations: EventReader<ActivateCloudEvent>,
    mut bursts: EventReader<BurstRainEvent>,
    mut clouds: Query<(
        &mut Cloud,
        &mut InkEmitter,
        &mut RenderColor,
        &Transform,
        &mut Velocity,
        &mut Body,
    )>,
) {
    for event in prepares.read() {
        let Ok((mut cloud, ..)) = clouds.get_mut(event.cloud) else {
            debug!("prepare_for_launch on a despawned cloud, ignoring");
            continue;
        };
        if cloud.is_terminal() {
            continue;
        }
        if cloud.state == CloudState::Following && cloud.target == Some(event.issuer) {
            cloud.state = CloudState::PreparingLaunch;
            cloud.target = None;
            log.log(
                SimEventType::Command,
                "cloud preparing for launch, follow stopped".to_string(),
            );
        } else {
            debug!("prepare_for_launch rejected: not following the issuer");
        }
    }

    for event in launches.read() {
        let Ok((mut cloud, _, _, transform, mut velocity, mut body)) = clouds.get_mut(event.cloud)
        else {
            debug!("launch on a despawned cloud, ignoring");
            continue;
        };
        if cloud.is_terminal() {
            continue;
        }
        if cloud.state != CloudState::PreparingLaunch {
            debug!("launch rejected: cloud was not prepared");
            continue;
        }
        cloud.state = CloudState::Launched;
        cloud.linger_timer = tuning.cloud.linger_time;
        *body = Body::dynamic();
        velocity.0 = event.velocity;
        commands
            .entity(event.cloud)
            .insert(LaunchFlight::new(transform.translation));
        log.log(
            SimEventType::Launch,
            format!(
                "cloud launched with velocity {:.1} {:.1} {:.1}",
                event.velocity.x, event.velocity.y, event.velocity.z
            ),
        );
    }

    for event in activations.read() {
        let Ok((mut cloud, _, mut color, ..)) = clouds.get_mut(event.cloud) else {
            debug!("activate on a despawned cloud, ignoring");
            continue;
        };
        if cloud.is_terminal() {
            continue;
        }
        cloud.is_activated = true;
        cloud.activation_timer = event.duration;
        color.0 = activated_color();
        log.log(
            SimEventType::Activation,
            format!("cloud activated for {:.1}s", event.duration),
        );
    }

    for event in bursts.read() {
        let Ok((cloud, mut emitter, ..)) = clouds.get_mut(event.cloud) else {
            debug!("burst_rain on a despawned cloud, ignoring");
            continue;
        };
        if cloud.is_terminal() {
            continue;
        }
        emitter.is_bursting = true;
        emitter.rain_timer = 0.0;
        log.log(SimEventType::Command, "burst rain triggered".to_string());
    }
}

/// Detects stale follow targets.
///
/// A cloud following a dead or missing target at the start of a tick must be
/// lingering (or gone) by the end of it; this is the stale-reference check
/// run before any movement.
pub fn validate_targets(
    tuning: Res<Tuning>,
    mut log: ResMut<SimLog>,
    mut clouds: Query<&mut Cloud>,
    live_targets: Query<(), Or<(With<Player>, With<Enemy>)>>,
) {
    for mut cloud in clouds.iter_mut() {
        if cloud.is_terminal() || cloud.state != CloudState::Following {
            continue;
        }
        let alive = cloud
            .target
            .map_or(false, |target| live_targets.get(target).is_ok());
        if !alive {
            cloud.target = None;
            cloud.state = CloudState::Lingering;
            cloud.linger_timer = tuning.cloud.linger_time;
            log.log(
                SimEventType::Decay,
                "cloud lost its target, lingering".to_string(),
            );
        }
    }
}

/// Counts down activation windows and reverts the color when they close.
pub fn tick_activation(
    time: Res<Time>,
    mut log: ResMut<SimLog>,
    mut clouds: Query<(&mut Cloud, &mut RenderColor)>,
) {
    let dt = time.delta_secs();
    for (mut cloud, mut color) in clouds.iter_mut() {
        if !cloud.is_activated || cloud.is_terminal() {
            continue;
        }
        cloud.activation_timer -= dt;
        if cloud.activation_timer <= 0.0 {
            cloud.is_activated = false;
            cloud.activation_timer = 0.0;
            color.0 = cloud.original_color;
            log.log(SimEventType::Activation, "cloud deactivated".to_string());
        }
    }
}

/// Advances lingering clouds: probe for someone to follow, otherwise fade
/// out and despawn when the linger timer expires.
pub fn decay_targetless(
    mut commands: Commands,
    time: Res<Time>,
    tuning: Res<Tuning>,
    ground: Res<GroundPlane>,
    mut log: ResMut<SimLog>,
    mut clouds: Query<(Entity, &Transform, &mut Cloud, &mut RenderColor)>,
    players: Query<(Entity, &Transform), (With<Player>, Without<Cloud>)>,
    enemies: Query<(Entity, &Transform), (With<Enemy>, Without<Cloud>)>,
) {
    let dt = time.delta_secs();

    let mut bodies: Vec<(Entity, Vec3, f32, ProbeTag)> = Vec::new();
    for (entity, transform) in players.iter() {
        bodies.push((
            entity,
            transform.translation,
            tuning.cloud.probe_hit_radius,
            ProbeTag::Player,
        ));
    }
    for (entity, transform) in enemies.iter() {
        bodies.push((
            entity,
            transform.translation,
            tuning.cloud.probe_hit_radius,
            ProbeTag::Enemy,
        ));
    }

    for (entity, transform, mut cloud, mut color) in clouds.iter_mut() {
        if cloud.is_terminal() || cloud.state != CloudState::Lingering {
            continue;
        }

        let hit = probe_below(
            transform.translation,
            tuning.cloud.retarget_probe_range,
            ground.height,
            &bodies,
        );
        if let Some(hit) = hit {
            if matches!(hit.tag, ProbeTag::Player | ProbeTag::Enemy) {
                cloud.target = hit.entity;
                cloud.state = CloudState::Following;
                cloud.linger_timer = tuning.cloud.linger_time;
                color.0 = cloud.original_color;
                log.log(
                    SimEventType::Command,
                    format!("lingering cloud re-acquired a {:?} below", hit.tag),
                );
                continue;
            }
        }

        cloud.linger_timer -= dt;
        let alpha = (cloud.linger_timer / tuning.cloud.linger_time).max(0.0);
        color.0 = cloud.original_color.with_alpha(alpha);
        if cloud.linger_timer <= 0.0 {
            commands.entity(entity).despawn();
            log.log(
                SimEventType::Decay,
                "cloud lingered out and dissipated".to_string(),
            );
        }
    }
}

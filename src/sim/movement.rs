//! Cloud movement controller
//!
//! Follow trajectories (lagged lerp plus a vertical bob) and launch
//! ballistics (hover compensation, ceiling clamp, braking, landing probe).
//!
//! The lerp factors are `speed * dt`, so larger tick steps converge faster.
//! That frame-rate dependence is inherited behavior, kept as-is.

use bevy::prelude::*;

use crate::settings::Tuning;
use crate::world::{probe_below, Body, GroundPlane, ProbeTag, Velocity};

use super::components::*;
use super::log::{SimEventType, SimLog};

/// Flight time after which horizontal braking starts regardless of distance.
const LAUNCH_BRAKE_AFTER_SECS: f32 = 1.0;

/// How long the post-launch diagnostic keeps sampling positions.
const LAUNCH_LOG_WINDOW_SECS: f32 = 2.5;
const LAUNCH_LOG_INTERVAL_SECS: f32 = 0.5;

/// Moves following clouds toward their target with independent horizontal
/// and vertical lag, plus a sinusoidal bob.
pub fn follow_targets(
    time: Res<Time>,
    tuning: Res<Tuning>,
    mut clouds: Query<(&mut Transform, &Cloud)>,
    targets: Query<&Transform, Without<Cloud>>,
) {
    let dt = time.delta_secs();
    let bob = (time.elapsed_secs() * tuning.cloud.bob_angular_speed).sin() * tuning.cloud.bob_amplitude;

    for (mut transform, cloud) in clouds.iter_mut() {
        if cloud.is_terminal() || cloud.state != CloudState::Following {
            continue;
        }
        let Some(target) = cloud.target else {
            continue;
        };
        let Ok(target_transform) = targets.get(target) else {
            // Stale target; the liveness check picks this up next tick.
            continue;
        };

        let desired = target_transform.translation
            + Vec3::new(0.0, tuning.cloud.follow_height + bob, 0.0);

        let (follow_speed, vertical_speed) = match cloud.kind {
            CloudKind::Big => (
                tuning.cloud.big_follow_speed,
                tuning.cloud.big_vertical_follow_speed,
            ),
            _ => (tuning.cloud.follow_speed, tuning.cloud.vertical_follow_speed),
        };
        let horizontal_factor = (follow_speed * dt).clamp(0.0, 1.0);
        let vertical_factor = (vertical_speed * dt).clamp(0.0, 1.0);

        let current = transform.translation;
        transform.translation = Vec3::new(
            current.x + (desired.x - current.x) * horizontal_factor,
            current.y + (desired.y - current.y) * vertical_factor,
            current.z + (desired.z - current.z) * horizontal_factor,
        );
    }
}

/// Advances launch flight clocks and applies hover compensation.
///
/// Runs before body integration: half-strength upward acceleration against
/// gravity, plus a 2% per-tick vertical velocity damp.
pub fn drive_launch_flight(
    time: Res<Time>,
    tuning: Res<Tuning>,
    mut clouds: Query<(&Cloud, &mut LaunchFlight, &mut Velocity)>,
) {
    let dt = time.delta_secs();
    for (cloud, mut flight, mut velocity) in clouds.iter_mut() {
        if cloud.is_terminal() || cloud.state != CloudState::Launched {
            continue;
        }
        flight.time_since_launch += dt;
        if flight.time_since_launch >= tuning.cloud.launch_lockout_secs {
            flight.can_retarget = true;
        }
        velocity.0.y += tuning.cloud.hover_force * 0.5 * dt;
        velocity.0.y *= 0.98;
    }
}

/// Clamps launch trajectories and probes for a landing target.
///
/// Runs after body integration so the clamp sees this tick's position. When
/// the landing probe finds a player or enemy after the lockout, the cloud
/// re-enters Following; otherwise the linger timer started at launch keeps
/// counting and eventually kills the flight.
pub fn constrain_launch(
    mut commands: Commands,
    time: Res<Time>,
    tuning: Res<Tuning>,
    ground: Res<GroundPlane>,
    mut log: ResMut<SimLog>,
    mut clouds: Query<(
        Entity,
        &mut Transform,
        &mut Cloud,
        &mut RenderColor,
        &mut LaunchFlight,
        &mut Velocity,
        &mut Body,
    )>,
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

    for (entity, mut transform, mut cloud, mut color, mut flight, mut velocity, mut body) in
        clouds.iter_mut()
    {
        if cloud.is_terminal() || cloud.state != CloudState::Launched {
            continue;
        }

        // Ceiling clamp relative to the launch origin.
        let ceiling = flight.start.y + tuning.cloud.max_launch_height;
        if transform.translation.y > ceiling {
            velocity.0.y = velocity.0.y.min(0.0);
            transform.translation.y = ceiling;
        }

        // Horizontal braking once the flight has gone on or far enough.
        let traveled = Vec2::new(
            transform.translation.x - flight.start.x,
            transform.translation.z - flight.start.z,
        )
        .length();
        if flight.time_since_launch > LAUNCH_BRAKE_AFTER_SECS
            || traveled > tuning.cloud.launch_distance_limit
        {
            velocity.0.x *= 0.7;
            velocity.0.z *= 0.7;
        }

        if flight.can_retarget {
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
                    *body = Body::kinematic();
                    velocity.0 = Vec3::ZERO;
                    commands.entity(entity).remove::<LaunchFlight>();
                    log.log(
                        SimEventType::Launch,
                        format!("launched cloud landed on a {:?}, resuming follow", hit.tag),
                    );
                    continue;
                }
            }
        }

        cloud.linger_timer -= dt;
        if cloud.linger_timer <= 0.0 {
            commands.entity(entity).despawn();
            log.log(
                SimEventType::Decay,
                "launched cloud found no target and dissipated".to_string(),
            );
        }
    }
}

/// Optional post-launch diagnostic: samples the flight position every half
/// second for a short window. Purely observational.
pub fn log_launch_flight(
    time: Res<Time>,
    mut log: ResMut<SimLog>,
    flights: Query<(&Transform, &LaunchFlight)>,
) {
    let dt = time.delta_secs();
    for (transform, flight) in flights.iter() {
        if flight.time_since_launch > LAUNCH_LOG_WINDOW_SECS {
            continue;
        }
        let previous = flight.time_since_launch - dt;
        let crossed = (previous / LAUNCH_LOG_INTERVAL_SECS).floor()
            != (flight.time_since_launch / LAUNCH_LOG_INTERVAL_SECS).floor();
        if crossed {
            let p = transform.translation;
            log.log(
                SimEventType::Launch,
                format!("flight position sample: {:.2} {:.2} {:.2}", p.x, p.y, p.z),
            );
        }
    }
}

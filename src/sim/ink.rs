//! Ink deposition service
//!
//! Ground-marking driven by cloud activation and rain timers. An activated
//! cloud drops ink every tick and fully suppresses its own rain timer; an
//! inactive cloud drops on the timer and resets it to the burst or normal
//! interval. Deposition probes straight down and only marks surfaces tagged
//! ground or ink; an actor underneath occludes the ground and the drop is
//! lost.

use bevy::prelude::*;

use crate::settings::Tuning;
use crate::world::{probe_below, GroundPlane, ProbeTag};

use super::components::{Cloud, Enemy, InkEmitter, InkMark, Player, RenderColor};
use super::log::{SimEventType, SimLog};

/// Horizontal radius an existing ink mark presents to the probe.
const INK_MARK_HIT_RADIUS: f32 = 0.5;

fn ink_color() -> Color {
    Color::srgb(0.05, 0.05, 0.2)
}

/// Ticks rain timers and deposits ink.
pub fn emit_ink(
    mut commands: Commands,
    time: Res<Time>,
    tuning: Res<Tuning>,
    ground: Res<GroundPlane>,
    mut log: ResMut<SimLog>,
    mut emitters: Query<(&Transform, &Cloud, &mut InkEmitter)>,
    marks: Query<(Entity, &Transform), (With<InkMark>, Without<Cloud>)>,
    players: Query<(Entity, &Transform), (With<Player>, Without<Cloud>)>,
    enemies: Query<(Entity, &Transform), (With<Enemy>, Without<Cloud>)>,
) {
    let dt = time.delta_secs();

    let mut bodies: Vec<(Entity, Vec3, f32, ProbeTag)> = Vec::new();
    for (entity, transform) in marks.iter() {
        bodies.push((entity, transform.translation, INK_MARK_HIT_RADIUS, ProbeTag::Ink));
    }
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

    for (transform, cloud, mut emitter) in emitters.iter_mut() {
        if cloud.is_terminal() {
            continue;
        }

        if cloud.is_activated {
            drop_ink(
                &mut commands,
                &tuning,
                &ground,
                &mut log,
                &bodies,
                transform.translation,
                emitter.is_bursting,
            );
            continue;
        }

        emitter.rain_timer -= dt;
        if emitter.rain_timer <= 0.0 {
            drop_ink(
                &mut commands,
                &tuning,
                &ground,
                &mut log,
                &bodies,
                transform.translation,
                emitter.is_bursting,
            );
            emitter.rain_timer = if emitter.is_bursting {
                tuning.cloud.burst_rain_interval
            } else {
                emitter.rain_interval
            };
        }
    }
}

/// One deposition: probe down and spawn a mark if the probe strikes ground
/// or existing ink. Misses and untagged strikes are no-ops.
fn drop_ink(
    commands: &mut Commands,
    tuning: &Tuning,
    ground: &GroundPlane,
    log: &mut SimLog,
    bodies: &[(Entity, Vec3, f32, ProbeTag)],
    origin: Vec3,
    bursting: bool,
) {
    let Some(hit) = probe_below(origin, tuning.cloud.ink_probe_range, ground.height, bodies)
    else {
        return;
    };
    if !matches!(hit.tag, ProbeTag::Ground | ProbeTag::Ink) {
        return;
    }

    let size = if bursting {
        tuning.cloud.burst_ink_size
    } else {
        tuning.cloud.ink_size
    };
    let position = hit.point + Vec3::Y * 0.01;
    commands.spawn((
        InkMark { size },
        Transform {
            translation: position,
            rotation: Quat::IDENTITY,
            scale: Vec3::splat(size),
        },
        RenderColor(ink_color()),
    ));
    log.log(
        SimEventType::Ink,
        format!(
            "ink dropped at {:.1} {:.1} {:.1} (size {:.1})",
            position.x, position.y, position.z, size
        ),
    );
}

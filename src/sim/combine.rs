//! Cloud combination resolver
//!
//! Merges two clouds into one big cloud. Two triggers: a cloud escorting the
//! player scans its surroundings for a mergeable neighbor, and direct
//! contact between two clouds merges them unconditionally. The `has_combined`
//! flag makes the merge at-most-once per instance; candidates are
//! re-validated against same-pass consumption before a merge commits.

use bevy::prelude::*;
use smallvec::SmallVec;
use std::collections::HashSet;

use crate::settings::Tuning;
use crate::world::overlap_sphere;

use super::cloud::spawn_cloud;
use super::components::{Cloud, CloudKind, Player};
use super::events::CloudHandoffEvent;
use super::log::{SimEventType, SimLog};

#[derive(Clone, Copy)]
struct CloudSnapshot {
    entity: Entity,
    position: Vec3,
    target: Option<Entity>,
    eligible: bool,
}

/// One resolver pass: plan merges from a snapshot, then commit them against
/// the live world.
pub fn combine_clouds(
    mut commands: Commands,
    tuning: Res<Tuning>,
    mut log: ResMut<SimLog>,
    mut handoffs: EventWriter<CloudHandoffEvent>,
    players: Query<Entity, With<Player>>,
    mut clouds: Query<(Entity, &Transform, &mut Cloud)>,
) {
    let player = players.get_single().ok();

    let snapshot: Vec<CloudSnapshot> = clouds
        .iter()
        .map(|(entity, transform, cloud)| CloudSnapshot {
            entity,
            position: transform.translation,
            target: cloud.target,
            eligible: !cloud.is_terminal(),
        })
        .collect();

    // Iteration order decides ties; that is inherited and unspecified.
    let mut consumed: HashSet<Entity> = HashSet::new();
    let mut merges: SmallVec<[(Entity, Entity); 4]> = SmallVec::new();

    // Proximity trigger: a player-escorting cloud pulls in the first nearby
    // cloud that is not itself escorting the player.
    if let Some(player) = player {
        let positions: Vec<(Entity, Vec3)> = snapshot
            .iter()
            .filter(|c| c.eligible)
            .map(|c| (c.entity, c.position))
            .collect();
        for a in &snapshot {
            if !a.eligible || consumed.contains(&a.entity) || a.target != Some(player) {
                continue;
            }
            let nearby = overlap_sphere(a.position, tuning.cloud.combine_radius, &positions);
            for candidate in nearby {
                if candidate == a.entity || consumed.contains(&candidate) {
                    continue;
                }
                let Some(b) = snapshot.iter().find(|c| c.entity == candidate) else {
                    continue;
                };
                if b.target == Some(player) {
                    continue;
                }
                consumed.insert(a.entity);
                consumed.insert(b.entity);
                merges.push((a.entity, b.entity));
                break;
            }
        }
    }

    // Contact trigger: two touching clouds merge regardless of targets.
    for (i, a) in snapshot.iter().enumerate() {
        if !a.eligible || consumed.contains(&a.entity) {
            continue;
        }
        for b in snapshot.iter().skip(i + 1) {
            if !b.eligible || consumed.contains(&b.entity) {
                continue;
            }
            if a.position.distance(b.position) <= tuning.cloud.contact_distance {
                consumed.insert(a.entity);
                consumed.insert(b.entity);
                merges.push((a.entity, b.entity));
                break;
            }
        }
    }

    for (first, second) in merges {
        // Re-validate liveness and the at-most-once flags before committing.
        let Ok([(_, a_transform, mut a_cloud), (_, b_transform, mut b_cloud)]) =
            clouds.get_many_mut([first, second])
        else {
            continue;
        };
        if a_cloud.is_terminal() || b_cloud.is_terminal() {
            continue;
        }
        a_cloud.has_combined = true;
        b_cloud.has_combined = true;

        let midpoint = (a_transform.translation + b_transform.translation) / 2.0;
        let big = spawn_cloud(
            &mut commands,
            &tuning,
            midpoint,
            Quat::IDENTITY,
            player,
            CloudKind::Big,
        );
        handoffs.send(CloudHandoffEvent {
            new_cloud: big,
            replaces: None,
        });
        commands.entity(first).despawn();
        commands.entity(second).despawn();
        log.log(
            SimEventType::Combine,
            format!(
                "two clouds combined into a big cloud at {:.1} {:.1} {:.1}",
                midpoint.x, midpoint.y, midpoint.z
            ),
        );
    }
}

//! World query service
//!
//! The capability boundary the cloud simulation assumes from its host world:
//! downward ray probes, sphere overlap queries, and velocity/gravity
//! integration for dynamic bodies. The world is a flat ground plane plus a
//! set of tagged positions; there is no physics engine behind this module.

use bevy::prelude::*;
use smallvec::SmallVec;

/// Gravity applied to dynamic bodies, in units per second squared.
pub const GRAVITY: f32 = 9.81;

/// The flat ground plane every probe can hit.
#[derive(Resource)]
pub struct GroundPlane {
    pub height: f32,
}

impl Default for GroundPlane {
    fn default() -> Self {
        Self { height: 0.0 }
    }
}

/// Linear velocity of a simulated body.
#[derive(Component, Default, Debug, Clone, Copy)]
pub struct Velocity(pub Vec3);

/// Physical mode of a simulated body.
///
/// Kinematic bodies are positioned directly by gameplay systems and ignore
/// gravity; dynamic bodies fall and integrate their velocity each tick.
#[derive(Component, Debug, Clone, Copy)]
pub struct Body {
    pub kinematic: bool,
    pub gravity: bool,
}

impl Body {
    pub fn kinematic() -> Self {
        Self {
            kinematic: true,
            gravity: false,
        }
    }

    pub fn dynamic() -> Self {
        Self {
            kinematic: false,
            gravity: true,
        }
    }
}

/// Tag carried by probe-visible things, standing in for engine object tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeTag {
    Ground,
    Ink,
    Player,
    Enemy,
}

/// Result of a downward probe.
#[derive(Debug, Clone, Copy)]
pub struct ProbeHit {
    /// The entity that was struck. `None` for the ground plane itself.
    pub entity: Option<Entity>,
    pub point: Vec3,
    pub tag: ProbeTag,
}

/// Casts a probe straight down from `origin` over at most `range` units.
///
/// `bodies` are probe-visible obstacles as `(entity, position, hit_radius,
/// tag)`; a body is struck when it sits below the origin, within `range`
/// vertically and within `hit_radius` horizontally. The nearest strike wins,
/// so an actor standing on the ground occludes the ground beneath it.
pub fn probe_below(
    origin: Vec3,
    range: f32,
    ground_height: f32,
    bodies: &[(Entity, Vec3, f32, ProbeTag)],
) -> Option<ProbeHit> {
    let mut nearest: Option<(f32, ProbeHit)> = None;

    let ground_drop = origin.y - ground_height;
    if (0.0..=range).contains(&ground_drop) {
        nearest = Some((
            ground_drop,
            ProbeHit {
                entity: None,
                point: Vec3::new(origin.x, ground_height, origin.z),
                tag: ProbeTag::Ground,
            },
        ));
    }

    for &(entity, position, hit_radius, tag) in bodies {
        let drop = origin.y - position.y;
        if !(0.0..=range).contains(&drop) {
            continue;
        }
        let horizontal = Vec2::new(origin.x - position.x, origin.z - position.z).length();
        if horizontal > hit_radius {
            continue;
        }
        if nearest.map_or(true, |(best, _)| drop < best) {
            nearest = Some((
                drop,
                ProbeHit {
                    entity: Some(entity),
                    point: position,
                    tag,
                },
            ));
        }
    }

    nearest.map(|(_, hit)| hit)
}

/// Returns every entity whose position lies within `radius` of `center`.
pub fn overlap_sphere(
    center: Vec3,
    radius: f32,
    positions: &[(Entity, Vec3)],
) -> SmallVec<[Entity; 8]> {
    positions
        .iter()
        .filter(|(_, position)| position.distance(center) <= radius)
        .map(|(entity, _)| *entity)
        .collect()
}

/// Advances dynamic bodies one tick: gravity, position integration, and a
/// hard stop at the ground plane.
pub fn integrate_bodies(
    time: Res<Time>,
    ground: Res<GroundPlane>,
    mut bodies: Query<(&Body, &mut Velocity, &mut Transform)>,
) {
    let dt = time.delta_secs();

    for (body, mut velocity, mut transform) in bodies.iter_mut() {
        if body.kinematic {
            continue;
        }
        if body.gravity {
            velocity.0.y -= GRAVITY * dt;
        }
        transform.translation += velocity.0 * dt;

        if transform.translation.y < ground.height {
            transform.translation.y = ground.height;
            velocity.0.y = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn e(index: u64) -> Entity {
        // Generation lives in the high bits and must be non-zero.
        Entity::from_bits((1 << 32) | index)
    }

    #[test]
    fn test_probe_hits_ground_plane() {
        let hit = probe_below(Vec3::new(1.0, 4.0, 2.0), 10.0, 0.0, &[]).unwrap();
        assert_eq!(hit.tag, ProbeTag::Ground);
        assert!(hit.entity.is_none());
        assert_eq!(hit.point, Vec3::new(1.0, 0.0, 2.0));
    }

    #[test]
    fn test_probe_misses_beyond_range() {
        assert!(probe_below(Vec3::new(0.0, 12.0, 0.0), 10.0, 0.0, &[]).is_none());
    }

    #[test]
    fn test_probe_prefers_nearest_body_over_ground() {
        let bodies = [(e(1), Vec3::new(0.0, 1.0, 0.0), 0.75, ProbeTag::Player)];
        let hit = probe_below(Vec3::new(0.0, 3.0, 0.0), 3.5, 0.0, &bodies).unwrap();
        assert_eq!(hit.tag, ProbeTag::Player);
        assert_eq!(hit.entity, Some(e(1)));
    }

    #[test]
    fn test_probe_ignores_horizontally_offset_body() {
        let bodies = [(e(1), Vec3::new(2.0, 1.0, 0.0), 0.75, ProbeTag::Enemy)];
        let hit = probe_below(Vec3::new(0.0, 3.0, 0.0), 3.5, 0.0, &bodies).unwrap();
        assert_eq!(hit.tag, ProbeTag::Ground);
    }

    #[test]
    fn test_probe_ignores_body_above_origin() {
        let bodies = [(e(1), Vec3::new(0.0, 5.0, 0.0), 0.75, ProbeTag::Enemy)];
        let hit = probe_below(Vec3::new(0.0, 3.0, 0.0), 3.5, 0.0, &bodies).unwrap();
        assert_eq!(hit.tag, ProbeTag::Ground);
    }

    #[test]
    fn test_overlap_sphere_filters_by_distance() {
        let positions = [
            (e(1), Vec3::ZERO),
            (e(2), Vec3::new(1.5, 0.0, 0.0)),
            (e(3), Vec3::new(5.0, 0.0, 0.0)),
        ];
        let found = overlap_sphere(Vec3::ZERO, 2.0, &positions);
        assert_eq!(found.as_slice(), &[e(1), e(2)]);
    }
}

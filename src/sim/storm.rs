//! Cloud transformation resolver
//!
//! A cloud that reaches its enemy target consumes it: the enemy dies, the
//! cloud becomes a storm cloud, and a superpower pickup scatters nearby.
//! Terminal and one-shot; the `transformed` flag keeps the resolver from
//! ever re-firing on a dying instance.

use bevy::prelude::*;

use crate::settings::Tuning;
use crate::world::{Body, GroundPlane, Velocity};

use super::cloud::spawn_cloud;
use super::components::{Cloud, CloudKind, Enemy, Pickup, RenderColor, SimRng};
use super::events::CloudHandoffEvent;
use super::log::{SimEventType, SimLog};

/// Whether transformations may spawn pickups. Scenario-configurable; a
/// disabled pickup is the missing-dependency degrade case and skips only the
/// pickup.
#[derive(Resource)]
pub struct PickupsEnabled(pub bool);

impl Default for PickupsEnabled {
    fn default() -> Self {
        Self(true)
    }
}

/// Checks enemy proximity and performs the transformation.
pub fn transform_on_enemy_proximity(
    mut commands: Commands,
    tuning: Res<Tuning>,
    ground: Res<GroundPlane>,
    pickups_enabled: Res<PickupsEnabled>,
    mut rng: ResMut<SimRng>,
    mut log: ResMut<SimLog>,
    mut handoffs: EventWriter<CloudHandoffEvent>,
    mut clouds: Query<(Entity, &Transform, &mut Cloud)>,
    enemies: Query<&Transform, (With<Enemy>, Without<Cloud>)>,
) {
    for (entity, transform, mut cloud) in clouds.iter_mut() {
        if cloud.is_terminal() {
            continue;
        }
        let Some(target) = cloud.target else {
            continue;
        };
        // Only enemy targets transform; a player target never does.
        let Ok(enemy_transform) = enemies.get(target) else {
            continue;
        };

        let distance = transform.translation.distance(enemy_transform.translation);
        if distance > tuning.cloud.proximity_distance {
            continue;
        }

        cloud.transformed = true;
        cloud.target = None;
        commands.entity(target).despawn();

        let storm = spawn_cloud(
            &mut commands,
            &tuning,
            transform.translation,
            transform.rotation,
            None,
            CloudKind::Storm,
        );
        handoffs.send(CloudHandoffEvent {
            new_cloud: storm,
            replaces: Some(entity),
        });

        if pickups_enabled.0 {
            let scatter = rng.point_in_circle() * tuning.cloud.pickup_scatter_radius;
            let position = Vec3::new(
                transform.translation.x + scatter.x,
                ground.height + tuning.cloud.pickup_drop_height,
                transform.translation.z + scatter.y,
            );
            commands.spawn((
                Pickup,
                Transform::from_translation(position),
                Velocity::default(),
                Body::dynamic(),
                RenderColor(Color::srgb(1.0, 0.2, 0.2)),
            ));
            log.log(
                SimEventType::Pickup,
                format!(
                    "superpower pickup dropped at {:.1} {:.1} {:.1}",
                    position.x, position.y, position.z
                ),
            );
        } else {
            warn!("pickups disabled, transformation spawned no pickup");
        }

        commands.entity(entity).despawn();
        log.log(
            SimEventType::Transform,
            "cloud consumed its enemy and became a storm cloud".to_string(),
        );
    }
}

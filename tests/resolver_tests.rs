//! Integration tests for the combination and transformation resolvers,
//! launch constraints, and ink deposition
//!
//! These tests verify that:
//! - Two eligible clouds merge into one big cloud at their midpoint
//! - Merged clouds are consumed exactly once and despawn the same tick
//! - Enemy proximity transforms a cloud into a storm cloud and drops a pickup
//! - The pickup can be disabled without affecting the storm cloud
//! - Launched clouds respect the ceiling clamp above their launch origin
//! - A landed cloud resumes following without moving the player's handle
//! - Ink lands on ground and is occluded by actors underneath

use bevy::prelude::*;
use std::time::Duration;

use inkfall::combat::{CombatPlugin, EnemyWeight, PlayerCombatState};
use inkfall::sim::components::{
    Cloud, CloudKind, CloudState, Enemy, InkEmitter, InkMark, LaunchFlight, Pickup, Player,
    RenderColor,
};
use inkfall::sim::events::BurstRainEvent;
use inkfall::sim::storm::PickupsEnabled;
use inkfall::sim::CloudPlugin;
use inkfall::world::{Body, Velocity};

// =============================================================================
// Test Harness
// =============================================================================

fn test_app() -> App {
    let mut app = App::new();
    app.insert_resource(Time::<()>::default());
    app.add_plugins((CloudPlugin, CombatPlugin));
    app
}

fn step(app: &mut App, dt: f32) {
    app.world_mut()
        .resource_mut::<Time>()
        .advance_by(Duration::from_secs_f32(dt));
    app.update();
}

fn spawn_player(app: &mut App, position: Vec3) -> Entity {
    app.world_mut()
        .spawn((
            Transform::from_translation(position),
            Player,
            Velocity(Vec3::ZERO),
            Body::dynamic(),
            RenderColor(Color::WHITE),
        ))
        .id()
}

fn spawn_enemy(app: &mut App, position: Vec3) -> Entity {
    app.world_mut()
        .spawn((
            Transform::from_translation(position),
            Enemy,
            EnemyWeight::new(Color::WHITE),
            Velocity(Vec3::ZERO),
            Body::dynamic(),
            RenderColor(Color::WHITE),
        ))
        .id()
}

/// Spawn a cloud entity directly, bypassing the spawn event, so the test
/// holds its handle from the start.
fn spawn_cloud_direct(
    app: &mut App,
    position: Vec3,
    target: Option<Entity>,
    kind: CloudKind,
) -> Entity {
    let cloud = Cloud::new(kind, target, 3.0);
    let color = cloud.original_color;
    app.world_mut()
        .spawn((
            cloud,
            InkEmitter::new(1.0),
            RenderColor(color),
            Transform::from_translation(position),
            Velocity(Vec3::ZERO),
            Body::kinematic(),
        ))
        .id()
}

fn clouds_of_kind(app: &mut App, kind: CloudKind) -> Vec<Entity> {
    let mut query = app.world_mut().query::<(Entity, &Cloud)>();
    query
        .iter(app.world())
        .filter(|(_, cloud)| cloud.kind == kind)
        .map(|(entity, _)| entity)
        .collect()
}

fn count_ink_marks(app: &mut App) -> usize {
    let mut query = app.world_mut().query_filtered::<(), With<InkMark>>();
    query.iter(app.world()).count()
}

// =============================================================================
// Combination Tests
// =============================================================================

#[test]
fn test_escort_cloud_merges_with_nearby_cloud() {
    let mut app = test_app();
    let player = spawn_player(&mut app, Vec3::ZERO);
    let escort = spawn_cloud_direct(
        &mut app,
        Vec3::new(0.0, 3.0, 0.0),
        Some(player),
        CloudKind::Normal,
    );
    let other = spawn_cloud_direct(&mut app, Vec3::new(1.2, 3.0, 0.0), None, CloudKind::Normal);
    step(&mut app, 1.0 / 60.0);

    assert!(app.world().get::<Cloud>(escort).is_none());
    assert!(app.world().get::<Cloud>(other).is_none());

    let bigs = clouds_of_kind(&mut app, CloudKind::Big);
    assert_eq!(bigs.len(), 1, "exactly one big cloud should result");
    let big = app.world().get::<Cloud>(bigs[0]).unwrap();
    assert_eq!(big.target, Some(player));
    assert_eq!(big.state, CloudState::Following);

    // The midpoint is between the two source clouds.
    let position = app.world().get::<Transform>(bigs[0]).unwrap().translation;
    assert!(position.x > 0.0 && position.x < 1.2);

    // The big cloud becomes the player's active cloud.
    let combat = app.world().resource::<PlayerCombatState>();
    assert_eq!(combat.current_cloud, Some(bigs[0]));
}

#[test]
fn test_contact_merges_clouds_without_player() {
    let mut app = test_app();
    let a = spawn_cloud_direct(&mut app, Vec3::new(0.0, 30.0, 0.0), None, CloudKind::Normal);
    let b = spawn_cloud_direct(&mut app, Vec3::new(0.5, 30.0, 0.0), None, CloudKind::Normal);
    step(&mut app, 1.0 / 60.0);

    assert!(app.world().get::<Cloud>(a).is_none());
    assert!(app.world().get::<Cloud>(b).is_none());
    assert_eq!(clouds_of_kind(&mut app, CloudKind::Big).len(), 1);
}

#[test]
fn test_distant_clouds_do_not_merge() {
    let mut app = test_app();
    let a = spawn_cloud_direct(&mut app, Vec3::new(0.0, 30.0, 0.0), None, CloudKind::Normal);
    let b = spawn_cloud_direct(&mut app, Vec3::new(10.0, 30.0, 0.0), None, CloudKind::Normal);
    step(&mut app, 1.0 / 60.0);

    assert!(app.world().get::<Cloud>(a).is_some());
    assert!(app.world().get::<Cloud>(b).is_some());
    assert!(clouds_of_kind(&mut app, CloudKind::Big).is_empty());
}

#[test]
fn test_three_touching_clouds_merge_one_pair_only() {
    let mut app = test_app();
    spawn_cloud_direct(&mut app, Vec3::new(0.0, 30.0, 0.0), None, CloudKind::Normal);
    spawn_cloud_direct(&mut app, Vec3::new(0.5, 30.0, 0.0), None, CloudKind::Normal);
    spawn_cloud_direct(&mut app, Vec3::new(1.0, 30.0, 0.0), None, CloudKind::Normal);
    step(&mut app, 1.0 / 60.0);

    // One merge consumes two clouds; the third is left for a later pass.
    assert_eq!(clouds_of_kind(&mut app, CloudKind::Big).len(), 1);
    assert_eq!(clouds_of_kind(&mut app, CloudKind::Normal).len(), 1);
}

// =============================================================================
// Transformation Tests
// =============================================================================

#[test]
fn test_enemy_proximity_transforms_cloud() {
    let mut app = test_app();
    let enemy = spawn_enemy(&mut app, Vec3::ZERO);
    let cloud = spawn_cloud_direct(
        &mut app,
        Vec3::new(0.0, 3.0, 0.0),
        Some(enemy),
        CloudKind::Normal,
    );
    step(&mut app, 1.0 / 60.0);

    assert!(app.world().get::<Enemy>(enemy).is_none(), "enemy consumed");
    assert!(app.world().get::<Cloud>(cloud).is_none(), "source cloud gone");

    let storms = clouds_of_kind(&mut app, CloudKind::Storm);
    assert_eq!(storms.len(), 1);
    let storm = app.world().get::<Cloud>(storms[0]).unwrap();
    assert_eq!(storm.state, CloudState::Lingering);
    assert!(storm.target.is_none());

    // A pickup scattered near the transformation site.
    let mut pickups = app
        .world_mut()
        .query_filtered::<&Transform, With<Pickup>>();
    let pickup = pickups.single(app.world());
    let horizontal = Vec2::new(pickup.translation.x, pickup.translation.z).length();
    assert!(horizontal <= 2.01, "pickup scatters within the radius");
}

#[test]
fn test_transformation_hands_storm_cloud_to_player() {
    let mut app = test_app();
    let enemy = spawn_enemy(&mut app, Vec3::ZERO);
    let cloud = spawn_cloud_direct(
        &mut app,
        Vec3::new(0.0, 3.0, 0.0),
        Some(enemy),
        CloudKind::Normal,
    );
    app.world_mut()
        .resource_mut::<PlayerCombatState>()
        .current_cloud = Some(cloud);
    step(&mut app, 1.0 / 60.0);

    let storms = clouds_of_kind(&mut app, CloudKind::Storm);
    let combat = app.world().resource::<PlayerCombatState>();
    assert_eq!(combat.current_cloud, Some(storms[0]));
}

#[test]
fn test_transformation_ignores_unrelated_handle() {
    let mut app = test_app();
    let enemy = spawn_enemy(&mut app, Vec3::ZERO);
    spawn_cloud_direct(
        &mut app,
        Vec3::new(0.0, 3.0, 0.0),
        Some(enemy),
        CloudKind::Normal,
    );
    let unrelated = spawn_cloud_direct(
        &mut app,
        Vec3::new(50.0, 30.0, 0.0),
        None,
        CloudKind::Normal,
    );
    app.world_mut()
        .resource_mut::<PlayerCombatState>()
        .current_cloud = Some(unrelated);
    step(&mut app, 1.0 / 60.0);

    // The handle pointed elsewhere; the conditional handoff must not apply.
    let combat = app.world().resource::<PlayerCombatState>();
    assert_eq!(combat.current_cloud, Some(unrelated));
}

#[test]
fn test_disabled_pickups_skip_only_the_pickup() {
    let mut app = test_app();
    app.insert_resource(PickupsEnabled(false));
    let enemy = spawn_enemy(&mut app, Vec3::ZERO);
    spawn_cloud_direct(
        &mut app,
        Vec3::new(0.0, 3.0, 0.0),
        Some(enemy),
        CloudKind::Normal,
    );
    step(&mut app, 1.0 / 60.0);

    assert_eq!(clouds_of_kind(&mut app, CloudKind::Storm).len(), 1);
    let mut pickups = app.world_mut().query_filtered::<(), With<Pickup>>();
    assert_eq!(pickups.iter(app.world()).count(), 0);
}

#[test]
fn test_player_target_never_transforms() {
    let mut app = test_app();
    let player = spawn_player(&mut app, Vec3::ZERO);
    let cloud = spawn_cloud_direct(
        &mut app,
        Vec3::new(0.0, 3.0, 0.0),
        Some(player),
        CloudKind::Normal,
    );
    step(&mut app, 1.0 / 60.0);

    assert!(app.world().get::<Cloud>(cloud).is_some());
    assert!(clouds_of_kind(&mut app, CloudKind::Storm).is_empty());
}

// =============================================================================
// Launch Constraint Tests
// =============================================================================

#[test]
fn test_launched_cloud_respects_ceiling_clamp() {
    let mut app = test_app();
    let start = Vec3::new(0.0, 1.0, 0.0);
    let mut cloud = Cloud::new(CloudKind::Normal, None, 3.0);
    cloud.state = CloudState::Launched;
    let color = cloud.original_color;
    let entity = app
        .world_mut()
        .spawn((
            cloud,
            InkEmitter::new(1.0),
            RenderColor(color),
            Transform::from_translation(start),
            Velocity(Vec3::new(0.0, 40.0, 0.0)),
            Body::dynamic(),
            LaunchFlight::new(start),
        ))
        .id();

    // Default max launch height is 5 above the origin.
    let ceiling = start.y + 5.0;
    for _ in 0..120 {
        step(&mut app, 1.0 / 60.0);
        let Some(transform) = app.world().get::<Transform>(entity) else {
            break; // lingered out, which is fine
        };
        assert!(
            transform.translation.y <= ceiling + 1e-3,
            "cloud rose above the launch ceiling: {}",
            transform.translation.y
        );
    }
}

#[test]
fn test_landing_on_player_resumes_follow_without_handoff() {
    let mut app = test_app();
    // Player center above the ground so the probe strikes it before the plane.
    let player = spawn_player(&mut app, Vec3::new(0.0, 1.0, 0.0));
    let start = Vec3::new(0.0, 3.0, 0.0);
    let mut cloud = Cloud::new(CloudKind::Normal, None, 3.0);
    cloud.state = CloudState::Launched;
    let color = cloud.original_color;
    let entity = app
        .world_mut()
        .spawn((
            cloud,
            InkEmitter::new(1.0),
            RenderColor(color),
            Transform::from_translation(start),
            Velocity(Vec3::ZERO),
            Body::dynamic(),
            LaunchFlight {
                start,
                time_since_launch: 5.0,
                can_retarget: true,
            },
        ))
        .id();
    step(&mut app, 1.0 / 60.0);

    let state = app.world().get::<Cloud>(entity).unwrap();
    assert_eq!(state.state, CloudState::Following);
    assert_eq!(state.target, Some(player));
    assert!(app.world().get::<LaunchFlight>(entity).is_none());

    // Landing resumes the follow but never reassigns the player's
    // active-cloud handle. That only moves on merge and transformation.
    let combat = app.world().resource::<PlayerCombatState>();
    assert_eq!(combat.current_cloud, None);
}

// =============================================================================
// Ink Deposition Tests
// =============================================================================

#[test]
fn test_rain_timer_drops_ink_on_ground() {
    let mut app = test_app();
    spawn_cloud_direct(&mut app, Vec3::new(0.0, 3.0, 0.0), None, CloudKind::Normal);

    // Interval is 1.0s; nothing lands before it elapses.
    step(&mut app, 0.5);
    assert_eq!(count_ink_marks(&mut app), 0);
    step(&mut app, 0.6);
    assert_eq!(count_ink_marks(&mut app), 1);

    let mut marks = app.world_mut().query::<(&Transform, &InkMark)>();
    let (transform, mark) = marks.single(app.world());
    assert!(transform.translation.y > 0.0 && transform.translation.y < 0.05);
    assert_eq!(mark.size, 0.2, "a plain drop carries the normal ink size");
}

#[test]
fn test_actor_underneath_occludes_ink() {
    let mut app = test_app();
    spawn_player(&mut app, Vec3::new(0.0, 1.0, 0.0));
    spawn_cloud_direct(&mut app, Vec3::new(0.0, 3.0, 0.0), Some(Entity::PLACEHOLDER), CloudKind::Normal);

    // The stale placeholder target lingers the cloud above the player; every
    // drop probes into the player and is lost.
    step(&mut app, 0.7);
    step(&mut app, 0.7);
    assert_eq!(count_ink_marks(&mut app), 0);
}

#[test]
fn test_burst_rain_drops_immediately_and_rains_faster() {
    let mut app = test_app();
    let cloud = spawn_cloud_direct(&mut app, Vec3::new(0.0, 3.0, 0.0), None, CloudKind::Normal);

    app.world_mut().send_event(BurstRainEvent { cloud });
    step(&mut app, 1.0 / 60.0);
    assert_eq!(count_ink_marks(&mut app), 1, "burst zeroes the rain timer");

    // Burst interval is 0.2s, well under the normal 1.0s.
    step(&mut app, 0.25);
    assert_eq!(count_ink_marks(&mut app), 2);

    let mut marks = app.world_mut().query::<&InkMark>();
    for mark in marks.iter(app.world()) {
        assert_eq!(mark.size, 0.3, "burst drops carry the larger ink size");
    }
}

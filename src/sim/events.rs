//! Cloud command and notification events
//!
//! The public contract between the combat/input layer and the cloud core.
//! Commands flow in as events; the only thing flowing back out is the
//! handle-handoff notification. Invalid-state commands are ignored with a
//! debug log, never an error.

use bevy::prelude::*;

use super::components::CloudKind;

/// Request to spawn a cloud. Scenario-driven spawns go through this event;
/// the combat layer spawns directly via [`super::cloud::spawn_cloud`] when
/// it needs the handle back.
#[derive(Event)]
pub struct SpawnCloudEvent {
    pub position: Vec3,
    /// Initial follow target, if any
    pub target: Option<Entity>,
    pub kind: CloudKind,
}

/// Command: stop following and get ready to be launched.
///
/// Only valid while the cloud is Following and `issuer` is its current
/// target; anything else is a logged no-op.
#[derive(Event)]
pub struct PrepareLaunchEvent {
    pub cloud: Entity,
    /// The entity issuing the command (the owning player)
    pub issuer: Entity,
}

/// Command: launch the cloud ballistically.
///
/// Only valid after a successful prepare. The launch origin is recorded from
/// the cloud's transform when the command is processed.
#[derive(Event)]
pub struct LaunchCloudEvent {
    pub cloud: Entity,
    /// Initial launch velocity, computed by the caller
    pub velocity: Vec3,
}

/// Command: activate the cloud for `duration` seconds. Legal in any state.
#[derive(Event)]
pub struct ActivateCloudEvent {
    pub cloud: Entity,
    pub duration: f32,
}

/// Command: start burst rain. Zeroes the rain timer so the next tick
/// deposits immediately and shortens subsequent intervals.
#[derive(Event)]
pub struct BurstRainEvent {
    pub cloud: Entity,
}

/// Notification: the player's active-cloud handle should change.
///
/// Fired by the merge and transformation resolvers. The combat layer owns
/// the handle; cloud internals never read player state.
#[derive(Event)]
pub struct CloudHandoffEvent {
    /// The cloud the handle should now point at
    pub new_cloud: Entity,
    /// When set, the assignment is conditional: apply it only if the handle
    /// currently points at this (dying) cloud. When `None`, assign
    /// unconditionally.
    pub replaces: Option<Entity>,
}

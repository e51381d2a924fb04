//! Cloud simulation
//!
//! The core of the prototype: cloud entities with their lifecycle state
//! machine, the movement controller, the combination and transformation
//! resolvers, and the ink deposition service.

use bevy::prelude::*;

pub mod cloud;
pub mod combine;
pub mod components;
pub mod events;
pub mod ink;
pub mod log;
pub mod movement;
pub mod storm;

use events::*;

/// System set labels for the simulation tick.
///
/// Systems run in three ordered phases with a command flush between them,
/// so anything despawned in one phase is really gone before the next.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimPhase {
    /// Clock, spawns, command processing, timer updates, liveness checks
    TimersAndState,
    /// Follow lerp, launch ballistics, body integration, ink deposition
    Movement,
    /// Merge and transformation resolvers
    Resolution,
}

/// Configures the ordering between simulation phases.
///
/// Call once during app setup before adding simulation systems.
pub fn configure_sim_phases(app: &mut App) {
    app.configure_sets(
        Update,
        (
            SimPhase::TimersAndState,
            SimPhase::Movement,
            SimPhase::Resolution,
        )
            .chain(),
    );
}

/// Plugin wiring the cloud simulation into an app.
pub struct CloudPlugin;

impl Plugin for CloudPlugin {
    fn build(&self, app: &mut App) {
        configure_sim_phases(app);

        // Load tuning from file
        let tuning = crate::settings::Tuning::load();

        app
            // Command events of the public contract
            .add_event::<SpawnCloudEvent>()
            .add_event::<PrepareLaunchEvent>()
            .add_event::<LaunchCloudEvent>()
            .add_event::<ActivateCloudEvent>()
            .add_event::<BurstRainEvent>()
            .add_event::<CloudHandoffEvent>()
            // Resources
            .insert_resource(tuning)
            .init_resource::<crate::world::GroundPlane>()
            .init_resource::<components::SimRng>()
            .init_resource::<log::SimLog>()
            .init_resource::<storm::PickupsEnabled>();

        // Phase 1: clocks, spawns, commands, state validation
        app.add_systems(
            Update,
            (
                log::tick_sim_clock,
                cloud::spawn_requested_clouds,
                cloud::process_cloud_commands,
                cloud::validate_targets,
                cloud::tick_activation,
            )
                .chain()
                .in_set(SimPhase::TimersAndState),
        );

        // Flush deferred commands between phases
        app.add_systems(
            Update,
            apply_deferred
                .after(SimPhase::TimersAndState)
                .before(SimPhase::Movement),
        );

        // Phase 2: movement, physics, decay, ink
        app.add_systems(
            Update,
            (
                movement::follow_targets,
                movement::drive_launch_flight,
                crate::world::integrate_bodies,
                movement::constrain_launch,
                cloud::decay_targetless,
                ink::emit_ink,
                movement::log_launch_flight,
            )
                .chain()
                .in_set(SimPhase::Movement),
        );

        app.add_systems(
            Update,
            apply_deferred
                .after(SimPhase::Movement)
                .before(SimPhase::Resolution),
        );

        // Phase 3: resolvers
        app.add_systems(
            Update,
            (
                storm::transform_on_enemy_proximity,
                combine::combine_clouds,
            )
                .chain()
                .in_set(SimPhase::Resolution),
        );
    }
}

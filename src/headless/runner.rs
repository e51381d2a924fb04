//! Headless scenario execution
//!
//! Runs cloud-simulation scenarios without any graphical output, suitable
//! for automated testing and tuning runs.

use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;
use serde::Serialize;
use std::time::Duration;

use crate::combat::player::{PlayerAction, PlayerCombatState};
use crate::combat::weight::EnemyWeight;
use crate::combat::{CombatPlugin, ComboState};
use crate::settings::Tuning;
use crate::sim::cloud::spawn_cloud;
use crate::sim::components::{Cloud, Enemy, InkMark, Player, SimRng};
use crate::sim::log::{SimEventType, SimLog, SimLogEntry};
use crate::sim::storm::PickupsEnabled;
use crate::sim::{CloudPlugin, SimPhase};
use crate::world::{Body, Velocity};

use super::config::{ScenarioConfig, TargetRef};

const PLAYER_COLOR: Color = Color::srgb(0.2, 0.45, 0.85);
const ENEMY_COLOR: Color = Color::srgb(0.85, 0.3, 0.2);

/// Summary of a completed scenario
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    /// Scenario duration in seconds
    pub duration: f32,
    /// Number of cloud merges that occurred
    pub combines: usize,
    /// Number of storm transformations that occurred
    pub transforms: usize,
    /// Ink marks on the ground at scenario end
    pub ink_marks: usize,
    /// Clouds alive at scenario end
    pub clouds_alive: usize,
    /// Enemies alive at scenario end
    pub enemies_alive: usize,
    /// Highest style combo reached
    pub peak_combo: u32,
    /// Style rank the peak combo earned
    pub peak_rank: String,
    /// Random seed used (if deterministic mode)
    pub random_seed: Option<u64>,
}

/// Full report written to disk: summary plus the event log
#[derive(Debug, Serialize)]
struct ScenarioReport {
    summary: ScenarioResult,
    log: Vec<SimLogEntry>,
}

/// Resource to track headless scenario state
#[derive(Resource)]
pub struct HeadlessState {
    /// Maximum scenario duration before forcing an end
    pub max_duration: f32,
    /// Elapsed scenario time
    pub elapsed_time: f32,
    /// Custom output path for the result summary
    pub output_path: Option<String>,
    /// Whether the scenario has completed
    pub complete: bool,
    /// Random seed for deterministic simulation (if provided)
    pub random_seed: Option<u64>,
    /// Scenario result (populated on completion)
    pub result: Option<ScenarioResult>,
}

/// The timed action script, consumed as scenario time advances
#[derive(Resource)]
struct ScenarioScript {
    entries: Vec<(f32, PlayerAction)>,
    fired: Vec<bool>,
    elapsed: f32,
}

/// Plugin for headless scenario execution
pub struct ScenarioPlugin {
    pub config: ScenarioConfig,
}

impl Plugin for ScenarioPlugin {
    fn build(&self, app: &mut App) {
        let entries: Vec<(f32, PlayerAction)> = self
            .config
            .actions
            .iter()
            .map(|a| {
                let action = a.to_player_action().expect("Invalid scenario action");
                (a.time, action)
            })
            .collect();
        let fired = vec![false; entries.len()];

        app.insert_resource(self.config.clone())
            .insert_resource(HeadlessState {
                max_duration: self.config.max_duration_secs,
                elapsed_time: 0.0,
                output_path: self.config.output_path.clone(),
                complete: false,
                random_seed: self.config.random_seed,
                result: None,
            })
            .insert_resource(ScenarioScript {
                entries,
                fired,
                elapsed: 0.0,
            })
            .add_systems(Startup, setup_scenario)
            .add_systems(
                Update,
                dispatch_scripted_actions.before(SimPhase::TimersAndState),
            )
            .add_systems(
                Update,
                (track_scenario_time, check_scenario_end)
                    .chain()
                    .after(SimPhase::Resolution),
            )
            .add_systems(PostUpdate, exit_on_complete);
    }
}

/// Spawns the scenario's initial arrangement of player, enemies and clouds.
fn setup_scenario(
    mut commands: Commands,
    config: Res<ScenarioConfig>,
    tuning: Res<Tuning>,
    mut log: ResMut<SimLog>,
    mut player_state: ResMut<PlayerCombatState>,
) {
    log.clear();
    log.log(
        SimEventType::Command,
        "Scenario started (headless mode)".to_string(),
    );

    let rng = match config.random_seed {
        Some(seed) => {
            info!("Using deterministic RNG with seed: {}", seed);
            SimRng::from_seed(seed)
        }
        None => {
            info!("Using non-deterministic RNG (no seed provided)");
            SimRng::from_entropy()
        }
    };
    commands.insert_resource(rng);
    commands.insert_resource(PickupsEnabled(config.pickups_enabled));

    let [px, py, pz] = config.player_position;
    let player = commands
        .spawn((
            Transform::from_xyz(px, py, pz),
            Player,
            Velocity(Vec3::ZERO),
            Body::dynamic(),
            crate::sim::components::RenderColor(PLAYER_COLOR),
        ))
        .id();

    let enemies: Vec<Entity> = config
        .enemies
        .iter()
        .map(|&[x, y, z]| {
            commands
                .spawn((
                    Transform::from_xyz(x, y, z),
                    Enemy,
                    EnemyWeight::new(ENEMY_COLOR),
                    crate::sim::components::RenderColor(ENEMY_COLOR),
                    Velocity(Vec3::ZERO),
                    Body::dynamic(),
                ))
                .id()
        })
        .collect();

    for placement in &config.clouds {
        let kind =
            ScenarioConfig::parse_kind(&placement.kind).expect("Invalid scenario cloud kind");
        let target = placement.target.as_deref().map(|t| {
            match ScenarioConfig::parse_target(t).expect("Invalid scenario cloud target") {
                TargetRef::Player => player,
                TargetRef::Enemy(index) => enemies[index],
            }
        });
        let [x, y, z] = placement.position;
        let cloud = spawn_cloud(
            &mut commands,
            &tuning,
            Vec3::new(x, y, z),
            Quat::IDENTITY,
            target,
            kind,
        );
        // A cloud already escorting the player starts as the active cloud.
        if target == Some(player) && player_state.current_cloud.is_none() {
            player_state.current_cloud = Some(cloud);
        }
    }

    info!(
        "Scenario setup complete: {} enemies, {} clouds",
        config.enemies.len(),
        config.clouds.len()
    );
}

/// Fires scripted actions whose timestamp has been reached.
fn dispatch_scripted_actions(
    time: Res<Time>,
    mut script: ResMut<ScenarioScript>,
    mut actions: EventWriter<PlayerAction>,
) {
    script.elapsed += time.delta_secs();
    let elapsed = script.elapsed;
    let ScenarioScript { entries, fired, .. } = &mut *script;
    for (i, (at, action)) in entries.iter().enumerate() {
        if !fired[i] && *at <= elapsed {
            fired[i] = true;
            actions.send(*action);
        }
    }
}

/// Track elapsed scenario time (used for timeout detection).
fn track_scenario_time(time: Res<Time>, mut state: ResMut<HeadlessState>) {
    state.elapsed_time += time.delta_secs();
}

/// Ends the scenario on timeout, or early once the script is exhausted, all
/// enemies are gone and no cloud is still in flight.
#[allow(clippy::too_many_arguments)]
fn check_scenario_end(
    mut state: ResMut<HeadlessState>,
    script: Res<ScenarioScript>,
    log: Res<SimLog>,
    combo: Res<ComboState>,
    clouds: Query<&Cloud>,
    enemies: Query<(), With<Enemy>>,
    ink: Query<(), With<InkMark>>,
) {
    if state.complete {
        return;
    }

    let timed_out = state.elapsed_time >= state.max_duration;
    let script_done = script.fired.iter().all(|f| *f);
    let settled = script_done
        && enemies.is_empty()
        && clouds.iter().all(|cloud| !cloud.is_launched());

    if !timed_out && !settled {
        return;
    }

    if timed_out {
        info!("Scenario timed out after {:.1}s", state.elapsed_time);
    } else {
        info!("Scenario settled after {:.1}s", state.elapsed_time);
    }

    let result = ScenarioResult {
        duration: state.elapsed_time,
        combines: log.count_of(SimEventType::Combine),
        transforms: log.count_of(SimEventType::Transform),
        ink_marks: ink.iter().count(),
        clouds_alive: clouds.iter().count(),
        enemies_alive: enemies.iter().count(),
        peak_combo: combo.peak,
        peak_rank: combo.peak_rank().as_str().to_string(),
        random_seed: state.random_seed,
    };
    save_report(&result, &log, state.output_path.as_deref());
    state.result = Some(result);
    state.complete = true;
}

/// Write the report JSON to disk.
fn save_report(result: &ScenarioResult, log: &SimLog, output_path: Option<&str>) {
    let report = ScenarioReport {
        summary: result.clone(),
        log: log.entries.clone(),
    };
    let path = output_path.unwrap_or("scenario_result.json");
    match serde_json::to_string_pretty(&report)
        .map_err(|e| e.to_string())
        .and_then(|json| std::fs::write(path, json).map_err(|e| e.to_string()))
    {
        Ok(()) => println!("Scenario complete. Report saved to: {}", path),
        Err(e) => eprintln!("Failed to save scenario report: {}", e),
    }
}

/// Exit the app when the scenario is complete
fn exit_on_complete(state: Res<HeadlessState>, mut exit: EventWriter<AppExit>) {
    if state.complete {
        exit.send(AppExit::Success);
    }
}

/// Run a headless scenario with the given configuration, returning the
/// result summary that was also written to the report file.
pub fn run_scenario(config: ScenarioConfig) -> Result<ScenarioResult, String> {
    config.validate()?;

    println!("Starting headless scenario...");
    println!("  Enemies: {}", config.enemies.len());
    println!("  Clouds: {}", config.clouds.len());
    println!("  Scripted actions: {}", config.actions.len());
    println!("  Max duration: {:.0}s", config.max_duration_secs);

    let mut app = App::new();
    app
        // Minimal plugins - no window, no rendering
        .add_plugins(
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
                1.0 / 60.0,
            ))),
        )
        // Transform plugin needed for entity positions
        .add_plugins(TransformPlugin)
        // The simulation and the player layer on top of it
        .add_plugins((CloudPlugin, CombatPlugin))
        // Scenario setup, script dispatch and end detection
        .add_plugins(ScenarioPlugin { config });
    app.run();

    app.world()
        .resource::<HeadlessState>()
        .result
        .clone()
        .ok_or_else(|| "Scenario ended without producing a result".to_string())
}

//! Component definitions for the cloud simulation
//!
//! All ECS components, resources, and data structures owned by the cloud
//! lifecycle. The state machine itself lives in the systems; these types
//! only carry its data and expose read-only queries.

use bevy::prelude::*;
use rand::prelude::*;

/// Lifecycle state of a cloud entity.
///
/// Combined and Transformed are terminal and are not states here: they are
/// modeled by the `has_combined` / `transformed` flags on [`Cloud`] plus a
/// same-tick despawn, because a cloud in either of them never ticks again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloudState {
    /// Tracking a live target with lag.
    Following,
    /// Launch command received; target cleared, motion frozen.
    PreparingLaunch,
    /// Ballistic flight with hover compensation.
    Launched,
    /// Targetless; fading out on the linger timer.
    Lingering,
}

/// What kind of cloud this is. Big and storm clouds rain faster; big clouds
/// follow more sluggishly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloudKind {
    Normal,
    Big,
    Storm,
}

impl CloudKind {
    pub fn name(&self) -> &'static str {
        match self {
            CloudKind::Normal => "Cloud",
            CloudKind::Big => "BigCloud",
            CloudKind::Storm => "StormCloud",
        }
    }
}

/// The cloud entity's state machine data.
#[derive(Component)]
pub struct Cloud {
    pub kind: CloudKind,
    pub state: CloudState,
    /// Weak reference to the followed entity. Liveness-checked every tick;
    /// never owned by the cloud.
    pub target: Option<Entity>,
    /// Counts down while targetless; expiry is the sole natural death.
    pub linger_timer: f32,
    /// Remaining activation window, meaningful while `is_activated`.
    pub activation_timer: f32,
    pub is_activated: bool,
    /// Terminal merge flag. Set at most once; after it is set the instance
    /// is despawned the same tick and must issue no further effects.
    pub has_combined: bool,
    /// Terminal transformation flag, same contract as `has_combined`.
    pub transformed: bool,
    /// Color restored on deactivation and on retarget.
    pub original_color: Color,
}

impl Cloud {
    pub fn new(kind: CloudKind, target: Option<Entity>, linger_time: f32) -> Self {
        let original_color = match kind {
            CloudKind::Normal => Color::srgb(0.9, 0.9, 0.95),
            CloudKind::Big => Color::srgb(0.75, 0.75, 0.85),
            CloudKind::Storm => Color::srgb(0.3, 0.3, 0.4),
        };
        Self {
            kind,
            state: if target.is_some() {
                CloudState::Following
            } else {
                CloudState::Lingering
            },
            target,
            linger_timer: linger_time,
            activation_timer: 0.0,
            is_activated: false,
            has_combined: false,
            transformed: false,
            original_color,
        }
    }

    pub fn is_launched(&self) -> bool {
        self.state == CloudState::Launched
    }

    pub fn is_preparing_launch(&self) -> bool {
        self.state == CloudState::PreparingLaunch
    }

    pub fn is_activated(&self) -> bool {
        self.is_activated
    }

    /// A terminal cloud is scheduled for destruction and is skipped by every
    /// downstream system in the same tick.
    pub fn is_terminal(&self) -> bool {
        self.has_combined || self.transformed
    }
}

/// Periodic ink emission state, one per cloud.
#[derive(Component)]
pub struct InkEmitter {
    /// Interval between drops outside burst mode. Big and storm clouds get
    /// shortened intervals at spawn.
    pub rain_interval: f32,
    pub rain_timer: f32,
    pub is_bursting: bool,
}

impl InkEmitter {
    pub fn new(rain_interval: f32) -> Self {
        Self {
            rain_interval,
            rain_timer: rain_interval,
            is_bursting: false,
        }
    }
}

/// Flight bookkeeping, present only while a cloud is in the Launched state.
#[derive(Component)]
pub struct LaunchFlight {
    /// Position recorded when the launch command was processed.
    pub start: Vec3,
    pub time_since_launch: f32,
    /// Set after the lockout elapses; gates the landing probe.
    pub can_retarget: bool,
}

impl LaunchFlight {
    pub fn new(start: Vec3) -> Self {
        Self {
            start,
            time_since_launch: 0.0,
            can_retarget: false,
        }
    }
}

/// Current render color of an entity. Never drawn in this crate, but the
/// state machine mutates it (activation swap, linger fade) so it is real
/// simulation data.
#[derive(Component, Debug, Clone, Copy)]
pub struct RenderColor(pub Color);

/// Marker for the player actor.
#[derive(Component)]
pub struct Player;

/// Marker for enemy actors.
#[derive(Component)]
pub struct Enemy;

/// Marker for superpower pickups dropped by transformations.
#[derive(Component)]
pub struct Pickup;

/// An ink mark left on the ground. Probe-visible as ink so later drops can
/// land on existing marks.
#[derive(Component)]
pub struct InkMark {
    pub size: f32,
}

/// Random number generator for the simulation.
///
/// Wraps a seedable RNG so scenarios can run deterministically: the same
/// seed always produces the same pickup scatter. Without a seed, uses system
/// entropy.
#[derive(Resource)]
pub struct SimRng {
    rng: StdRng,
    /// The seed used to initialize this RNG (if deterministic)
    pub seed: Option<u64>,
}

impl SimRng {
    /// Create a SimRng with a specific seed for deterministic behavior
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    /// Create a SimRng from system entropy (non-deterministic)
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            seed: None,
        }
    }

    /// A random point inside the unit circle, as an XZ offset.
    pub fn point_in_circle(&mut self) -> Vec2 {
        // Rejection sampling keeps the distribution uniform.
        loop {
            let candidate = Vec2::new(
                self.rng.gen_range(-1.0..=1.0),
                self.rng.gen_range(-1.0..=1.0),
            );
            if candidate.length_squared() <= 1.0 {
                return candidate;
            }
        }
    }
}

impl Default for SimRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

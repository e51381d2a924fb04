//! Combo scoring
//!
//! Tracks a running combo count with a short decay window and maps it to a
//! style rank. Purely score-keeping; nothing reads the rank back into the
//! simulation.

use bevy::prelude::*;

/// Style grades, worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StyleRank {
    D,
    C,
    B,
    A,
    S,
}

impl StyleRank {
    pub fn as_str(&self) -> &'static str {
        match self {
            StyleRank::D => "D",
            StyleRank::C => "C",
            StyleRank::B => "B",
            StyleRank::A => "A",
            StyleRank::S => "S",
        }
    }

    fn for_count(count: u32) -> Self {
        match count {
            15.. => StyleRank::S,
            10.. => StyleRank::A,
            6.. => StyleRank::B,
            3.. => StyleRank::C,
            _ => StyleRank::D,
        }
    }
}

/// The running combo state.
#[derive(Resource)]
pub struct ComboState {
    pub count: u32,
    pub rank: StyleRank,
    /// Highest count reached this run
    pub peak: u32,
    timer: f32,
    window: f32,
}

impl Default for ComboState {
    fn default() -> Self {
        Self {
            count: 0,
            rank: StyleRank::D,
            peak: 0,
            timer: 0.0,
            window: 2.0,
        }
    }
}

impl ComboState {
    /// Add combo points. `reset_timer` restarts the decay window; passive
    /// bonuses (juggle height, aerial follow-ups) leave it running.
    pub fn add(&mut self, amount: u32, reset_timer: bool) {
        self.count += amount;
        self.peak = self.peak.max(self.count);
        if reset_timer {
            self.timer = self.window;
        }
        self.rank = StyleRank::for_count(self.count);
    }

    /// A direct strike: one point and a fresh window.
    pub fn register_strike(&mut self) {
        self.add(1, true);
    }

    /// The rank the peak count of this run would have earned.
    pub fn peak_rank(&self) -> StyleRank {
        StyleRank::for_count(self.peak)
    }

    pub fn reset(&mut self) {
        self.count = 0;
        self.rank = StyleRank::D;
        self.timer = 0.0;
    }

    fn tick(&mut self, dt: f32) -> bool {
        if self.timer > 0.0 {
            self.timer -= dt;
            if self.timer <= 0.0 {
                self.reset();
                return true;
            }
        }
        false
    }
}

/// Decays the combo when the window runs out.
pub fn tick_combo(time: Res<Time>, mut combo: ResMut<ComboState>) {
    if combo.tick(time.delta_secs()) {
        debug!("combo dropped");
    }
}

//! Dodge Run - an arcade survival game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, scoring, leveling)
//! - `flow`: Top-level menu/playing/paused/game-over state machine
//! - `tuning`: Data-driven game balance
//! - `settings`: Presentation preferences the simulation honors
//! - `highscores`: Best score / best level record

pub mod flow;
pub mod highscores;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use flow::{AppState, GameFlow};
pub use highscores::HighScores;
pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Default arena dimensions
    pub const ARENA_WIDTH: f32 = 800.0;
    pub const ARENA_HEIGHT: f32 = 600.0;

    /// Largest frame delta the simulation accepts (tab switches, long pauses)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Points per whole second survived
    pub const SURVIVAL_POINTS_PER_SEC: u64 = 10;
    /// Points per obstacle that leaves the arena (or is wiped by Clear)
    pub const OBSTACLE_CLEARED_POINTS: u64 = 25;
}

/// Unit vector from `from` toward `to`, or zero when they coincide
#[inline]
pub fn direction_to(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or_zero()
}

/// Point on a circle of `radius` around `center` at `angle` radians
#[inline]
pub fn orbit_point(center: Vec2, radius: f32, angle: f32) -> Vec2 {
    center + Vec2::new(angle.cos(), angle.sin()) * radius
}

//! Data-driven game balance
//!
//! Every number that shapes difficulty lives here so a run can be retuned from
//! a JSON file without recompiling. Missing fields fall back to the shipped
//! defaults, so a tuning file only needs the values it overrides.

use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH};

/// Player avatar
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub radius: f32,
    /// Pixels per second at full stick deflection
    pub speed: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            radius: 20.0,
            speed: 300.0,
        }
    }
}

/// Obstacle spawner ramps
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleTuning {
    /// Square side lengths a normal obstacle is drawn from
    pub sizes: Vec<f32>,
    pub base_speed: f32,
    pub max_speed: f32,
    /// Fraction of the base→max speed range gained per speed level
    pub speed_ramp: f32,
    pub spawn_interval_start: f32,
    pub spawn_interval_min: f32,
    /// Fraction of the start→min interval range shaved per spawn level
    pub spawn_ramp: f32,
    pub cap_start: usize,
    pub cap_max: usize,
    /// Extra obstacles allowed per count level
    pub cap_step: usize,
    /// Total width of the random lateral aim offset
    pub jitter: f32,
    pub hard_size: f32,
    pub hard_chance: f32,
    pub hard_speed_multiplier: f32,
    pub hard_bounces: u32,
    /// Chance a fresh obstacle carries a ring in front of it (when unlocked)
    pub in_front_chance: f32,
    /// Display colors (0xRRGGBB)
    pub colors: Vec<u32>,
}

impl Default for ObstacleTuning {
    fn default() -> Self {
        Self {
            sizes: vec![30.0, 50.0, 70.0],
            base_speed: 150.0,
            max_speed: 400.0,
            speed_ramp: 0.15,
            spawn_interval_start: 0.9,
            spawn_interval_min: 0.5,
            spawn_ramp: 0.1,
            cap_start: 6,
            cap_max: 18,
            cap_step: 2,
            jitter: 150.0,
            hard_size: 80.0,
            hard_chance: 0.06,
            hard_speed_multiplier: 1.4,
            hard_bounces: 2,
            in_front_chance: 0.08,
            colors: vec![0xE53935, 0xFB8C00, 0xD81B60, 0x8E24AA, 0xF4511E],
        }
    }
}

/// Collectible ring spawner
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectibleTuning {
    pub radius: f32,
    pub spawn_interval_start: f32,
    pub spawn_interval_min: f32,
    pub spawn_ramp: f32,
    pub max_on_screen: usize,
    pub min_lifetime: f32,
    pub max_lifetime: f32,
    pub points: Vec<u64>,
    pub float_chance: f32,
    /// Orbit angular speed (radians/sec)
    pub float_speed: f32,
    pub float_radius: f32,
    pub bonus_chance: f32,
    pub bonus_points: u64,
    pub bonus_lifetime: f32,
    pub in_front_points: u64,
    pub in_front_lifetime: f32,
    /// Gap between the obstacle's bounding circle and a ring placed in front of it
    pub in_front_margin: f32,
    /// Keep random spawns this far from the arena edges
    pub spawn_padding: f32,
    /// Magnet pull speed at the reference distance
    pub magnet_pull: f32,
    pub magnet_reference_distance: f32,
    pub magnet_max_multiplier: f32,
}

impl Default for CollectibleTuning {
    fn default() -> Self {
        Self {
            radius: 18.0,
            spawn_interval_start: 3.0,
            spawn_interval_min: 1.2,
            spawn_ramp: 0.15,
            max_on_screen: 1,
            min_lifetime: 6.0,
            max_lifetime: 12.0,
            points: vec![50, 75, 100],
            float_chance: 0.6,
            float_speed: 2.0,
            float_radius: 25.0,
            bonus_chance: 0.08,
            bonus_points: 500,
            bonus_lifetime: 2.0,
            in_front_points: 500,
            in_front_lifetime: 8.0,
            in_front_margin: 10.0,
            spawn_padding: 60.0,
            magnet_pull: 240.0,
            magnet_reference_distance: 200.0,
            magnet_max_multiplier: 4.0,
        }
    }
}

/// Power-up star spawner and effect durations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerUpTuning {
    pub radius: f32,
    pub spawn_interval: f32,
    /// Fraction of the interval pre-loaded on reset (first star comes sooner)
    pub first_spawn_fraction: f32,
    pub lifetime: f32,
    pub life_chance: f32,
    pub life_lifetime: f32,
    pub float_radius: f32,
    pub float_speed: f32,
    pub spawn_padding: f32,
    pub slowmo_duration: f32,
    pub slowmo_multiplier: f32,
    pub magnet_duration: f32,
}

impl Default for PowerUpTuning {
    fn default() -> Self {
        Self {
            radius: 20.0,
            spawn_interval: 14.0,
            first_spawn_fraction: 0.7,
            lifetime: 4.0,
            life_chance: 0.05,
            life_lifetime: 3.0,
            float_radius: 30.0,
            float_speed: 2.0,
            spawn_padding: 70.0,
            slowmo_duration: 5.0,
            slowmo_multiplier: 0.5,
            magnet_duration: 6.0,
        }
    }
}

/// Bonus portal spawner and portal-mode stream
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalTuning {
    pub radius: f32,
    pub spawn_interval: f32,
    pub first_spawn_fraction: f32,
    pub lifetime: f32,
    pub spawn_padding: f32,
    /// Length of the bonus room once entered
    pub mode_duration: f32,
    pub stream_interval: f32,
    pub stream_cap: usize,
    pub stream_points: u64,
    pub stream_lifetime: f32,
    /// Invincibility granted when the bonus room closes
    pub exit_grace: f32,
}

impl Default for PortalTuning {
    fn default() -> Self {
        Self {
            radius: 14.0,
            spawn_interval: 100.0,
            first_spawn_fraction: 0.6,
            lifetime: 3.0,
            spawn_padding: 80.0,
            mode_duration: 10.0,
            stream_interval: 0.25,
            stream_cap: 8,
            stream_points: 100,
            stream_lifetime: 3.0,
            exit_grace: 1.5,
        }
    }
}

/// Near-miss detection and combo bonus
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NearMissTuning {
    /// Max distance from player center to the nearest obstacle edge
    pub distance: f32,
    /// Minimum gap between two near-miss signals
    pub cooldown: f32,
    /// Rolling window the combo count must fit inside
    pub window: f32,
    pub target: usize,
    pub bonus: u64,
}

impl Default for NearMissTuning {
    fn default() -> Self {
        Self {
            distance: 50.0,
            cooldown: 0.5,
            window: 6.0,
            target: 3,
            bonus: 500,
        }
    }
}

/// Boss wave difficulty spike
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BossWaveTuning {
    /// Boss waves start on levels divisible by this
    pub every_levels: u32,
    pub duration: f32,
    pub speed_multiplier: f32,
}

impl Default for BossWaveTuning {
    fn default() -> Self {
        Self {
            every_levels: 3,
            duration: 6.0,
            speed_multiplier: 2.0,
        }
    }
}

/// Complete balance table for one session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub arena_width: f32,
    pub arena_height: f32,
    /// Seconds of survival per level
    pub level_duration: f32,
    pub countdown_duration: f32,
    pub game_over_anim_duration: f32,
    pub level_up_announce_duration: f32,
    pub start_lives: u8,
    pub max_lives: u8,
    pub max_shields: u8,
    pub invincibility_duration: f32,
    /// Shake magnitude added by a hit (0-1)
    pub hit_shake: f32,
    /// Exponential shake decay rate (per second)
    pub shake_decay: f32,
    pub player: PlayerTuning,
    pub obstacles: ObstacleTuning,
    pub collectibles: CollectibleTuning,
    pub powerups: PowerUpTuning,
    pub portals: PortalTuning,
    pub near_miss: NearMissTuning,
    pub boss_wave: BossWaveTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,
            level_duration: 30.0,
            countdown_duration: 3.0,
            game_over_anim_duration: 1.2,
            level_up_announce_duration: 1.2,
            start_lives: 3,
            max_lives: 5,
            max_shields: 3,
            invincibility_duration: 2.0,
            hit_shake: 0.6,
            shake_decay: 6.0,
            player: PlayerTuning::default(),
            obstacles: ObstacleTuning::default(),
            collectibles: CollectibleTuning::default(),
            powerups: PowerUpTuning::default(),
            portals: PortalTuning::default(),
            near_miss: NearMissTuning::default(),
            boss_wave: BossWaveTuning::default(),
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) tuning table from JSON
    pub fn from_json(json: &str) -> io::Result<Self> {
        serde_json::from_str(json).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Load a tuning table from disk
    pub fn load(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Arena center point
    pub fn arena_center(&self) -> glam::Vec2 {
        glam::Vec2::new(self.arena_width / 2.0, self.arena_height / 2.0)
    }
}

//! Session phases, timers, events and other shared simulation types

use serde::{Deserialize, Serialize};

use super::features::Feature;
use super::powerup::PowerUpKind;

/// Lifecycle of one play-through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Constructed but never started
    Idle,
    /// 3-2-1 countdown; player may move, nothing can hurt or score
    Countdown,
    /// Active gameplay
    Playing,
    /// Lives ran out; particles and shake settle before the run is reported
    GameOverAnim,
    /// Game over has been reported; nothing else happens until restart
    Finished,
}

/// Exclusive sub-mode of `SessionPhase::Playing`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlayMode {
    #[default]
    Normal,
    /// Bonus room: obstacles block but never hurt, a ring stream spawns
    Portal,
}

/// Countdown timers, all in seconds, decremented once per frame
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timers {
    pub countdown: f32,
    pub invincibility: f32,
    pub slowmo: f32,
    pub magnet: f32,
    pub boss_wave: f32,
    pub portal_mode: f32,
    pub level_up_announce: f32,
    pub near_miss_cooldown: f32,
    pub game_over_anim: f32,
}

impl Timers {
    /// Tick the gameplay timers that run during `Playing`
    pub fn tick_effects(&mut self, dt: f32) {
        for timer in [
            &mut self.invincibility,
            &mut self.slowmo,
            &mut self.magnet,
            &mut self.level_up_announce,
            &mut self.near_miss_cooldown,
        ] {
            *timer = (*timer - dt).max(0.0);
        }
    }
}

/// Kind of entity a removal event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Obstacle,
    Collectible,
    PowerUp,
    Portal,
}

/// Why points were awarded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreReason {
    Survival,
    Collectible,
    ObstacleCleared,
    /// Obstacles wiped by the Clear power-up
    ClearPowerUp,
    NearMissCombo,
    /// Ring collected inside the bonus room
    PortalCollectible,
}

/// One-shot notifications for renderers, audio, haptics and UI.
///
/// Queued during `GameSession::update` and handed out by `drain_events`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Countdown moved to a new number (3, 2, 1)
    CountdownBeep { phase: u32 },
    /// Countdown finished; background music should start
    CountdownGo,
    ScoreChanged { delta: u64, total: u64, reason: ScoreReason },
    LivesChanged { lives: u8 },
    ShieldChanged { shields: u8 },
    /// Fired once per level boundary crossed
    LevelUp { level: u32, unlocked: Vec<Feature> },
    BossWaveStarted { level: u32 },
    BossWaveEnded,
    PortalEntered,
    PortalExited,
    PowerUpCollected { kind: PowerUpKind },
    CollectibleCollected { points: u64, bonus: bool },
    NearMiss { obstacle: u32 },
    NearMissCombo { bonus: u64 },
    /// Obstacle contact; `shielded` when a shield charge absorbed it
    PlayerHit { shielded: bool },
    EntityRemoved { kind: EntityKind, id: u32 },
    /// Lives reached zero; the game-over animation begins
    GameOverStarted,
    /// Animation finished; fired exactly once per run
    GameOver { score: u64, level: u32 },
}

/// Monotonic entity ID source shared by all spawners of a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityIds {
    next: u32,
}

impl Default for EntityIds {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl EntityIds {
    pub fn starting_at(next: u32) -> Self {
        Self { next }
    }

    /// Allocate a new entity ID
    pub fn next_id(&mut self) -> u32 {
        let id = self.next;
        self.next = self.next.wrapping_add(1);
        id
    }
}

/// Rolling near-miss tracker
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NearMissCombo {
    /// Survival-clock times of near-misses inside the current window
    pub timestamps: Vec<f32>,
}

impl NearMissCombo {
    /// Record a near-miss at `now`.
    ///
    /// Returns true when `target` events fit inside `window`; the count
    /// then starts over so the next near-miss begins a fresh combo.
    pub fn record(&mut self, now: f32, window: f32, target: usize) -> bool {
        self.timestamps.retain(|&t| now - t <= window);
        self.timestamps.push(now);
        if target > 0 && self.timestamps.len() >= target {
            self.timestamps.clear();
            true
        } else {
            false
        }
    }

    /// Near-misses currently counting toward the combo
    pub fn progress(&self, now: f32, window: f32) -> usize {
        self.timestamps.iter().filter(|&&t| now - t <= window).count()
    }

    pub fn clear(&mut self) {
        self.timestamps.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_ids_are_unique() {
        let mut ids = EntityIds::default();
        let a = ids.next_id();
        let b = ids.next_id();
        assert_eq!(a, 1);
        assert_eq!(b, 2);
    }

    #[test]
    fn test_combo_triggers_once_and_resets() {
        let mut combo = NearMissCombo::default();
        assert!(!combo.record(1.0, 6.0, 3));
        assert!(!combo.record(2.0, 6.0, 3));
        assert!(combo.record(3.0, 6.0, 3));
        // Fourth shortly after starts a fresh count
        assert!(!combo.record(3.5, 6.0, 3));
        assert_eq!(combo.progress(3.5, 6.0), 1);
    }

    #[test]
    fn test_combo_window_expires_old_events() {
        let mut combo = NearMissCombo::default();
        assert!(!combo.record(0.0, 6.0, 3));
        assert!(!combo.record(1.0, 6.0, 3));
        // First event has aged out by now
        assert!(!combo.record(6.5, 6.0, 3));
        assert_eq!(combo.progress(6.5, 6.0), 2);
        assert!(combo.record(7.0, 6.0, 3));
    }

    #[test]
    fn test_tick_effects_floors_at_zero() {
        let mut timers = Timers {
            slowmo: 0.05,
            magnet: 3.0,
            ..Default::default()
        };
        timers.tick_effects(0.1);
        assert_eq!(timers.slowmo, 0.0);
        assert!((timers.magnet - 2.9).abs() < 1e-6);
    }
}

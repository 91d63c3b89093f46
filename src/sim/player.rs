//! The player avatar - a circle steered by a normalized movement vector

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::tuning::PlayerTuning;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub radius: f32,
    /// Pixels per second at full deflection
    pub speed: f32,
}

impl Player {
    /// Create a player at the center of the arena
    pub fn new(tuning: &PlayerTuning, arena: Vec2) -> Self {
        Self {
            pos: arena / 2.0,
            radius: tuning.radius,
            speed: tuning.speed,
        }
    }

    /// Recenter in place (keeps the same instance for external references)
    pub fn reset(&mut self, arena: Vec2) {
        self.pos = arena / 2.0;
    }

    /// Move by `movement * speed * dt`, then clamp inside the arena.
    ///
    /// `movement` is expected to be pre-normalized (magnitude <= 1); it is not
    /// re-normalized here.
    pub fn advance(&mut self, movement: Vec2, dt: f32, arena: Vec2) {
        self.pos += movement * self.speed * dt;
        self.clamp_to(arena);
    }

    fn clamp_to(&mut self, arena: Vec2) {
        let pad = Vec2::splat(self.radius);
        // Degenerate arenas smaller than the player pin it to the middle
        let max = (arena - pad).max(pad);
        self.pos = self.pos.clamp(pad, max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARENA: Vec2 = Vec2::new(800.0, 600.0);

    #[test]
    fn test_spawns_centered() {
        let player = Player::new(&PlayerTuning::default(), ARENA);
        assert_eq!(player.pos, Vec2::new(400.0, 300.0));
        assert_eq!(player.radius, 20.0);
    }

    #[test]
    fn test_advance_scales_by_speed_and_dt() {
        let mut player = Player::new(&PlayerTuning::default(), ARENA);
        player.advance(Vec2::new(1.0, 0.0), 0.5, ARENA);
        assert_eq!(player.pos, Vec2::new(550.0, 300.0));
    }

    #[test]
    fn test_advance_clamps_to_bounds() {
        let mut player = Player::new(&PlayerTuning::default(), ARENA);
        player.advance(Vec2::new(-1.0, -1.0), 10.0, ARENA);
        assert_eq!(player.pos, Vec2::new(20.0, 20.0));
        player.advance(Vec2::new(1.0, 1.0), 10.0, ARENA);
        assert_eq!(player.pos, Vec2::new(780.0, 580.0));
    }

    #[test]
    fn test_reset_recenters() {
        let mut player = Player::new(&PlayerTuning::default(), ARENA);
        player.advance(Vec2::new(1.0, 0.0), 1.0, ARENA);
        player.reset(ARENA);
        assert_eq!(player.pos, Vec2::new(400.0, 300.0));
    }
}

//! Obstacle spawner - rectangles launched from the arena edges toward the center
//!
//! Spawn interval shrinks and the on-screen cap grows with level, both on
//! saturating ramps. Hard variants are larger, faster, appear closer to the
//! edge and bounce off walls a limited number of times.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::EntityIds;
use crate::tuning::ObstacleTuning;

const FALLBACK_SIZE: f32 = 50.0;
const FALLBACK_COLOR: u32 = 0xE53935;

/// An axis-aligned rectangular obstacle (top-left anchored)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub pos: Vec2,
    pub size: Vec2,
    pub vel: Vec2,
    /// Display color (0xRRGGBB)
    pub color: u32,
    pub hard: bool,
    /// Wall reflections left (hard variants only)
    pub bounces_left: u32,
}

impl Obstacle {
    pub fn new(id: u32, pos: Vec2, size: Vec2, vel: Vec2, color: u32) -> Self {
        Self {
            id,
            pos,
            size,
            vel,
            color,
            hard: false,
            bounces_left: 0,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    /// Fully outside the arena on an axis, in the direction that axis is moving.
    ///
    /// Only the side matching the velocity sign counts, so obstacles still
    /// entering from off-screen are never considered gone.
    pub fn exited_x(&self, arena: Vec2) -> bool {
        (self.vel.x > 0.0 && self.pos.x > arena.x) || (self.vel.x < 0.0 && self.pos.x + self.size.x < 0.0)
    }

    pub fn exited_y(&self, arena: Vec2) -> bool {
        (self.vel.y > 0.0 && self.pos.y > arena.y) || (self.vel.y < 0.0 && self.pos.y + self.size.y < 0.0)
    }

    #[inline]
    pub fn has_exited(&self, arena: Vec2) -> bool {
        self.exited_x(arena) || self.exited_y(arena)
    }

    /// Reflect off walls the obstacle has fully left, spending bounce budget
    fn bounce(&mut self, arena: Vec2) {
        if !self.hard || self.bounces_left == 0 {
            return;
        }
        let mut bounced = false;
        if self.exited_x(arena) {
            self.vel.x = -self.vel.x;
            bounced = true;
        }
        if self.exited_y(arena) {
            self.vel.y = -self.vel.y;
            bounced = true;
        }
        if bounced {
            self.bounces_left -= 1;
        }
    }
}

/// Per-frame inputs that shape spawning and motion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstacleParams {
    /// Applied to every obstacle's motion this frame (slow-mo, boss wave)
    pub speed_multiplier: f32,
    /// Level driving spawn speed
    pub speed_level: u32,
    /// Level driving the on-screen cap
    pub count_level: u32,
    /// Level driving the spawn interval
    pub spawn_level: u32,
    /// Whether hard variants may spawn
    pub hard_variant: bool,
}

impl ObstacleParams {
    /// All ramps at `level`, normal speed, no hard variants
    pub fn at_level(level: u32) -> Self {
        Self {
            speed_multiplier: 1.0,
            speed_level: level,
            count_level: level,
            spawn_level: level,
            hard_variant: false,
        }
    }
}

impl Default for ObstacleParams {
    fn default() -> Self {
        Self::at_level(1)
    }
}

/// Owns the obstacle population and its spawn timer
#[derive(Debug, Clone)]
pub struct ObstacleSpawner {
    tuning: ObstacleTuning,
    arena: Vec2,
    obstacles: Vec<Obstacle>,
    spawn_timer: f32,
    /// Total time this spawner has been advanced
    game_time: f32,
}

impl ObstacleSpawner {
    pub fn new(tuning: ObstacleTuning, arena: Vec2) -> Self {
        Self {
            tuning,
            arena,
            obstacles: Vec::new(),
            spawn_timer: 0.0,
            game_time: 0.0,
        }
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    pub fn game_time(&self) -> f32 {
        self.game_time
    }

    pub fn spawn_timer(&self) -> f32 {
        self.spawn_timer
    }

    /// Seconds between spawns at `spawn_level` (never below the floor)
    pub fn spawn_interval(&self, spawn_level: u32) -> f32 {
        let t = ramp(spawn_level, self.tuning.spawn_ramp);
        let start = self.tuning.spawn_interval_start;
        let min = self.tuning.spawn_interval_min.min(start);
        start - (start - min) * t
    }

    /// Maximum live obstacles at `count_level` (never above the ceiling)
    pub fn spawn_cap(&self, count_level: u32) -> usize {
        let steps = count_level.saturating_sub(1) as usize;
        self.tuning
            .cap_start
            .saturating_add(steps.saturating_mul(self.tuning.cap_step))
            .min(self.tuning.cap_max.max(self.tuning.cap_start))
    }

    /// Launch speed at `speed_level` (never above the ceiling)
    pub fn launch_speed(&self, speed_level: u32) -> f32 {
        let t = ramp(speed_level, self.tuning.speed_ramp);
        let base = self.tuning.base_speed;
        base + (self.tuning.max_speed - base).max(0.0) * t
    }

    /// Advance the spawner by `dt`.
    ///
    /// Returns a copy of the obstacle spawned this frame, if any, so callers
    /// can react to fresh spawns (e.g. attach a ring in front of it).
    pub fn update<R: Rng>(
        &mut self,
        dt: f32,
        params: &ObstacleParams,
        rng: &mut R,
        ids: &mut EntityIds,
    ) -> Option<Obstacle> {
        self.game_time += dt;
        self.spawn_timer += dt;

        let mut spawned = None;
        if self.spawn_timer >= self.spawn_interval(params.spawn_level) {
            self.spawn_timer = 0.0;
            // At the cap the attempt is simply dropped
            if self.obstacles.len() < self.spawn_cap(params.count_level) {
                let obstacle = self.spawn(params, rng, ids);
                spawned = Some(obstacle.clone());
                self.obstacles.push(obstacle);
            }
        }

        let step = dt * params.speed_multiplier;
        for obstacle in &mut self.obstacles {
            obstacle.pos += obstacle.vel * step;
            obstacle.bounce(self.arena);
        }

        spawned
    }

    fn spawn<R: Rng>(&self, params: &ObstacleParams, rng: &mut R, ids: &mut EntityIds) -> Obstacle {
        let hard = params.hard_variant && rng.random::<f32>() < self.tuning.hard_chance;
        let side = if hard {
            self.tuning.hard_size
        } else if self.tuning.sizes.is_empty() {
            FALLBACK_SIZE
        } else {
            self.tuning.sizes[rng.random_range(0..self.tuning.sizes.len())]
        };
        let size = Vec2::splat(side);

        let mut speed = self.launch_speed(params.speed_level);
        // Hard variants show up with less warning and move faster
        let offset = if hard {
            speed *= self.tuning.hard_speed_multiplier;
            (0.25 + rng.random::<f32>() * 0.25) * side
        } else {
            (1.0 + rng.random::<f32>()) * side
        };

        let (w, h) = (self.arena.x, self.arena.y);
        let jitter = (rng.random::<f32>() - 0.5) * self.tuning.jitter;
        let (pos, aim_jitter) = match rng.random_range(0..4u8) {
            0 => (Vec2::new(rng.random::<f32>() * w, -size.y - offset), Vec2::new(jitter, 0.0)),
            1 => (Vec2::new(w + offset, rng.random::<f32>() * h), Vec2::new(0.0, jitter)),
            2 => (Vec2::new(rng.random::<f32>() * w, h + offset), Vec2::new(jitter, 0.0)),
            _ => (Vec2::new(-size.x - offset, rng.random::<f32>() * h), Vec2::new(0.0, jitter)),
        };

        let center = self.arena / 2.0;
        let to_center = center + aim_jitter - (pos + size / 2.0);
        let dir = to_center.try_normalize().unwrap_or(Vec2::X);

        let color = if self.tuning.colors.is_empty() {
            FALLBACK_COLOR
        } else {
            self.tuning.colors[rng.random_range(0..self.tuning.colors.len())]
        };

        let mut obstacle = Obstacle::new(ids.next_id(), pos, size, dir * speed, color);
        if hard {
            obstacle.hard = true;
            obstacle.bounces_left = self.tuning.hard_bounces;
        }
        log::debug!(
            "Obstacle {} spawned at ({:.0}, {:.0}) size {} hard={}",
            obstacle.id,
            pos.x,
            pos.y,
            side,
            hard
        );
        obstacle
    }

    /// Remove obstacles that fully left the arena along their direction of travel.
    ///
    /// Returns how many were removed.
    pub fn remove_outside(&mut self, mut on_remove: impl FnMut(&Obstacle)) -> usize {
        let arena = self.arena;
        let mut removed = 0;
        self.obstacles.retain(|o| {
            if o.has_exited(arena) {
                on_remove(o);
                removed += 1;
                false
            } else {
                true
            }
        });
        removed
    }

    /// Remove every obstacle without touching timers (Clear power-up)
    pub fn clear_all(&mut self, mut on_remove: impl FnMut(&Obstacle)) -> usize {
        let removed = self.obstacles.len();
        for obstacle in self.obstacles.drain(..) {
            on_remove(&obstacle);
        }
        removed
    }

    /// Empty the population and zero all timers
    pub fn reset(&mut self, on_remove: impl FnMut(&Obstacle)) {
        self.clear_all(on_remove);
        self.spawn_timer = 0.0;
        self.game_time = 0.0;
    }

    /// Insert an obstacle directly (scripted setups)
    pub fn push(&mut self, obstacle: Obstacle) {
        self.obstacles.push(obstacle);
    }
}

/// Saturating 0..1 ramp: `(level - 1) * per_level`, clamped
#[inline]
fn ramp(level: u32, per_level: f32) -> f32 {
    (level.saturating_sub(1) as f32 * per_level).clamp(0.0, 1.0)
}

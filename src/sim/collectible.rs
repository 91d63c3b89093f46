//! Collectible rings - short-lived point pickups
//!
//! Rings spawn on a level-scaled timer, sit still or orbit a fixed point, and
//! expire after their lifetime. A second spawn path places a high-value ring
//! in front of a fresh obstacle, riding along at the obstacle's velocity.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::obstacle::Obstacle;
use super::state::EntityIds;
use crate::orbit_point;
use crate::tuning::CollectibleTuning;

const FALLBACK_POINTS: u64 = 50;

/// How a ring moves each frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CollectibleMotion {
    Static,
    /// Orbits `center` at the tuned float radius
    Floating { center: Vec2, angle: f32 },
    /// Travels at a fixed velocity; removed once it leaves the arena
    Drifting { vel: Vec2 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collectible {
    pub id: u32,
    pub pos: Vec2,
    pub radius: f32,
    pub points: u64,
    /// Seconds left before expiry
    pub life: f32,
    pub max_life: f32,
    pub motion: CollectibleMotion,
    /// High-value variant that blinks while alive
    pub blinks: bool,
}

impl Collectible {
    /// Remaining life as 0..1 (for fade-out rendering)
    pub fn life_fraction(&self) -> f32 {
        if self.max_life <= 0.0 {
            0.0
        } else {
            (self.life / self.max_life).clamp(0.0, 1.0)
        }
    }

    /// Fully outside the arena in the direction it drifts
    pub fn drifted_out(&self, arena: Vec2) -> bool {
        let CollectibleMotion::Drifting { vel } = self.motion else {
            return false;
        };
        let r = self.radius;
        (vel.x > 0.0 && self.pos.x - r > arena.x)
            || (vel.x < 0.0 && self.pos.x + r < 0.0)
            || (vel.y > 0.0 && self.pos.y - r > arena.y)
            || (vel.y < 0.0 && self.pos.y + r < 0.0)
    }
}

/// Per-frame inputs for the ring spawner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollectibleParams {
    pub level: u32,
    /// New rings may orbit
    pub floating: bool,
    /// New rings may roll the blinking bonus variant
    pub bonus: bool,
    /// Pull every ring toward this point this frame
    pub magnet: Option<Vec2>,
    /// Obstacle speed factor this frame; drifting rings keep pace with it
    pub speed_multiplier: f32,
}

impl Default for CollectibleParams {
    fn default() -> Self {
        Self {
            level: 1,
            floating: false,
            bonus: false,
            magnet: None,
            speed_multiplier: 1.0,
        }
    }
}

/// Owns the ring population and its spawn timer
#[derive(Debug, Clone)]
pub struct CollectibleSpawner {
    tuning: CollectibleTuning,
    arena: Vec2,
    collectibles: Vec<Collectible>,
    spawn_timer: f32,
}

impl CollectibleSpawner {
    pub fn new(tuning: CollectibleTuning, arena: Vec2) -> Self {
        Self {
            tuning,
            arena,
            collectibles: Vec::new(),
            spawn_timer: 0.0,
        }
    }

    pub fn collectibles(&self) -> &[Collectible] {
        &self.collectibles
    }

    pub fn len(&self) -> usize {
        self.collectibles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collectibles.is_empty()
    }

    pub fn spawn_timer(&self) -> f32 {
        self.spawn_timer
    }

    /// Seconds between spawns at `level` (never below the floor)
    pub fn spawn_interval(&self, level: u32) -> f32 {
        let t = (level.saturating_sub(1) as f32 * self.tuning.spawn_ramp).clamp(0.0, 1.0);
        let start = self.tuning.spawn_interval_start;
        let min = self.tuning.spawn_interval_min.min(start);
        start - (start - min) * t
    }

    /// Make the next `update` spawn immediately
    pub fn prime_first_spawn(&mut self) {
        self.spawn_timer = self.tuning.spawn_interval_start;
    }

    pub fn update<R: Rng>(
        &mut self,
        dt: f32,
        params: &CollectibleParams,
        rng: &mut R,
        ids: &mut EntityIds,
        mut on_remove: impl FnMut(&Collectible),
    ) {
        self.spawn_timer += dt;
        if self.spawn_timer >= self.spawn_interval(params.level) {
            self.spawn_timer = 0.0;
            if self.collectibles.len() < self.tuning.max_on_screen {
                let ring = self.spawn(params, rng, ids);
                self.collectibles.push(ring);
            }
        }

        let tuning = &self.tuning;
        let arena = self.arena;
        self.collectibles.retain_mut(|c| {
            c.life -= dt;

            if let Some(target) = params.magnet {
                let before = c.pos;
                let to_target = target - c.pos;
                let dist = to_target.length();
                let strength =
                    (tuning.magnet_reference_distance / dist.max(1.0)).min(tuning.magnet_max_multiplier);
                let step = tuning.magnet_pull * strength * dt;
                c.pos = if step >= dist {
                    target
                } else {
                    c.pos + to_target / dist * step
                };
                // Keep the orbit anchored to where the magnet dragged it
                if let CollectibleMotion::Floating { center, .. } = &mut c.motion {
                    *center += c.pos - before;
                }
            } else {
                match &mut c.motion {
                    CollectibleMotion::Static => {}
                    CollectibleMotion::Floating { center, angle } => {
                        *angle += dt * tuning.float_speed;
                        c.pos = orbit_point(*center, tuning.float_radius, *angle);
                    }
                    CollectibleMotion::Drifting { vel } => {
                        c.pos += *vel * dt * params.speed_multiplier;
                    }
                }
            }

            if c.life <= 0.0 || c.drifted_out(arena) {
                on_remove(c);
                false
            } else {
                true
            }
        });
    }

    fn spawn<R: Rng>(&self, params: &CollectibleParams, rng: &mut R, ids: &mut EntityIds) -> Collectible {
        let t = &self.tuning;
        let pos = random_inside(self.arena, t.spawn_padding, rng);

        let bonus = params.bonus && rng.random::<f32>() < t.bonus_chance;
        let (points, life) = if bonus {
            (t.bonus_points, t.bonus_lifetime)
        } else {
            let points = if t.points.is_empty() {
                FALLBACK_POINTS
            } else {
                t.points[rng.random_range(0..t.points.len())]
            };
            let max = t.max_lifetime.max(t.min_lifetime);
            (points, t.min_lifetime + rng.random::<f32>() * (max - t.min_lifetime))
        };

        let motion = if params.floating && rng.random::<f32>() < t.float_chance {
            let angle = rng.random::<f32>() * std::f32::consts::TAU;
            CollectibleMotion::Floating { center: pos, angle }
        } else {
            CollectibleMotion::Static
        };

        let id = ids.next_id();
        log::debug!("Ring {} spawned: {} pts, {:.1}s, bonus={}", id, points, life, bonus);
        Collectible {
            id,
            pos: match motion {
                CollectibleMotion::Floating { center, angle } => orbit_point(center, t.float_radius, angle),
                _ => pos,
            },
            radius: t.radius,
            points,
            life,
            max_life: life,
            motion,
            blinks: bonus,
        }
    }

    /// Place a high-value ring just ahead of `obstacle`, moving with it.
    ///
    /// Ignores the on-screen cap. The offset clears the obstacle's bounding
    /// circle plus the ring radius so the two never overlap at spawn.
    pub fn spawn_in_front(&mut self, obstacle: &Obstacle, ids: &mut EntityIds) -> &Collectible {
        let t = &self.tuning;
        let dir = obstacle.vel.try_normalize().unwrap_or(Vec2::X);
        let clearance = obstacle.size.length() / 2.0 + t.radius + t.in_front_margin;
        let ring = Collectible {
            id: ids.next_id(),
            pos: obstacle.center() + dir * clearance,
            radius: t.radius,
            points: t.in_front_points,
            life: t.in_front_lifetime,
            max_life: t.in_front_lifetime,
            motion: CollectibleMotion::Drifting { vel: obstacle.vel },
            blinks: false,
        };
        log::debug!("Ring {} riding in front of obstacle {}", ring.id, obstacle.id);
        self.collectibles.push(ring);
        &self.collectibles[self.collectibles.len() - 1]
    }

    /// Remove and return every ring overlapping the given circle
    pub fn take_touching(&mut self, center: Vec2, radius: f32) -> Vec<Collectible> {
        take_touching(&mut self.collectibles, center, radius)
    }

    /// Empty the population and zero the timer
    pub fn reset(&mut self, mut on_remove: impl FnMut(&Collectible)) {
        for ring in self.collectibles.drain(..) {
            on_remove(&ring);
        }
        self.spawn_timer = 0.0;
    }

    /// Insert a ring directly (scripted setups)
    pub fn push(&mut self, collectible: Collectible) {
        self.collectibles.push(collectible);
    }
}

/// Uniform point at least `padding` from every arena edge
pub(crate) fn random_inside<R: Rng>(arena: Vec2, padding: f32, rng: &mut R) -> Vec2 {
    let span = (arena - Vec2::splat(padding * 2.0)).max(Vec2::ZERO);
    let origin = Vec2::splat(padding).min(arena / 2.0);
    origin + Vec2::new(rng.random::<f32>() * span.x, rng.random::<f32>() * span.y)
}

/// Partition out the rings that overlap a circle, preserving order of the rest
pub(crate) fn take_touching(rings: &mut Vec<Collectible>, center: Vec2, radius: f32) -> Vec<Collectible> {
    let mut taken = Vec::new();
    let mut kept = Vec::with_capacity(rings.len());
    for ring in rings.drain(..) {
        if super::collision::circle_intersects_circle(center, radius, ring.pos, ring.radius) {
            taken.push(ring);
        } else {
            kept.push(ring);
        }
    }
    *rings = kept;
    taken
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const ARENA: Vec2 = Vec2::new(800.0, 600.0);

    fn ring(id: u32, pos: Vec2, motion: CollectibleMotion) -> Collectible {
        Collectible {
            id,
            pos,
            radius: 18.0,
            points: 50,
            life: 5.0,
            max_life: 5.0,
            motion,
            blinks: false,
        }
    }

    fn params(level: u32) -> CollectibleParams {
        CollectibleParams {
            level,
            ..Default::default()
        }
    }

    #[test]
    fn test_interval_ramp_has_floor() {
        let s = CollectibleSpawner::new(CollectibleTuning::default(), ARENA);
        assert!((s.spawn_interval(1) - 3.0).abs() < 1e-6);
        assert!(s.spawn_interval(4) < s.spawn_interval(2));
        assert!((s.spawn_interval(40) - 1.2).abs() < 1e-6);
    }

    #[test]
    fn test_primed_spawn_and_cap() {
        let mut s = CollectibleSpawner::new(CollectibleTuning::default(), ARENA);
        let mut rng = Pcg32::seed_from_u64(5);
        let mut ids = EntityIds::default();
        s.prime_first_spawn();
        s.update(0.01, &params(1), &mut rng, &mut ids, |_| {});
        assert_eq!(s.len(), 1);
        let c = &s.collectibles()[0];
        assert!([50, 75, 100].contains(&c.points));
        assert!(c.life >= 5.9 && c.life <= 12.0);
        // Cap of one holds even when the timer fires again
        s.update(3.5, &params(1), &mut rng, &mut ids, |_| {});
        assert!(s.len() <= 1);
    }

    #[test]
    fn test_expiry_removes() {
        let mut s = CollectibleSpawner::new(CollectibleTuning::default(), ARENA);
        let mut rng = Pcg32::seed_from_u64(5);
        let mut ids = EntityIds::starting_at(10);
        s.push(ring(1, Vec2::new(100.0, 100.0), CollectibleMotion::Static));
        let mut expired = Vec::new();
        s.update(2.0, &params(1), &mut rng, &mut ids, |c| expired.push(c.id));
        assert!(expired.is_empty());
        s.update(2.0, &params(1), &mut rng, &mut ids, |c| expired.push(c.id));
        s.update(1.0, &params(1), &mut rng, &mut ids, |c| expired.push(c.id));
        assert!(expired.contains(&1));
        assert!(s.collectibles().iter().all(|c| c.id != 1));
    }

    #[test]
    fn test_floating_orbits_center() {
        let mut s = CollectibleSpawner::new(CollectibleTuning::default(), ARENA);
        let mut rng = Pcg32::seed_from_u64(5);
        let mut ids = EntityIds::starting_at(10);
        let center = Vec2::new(300.0, 300.0);
        s.push(ring(1, center, CollectibleMotion::Floating { center, angle: 0.0 }));
        s.update(0.25, &params(1), &mut rng, &mut ids, |_| {});
        let c = s.collectibles().iter().find(|c| c.id == 1).unwrap();
        assert!((c.pos.distance(center) - 25.0).abs() < 1e-3);
    }

    #[test]
    fn test_in_front_clears_obstacle_and_inherits_velocity() {
        let mut s = CollectibleSpawner::new(CollectibleTuning::default(), ARENA);
        let mut ids = EntityIds::default();
        let obstacle = Obstacle::new(99, Vec2::new(-100.0, 200.0), Vec2::splat(70.0), Vec2::new(200.0, 0.0), 0);
        let ring = s.spawn_in_front(&obstacle, &mut ids).clone();
        assert_eq!(ring.points, 500);
        assert_eq!(ring.motion, CollectibleMotion::Drifting { vel: obstacle.vel });
        assert!(ring.pos.x > obstacle.pos.x + obstacle.size.x + ring.radius);
        assert!(!super::super::collision::circle_intersects_rect(
            ring.pos,
            ring.radius,
            obstacle.pos,
            obstacle.size
        ));
    }

    #[test]
    fn test_drifting_ring_removed_after_leaving() {
        let mut s = CollectibleSpawner::new(CollectibleTuning::default(), ARENA);
        let mut rng = Pcg32::seed_from_u64(5);
        let mut ids = EntityIds::starting_at(10);
        // Entering from the left must survive
        s.push(ring(1, Vec2::new(-40.0, 100.0), CollectibleMotion::Drifting { vel: Vec2::new(100.0, 0.0) }));
        s.update(0.1, &params(1), &mut rng, &mut ids, |_| {});
        assert!(s.collectibles().iter().any(|c| c.id == 1));
        // Leaving on the right is removed
        s.push(ring(2, Vec2::new(810.0, 100.0), CollectibleMotion::Drifting { vel: Vec2::new(100.0, 0.0) }));
        let mut removed = Vec::new();
        s.update(0.1, &params(1), &mut rng, &mut ids, |c| removed.push(c.id));
        assert_eq!(removed, vec![2]);
    }

    #[test]
    fn test_drifting_ring_follows_speed_multiplier() {
        let mut s = CollectibleSpawner::new(CollectibleTuning::default(), ARENA);
        let mut rng = Pcg32::seed_from_u64(5);
        let mut ids = EntityIds::starting_at(10);
        s.push(ring(1, Vec2::new(100.0, 100.0), CollectibleMotion::Drifting { vel: Vec2::new(100.0, 0.0) }));
        let boss = CollectibleParams {
            speed_multiplier: 2.0,
            ..params(1)
        };
        s.update(0.5, &boss, &mut rng, &mut ids, |_| {});
        let c = s.collectibles().iter().find(|c| c.id == 1).unwrap();
        assert!((c.pos.x - 200.0).abs() < 1e-3);
    }

    #[test]
    fn test_bonus_ring_blinks_and_pays_more() {
        let mut tuning = CollectibleTuning::default();
        tuning.bonus_chance = 1.0;
        let mut s = CollectibleSpawner::new(tuning, ARENA);
        let mut rng = Pcg32::seed_from_u64(8);
        let mut ids = EntityIds::default();
        let bonus = CollectibleParams {
            bonus: true,
            ..params(8)
        };
        s.prime_first_spawn();
        s.update(0.01, &bonus, &mut rng, &mut ids, |_| {});
        assert_eq!(s.len(), 1);
        let c = &s.collectibles()[0];
        assert!(c.blinks);
        assert_eq!(c.points, 500);
        assert_eq!(c.max_life, 2.0);
        assert!((c.life - 1.99).abs() < 1e-4);

        // Without the feature the same roll never blinks
        let mut s = CollectibleSpawner::new(CollectibleTuning { bonus_chance: 1.0, ..Default::default() }, ARENA);
        s.prime_first_spawn();
        s.update(0.01, &params(8), &mut rng, &mut ids, |_| {});
        assert!(!s.collectibles()[0].blinks);
    }

    #[test]
    fn test_magnet_pulls_toward_target() {
        let mut s = CollectibleSpawner::new(CollectibleTuning::default(), ARENA);
        let mut rng = Pcg32::seed_from_u64(5);
        let mut ids = EntityIds::starting_at(10);
        let target = Vec2::new(400.0, 300.0);
        s.push(ring(1, Vec2::new(100.0, 300.0), CollectibleMotion::Static));
        let magnet = CollectibleParams {
            magnet: Some(target),
            ..params(1)
        };
        s.update(0.1, &magnet, &mut rng, &mut ids, |_| {});
        let c = s.collectibles().iter().find(|c| c.id == 1).unwrap();
        assert!(c.pos.x > 100.0);
        assert!((c.pos.y - 300.0).abs() < 1e-3);
        // Close in: never overshoots
        for _ in 0..100 {
            s.update(0.1, &magnet, &mut rng, &mut ids, |_| {});
        }
        if let Some(c) = s.collectibles().iter().find(|c| c.id == 1) {
            assert!(c.pos.distance(target) < 1e-3);
        }
    }

    #[test]
    fn test_take_touching() {
        let mut s = CollectibleSpawner::new(CollectibleTuning::default(), ARENA);
        s.push(ring(1, Vec2::new(100.0, 100.0), CollectibleMotion::Static));
        s.push(ring(2, Vec2::new(400.0, 100.0), CollectibleMotion::Static));
        let taken = s.take_touching(Vec2::new(120.0, 100.0), 20.0);
        assert_eq!(taken.len(), 1);
        assert_eq!(taken[0].id, 1);
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut s = CollectibleSpawner::new(CollectibleTuning::default(), ARENA);
        s.push(ring(1, Vec2::new(100.0, 100.0), CollectibleMotion::Static));
        s.prime_first_spawn();
        let mut removed = 0;
        s.reset(|_| removed += 1);
        s.reset(|_| removed += 1);
        assert_eq!(removed, 1);
        assert!(s.is_empty());
        assert_eq!(s.spawn_timer(), 0.0);
    }
}

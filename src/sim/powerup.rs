//! Power-up stars - shield, slow-mo, magnet, extra life, clear
//!
//! One star on screen at a time, spawned on a long fixed timer. Stars float
//! around their spawn point and vanish after a short lifetime.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collectible::random_inside;
use super::state::EntityIds;
use crate::orbit_point;
use crate::tuning::PowerUpTuning;

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Absorbs one hit
    Shield,
    /// Slows obstacles for a while
    SlowMo,
    /// Pulls rings toward the player
    Magnet,
    /// Extra life (rare, short-lived)
    Life,
    /// Wipes every obstacle off the board
    Clear,
}

impl PowerUpKind {
    /// Kinds drawn when the rare life roll fails
    pub const COMMON: [PowerUpKind; 4] = [
        PowerUpKind::Shield,
        PowerUpKind::SlowMo,
        PowerUpKind::Magnet,
        PowerUpKind::Clear,
    ];

    /// Display color (0xRRGGBB)
    pub fn color(self) -> u32 {
        match self {
            PowerUpKind::Shield => 0x2196F3,
            PowerUpKind::SlowMo => 0x9C27B0,
            PowerUpKind::Magnet => 0x00BCD4,
            PowerUpKind::Life => 0xE91E63,
            PowerUpKind::Clear => 0xFFEB3B,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PowerUpKind::Shield => "Shield",
            PowerUpKind::SlowMo => "Slow-mo",
            PowerUpKind::Magnet => "Magnet",
            PowerUpKind::Life => "+1 Life",
            PowerUpKind::Clear => "Clear",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub kind: PowerUpKind,
    pub pos: Vec2,
    pub radius: f32,
    pub life: f32,
    pub max_life: f32,
    pub float_center: Vec2,
    pub float_angle: f32,
}

#[derive(Debug, Clone)]
pub struct PowerUpSpawner {
    tuning: PowerUpTuning,
    arena: Vec2,
    powerups: Vec<PowerUp>,
    spawn_timer: f32,
}

impl PowerUpSpawner {
    pub fn new(tuning: PowerUpTuning, arena: Vec2) -> Self {
        let spawn_timer = tuning.spawn_interval * tuning.first_spawn_fraction;
        Self {
            tuning,
            arena,
            powerups: Vec::new(),
            spawn_timer,
        }
    }

    pub fn powerups(&self) -> &[PowerUp] {
        &self.powerups
    }

    pub fn spawn_timer(&self) -> f32 {
        self.spawn_timer
    }

    pub fn update<R: Rng>(
        &mut self,
        dt: f32,
        rng: &mut R,
        ids: &mut EntityIds,
        mut on_expire: impl FnMut(&PowerUp),
    ) {
        self.spawn_timer += dt;
        if self.spawn_timer >= self.tuning.spawn_interval {
            self.spawn_timer = 0.0;
            if self.powerups.is_empty() {
                let star = self.spawn(rng, ids);
                self.powerups.push(star);
            }
        }

        let t = &self.tuning;
        self.powerups.retain_mut(|p| {
            p.life -= dt;
            p.float_angle += dt * t.float_speed;
            p.pos = orbit_point(p.float_center, t.float_radius, p.float_angle);
            if p.life <= 0.0 {
                on_expire(p);
                false
            } else {
                true
            }
        });
    }

    fn spawn<R: Rng>(&self, rng: &mut R, ids: &mut EntityIds) -> PowerUp {
        let t = &self.tuning;
        let center = random_inside(self.arena, t.spawn_padding, rng);
        let kind = if rng.random::<f32>() < t.life_chance {
            PowerUpKind::Life
        } else {
            PowerUpKind::COMMON[rng.random_range(0..PowerUpKind::COMMON.len())]
        };
        let life = if kind == PowerUpKind::Life {
            t.life_lifetime
        } else {
            t.lifetime
        };
        let angle = rng.random::<f32>() * std::f32::consts::TAU;
        let id = ids.next_id();
        log::debug!("{} star {} spawned", kind.label(), id);
        PowerUp {
            id,
            kind,
            pos: orbit_point(center, t.float_radius, angle),
            radius: t.radius,
            life,
            max_life: life,
            float_center: center,
            float_angle: angle,
        }
    }

    /// First star overlapping the given circle, if any
    pub fn touching(&self, center: Vec2, radius: f32) -> Option<&PowerUp> {
        self.powerups
            .iter()
            .find(|p| super::collision::circle_intersects_circle(center, radius, p.pos, p.radius))
    }

    /// Remove a collected star by ID
    pub fn remove(&mut self, id: u32, mut on_remove: impl FnMut(&PowerUp)) -> Option<PowerUp> {
        let idx = self.powerups.iter().position(|p| p.id == id)?;
        let star = self.powerups.remove(idx);
        on_remove(&star);
        Some(star)
    }

    /// Empty the population and restore the head-start timer
    pub fn reset(&mut self, mut on_remove: impl FnMut(&PowerUp)) {
        for star in self.powerups.drain(..) {
            on_remove(&star);
        }
        self.spawn_timer = self.tuning.spawn_interval * self.tuning.first_spawn_fraction;
    }

    /// Insert a star directly (scripted setups)
    pub fn push(&mut self, powerup: PowerUp) {
        self.powerups.push(powerup);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const ARENA: Vec2 = Vec2::new(800.0, 600.0);

    /// Run the spawner just past its head-start so exactly one star exists
    fn spawn_one(s: &mut PowerUpSpawner, rng: &mut Pcg32, ids: &mut EntityIds) {
        s.update(4.0, rng, ids, |_| {});
        s.update(0.3, rng, ids, |_| {});
        assert_eq!(s.powerups().len(), 1);
    }

    #[test]
    fn test_first_spawn_has_head_start() {
        let mut s = PowerUpSpawner::new(PowerUpTuning::default(), ARENA);
        let mut rng = Pcg32::seed_from_u64(11);
        let mut ids = EntityIds::default();
        // 70% of 14s is pre-loaded, so ~4.2s more triggers the first star
        s.update(4.0, &mut rng, &mut ids, |_| {});
        assert!(s.powerups().is_empty());
        s.update(0.3, &mut rng, &mut ids, |_| {});
        assert_eq!(s.powerups().len(), 1);
    }

    #[test]
    fn test_single_instance_and_expiry() {
        let mut s = PowerUpSpawner::new(PowerUpTuning::default(), ARENA);
        let mut rng = Pcg32::seed_from_u64(11);
        let mut ids = EntityIds::default();
        spawn_one(&mut s, &mut rng, &mut ids);
        let star = s.powerups()[0].clone();
        assert!(star.life <= 4.0);
        assert!(PowerUpKind::COMMON.contains(&star.kind) || star.kind == PowerUpKind::Life);

        let mut expired = Vec::new();
        s.update(4.5, &mut rng, &mut ids, |p| expired.push(p.id));
        assert_eq!(expired, vec![star.id]);
        assert!(s.powerups().is_empty());
    }

    #[test]
    fn test_floats_around_center() {
        let mut s = PowerUpSpawner::new(PowerUpTuning::default(), ARENA);
        let mut rng = Pcg32::seed_from_u64(2);
        let mut ids = EntityIds::default();
        spawn_one(&mut s, &mut rng, &mut ids);
        s.update(0.5, &mut rng, &mut ids, |_| {});
        let p = &s.powerups()[0];
        assert!((p.pos.distance(p.float_center) - 30.0).abs() < 1e-3);
    }

    #[test]
    fn test_remove_by_id() {
        let mut s = PowerUpSpawner::new(PowerUpTuning::default(), ARENA);
        let mut rng = Pcg32::seed_from_u64(11);
        let mut ids = EntityIds::default();
        spawn_one(&mut s, &mut rng, &mut ids);
        let id = s.powerups()[0].id;
        let pos = s.powerups()[0].pos;
        assert!(s.touching(pos, 1.0).is_some());
        let mut removed = 0;
        assert!(s.remove(id, |_| removed += 1).is_some());
        assert!(s.remove(id, |_| removed += 1).is_none());
        assert_eq!(removed, 1);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut s = PowerUpSpawner::new(PowerUpTuning::default(), ARENA);
        let mut rng = Pcg32::seed_from_u64(11);
        let mut ids = EntityIds::default();
        spawn_one(&mut s, &mut rng, &mut ids);
        s.reset(|_| {});
        let timer = s.spawn_timer();
        s.reset(|_| panic!("already empty"));
        assert!(s.powerups().is_empty());
        assert_eq!(s.spawn_timer(), timer);
        assert!((timer - 9.8).abs() < 1e-4);
    }
}

//! Bonus portals - enter one for a timed collectibles-only bonus room
//!
//! At most one portal exists at a time. Portals only live while the feature
//! is unlocked; they sit still and disappear after a short lifetime.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collectible::random_inside;
use super::state::EntityIds;
use crate::tuning::PortalTuning;

/// Display color (0xRRGGBB)
pub const PORTAL_COLOR: u32 = 0x9C27B0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Portal {
    pub id: u32,
    pub pos: Vec2,
    pub radius: f32,
    pub life: f32,
    pub max_life: f32,
}

impl Portal {
    /// 0..1 pulse phase for renderers
    pub fn pulse(&self) -> f32 {
        let elapsed = self.max_life - self.life;
        0.5 + 0.5 * (elapsed * std::f32::consts::TAU).sin()
    }
}

#[derive(Debug, Clone)]
pub struct PortalSpawner {
    tuning: PortalTuning,
    arena: Vec2,
    portals: Vec<Portal>,
    spawn_timer: f32,
}

impl PortalSpawner {
    pub fn new(tuning: PortalTuning, arena: Vec2) -> Self {
        let spawn_timer = tuning.spawn_interval * tuning.first_spawn_fraction;
        Self {
            tuning,
            arena,
            portals: Vec::new(),
            spawn_timer,
        }
    }

    pub fn portals(&self) -> &[Portal] {
        &self.portals
    }

    /// The live portal, if any
    pub fn active(&self) -> Option<&Portal> {
        self.portals.first()
    }

    pub fn spawn_timer(&self) -> f32 {
        self.spawn_timer
    }

    /// Advance timers and lifetimes.
    ///
    /// When `enabled` is false any present portal is removed and nothing
    /// spawns; the timer does not advance either.
    pub fn update<R: Rng>(
        &mut self,
        dt: f32,
        enabled: bool,
        rng: &mut R,
        ids: &mut EntityIds,
        mut on_expire: impl FnMut(&Portal),
    ) {
        if !enabled {
            for portal in self.portals.drain(..) {
                on_expire(&portal);
            }
            return;
        }

        self.spawn_timer += dt;
        if self.spawn_timer >= self.tuning.spawn_interval && self.portals.is_empty() {
            self.spawn_timer = 0.0;
            let portal = Portal {
                id: ids.next_id(),
                pos: random_inside(self.arena, self.tuning.spawn_padding, rng),
                radius: self.tuning.radius,
                life: self.tuning.lifetime,
                max_life: self.tuning.lifetime,
            };
            log::debug!("Portal {} opened at ({:.0}, {:.0})", portal.id, portal.pos.x, portal.pos.y);
            self.portals.push(portal);
        }

        self.portals.retain_mut(|p| {
            p.life -= dt;
            if p.life <= 0.0 {
                on_expire(p);
                false
            } else {
                true
            }
        });
    }

    /// First portal overlapping the given circle, if any
    pub fn touching(&self, center: Vec2, radius: f32) -> Option<&Portal> {
        self.portals
            .iter()
            .find(|p| super::collision::circle_intersects_circle(center, radius, p.pos, p.radius))
    }

    /// Remove an entered portal by ID
    pub fn remove(&mut self, id: u32, mut on_remove: impl FnMut(&Portal)) -> Option<Portal> {
        let idx = self.portals.iter().position(|p| p.id == id)?;
        let portal = self.portals.remove(idx);
        on_remove(&portal);
        Some(portal)
    }

    /// Empty the population and restore the head-start timer
    pub fn reset(&mut self, mut on_remove: impl FnMut(&Portal)) {
        for portal in self.portals.drain(..) {
            on_remove(&portal);
        }
        self.spawn_timer = self.tuning.spawn_interval * self.tuning.first_spawn_fraction;
    }

    /// Insert a portal directly (scripted setups)
    pub fn push(&mut self, portal: Portal) {
        self.portals.push(portal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const ARENA: Vec2 = Vec2::new(800.0, 600.0);

    #[test]
    fn test_spawns_after_head_start_and_expires() {
        let mut s = PortalSpawner::new(PortalTuning::default(), ARENA);
        let mut rng = Pcg32::seed_from_u64(4);
        let mut ids = EntityIds::default();
        // 60s pre-loaded of a 100s interval
        s.update(39.0, true, &mut rng, &mut ids, |_| {});
        assert!(s.active().is_none());
        s.update(1.5, true, &mut rng, &mut ids, |_| {});
        let portal = s.active().cloned().unwrap();
        assert!(portal.pos.x >= 80.0 && portal.pos.x <= 720.0);

        let mut expired = Vec::new();
        s.update(2.0, true, &mut rng, &mut ids, |p| expired.push(p.id));
        assert_eq!(expired, vec![portal.id]);
        assert!(s.active().is_none());
    }

    #[test]
    fn test_disabled_clears_and_freezes() {
        let mut s = PortalSpawner::new(PortalTuning::default(), ARENA);
        let mut rng = Pcg32::seed_from_u64(4);
        let mut ids = EntityIds::default();
        s.push(Portal {
            id: 7,
            pos: Vec2::new(100.0, 100.0),
            radius: 14.0,
            life: 3.0,
            max_life: 3.0,
        });
        let timer = s.spawn_timer();
        let mut removed = Vec::new();
        s.update(50.0, false, &mut rng, &mut ids, |p| removed.push(p.id));
        assert_eq!(removed, vec![7]);
        assert_eq!(s.spawn_timer(), timer);
    }

    #[test]
    fn test_remove_entered_portal() {
        let mut s = PortalSpawner::new(PortalTuning::default(), ARENA);
        s.push(Portal {
            id: 3,
            pos: Vec2::new(200.0, 200.0),
            radius: 14.0,
            life: 3.0,
            max_life: 3.0,
        });
        assert!(s.touching(Vec2::new(220.0, 200.0), 10.0).is_some());
        assert!(s.touching(Vec2::new(240.0, 200.0), 10.0).is_none());
        assert_eq!(s.remove(3, |_| {}).map(|p| p.id), Some(3));
        assert!(s.portals().is_empty());
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut s = PortalSpawner::new(PortalTuning::default(), ARENA);
        let mut rng = Pcg32::seed_from_u64(4);
        let mut ids = EntityIds::default();
        s.update(40.5, true, &mut rng, &mut ids, |_| {});
        s.reset(|_| {});
        s.reset(|_| panic!("already empty"));
        assert!(s.portals().is_empty());
        assert!((s.spawn_timer() - 60.0).abs() < 1e-4);
    }
}

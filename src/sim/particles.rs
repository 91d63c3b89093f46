//! Visual-only particle bursts
//!
//! Particles never affect gameplay; the core only spawns, decays and counts
//! them so a renderer can draw whatever is alive.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Per-frame velocity retention at 60 fps
const DRAG_PER_FRAME: f32 = 0.95;
const REFERENCE_FPS: f32 = 60.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Seconds left
    pub life: f32,
    pub max_life: f32,
    pub size: f32,
    /// Display color (0xRRGGBB)
    pub color: u32,
}

impl Particle {
    /// Remaining life as 0..1 (alpha for fade-out)
    pub fn alpha(&self) -> f32 {
        if self.max_life <= 0.0 {
            0.0
        } else {
            (self.life / self.max_life).clamp(0.0, 1.0)
        }
    }
}

/// Shape of a radial burst
#[derive(Debug, Clone, Copy)]
pub struct Burst {
    pub count: usize,
    pub min_speed: f32,
    pub max_speed: f32,
    pub life: f32,
    pub color: u32,
}

impl Burst {
    /// Large red explosion when the run ends
    pub const GAME_OVER: Burst = Burst {
        count: 24,
        min_speed: 80.0,
        max_speed: 200.0,
        life: 0.5,
        color: 0xE93935,
    };

    /// Player took a hit
    pub const HIT: Burst = Burst {
        count: 16,
        min_speed: 60.0,
        max_speed: 160.0,
        life: 0.4,
        color: 0xFF7043,
    };

    /// Small sparkle for a pickup
    pub fn pickup(color: u32) -> Burst {
        Burst {
            count: 10,
            min_speed: 40.0,
            max_speed: 120.0,
            life: 0.35,
            color,
        }
    }
}

/// Live particle pool with a hard cap
#[derive(Debug, Clone, Default)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    max: usize,
}

impl ParticleSystem {
    pub fn new(max: usize) -> Self {
        Self {
            particles: Vec::new(),
            max,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Number of live particles
    pub fn active_count(&self) -> usize {
        self.particles.len()
    }

    /// Emit a radial burst at `pos`; oldest particles make room at the cap
    pub fn burst<R: Rng>(&mut self, pos: Vec2, burst: Burst, rng: &mut R) {
        if self.max == 0 {
            return;
        }
        for i in 0..burst.count {
            if self.particles.len() >= self.max {
                self.particles.remove(0);
            }
            let angle = std::f32::consts::TAU * i as f32 / burst.count as f32 + rng.random::<f32>() * 0.5;
            let speed = burst.min_speed + rng.random::<f32>() * (burst.max_speed - burst.min_speed).max(0.0);
            self.particles.push(Particle {
                pos,
                vel: Vec2::new(angle.cos(), angle.sin()) * speed,
                life: burst.life,
                max_life: burst.life,
                size: 4.0 + rng.random::<f32>() * 4.0,
                color: burst.color,
            });
        }
    }

    /// Move, slow down and age every particle; drop the dead ones
    pub fn update(&mut self, dt: f32) {
        let drag = DRAG_PER_FRAME.powf(dt * REFERENCE_FPS);
        for p in &mut self.particles {
            p.pos += p.vel * dt;
            p.vel *= drag;
            p.life -= dt;
        }
        self.particles.retain(|p| p.life > 0.0);
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}

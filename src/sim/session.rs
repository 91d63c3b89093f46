//! Game session - everything that lives for one play-through
//!
//! The session exclusively owns the player, every spawner, score, lives and
//! timers. Collaborators read entities through the accessors below and learn
//! about changes through the event queue; they never mutate core state.

use std::collections::HashSet;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::collectible::{Collectible, CollectibleSpawner};
use super::obstacle::{Obstacle, ObstacleSpawner};
use super::particles::{Particle, ParticleSystem};
use super::player::Player;
use super::portal::{Portal, PortalSpawner};
use super::powerup::{PowerUp, PowerUpSpawner};
use super::state::{
    EntityIds, EntityKind, GameEvent, NearMissCombo, PlayMode, ScoreReason, SessionPhase, Timers,
};
use crate::settings::Settings;
use crate::tuning::Tuning;

/// One play-through of the simulation
#[derive(Debug, Clone)]
pub struct GameSession {
    pub(crate) tuning: Tuning,
    pub(crate) settings: Settings,
    pub(crate) seed: u64,
    pub(crate) rng: Pcg32,
    pub(crate) ids: EntityIds,
    pub(crate) arena: Vec2,

    pub(crate) phase: SessionPhase,
    pub(crate) mode: PlayMode,

    pub(crate) player: Player,
    pub(crate) obstacles: ObstacleSpawner,
    pub(crate) collectibles: CollectibleSpawner,
    pub(crate) powerups: PowerUpSpawner,
    pub(crate) portals: PortalSpawner,
    /// Bonus-room ring stream (only populated in portal mode)
    pub(crate) portal_rings: Vec<Collectible>,
    pub(crate) portal_ring_timer: f32,
    pub(crate) particles: ParticleSystem,

    pub(crate) score: u64,
    pub(crate) lives: u8,
    pub(crate) level: u32,
    pub(crate) shields: u8,
    /// Seconds spent in `Playing`
    pub(crate) survival_time: f32,
    /// Fractional seconds not yet paid out as survival points
    pub(crate) survival_accum: f32,
    pub(crate) timers: Timers,
    pub(crate) countdown_phase: u32,
    pub(crate) near_miss: NearMissCombo,
    /// Obstacles that already produced a near-miss
    pub(crate) near_missed: HashSet<u32>,
    pub(crate) screen_shake: f32,

    pub(crate) events: Vec<GameEvent>,
}

impl GameSession {
    /// Create an idle session. Call [`GameSession::start`] before updating.
    pub fn new(seed: u64, tuning: Tuning, settings: Settings) -> Self {
        let arena = Vec2::new(tuning.arena_width, tuning.arena_height);
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            ids: EntityIds::default(),
            arena,
            phase: SessionPhase::Idle,
            mode: PlayMode::Normal,
            player: Player::new(&tuning.player, arena),
            obstacles: ObstacleSpawner::new(tuning.obstacles.clone(), arena),
            collectibles: CollectibleSpawner::new(tuning.collectibles.clone(), arena),
            powerups: PowerUpSpawner::new(tuning.powerups.clone(), arena),
            portals: PortalSpawner::new(tuning.portals.clone(), arena),
            portal_rings: Vec::new(),
            portal_ring_timer: 0.0,
            particles: ParticleSystem::new(settings.max_particles()),
            score: 0,
            lives: tuning.start_lives,
            level: 1,
            shields: 0,
            survival_time: 0.0,
            survival_accum: 0.0,
            timers: Timers::default(),
            countdown_phase: 0,
            near_miss: NearMissCombo::default(),
            near_missed: HashSet::new(),
            screen_shake: 0.0,
            events: Vec::new(),
            tuning,
            settings,
        }
    }

    /// Reset everything and begin the countdown
    pub fn start(&mut self) {
        self.reset();
        self.phase = SessionPhase::Countdown;
        self.timers.countdown = self.tuning.countdown_duration.max(0.0);
        self.countdown_phase = self.timers.countdown.ceil() as u32;
        if self.countdown_phase > 0 {
            self.events.push(GameEvent::CountdownBeep {
                phase: self.countdown_phase,
            });
        }
        log::info!("Session started (seed {})", self.seed);
    }

    /// Return to a clean idle state.
    ///
    /// Every live entity is reported as removed. Calling this twice in a
    /// row leaves the same state as calling it once.
    pub fn reset(&mut self) {
        let events = &mut self.events;
        self.obstacles
            .reset(|o| events.push(removed(EntityKind::Obstacle, o.id)));
        self.collectibles
            .reset(|c| events.push(removed(EntityKind::Collectible, c.id)));
        self.powerups
            .reset(|p| events.push(removed(EntityKind::PowerUp, p.id)));
        self.portals
            .reset(|p| events.push(removed(EntityKind::Portal, p.id)));
        for ring in self.portal_rings.drain(..) {
            events.push(removed(EntityKind::Collectible, ring.id));
        }
        self.portal_ring_timer = 0.0;
        self.particles.clear();

        self.player.reset(self.arena);
        self.phase = SessionPhase::Idle;
        self.mode = PlayMode::Normal;
        self.score = 0;
        self.lives = self.tuning.start_lives;
        self.level = 1;
        self.shields = 0;
        self.survival_time = 0.0;
        self.survival_accum = 0.0;
        self.timers = Timers::default();
        self.countdown_phase = 0;
        self.near_miss.clear();
        self.near_missed.clear();
        self.screen_shake = 0.0;
    }

    /// Take every event queued since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Events queued since the last drain, without taking them
    pub fn pending_events(&self) -> &[GameEvent] {
        &self.events
    }

    pub(super) fn add_score(&mut self, delta: u64, reason: ScoreReason) {
        if delta == 0 {
            return;
        }
        self.score += delta;
        self.events.push(GameEvent::ScoreChanged {
            delta,
            total: self.score,
            reason,
        });
    }

    pub(super) fn add_shake(&mut self, amount: f32) {
        if self.settings.effective_screen_shake() {
            self.screen_shake = (self.screen_shake + amount).min(1.0);
        }
    }

    // --- Read-only views for renderers, audio and UI ---

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn arena(&self) -> Vec2 {
        self.arena
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn mode(&self) -> PlayMode {
        self.mode
    }

    /// Game over has been reported
    pub fn is_finished(&self) -> bool {
        self.phase == SessionPhase::Finished
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        self.obstacles.obstacles()
    }

    pub fn collectibles(&self) -> &[Collectible] {
        self.collectibles.collectibles()
    }

    /// Bonus-room rings
    pub fn portal_collectibles(&self) -> &[Collectible] {
        &self.portal_rings
    }

    pub fn powerups(&self) -> &[PowerUp] {
        self.powerups.powerups()
    }

    pub fn portals(&self) -> &[Portal] {
        self.portals.portals()
    }

    pub fn particles(&self) -> &[Particle] {
        self.particles.particles()
    }

    pub fn active_particles(&self) -> usize {
        self.particles.active_count()
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn lives(&self) -> u8 {
        self.lives
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn shields(&self) -> u8 {
        self.shields
    }

    pub fn survival_time(&self) -> f32 {
        self.survival_time
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    /// Number currently shown by the countdown (0 once it has finished)
    pub fn countdown_phase(&self) -> u32 {
        self.countdown_phase
    }

    pub fn countdown_time(&self) -> f32 {
        self.timers.countdown
    }

    pub fn is_portal_mode(&self) -> bool {
        self.mode == PlayMode::Portal
    }

    pub fn portal_time_left(&self) -> f32 {
        self.timers.portal_mode
    }

    pub fn is_invincible(&self) -> bool {
        self.timers.invincibility > 0.0
    }

    pub fn boss_wave_active(&self) -> bool {
        self.timers.boss_wave > 0.0
    }

    /// Level to announce while the level-up banner is showing
    pub fn level_up_announcement(&self) -> Option<u32> {
        (self.timers.level_up_announce > 0.0).then_some(self.level)
    }

    /// Near-misses counting toward the combo, and how many are needed
    pub fn near_miss_progress(&self) -> (usize, usize) {
        let t = &self.tuning.near_miss;
        (
            self.near_miss.progress(self.survival_time, t.window),
            t.target,
        )
    }

    /// Camera shake magnitude (0-1)
    pub fn screen_shake(&self) -> f32 {
        self.screen_shake
    }
}

#[inline]
pub(super) fn removed(kind: EntityKind, id: u32) -> GameEvent {
    GameEvent::EntityRemoved { kind, id }
}

//! Per-frame simulation pipeline
//!
//! One `update` call per animation frame. Within a frame each step sees the
//! effects of the steps before it (a power-up grabbed in step 2 already slows
//! the obstacles moved in step 4).

use glam::Vec2;
use rand::Rng;

use super::collectible::{Collectible, CollectibleMotion, CollectibleParams, random_inside, take_touching};
use super::collision::{circle_hits_any, nearest_rect_distance};
use super::features::{Feature, features_unlocked_at, gated_level, level_for_time};
use super::obstacle::ObstacleParams;
use super::particles::Burst;
use super::powerup::PowerUpKind;
use super::session::{GameSession, removed};
use super::state::{EntityKind, GameEvent, PlayMode, ScoreReason, SessionPhase};
use crate::consts::{MAX_FRAME_DT, OBSTACLE_CLEARED_POINTS, SURVIVAL_POINTS_PER_SEC};

/// Input sampled for a single frame
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Movement with magnitude <= 1 (already dead-zoned and capped)
    pub movement: Vec2,
    /// Any action button pressed this frame
    pub action: bool,
    /// Pause button held this frame
    pub pause: bool,
}

impl GameSession {
    /// Advance the session by one frame.
    ///
    /// `dt` is clamped to [`MAX_FRAME_DT`]; non-finite deltas count as zero.
    ///
    /// # Panics
    ///
    /// Panics if the session was never started.
    pub fn update(&mut self, input: &TickInput, dt: f32) {
        assert!(
            self.phase != SessionPhase::Idle,
            "GameSession::update called before GameSession::start"
        );
        // A broken frame clock must not poison positions and timers
        let dt = if dt.is_finite() { dt.clamp(0.0, MAX_FRAME_DT) } else { 0.0 };

        match self.phase {
            SessionPhase::Countdown => self.tick_countdown(input, dt),
            SessionPhase::Playing => match self.mode {
                PlayMode::Normal => self.tick_playing(input, dt),
                PlayMode::Portal => self.tick_portal(input, dt),
            },
            SessionPhase::GameOverAnim => self.tick_game_over(dt),
            SessionPhase::Idle | SessionPhase::Finished => {}
        }
    }

    fn tick_countdown(&mut self, input: &TickInput, dt: f32) {
        self.player.advance(input.movement, dt, self.arena);

        self.timers.countdown = (self.timers.countdown - dt).max(0.0);
        let phase = self.timers.countdown.ceil() as u32;
        if phase > 0 && phase != self.countdown_phase {
            self.countdown_phase = phase;
            self.events.push(GameEvent::CountdownBeep { phase });
        }

        if self.timers.countdown <= 0.0 {
            self.countdown_phase = 0;
            self.phase = SessionPhase::Playing;
            self.collectibles.prime_first_spawn();
            self.events.push(GameEvent::CountdownGo);
            log::info!("Go!");
        }

        self.tick_visuals(dt);
    }

    fn tick_playing(&mut self, input: &TickInput, dt: f32) {
        self.timers.tick_effects(dt);

        // 1. Player
        self.player.advance(input.movement, dt, self.arena);

        // 2. Power-ups first so their effects are live this frame
        self.collect_powerup();

        // 3. Portal entry
        if self.try_enter_portal() {
            self.tick_survival(dt);
            self.tick_visuals(dt);
            return;
        }

        // 4. Spawners and level progression
        self.tick_survival(dt);
        self.advance_spawners(dt);

        // 5. Rings
        self.collect_rings();

        // 6. Obstacles that left the arena
        let events = &mut self.events;
        let cleared = self
            .obstacles
            .remove_outside(|o| events.push(removed(EntityKind::Obstacle, o.id)));
        self.add_score(cleared as u64 * OBSTACLE_CLEARED_POINTS, ScoreReason::ObstacleCleared);

        // 7. Near misses
        self.detect_near_miss();

        // 8. Survival points
        self.pay_survival_points();

        // 9. Obstacle contact
        if !self.is_invincible()
            && circle_hits_any(self.player.pos, self.player.radius, self.obstacles.obstacles())
        {
            self.on_player_hit();
        }

        // 10. Shake and particles
        self.tick_visuals(dt);
    }

    fn tick_portal(&mut self, input: &TickInput, dt: f32) {
        self.timers.tick_effects(dt);

        // Obstacles are frozen walls here: block movement, never hurt
        let before = self.player.pos;
        self.player.advance(input.movement, dt, self.arena);
        let obstacles = self.obstacles.obstacles();
        let radius = self.player.radius;
        if circle_hits_any(self.player.pos, radius, obstacles) && !circle_hits_any(before, radius, obstacles) {
            self.player.pos = before;
        }

        self.tick_portal_stream(dt);

        let taken = take_touching(&mut self.portal_rings, self.player.pos, self.player.radius);
        for ring in taken {
            self.events.push(removed(EntityKind::Collectible, ring.id));
            self.events.push(GameEvent::CollectibleCollected {
                points: ring.points,
                bonus: false,
            });
            self.particles
                .burst(ring.pos, Burst::pickup(0xFFD54F), &mut self.rng);
            self.add_score(ring.points, ScoreReason::PortalCollectible);
        }

        self.tick_survival(dt);
        self.pay_survival_points();

        self.timers.portal_mode = (self.timers.portal_mode - dt).max(0.0);
        if self.timers.portal_mode <= 0.0 {
            self.exit_portal();
        }

        self.tick_visuals(dt);
    }

    fn tick_game_over(&mut self, dt: f32) {
        self.tick_visuals(dt);
        self.timers.game_over_anim = (self.timers.game_over_anim - dt).max(0.0);
        if self.timers.game_over_anim <= 0.0 {
            self.phase = SessionPhase::Finished;
            log::info!("Game over: score {} at level {}", self.score, self.level);
            self.events.push(GameEvent::GameOver {
                score: self.score,
                level: self.level,
            });
        }
    }

    /// Step 2: grab a touching star and apply its effect immediately
    fn collect_powerup(&mut self) {
        let Some(id) = self
            .powerups
            .touching(self.player.pos, self.player.radius)
            .map(|p| p.id)
        else {
            return;
        };
        let events = &mut self.events;
        let Some(star) = self
            .powerups
            .remove(id, |p| events.push(removed(EntityKind::PowerUp, p.id)))
        else {
            return;
        };

        log::debug!("Collected {}", star.kind.label());
        self.events.push(GameEvent::PowerUpCollected { kind: star.kind });
        self.particles
            .burst(star.pos, Burst::pickup(star.kind.color()), &mut self.rng);

        let t = &self.tuning;
        match star.kind {
            PowerUpKind::Shield => {
                if self.shields < t.max_shields {
                    self.shields += 1;
                    self.events.push(GameEvent::ShieldChanged {
                        shields: self.shields,
                    });
                }
            }
            PowerUpKind::SlowMo => self.timers.slowmo = t.powerups.slowmo_duration,
            PowerUpKind::Magnet => self.timers.magnet = t.powerups.magnet_duration,
            PowerUpKind::Life => {
                if self.lives < t.max_lives {
                    self.lives += 1;
                    self.events.push(GameEvent::LivesChanged { lives: self.lives });
                }
            }
            PowerUpKind::Clear => {
                let events = &mut self.events;
                let cleared = self
                    .obstacles
                    .clear_all(|o| events.push(removed(EntityKind::Obstacle, o.id)));
                self.near_missed.clear();
                self.add_score(cleared as u64 * OBSTACLE_CLEARED_POINTS, ScoreReason::ClearPowerUp);
            }
        }
    }

    /// Step 3: touching an unlocked portal opens the bonus room
    fn try_enter_portal(&mut self) -> bool {
        if !Feature::BonusPortal.enabled_at(self.level) {
            return false;
        }
        let Some(id) = self
            .portals
            .touching(self.player.pos, self.player.radius)
            .map(|p| p.id)
        else {
            return false;
        };
        let events = &mut self.events;
        self.portals
            .remove(id, |p| events.push(removed(EntityKind::Portal, p.id)));

        self.mode = PlayMode::Portal;
        self.timers.portal_mode = self.tuning.portals.mode_duration;
        self.portal_ring_timer = 0.0;
        self.events.push(GameEvent::PortalEntered);
        log::info!("Entered bonus portal ({:.0}s)", self.timers.portal_mode);
        true
    }

    fn exit_portal(&mut self) {
        for ring in self.portal_rings.drain(..) {
            self.events.push(removed(EntityKind::Collectible, ring.id));
        }
        self.mode = PlayMode::Normal;
        self.timers.portal_mode = 0.0;
        self.timers.invincibility = self
            .timers
            .invincibility
            .max(self.tuning.portals.exit_grace);
        self.events.push(GameEvent::PortalExited);
        log::info!("Left bonus portal");
    }

    fn tick_portal_stream(&mut self, dt: f32) {
        let t = &self.tuning.portals;
        self.portal_ring_timer += dt;
        if self.portal_ring_timer >= t.stream_interval {
            self.portal_ring_timer = 0.0;
            if self.portal_rings.len() < t.stream_cap {
                let pos = random_inside(self.arena, self.tuning.collectibles.spawn_padding, &mut self.rng);
                self.portal_rings.push(Collectible {
                    id: self.ids.next_id(),
                    pos,
                    radius: self.tuning.collectibles.radius,
                    points: t.stream_points,
                    life: t.stream_lifetime,
                    max_life: t.stream_lifetime,
                    motion: CollectibleMotion::Static,
                    blinks: false,
                });
            }
        }

        let events = &mut self.events;
        self.portal_rings.retain_mut(|ring| {
            ring.life -= dt;
            if ring.life <= 0.0 {
                events.push(removed(EntityKind::Collectible, ring.id));
                false
            } else {
                true
            }
        });
    }

    /// Survival clock, level-ups and boss-wave bookkeeping
    fn tick_survival(&mut self, dt: f32) {
        self.survival_time += dt;
        self.survival_accum += dt;

        if self.timers.boss_wave > 0.0 {
            self.timers.boss_wave = (self.timers.boss_wave - dt).max(0.0);
            if self.timers.boss_wave <= 0.0 {
                self.events.push(GameEvent::BossWaveEnded);
                log::info!("Boss wave over");
            }
        }

        // One level-up per boundary crossed, even on a long frame
        let reached = level_for_time(self.survival_time, self.tuning.level_duration);
        while self.level < reached {
            self.level += 1;
            let unlocked = features_unlocked_at(self.level);
            log::info!(
                "Level {}{}",
                self.level,
                if unlocked.is_empty() {
                    String::new()
                } else {
                    format!(
                        " - unlocked: {}",
                        unlocked.iter().map(|f| f.label()).collect::<Vec<_>>().join(", ")
                    )
                }
            );
            self.events.push(GameEvent::LevelUp {
                level: self.level,
                unlocked,
            });
            self.timers.level_up_announce = self.tuning.level_up_announce_duration;

            let every = self.tuning.boss_wave.every_levels;
            if Feature::BossWave.enabled_at(self.level) && every > 0 && self.level % every == 0 {
                self.timers.boss_wave = self.tuning.boss_wave.duration;
                self.events.push(GameEvent::BossWaveStarted { level: self.level });
                log::info!("Boss wave at level {}", self.level);
            }
        }
    }

    fn pay_survival_points(&mut self) {
        if self.survival_accum >= 1.0 {
            let secs = self.survival_accum.floor();
            self.survival_accum -= secs;
            self.add_score(secs as u64 * SURVIVAL_POINTS_PER_SEC, ScoreReason::Survival);
        }
    }

    /// Obstacle speed factor from slow-mo and boss waves
    fn obstacle_speed_multiplier(&self) -> f32 {
        let mut multiplier = 1.0;
        if self.timers.slowmo > 0.0 {
            multiplier *= self.tuning.powerups.slowmo_multiplier;
        }
        if self.timers.boss_wave > 0.0 {
            multiplier *= self.tuning.boss_wave.speed_multiplier;
        }
        multiplier
    }

    /// Step 4: obstacles, rings, stars, portals
    fn advance_spawners(&mut self, dt: f32) {
        let level = self.level;
        let speed_multiplier = self.obstacle_speed_multiplier();
        let params = ObstacleParams {
            speed_multiplier,
            speed_level: gated_level(Feature::ObstacleSpeedRamp, level),
            count_level: gated_level(Feature::ObstacleCountRamp, level),
            spawn_level: gated_level(Feature::ObstacleSpawnRamp, level),
            hard_variant: Feature::SuddenHardObstacles.enabled_at(level),
        };
        let spawned = self
            .obstacles
            .update(dt, &params, &mut self.rng, &mut self.ids);

        if let Some(obstacle) = spawned {
            if Feature::CollectibleInFront.enabled_at(level)
                && self.rng.random::<f32>() < self.tuning.obstacles.in_front_chance
            {
                self.collectibles.spawn_in_front(&obstacle, &mut self.ids);
            }
        }

        let events = &mut self.events;
        if Feature::Collectibles.enabled_at(level) {
            let params = CollectibleParams {
                level,
                floating: Feature::CollectibleFloat.enabled_at(level),
                bonus: Feature::CollectibleBonus.enabled_at(level),
                magnet: (self.timers.magnet > 0.0).then_some(self.player.pos),
                speed_multiplier,
            };
            self.collectibles.update(dt, &params, &mut self.rng, &mut self.ids, |c| {
                events.push(removed(EntityKind::Collectible, c.id))
            });
        }

        if Feature::PowerUps.enabled_at(level) {
            self.powerups.update(dt, &mut self.rng, &mut self.ids, |p| {
                events.push(removed(EntityKind::PowerUp, p.id))
            });
        }

        self.portals.update(
            dt,
            Feature::BonusPortal.enabled_at(level),
            &mut self.rng,
            &mut self.ids,
            |p| events.push(removed(EntityKind::Portal, p.id)),
        );
    }

    /// Step 5: collect every ring the player touches
    fn collect_rings(&mut self) {
        let taken = self
            .collectibles
            .take_touching(self.player.pos, self.player.radius);
        for ring in taken {
            self.events.push(removed(EntityKind::Collectible, ring.id));
            self.events.push(GameEvent::CollectibleCollected {
                points: ring.points,
                bonus: ring.blinks,
            });
            self.particles
                .burst(ring.pos, Burst::pickup(0xFFD54F), &mut self.rng);
            self.add_score(ring.points, ScoreReason::Collectible);
        }
    }

    /// Step 7: close shave with the nearest obstacle
    fn detect_near_miss(&mut self) {
        let obstacles = self.obstacles.obstacles();
        self.near_missed
            .retain(|id| obstacles.iter().any(|o| o.id == *id));

        let Some(nearest) = nearest_rect_distance(self.player.pos, obstacles) else {
            return;
        };
        let t = &self.tuning.near_miss;
        let close = nearest.distance > self.player.radius && nearest.distance <= t.distance;
        if !close || self.near_missed.contains(&nearest.id) || self.timers.near_miss_cooldown > 0.0 {
            return;
        }

        self.near_missed.insert(nearest.id);
        self.timers.near_miss_cooldown = t.cooldown;
        self.events.push(GameEvent::NearMiss {
            obstacle: nearest.id,
        });

        if Feature::NearMissCombo.enabled_at(self.level)
            && self.near_miss.record(self.survival_time, t.window, t.target)
        {
            let bonus = t.bonus;
            log::debug!("Near-miss combo! +{}", bonus);
            self.events.push(GameEvent::NearMissCombo { bonus });
            self.add_score(bonus, ScoreReason::NearMissCombo);
        }
    }

    /// Step 9: shield absorbs, otherwise lose a life (or the run)
    fn on_player_hit(&mut self) {
        self.add_shake(self.tuning.hit_shake);
        self.particles
            .burst(self.player.pos, Burst::HIT, &mut self.rng);

        if self.shields > 0 {
            self.shields -= 1;
            self.timers.invincibility = self.tuning.invincibility_duration;
            self.events.push(GameEvent::PlayerHit { shielded: true });
            self.events.push(GameEvent::ShieldChanged {
                shields: self.shields,
            });
            return;
        }

        self.lives = self.lives.saturating_sub(1);
        self.events.push(GameEvent::PlayerHit { shielded: false });
        self.events.push(GameEvent::LivesChanged { lives: self.lives });

        if self.lives == 0 {
            self.begin_game_over();
        } else {
            self.timers.invincibility = self.tuning.invincibility_duration;
        }
    }

    fn begin_game_over(&mut self) {
        self.phase = SessionPhase::GameOverAnim;
        self.timers.game_over_anim = self.tuning.game_over_anim_duration;
        self.particles
            .burst(self.player.pos, Burst::GAME_OVER, &mut self.rng);
        self.events.push(GameEvent::GameOverStarted);
        log::info!("Out of lives");
    }

    /// Particles keep moving and the camera settles in every phase
    fn tick_visuals(&mut self, dt: f32) {
        self.particles.update(dt);
        self.screen_shake *= (-self.tuning.shake_decay * dt).exp();
        if self.screen_shake < 0.01 {
            self.screen_shake = 0.0;
        }
    }
}

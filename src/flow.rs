//! Top-level game flow: menu, playing, paused, game over
//!
//! Wraps one `GameSession` and the high-score record. Driven once per frame
//! with the sampled input; returns the session events produced that frame.

use crate::highscores::HighScores;
use crate::sim::{GameEvent, GameSession, TickInput};

/// Screen the player is looking at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// Waiting for any action to start
    Menu,
    /// Session running (includes its countdown and game-over animation)
    Playing,
    /// Session frozen; pause again to resume
    Paused,
    /// Run reported; any action starts another
    GameOver,
}

pub struct GameFlow {
    state: AppState,
    session: GameSession,
    high_scores: HighScores,
    last_pause: bool,
    last_action: bool,
    runs: u32,
    /// High scores changed since the last `take_high_scores_changed`
    high_scores_changed: bool,
}

impl GameFlow {
    pub fn new(session: GameSession, high_scores: HighScores) -> Self {
        Self {
            state: AppState::Menu,
            session,
            high_scores,
            last_pause: false,
            last_action: false,
            runs: 0,
            high_scores_changed: false,
        }
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    /// Runs started so far
    pub fn runs(&self) -> u32 {
        self.runs
    }

    /// True once after the record improved (save it)
    pub fn take_high_scores_changed(&mut self) -> bool {
        std::mem::take(&mut self.high_scores_changed)
    }

    /// Advance one frame. Pause and action react to the press, not the hold.
    pub fn frame(&mut self, input: &TickInput, dt: f32) -> Vec<GameEvent> {
        let pause_pressed = input.pause && !self.last_pause;
        let action_pressed = input.action && !self.last_action;
        self.last_pause = input.pause;
        self.last_action = input.action;

        match self.state {
            AppState::Menu | AppState::GameOver => {
                if action_pressed {
                    self.start_run();
                    return self.session.drain_events();
                }
                Vec::new()
            }
            AppState::Playing => {
                if pause_pressed {
                    self.state = AppState::Paused;
                    log::info!("Paused");
                    return Vec::new();
                }
                self.session.update(input, dt);
                let events = self.session.drain_events();
                self.observe(&events);
                events
            }
            AppState::Paused => {
                if pause_pressed {
                    self.state = AppState::Playing;
                    log::info!("Resumed");
                }
                Vec::new()
            }
        }
    }

    fn start_run(&mut self) {
        self.runs += 1;
        self.session.start();
        self.state = AppState::Playing;
        log::info!("Run {} starting", self.runs);
    }

    /// Keep the record current as the run progresses
    fn observe(&mut self, events: &[GameEvent]) {
        for event in events {
            match event {
                GameEvent::ScoreChanged { total, .. } => {
                    self.high_scores_changed |= self.high_scores.record_score(*total);
                }
                GameEvent::LevelUp { level, .. } => {
                    self.high_scores_changed |= self.high_scores.record_level(*level);
                }
                GameEvent::GameOver { score, level } => {
                    self.high_scores_changed |= self.high_scores.record(*score, *level);
                    self.state = AppState::GameOver;
                    log::info!(
                        "Run {} over: {} pts (best {}), level {} (best {})",
                        self.runs,
                        score,
                        self.high_scores.best_score,
                        level,
                        self.high_scores.best_level
                    );
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::{Obstacle, SessionPhase};
    use crate::tuning::Tuning;
    use glam::Vec2;

    const DT: f32 = 1.0 / 64.0;

    fn flow(tuning: Tuning) -> GameFlow {
        GameFlow::new(GameSession::new(7, tuning, Settings::default()), HighScores::default())
    }

    fn idle() -> TickInput {
        TickInput::default()
    }

    fn action() -> TickInput {
        TickInput {
            action: true,
            ..Default::default()
        }
    }

    fn pause() -> TickInput {
        TickInput {
            pause: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_menu_waits_for_action() {
        let mut f = flow(Tuning::default());
        for _ in 0..10 {
            assert!(f.frame(&idle(), DT).is_empty());
        }
        assert_eq!(f.state(), AppState::Menu);

        let events = f.frame(&action(), DT);
        assert_eq!(f.state(), AppState::Playing);
        assert_eq!(f.session().phase(), SessionPhase::Countdown);
        assert!(events.contains(&GameEvent::CountdownBeep { phase: 3 }));
    }

    #[test]
    fn test_pause_toggles_on_press_only() {
        let mut f = flow(Tuning::default());
        f.frame(&action(), DT);
        f.frame(&idle(), DT);
        let before = f.session().countdown_time();

        f.frame(&pause(), DT);
        assert_eq!(f.state(), AppState::Paused);
        // Holding pause keeps it paused and the session frozen
        for _ in 0..20 {
            f.frame(&pause(), DT);
        }
        assert_eq!(f.state(), AppState::Paused);
        assert_eq!(f.session().countdown_time(), before);

        f.frame(&idle(), DT);
        f.frame(&pause(), DT);
        assert_eq!(f.state(), AppState::Playing);
    }

    #[test]
    fn test_game_over_records_and_restarts() {
        let mut tuning = Tuning::default();
        tuning.start_lives = 1;
        tuning.obstacles.cap_start = 0;
        tuning.obstacles.cap_max = 0;
        let mut f = flow(tuning);
        f.frame(&action(), DT);
        while f.session().phase() == SessionPhase::Countdown {
            f.frame(&idle(), DT);
        }
        // Survive long enough to score, then get hit
        for _ in 0..(64 * 3) {
            f.frame(&idle(), DT);
        }
        let center = f.session.player.pos;
        f.session.obstacles.push(Obstacle::new(
            500,
            center - Vec2::splat(10.0),
            Vec2::splat(20.0),
            Vec2::ZERO,
            0,
        ));

        let mut game_over = None;
        for _ in 0..200 {
            for e in f.frame(&idle(), DT) {
                if let GameEvent::GameOver { score, level } = e {
                    game_over = Some((score, level));
                }
            }
        }
        let (score, level) = game_over.expect("run should end");
        assert_eq!(f.state(), AppState::GameOver);
        assert!(score >= 30);
        assert_eq!(f.high_scores().best_score, score);
        assert_eq!(f.high_scores().best_level, level);
        assert!(f.take_high_scores_changed());
        assert!(!f.take_high_scores_changed());

        f.frame(&action(), DT);
        assert_eq!(f.state(), AppState::Playing);
        assert_eq!(f.runs(), 2);
        assert_eq!(f.session().score(), 0);
        // Record survives the new run
        assert_eq!(f.high_scores().best_score, score);
    }

    #[test]
    fn test_held_action_does_not_restart() {
        let mut f = flow(Tuning::default());
        f.frame(&action(), DT);
        f.state = AppState::GameOver;
        // Still held from the previous frame
        f.frame(&action(), DT);
        assert_eq!(f.state(), AppState::GameOver);
        f.frame(&idle(), DT);
        f.frame(&action(), DT);
        assert_eq!(f.state(), AppState::Playing);
    }
}

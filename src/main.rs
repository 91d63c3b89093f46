//! Dodge Run entry point
//!
//! Headless native driver: runs the game flow with a simple autopilot and
//! logs what happens. Set `RUST_LOG=info` (or `debug`) to see the events.

use std::path::{Path, PathBuf};

use clap::Parser;
use glam::Vec2;

use dodge_run::sim::{GameEvent, GameSession, TickInput};
use dodge_run::{AppState, GameFlow, HighScores, QualityPreset, Settings, Tuning, direction_to};

const FRAME_DT: f32 = 1.0 / 60.0;
/// Obstacles closer than this push the autopilot away
const DANGER_RADIUS: f32 = 140.0;

#[derive(Parser)]
#[command(name = "dodge-run")]
#[command(about = "Headless Dodge Run driven by an autopilot", long_about = None)]
struct Cli {
    /// Balance file (JSON); built-in tuning when omitted
    #[arg(long)]
    tuning: Option<PathBuf>,

    /// Seed for the session RNG
    #[arg(long, default_value_t = 0x5EED)]
    seed: u64,

    /// Wall-clock seconds to simulate
    #[arg(long, default_value_t = 120.0)]
    seconds: f32,

    /// High-score file
    #[arg(long, default_value = "dodge-run-scores.json")]
    scores: PathBuf,

    /// Settings file (JSON); written with defaults if missing
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Quality preset override: low, medium or high
    #[arg(long, value_parser = parse_quality)]
    quality: Option<QualityPreset>,
}

fn parse_quality(s: &str) -> Result<QualityPreset, String> {
    QualityPreset::parse(s).ok_or_else(|| format!("unknown quality preset '{}'", s))
}

fn load_settings(path: Option<&Path>) -> Settings {
    let Some(path) = path else {
        return Settings::default();
    };
    match Settings::load(path) {
        Ok(settings) => settings,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            let settings = Settings::default();
            if let Err(e) = settings.save(path) {
                log::warn!("Could not write settings to {}: {}", path.display(), e);
            }
            settings
        }
        Err(e) => {
            log::warn!("Ignoring settings in {}: {}", path.display(), e);
            Settings::default()
        }
    }
}

/// Flee the nearest close obstacle, otherwise chase the nearest pickup
fn autopilot(session: &GameSession) -> Vec2 {
    let me = session.player().pos;

    let mut flee = Vec2::ZERO;
    for o in session.obstacles() {
        let center = o.center();
        let dist = me.distance(center);
        if dist < DANGER_RADIUS {
            flee += direction_to(center, me) * (1.0 - dist / DANGER_RADIUS);
        }
    }
    if flee != Vec2::ZERO {
        // Lean back toward the middle so we don't get pinned on a wall
        let home = direction_to(me, session.arena() / 2.0) * 0.3;
        return (flee + home).clamp_length_max(1.0);
    }

    let targets = session
        .collectibles()
        .iter()
        .chain(session.portal_collectibles())
        .map(|c| c.pos)
        .chain(session.powerups().iter().map(|p| p.pos))
        .chain(session.portals().iter().map(|p| p.pos));
    targets
        .min_by(|a, b| me.distance_squared(*a).total_cmp(&me.distance_squared(*b)))
        .map(|target| direction_to(me, target))
        .unwrap_or(Vec2::ZERO)
}

fn save_scores(flow: &GameFlow, path: &Path) {
    if let Err(e) = flow.high_scores().save(path) {
        log::warn!("Could not save high scores to {}: {}", path.display(), e);
    }
}

fn main() {
    env_logger::init();
    log::info!("Dodge Run (headless) starting...");

    let args = Cli::parse();

    let tuning = match &args.tuning {
        Some(path) => match Tuning::load(path) {
            Ok(tuning) => tuning,
            Err(e) => {
                eprintln!("Failed to load tuning from {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => Tuning::default(),
    };

    let mut settings = load_settings(args.settings.as_deref());
    if let Some(quality) = args.quality {
        settings.quality = quality;
    }
    log::info!(
        "Quality {} ({} particles max)",
        settings.quality.as_str(),
        settings.max_particles()
    );

    let session = GameSession::new(args.seed, tuning, settings);
    let mut flow = GameFlow::new(session, HighScores::load_or_default(&args.scores));

    let frames = (args.seconds.max(0.0) / FRAME_DT) as u64;
    let mut press_action = true;
    let mut scores_dirty = false;
    for _ in 0..frames {
        let input = TickInput {
            movement: autopilot(flow.session()),
            // Alternate so every press registers as a fresh one
            action: press_action && matches!(flow.state(), AppState::Menu | AppState::GameOver),
            pause: false,
        };
        press_action = !press_action;

        for event in flow.frame(&input, FRAME_DT) {
            match &event {
                GameEvent::EntityRemoved { .. } | GameEvent::ScoreChanged { .. } => {
                    log::trace!("{:?}", event)
                }
                _ => log::debug!("{:?}", event),
            }
        }

        scores_dirty |= flow.take_high_scores_changed();
        if scores_dirty && flow.state() == AppState::GameOver {
            save_scores(&flow, &args.scores);
            scores_dirty = false;
        }
    }
    if scores_dirty {
        save_scores(&flow, &args.scores);
    }

    let session = flow.session();
    println!(
        "runs: {}  score: {}  level: {}  lives: {}  best: {} (level {})",
        flow.runs(),
        session.score(),
        session.level(),
        session.lives(),
        flow.high_scores().best_score,
        flow.high_scores().best_level
    );
}

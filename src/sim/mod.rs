//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Frame delta supplied by the caller, clamped before use
//! - Seeded RNG only
//! - Stable iteration order (insertion order per spawner)
//! - No rendering, audio or platform dependencies

pub mod collectible;
pub mod collision;
pub mod features;
pub mod obstacle;
pub mod particles;
pub mod player;
pub mod portal;
pub mod powerup;
pub mod session;
pub mod state;
pub mod tick;

pub use collectible::{Collectible, CollectibleMotion, CollectibleParams, CollectibleSpawner};
pub use collision::{NearestObstacle, circle_intersects_circle, circle_intersects_rect, nearest_rect_distance};
pub use features::{Feature, features_unlocked_at, is_feature_enabled, level_for_time};
pub use obstacle::{Obstacle, ObstacleParams, ObstacleSpawner};
pub use particles::{Burst, Particle, ParticleSystem};
pub use player::Player;
pub use portal::{Portal, PortalSpawner};
pub use powerup::{PowerUp, PowerUpKind, PowerUpSpawner};
pub use session::GameSession;
pub use state::{EntityIds, EntityKind, GameEvent, PlayMode, ScoreReason, SessionPhase, Timers};
pub use tick::TickInput;

//! Level-gated gameplay features and level derivation
//!
//! Each feature switches on once the current level reaches its unlock level.
//! The table is static; lookups are pure.

use serde::{Deserialize, Serialize};

/// A named gameplay mechanic that unlocks at a level threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feature {
    /// Obstacles move faster as level increases
    ObstacleSpeedRamp,
    /// Max obstacles on screen ramps up
    ObstacleCountRamp,
    /// Obstacle spawn interval shortens
    ObstacleSpawnRamp,
    /// Rings spawn in the play area
    Collectibles,
    /// Some rings orbit instead of sitting still
    CollectibleFloat,
    /// Portals to a collectibles-only bonus room
    BonusPortal,
    /// Near-misses in quick succession pay a bonus
    NearMissCombo,
    /// Occasional large bouncing obstacles
    SuddenHardObstacles,
    /// Shield, slow-mo, magnet, life and clear stars
    PowerUps,
    /// Periodic double-speed waves
    BossWave,
    /// High-value ring riding in front of an obstacle
    CollectibleInFront,
    /// Rare blinking high-value ring
    CollectibleBonus,
}

/// Unlock table, ordered by unlock level
const UNLOCK_TABLE: &[(Feature, u32)] = &[
    (Feature::ObstacleSpeedRamp, 1),
    (Feature::ObstacleCountRamp, 1),
    (Feature::ObstacleSpawnRamp, 1),
    (Feature::Collectibles, 1),
    (Feature::CollectibleFloat, 3),
    (Feature::BonusPortal, 3),
    (Feature::NearMissCombo, 3),
    (Feature::SuddenHardObstacles, 4),
    (Feature::PowerUps, 4),
    (Feature::BossWave, 5),
    (Feature::CollectibleInFront, 7),
    (Feature::CollectibleBonus, 8),
];

impl Feature {
    /// All features in unlock order
    pub fn all() -> impl Iterator<Item = Feature> {
        UNLOCK_TABLE.iter().map(|&(f, _)| f)
    }

    /// Level at which the feature becomes active (1 = from the start)
    pub fn unlock_level(self) -> u32 {
        UNLOCK_TABLE
            .iter()
            .find(|&&(f, _)| f == self)
            .map(|&(_, level)| level)
            .unwrap_or(1)
    }

    /// Whether the feature is active at `level`
    #[inline]
    pub fn enabled_at(self, level: u32) -> bool {
        level >= self.unlock_level()
    }

    /// Human-readable label for unlock announcements
    pub fn label(self) -> &'static str {
        match self {
            Feature::ObstacleSpeedRamp => "Obstacle speed ramp",
            Feature::ObstacleCountRamp => "Obstacle count ramp",
            Feature::ObstacleSpawnRamp => "Obstacle spawn ramp",
            Feature::Collectibles => "Collectibles",
            Feature::CollectibleFloat => "Collectible float",
            Feature::BonusPortal => "Bonus portal",
            Feature::NearMissCombo => "Near-miss combo",
            Feature::SuddenHardObstacles => "Sudden hard obstacles",
            Feature::PowerUps => "Power-ups",
            Feature::BossWave => "Boss wave",
            Feature::CollectibleInFront => "Collectible in front",
            Feature::CollectibleBonus => "500pt bonus collectible",
        }
    }
}

/// Whether `feature` is active at `level`
pub fn is_feature_enabled(feature: Feature, level: u32) -> bool {
    feature.enabled_at(level)
}

/// Features whose unlock level is exactly `level`.
///
/// Used for one-shot unlock announcements; a later level never repeats them.
pub fn features_unlocked_at(level: u32) -> Vec<Feature> {
    UNLOCK_TABLE
        .iter()
        .filter(|&&(_, unlock)| unlock == level)
        .map(|&(f, _)| f)
        .collect()
}

/// Level reached after `survival_time` seconds
pub fn level_for_time(survival_time: f32, level_duration: f32) -> u32 {
    if level_duration <= 0.0 || survival_time <= 0.0 {
        return 1;
    }
    1 + (survival_time / level_duration).floor() as u32
}

/// Ramp parameter for a tuning input: the level when the feature is on, else 1
#[inline]
pub fn gated_level(feature: Feature, level: u32) -> u32 {
    if feature.enabled_at(level) { level } else { 1 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_unlock_lookup() {
        assert!(is_feature_enabled(Feature::Collectibles, 1));
        assert!(!is_feature_enabled(Feature::PowerUps, 3));
        assert!(is_feature_enabled(Feature::PowerUps, 4));
        assert!(is_feature_enabled(Feature::PowerUps, 40));
        assert_eq!(Feature::CollectibleBonus.unlock_level(), 8);
    }

    #[test]
    fn test_unlocked_at_is_exact() {
        let at3 = features_unlocked_at(3);
        assert_eq!(
            at3,
            vec![
                Feature::CollectibleFloat,
                Feature::BonusPortal,
                Feature::NearMissCombo
            ]
        );
        assert!(features_unlocked_at(2).is_empty());
        assert!(features_unlocked_at(9).is_empty());
        // Level 4 must not repeat level-3 unlocks
        assert!(!features_unlocked_at(4).contains(&Feature::BonusPortal));
    }

    #[test]
    fn test_every_feature_announced_once() {
        let announced: Vec<Feature> = (1..=20).flat_map(features_unlocked_at).collect();
        assert_eq!(announced.len(), Feature::all().count());
    }

    #[test]
    fn test_level_for_time() {
        assert_eq!(level_for_time(0.0, 30.0), 1);
        assert_eq!(level_for_time(29.99, 30.0), 1);
        assert_eq!(level_for_time(30.0, 30.0), 2);
        assert_eq!(level_for_time(95.0, 30.0), 4);
    }

    #[test]
    fn test_gated_level() {
        assert_eq!(gated_level(Feature::ObstacleSpeedRamp, 6), 6);
        assert_eq!(gated_level(Feature::BossWave, 4), 1);
    }

    proptest! {
        #[test]
        fn prop_level_monotonic(steps in proptest::collection::vec(0.0f32..5.0, 1..200)) {
            let mut t = 0.0f32;
            let mut last = level_for_time(t, 30.0);
            for dt in steps {
                t += dt;
                let level = level_for_time(t, 30.0);
                prop_assert!(level >= last);
                last = level;
            }
        }
    }
}

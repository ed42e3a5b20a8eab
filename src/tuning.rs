//! Data-driven game balance
//!
//! Difficulty tiers, power-level thresholds and score awards. Everything here
//! is a fixed table; nothing is computed at runtime beyond lookups.

use serde::{Deserialize, Serialize};

use crate::palette::{self, Rgba};

/// Enemy behaviour class (tag only, see `sim::EnemyKind` for the payloads)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyVariant {
    /// Falls straight down
    Normal,
    /// Sinusoidal horizontal drift
    Zigzag,
    /// Big, slow, armored
    Tank,
    /// Steers toward the player
    Interceptor,
}

impl EnemyVariant {
    pub const ALL: [EnemyVariant; 4] = [
        EnemyVariant::Normal,
        EnemyVariant::Zigzag,
        EnemyVariant::Tank,
        EnemyVariant::Interceptor,
    ];

    /// Score awarded for destroying an enemy of this variant
    pub fn kill_award(&self) -> u64 {
        match self {
            EnemyVariant::Tank => 800,
            _ => 100,
        }
    }

    /// High-value kills get the big explosion
    pub fn is_high_value(&self) -> bool {
        matches!(self, EnemyVariant::Tank)
    }
}

/// Difficulty tier selected in the menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
    Extreme,
}

/// Tuning record for one difficulty tier
#[derive(Debug, Clone, PartialEq)]
pub struct DifficultyProfile {
    /// Base enemy fall speed (px/s)
    pub enemy_speed: f32,
    /// Minimum time between spawns (ms)
    pub spawn_interval_ms: f64,
    /// Player starting hit points
    pub player_hp: u8,
    /// Interceptor horizontal steer speed (px/s)
    pub intercept_steer: f32,
    pub label: &'static str,
    /// HUD accent (hit-point icons)
    pub color: Rgba,
    /// Variants eligible to spawn
    pub variants: &'static [EnemyVariant],
}

const BEGINNER: DifficultyProfile = DifficultyProfile {
    enemy_speed: 240.0,
    spawn_interval_ms: 1500.0,
    player_hp: 5,
    intercept_steer: 108.0,
    label: "BEGINNER",
    color: palette::rgb8(34, 197, 94),
    variants: &[EnemyVariant::Normal],
};

const INTERMEDIATE: DifficultyProfile = DifficultyProfile {
    enemy_speed: 330.0,
    spawn_interval_ms: 850.0,
    player_hp: 3,
    intercept_steer: 108.0,
    label: "INTERMEDIATE",
    color: palette::rgb8(59, 130, 246),
    variants: &[EnemyVariant::Normal, EnemyVariant::Zigzag],
};

const ADVANCED: DifficultyProfile = DifficultyProfile {
    enemy_speed: 450.0,
    spawn_interval_ms: 240.0,
    player_hp: 2,
    intercept_steer: 108.0,
    label: "ADVANCED",
    color: palette::rgb8(249, 115, 22),
    variants: &[EnemyVariant::Normal, EnemyVariant::Zigzag, EnemyVariant::Tank],
};

// 65 ms between spawns: the swarm tier
const EXTREME: DifficultyProfile = DifficultyProfile {
    enemy_speed: 600.0,
    spawn_interval_ms: 65.0,
    player_hp: 1,
    intercept_steer: 150.0,
    label: "EXTREME",
    color: palette::rgb8(239, 68, 68),
    variants: &EnemyVariant::ALL,
};

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
        Difficulty::Extreme,
    ];

    pub fn profile(&self) -> &'static DifficultyProfile {
        match self {
            Difficulty::Beginner => &BEGINNER,
            Difficulty::Intermediate => &INTERMEDIATE,
            Difficulty::Advanced => &ADVANCED,
            Difficulty::Extreme => &EXTREME,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "BEGINNER",
            Difficulty::Intermediate => "INTERMEDIATE",
            Difficulty::Advanced => "ADVANCED",
            Difficulty::Extreme => "EXTREME",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "BEGINNER" => Some(Difficulty::Beginner),
            "INTERMEDIATE" => Some(Difficulty::Intermediate),
            "ADVANCED" => Some(Difficulty::Advanced),
            "EXTREME" => Some(Difficulty::Extreme),
            _ => None,
        }
    }
}

/// Highest power level
pub const MAX_POWER_LEVEL: u8 = 6;

/// Score needed to reach power level `index + 1`
pub const POWER_THRESHOLDS: [u64; MAX_POWER_LEVEL as usize] = [0, 1_200, 4_000, 10_000, 20_000, 40_000];

/// Power level earned by a score (1..=MAX_POWER_LEVEL)
pub fn power_level_for_score(score: u64) -> u8 {
    POWER_THRESHOLDS
        .iter()
        .rposition(|&threshold| score >= threshold)
        .map(|i| i as u8 + 1)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles_are_distinct() {
        for (i, a) in Difficulty::ALL.iter().enumerate() {
            for b in &Difficulty::ALL[i + 1..] {
                let (pa, pb) = (a.profile(), b.profile());
                assert!(
                    pa.enemy_speed != pb.enemy_speed
                        || pa.spawn_interval_ms != pb.spawn_interval_ms
                        || pa.player_hp != pb.player_hp,
                    "{a:?} and {b:?} tune identically"
                );
            }
        }
    }

    #[test]
    fn test_variant_pools() {
        assert_eq!(Difficulty::Beginner.profile().variants, &[EnemyVariant::Normal]);
        assert_eq!(Difficulty::Extreme.profile().variants.len(), 4);
        for variant in EnemyVariant::ALL {
            assert!(Difficulty::Extreme.profile().variants.contains(&variant));
        }
    }

    #[test]
    fn test_profile_lookup_is_stable() {
        assert_eq!(Difficulty::Advanced.profile(), Difficulty::Advanced.profile());
        assert_eq!(Difficulty::Advanced.profile().player_hp, 2);
        assert_eq!(Difficulty::Extreme.profile().spawn_interval_ms, 65.0);
    }

    #[test]
    fn test_difficulty_names_roundtrip() {
        for d in Difficulty::ALL {
            assert_eq!(Difficulty::from_str(d.as_str()), Some(d));
        }
        assert_eq!(Difficulty::from_str("extreme"), Some(Difficulty::Extreme));
        assert_eq!(Difficulty::from_str("nightmare"), None);
    }

    #[test]
    fn test_power_levels() {
        assert_eq!(power_level_for_score(0), 1);
        assert_eq!(power_level_for_score(1_199), 1);
        assert_eq!(power_level_for_score(1_200), 2);
        assert_eq!(power_level_for_score(3_999), 2);
        assert_eq!(power_level_for_score(4_000), 3);
        assert_eq!(power_level_for_score(10_000), 4);
        assert_eq!(power_level_for_score(20_000), 5);
        assert_eq!(power_level_for_score(40_000), 6);
        assert_eq!(power_level_for_score(u64::MAX), MAX_POWER_LEVEL);
    }

    #[test]
    fn test_awards() {
        assert_eq!(EnemyVariant::Tank.kill_award(), 800);
        assert_eq!(EnemyVariant::Zigzag.kill_award(), 100);
        assert!(EnemyVariant::Tank.is_high_value());
        assert!(!EnemyVariant::Interceptor.is_high_value());
    }
}

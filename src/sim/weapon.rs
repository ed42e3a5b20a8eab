//! Auto-fire weapon with a power-level dependent fan of shots

use glam::Vec2;

use super::state::{GameState, Projectile, SoundCue};
use crate::consts::*;
use crate::tuning::MAX_POWER_LEVEL;

/// One barrel of the fan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FanShot {
    /// Horizontal drift (px/s), negative = left
    pub drift: f32,
    /// Horizontal offset from the craft's center line (px)
    pub offset: f32,
}

const fn shot(drift: f32, offset: f32) -> FanShot {
    FanShot { drift, offset }
}

const LEVEL_1: [FanShot; 1] = [shot(0.0, 0.0)];
const LEVEL_2: [FanShot; 2] = [shot(0.0, -15.0), shot(0.0, 15.0)];
const LEVEL_3: [FanShot; 3] = [shot(0.0, 0.0), shot(-150.0, -12.0), shot(150.0, 12.0)];
const LEVEL_4: [FanShot; 5] = [
    shot(-72.0, -8.0),
    shot(72.0, 8.0),
    shot(-240.0, -22.0),
    shot(240.0, 22.0),
    shot(0.0, 0.0),
];
const LEVEL_5: [FanShot; 7] = [
    shot(0.0, 0.0),
    shot(-132.0, -10.0),
    shot(132.0, 10.0),
    shot(-270.0, -20.0),
    shot(270.0, 20.0),
    shot(-480.0, -38.0),
    shot(480.0, 38.0),
];
// Nine-way spread at max power
const LEVEL_6: [FanShot; 9] = [
    shot(0.0, 0.0),
    shot(-108.0, -6.0),
    shot(108.0, 6.0),
    shot(-228.0, -18.0),
    shot(228.0, 18.0),
    shot(-390.0, -30.0),
    shot(390.0, 30.0),
    shot(-600.0, -48.0),
    shot(600.0, 48.0),
];

/// Fan for a power level; levels above the max use the widest fan
pub fn fan_pattern(level: u8) -> &'static [FanShot] {
    match level.min(MAX_POWER_LEVEL) {
        0 | 1 => &LEVEL_1,
        2 => &LEVEL_2,
        3 => &LEVEL_3,
        4 => &LEVEL_4,
        5 => &LEVEL_5,
        _ => &LEVEL_6,
    }
}

/// Fire a volley if the cooldown has elapsed. Returns true when shots were fired.
pub fn fire(state: &mut GameState, now_ms: f64) -> bool {
    if now_ms - state.last_shot_ms <= SHOT_COOLDOWN_MS {
        return false;
    }

    let origin = Vec2::new(
        state.player.pos.x + state.player.size.x / 2.0 - PROJECTILE_WIDTH / 2.0,
        state.player.pos.y,
    );
    for barrel in fan_pattern(state.power_level) {
        let id = state.next_entity_id();
        state.projectiles.push(Projectile {
            id,
            pos: origin + Vec2::new(barrel.offset, 0.0),
            size: Vec2::new(PROJECTILE_WIDTH, PROJECTILE_HEIGHT),
            drift: barrel.drift,
        });
    }

    state.last_shot_ms = now_ms;
    state.cue(SoundCue::Shoot);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::GameEvent;
    use crate::tuning::Difficulty;
    use proptest::prelude::*;

    #[test]
    fn test_fan_sizes_grow_with_level() {
        let sizes: Vec<usize> = (1..=MAX_POWER_LEVEL).map(|l| fan_pattern(l).len()).collect();
        assert_eq!(sizes, vec![1, 2, 3, 5, 7, 9]);
        assert_eq!(fan_pattern(0), fan_pattern(1));
        assert_eq!(fan_pattern(200), fan_pattern(MAX_POWER_LEVEL));
    }

    #[test]
    fn test_fans_are_symmetric() {
        for level in 1..=MAX_POWER_LEVEL {
            let fan = fan_pattern(level);
            for s in fan {
                assert!(
                    fan.iter().any(|m| m.drift == -s.drift && m.offset == -s.offset),
                    "level {level} has no mirror for {s:?}"
                );
            }
        }
    }

    #[test]
    fn test_fire_respects_cooldown() {
        let mut state = GameState::new(Difficulty::Beginner, 1);
        assert!(fire(&mut state, 1_000.0));
        assert_eq!(state.projectiles.len(), 1);
        assert!(!fire(&mut state, 1_105.0));
        assert!(fire(&mut state, 1_106.0));
        assert_eq!(state.projectiles.len(), 2);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::Sound(SoundCue::Shoot), GameEvent::Sound(SoundCue::Shoot)]
        );
    }

    #[test]
    fn test_center_shot_is_aligned() {
        let mut state = GameState::new(Difficulty::Beginner, 1);
        fire(&mut state, 1_000.0);
        let p = &state.projectiles[0];
        let craft_center = state.player.center().x;
        assert!((p.bounds().center().x - craft_center).abs() < 1e-4);
        assert_eq!(p.pos.y, state.player.pos.y);
        assert_eq!(p.drift, 0.0);
    }

    proptest! {
        #[test]
        fn prop_volley_is_pure_function_of_level(level in 1u8..=MAX_POWER_LEVEL, volleys in 1usize..6) {
            let mut state = GameState::new(Difficulty::Beginner, 1);
            state.power_level = level;
            let mut now = 0.0;
            let mut previous: Option<Vec<(f32, f32)>> = None;
            for _ in 0..volleys {
                now += 200.0;
                state.projectiles.clear();
                prop_assert!(fire(&mut state, now));
                let layout: Vec<(f32, f32)> = state
                    .projectiles
                    .iter()
                    .map(|p| (p.pos.x - state.player.pos.x, p.drift))
                    .collect();
                prop_assert_eq!(layout.len(), fan_pattern(level).len());
                if let Some(prev) = &previous {
                    prop_assert_eq!(prev, &layout);
                }
                previous = Some(layout);
            }
        }
    }
}

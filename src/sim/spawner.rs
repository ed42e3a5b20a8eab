//! Time-gated enemy spawning from the active difficulty's variant pool

use glam::Vec2;
use rand::Rng;

use super::state::{Enemy, EnemyKind, GameState, variant_color};
use crate::consts::*;
use crate::tuning::EnemyVariant;

/// Spawn at most one enemy if the spawn interval has elapsed since the last
/// spawn. Returns true when an enemy was created.
pub fn maybe_spawn(state: &mut GameState, now_ms: f64) -> bool {
    let profile = state.profile();
    if now_ms - state.last_spawn_ms <= profile.spawn_interval_ms {
        return false;
    }

    let pick = state.rng.random_range(0..profile.variants.len());
    let variant = profile.variants[pick];
    let enemy = build_enemy(state, variant);
    log::debug!("Spawned {:?} #{} at x={:.0}", variant, enemy.id, enemy.pos.x);
    state.enemies.push(enemy);
    state.last_spawn_ms = now_ms;
    true
}

/// Roll a fresh enemy of `variant` just above the top edge
pub fn build_enemy(state: &mut GameState, variant: EnemyVariant) -> Enemy {
    let profile = state.profile();
    let mut size = Vec2::splat(ENEMY_SIZE);
    let mut hp = 1;
    let mut speed = profile.enemy_speed + state.rng.random_range(0.0..120.0);

    let kind = match variant {
        EnemyVariant::Normal => EnemyKind::Normal,
        // Rolled per instance so no two zigzaggers weave in step
        EnemyVariant::Zigzag => EnemyKind::Zigzag {
            phase: state.rng.random_range(0.0..std::f32::consts::TAU),
            frequency: state.rng.random_range(0.02..0.08),
            amplitude: state.rng.random_range(240.0..960.0),
        },
        EnemyVariant::Tank => {
            size = Vec2::new(ENEMY_SIZE * 2.0, ENEMY_SIZE * 1.6);
            hp = 5;
            speed *= 0.5;
            EnemyKind::Tank
        }
        EnemyVariant::Interceptor => {
            speed *= 1.4;
            EnemyKind::Interceptor
        }
    };

    let x = state.rng.random_range(0.0..PLAYFIELD_WIDTH - size.x);

    Enemy {
        id: state.next_entity_id(),
        kind,
        pos: Vec2::new(x, -size.y),
        size,
        speed,
        hp,
        max_hp: hp,
        color: variant_color(variant),
    }
}

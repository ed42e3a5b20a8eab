//! Collision detection and response
//!
//! Two axis-aligned passes per tick:
//! - projectiles against enemies (damage, kills, score)
//! - enemies against the player (forgiving inset hitbox)
//!
//! Both passes mark while iterating and filter once afterwards, so no
//! collection is modified while it is being read.

use glam::Vec2;

use super::effects;
use super::state::{GameEvent, GamePhase, GameState, SoundCue};
use crate::consts::PLAYER_HITBOX_INSET;
use crate::palette::{self, Rgba};
use crate::tuning::EnemyVariant;

/// What a single projectile/enemy contact produced
#[derive(Debug, Clone, Copy, PartialEq)]
enum Impact {
    Kill { center: Vec2, color: Rgba, variant: EnemyVariant },
    Graze { at: Vec2 },
}

/// Projectile x enemy pass
///
/// Every live projectile is tested against every live enemy. A projectile is
/// spent by its first hit but keeps testing the rest of the enemies in this
/// pass, so one shot can damage several overlapping enemies in a single tick.
pub fn resolve_projectile_hits(state: &mut GameState) {
    let mut spent = vec![false; state.projectiles.len()];
    let mut impacts = Vec::new();

    for (i, projectile) in state.projectiles.iter().enumerate() {
        let shot = projectile.bounds();
        for enemy in state.enemies.iter_mut() {
            if !enemy.is_alive() || !shot.overlaps(&enemy.bounds()) {
                continue;
            }

            enemy.hp -= 1;
            spent[i] = true;

            impacts.push(if enemy.hp == 0 {
                Impact::Kill {
                    center: enemy.bounds().center(),
                    color: enemy.color,
                    variant: enemy.kind.variant(),
                }
            } else {
                Impact::Graze { at: projectile.pos }
            });
        }
    }

    if impacts.is_empty() {
        return;
    }

    let mut index = 0;
    state.projectiles.retain(|_| {
        let keep = !spent[index];
        index += 1;
        keep
    });

    for impact in impacts {
        match impact {
            Impact::Kill { center, color, variant } => {
                state.player.score += variant.kill_award();
                effects::explosion(state, center, color, variant.is_high_value());
            }
            Impact::Graze { at } => effects::sparks(state, at),
        }
    }
}

/// Player x enemy pass
///
/// Any contact destroys the enemy outright and costs the player one hit
/// point. Reaching zero hit points ends the session on this tick.
pub fn resolve_player_hits(state: &mut GameState) {
    let hitbox = state.player.bounds().inset(PLAYER_HITBOX_INSET);
    let mut contacts = 0u32;

    for enemy in state.enemies.iter_mut() {
        if enemy.is_alive() && hitbox.overlaps(&enemy.bounds().inset(PLAYER_HITBOX_INSET)) {
            enemy.hp = 0;
            contacts += 1;
        }
    }

    for _ in 0..contacts {
        state.player.hp = state.player.hp.saturating_sub(1);
        state.cue(SoundCue::Hit);
        let center = state.player.center();
        effects::explosion(state, center, palette::PLAYER, true);

        if state.player.hp == 0 && state.phase == GamePhase::Playing {
            state.phase = GamePhase::GameOver;
            let score = state.player.score;
            state.emit(GameEvent::GameOver { score });
            log::info!("Player destroyed, final score {}", score);
        }
    }
}

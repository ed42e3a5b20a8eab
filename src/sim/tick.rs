//! Fixed timestep simulation tick
//!
//! Advances every entity by one frame. Order within a tick:
//! player follow -> power level -> weapon -> projectiles -> enemies ->
//! particles -> projectile hits -> score sync -> player hits -> cleanup.

use glam::Vec2;

use super::collision::{resolve_player_hits, resolve_projectile_hits};
use super::state::{EnemyKind, GameEvent, GamePhase, GameState, SoundCue};
use super::weapon;
use crate::consts::*;
use crate::tuning::power_level_for_score;

/// Input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Latest pointer position in playfield coordinates, if any arrived yet
    pub pointer: Option<Vec2>,
    /// Frame timestamp (ms) used for the spawn, shot and sync gates
    pub now_ms: f64,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if state.phase == GamePhase::GameOver {
        return;
    }

    state.time_ticks += 1;
    let now = input.now_ms;

    // Player eases toward the pointer, then stays fully on screen
    if let Some(pointer) = input.pointer {
        state.player.follow(pointer);
    }
    state.player.clamp_to_playfield();

    update_power_level(state);
    if state.level_up_ticks > 0 {
        state.level_up_ticks -= 1;
    }

    weapon::fire(state, now);

    for projectile in state.projectiles.iter_mut() {
        projectile.pos.y -= PROJECTILE_SPEED * dt;
        projectile.pos.x += projectile.drift * dt;
    }
    state.projectiles.retain(|p| p.in_flight());

    move_enemies(state, dt);

    for particle in state.particles.iter_mut() {
        particle.pos += particle.vel * dt;
        particle.life -= PARTICLE_DECAY * dt;
    }
    state.particles.retain(|p| p.life > 0.0);

    resolve_projectile_hits(state);
    sync_score(state, now);
    resolve_player_hits(state);

    // Dead or fallen-off enemies never reach the next collision pass
    state
        .enemies
        .retain(|e| e.is_alive() && e.pos.y <= PLAYFIELD_HEIGHT);
}

/// Raise the power level when the score crosses a threshold
pub fn update_power_level(state: &mut GameState) {
    let earned = power_level_for_score(state.player.score);
    if earned > state.power_level {
        state.power_level = earned;
        state.level_up_ticks = LEVEL_UP_BANNER_TICKS;
        state.emit(GameEvent::LevelUp(earned));
        state.cue(SoundCue::LevelUp);
        log::info!("Power level {}", earned);
    }
}

/// Report the score to the host page, at most once per sync interval and
/// only when it changed since the last report
pub fn sync_score(state: &mut GameState, now_ms: f64) {
    let score = state.player.score;
    if score != state.last_synced_score && now_ms - state.last_sync_ms > SCORE_SYNC_INTERVAL_MS {
        state.emit(GameEvent::ScoreChanged(score));
        state.last_synced_score = score;
        state.last_sync_ms = now_ms;
    }
}

fn move_enemies(state: &mut GameState, dt: f32) {
    let player_center_x = state.player.center().x;
    let steer = state.profile().intercept_steer;

    for enemy in state.enemies.iter_mut() {
        enemy.pos.y += enemy.speed * dt;

        match enemy.kind {
            EnemyKind::Normal | EnemyKind::Tank => {}
            EnemyKind::Zigzag { phase, frequency, amplitude } => {
                enemy.pos.x += (enemy.pos.y * frequency + phase).sin() * amplitude * dt;
            }
            EnemyKind::Interceptor => {
                let dx = player_center_x - (enemy.pos.x + enemy.size.x / 2.0);
                enemy.pos.x += crate::sign(dx) * steer * dt;
            }
        }

        enemy.pos.x = enemy.pos.x.clamp(0.0, PLAYFIELD_WIDTH - enemy.size.x);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::spawner::build_enemy;
    use crate::sim::state::Projectile;
    use crate::tuning::{Difficulty, EnemyVariant};
    use proptest::prelude::*;

    fn at(now_ms: f64) -> TickInput {
        TickInput { pointer: None, now_ms }
    }

    #[test]
    fn test_tick_fires_and_moves_projectiles() {
        let mut state = GameState::new(Difficulty::Beginner, 1);
        tick(&mut state, &at(1_000.0), SIM_DT);
        assert_eq!(state.projectiles.len(), 1);
        let y0 = state.projectiles[0].pos.y;
        // Fired this tick and moved up this tick
        assert!((state.player.pos.y - y0 - PROJECTILE_SPEED * SIM_DT).abs() < 1e-3);
        assert_eq!(state.time_ticks, 1);
    }

    #[test]
    fn test_projectile_past_top_margin_is_removed() {
        let mut state = GameState::new(Difficulty::Beginner, 1);
        state.last_shot_ms = 1_000.0;
        let id = state.next_entity_id();
        state.projectiles.push(Projectile {
            id,
            pos: Vec2::new(100.0, -40.0),
            size: Vec2::new(PROJECTILE_WIDTH, PROJECTILE_HEIGHT),
            drift: 0.0,
        });
        tick(&mut state, &at(1_010.0), SIM_DT);
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_drifting_projectile_leaves_by_the_side() {
        let mut state = GameState::new(Difficulty::Beginner, 1);
        state.last_shot_ms = 1_000.0;
        let id = state.next_entity_id();
        state.projectiles.push(Projectile {
            id,
            pos: Vec2::new(PLAYFIELD_WIDTH + 145.0, 300.0),
            size: Vec2::new(PROJECTILE_WIDTH, PROJECTILE_HEIGHT),
            drift: 600.0,
        });
        tick(&mut state, &at(1_010.0), SIM_DT);
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_level_up_banner_and_cue() {
        let mut state = GameState::new(Difficulty::Beginner, 1);
        state.player.score = 4_500;
        tick(&mut state, &at(1_000.0), SIM_DT);
        assert_eq!(state.power_level, 3);
        assert_eq!(state.level_up_ticks, LEVEL_UP_BANNER_TICKS - 1);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::LevelUp(3)));
        assert!(events.contains(&GameEvent::Sound(SoundCue::LevelUp)));
        // The volley fired this tick already uses the new fan
        assert_eq!(state.projectiles.len(), 3);

        tick(&mut state, &at(1_016.0), SIM_DT);
        assert!(!state.drain_events().contains(&GameEvent::LevelUp(3)));
    }

    #[test]
    fn test_score_sync_is_rate_limited_and_idempotent() {
        let mut state = GameState::new(Difficulty::Beginner, 1);
        sync_score(&mut state, 1_000.0);
        assert!(state.events.is_empty(), "unchanged score is never reported");

        state.player.score = 100;
        sync_score(&mut state, 1_000.0);
        sync_score(&mut state, 1_500.0);
        assert_eq!(state.drain_events(), vec![GameEvent::ScoreChanged(100)]);

        state.player.score = 200;
        sync_score(&mut state, 1_050.0);
        assert!(state.events.is_empty(), "within the interval");
        sync_score(&mut state, 1_101.0);
        assert_eq!(state.drain_events(), vec![GameEvent::ScoreChanged(200)]);
    }

    #[test]
    fn test_dead_enemies_are_filtered_before_next_tick() {
        let mut state = GameState::new(Difficulty::Beginner, 1);
        let mut e = build_enemy(&mut state, EnemyVariant::Normal);
        e.pos = Vec2::new(10.0, 10.0);
        e.hp = 0;
        state.enemies.push(e);
        let mut fallen = build_enemy(&mut state, EnemyVariant::Normal);
        fallen.pos = Vec2::new(10.0, PLAYFIELD_HEIGHT);
        state.enemies.push(fallen);

        tick(&mut state, &at(1_000.0), SIM_DT);
        assert!(state.enemies.is_empty());
    }

    #[test]
    fn test_tank_shot_down_over_successive_ticks() {
        let mut state = GameState::new(Difficulty::Advanced, 11);
        let mut tank = build_enemy(&mut state, EnemyVariant::Tank);
        tank.pos = Vec2::new(365.0, 100.0);
        state.enemies.push(tank);
        let input = |i: u32| TickInput {
            pointer: Some(Vec2::new(400.0, 520.0)),
            now_ms: 1_000.0 + i as f64 * 1_000.0 / 60.0,
        };

        let mut hp = 5;
        let mut large = 0;
        let mut ticks = 0;
        while !state.enemies.is_empty() && ticks < 200 {
            tick(&mut state, &input(ticks), SIM_DT);
            ticks += 1;
            let events = state.drain_events();
            large += events
                .iter()
                .filter(|e| **e == GameEvent::Sound(SoundCue::ExplosionLarge))
                .count();
            if let Some(tank) = state.enemies.first() {
                // At most one hit lands per tick
                assert!(hp - tank.hp <= 1);
                hp = tank.hp;
                assert_eq!(state.player.score, 0);
            }
        }

        assert!(state.enemies.is_empty(), "tank survived {ticks} ticks");
        assert_eq!(state.player.score, 800);
        assert_eq!(large, 1);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_interceptor_steers_toward_player() {
        let mut state = GameState::new(Difficulty::Extreme, 1);
        state.last_shot_ms = 1_000.0;
        let mut e = build_enemy(&mut state, EnemyVariant::Interceptor);
        e.pos = Vec2::new(100.0, 0.0);
        state.enemies.push(e);

        tick(&mut state, &at(1_010.0), SIM_DT);
        let steer = Difficulty::Extreme.profile().intercept_steer;
        assert!((state.enemies[0].pos.x - (100.0 + steer * SIM_DT)).abs() < 1e-3);
    }

    #[test]
    fn test_interceptor_holds_when_aligned() {
        let mut state = GameState::new(Difficulty::Extreme, 1);
        state.last_shot_ms = 1_000.0;
        let mut e = build_enemy(&mut state, EnemyVariant::Interceptor);
        e.pos = Vec2::new(state.player.center().x - e.size.x / 2.0, 0.0);
        let x0 = e.pos.x;
        state.enemies.push(e);

        tick(&mut state, &at(1_010.0), SIM_DT);
        assert_eq!(state.enemies[0].pos.x, x0);
    }

    #[test]
    fn test_zigzag_moves_sideways_and_stays_in_bounds() {
        let mut state = GameState::new(Difficulty::Intermediate, 1);
        state.last_shot_ms = f64::MAX / 2.0;
        let mut e = build_enemy(&mut state, EnemyVariant::Zigzag);
        e.kind = EnemyKind::Zigzag { phase: std::f32::consts::FRAC_PI_2, frequency: 0.0, amplitude: 600.0 };
        e.pos = Vec2::new(200.0, 0.0);
        state.enemies.push(e);

        tick(&mut state, &at(1_000.0), SIM_DT);
        assert!((state.enemies[0].pos.x - 210.0).abs() < 1e-3);

        for i in 0..200 {
            tick(&mut state, &at(1_016.0 + i as f64 * 16.0), SIM_DT);
            for e in &state.enemies {
                assert!(e.pos.x >= 0.0 && e.pos.x <= PLAYFIELD_WIDTH - e.size.x);
            }
        }
    }

    #[test]
    fn test_particles_decay_and_expire() {
        let mut state = GameState::new(Difficulty::Beginner, 1);
        crate::sim::effects::sparks(&mut state, Vec2::new(100.0, 100.0));
        tick(&mut state, &at(1_000.0), SIM_DT);
        assert!(state.particles.iter().all(|p| (p.life - (0.4 - 0.035)).abs() < 1e-4));

        for i in 1..=12 {
            tick(&mut state, &at(1_000.0 + i as f64 * 16.0), SIM_DT);
        }
        assert!(state.particles.is_empty());
    }

    #[test]
    fn test_game_over_freezes_state() {
        let mut state = GameState::new(Difficulty::Beginner, 1);
        state.phase = GamePhase::GameOver;
        tick(&mut state, &at(1_000.0), SIM_DT);
        assert_eq!(state.time_ticks, 0);
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_determinism() {
        let run = || {
            let mut state = GameState::new(Difficulty::Extreme, 99_999);
            for i in 0..120 {
                let now = 1_000.0 + i as f64 * 16.0;
                let input = TickInput {
                    pointer: Some(Vec2::new(300.0 + i as f32, 450.0)),
                    now_ms: now,
                };
                crate::sim::spawner::maybe_spawn(&mut state, now);
                tick(&mut state, &input, SIM_DT);
            }
            state
        };
        let (a, b) = (run(), run());
        assert_eq!(a.enemies.len(), b.enemies.len());
        assert_eq!(a.player.score, b.player.score);
        assert_eq!(a.player.hp, b.player.hp);
        assert_eq!(a.phase, b.phase);
        assert!((a.player.pos - b.player.pos).length() < 1e-4);
    }

    proptest! {
        #[test]
        fn prop_player_always_inside_playfield(
            pointers in prop::collection::vec((-2_000.0f32..2_000.0, -2_000.0f32..2_000.0), 1..40)
        ) {
            let mut state = GameState::new(Difficulty::Beginner, 5);
            for (i, (x, y)) in pointers.into_iter().enumerate() {
                let input = TickInput { pointer: Some(Vec2::new(x, y)), now_ms: i as f64 * 16.0 };
                tick(&mut state, &input, SIM_DT);
                let p = &state.player;
                prop_assert!(p.pos.x >= 0.0 && p.pos.x <= PLAYFIELD_WIDTH - p.size.x);
                prop_assert!(p.pos.y >= 0.0 && p.pos.y <= PLAYFIELD_HEIGHT - p.size.y);
            }
        }

        #[test]
        fn prop_power_level_never_decreases(scores in prop::collection::vec(0u64..60_000, 1..30)) {
            let mut state = GameState::new(Difficulty::Beginner, 5);
            let mut highest = 1;
            for score in scores {
                state.player.score = score;
                update_power_level(&mut state);
                highest = highest.max(power_level_for_score(score));
                prop_assert_eq!(state.power_level, highest);
            }
        }
    }
}

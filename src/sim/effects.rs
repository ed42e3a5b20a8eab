//! Particle emitters for explosions and impact sparks

use glam::Vec2;
use rand::Rng;

use super::state::{GameState, Particle, SoundCue};
use crate::palette::{self, Rgba};

/// Hard cap on live particles
pub const MAX_PARTICLES: usize = 1024;

const SMALL_BURST: usize = 15;
const LARGE_BURST: usize = 40;
const SPARK_COUNT: usize = 4;
const SPARK_LIFE: f32 = 0.4;

/// Burst of debris at `center` in the destroyed entity's color
pub fn explosion(state: &mut GameState, center: Vec2, color: Rgba, large: bool) {
    state.cue(if large {
        SoundCue::ExplosionLarge
    } else {
        SoundCue::ExplosionSmall
    });

    let (count, size_spread, speed) = if large {
        (LARGE_BURST, 12.0, 360.0)
    } else {
        (SMALL_BURST, 5.0, 210.0)
    };

    for _ in 0..count {
        let size = 3.0 + state.rng.random_range(0.0..size_spread);
        let vel = Vec2::new(
            state.rng.random_range(-speed..speed),
            state.rng.random_range(-speed..speed),
        );
        push(state, Particle {
            pos: center,
            vel,
            size: Vec2::splat(size),
            color,
            life: 1.0,
            max_life: 1.0,
        });
    }
}

/// Small white sparks where a projectile hit without killing
pub fn sparks(state: &mut GameState, at: Vec2) {
    for _ in 0..SPARK_COUNT {
        let vel = Vec2::new(
            state.rng.random_range(-180.0..180.0),
            state.rng.random_range(-180.0..180.0),
        );
        push(state, Particle {
            pos: at,
            vel,
            size: Vec2::splat(2.0),
            color: palette::SPARK,
            life: SPARK_LIFE,
            max_life: SPARK_LIFE,
        });
    }
}

fn push(state: &mut GameState, particle: Particle) {
    if state.particles.len() < MAX_PARTICLES {
        state.particles.push(particle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::GameEvent;
    use crate::tuning::Difficulty;

    #[test]
    fn test_explosion_sizes() {
        let mut state = GameState::new(Difficulty::Beginner, 3);
        explosion(&mut state, Vec2::new(10.0, 10.0), palette::ENEMY, false);
        assert_eq!(state.particles.len(), 15);
        explosion(&mut state, Vec2::new(10.0, 10.0), palette::ENEMY, true);
        assert_eq!(state.particles.len(), 55);
        assert_eq!(
            state.drain_events(),
            vec![
                GameEvent::Sound(SoundCue::ExplosionSmall),
                GameEvent::Sound(SoundCue::ExplosionLarge)
            ]
        );
    }

    #[test]
    fn test_sparks_are_short_lived_and_silent() {
        let mut state = GameState::new(Difficulty::Beginner, 3);
        sparks(&mut state, Vec2::new(50.0, 60.0));
        assert_eq!(state.particles.len(), 4);
        assert!(state.particles.iter().all(|p| p.life == SPARK_LIFE && p.pos == Vec2::new(50.0, 60.0)));
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_particle_cap() {
        let mut state = GameState::new(Difficulty::Beginner, 3);
        for _ in 0..40 {
            explosion(&mut state, Vec2::ZERO, palette::PLAYER, true);
        }
        assert_eq!(state.particles.len(), MAX_PARTICLES);
    }
}

//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One fixed timestep per frame
//! - Seeded RNG only
//! - Time comes in through `TickInput`, never from a clock
//! - No rendering or platform dependencies

pub mod collision;
pub mod effects;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod weapon;

pub use collision::{resolve_player_hits, resolve_projectile_hits};
pub use spawner::maybe_spawn;
pub use state::{
    Aabb, Enemy, EnemyKind, GameEvent, GamePhase, GameState, Particle, Player, Projectile,
    SoundCue, variant_color,
};
pub use tick::{TickInput, tick};
pub use weapon::{FanShot, fan_pattern, fire};

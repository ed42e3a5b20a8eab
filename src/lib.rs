//! Sky Ace - a vertical arcade shoot-em-up
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, weapons, movement, collisions)
//! - `driver`: Frame-driven session state machine
//! - `renderer`: Scene building and the WebGPU pipeline
//! - `audio`: Procedural sound effects and ambient loop
//! - `briefing`: Mission briefing generation with offline fallback
//! - `platform`: Browser input plumbing
//! - `tuning`: Data-driven game balance

pub mod audio;
pub mod briefing;
pub mod driver;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use driver::{AppPhase, FrameOutcome, HostEvent, LoopDriver};
pub use settings::Settings;
pub use tuning::{Difficulty, DifficultyProfile};

/// Game configuration constants
///
/// Speeds are in pixels per second; the simulation advances one `SIM_DT`
/// tick per display frame.
pub mod consts {
    /// Fixed simulation timestep (one tick per frame at a nominal 60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Playfield dimensions (canvas coordinate space, y grows downward)
    pub const PLAYFIELD_WIDTH: f32 = 800.0;
    pub const PLAYFIELD_HEIGHT: f32 = 600.0;

    /// Player craft
    pub const PLAYER_SIZE: f32 = 40.0;
    /// Player spawn height above the bottom edge
    pub const PLAYER_START_OFFSET: f32 = 100.0;
    /// Fraction of the remaining distance to the pointer covered per tick
    pub const POINTER_SMOOTHING: f32 = 0.35;
    /// Hitbox shrink applied on every side for player/enemy contact
    pub const PLAYER_HITBOX_INSET: f32 = 8.0;

    /// Enemy base footprint
    pub const ENEMY_SIZE: f32 = 35.0;

    /// Projectiles
    pub const PROJECTILE_WIDTH: f32 = 6.0;
    pub const PROJECTILE_HEIGHT: f32 = PROJECTILE_WIDTH * 3.0;
    pub const PROJECTILE_SPEED: f32 = 1320.0;
    pub const SHOT_COOLDOWN_MS: f64 = 105.0;
    /// Projectiles above this y are gone
    pub const PROJECTILE_TOP_MARGIN: f32 = 50.0;
    /// Projectiles this far past either side are gone
    pub const PROJECTILE_SIDE_MARGIN: f32 = 150.0;

    /// Particle life lost per second (life runs 1.0 -> 0.0)
    pub const PARTICLE_DECAY: f32 = 2.1;

    /// Minimum spacing between score notifications to the host page
    pub const SCORE_SYNC_INTERVAL_MS: f64 = 100.0;
    /// Level-up banner duration in ticks
    pub const LEVEL_UP_BANNER_TICKS: u32 = 100;
}

/// Display colors as sRGB-encoded RGBA (drawn to a non-sRGB surface)
pub mod palette {
    pub type Rgba = [f32; 4];

    pub const PLAYER: Rgba = [0.231, 0.510, 0.965, 1.0];
    pub const ENEMY: Rgba = [0.937, 0.267, 0.267, 1.0];
    pub const ENEMY_ZIGZAG: Rgba = [0.980, 0.800, 0.082, 1.0];
    pub const ENEMY_TANK: Rgba = [0.659, 0.333, 0.969, 1.0];
    pub const ENEMY_INTERCEPTOR: Rgba = [0.133, 0.827, 0.933, 1.0];
    pub const PROJECTILE: Rgba = [0.984, 0.749, 0.141, 1.0];
    pub const SPARK: Rgba = [1.0, 1.0, 1.0, 1.0];

    /// Same color with a different alpha
    #[inline]
    pub fn with_alpha(color: Rgba, alpha: f32) -> Rgba {
        [color[0], color[1], color[2], alpha]
    }

    /// Convert 0-255 sRGB channels to an opaque color
    pub const fn rgb8(r: u8, g: u8, b: u8) -> Rgba {
        [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0]
    }
}

/// -1, 0 or 1 (unlike `f32::signum`, zero maps to zero)
#[inline]
pub fn sign(value: f32) -> f32 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

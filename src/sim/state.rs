//! Game state and core simulation types
//!
//! The entity store for one session: the player plus every live enemy,
//! projectile and particle. Only the simulation mutates it; rendering reads it.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::consts::*;
use crate::palette::{self, Rgba};
use crate::tuning::{Difficulty, DifficultyProfile, EnemyVariant};

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Player destroyed; terminal
    GameOver,
}

/// Axis-aligned rectangle, top-left anchored
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }

    /// Shrink by `margin` on every side
    pub fn inset(&self, margin: f32) -> Self {
        Self {
            min: self.min + Vec2::splat(margin),
            size: self.size - Vec2::splat(margin * 2.0),
        }
    }

    /// Strict overlap test (touching edges do not count)
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let (a_max, b_max) = (self.max(), other.max());
        self.min.x < b_max.x && a_max.x > other.min.x && self.min.y < b_max.y && a_max.y > other.min.y
    }
}

/// The player's craft
#[derive(Debug, Clone)]
pub struct Player {
    pub pos: Vec2,
    pub size: Vec2,
    pub hp: u8,
    pub score: u64,
}

impl Player {
    pub fn new(hp: u8) -> Self {
        Self {
            pos: Vec2::new(PLAYFIELD_WIDTH / 2.0, PLAYFIELD_HEIGHT - PLAYER_START_OFFSET),
            size: Vec2::splat(PLAYER_SIZE),
            hp,
            score: 0,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.bounds().center()
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Ease toward the pointer (pointer marks the craft's center)
    pub fn follow(&mut self, pointer: Vec2) {
        let target = pointer - self.size * 0.5;
        self.pos += (target - self.pos) * POINTER_SMOOTHING;
    }

    /// Keep the whole craft inside the playfield
    pub fn clamp_to_playfield(&mut self) {
        self.pos.x = self.pos.x.clamp(0.0, PLAYFIELD_WIDTH - self.size.x);
        self.pos.y = self.pos.y.clamp(0.0, PLAYFIELD_HEIGHT - self.size.y);
    }
}

/// Enemy behaviour with variant-specific payload
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnemyKind {
    Normal,
    /// Horizontal drift `sin(y * frequency + phase) * amplitude` px/s
    Zigzag { phase: f32, frequency: f32, amplitude: f32 },
    Tank,
    Interceptor,
}

impl EnemyKind {
    pub fn variant(&self) -> EnemyVariant {
        match self {
            EnemyKind::Normal => EnemyVariant::Normal,
            EnemyKind::Zigzag { .. } => EnemyVariant::Zigzag,
            EnemyKind::Tank => EnemyVariant::Tank,
            EnemyKind::Interceptor => EnemyVariant::Interceptor,
        }
    }
}

/// A hostile craft
#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub size: Vec2,
    /// Fall speed (px/s)
    pub speed: f32,
    pub hp: u8,
    pub max_hp: u8,
    pub color: Rgba,
}

impl Enemy {
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Remaining hit points as a fraction of the maximum
    pub fn hp_fraction(&self) -> f32 {
        if self.max_hp == 0 {
            0.0
        } else {
            self.hp as f32 / self.max_hp as f32
        }
    }
}

/// A player shot; always travels upward
#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    pub size: Vec2,
    /// Horizontal drift (px/s), zero for straight shots
    pub drift: f32,
}

impl Projectile {
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }

    /// Still inside the region where projectiles are tracked
    pub fn in_flight(&self) -> bool {
        self.pos.y > -PROJECTILE_TOP_MARGIN
            && self.pos.x > -PROJECTILE_SIDE_MARGIN
            && self.pos.x < PLAYFIELD_WIDTH + PROJECTILE_SIDE_MARGIN
    }
}

/// A cosmetic particle; never collides
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub color: Rgba,
    /// Remaining life, decreases to 0
    pub life: f32,
    pub max_life: f32,
}

/// Sound cues raised by the simulation (played by the audio collaborator)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    Shoot,
    ExplosionSmall,
    ExplosionLarge,
    Hit,
    LevelUp,
}

/// Side effects produced during a tick, drained by the loop driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    Sound(SoundCue),
    /// Rate-limited score notification for the host page
    ScoreChanged(u64),
    LevelUp(u8),
    GameOver { score: u64 },
}

/// Complete session state (deterministic for a given seed and input stream)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub difficulty: Difficulty,
    pub phase: GamePhase,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    /// Current weapon power level (never decreases within a session)
    pub power_level: u8,
    /// Ticks left on the level-up banner
    pub level_up_ticks: u32,
    /// Time of the last enemy spawn (ms)
    pub last_spawn_ms: f64,
    /// Time of the last volley (ms)
    pub last_shot_ms: f64,
    /// Score last reported to the host page
    pub last_synced_score: u64,
    /// Time of the last score report (ms)
    pub last_sync_ms: f64,
    /// Events raised since the last drain
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Fresh session: full-health player, empty collections, power level 1
    pub fn new(difficulty: Difficulty, seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            difficulty,
            phase: GamePhase::Playing,
            time_ticks: 0,
            player: Player::new(difficulty.profile().player_hp),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            particles: Vec::new(),
            power_level: 1,
            level_up_ticks: 0,
            last_spawn_ms: 0.0,
            last_shot_ms: 0.0,
            last_synced_score: 0,
            last_sync_ms: 0.0,
            events: Vec::new(),
            next_id: 1,
        }
    }

    pub fn profile(&self) -> &'static DifficultyProfile {
        self.difficulty.profile()
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn cue(&mut self, cue: SoundCue) {
        self.events.push(GameEvent::Sound(cue));
    }

    /// Take every event raised since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Color for an enemy variant
pub fn variant_color(variant: EnemyVariant) -> Rgba {
    match variant {
        EnemyVariant::Normal => palette::ENEMY,
        EnemyVariant::Zigzag => palette::ENEMY_ZIGZAG,
        EnemyVariant::Tank => palette::ENEMY_TANK,
        EnemyVariant::Interceptor => palette::ENEMY_INTERCEPTOR,
    }
}

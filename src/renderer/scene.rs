//! Scene building
//!
//! Turns a read-only `GameState` into a triangle list plus the text overlay.
//! No GPU types are touched here, so the whole frame layout is testable.

use glam::Vec2;

use super::shapes::{self, CIRCLE_SEGMENTS};
use super::vertex::{Vertex, colors};
use crate::consts::{PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH};
use crate::palette::{self, Rgba};
use crate::sim::{Enemy, EnemyKind, GameState, Player};

/// Background grid spacing (px)
pub const GRID_SPACING: f32 = 60.0;
/// Grid scroll rate: one pixel every this many ms
const GRID_SCROLL_MS_PER_PX: f64 = 20.0;
/// Player blink period while destroyed (ms)
const BLINK_MS: f64 = 80.0;
/// Padding added around glowing sprites
const GLOW_PAD: f32 = 3.0;

/// Host-supplied HUD context
#[derive(Debug, Clone, Copy, Default)]
pub struct HudInfo<'a> {
    pub mission_name: &'a str,
    /// Freeze the background scroll
    pub reduced_motion: bool,
}

/// Transient level-up message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub title: &'static str,
    pub subtitle: String,
}

/// Everything needed to present one frame
#[derive(Debug, Clone, Default)]
pub struct Scene {
    /// Triangle list in playfield coordinates
    pub vertices: Vec<Vertex>,
    /// Bottom-left status text
    pub status_line: String,
    pub banner: Option<Banner>,
}

/// Build the frame for `state` at wall-clock `time_ms`
pub fn build_scene(state: &GameState, hud: &HudInfo, time_ms: f64) -> Scene {
    let mut vertices = Vec::with_capacity(
        512 + state.enemies.len() * 12 + state.projectiles.len() * 12 + state.particles.len() * 6,
    );

    grid(&mut vertices, grid_offset(time_ms, hud.reduced_motion));

    if player_visible(&state.player, time_ms) {
        player(&mut vertices, &state.player);
    }

    for enemy in state.enemies.iter().filter(|e| e.is_alive()) {
        self::enemy(&mut vertices, enemy);
    }

    for p in &state.projectiles {
        let halo = palette::with_alpha(palette::PROJECTILE, colors::GLOW_ALPHA);
        shapes::rect(&mut vertices, p.pos - Vec2::splat(2.0), p.size + Vec2::splat(4.0), halo);
        shapes::rect(&mut vertices, p.pos, p.size, palette::PROJECTILE);
    }

    for particle in &state.particles {
        let alpha = particle.life.clamp(0.0, 1.0);
        shapes::rect(
            &mut vertices,
            particle.pos,
            particle.size,
            palette::with_alpha(particle.color, alpha),
        );
    }

    hp_icons(&mut vertices, state.player.hp, state.profile().color);

    Scene {
        vertices,
        status_line: status_line(hud.mission_name, state.profile().label, state.power_level),
        banner: banner(state),
    }
}

/// Vertical scroll of the horizontal grid lines
pub fn grid_offset(time_ms: f64, reduced_motion: bool) -> f32 {
    if reduced_motion {
        return 0.0;
    }
    ((time_ms / GRID_SCROLL_MS_PER_PX) % GRID_SPACING as f64) as f32
}

/// Live players are always drawn; a destroyed one blinks
pub fn player_visible(player: &Player, time_ms: f64) -> bool {
    player.hp > 0 || (time_ms / BLINK_MS).floor() as i64 % 2 == 0
}

/// "MISSION | LABEL | LVL n"
pub fn status_line(mission_name: &str, label: &str, power_level: u8) -> String {
    format!("{} | {} | LVL {}", mission_name.to_uppercase(), label, power_level)
}

/// Level-up banner while its countdown runs
pub fn banner(state: &GameState) -> Option<Banner> {
    (state.level_up_ticks > 0).then(|| Banner {
        title: "WEAPONS OVERLOAD!",
        subtitle: format!("POWER LEVEL {}", state.power_level),
    })
}

fn grid(out: &mut Vec<Vertex>, offset: f32) {
    let mut x = 0.0;
    while x < PLAYFIELD_WIDTH {
        shapes::rect(out, Vec2::new(x, 0.0), Vec2::new(1.0, PLAYFIELD_HEIGHT), colors::GRID);
        x += GRID_SPACING;
    }
    let mut y = 0.0;
    while y < PLAYFIELD_HEIGHT {
        shapes::rect(out, Vec2::new(0.0, y + offset), Vec2::new(PLAYFIELD_WIDTH, 1.0), colors::GRID);
        y += GRID_SPACING;
    }
}

/// Arrowhead hull split into two triangles, with a cockpit dot
fn player(out: &mut Vec<Vertex>, player: &Player) {
    let (pos, size) = (player.pos, player.size);
    let hull = |out: &mut Vec<Vertex>, pad: f32, color: Rgba| {
        let nose = Vec2::new(pos.x + size.x / 2.0, pos.y - pad);
        let notch = Vec2::new(pos.x + size.x / 2.0, pos.y + size.y - 12.0);
        let left = Vec2::new(pos.x - pad, pos.y + size.y + pad);
        let right = Vec2::new(pos.x + size.x + pad, pos.y + size.y + pad);
        shapes::triangle(out, nose, right, notch, color);
        shapes::triangle(out, nose, notch, left, color);
    };

    hull(out, GLOW_PAD * 2.0, palette::with_alpha(palette::PLAYER, colors::GLOW_ALPHA));
    hull(out, 0.0, palette::PLAYER);

    let cockpit = Vec2::new(pos.x + size.x / 2.0, pos.y + size.y - 8.0);
    shapes::circle(out, cockpit, 4.0, colors::COCKPIT, CIRCLE_SEGMENTS);
}

fn enemy(out: &mut Vec<Vertex>, enemy: &Enemy) {
    let (pos, size) = (enemy.pos, enemy.size);
    match enemy.kind {
        EnemyKind::Tank => {
            shapes::rect(out, pos, size, enemy.color);
            let bar = Vec2::new(pos.x, pos.y - 10.0);
            shapes::rect(out, bar, Vec2::new(size.x, 5.0), colors::HP_BAR_BG);
            shapes::rect(out, bar, Vec2::new(size.x * enemy.hp_fraction(), 5.0), colors::HP_BAR_FILL);
        }
        EnemyKind::Normal | EnemyKind::Zigzag { .. } | EnemyKind::Interceptor => {
            if matches!(enemy.kind, EnemyKind::Zigzag { .. } | EnemyKind::Interceptor) {
                let halo = palette::with_alpha(enemy.color, colors::GLOW_ALPHA);
                shapes::triangle(
                    out,
                    pos - Vec2::splat(GLOW_PAD),
                    Vec2::new(pos.x + size.x + GLOW_PAD, pos.y - GLOW_PAD),
                    Vec2::new(pos.x + size.x / 2.0, pos.y + size.y + GLOW_PAD * 2.0),
                    halo,
                );
            }
            // Point-down triangle
            shapes::triangle(
                out,
                pos,
                Vec2::new(pos.x + size.x, pos.y),
                Vec2::new(pos.x + size.x / 2.0, pos.y + size.y),
                enemy.color,
            );
        }
    }
}

fn hp_icons(out: &mut Vec<Vertex>, hp: u8, color: Rgba) {
    for i in 0..hp {
        let center = Vec2::new(30.0 + i as f32 * 25.0, 30.0);
        shapes::circle(out, center, 8.0, color, CIRCLE_SEGMENTS);
    }
}

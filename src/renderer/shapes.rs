//! Shape generation for 2D primitives
//!
//! Everything is emitted as a plain triangle list in playfield coordinates.

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::Vertex;
use crate::palette::Rgba;

/// Segments used for small circles (HP icons, cockpit)
pub const CIRCLE_SEGMENTS: u32 = 16;

/// Append a filled triangle
pub fn triangle(out: &mut Vec<Vertex>, a: Vec2, b: Vec2, c: Vec2, color: Rgba) {
    out.push(Vertex::new(a.x, a.y, color));
    out.push(Vertex::new(b.x, b.y, color));
    out.push(Vertex::new(c.x, c.y, color));
}

/// Append an axis-aligned filled rectangle
pub fn rect(out: &mut Vec<Vertex>, min: Vec2, size: Vec2, color: Rgba) {
    if size.x <= 0.0 || size.y <= 0.0 {
        return;
    }
    let max = min + size;
    let top_right = Vec2::new(max.x, min.y);
    let bottom_left = Vec2::new(min.x, max.y);
    triangle(out, min, top_right, bottom_left, color);
    triangle(out, bottom_left, top_right, max, color);
}

/// Append a filled circle as a triangle fan
pub fn circle(out: &mut Vec<Vertex>, center: Vec2, radius: f32, color: Rgba, segments: u32) {
    let segments = segments.max(3);
    out.reserve((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        triangle(
            out,
            center,
            center + radius * Vec2::new(theta1.cos(), theta1.sin()),
            center + radius * Vec2::new(theta2.cos(), theta2.sin()),
            color,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(vertices: &[Vertex]) -> (Vec2, Vec2) {
        let mut min = Vec2::splat(f32::MAX);
        let mut max = Vec2::splat(f32::MIN);
        for v in vertices {
            let p = Vec2::from(v.position);
            min = min.min(p);
            max = max.max(p);
        }
        (min, max)
    }

    #[test]
    fn test_rect_covers_box() {
        let mut out = Vec::new();
        rect(&mut out, Vec2::new(10.0, 20.0), Vec2::new(6.0, 18.0), [1.0; 4]);
        assert_eq!(out.len(), 6);
        assert_eq!(bounds(&out), (Vec2::new(10.0, 20.0), Vec2::new(16.0, 38.0)));
    }

    #[test]
    fn test_empty_rect_emits_nothing() {
        let mut out = Vec::new();
        rect(&mut out, Vec2::ZERO, Vec2::new(0.0, 5.0), [1.0; 4]);
        assert!(out.is_empty());
    }

    #[test]
    fn test_circle_stays_within_radius() {
        let mut out = Vec::new();
        let center = Vec2::new(30.0, 30.0);
        circle(&mut out, center, 8.0, [1.0; 4], CIRCLE_SEGMENTS);
        assert_eq!(out.len(), CIRCLE_SEGMENTS as usize * 3);
        for v in &out {
            assert!(Vec2::from(v.position).distance(center) <= 8.0 + 1e-4);
        }
    }
}

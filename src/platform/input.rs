//! Pointer and touch input
//!
//! Event handlers overwrite a single latest-value slot; the frame loop reads
//! it once at the start of each tick. There is no queue.

use std::cell::Cell;
use std::rc::Rc;

use glam::Vec2;

use crate::consts::{PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH};

/// On-screen rectangle of the canvas (CSS pixels, from `getBoundingClientRect`)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

/// Map a client-space point into playfield coordinates, accounting for the
/// canvas being displayed at a different size than its backing resolution.
///
/// Returns `None` while the canvas has no on-screen size.
pub fn client_to_playfield(client: Vec2, viewport: Viewport) -> Option<Vec2> {
    if viewport.width <= 0.0 || viewport.height <= 0.0 {
        return None;
    }
    let scale = Vec2::new(PLAYFIELD_WIDTH / viewport.width, PLAYFIELD_HEIGHT / viewport.height);
    Some((client - Vec2::new(viewport.left, viewport.top)) * scale)
}

/// Latest pointer position, shared between input handlers and the frame loop
///
/// A whole `Vec2` is stored and loaded at once, so a reader never sees a
/// half-updated position.
#[derive(Debug, Clone, Default)]
pub struct PointerSlot(Rc<Cell<Option<Vec2>>>);

impl PointerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite with the newest position
    pub fn store(&self, pos: Vec2) {
        self.0.set(Some(pos));
    }

    pub fn latest(&self) -> Option<Vec2> {
        self.0.get()
    }

    /// Forget the last position (new session)
    pub fn clear(&self) {
        self.0.set(None);
    }
}

//! Platform abstraction layer
//!
//! Browser plumbing that the simulation must not know about:
//! - Pointer/touch capture and coordinate mapping

pub mod input;

pub use input::{PointerSlot, Viewport, client_to_playfield};

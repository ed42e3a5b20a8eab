//! WebGPU rendering module
//!
//! The scene builder turns game state into flat-colored triangles in
//! playfield space; the pipeline maps them to clip space and draws them.
//! Text (status line, banner) goes to the page's DOM overlay.

pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use pipeline::{RenderError, RenderState};
pub use scene::{Banner, HudInfo, Scene, build_scene};
pub use vertex::Vertex;

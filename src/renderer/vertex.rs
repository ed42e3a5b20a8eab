//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

use crate::palette::Rgba;

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: Rgba,
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: Rgba) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Colors for scenery and overlays
pub mod colors {
    use crate::palette::{Rgba, rgb8};

    pub const BACKGROUND: Rgba = rgb8(2, 6, 23);
    pub const GRID: Rgba = rgb8(15, 23, 42);
    pub const COCKPIT: Rgba = [1.0, 1.0, 1.0, 1.0];
    pub const HP_BAR_BG: Rgba = [0.0, 0.0, 0.0, 0.5];
    pub const HP_BAR_FILL: Rgba = rgb8(239, 68, 68);
    /// Alpha of the halo drawn behind glowing sprites
    pub const GLOW_ALPHA: f32 = 0.25;
}

//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
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

/// Colors for game elements
pub mod colors {
    use crate::sim::{Action, Stage, TileKind};

    pub const SKY_GRASS: [f32; 4] = [0.45, 0.75, 0.95, 1.0];
    pub const SKY_CLOUDS: [f32; 4] = [0.75, 0.85, 0.95, 1.0];
    pub const SKY_ASTEROIDS: [f32; 4] = [0.04, 0.03, 0.12, 1.0];

    pub const GRASS: [f32; 4] = [0.3, 0.7, 0.25, 1.0];
    pub const CLOUD: [f32; 4] = [0.97, 0.97, 1.0, 1.0];
    pub const ASTEROID: [f32; 4] = [0.55, 0.45, 0.4, 1.0];

    pub const PLAYER_IDLE: [f32; 4] = [0.95, 0.55, 0.2, 1.0];
    pub const PLAYER_WALK: [f32; 4] = [0.95, 0.45, 0.15, 1.0];
    pub const PLAYER_JUMP: [f32; 4] = [1.0, 0.7, 0.25, 1.0];
    pub const PLAYER_CROUCH: [f32; 4] = [0.85, 0.4, 0.15, 1.0];
    pub const PLAYER_EYE: [f32; 4] = [0.1, 0.1, 0.15, 1.0];

    pub const HITBOX: [f32; 4] = [1.0, 0.1, 0.1, 0.9];
    pub const SCORE: [f32; 4] = [1.0, 1.0, 1.0, 0.95];

    pub fn background(stage: Stage) -> [f32; 4] {
        match stage {
            Stage::Grass => SKY_GRASS,
            Stage::Clouds => SKY_CLOUDS,
            Stage::Asteroids => SKY_ASTEROIDS,
        }
    }

    /// `None` for empty cells, which are never drawn
    pub fn tile(kind: TileKind) -> Option<[f32; 4]> {
        match kind {
            TileKind::Empty => None,
            TileKind::Grass => Some(GRASS),
            TileKind::Cloud => Some(CLOUD),
            TileKind::Asteroid => Some(ASTEROID),
        }
    }

    pub fn player(action: Action) -> [f32; 4] {
        match action {
            Action::Idle => PLAYER_IDLE,
            Action::Walk => PLAYER_WALK,
            Action::Jump => PLAYER_JUMP,
            Action::Crouch => PLAYER_CROUCH,
        }
    }

    pub fn with_alpha(color: [f32; 4], alpha: f32) -> [f32; 4] {
        [color[0], color[1], color[2], color[3] * alpha]
    }
}

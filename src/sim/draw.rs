//! Draw contract between the simulation and a renderer
//!
//! The engine issues screen-space primitives once per frame; implementations
//! never feed anything back into the simulation.

use super::animation::{Action, Facing};
use super::hitbox::Rect;
use super::tile::TileKind;
use super::world::Stage;

/// One sprite frame to draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteDraw {
    /// Full sprite bounds on screen
    pub rect: Rect,
    pub action: Action,
    pub frame: u32,
    pub facing: Facing,
}

/// Receiver of the engine's draw pass
pub trait Renderer {
    /// Full-screen backdrop for `stage`; `alpha` < 1 during a crossfade
    fn draw_background(&mut self, stage: Stage, alpha: f32);

    fn draw_tile(&mut self, rect: Rect, kind: TileKind, alpha: f32);

    fn draw_sprite(&mut self, sprite: &SpriteDraw);

    fn draw_score(&mut self, score: u64);

    /// Debug outline of a collision box
    fn draw_hitbox(&mut self, _rect: Rect) {}
}

//! Collects the engine's draw calls into a vertex list for one frame

use glam::Vec2;

use super::shapes;
use super::vertex::{Vertex, colors};
use crate::sim::{Facing, Rect, Renderer, SpriteDraw, Stage, TileKind};

const SCORE_MARGIN: f32 = 8.0;
const SCORE_DIGIT_HEIGHT: f32 = 18.0;

/// `Renderer` that turns draw primitives into colored quads in screen pixels
#[derive(Debug, Clone)]
pub struct SceneBuilder {
    vertices: Vec<Vertex>,
    width: f32,
    height: f32,
}

impl SceneBuilder {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            vertices: Vec::with_capacity(4096),
            width,
            height,
        }
    }

    /// Start a new frame, keeping the allocation
    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }
}

impl Renderer for SceneBuilder {
    fn draw_background(&mut self, stage: Stage, alpha: f32) {
        let color = colors::with_alpha(colors::background(stage), alpha);
        self.vertices
            .extend(shapes::quad(Rect::new(0.0, 0.0, self.width, self.height), color));
    }

    fn draw_tile(&mut self, rect: Rect, kind: TileKind, alpha: f32) {
        if let Some(color) = colors::tile(kind) {
            self.vertices
                .extend(shapes::quad(rect, colors::with_alpha(color, alpha)));
        }
    }

    fn draw_sprite(&mut self, sprite: &SpriteDraw) {
        let r = sprite.rect;
        // Walk cycle bobs the body by a pixel on odd frames
        let bob = if sprite.frame % 2 == 1 { 1.0 } else { 0.0 };
        let body = Rect::new(r.x + r.w * 0.2, r.y + r.h * 0.25 + bob, r.w * 0.6, r.h * 0.75 - bob);
        self.vertices
            .extend(shapes::quad(body, colors::player(sprite.action)));

        let eye_w = r.w * 0.12;
        let eye_x = match sprite.facing {
            Facing::Left => body.x + eye_w,
            Facing::Right => body.right() - eye_w * 2.0,
        };
        self.vertices.extend(shapes::quad(
            Rect::new(eye_x, body.y + body.h * 0.2, eye_w, eye_w),
            colors::PLAYER_EYE,
        ));
    }

    fn draw_score(&mut self, score: u64) {
        self.vertices.extend(shapes::number(
            score,
            Vec2::splat(SCORE_MARGIN),
            SCORE_DIGIT_HEIGHT,
            colors::SCORE,
        ));
    }

    fn draw_hitbox(&mut self, rect: Rect) {
        self.vertices
            .extend(shapes::outline(rect, 1.0, colors::HITBOX));
    }
}

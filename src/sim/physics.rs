//! Integration and tile collision response
//!
//! Collisions are resolved one tile at a time. The axis of each impact is
//! decided from where the hitbox was *before* this tick's integration:
//! vertical cases are tested first, so a diagonal overlap stops vertical
//! motion before horizontal motion.

use glam::Vec2;

use super::hitbox::{HitboxAdjust, Rect};
use super::tile::{ActiveTile, TileId};
use crate::tuning::PhysicsTuning;

/// Kinematic state of a moving entity; `pos` is the sprite's top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Body {
    pub pos: Vec2,
    /// Position before the last integration
    pub prev: Vec2,
    pub vel: Vec2,
    pub on_ground: bool,
}

impl Body {
    pub fn at(pos: Vec2) -> Self {
        Self {
            pos,
            prev: pos,
            vel: Vec2::ZERO,
            on_ground: false,
        }
    }
}

/// Which face of a tile was hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    /// Came down onto the tile's top
    Landing,
    /// Came up into the tile's bottom
    Ceiling,
    /// Moved right into the tile's left face
    WallRight,
    /// Moved left into the tile's right face
    WallLeft,
}

/// A resolved collision against one tile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub tile: TileId,
    pub kind: ContactKind,
}

/// Add gravity, amplified while fast-falling
pub fn apply_gravity(body: &mut Body, tuning: &PhysicsTuning, fast_fall: bool) {
    let falling = body.vel.y > 0.0 && !body.on_ground;
    let multiplier = if fast_fall && falling {
        tuning.fast_fall_multiplier
    } else {
        1.0
    };
    body.vel.y += tuning.gravity * multiplier;
}

/// Accelerate toward `direction * max_speed`, or decelerate by friction when idle
pub fn apply_horizontal(body: &mut Body, direction: f32, tuning: &PhysicsTuning) {
    let vx = body.vel.x;
    body.vel.x = if direction != 0.0 {
        approach(vx, direction * tuning.max_speed, tuning.accel)
    } else {
        approach(vx, 0.0, tuning.friction)
    };
}

fn approach(current: f32, target: f32, step: f32) -> f32 {
    if current < target {
        (current + step).min(target)
    } else {
        (current - step).max(target)
    }
}

/// Remember the current position, then move by the velocity
pub fn integrate(body: &mut Body) {
    body.prev = body.pos;
    body.pos += body.vel;
}

/// Push `body` out of every overlapping tile, in order.
///
/// The hitbox is recomputed after every correction, so a tile that no longer
/// overlaps after an earlier push is skipped. Returns the contacts made.
pub fn resolve_collisions(
    body: &mut Body,
    hitbox: &HitboxAdjust,
    scale: f32,
    tiles: &[ActiveTile],
) -> Vec<Contact> {
    let prev_hb = hitbox.rect_at(body.prev, scale);
    let mut hb = hitbox.rect_at(body.pos, scale);
    let mut contacts = Vec::new();
    body.on_ground = false;

    for tile in tiles {
        let t: &Rect = &tile.rect;
        if !hb.intersects(t) {
            continue;
        }

        let kind = if prev_hb.bottom() <= t.y {
            body.pos.y = t.y - hitbox.bottom_offset(scale);
            body.vel.y = 0.0;
            body.on_ground = true;
            ContactKind::Landing
        } else if prev_hb.y >= t.bottom() {
            body.pos.y = t.bottom() - hitbox.offset_y * scale;
            body.vel.y = 0.0;
            ContactKind::Ceiling
        } else if prev_hb.right() <= t.x {
            body.pos.x = t.x - (hitbox.offset_x + hitbox.width) * scale;
            body.vel.x = 0.0;
            ContactKind::WallRight
        } else if prev_hb.x >= t.right() {
            body.pos.x = t.right() - hitbox.offset_x * scale;
            body.vel.x = 0.0;
            ContactKind::WallLeft
        } else {
            // Already overlapping before this tick; nothing to disambiguate
            continue;
        };

        contacts.push(Contact {
            tile: tile.id,
            kind,
        });
        hb = hitbox.rect_at(body.pos, scale);
    }

    contacts
}

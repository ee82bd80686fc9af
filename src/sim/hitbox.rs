//! Axis-aligned rectangles and per-action hitbox adjustments
//!
//! The collision rectangle is smaller than the sprite frame and changes with
//! the pose, so it is derived on demand from position + action.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::animation::{Action, ActionTable};

/// Axis-aligned rectangle in world units (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Strict overlap; touching edges do not intersect
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }
}

/// Hitbox inside a sprite frame, in unscaled sprite pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitboxAdjust {
    /// Distance from the frame's left edge to the hitbox
    pub offset_x: f32,
    /// Distance from the frame's top edge to the hitbox
    pub offset_y: f32,
    pub width: f32,
    pub height: f32,
}

impl HitboxAdjust {
    pub const fn new(offset_x: f32, offset_y: f32, width: f32, height: f32) -> Self {
        Self {
            offset_x,
            offset_y,
            width,
            height,
        }
    }

    /// World-space rectangle for a sprite whose top-left corner is `pos`
    pub fn rect_at(&self, pos: Vec2, scale: f32) -> Rect {
        Rect::new(
            pos.x + self.offset_x * scale,
            pos.y + self.offset_y * scale,
            self.width * scale,
            self.height * scale,
        )
    }

    /// Distance from the sprite top to the hitbox bottom, scaled
    pub fn bottom_offset(&self, scale: f32) -> f32 {
        (self.offset_y + self.height) * scale
    }
}

/// Edge of a hitbox selected for editing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitboxSide {
    Left,
    Top,
    Right,
    Bottom,
}

/// Hitbox adjustments for every action
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HitboxTable(pub ActionTable<HitboxAdjust>);

impl Default for HitboxTable {
    fn default() -> Self {
        Self(ActionTable {
            idle: HitboxAdjust::new(6.0, 7.0, 8.0, 12.0),
            walk: HitboxAdjust::new(6.0, 7.0, 8.0, 12.0),
            jump: HitboxAdjust::new(6.0, 6.0, 8.0, 13.0),
            crouch: HitboxAdjust::new(6.0, 10.0, 8.0, 9.0),
        })
    }
}

impl HitboxTable {
    pub fn get(&self, action: Action) -> &HitboxAdjust {
        self.0.get(action)
    }

    pub fn iter(&self) -> impl Iterator<Item = &HitboxAdjust> {
        self.0.iter()
    }

    /// Hitbox of `action` for a sprite at `pos`
    pub fn rect_at(&self, pos: Vec2, action: Action, scale: f32) -> Rect {
        self.get(action).rect_at(pos, scale)
    }

    /// Move one side of an action's hitbox by `delta` sprite pixels.
    /// Offsets stay non-negative and sizes stay at least one pixel.
    pub fn adjust(&mut self, action: Action, side: HitboxSide, delta: f32) {
        let adj = self.0.get_mut(action);
        match side {
            HitboxSide::Left => adj.offset_x = (adj.offset_x + delta).max(0.0),
            HitboxSide::Top => adj.offset_y = (adj.offset_y + delta).max(0.0),
            HitboxSide::Right => adj.width = (adj.width + delta).max(1.0),
            HitboxSide::Bottom => adj.height = (adj.height + delta).max(1.0),
        }
    }

    /// Restore an action's hitbox from the built-in table
    pub fn reset(&mut self, action: Action) {
        *self.0.get_mut(action) = *HitboxTable::default().get(action);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touching_rects_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        let c = Rect::new(0.0, 10.0, 10.0, 10.0);
        assert!(!a.intersects(&b));
        assert!(!a.intersects(&c));
        assert!(a.intersects(&Rect::new(9.5, 9.5, 1.0, 1.0)));
    }

    #[test]
    fn test_rect_at_scales_offsets() {
        let table = HitboxTable::default();
        let rect = table.rect_at(Vec2::new(100.0, 50.0), Action::Idle, 2.0);
        assert_eq!(rect, Rect::new(112.0, 64.0, 16.0, 24.0));
    }

    #[test]
    fn test_default_poses_share_feet() {
        let table = HitboxTable::default();
        let feet = table.get(Action::Idle).bottom_offset(1.5);
        for action in Action::ALL {
            assert_eq!(table.get(action).bottom_offset(1.5), feet);
        }
    }

    #[test]
    fn test_adjust_clamps_and_reset_restores() {
        let mut table = HitboxTable::default();
        table.adjust(Action::Crouch, HitboxSide::Left, -100.0);
        table.adjust(Action::Crouch, HitboxSide::Bottom, -100.0);
        table.adjust(Action::Crouch, HitboxSide::Right, 2.0);
        let adj = table.get(Action::Crouch);
        assert_eq!(adj.offset_x, 0.0);
        assert_eq!(adj.height, 1.0);
        assert_eq!(adj.width, 10.0);

        table.reset(Action::Crouch);
        assert_eq!(table, HitboxTable::default());
    }
}

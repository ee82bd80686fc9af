//! World tiles and their fade lifecycle

use serde::{Deserialize, Serialize};

use super::hitbox::Rect;

/// Stable identifier of a stored tile
pub type TileId = u32;

/// Tile material; one per stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TileKind {
    #[default]
    Empty,
    Grass,
    Cloud,
    Asteroid,
}

impl TileKind {
    /// Decode a template cell: `.` empty, `g` grass, `c` cloud, `a` asteroid
    pub fn from_cell(cell: u8) -> Self {
        match cell {
            b'g' | b'G' => TileKind::Grass,
            b'c' | b'C' => TileKind::Cloud,
            b'a' | b'A' => TileKind::Asteroid,
            _ => TileKind::Empty,
        }
    }

    pub fn is_empty(self) -> bool {
        self == TileKind::Empty
    }
}

/// A solid square of the world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub kind: TileKind,
    /// Opacity, 1 = opaque
    pub alpha: f32,
    /// Inactive tiles are excluded from collision
    pub active: bool,
    /// Timestamp (ms) of the first landing on this tile
    pub fade_started_at: Option<f64>,
}

impl Tile {
    pub fn new(id: TileId, x: f32, y: f32, size: f32, kind: TileKind) -> Self {
        debug_assert!(!kind.is_empty(), "empty cells are never stored");
        Self {
            id,
            x,
            y,
            width: size,
            height: size,
            kind,
            alpha: 1.0,
            active: true,
            fade_started_at: None,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Record the first landing. Later calls do not restart the fade.
    /// Returns true if this call started the fade.
    pub fn step(&mut self, now: f64) -> bool {
        if self.fade_started_at.is_some() {
            return false;
        }
        self.fade_started_at = Some(now);
        true
    }

    /// Recompute alpha from elapsed time; deactivates once fully faded
    pub fn update_fade(&mut self, now: f64, fade_millis: f64) {
        let Some(start) = self.fade_started_at else {
            return;
        };
        let t = ((now - start) / fade_millis).clamp(0.0, 1.0);
        self.alpha = (1.0 - t) as f32;
        if t >= 1.0 {
            self.alpha = 0.0;
            self.active = false;
        }
    }
}

/// Collision view of an active tile, captured once per tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveTile {
    pub id: TileId,
    pub rect: Rect,
}

//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One tick per call, driven by an explicit input snapshot and timestamp
//! - Seeded RNG only
//! - Stable iteration order (tiles in creation order)
//! - No rendering or platform dependencies

pub mod animation;
pub mod draw;
pub mod engine;
pub mod hitbox;
pub mod input;
pub mod patterns;
pub mod physics;
pub mod player;
pub mod tile;
pub mod world;

pub use animation::{Action, ActionTable, AnimationState, Facing};
pub use draw::{Renderer, SpriteDraw};
pub use engine::{Engine, GameOverCallback};
pub use hitbox::{HitboxAdjust, HitboxSide, HitboxTable, Rect};
pub use input::{InputSource, Key, TickInput};
pub use physics::{Body, Contact, ContactKind};
pub use player::Player;
pub use tile::{ActiveTile, Tile, TileId, TileKind};
pub use world::{Stage, StagePatterns, World, classify_stage};

//! Skyward - an endless vertical jumper
//!
//! Core modules:
//! - `sim`: Deterministic simulation (player physics, procedural world, game loop)
//! - `renderer`: WebGPU rendering pipeline
//! - `tuning`: Data-driven game balance
//! - `highscores`: Leaderboard persistence
//! - `settings`: Player preferences

pub mod highscores;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use highscores::{Leaderboard, ScoreRecord, ScoreStore};
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Milliseconds per simulation tick at a 60 Hz display refresh
    pub const TICK_MS: f64 = 1000.0 / 60.0;

    /// Edge length of a square tile in world units
    pub const TILE_SIZE: f32 = 32.0;
    /// Columns of tiles across the playfield
    pub const WORLD_COLUMNS: usize = 10;
    /// Playfield width in world units
    pub const WORLD_WIDTH: f32 = TILE_SIZE * WORLD_COLUMNS as f32;

    /// Viewport size in world units
    pub const VIEWPORT_WIDTH: f32 = WORLD_WIDTH;
    pub const VIEWPORT_HEIGHT: f32 = 480.0;

    /// Unscaled sprite frame size
    pub const SPRITE_WIDTH: f32 = 20.0;
    pub const SPRITE_HEIGHT: f32 = 24.0;
    /// Sprite scale applied to frames and hitboxes
    pub const SPRITE_SCALE: f32 = 1.5;
}

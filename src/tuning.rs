//! Data-driven game balance
//!
//! Every constant the simulation reads lives here and is passed explicitly into
//! `Engine`, `Player` and `World`. Defaults are tuned for a 60 Hz tick; a JSON
//! document may override any subset of fields.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::animation::ActionTable;
use crate::sim::hitbox::HitboxTable;

/// What happens once the player drops below the game-over floor
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameOverPolicy {
    /// End the session on the first tick below the floor
    #[default]
    Immediate,
    /// End the session after staying below the floor for `millis`
    Grace { millis: f64 },
}

/// Player motion constants (world units per tick)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    /// Downward acceleration added to `vy` every tick
    pub gravity: f32,
    /// Initial vertical velocity of a jump (negative = up)
    pub jump_power: f32,
    /// Extra upward impulse per tick while jump is held and the player rises
    pub jump_hold_impulse: f32,
    /// Horizontal target speed when running
    pub max_speed: f32,
    /// Horizontal acceleration toward the target speed
    pub accel: f32,
    /// Horizontal deceleration when no direction is held
    pub friction: f32,
    /// Gravity multiplier while falling with down held
    pub fast_fall_multiplier: f32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            gravity: 0.3,
            jump_power: -6.0,
            jump_hold_impulse: 0.1,
            max_speed: 3.0,
            accel: 0.4,
            friction: 0.3,
            fast_fall_multiplier: 2.0,
        }
    }
}

/// Sprite animation cadence and frame counts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationTuning {
    /// Ticks a frame is held before advancing
    pub ticks_per_frame: u32,
    /// Frames in each action's strip
    pub frames: ActionTable<u32>,
    /// Scale from sprite pixels to world units
    pub sprite_scale: f32,
}

impl Default for AnimationTuning {
    fn default() -> Self {
        Self {
            ticks_per_frame: 4,
            frames: ActionTable {
                idle: 8,
                walk: 4,
                jump: 4,
                crouch: 3,
            },
            sprite_scale: SPRITE_SCALE,
        }
    }
}

/// Procedural world constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldTuning {
    pub tile_size: f32,
    /// At or above this altitude (y at or below) the world is in the clouds
    pub clouds_threshold: f32,
    /// At or above this altitude (y at or below) the world is among asteroids
    pub asteroids_threshold: f32,
    /// Rows per generated chunk
    pub chunk_height_rows: u32,
    /// Generate while the player is closer than this to the next chunk boundary
    pub trigger_distance: f32,
    /// Upper bound on chunks generated in one tick
    pub max_chunks_per_tick: u32,
    /// Generation stops once this many tiles are stored
    pub max_tiles: usize,
    /// Tiles further than this many chunk heights below the player are pruned
    pub prune_distance_chunks: f32,
    /// Time for a stepped-on tile to fade out
    pub fade_millis: f64,
    /// Background crossfade duration on stage change
    pub crossfade_millis: f64,
}

impl Default for WorldTuning {
    fn default() -> Self {
        Self {
            tile_size: TILE_SIZE,
            clouds_threshold: -800.0,
            asteroids_threshold: -1600.0,
            chunk_height_rows: 10,
            trigger_distance: TILE_SIZE * 20.0,
            max_chunks_per_tick: 1,
            max_tiles: 2000,
            prune_distance_chunks: 2.0,
            fade_millis: 1500.0,
            crossfade_millis: 1000.0,
        }
    }
}

impl WorldTuning {
    /// Height of one chunk in world units
    pub fn chunk_height(&self) -> f32 {
        self.chunk_height_rows as f32 * self.tile_size
    }
}

/// Loop, scoring and camera constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineTuning {
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// World units of altitude per score point (before the stage multiplier)
    pub score_divisor: f32,
    pub game_over: GameOverPolicy,
}

impl Default for EngineTuning {
    fn default() -> Self {
        Self {
            viewport_width: VIEWPORT_WIDTH,
            viewport_height: VIEWPORT_HEIGHT,
            score_divisor: 10.0,
            game_over: GameOverPolicy::Immediate,
        }
    }
}

/// Complete tuning set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub physics: PhysicsTuning,
    pub animation: AnimationTuning,
    pub hitboxes: HitboxTable,
    pub world: WorldTuning,
    pub engine: EngineTuning,
}

/// Error loading a tuning document
#[derive(Debug)]
pub enum TuningError {
    /// The document is not valid JSON for `Tuning`
    Parse(serde_json::Error),
    /// A field holds a value the simulation cannot run with
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TuningError::Parse(e) => write!(f, "tuning parse error: {}", e),
            TuningError::Invalid { field, reason } => {
                write!(f, "invalid tuning value `{}`: {}", field, reason)
            }
        }
    }
}

impl std::error::Error for TuningError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TuningError::Parse(e) => Some(e),
            TuningError::Invalid { .. } => None,
        }
    }
}

impl From<serde_json::Error> for TuningError {
    fn from(e: serde_json::Error) -> Self {
        TuningError::Parse(e)
    }
}

fn check(ok: bool, field: &'static str, reason: &'static str) -> Result<(), TuningError> {
    if ok {
        Ok(())
    } else {
        Err(TuningError::Invalid { field, reason })
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON document over the defaults and validate it
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values that would stall or break the simulation
    pub fn validate(&self) -> Result<(), TuningError> {
        let p = &self.physics;
        check(p.gravity >= 0.0, "physics.gravity", "must not be negative")?;
        check(p.jump_power < 0.0, "physics.jump_power", "must be negative (upward)")?;
        check(p.jump_hold_impulse >= 0.0, "physics.jump_hold_impulse", "must not be negative")?;
        check(p.max_speed > 0.0, "physics.max_speed", "must be positive")?;
        check(p.accel > 0.0, "physics.accel", "must be positive")?;
        check(p.friction > 0.0, "physics.friction", "must be positive")?;
        check(p.fast_fall_multiplier >= 1.0, "physics.fast_fall_multiplier", "must be at least 1")?;

        let a = &self.animation;
        check(a.ticks_per_frame >= 1, "animation.ticks_per_frame", "must be at least 1")?;
        check(a.frames.iter().all(|&n| n >= 1), "animation.frames", "every action needs a frame")?;
        check(a.sprite_scale > 0.0, "animation.sprite_scale", "must be positive")?;

        check(
            self.hitboxes.iter().all(|h| h.width >= 1.0 && h.height >= 1.0),
            "hitboxes",
            "width and height must be at least 1",
        )?;

        let w = &self.world;
        check(w.tile_size > 0.0, "world.tile_size", "must be positive")?;
        check(
            w.asteroids_threshold < w.clouds_threshold,
            "world.asteroids_threshold",
            "must be above (more negative than) the clouds threshold",
        )?;
        check(w.chunk_height_rows >= 1, "world.chunk_height_rows", "must be at least 1")?;
        check(w.trigger_distance > 0.0, "world.trigger_distance", "must be positive")?;
        check(w.max_chunks_per_tick >= 1, "world.max_chunks_per_tick", "must be at least 1")?;
        check(w.prune_distance_chunks > 0.0, "world.prune_distance_chunks", "must be positive")?;
        check(w.fade_millis > 0.0, "world.fade_millis", "must be positive")?;
        check(w.crossfade_millis >= 0.0, "world.crossfade_millis", "must not be negative")?;

        let e = &self.engine;
        check(
            e.viewport_width > 0.0 && e.viewport_height > 0.0,
            "engine.viewport",
            "must be positive",
        )?;
        check(e.score_divisor > 0.0, "engine.score_divisor", "must be positive")?;
        if let GameOverPolicy::Grace { millis } = e.game_over {
            check(millis >= 0.0, "engine.game_over.millis", "must not be negative")?;
        }
        Ok(())
    }
}

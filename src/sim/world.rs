//! The procedural world
//!
//! Owns every tile, the altitude stage, chunk generation above the player,
//! the fade/prune lifecycle of old tiles and the game-over floor.
//!
//! y grows downward, so climbing means y becomes more negative.

use log::{debug, info, warn};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::patterns::{INITIAL_MAP, Pattern, builtin_patterns};
use super::tile::{ActiveTile, Tile, TileId, TileKind};
use crate::tuning::WorldTuning;

/// Altitude band of the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Stage {
    #[default]
    Grass,
    Clouds,
    Asteroids,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Grass, Stage::Clouds, Stage::Asteroids];

    /// Score weight of altitude reached in this stage
    pub fn multiplier(self) -> u64 {
        match self {
            Stage::Grass => 1,
            Stage::Clouds => 2,
            Stage::Asteroids => 3,
        }
    }

    /// Tile material generated in this stage
    pub fn tile_kind(self) -> TileKind {
        match self {
            Stage::Grass => TileKind::Grass,
            Stage::Clouds => TileKind::Cloud,
            Stage::Asteroids => TileKind::Asteroid,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Grass => "grass",
            Stage::Clouds => "clouds",
            Stage::Asteroids => "asteroids",
        }
    }
}

/// Stage for altitude `y`; a threshold belongs to the higher stage
pub fn classify_stage(y: f32, clouds_threshold: f32, asteroids_threshold: f32) -> Stage {
    if y <= asteroids_threshold {
        Stage::Asteroids
    } else if y <= clouds_threshold {
        Stage::Clouds
    } else {
        Stage::Grass
    }
}

/// Chunk templates for each stage
#[derive(Debug, Clone, Default)]
pub struct StagePatterns {
    pub grass: Vec<Pattern>,
    pub clouds: Vec<Pattern>,
    pub asteroids: Vec<Pattern>,
}

impl StagePatterns {
    pub fn builtin() -> Self {
        Self {
            grass: builtin_patterns(Stage::Grass),
            clouds: builtin_patterns(Stage::Clouds),
            asteroids: builtin_patterns(Stage::Asteroids),
        }
    }

    pub fn get(&self, stage: Stage) -> &[Pattern] {
        match stage {
            Stage::Grass => &self.grass,
            Stage::Clouds => &self.clouds,
            Stage::Asteroids => &self.asteroids,
        }
    }
}

/// Background blend in progress after a stage change
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crossfade {
    pub from: Stage,
    pub started_at: f64,
}

/// The procedural world
#[derive(Debug, Clone)]
pub struct World {
    tuning: WorldTuning,
    stage: Stage,
    crossfade: Option<Crossfade>,
    /// Stored tiles, in creation order
    tiles: Vec<Tile>,
    patterns: StagePatterns,
    /// Top edge of the band the next chunk fills downward from
    next_chunk_y: f32,
    /// Collision snapshot, rebuilt at the end of every update
    active: Vec<ActiveTile>,
    /// Game-over floor; kept when no tiles remain
    floor: f32,
    generation_refused: bool,
    rng: Pcg32,
    next_id: TileId,
}

impl World {
    /// World with the built-in starting screen and chunk templates
    pub fn new(tuning: &WorldTuning, seed: u64) -> Self {
        Self::with_map(
            tuning,
            seed,
            &Pattern::from_rows(INITIAL_MAP),
            StagePatterns::builtin(),
        )
    }

    /// World built from `map` (top row at y = 0) with custom templates
    pub fn with_map(tuning: &WorldTuning, seed: u64, map: &Pattern, patterns: StagePatterns) -> Self {
        let mut world = Self {
            tuning: tuning.clone(),
            stage: Stage::Grass,
            crossfade: None,
            tiles: Vec::new(),
            patterns,
            next_chunk_y: -tuning.chunk_height(),
            active: Vec::new(),
            floor: map.height() as f32 * tuning.tile_size,
            generation_refused: false,
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        };
        world.place_pattern(map, 0.0, map.height());
        world.recompute_floor();
        world.refresh_active();
        world
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.iter().find(|t| t.id == id)
    }

    /// Tiles that take part in collision this tick
    pub fn active_tiles(&self) -> &[ActiveTile] {
        &self.active
    }

    pub fn next_chunk_y(&self) -> f32 {
        self.next_chunk_y
    }

    /// y below which the player has fallen out of the world
    pub fn game_over_limit(&self) -> f32 {
        self.floor
    }

    pub fn tuning(&self) -> &WorldTuning {
        &self.tuning
    }

    /// Crossfade source stage and blend factor (0 = all `from`, 1 = all current)
    pub fn crossfade(&self, now: f64) -> Option<(Stage, f32)> {
        let fade = self.crossfade?;
        let t = if self.tuning.crossfade_millis > 0.0 {
            ((now - fade.started_at) / self.tuning.crossfade_millis).clamp(0.0, 1.0)
        } else {
            1.0
        };
        Some((fade.from, t as f32))
    }

    /// The player landed on `id`. Only the first landing starts the fade.
    pub fn on_tile_stepped(&mut self, id: TileId, now: f64) {
        if let Some(tile) = self.tiles.iter_mut().find(|t| t.id == id) {
            if tile.step(now) {
                debug!("tile {} stepped, fading", id);
            }
        }
    }

    /// Advance tile fades to `now` and drop expired tiles from the collision set.
    /// Idempotent for a given `now`.
    pub fn advance_fades(&mut self, now: f64) {
        for tile in &mut self.tiles {
            tile.update_fade(now, self.tuning.fade_millis);
        }
        self.refresh_active();
    }

    /// Advance one tick given the player's current y
    pub fn update(&mut self, player_y: f32, now: f64) {
        self.update_stage(player_y, now);
        self.generate_ahead(player_y);

        for tile in &mut self.tiles {
            tile.update_fade(now, self.tuning.fade_millis);
        }

        self.prune_below(player_y);
        self.recompute_floor();
        self.refresh_active();
    }

    fn update_stage(&mut self, player_y: f32, now: f64) {
        let stage = classify_stage(
            player_y,
            self.tuning.clouds_threshold,
            self.tuning.asteroids_threshold,
        );
        if stage != self.stage {
            info!("Stage {} -> {} at y={:.0}", self.stage.as_str(), stage.as_str(), player_y);
            self.crossfade = Some(Crossfade {
                from: self.stage,
                started_at: now,
            });
            self.stage = stage;
        }

        if let Some((_, t)) = self.crossfade(now) {
            if t >= 1.0 {
                self.crossfade = None;
            }
        }
    }

    fn generate_ahead(&mut self, player_y: f32) {
        for _ in 0..self.tuning.max_chunks_per_tick {
            if player_y >= self.next_chunk_y + self.tuning.trigger_distance {
                break;
            }
            if self.tiles.len() >= self.tuning.max_tiles {
                if !self.generation_refused {
                    warn!(
                        "Tile ceiling reached ({} tiles), generation paused",
                        self.tiles.len()
                    );
                    self.generation_refused = true;
                }
                break;
            }
            self.generation_refused = false;

            let y = self.next_chunk_y;
            self.generate_chunk(self.stage, y);
            self.next_chunk_y -= self.tuning.chunk_height();
        }
    }

    /// Fill the band `[y, y + chunk_height)` from a random template of `stage`
    fn generate_chunk(&mut self, stage: Stage, y: f32) {
        let count = self.patterns.get(stage).len();
        if count == 0 {
            return;
        }
        let index = self.rng.random_range(0..count);
        let pattern = self.patterns.get(stage)[index].clone();
        let placed = self.place_pattern(&pattern, y, self.tuning.chunk_height_rows as usize);
        debug!(
            "Generated {} chunk #{} at y={:.0} ({} tiles, {} stored)",
            stage.as_str(),
            index,
            y,
            placed,
            self.tiles.len()
        );
    }

    /// Materialize the non-empty cells of the first `max_rows` rows of `pattern`
    fn place_pattern(&mut self, pattern: &Pattern, y: f32, max_rows: usize) -> usize {
        let size = self.tuning.tile_size;
        let mut placed = 0;
        for (row, col, kind) in pattern.cells().filter(|(r, _, _)| *r < max_rows) {
            let id = self.next_id;
            self.next_id += 1;
            self.tiles.push(Tile::new(
                id,
                col as f32 * size,
                y + row as f32 * size,
                size,
                kind,
            ));
            placed += 1;
        }
        placed
    }

    fn prune_below(&mut self, player_y: f32) {
        let limit = player_y + self.tuning.prune_distance_chunks * self.tuning.chunk_height();
        let before = self.tiles.len();
        self.tiles.retain(|t| t.y <= limit);
        let pruned = before - self.tiles.len();
        if pruned > 0 {
            debug!("Pruned {} tiles below y={:.0}", pruned, limit);
        }
    }

    fn recompute_floor(&mut self) {
        if let Some(bottom) = self.tiles.iter().map(|t| t.bottom()).reduce(f32::max) {
            self.floor = bottom;
        }
    }

    fn refresh_active(&mut self) {
        self.active.clear();
        self.active.extend(
            self.tiles
                .iter()
                .filter(|t| t.active)
                .map(|t| ActiveTile {
                    id: t.id,
                    rect: t.rect(),
                }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn world() -> World {
        World::new(&WorldTuning::default(), 42)
    }

    #[test]
    fn test_classify_stage_at_thresholds() {
        assert_eq!(classify_stage(-799.0, -800.0, -1600.0), Stage::Grass);
        assert_eq!(classify_stage(-800.0, -800.0, -1600.0), Stage::Clouds);
        assert_eq!(classify_stage(-801.0, -800.0, -1600.0), Stage::Clouds);
        assert_eq!(classify_stage(-1599.0, -800.0, -1600.0), Stage::Clouds);
        assert_eq!(classify_stage(-1601.0, -800.0, -1600.0), Stage::Asteroids);
    }

    #[test]
    fn test_initial_world() {
        let world = world();
        assert_eq!(world.stage(), Stage::Grass);
        assert_eq!(world.next_chunk_y(), -320.0);
        assert_eq!(world.game_over_limit(), 480.0);
        assert_eq!(world.active_tiles().len(), world.tiles().len());
        assert!(world.tiles().iter().all(|t| t.kind != TileKind::Empty));
    }

    #[test]
    fn test_generates_chunk_within_trigger_distance() {
        let mut world = world();
        world.next_chunk_y = -160.0;
        let before = world.tiles().len();

        world.update(-100.0, 0.0);

        assert_eq!(world.next_chunk_y(), -160.0 - 10.0 * 32.0);
        let new_tiles = &world.tiles()[before..];
        assert!(!new_tiles.is_empty());
        assert!(new_tiles.iter().all(|t| t.y >= -160.0 && t.y < 160.0));
    }

    #[test]
    fn test_no_generation_outside_trigger_distance() {
        let mut world = world();
        let before = world.tiles().len();
        world.update(400.0, 0.0);
        assert_eq!(world.tiles().len(), before);
        assert_eq!(world.next_chunk_y(), -320.0);
    }

    #[test]
    fn test_generation_is_capped_per_tick() {
        let mut tuning = WorldTuning::default();
        tuning.max_chunks_per_tick = 3;
        let mut world = World::new(&tuning, 1);
        world.update(-5000.0, 0.0);
        assert_eq!(world.next_chunk_y(), -320.0 - 3.0 * 320.0);
    }

    #[test]
    fn test_chunks_never_overlap() {
        let mut world = world();
        let mut ids = HashSet::new();
        let mut cells = HashSet::new();
        let mut y = 400.0;
        while y > -3000.0 {
            world.update(y, 0.0);
            for t in world.tiles() {
                if ids.insert(t.id) {
                    let cell = (t.x as i32, t.y as i32);
                    assert!(cells.insert(cell), "duplicate tile at {:?}", cell);
                }
            }
            y -= 20.0;
        }
        assert!(ids.len() > 100);
    }

    #[test]
    fn test_stepping_is_idempotent_and_fades() {
        let mut world = world();
        let id = world.tiles()[0].id;

        world.on_tile_stepped(id, 1000.0);
        world.on_tile_stepped(id, 1400.0);
        assert_eq!(world.tile(id).unwrap().fade_started_at, Some(1000.0));

        world.update(400.0, 1750.0);
        let tile = world.tile(id).unwrap();
        assert!((tile.alpha - 0.5).abs() < 1e-6);
        assert!(world.active_tiles().iter().any(|a| a.id == id));

        world.update(400.0, 2500.0);
        let tile = world.tile(id).unwrap();
        assert!(!tile.active);
        assert_eq!(tile.alpha, 0.0);
        // Still stored for rendering, but out of the collision set
        assert!(world.active_tiles().iter().all(|a| a.id != id));
    }

    #[test]
    fn test_advance_fades_drops_expired_tiles() {
        let mut world = world();
        let id = world.tiles()[0].id;
        world.on_tile_stepped(id, 0.0);

        world.advance_fades(1499.0);
        assert!(world.active_tiles().iter().any(|a| a.id == id));

        world.advance_fades(1500.0);
        assert!(world.active_tiles().iter().all(|a| a.id != id));
        // A later update at the same time changes nothing
        let active = world.active_tiles().len();
        world.update(400.0, 1500.0);
        assert_eq!(world.active_tiles().len(), active);
    }

    #[test]
    fn test_pruning_raises_floor() {
        let mut world = world();
        // Climb far enough that the starting screen falls out of range
        let mut y = 400.0;
        while y > -900.0 {
            world.update(y, 0.0);
            y -= 50.0;
        }
        let limit = y + 50.0 + 2.0 * 320.0;
        assert!(world.tiles().iter().all(|t| t.y <= limit));
        assert!(world.game_over_limit() < 480.0);
        let lowest = world.tiles().iter().map(|t| t.bottom()).fold(f32::MIN, f32::max);
        assert_eq!(world.game_over_limit(), lowest);
    }

    #[test]
    fn test_floor_kept_when_empty() {
        let mut world = world();
        let floor = world.game_over_limit();
        world.tiles.clear();
        world.update(400.0, 0.0);
        assert_eq!(world.game_over_limit(), floor);
    }

    #[test]
    fn test_tile_ceiling_refuses_generation() {
        let mut tuning = WorldTuning::default();
        tuning.max_tiles = 10;
        let mut world = World::new(&tuning, 7);
        let before = world.tiles().len();
        assert!(before >= 10);

        world.update(-100.0, 0.0);
        assert_eq!(world.tiles().len(), before);
        assert_eq!(world.next_chunk_y(), -320.0);
    }

    #[test]
    fn test_missing_patterns_is_a_no_op() {
        let tuning = WorldTuning::default();
        let map = Pattern::from_rows(INITIAL_MAP);
        let mut world = World::with_map(&tuning, 0, &map, StagePatterns::default());
        let before = world.tiles().len();
        world.update(-100.0, 0.0);
        assert_eq!(world.tiles().len(), before);
    }

    #[test]
    fn test_stage_change_starts_crossfade() {
        let mut world = world();
        world.update(-900.0, 10_000.0);
        assert_eq!(world.stage(), Stage::Clouds);
        assert_eq!(world.crossfade(10_500.0), Some((Stage::Grass, 0.5)));

        world.update(-900.0, 11_000.0);
        assert_eq!(world.crossfade(11_000.0), None);

        world.update(-2000.0, 12_000.0);
        assert_eq!(world.stage(), Stage::Asteroids);
        assert_eq!(world.crossfade(12_000.0), Some((Stage::Clouds, 0.0)));
    }

    #[test]
    fn test_generated_tiles_match_stage() {
        let mut world = world();
        world.update(-2000.0, 0.0);
        world.next_chunk_y = -4000.0;
        world.update(-3900.0, 0.0);

        let high: Vec<_> = world.tiles().iter().filter(|t| t.y < -3000.0).collect();
        assert!(!high.is_empty());
        assert!(high.iter().all(|t| t.kind == TileKind::Asteroid));
    }

    #[test]
    fn test_same_seed_same_world() {
        let mut a = World::new(&WorldTuning::default(), 99);
        let mut b = World::new(&WorldTuning::default(), 99);
        for i in 0..40 {
            let y = 300.0 - i as f32 * 60.0;
            a.update(y, 0.0);
            b.update(y, 0.0);
        }
        assert_eq!(a.tiles(), b.tiles());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_stage_is_pure_in_y(y in -5000.0f32..1000.0) {
                let tuning = WorldTuning::default();
                let mut world = World::new(&tuning, 3);
                world.update(y, 0.0);
                prop_assert_eq!(
                    world.stage(),
                    classify_stage(y, tuning.clouds_threshold, tuning.asteroids_threshold)
                );
            }

            #[test]
            fn prop_chunk_boundaries_strictly_descend(steps in prop::collection::vec(-300.0f32..100.0, 1..60)) {
                let mut world = World::new(&WorldTuning::default(), 5);
                let chunk = world.tuning().chunk_height();
                let mut y = 400.0f32;
                let mut last = world.next_chunk_y();
                for step in steps {
                    y += step;
                    world.update(y, 0.0);
                    let next = world.next_chunk_y();
                    prop_assert!(next <= last);
                    prop_assert_eq!(((last - next) / chunk).fract(), 0.0);
                    last = next;
                }
            }
        }
    }
}

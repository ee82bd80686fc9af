//! Simulation loop orchestration
//!
//! One `tick` = input → player → tile landings → world → score → game-over.
//! The engine only sequences calls; player and world own their state.

use glam::Vec2;
use log::info;

use super::animation::Action;
use super::draw::{Renderer, SpriteDraw};
use super::hitbox::{HitboxTable, Rect};
use super::input::TickInput;
use super::player::{Player, landed_tiles};
use super::world::World;
use crate::consts::{SPRITE_HEIGHT, SPRITE_WIDTH, WORLD_WIDTH};
use crate::tuning::{GameOverPolicy, Tuning};

/// Zero-argument notification fired when a session ends
pub type GameOverCallback = Box<dyn FnMut()>;

/// The game session driver
pub struct Engine {
    tuning: Tuning,
    player: Player,
    world: World,
    score: u64,
    running: bool,
    game_over: bool,
    /// When the player first dropped below the floor (grace policy)
    below_floor_since: Option<f64>,
    on_game_over: Option<GameOverCallback>,
    /// Session seed, for logging and replay
    seed: u64,
    ticks: u64,
}

impl Engine {
    /// New session, stopped until `start`
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        let world = World::new(&tuning.world, seed);
        let player = Player::new(spawn_point(&tuning, &world), &tuning);
        Self {
            tuning,
            player,
            world,
            score: 0,
            running: false,
            game_over: false,
            below_floor_since: None,
            on_game_over: None,
            seed,
            ticks: 0,
        }
    }

    pub fn set_game_over_callback(&mut self, callback: impl FnMut() + 'static) {
        self.on_game_over = Some(Box::new(callback));
    }

    pub fn start(&mut self) {
        if !self.game_over && !self.running {
            info!("Session started (seed {})", self.seed);
            self.running = true;
        }
    }

    /// Takes effect from the next tick
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Fresh player and world; the game-over callback fires again for the new session
    pub fn restart(&mut self, seed: u64) {
        self.reset(seed);
        self.start();
    }

    /// Fresh player and world, left stopped (back at the menu)
    pub fn reset(&mut self, seed: u64) {
        self.world = World::new(&self.tuning.world, seed);
        self.player = Player::new(spawn_point(&self.tuning, &self.world), &self.tuning);
        self.score = 0;
        self.game_over = false;
        self.running = false;
        self.below_floor_since = None;
        self.seed = seed;
        self.ticks = 0;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Live hitbox table, for the debug editor
    pub fn hitboxes_mut(&mut self) -> &mut HitboxTable {
        self.player.hitboxes_mut()
    }

    /// Advance one tick at wall-clock time `now` (ms). No-op unless running.
    pub fn tick(&mut self, input: &TickInput, now: f64) {
        if !self.running {
            return;
        }
        self.ticks += 1;

        // Tiles whose fade ran out stop colliding before the player moves
        self.world.advance_fades(now);
        self.player.face_toward(input);
        let contacts = self.player.update(input, self.world.active_tiles());
        for id in landed_tiles(&contacts) {
            self.world.on_tile_stepped(id, now);
        }

        let y = self.player.pos().y;
        self.world.update(y, now);
        self.update_score(y);

        if self.fell_out(y, now) {
            self.end_session();
        }
    }

    fn update_score(&mut self, y: f32) {
        let altitude = (-y / self.tuning.engine.score_divisor).floor();
        // Negative altitude saturates to 0
        let score = altitude as u64 * self.world.stage().multiplier();
        self.score = self.score.max(score);
    }

    fn fell_out(&mut self, y: f32, now: f64) -> bool {
        if y <= self.world.game_over_limit() {
            self.below_floor_since = None;
            return false;
        }
        match self.tuning.engine.game_over {
            GameOverPolicy::Immediate => true,
            GameOverPolicy::Grace { millis } => {
                let since = *self.below_floor_since.get_or_insert(now);
                now - since >= millis
            }
        }
    }

    fn end_session(&mut self) {
        info!(
            "Game over: score {} after {} ticks (stage {})",
            self.score,
            self.ticks,
            self.world.stage().as_str()
        );
        self.running = false;
        self.game_over = true;
        if let Some(callback) = self.on_game_over.as_mut() {
            callback();
        }
    }

    /// Top of the visible band in world coordinates
    pub fn camera_y(&self) -> f32 {
        let view = self.tuning.engine.viewport_height;
        let target = self.player.pos().y - view / 2.0;
        target.min(self.world.game_over_limit() - view)
    }

    /// Issue the frame's draw calls in screen space
    pub fn draw(&self, renderer: &mut impl Renderer, now: f64, show_hitboxes: bool) {
        match self.world.crossfade(now) {
            Some((from, t)) => {
                renderer.draw_background(from, 1.0);
                renderer.draw_background(self.world.stage(), t);
            }
            None => renderer.draw_background(self.world.stage(), 1.0),
        }

        let camera = self.camera_y();
        let view = self.tuning.engine.viewport_height;
        let to_screen = |r: Rect| Rect::new(r.x, r.y - camera, r.w, r.h);

        for tile in self.world.tiles() {
            if tile.alpha <= 0.0 || tile.bottom() < camera || tile.y > camera + view {
                continue;
            }
            renderer.draw_tile(to_screen(tile.rect()), tile.kind, tile.alpha);
        }

        let pos = self.player.pos();
        let scale = self.player.sprite_scale();
        let sprite = Rect::new(pos.x, pos.y, SPRITE_WIDTH * scale, SPRITE_HEIGHT * scale);
        renderer.draw_sprite(&SpriteDraw {
            rect: to_screen(sprite),
            action: self.player.action(),
            frame: self.player.animation().frame_index(),
            facing: self.player.facing(),
        });

        if show_hitboxes {
            renderer.draw_hitbox(to_screen(sprite));
            renderer.draw_hitbox(to_screen(self.player.hitbox()));
        }

        renderer.draw_score(self.score);
    }
}

/// Standing on the bottom row, centered
fn spawn_point(tuning: &Tuning, world: &World) -> Vec2 {
    let scale = tuning.animation.sprite_scale;
    let ground = world.game_over_limit() - tuning.world.tile_size;
    let feet = tuning.hitboxes.get(Action::Idle).bottom_offset(scale);
    Vec2::new((WORLD_WIDTH - SPRITE_WIDTH * scale) / 2.0, ground - feet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::TICK_MS;
    use crate::sim::tile::TileKind;
    use crate::sim::world::Stage;
    use std::cell::Cell;
    use std::rc::Rc;

    fn running(tuning: Tuning) -> Engine {
        let mut engine = Engine::new(tuning, 11);
        engine.start();
        engine
    }

    fn idle() -> TickInput {
        TickInput::default()
    }

    fn counter(engine: &mut Engine) -> Rc<Cell<u32>> {
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        engine.set_game_over_callback(move || c.set(c.get() + 1));
        calls
    }

    /// Push the player below the floor, falling
    fn drop_below_floor(engine: &mut Engine) {
        let floor = engine.world.game_over_limit();
        engine.player.set_motion(Vec2::new(-200.0, floor + 50.0), Vec2::new(0.0, 1.0));
    }

    /// Hitbox bottom rests on an active tile under it
    fn grounded_on_active_tile(engine: &Engine) -> bool {
        let hitbox = engine.player().hitbox();
        engine.world().active_tiles().iter().any(|t| {
            (t.rect.y - hitbox.bottom()).abs() < 1e-3
                && t.rect.x < hitbox.right()
                && t.rect.right() > hitbox.x
        })
    }

    #[derive(Default)]
    struct Recorder {
        backgrounds: Vec<(Stage, f32)>,
        tiles: Vec<(Rect, TileKind, f32)>,
        sprites: Vec<SpriteDraw>,
        hitboxes: Vec<Rect>,
        scores: Vec<u64>,
    }

    impl Renderer for Recorder {
        fn draw_background(&mut self, stage: Stage, alpha: f32) {
            self.backgrounds.push((stage, alpha));
        }

        fn draw_tile(&mut self, rect: Rect, kind: TileKind, alpha: f32) {
            self.tiles.push((rect, kind, alpha));
        }

        fn draw_sprite(&mut self, sprite: &SpriteDraw) {
            self.sprites.push(*sprite);
        }

        fn draw_score(&mut self, score: u64) {
            self.scores.push(score);
        }

        fn draw_hitbox(&mut self, rect: Rect) {
            self.hitboxes.push(rect);
        }
    }

    #[test]
    fn test_spawns_grounded() {
        let mut engine = running(Tuning::default());
        engine.tick(&idle(), 0.0);
        assert!(engine.player().on_ground());
        assert_eq!(engine.player().hitbox().bottom(), 448.0);
        assert!(!engine.is_game_over());
    }

    #[test]
    fn test_stopped_engine_does_nothing() {
        let mut engine = Engine::new(Tuning::default(), 1);
        let before = engine.player().pos();
        engine.tick(&idle(), 0.0);
        assert_eq!(engine.player().pos(), before);
        assert_eq!(engine.ticks(), 0);

        engine.start();
        engine.tick(&idle(), 16.0);
        engine.stop();
        engine.tick(&idle(), 32.0);
        assert_eq!(engine.ticks(), 1);
    }

    #[test]
    fn test_score_is_stage_weighted() {
        let mut engine = running(Tuning::default());
        engine.player.set_motion(Vec2::new(-200.0, -500.0), Vec2::ZERO);
        engine.tick(&idle(), 0.0);
        // y ≈ -499.7 in grass
        assert_eq!(engine.score(), 49);

        engine.player.set_motion(Vec2::new(-200.0, -1000.0), Vec2::ZERO);
        engine.tick(&idle(), 16.0);
        assert_eq!(engine.world().stage(), Stage::Clouds);
        assert_eq!(engine.score(), 99 * 2);
    }

    #[test]
    fn test_score_never_drops_when_descending() {
        let mut engine = running(Tuning::default());
        engine.player.set_motion(Vec2::new(-200.0, -300.0), Vec2::ZERO);
        engine.tick(&idle(), 0.0);
        let high = engine.score();
        assert!(high > 0);

        engine.player.set_motion(Vec2::new(-200.0, -100.0), Vec2::ZERO);
        engine.tick(&idle(), 16.0);
        assert_eq!(engine.score(), high);
    }

    #[test]
    fn test_immediate_game_over_fires_once() {
        let mut engine = running(Tuning::default());
        let calls = counter(&mut engine);

        drop_below_floor(&mut engine);
        engine.tick(&idle(), 0.0);
        assert!(engine.is_game_over());
        assert!(!engine.is_running());
        assert_eq!(calls.get(), 1);

        engine.start();
        engine.tick(&idle(), 16.0);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_grace_game_over_waits() {
        let mut tuning = Tuning::default();
        tuning.engine.game_over = GameOverPolicy::Grace { millis: 2000.0 };
        let mut engine = running(tuning);
        let calls = counter(&mut engine);

        drop_below_floor(&mut engine);
        engine.tick(&idle(), 1000.0);
        engine.tick(&idle(), 2500.0);
        assert!(engine.is_running());
        assert_eq!(calls.get(), 0);

        engine.tick(&idle(), 3000.0);
        assert!(engine.is_game_over());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_grace_resets_above_floor() {
        let mut tuning = Tuning::default();
        tuning.engine.game_over = GameOverPolicy::Grace { millis: 2000.0 };
        let mut engine = running(tuning);

        drop_below_floor(&mut engine);
        engine.tick(&idle(), 0.0);
        engine.player.set_motion(Vec2::new(-200.0, 0.0), Vec2::ZERO);
        engine.tick(&idle(), 1500.0);
        drop_below_floor(&mut engine);
        engine.tick(&idle(), 2500.0);
        assert!(engine.is_running());
    }

    #[test]
    fn test_restart_rearms_callback() {
        let mut engine = running(Tuning::default());
        let calls = counter(&mut engine);
        drop_below_floor(&mut engine);
        engine.tick(&idle(), 0.0);

        engine.restart(12);
        assert!(engine.is_running());
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.seed(), 12);
        drop_below_floor(&mut engine);
        engine.tick(&idle(), 16.0);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_reset_waits_for_start() {
        let mut engine = running(Tuning::default());
        engine.player.set_motion(Vec2::new(-200.0, -300.0), Vec2::ZERO);
        engine.tick(&idle(), 0.0);
        assert!(engine.score() > 0);

        engine.reset(5);
        assert!(!engine.is_running());
        assert!(!engine.is_game_over());
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.ticks(), 0);
        let spawn = engine.player().pos();
        engine.tick(&idle(), 16.0);
        assert_eq!(engine.player().pos(), spawn);

        engine.start();
        engine.tick(&idle(), 32.0);
        assert_eq!(engine.ticks(), 1);
    }

    #[test]
    fn test_camera_clamped_to_floor() {
        let mut engine = running(Tuning::default());
        engine.tick(&idle(), 0.0);
        // Near the ground the floor pins the view
        assert_eq!(engine.camera_y(), 0.0);

        engine.player.set_motion(Vec2::new(100.0, -400.0), Vec2::ZERO);
        assert_eq!(engine.camera_y(), -640.0);
    }

    #[test]
    fn test_landing_starts_tile_fade() {
        let mut engine = running(Tuning::default());
        engine.tick(&idle(), 100.0);
        let faded = engine
            .world()
            .tiles()
            .iter()
            .filter(|t| t.fade_started_at == Some(100.0))
            .count();
        assert!(faded >= 1);
    }

    #[test]
    fn test_player_drops_when_standing_tile_expires() {
        use crate::sim::patterns::Pattern;
        use crate::sim::world::StagePatterns;

        let mut engine = running(Tuning::default());
        let map = Pattern::from_rows(&["...g......"]);
        engine.world = World::with_map(&engine.tuning.world, 11, &map, StagePatterns::default());
        let scale = engine.player.sprite_scale();
        let feet = engine.tuning.hitboxes.get(Action::Idle).bottom_offset(scale);
        engine
            .player
            .set_motion(Vec2::new(112.0 - SPRITE_WIDTH * scale / 2.0, -feet), Vec2::ZERO);

        engine.tick(&idle(), 0.0);
        assert!(engine.player().on_ground());
        assert!(engine.world().tiles()[0].fade_started_at.is_some());

        let fade = engine.tuning.world.fade_millis;
        let mut i = 1;
        while engine.is_running() && (i as f64) * TICK_MS <= fade + 200.0 {
            engine.tick(&idle(), i as f64 * TICK_MS);
            if engine.player().on_ground() {
                assert!(grounded_on_active_tile(&engine), "tick {}: grounded off any active tile", i);
            }
            i += 1;
        }
        assert!(!engine.player().on_ground());
        assert!(engine.world().active_tiles().is_empty());
    }

    #[test]
    fn test_draw_pass() {
        let mut engine = running(Tuning::default());
        engine.tick(&idle(), 0.0);

        let mut recorder = Recorder::default();
        engine.draw(&mut recorder, 0.0, true);
        assert_eq!(recorder.backgrounds, vec![(Stage::Grass, 1.0)]);
        assert!(!recorder.tiles.is_empty());
        assert!(recorder
            .tiles
            .iter()
            .all(|(r, _, _)| r.bottom() >= 0.0 && r.y <= 480.0));
        assert_eq!(recorder.sprites.len(), 1);
        assert_eq!(recorder.sprites[0].action, Action::Idle);
        // Sprite bounds, then the collision box inside them
        assert_eq!(recorder.hitboxes.len(), 2);
        assert!(recorder.hitboxes[1].h < recorder.hitboxes[0].h);
        assert_eq!(recorder.scores, vec![engine.score()]);

        let mut plain = Recorder::default();
        engine.draw(&mut plain, 0.0, false);
        assert!(plain.hitboxes.is_empty());
    }

    #[test]
    fn test_draw_crossfades_background() {
        let mut engine = running(Tuning::default());
        engine.player.set_motion(Vec2::new(-200.0, -900.0), Vec2::ZERO);
        engine.tick(&idle(), 1000.0);

        let mut recorder = Recorder::default();
        engine.draw(&mut recorder, 1250.0, false);
        assert_eq!(
            recorder.backgrounds,
            vec![(Stage::Grass, 1.0), (Stage::Clouds, 0.25)]
        );
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn input() -> impl Strategy<Value = TickInput> {
            (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
                |(left, right, jump, down)| TickInput {
                    left,
                    right,
                    jump,
                    down,
                },
            )
        }

        proptest! {
            #[test]
            fn prop_score_never_decreases(inputs in prop::collection::vec(input(), 1..300)) {
                let mut engine = running(Tuning::default());
                let mut last = 0;
                for (i, input) in inputs.iter().enumerate() {
                    engine.tick(input, i as f64 * TICK_MS);
                    prop_assert!(engine.score() >= last);
                    last = engine.score();
                }
            }

            #[test]
            fn prop_grounded_means_flush(inputs in prop::collection::vec(input(), 1..300)) {
                let mut engine = running(Tuning::default());
                for (i, input) in inputs.iter().enumerate() {
                    engine.tick(input, i as f64 * TICK_MS);
                    if engine.player().on_ground() {
                        prop_assert!(
                            grounded_on_active_tile(&engine),
                            "grounded with hitbox bottom at {}", engine.player().hitbox().bottom()
                        );
                    }
                }
            }
        }
    }
}

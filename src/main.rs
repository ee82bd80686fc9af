//! Skyward entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::{Cell, RefCell};
    use std::collections::HashSet;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, HtmlInputElement, KeyboardEvent};

    use skyward::highscores::{LEADERBOARD_SIZE, Leaderboard, ScoreTable, SessionOutcome};
    use skyward::renderer::{RenderState, SceneBuilder};
    use skyward::sim::{Action, Engine, HitboxSide, InputSource, Key, TickInput};
    use skyward::{Settings, Tuning};

    /// Key state kept current by DOM events between frames
    #[derive(Default)]
    struct Keyboard {
        down: HashSet<Key>,
    }

    impl Keyboard {
        fn map(code: &str) -> Option<Key> {
            match code {
                "ArrowLeft" | "KeyA" => Some(Key::Left),
                "ArrowRight" | "KeyD" => Some(Key::Right),
                "ArrowUp" | "KeyW" | "Space" => Some(Key::Jump),
                "ArrowDown" | "KeyS" => Some(Key::Down),
                _ => None,
            }
        }

        fn set(&mut self, key: Key, down: bool) {
            if down {
                self.down.insert(key);
            } else {
                self.down.remove(&key);
            }
        }

        fn clear(&mut self) {
            self.down.clear();
        }
    }

    impl InputSource for Keyboard {
        fn is_down(&self, key: Key) -> bool {
            self.down.contains(&key)
        }
    }

    /// Game instance holding all state
    struct Game {
        engine: Engine,
        render_state: Option<RenderState>,
        scene: SceneBuilder,
        keyboard: Keyboard,
        settings: Settings,
        leaderboard: Leaderboard<ScoreTable>,
        /// Raised by the engine's game-over callback; handled after the tick
        ended: Rc<Cell<bool>>,
        /// Stopped because the tab was hidden
        auto_paused: bool,
        /// Action whose hitbox the debug editor changes
        edit_action: Action,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        fn new(tuning: Tuning, seed: u64) -> Self {
            let scene = SceneBuilder::new(tuning.engine.viewport_width, tuning.engine.viewport_height);
            let mut engine = Engine::new(tuning, seed);
            let ended = Rc::new(Cell::new(false));
            let flag = ended.clone();
            engine.set_game_over_callback(move || flag.set(true));

            Self {
                engine,
                render_state: None,
                scene,
                keyboard: Keyboard::default(),
                settings: Settings::load(),
                leaderboard: Leaderboard::new(ScoreTable::load()),
                ended,
                auto_paused: false,
                edit_action: Action::Idle,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
            }
        }

        /// One tick per display refresh
        fn update(&mut self, time: f64) {
            let input = TickInput::sample(&self.keyboard);
            self.engine.tick(&input, time);

            if self.ended.replace(false) {
                self.record_session();
            }

            // Track frame times for FPS
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;

            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }
        }

        /// Render the current frame
        fn render(&mut self, time: f64) {
            self.scene.clear();
            self.engine
                .draw(&mut self.scene, time, self.settings.show_hitboxes);

            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(self.scene.vertices()) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        fn record_session(&mut self) {
            let name = self.settings.effective_name();
            let score = self.engine.score();
            match self.leaderboard.record_session(&name, score) {
                Ok(SessionOutcome::NewBest) => log::info!("New best for {}: {}", name, score),
                Ok(_) => {}
                Err(e) => log::warn!("Could not record score: {}", e),
            }
            self.leaderboard.store().save();
            show_game_over(score, &self.leaderboard);
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            if let Some(el) = document.query_selector("#hud-score .hud-value").ok().flatten() {
                el.set_text_content(Some(&self.engine.score().to_string()));
            }

            if let Some(el) = document.query_selector("#hud-stage .hud-value").ok().flatten() {
                el.set_text_content(Some(self.engine.world().stage().as_str()));
            }

            if let Some(el) = document.get_element_by_id("hud-fps") {
                if self.settings.show_fps {
                    let _ = el.set_attribute("class", "hud-item");
                    el.set_text_content(Some(&format!("{} fps", self.fps)));
                } else {
                    let _ = el.set_attribute("class", "hud-item hidden");
                }
            }

            if let Some(el) = document.get_element_by_id("hud-hitbox") {
                if self.settings.show_hitboxes {
                    let player = self.engine.player();
                    let hb = player.hitboxes().get(self.edit_action);
                    let _ = el.set_attribute("class", "hud-item");
                    el.set_text_content(Some(&format!(
                        "{} | edit {} x{} y{} w{} h{}",
                        player.debug_readout(),
                        self.edit_action.as_str(),
                        hb.offset_x,
                        hb.offset_y,
                        hb.width,
                        hb.height
                    )));
                } else {
                    let _ = el.set_attribute("class", "hud-item hidden");
                }
            }
        }

        fn restart(&mut self, seed: u64) {
            self.keyboard.clear();
            self.ended.set(false);
            self.engine.restart(seed);
            log::info!("Started new game with seed: {}", seed);
        }

        /// Abandon the session and wait on the start menu
        fn back_to_menu(&mut self, seed: u64) {
            self.keyboard.clear();
            self.ended.set(false);
            self.auto_paused = false;
            self.engine.reset(seed);
            log::info!("Back to menu");
        }

        /// Debug keys; returns true if the key was consumed
        fn handle_debug_key(&mut self, code: &str, shift: bool) -> bool {
            if code == "KeyH" {
                self.settings.toggle_hitboxes();
                self.settings.save();
                return true;
            }
            if !self.settings.show_hitboxes {
                return false;
            }

            let delta = if shift { -1.0 } else { 1.0 };
            let side = match code {
                "Digit1" => {
                    self.edit_action = Action::Idle;
                    return true;
                }
                "Digit2" => {
                    self.edit_action = Action::Walk;
                    return true;
                }
                "Digit3" => {
                    self.edit_action = Action::Jump;
                    return true;
                }
                "Digit4" => {
                    self.edit_action = Action::Crouch;
                    return true;
                }
                "KeyR" => {
                    self.engine.hitboxes_mut().reset(self.edit_action);
                    return true;
                }
                "KeyJ" => HitboxSide::Left,
                "KeyI" => HitboxSide::Top,
                "KeyL" => HitboxSide::Right,
                "KeyK" => HitboxSide::Bottom,
                _ => return false,
            };
            self.engine
                .hitboxes_mut()
                .adjust(self.edit_action, side, delta);
            true
        }
    }

    fn show_game_over(score: u64, leaderboard: &Leaderboard<ScoreTable>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        show(&document, "game-over");
        if let Some(el) = document.get_element_by_id("final-score") {
            el.set_text_content(Some(&score.to_string()));
        }
        if let Some(el) = document.get_element_by_id("leaderboard") {
            el.set_inner_html(&leaderboard_rows(leaderboard));
        }
    }

    /// `<li>` rows of the top scores
    fn leaderboard_rows(leaderboard: &Leaderboard<ScoreTable>) -> String {
        match leaderboard.ranked(LEADERBOARD_SIZE) {
            Ok(records) => records
                .iter()
                .enumerate()
                .map(|(i, r)| {
                    format!(
                        "<li><span class=\"rank\">{}</span> {} <span class=\"score\">{}</span></li>",
                        i + 1,
                        escape_html(&r.name),
                        r.best_score
                    )
                })
                .collect(),
            Err(e) => {
                log::warn!("Could not list scores: {}", e);
                String::new()
            }
        }
    }

    fn escape_html(text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
    }

    /// Tuning overrides from an inline `<script id="tuning" type="application/json">`
    fn load_tuning(document: &web_sys::Document) -> Tuning {
        let Some(json) = document
            .get_element_by_id("tuning")
            .and_then(|el| el.text_content())
            .filter(|text| !text.trim().is_empty())
        else {
            return Tuning::default();
        };

        match Tuning::from_json(&json) {
            Ok(tuning) => {
                log::info!("Loaded tuning overrides");
                tuning
            }
            Err(e) => {
                log::warn!("Ignoring tuning overrides: {}", e);
                Tuning::default()
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Skyward starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let tuning = load_tuning(&document);
        let view = (tuning.engine.viewport_width, tuning.engine.viewport_height);
        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(tuning, seed)));

        log::info!("Game initialized with seed: {}", seed);

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to get adapter");

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        match RenderState::new(surface, &adapter, width, height, view).await {
            Ok(render_state) => game.borrow_mut().render_state = Some(render_state),
            Err(e) => log::error!("Failed to create device: {}", e),
        }

        // Prefill the name field from saved settings
        if let Some(input) = document
            .get_element_by_id("player-name")
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        {
            input.set_value(&game.borrow().settings.player_name);
        }

        setup_keyboard(game.clone());
        setup_start_button(game.clone());
        setup_restart_button(game.clone());
        setup_menu_button(game.clone());
        setup_leaderboard_button(game.clone());
        setup_auto_pause(game.clone());

        // Start game loop; the engine stays stopped until the menu starts it
        request_animation_frame(game);

        log::info!("Skyward running!");
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let code = event.code();
                let mut g = game.borrow_mut();
                if let Some(key) = Keyboard::map(&code) {
                    g.keyboard.set(key, true);
                    event.prevent_default();
                } else if !event.repeat() && g.handle_debug_key(&code, event.shift_key()) {
                    event.prevent_default();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(key) = Keyboard::map(&event.code()) {
                    game.borrow_mut().keyboard.set(key, false);
                }
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.update(time);
            g.render(time);
            g.update_hud();
        }

        request_animation_frame(game);
    }

    fn hide(document: &web_sys::Document, id: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", "hidden");
        }
    }

    fn setup_start_button(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        if let Some(btn) = document.get_element_by_id("start-btn") {
            let doc = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut g = game.borrow_mut();
                if let Some(input) = doc
                    .get_element_by_id("player-name")
                    .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
                {
                    g.settings.set_player_name(&input.value());
                    g.settings.save();
                }
                hide(&doc, "menu");
                hide(&doc, "menu-leaderboard");
                show(&doc, "hud");
                g.engine.start();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_restart_button(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let doc = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let seed = js_sys::Date::now() as u64;
                game.borrow_mut().restart(seed);
                hide(&doc, "game-over");
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn show(document: &web_sys::Document, id: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", "");
        }
    }

    /// Game-over "main menu" button: drop the session and return to the start menu
    fn setup_menu_button(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        if let Some(btn) = document.get_element_by_id("menu-btn") {
            let doc = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let seed = js_sys::Date::now() as u64;
                game.borrow_mut().back_to_menu(seed);
                hide(&doc, "game-over");
                hide(&doc, "hud");
                hide(&doc, "menu-leaderboard");
                show(&doc, "menu");
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Start menu leaderboard toggle; refilled each time it opens
    fn setup_leaderboard_button(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        if let Some(btn) = document.get_element_by_id("leaderboard-btn") {
            let doc = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let Some(panel) = doc.get_element_by_id("menu-leaderboard") else {
                    return;
                };
                let hidden = panel
                    .get_attribute("class")
                    .is_some_and(|c| c.split_whitespace().any(|c| c == "hidden"));
                if hidden {
                    panel.set_inner_html(&leaderboard_rows(&game.borrow().leaderboard));
                    let _ = panel.set_attribute("class", "");
                } else {
                    let _ = panel.set_attribute("class", "hidden");
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let doc = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                if doc.visibility_state() == web_sys::VisibilityState::Hidden {
                    if g.engine.is_running() {
                        g.engine.stop();
                        g.auto_paused = true;
                        log::info!("Auto-paused (tab hidden)");
                    }
                } else if g.auto_paused {
                    g.auto_paused = false;
                    g.engine.start();
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur: keyup events are lost while unfocused
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().keyboard.clear();
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Skyward (native) starting...");
    log::info!("Native mode runs a headless demo - run with `trunk serve` for the web version");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(1);
    demo::run(seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Scripted climb through the simulation without a window
#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use std::cell::Cell;
    use std::rc::Rc;

    use skyward::consts::TICK_MS;
    use skyward::highscores::{Leaderboard, ScoreTable};
    use skyward::sim::{Engine, TickInput};
    use skyward::Tuning;

    const MAX_TICKS: u64 = 60 * 60 * 2;

    pub fn run(seed: u64) {
        let mut engine = Engine::new(Tuning::default(), seed);
        let ended = Rc::new(Cell::new(false));
        let flag = ended.clone();
        engine.set_game_over_callback(move || flag.set(true));
        engine.start();

        let mut now = 0.0;
        while !ended.get() && engine.ticks() < MAX_TICKS {
            let input = autopilot(&engine);
            engine.tick(&input, now);
            now += TICK_MS;
        }

        println!(
            "seed {}: score {} after {} ticks, reached {}",
            seed,
            engine.score(),
            engine.ticks(),
            engine.world().stage().as_str()
        );

        let mut board = Leaderboard::new(ScoreTable::new());
        match board.record_session("demo", engine.score()) {
            Ok(outcome) => log::info!("Recorded demo session: {:?}", outcome),
            Err(e) => log::warn!("Could not record demo session: {}", e),
        }
    }

    /// Hop toward the nearest tile above, tapping jump so every landing is a new press
    fn autopilot(engine: &Engine) -> TickInput {
        let player = engine.player();
        let hitbox = player.hitbox();
        let center = hitbox.x + hitbox.w / 2.0;

        let target = engine
            .world()
            .active_tiles()
            .iter()
            .filter(|t| t.rect.y < hitbox.y && t.rect.y > hitbox.y - 96.0)
            .min_by(|a, b| {
                let da = (a.rect.x + a.rect.w / 2.0 - center).abs();
                let db = (b.rect.x + b.rect.w / 2.0 - center).abs();
                da.total_cmp(&db)
            })
            .map(|t| t.rect.x + t.rect.w / 2.0);

        let dx = target.map(|x| x - center).unwrap_or(0.0);
        TickInput {
            left: dx < -4.0,
            right: dx > 4.0,
            jump: player.on_ground() && engine.ticks() % 2 == 0,
            down: false,
        }
    }
}

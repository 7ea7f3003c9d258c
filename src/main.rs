//! Dinger entry point
//!
//! Handles platform-specific initialization and runs the game loop. The
//! scene-graph renderer lives in the host page; this shell feeds it frame
//! packets and forwards input into the simulation.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{KeyboardEvent, MouseEvent, TouchEvent};

    use dinger::audio::{AudioManager, SoundEffect};
    use dinger::consts::*;
    use dinger::scene::{self, BatSwing, DrawCommand};
    use dinger::sim::{
        Collider, FixedClock, GameEvent, GamePhase, GameState, tick, update_progression,
    };
    use dinger::{HighScores, Settings};

    // Render bridge: the host page registers window.dingerRender and owns
    // every mesh, material and light; it gets one packet per frame.
    #[wasm_bindgen(inline_js = "
        export function submit_frame(json) {
            if (window.dingerRender) {
                window.dingerRender(JSON.parse(json));
            }
        }
    ")]
    extern "C" {
        fn submit_frame(json: &str);
    }

    /// Everything the renderer needs for one frame
    #[derive(serde::Serialize)]
    struct FramePacket {
        draws: Vec<DrawCommand>,
        camera: [f32; 3],
        step_back: bool,
    }

    /// Game instance holding all state
    struct Game {
        state: GameState,
        clock: FixedClock,
        swing: BatSwing,
        collider: Collider,
        audio: AudioManager,
        settings: Settings,
        highscores: HighScores,
        last_time: f64,
        /// Home runs across all levels, for the leaderboard
        total_runs: u32,
        best_level: u32,
        /// One-shot inputs latched by the handlers
        swing_requested: bool,
        start_requested: bool,
        score_submitted: bool,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            let settings = Settings::load();
            let mut audio = AudioManager::new();
            audio.set_master_volume(settings.master_volume);
            audio.set_muted(settings.muted);
            Self {
                state: GameState::new(seed),
                clock: FixedClock::new(SIM_DT),
                swing: BatSwing::new(),
                collider: Collider::sphere_sampled(5, 8, COLLIDER_LEEWAY),
                audio,
                settings,
                highscores: HighScores::load(),
                last_time: 0.0,
                total_runs: 0,
                best_level: 1,
                swing_requested: false,
                start_requested: false,
                score_submitted: false,
            }
        }

        /// Run simulation ticks and handle their fallout
        fn update(&mut self, frame_time: f32) {
            if self.start_requested {
                self.start_requested = false;
                if self.state.phase != GamePhase::Playing {
                    self.state.start();
                    self.swing = BatSwing::new();
                    self.clock.reset();
                    self.total_runs = 0;
                    self.best_level = 1;
                    self.score_submitted = false;
                }
            }
            if self.swing_requested {
                self.swing_requested = false;
                self.swing.request();
            }

            let Game {
                state,
                clock,
                swing,
                collider,
                ..
            } = self;
            let alpha = clock.advance(frame_time, |dt| {
                swing.advance(dt);
                let input = swing.tick_input();
                tick(state, &input, collider, dt);
            });
            update_progression(state);
            state.blend_all(alpha);

            let mut step_back = false;
            for event in self.state.drain_events() {
                match event {
                    GameEvent::PitchThrown => self.audio.play(SoundEffect::Pitch),
                    GameEvent::BatContact => self.audio.play(SoundEffect::Crack),
                    GameEvent::Landed { home_run: true } => {
                        self.total_runs += 1;
                        self.audio.play(SoundEffect::HomeRun);
                    }
                    GameEvent::Landed { home_run: false } => {
                        self.audio.play(SoundEffect::NoHomeRun)
                    }
                    GameEvent::LevelAdvanced { level } => {
                        self.best_level = level as u32 + 1;
                        self.audio.play(SoundEffect::LevelUp);
                    }
                    GameEvent::GameOver => {
                        self.audio.play(SoundEffect::GameOver);
                        self.submit_score();
                    }
                    GameEvent::GameWon => {
                        self.audio.play(SoundEffect::Victory);
                        self.submit_score();
                    }
                    GameEvent::CameraStepBack => step_back = !self.settings.reduced_motion,
                    GameEvent::BallRetired => {}
                }
            }

            let packet = FramePacket {
                draws: scene::draw_list(&self.state),
                camera: scene::camera_target(&self.state).to_array(),
                step_back,
            };
            if let Ok(json) = serde_json::to_string(&packet) {
                submit_frame(&json);
            }
        }

        fn submit_score(&mut self) {
            if self.score_submitted {
                return;
            }
            self.score_submitted = true;
            let runs = self.total_runs + self.state.score;
            if let Some(rank) = self
                .highscores
                .add_score(runs, self.best_level, js_sys::Date::now())
            {
                log::info!("Run finished: {} home runs, rank {}", runs, rank);
                self.highscores.save();
            }
        }

        /// Update HUD elements in the DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            if let Some(el) = document.query_selector("#hud-score .hud-value").ok().flatten() {
                let spec = self.state.level_spec();
                el.set_text_content(Some(&format!("{}/{}", self.state.score, spec.target_runs)));
            }
            if let Some(el) = document.query_selector("#hud-level .hud-value").ok().flatten() {
                el.set_text_content(Some(&(self.state.level + 1).to_string()));
            }
            if let Some(el) = document
                .query_selector("#hud-pitches .hud-value")
                .ok()
                .flatten()
            {
                el.set_text_content(Some(&self.state.pitches_remaining.max(0).to_string()));
            }

            let overlay = |id: &str, visible: bool| {
                if let Some(el) = document.get_element_by_id(id) {
                    let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
                }
            };
            overlay("start-prompt", self.state.phase == GamePhase::NotStarted);
            overlay("game-over", self.state.phase == GamePhase::GameOver);
            overlay("victory", self.state.phase == GamePhase::Won);
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Dinger starting...");

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));
        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(game.clone());
        request_animation_frame(game);

        log::info!("Dinger running!");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Keyboard: space swings, arrows slide the batter, enter starts
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    " " => {
                        g.swing_requested = true;
                        g.audio.resume();
                    }
                    "Enter" => {
                        g.start_requested = true;
                        g.audio.resume();
                    }
                    "ArrowLeft" => g.swing.shift(-dinger::consts::BATTER_SHIFT_STEP),
                    "ArrowRight" => g.swing.shift(dinger::consts::BATTER_SHIFT_STEP),
                    "m" | "M" => {
                        let muted = !g.settings.muted;
                        g.settings.muted = muted;
                        g.settings.save();
                        g.audio.set_muted(muted);
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse: click swings (and doubles as the start gesture)
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                if g.state.phase == GamePhase::Playing {
                    g.swing_requested = true;
                } else {
                    g.start_requested = true;
                }
                g.audio.resume();
            });
            let _ = document
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch: tap swings, matching the mouse path
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                if g.state.phase == GamePhase::Playing {
                    g.swing_requested = true;
                } else {
                    g.start_requested = true;
                }
                g.audio.resume();
            });
            let _ = document
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            let frame_time = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                dinger::consts::SIM_DT
            };
            g.last_time = time;

            g.update(frame_time);
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Dinger (native) starting headless demo...");
    run_demo(42);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless demo: an auto-batter plays until the run ends. Exercises the
/// whole loop - pitching, contact, scoring, progression - without a
/// renderer attached.
#[cfg(not(target_arch = "wasm32"))]
fn run_demo(seed: u64) {
    use dinger::consts::*;
    use dinger::scene::BatSwing;
    use dinger::sim::{
        Collider, FixedClock, GameEvent, GamePhase, GameState, tick, update_progression,
    };

    let mut state = GameState::new(seed);
    let mut clock = FixedClock::new(SIM_DT);
    let mut swing = BatSwing::new();
    let collider = Collider::sphere_sampled(5, 8, COLLIDER_LEEWAY);

    state.start();

    let frame_time = 1.0 / 60.0;
    let mut total_runs = 0u32;
    for _ in 0..(300.0 / frame_time) as usize {
        // Auto-batter: line up with the pitch and swing as it arrives
        if let Some(ball) = state.ball.as_ref() {
            swing.batter_x = ball.center.x.clamp(-BATTER_SHIFT_MAX, BATTER_SHIFT_MAX);
            if !state.ball_hit && !swing.swinging() && ball.center.z > -3.0 {
                swing.request();
            }
        }

        let alpha = clock.advance(frame_time, |dt| {
            swing.advance(dt);
            let input = swing.tick_input();
            tick(&mut state, &input, &collider, dt);
        });
        update_progression(&mut state);
        state.blend_all(alpha);

        for event in state.drain_events() {
            match event {
                GameEvent::Landed { home_run: true } => {
                    total_runs += 1;
                    log::info!("HOME RUN #{total_runs}");
                }
                GameEvent::LevelAdvanced { level } => log::info!("level {} begins", level + 1),
                _ => {}
            }
        }

        if matches!(state.phase, GamePhase::GameOver | GamePhase::Won) {
            break;
        }
    }

    log::info!(
        "Demo over: {:?} at level {} with {} total home runs after {} steps",
        state.phase,
        state.level + 1,
        total_runs,
        clock.steps_taken()
    );
}

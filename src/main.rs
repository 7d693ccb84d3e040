//! Evil Circle entry point
//!
//! Handles platform-specific initialization and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Element, HtmlCanvasElement, KeyboardEvent, PointerEvent};

    use evil_circle::Settings;
    use evil_circle::audio::{self, SharedAudio, Sound, WebAudio};
    use evil_circle::render::{CanvasRenderer, hud_html};
    use evil_circle::sim::{Command, GameEvent, GameState, apply_command, tick};

    /// Game instance holding all state
    struct Game {
        state: GameState,
        renderer: CanvasRenderer,
        audio: SharedAudio,
        /// `#ballCount` element, if the page has one
        counter: Option<Element>,
    }

    impl Game {
        /// One animation frame: simulate, dispatch events, draw
        fn frame(&mut self, time: f64) {
            tick(&mut self.state, time);

            for event in self.state.drain_events() {
                match event {
                    GameEvent::CountsChanged => self.update_hud(),
                    other => {
                        if let Some(sound) = Sound::for_event(other) {
                            self.audio.borrow_mut().play(sound);
                        }
                    }
                }
            }

            self.renderer.render(&self.state, time);
        }

        fn handle_key(&mut self, key: &str, now: f64) {
            let Some(cmd) = Command::from_key(key) else {
                return;
            };
            apply_command(&mut self.state, cmd, now);
            if cmd == Command::Restart {
                self.update_hud();
            }
        }

        /// Update the counter element in DOM
        fn update_hud(&self) {
            if let Some(el) = &self.counter {
                el.set_inner_html(&hud_html(self.state.alive, self.state.eaten));
            }
        }
    }

    fn now() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or(0.0)
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).ok();

        log::info!("Evil Circle starting...");

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let canvas: HtmlCanvasElement = document
            .query_selector("canvas")?
            .ok_or_else(|| JsValue::from_str("no canvas"))?
            .dyn_into()?;

        // Sized once to the viewport; not resized later
        let width = window.inner_width()?.as_f64().unwrap_or(800.0);
        let height = window.inner_height()?.as_f64().unwrap_or(600.0);
        canvas.set_width(width as u32);
        canvas.set_height(height as u32);

        let settings = Settings::load();
        let seed = settings
            .seed
            .unwrap_or_else(|| js_sys::Date::now() as u64);

        let state = GameState::new(
            width as f32,
            height as f32,
            settings.ball_count,
            seed,
            now(),
        );
        let renderer = CanvasRenderer::new(&canvas, settings.glow)?;
        let audio = WebAudio::new_shared(settings.mixer(), seed.rotate_left(17));

        let game = Rc::new(RefCell::new(Game {
            state,
            renderer,
            audio,
            counter: document.get_element_by_id("ballCount"),
        }));
        game.borrow().update_hud();

        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(&window, game.clone())?;

        // Start frame loop
        request_animation_frame(game);

        log::info!("Evil Circle running!");
        Ok(())
    }

    fn setup_input_handlers(
        window: &web_sys::Window,
        game: Rc<RefCell<Game>>,
    ) -> Result<(), JsValue> {
        // Pointer down - only unlocks audio
        {
            let audio = game.borrow().audio.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: PointerEvent| {
                audio::unlock(&audio);
            });
            window.add_event_listener_with_callback(
                "pointerdown",
                closure.as_ref().unchecked_ref(),
            )?;
            closure.forget();
        }

        // Keyboard - unlock, movement, pause, restart
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                audio::unlock(&g.audio);
                g.handle_key(&event.key(), now());
            });
            window.add_event_listener_with_callback(
                "keydown",
                closure.as_ref().unchecked_ref(),
            )?;
            closure.forget();
        }

        Ok(())
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            log::error!("No window, frame loop stopped");
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        game.borrow_mut().frame(time);
        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Evil Circle (native) starting...");
    log::info!("Drawing needs a browser - build for wasm32 to play; running a headless chase instead");

    headless_chase();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Let a simple bot steer the evil circle until every ball is eaten
#[cfg(not(target_arch = "wasm32"))]
fn headless_chase() {
    use evil_circle::Settings;
    use evil_circle::consts::EVIL_STEP;
    use evil_circle::sim::{Command, Direction, GameState, apply_command, tick};

    const FRAME_MS: f64 = 1000.0 / 60.0;
    const MAX_FRAMES: u32 = 60 * 300;

    let settings = Settings::load();
    let seed = settings.seed.unwrap_or(1);
    let mut state = GameState::new(800.0, 600.0, settings.ball_count, seed, 0.0);

    for frame in 0..MAX_FRAMES {
        let now = frame as f64 * FRAME_MS;

        let target = state
            .balls
            .iter()
            .filter(|b| b.exists)
            .map(|b| b.pos)
            .min_by(|a, b| {
                a.distance(state.evil.pos)
                    .partial_cmp(&b.distance(state.evil.pos))
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

        if let Some(target) = target {
            let delta = target - state.evil.pos;
            let dir = if delta.x.abs() > delta.y.abs() {
                (delta.x.abs() > EVIL_STEP / 2.0)
                    .then_some(if delta.x < 0.0 { Direction::Left } else { Direction::Right })
            } else {
                (delta.y.abs() > EVIL_STEP / 2.0)
                    .then_some(if delta.y < 0.0 { Direction::Up } else { Direction::Down })
            };
            if let Some(dir) = dir {
                apply_command(&mut state, Command::Move(dir), now);
            }
        }

        tick(&mut state, now);
        state.drain_events();

        if state.is_game_over() {
            break;
        }
    }

    match state.elapsed_secs() {
        Some(secs) => println!("Ate all {} balls in {:.1}s of game time", state.eaten, secs),
        None => println!(
            "Gave up with {} of {} balls eaten",
            state.eaten,
            state.balls.len()
        ),
    }
}

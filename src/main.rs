//! Nova Strike entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent};

    use nova_strike::audio::AudioDirector;
    use nova_strike::consts::MAX_FRAME_DT;
    use nova_strike::render::CanvasRenderer;
    use nova_strike::sim::{ArenaBounds, GamePhase, GameState, TickInput, tick};

    /// Held-key flags sampled into a [`TickInput`] each frame.
    #[derive(Default)]
    struct HeldKeys {
        left: bool,
        right: bool,
        up: bool,
        down: bool,
        fire: bool,
    }

    /// Everything the browser shell owns: sim state plus the output adapters.
    struct App {
        state: GameState,
        audio: AudioDirector,
        renderer: Option<CanvasRenderer>,
        held: HeldKeys,
        toggle_pause: bool,
        reset_requested: bool,
        last_time: f64,
        last_phase: GamePhase,
        audio_unlocked: bool,
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("failed to init logger");

        log::info!("Nova Strike starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        // Match the backing store to CSS size at the device pixel ratio.
        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let seed = js_sys::Date::now() as u64;
        let aspect = width as f32 / height.max(1) as f32;
        let state = GameState::new(seed, ArenaBounds::from_aspect(aspect));
        log::info!("Game initialized with seed: {}", seed);

        let renderer = CanvasRenderer::new(&canvas);
        if renderer.is_none() {
            log::error!("2d canvas context unavailable");
        }

        let app = Rc::new(RefCell::new(App {
            state,
            audio: AudioDirector::new(),
            renderer,
            held: HeldKeys::default(),
            toggle_pause: false,
            reset_requested: false,
            last_time: 0.0,
            last_phase: GamePhase::Playing,
            audio_unlocked: false,
        }));

        setup_input_handlers(app.clone());
        setup_resize_handler(&canvas, app.clone());
        setup_restart_button(app.clone());

        request_animation_frame(app);

        log::info!("Nova Strike running!");
    }

    fn setup_input_handlers(app: Rc<RefCell<App>>) {
        let window = web_sys::window().unwrap();

        // Keydown: latch held keys, edge-trigger pause/reset, unlock audio.
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let key = event.key();
                if key == " " {
                    // Keep space from scrolling the page, repeats included.
                    event.prevent_default();
                }
                if event.repeat() {
                    return;
                }
                let mut app = app.borrow_mut();
                match key.as_str() {
                    "a" | "A" | "ArrowLeft" => app.held.left = true,
                    "d" | "D" | "ArrowRight" => app.held.right = true,
                    "w" | "W" | "ArrowUp" => app.held.up = true,
                    "s" | "S" | "ArrowDown" => app.held.down = true,
                    " " => app.held.fire = true,
                    "p" | "P" | "Escape" => app.toggle_pause = true,
                    "r" | "R" => app.reset_requested = true,
                    _ => {}
                }
                // Browsers only allow audio after a user gesture.
                if !app.audio_unlocked {
                    app.audio_unlocked = true;
                    app.audio.unlock();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyup: release held keys.
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut app = app.borrow_mut();
                match event.key().as_str() {
                    "a" | "A" | "ArrowLeft" => app.held.left = false,
                    "d" | "D" | "ArrowRight" => app.held.right = false,
                    "w" | "W" | "ArrowUp" => app.held.up = false,
                    "s" | "S" | "ArrowDown" => app.held.down = false,
                    " " => app.held.fire = false,
                    _ => {}
                }
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize_handler(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        let window = web_sys::window().unwrap();
        let canvas = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let window = web_sys::window().unwrap();
            let dpr = window.device_pixel_ratio();
            let width = (canvas.client_width() as f64 * dpr) as u32;
            let height = (canvas.client_height() as f64 * dpr) as u32;
            canvas.set_width(width);
            canvas.set_height(height);

            let mut app = app.borrow_mut();
            if let Some(ref mut renderer) = app.renderer {
                renderer.resize(width, height);
            }
            let aspect = width as f32 / height.max(1) as f32;
            app.state.set_bounds(ArenaBounds::from_aspect(aspect));
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_restart_button(app: Rc<RefCell<App>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        if let Some(btn) = document.get_element_by_id("restart") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                app.borrow_mut().reset_requested = true;
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            frame(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame(app: Rc<RefCell<App>>, time: f64) {
        {
            let mut guard = app.borrow_mut();
            let app = &mut *guard;

            // First frame has no baseline; tick with dt 0 and start timing.
            let dt = if app.last_time > 0.0 {
                (((time - app.last_time) / 1000.0) as f32).min(MAX_FRAME_DT)
            } else {
                0.0
            };
            app.last_time = time;

            if std::mem::take(&mut app.reset_requested)
                && app.state.phase == GamePhase::GameOver
            {
                app.state.reset(&mut app.audio);
            }

            let input = TickInput {
                move_left: app.held.left,
                move_right: app.held.right,
                move_up: app.held.up,
                move_down: app.held.down,
                fire: app.held.fire,
                toggle_pause: std::mem::take(&mut app.toggle_pause),
            };
            tick(&mut app.state, &input, dt, &mut app.audio);

            let phase = app.state.phase;
            if phase != app.last_phase {
                match phase {
                    GamePhase::Paused => app.audio.set_music_paused(true),
                    GamePhase::Playing if app.last_phase == GamePhase::Paused => {
                        app.audio.set_music_paused(false);
                    }
                    _ => {}
                }
                app.last_phase = phase;
            }

            if let Some(ref renderer) = app.renderer {
                renderer.draw(&app.state);
            }
            sync_hud(&app.state);
        }

        request_animation_frame(app);
    }

    /// Push score, health and level into the DOM and toggle the overlays.
    fn sync_hud(state: &GameState) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        if let Some(el) = document.get_element_by_id("score") {
            el.set_text_content(Some(&state.score.to_string()));
        }
        if let Some(el) = document.get_element_by_id("health") {
            el.set_text_content(Some(&state.display_health().to_string()));
        }
        if let Some(el) = document.get_element_by_id("level") {
            el.set_text_content(Some(&state.level.to_string()));
        }

        if let Some(el) = document.get_element_by_id("game-over") {
            if state.phase == GamePhase::GameOver {
                let _ = el.set_attribute("class", "overlay");
                if let Some(score_el) = document.get_element_by_id("final-score") {
                    score_el.set_text_content(Some(&state.score.to_string()));
                }
            } else {
                let _ = el.set_attribute("class", "overlay hidden");
            }
        }

        if let Some(el) = document.get_element_by_id("pause-overlay") {
            if state.phase == GamePhase::Paused {
                let _ = el.set_attribute("class", "overlay");
            } else {
                let _ = el.set_attribute("class", "overlay hidden");
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::time::{SystemTime, UNIX_EPOCH};

    use nova_strike::Tuning;
    use nova_strike::sim::{ArenaBounds, GameState, NullSink, TickInput, tick};

    env_logger::init();

    let tuning = match std::env::args().nth(1) {
        Some(path) => {
            let raw = match std::fs::read_to_string(&path) {
                Ok(raw) => raw,
                Err(err) => {
                    log::error!("failed to read tuning file {}: {}", path, err);
                    std::process::exit(1);
                }
            };
            match Tuning::from_json(&raw) {
                Ok(tuning) => tuning,
                Err(err) => {
                    log::error!("invalid tuning file {}: {}", path, err);
                    std::process::exit(1);
                }
            }
        }
        None => Tuning::default(),
    };

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0xA5A5_5A5A);
    log::info!("headless run with seed: {}", seed);

    let mut state = GameState::with_tuning(seed, ArenaBounds::from_aspect(16.0 / 9.0), tuning);
    let mut sink = NullSink;
    let input = TickInput {
        fire: true,
        ..TickInput::default()
    };

    let dt = 1.0 / 60.0;
    for _ in 0..600 {
        tick(&mut state, &input, dt, &mut sink);
    }

    println!(
        "after 10 simulated seconds: score {}, level {}, health {}, {} live entities",
        state.score,
        state.level,
        state.display_health(),
        state.store.len()
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

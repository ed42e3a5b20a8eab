//! Sky Ace entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlCanvasElement, MouseEvent, TouchEvent};

    use glam::Vec2;
    use sky_ace::audio::AudioManager;
    use sky_ace::briefing::{self, MissionBriefing};
    use sky_ace::consts::*;
    use sky_ace::platform::{PointerSlot, Viewport, client_to_playfield};
    use sky_ace::renderer::{HudInfo, RenderError, RenderState, build_scene};
    use sky_ace::{AppPhase, Difficulty, FrameOutcome, HostEvent, LoopDriver, Settings};

    /// How often the ambient sequencer is polled (ms)
    const AMBIENT_POLL_MS: i32 = 25;

    /// Game instance holding all state
    struct Game {
        driver: LoopDriver,
        render_state: Option<RenderState>,
        audio: AudioManager,
        settings: Settings,
        briefing: MissionBriefing,
        pointer: PointerSlot,
    }

    impl Game {
        fn new(settings: Settings) -> Self {
            let mut audio = AudioManager::new();
            audio.apply_settings(&settings, js_sys::Date::now());
            Self {
                driver: LoopDriver::new(),
                render_state: None,
                audio,
                settings,
                briefing: MissionBriefing::fallback(),
                pointer: PointerSlot::new(),
            }
        }

        /// Run one scheduled frame and present it
        fn frame(&mut self, epoch: u64, time: f64) -> FrameOutcome {
            let pointer = self.pointer.latest();
            let ready = self.render_state.is_some();
            let outcome = self.driver.frame(epoch, time, pointer, ready);
            if matches!(outcome, FrameOutcome::Stale | FrameOutcome::Skipped) {
                return outcome;
            }

            self.dispatch_host_events();
            self.render(time);
            outcome
        }

        /// Forward simulation notifications to audio and the DOM
        fn dispatch_host_events(&mut self) {
            let document = document();
            for event in self.driver.drain_host_events() {
                match event {
                    HostEvent::Sound(cue) => self.audio.play(cue),
                    HostEvent::Score(score) => {
                        set_text(&document, "hud-score", &score.to_string());
                    }
                    HostEvent::LevelUp(level) => log::debug!("HUD: power level {}", level),
                    HostEvent::GameOver { score } => {
                        self.audio.stop_ambient();
                        set_text(&document, "hud-score", &score.to_string());
                        set_text(&document, "final-score", &score.to_string());
                    }
                }
            }
        }

        /// Render the current frame
        fn render(&mut self, time: f64) {
            let Some(state) = self.driver.state() else { return };
            let hud = HudInfo {
                mission_name: &self.briefing.name,
                reduced_motion: self.settings.reduced_motion,
            };
            let scene = build_scene(state, &hud, time);

            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&scene.vertices) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        render_state.reconfigure();
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }

            let document = document();
            set_text(&document, "hud-status", &scene.status_line);
            match scene.banner {
                Some(banner) => {
                    set_text(&document, "banner-title", banner.title);
                    set_text(&document, "banner-subtitle", &banner.subtitle);
                    set_hidden(&document, "banner", false);
                }
                None => set_hidden(&document, "banner", true),
            }
        }

        /// Show the freshly received briefing in the menu
        fn show_briefing(&self) {
            let document = document();
            set_text(&document, "mission-name", &self.briefing.name);
            set_text(&document, "mission-objective", &format!("\"{}\"", self.briefing.objective));
            set_text(&document, "mission-callsign", &self.briefing.pilot_callsign);
            if let Some(el) = document.get_element_by_id("menu") {
                let _ = el.set_attribute("data-theme", self.briefing.theme.as_str());
            }
        }

        /// Leave a running session without ending it through game over
        fn abandon_session(&mut self, next: AppPhase) {
            if let Some(handle) = self.driver.stop(next) {
                let _ = window().cancel_animation_frame(handle);
            }
            self.audio.stop_ambient();
        }
    }

    fn window() -> web_sys::Window {
        web_sys::window().expect("no window")
    }

    fn document() -> Document {
        window().document().expect("no document")
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_hidden(document: &Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force("hidden", hidden);
        }
    }

    /// Overlays that are mutually exclusive
    const SCREENS: [&str; 4] = ["loading", "menu", "hud", "game-over"];

    fn show_only(document: &Document, screen: &str) {
        for id in SCREENS {
            set_hidden(document, id, id != screen);
        }
        // The status line lives in the HUD but stays up behind game over
        if screen == "game-over" {
            set_hidden(document, "hud", false);
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Sky Ace starting...");

        let document = document();
        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        // Fixed backing resolution; CSS scales the element
        canvas.set_width(PLAYFIELD_WIDTH as u32);
        canvas.set_height(PLAYFIELD_HEIGHT as u32);

        let settings = Settings::load();
        let game = Rc::new(RefCell::new(Game::new(settings)));

        setup_input_handlers(&canvas, game.clone());
        setup_menu(game.clone());
        setup_game_over_buttons(game.clone());
        setup_auto_stop(game.clone());
        setup_ambient_clock(game.clone());
        sync_menu_controls(&game.borrow().settings);

        fetch_briefing(game.clone());

        match init_renderer(canvas).await {
            Ok(render_state) => game.borrow_mut().render_state = Some(render_state),
            Err(e) => {
                // Frames keep being skipped; the menu still works
                log::error!("WebGPU unavailable: {}", e);
                set_hidden(&document, "gpu-error", false);
            }
        }

        log::info!("Sky Ace running!");
    }

    async fn init_renderer(canvas: HtmlCanvasElement) -> Result<RenderState, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        RenderState::new(
            surface,
            &adapter,
            PLAYFIELD_WIDTH as u32,
            PLAYFIELD_HEIGHT as u32,
        )
        .await
    }

    /// Enter the loading screen and request a new briefing
    fn fetch_briefing(game: Rc<RefCell<Game>>) {
        let epoch = {
            let mut g = game.borrow_mut();
            g.abandon_session(AppPhase::LoadingMission);
            g.driver.epoch()
        };
        show_only(&document(), "loading");

        wasm_bindgen_futures::spawn_local(async move {
            let briefing = briefing::generate().await;
            let mut g = game.borrow_mut();
            if !g.driver.briefing_ready(epoch) {
                log::debug!("Discarding stale briefing {}", briefing.name);
                return;
            }
            g.briefing = briefing;
            g.show_briefing();
            show_only(&document(), "menu");
        });
    }

    /// Start a session at the selected difficulty
    fn start_session(game: Rc<RefCell<Game>>) {
        let epoch = {
            let mut guard = game.borrow_mut();
            let g = &mut *guard;
            let now = js_sys::Date::now();
            g.audio.apply_settings(&g.settings, now);
            // Starting is a user gesture: the audio context may resume now
            g.audio.init();
            let epoch = g.driver.start(g.settings.difficulty, now as u64);
            g.pointer.clear();
            g.audio.start_ambient(now);
            epoch
        };
        show_only(&document(), "hud");
        request_animation_frame(game, epoch);
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>, epoch: u64) {
        let closure = {
            let game = game.clone();
            Closure::once(move |time: f64| {
                game_loop(game, epoch, time);
            })
        };
        if let Ok(handle) = window().request_animation_frame(closure.as_ref().unchecked_ref()) {
            game.borrow_mut().driver.set_pending(epoch, handle);
        }
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, epoch: u64, time: f64) {
        let outcome = game.borrow_mut().frame(epoch, time);
        if outcome.should_reschedule() {
            request_animation_frame(game, epoch);
        } else if outcome == FrameOutcome::Ended {
            let wreck_epoch = game.borrow().driver.epoch();
            request_wreck_frame(game, wreck_epoch);
        }
    }

    /// Keep drawing the destroyed craft, then show the game over screen
    fn request_wreck_frame(game: Rc<RefCell<Game>>, epoch: u64) {
        let closure = Closure::once(move |time: f64| {
            let showing = game.borrow().driver.show_wreck(epoch, time);
            if showing {
                game.borrow_mut().render(time);
                request_wreck_frame(game, epoch);
            } else if game.borrow().driver.phase() == AppPhase::GameOver
                && game.borrow().driver.epoch() == epoch
            {
                show_only(&document(), "game-over");
            }
        });
        let _ = window().request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn pointer_from_client(canvas: &HtmlCanvasElement, x: i32, y: i32) -> Option<Vec2> {
        let rect = canvas.get_bounding_client_rect();
        let viewport = Viewport {
            left: rect.left() as f32,
            top: rect.top() as f32,
            width: rect.width() as f32,
            height: rect.height() as f32,
        };
        client_to_playfield(Vec2::new(x as f32, y as f32), viewport)
    }

    fn touch_position(canvas: &HtmlCanvasElement, event: &TouchEvent) -> Option<Vec2> {
        let touch = event.touches().get(0)?;
        pointer_from_client(canvas, touch.client_x(), touch.client_y())
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let slot = game.borrow().pointer.clone();

        // Moves are tracked on the window so steering continues past the canvas edge
        {
            let slot = slot.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                if let Some(pos) = pointer_from_client(&canvas_clone, event.client_x(), event.client_y()) {
                    slot.store(pos);
                }
            });
            let _ = window()
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let slot = slot.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                if let Some(pos) = touch_position(&canvas_clone, &event) {
                    slot.store(pos);
                }
            });
            let _ = window()
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // A touch on the canvas both steers and suppresses the emulated mouse
        {
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(pos) = touch_position(&canvas_clone, &event) {
                    slot.store(pos);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Escape abandons the run
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                if event.key() == "Escape" && game.borrow().driver.phase() == AppPhase::Playing {
                    game.borrow_mut().abandon_session(AppPhase::Menu);
                    show_only(&document(), "menu");
                    log::info!("Session abandoned");
                }
            });
            let _ = window()
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn on_click(document: &Document, id: &str, handler: impl FnMut(MouseEvent) + 'static) {
        if let Some(btn) = document.get_element_by_id(id) {
            let closure = Closure::<dyn FnMut(MouseEvent)>::new(handler);
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Reflect settings on the menu's toggles and difficulty buttons
    fn sync_menu_controls(settings: &Settings) {
        let document = document();
        let on_off = |on: bool| if on { "ON" } else { "OFF" };
        set_text(&document, "sound-toggle", &format!("SOUND: {}", on_off(settings.sound_enabled)));
        set_text(
            &document,
            "motion-toggle",
            &format!("REDUCED MOTION: {}", on_off(settings.reduced_motion)),
        );

        for btn in difficulty_buttons(&document) {
            let selected = btn.get_attribute("data-difficulty").as_deref()
                == Some(settings.difficulty.as_str());
            let _ = btn.class_list().toggle_with_force("selected", selected);
        }
    }

    fn difficulty_buttons(document: &Document) -> Vec<Element> {
        let Ok(list) = document.query_selector_all("[data-difficulty]") else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.get(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn setup_menu(game: Rc<RefCell<Game>>) {
        let document = document();

        for btn in difficulty_buttons(&document) {
            let Some(difficulty) = btn
                .get_attribute("data-difficulty")
                .and_then(|d| Difficulty::from_str(&d))
            else {
                continue;
            };
            if btn.text_content().is_none_or(|t| t.trim().is_empty()) {
                btn.set_text_content(Some(difficulty.profile().label));
            }

            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                g.settings.difficulty = difficulty;
                g.settings.save();
                sync_menu_controls(&g.settings);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            on_click(&document, "sound-toggle", move |_| {
                let mut g = game.borrow_mut();
                let enabled = !g.settings.sound_enabled;
                g.settings.sound_enabled = enabled;
                g.settings.save();
                g.audio.set_enabled(enabled, js_sys::Date::now());
                sync_menu_controls(&g.settings);
            });
        }

        {
            let game = game.clone();
            on_click(&document, "motion-toggle", move |_| {
                let mut g = game.borrow_mut();
                g.settings.reduced_motion = !g.settings.reduced_motion;
                g.settings.save();
                sync_menu_controls(&g.settings);
            });
        }

        {
            let game = game.clone();
            on_click(&document, "new-mission-btn", move |_| fetch_briefing(game.clone()));
        }

        on_click(&document, "start-btn", move |_| {
            let phase = game.borrow().driver.phase();
            if matches!(phase, AppPhase::Menu | AppPhase::GameOver) {
                start_session(game.clone());
            }
        });
    }

    fn setup_game_over_buttons(game: Rc<RefCell<Game>>) {
        let document = document();

        {
            let game = game.clone();
            on_click(&document, "restart-btn", move |_| start_session(game.clone()));
        }

        on_click(&document, "menu-btn", move |_| fetch_briefing(game.clone()));
    }

    fn setup_auto_stop(game: Rc<RefCell<Game>>) {
        let window = window();
        let document = document();

        // Tab hidden: tear the session down, no orphaned frames
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut g = game.borrow_mut();
                    if g.driver.phase() == AppPhase::Playing {
                        g.abandon_session(AppPhase::Menu);
                        show_only(&document_clone, "menu");
                        log::info!("Session stopped (tab hidden)");
                    }
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur/focus: mute while away if requested
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.settings.mute_on_blur && g.audio.is_enabled() {
                    g.audio.set_enabled(false, js_sys::Date::now());
                    log::debug!("Muted (window blur)");
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.settings.sound_enabled && !g.audio.is_enabled() {
                    g.audio.set_enabled(true, js_sys::Date::now());
                }
            });
            let _ = window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_ambient_clock(game: Rc<RefCell<Game>>) {
        let closure = Closure::<dyn FnMut()>::new(move || {
            game.borrow_mut().audio.tick_ambient(js_sys::Date::now());
        });
        let _ = window().set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            AMBIENT_POLL_MS,
        );
        closure.forget();
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
    log::info!("Sky Ace (native) starting...");
    log::info!("The game runs in the browser - use `trunk serve` for the web version");

    headless_demo();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Fly one scripted session without a window and report the result
#[cfg(not(target_arch = "wasm32"))]
fn headless_demo() {
    use glam::Vec2;
    use sky_ace::{AppPhase, Difficulty, FrameOutcome, HostEvent, LoopDriver};

    let mut driver = LoopDriver::new();
    let epoch = driver.start(Difficulty::Intermediate, 2024);
    let mut now = 0.0;
    let mut frames = 0u32;

    // Sweep the craft across the screen for up to a minute of play
    while frames < 3_600 {
        now += 1000.0 / 60.0;
        let x = 400.0 + 300.0 * (now as f32 / 1500.0).sin();
        let outcome = driver.frame(epoch, now, Some(Vec2::new(x, 500.0)), true);
        frames += 1;

        for event in driver.drain_host_events() {
            if let HostEvent::LevelUp(level) = event {
                log::info!("Power level {} at frame {}", level, frames);
            }
        }
        if outcome == FrameOutcome::Ended {
            break;
        }
    }

    if let Some(state) = driver.state() {
        let status = if driver.phase() == AppPhase::GameOver { "shot down" } else { "survived" };
        println!(
            "Headless run {} after {} frames: score {}, power level {}",
            status, frames, state.player.score, state.power_level
        );
    }
}

//! Flappy Gates entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use web_sys::{
        Document, Element, HtmlAudioElement, HtmlButtonElement, HtmlCanvasElement, HtmlImageElement,
        HtmlInputElement, KeyboardEvent,
    };

    use flappy_gates::assets::ObjectUrl;
    use flappy_gates::audio::ScheduledStop;
    use flappy_gates::audio::web::WebAudioSink;
    use flappy_gates::input::{ControlButton, PointerTarget, RawInput, is_primary_key};
    use flappy_gates::persistence::LocalStorageStore;
    use flappy_gates::platform::now_ms;
    use flappy_gates::renderer::CanvasRenderer;
    use flappy_gates::sim::{Controls, GameState};
    use flappy_gates::{Game, Settings, Tuning};

    /// Tags whose presses never start a run
    const CONTROL_TAGS: [&str; 8] = [
        "input", "button", "label", "summary", "details", "a", "select", "textarea",
    ];

    /// DOM elements mirrored from game state
    struct Hud {
        score: Option<Element>,
        best: Option<Element>,
        start: Option<HtmlButtonElement>,
        pause: Option<HtmlButtonElement>,
        restart: Option<HtmlButtonElement>,
        volume_label: Option<Element>,
        /// What is currently shown, to skip redundant DOM writes
        shown: Option<(u32, u32, Controls)>,
    }

    impl Hud {
        fn new(document: &Document) -> Self {
            let button = |id: &str| {
                document
                    .get_element_by_id(id)
                    .and_then(|el| el.dyn_into::<HtmlButtonElement>().ok())
            };
            Self {
                score: document.get_element_by_id("score"),
                best: document.get_element_by_id("best"),
                start: button("startBtn"),
                pause: button("pauseBtn"),
                restart: button("restartBtn"),
                volume_label: document.get_element_by_id("volOutput"),
                shown: None,
            }
        }

        fn sync(&mut self, score: u32, best: u32, controls: Controls) {
            let next = (score, best, controls);
            if self.shown == Some(next) {
                return;
            }
            if let Some(el) = &self.score {
                el.set_text_content(Some(&score.to_string()));
            }
            if let Some(el) = &self.best {
                el.set_text_content(Some(&best.to_string()));
            }
            if let Some(btn) = &self.start {
                btn.set_disabled(!controls.start_enabled);
            }
            if let Some(btn) = &self.pause {
                btn.set_disabled(!controls.pause_enabled);
            }
            if let Some(btn) = &self.restart {
                btn.set_disabled(!controls.restart_enabled);
            }
            self.shown = Some(next);
        }
    }

    /// Everything the page callbacks share
    struct App {
        game: Game<WebAudioSink>,
        renderer: CanvasRenderer,
        settings: Settings,
        hud: Hud,
        avatar_url: ObjectUrl,
        flap_url: ObjectUrl,
        hit_url: ObjectUrl,
    }

    impl App {
        fn sync_hud(&mut self) {
            let state = self.game.state();
            let (score, best) = (state.score(), state.best());
            let controls = self.game.controls();
            self.hud.sync(score, best, controls);
        }

        fn input(&mut self, input: &RawInput) {
            if input.is_gesture() {
                self.game.audio().resume();
            }
            self.game.handle_input(input, now_ms());
            self.sync_hud();
        }
    }

    type Shared = Rc<RefCell<App>>;

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        // A second init (hot reload) is harmless
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Flappy Gates starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("gameCanvas")
            .ok_or("no canvas")?
            .dyn_into()?;

        let tuning = Tuning {
            field_width: canvas.width() as f32,
            field_height: canvas.height() as f32,
            ..Tuning::default()
        };
        let tuning = match tuning.validate() {
            Ok(()) => tuning,
            Err(e) => {
                log::warn!("Canvas size unusable ({}), using default field", e);
                Tuning::default()
            }
        };

        let seed = js_sys::Date::now() as u64;
        let state = GameState::new(tuning, seed, Box::new(LocalStorageStore::default()));
        let mut game = Game::new(state, WebAudioSink::new());
        log::info!("Game initialized with seed: {}", seed);

        let settings = Settings::load();
        game.apply_settings(&settings);

        let mut renderer = CanvasRenderer::new(&canvas).ok_or("2d context unavailable")?;
        renderer.clouds = settings.clouds;

        let app = Rc::new(RefCell::new(App {
            game,
            renderer,
            settings,
            hud: Hud::new(&document),
            avatar_url: ObjectUrl::default(),
            flap_url: ObjectUrl::default(),
            hit_url: ObjectUrl::default(),
        }));
        app.borrow_mut().sync_hud();

        setup_keyboard(&app)?;
        setup_pointer(&canvas, &app)?;
        setup_buttons(&document, &app)?;
        setup_uploads(&document, &app)?;
        setup_volume(&document, &app)?;

        request_animation_frame(app)?;

        log::info!("Flappy Gates running!");
        Ok(())
    }

    /// Hand new stop timers to `setTimeout`
    fn schedule_stops(app: &Shared) {
        let stops: Vec<ScheduledStop> = app.borrow_mut().game.take_scheduled_stops();
        let Some(window) = web_sys::window() else { return };
        for stop in stops {
            let app = app.clone();
            let closure = Closure::once(move || {
                app.borrow_mut().game.fire_stop(stop.token);
            });
            let result = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                stop.delay_ms as i32,
            );
            if result.is_err() {
                log::warn!("Could not schedule {:?} cue stop", stop.cue);
            }
            closure.forget();
        }
    }

    fn dispatch_input(app: &Shared, input: RawInput) {
        app.borrow_mut().input(&input);
        schedule_stops(app);
    }

    fn setup_keyboard(app: &Shared) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;

        // Keydown: primary keys must not scroll the page
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let (code, key) = (event.code(), event.key());
                if is_primary_key(&code, &key) {
                    event.prevent_default();
                    event.stop_propagation();
                }
                let input = RawInput::KeyDown {
                    code,
                    key,
                    repeat: event.repeat(),
                };
                dispatch_input(&app, input);
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                dispatch_input(&app, RawInput::key_up(&event.code()));
            });
            window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Key-ups are lost while unfocused
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                app.borrow_mut().game.focus_lost();
            });
            window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        Ok(())
    }

    /// Classify a press outside the canvas by the element it landed on
    fn target_of(event: &web_sys::Event) -> PointerTarget {
        let tag = event
            .target()
            .and_then(|t| t.dyn_into::<Element>().ok())
            .map(|el| el.tag_name().to_lowercase())
            .unwrap_or_default();
        if CONTROL_TAGS.contains(&tag.as_str()) {
            PointerTarget::Control
        } else {
            PointerTarget::Elsewhere
        }
    }

    fn setup_pointer(canvas: &HtmlCanvasElement, app: &Shared) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;

        // Canvas presses flap (or start); touch must not scroll or zoom
        for (name, prevent) in [("mousedown", false), ("touchstart", true)] {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
                if prevent {
                    event.prevent_default();
                }
                event.stop_propagation();
                dispatch_input(
                    &app,
                    RawInput::PointerDown {
                        target: PointerTarget::PlaySurface,
                    },
                );
            });
            canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Anywhere else starts a run when idle
        for name in ["mousedown", "touchstart"] {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
                let target = target_of(&event);
                dispatch_input(&app, RawInput::PointerDown { target });
            });
            window.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        Ok(())
    }

    fn setup_buttons(document: &Document, app: &Shared) -> Result<(), JsValue> {
        for (id, button) in [
            ("startBtn", ControlButton::Start),
            ("pauseBtn", ControlButton::Pause),
            ("restartBtn", ControlButton::Restart),
        ] {
            let Some(el) = document.get_element_by_id(id) else {
                log::warn!("Missing #{} button", id);
                continue;
            };
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                dispatch_input(&app, RawInput::Button(button));
            });
            el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        Ok(())
    }

    fn input_by_id(document: &Document, id: &str) -> Option<HtmlInputElement> {
        document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
    }

    fn first_file(input: &HtmlInputElement) -> Option<web_sys::File> {
        input.files().and_then(|files| files.get(0))
    }

    /// Which asset an upload input replaces
    #[derive(Clone, Copy)]
    enum Upload {
        Avatar,
        FlapClip,
        HitClip,
    }

    fn setup_uploads(document: &Document, app: &Shared) -> Result<(), JsValue> {
        for (id, kind) in [
            ("imgUpload", Upload::Avatar),
            ("flapUpload", Upload::FlapClip),
            ("hitUpload", Upload::HitClip),
        ] {
            let Some(input) = input_by_id(document, id) else { continue };
            let app = app.clone();
            let input_clone = input.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let Some(file) = first_file(&input_clone) else { return };
                let result = match kind {
                    Upload::Avatar => load_avatar(&app, &file),
                    Upload::FlapClip | Upload::HitClip => load_clip(&app, &file, kind),
                };
                if let Err(e) = result {
                    log::warn!("Upload failed: {:?}", e);
                }
            });
            input.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        Ok(())
    }

    fn load_avatar(app: &Shared, file: &web_sys::File) -> Result<(), JsValue> {
        let Some(url) = app.borrow_mut().avatar_url.replace(file) else {
            return Ok(());
        };
        let img = HtmlImageElement::new()?;
        app.borrow_mut().renderer.avatar_image.replace(img.clone());

        {
            let app = app.clone();
            let loaded = img.clone();
            let onload = Closure::<dyn FnMut()>::new(move || {
                let mut a = app.borrow_mut();
                // A newer upload may have replaced this one
                if a.renderer.avatar_image.get() == Some(&loaded) {
                    a.renderer.avatar_image.mark_ready();
                    log::info!("Custom avatar image ready");
                }
            });
            img.set_onload(Some(onload.as_ref().unchecked_ref()));
            onload.forget();
        }
        {
            let app = app.clone();
            let failed = img.clone();
            let onerror = Closure::<dyn FnMut()>::new(move || {
                let mut a = app.borrow_mut();
                if a.renderer.avatar_image.get() == Some(&failed) {
                    a.renderer.avatar_image.mark_failed();
                    log::warn!("Custom avatar image failed to load, using the default face");
                }
            });
            img.set_onerror(Some(onerror.as_ref().unchecked_ref()));
            onerror.forget();
        }
        img.set_src(&url);
        Ok(())
    }

    fn load_clip(app: &Shared, file: &web_sys::File, kind: Upload) -> Result<(), JsValue> {
        let url = {
            let mut a = app.borrow_mut();
            let slot = match kind {
                Upload::HitClip => &mut a.hit_url,
                _ => &mut a.flap_url,
            };
            slot.replace(file)
        };
        let Some(url) = url else { return Ok(()) };

        let clip = HtmlAudioElement::new_with_src(&url)?;
        clip.set_loop(false);
        clip.set_preload("auto");
        {
            let mut a = app.borrow_mut();
            let sink = a.game.audio_mut();
            let slot = match kind {
                Upload::HitClip => &mut sink.terminal_clip,
                _ => &mut sink.transient_clip,
            };
            slot.replace(clip.clone());
        }

        for (event, ok) in [("canplaythrough", true), ("error", false)] {
            let app = app.clone();
            let target = clip.clone();
            let closure = Closure::<dyn FnMut()>::new(move || {
                let mut a = app.borrow_mut();
                let sink = a.game.audio_mut();
                let slot = match kind {
                    Upload::HitClip => &mut sink.terminal_clip,
                    _ => &mut sink.transient_clip,
                };
                if slot.get() != Some(&target) {
                    return;
                }
                if ok {
                    slot.mark_ready();
                    log::info!("Custom clip ready");
                } else {
                    slot.mark_failed();
                    log::warn!("Custom clip failed to load, using the built-in cue");
                }
            });
            clip.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        clip.load();
        Ok(())
    }

    fn setup_volume(document: &Document, app: &Shared) -> Result<(), JsValue> {
        let Some(input) = input_by_id(document, "flapVol") else {
            return Ok(());
        };
        {
            let a = app.borrow();
            input.set_value(&format!("{}", a.settings.flap_volume.round() as i32));
            if let Some(label) = &a.hud.volume_label {
                label.set_text_content(Some(&a.settings.flap_volume_label()));
            }
        }

        let app = app.clone();
        let input_clone = input.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let percent = input_clone.value().parse::<f32>().unwrap_or(100.0);
            let mut a = app.borrow_mut();
            a.settings.set_flap_volume(percent);
            let settings = a.settings.clone();
            a.game.apply_settings(&settings);
            if let Some(label) = &a.hud.volume_label {
                label.set_text_content(Some(&settings.flap_volume_label()));
            }
            settings.save();
        });
        input.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn request_animation_frame(app: Shared) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        window.request_animation_frame(closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn game_loop(app: Shared, time: f64) {
        {
            let mut a = app.borrow_mut();
            let a = &mut *a;
            a.game.frame(time, &mut a.renderer);
            a.sync_hud();
        }
        schedule_stops(&app);

        if let Err(e) = request_animation_frame(app) {
            log::error!("Frame loop stopped: {:?}", e);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless autopilot run
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::cmp::Reverse;
    use std::collections::BinaryHeap;

    use flappy_gates::Game;
    use flappy_gates::audio::{AudioSink, ScheduledStop, StopToken};
    use flappy_gates::consts::REFERENCE_FRAME_MS;
    use flappy_gates::input::Command;
    use flappy_gates::renderer::NullRenderer;
    use flappy_gates::sim::{GameEvent, GameMode, GameState};

    /// Give up after two minutes of simulated play
    pub const MAX_FRAMES: u32 = 60 * 120;

    /// Height the autopilot steers toward: the centre of the next gap
    pub fn target_height(state: &GameState) -> f32 {
        let avatar = &state.avatar;
        let left = avatar.pos.x - avatar.size.x / 2.0;
        state
            .obstacles
            .iter()
            .find(|o| o.trailing_edge() >= left)
            .map(|o| (o.top + o.bottom) / 2.0)
            .unwrap_or_else(|| state.tuning.avatar_start_y())
    }

    /// Flap once the avatar is falling and has sunk below the target
    pub fn should_flap(state: &GameState) -> bool {
        let avatar = &state.avatar;
        avatar.vel_y >= 0.0 && avatar.pos.y > target_height(state) + avatar.size.y / 4.0
    }

    pub struct RunSummary {
        pub frames: u32,
        pub score: u32,
        pub best: u32,
    }

    /// Cue stops waiting on simulated time, earliest first
    #[derive(Debug, Default)]
    pub struct StopQueue {
        heap: BinaryHeap<Reverse<(u64, StopToken)>>,
    }

    impl StopQueue {
        pub fn schedule(&mut self, now: f64, stops: Vec<ScheduledStop>) {
            for stop in stops {
                // Never fire early: round the due time up to the next ms
                let due = (now + stop.delay_ms).max(0.0).ceil() as u64;
                self.heap.push(Reverse((due, stop.token)));
            }
        }

        /// Tokens due at or before `now`
        pub fn due(&mut self, now: f64) -> Vec<StopToken> {
            let mut tokens = Vec::new();
            while let Some(Reverse((due, token))) = self.heap.peek().copied() {
                if due as f64 > now {
                    break;
                }
                self.heap.pop();
                tokens.push(token);
            }
            tokens
        }

        pub fn len(&self) -> usize {
            self.heap.len()
        }
    }

    pub fn run<A: AudioSink>(game: &mut Game<A>) -> RunSummary {
        let mut renderer = NullRenderer::default();
        let mut stops = StopQueue::default();
        let mut now = 0.0;
        game.command(Command::Primary, now);

        let mut frames = 0;
        while frames < MAX_FRAMES && game.mode() == GameMode::Running {
            now += REFERENCE_FRAME_MS as f64;
            for token in stops.due(now) {
                game.fire_stop(token);
            }
            if should_flap(game.state()) {
                game.command(Command::Primary, now);
            }
            for event in game.frame(now, &mut renderer) {
                if let GameEvent::Scored { score } = event {
                    log::info!("Cleared gate {}", score);
                }
            }
            stops.schedule(now, game.take_scheduled_stops());
            frames += 1;
        }
        log::debug!("{} cue stops still pending at exit", stops.len());

        RunSummary {
            frames,
            score: game.state().score(),
            best: game.state().best(),
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use flappy_gates::Tuning;
        use flappy_gates::persistence::MemoryStore;
        use flappy_gates::sim::Obstacle;

        fn state() -> GameState {
            GameState::new(Tuning::default(), 3, Box::new(MemoryStore::default()))
        }

        #[test]
        fn test_targets_next_gap() {
            let mut state = state();
            // Trailing edge at 120, past the avatar's left edge at 96
            state.obstacles.push(Obstacle::new(1, 50.0, 100.0, 160.0, 70.0));
            state.obstacles.push(Obstacle::new(2, 300.0, 200.0, 160.0, 70.0));
            assert_eq!(target_height(&state), 180.0);
            state.obstacles.remove(0);
            assert_eq!(target_height(&state), 280.0);
        }

        #[test]
        fn test_no_flap_while_rising() {
            let mut state = state();
            state.avatar.pos.y = 500.0;
            state.avatar.vel_y = -3.0;
            assert!(!should_flap(&state));
            state.avatar.vel_y = 1.0;
            assert!(should_flap(&state));
        }

        #[test]
        fn test_stop_queue_releases_in_due_order() {
            use flappy_gates::audio::{CueController, NullSink};

            let mut cues = CueController::new();
            cues.unlock();
            let mut sink = NullSink;
            let flap = cues.request_transient(0.0, &mut sink).unwrap();
            let crash = cues.play_terminal(&mut sink).unwrap();

            let mut queue = StopQueue::default();
            queue.schedule(100.0, vec![crash, flap]);
            assert_eq!(queue.len(), 2);
            assert!(queue.due(899.0).is_empty());
            assert_eq!(queue.due(900.0), vec![flap.token]);
            assert!(queue.due(2099.0).is_empty());
            assert_eq!(queue.due(5000.0), vec![crash.token]);
            assert_eq!(queue.len(), 0);
        }

        #[test]
        fn test_stop_queue_never_fires_early() {
            use flappy_gates::audio::{CueController, NullSink};

            let mut cues = CueController::new();
            cues.unlock();
            let flap = cues.request_transient(0.0, &mut NullSink).unwrap();

            let mut queue = StopQueue::default();
            // Due at 900.4 ms
            queue.schedule(100.4, vec![flap]);
            assert!(queue.due(900.0).is_empty());
            assert!(queue.due(900.5).is_empty());
            assert_eq!(queue.due(901.0), vec![flap.token]);
        }

        #[test]
        fn test_run_ends_or_times_out() {
            let state = state();
            let mut game = Game::new(state, flappy_gates::audio::NullSink);
            let summary = run(&mut game);
            assert!(summary.frames <= MAX_FRAMES);
            assert!(summary.best >= summary.score);
            assert!(game.mode() == GameMode::GameOver || summary.frames == MAX_FRAMES);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn load_tuning(path: &str) -> Result<flappy_gates::Tuning, Box<dyn std::error::Error>> {
    let json = std::fs::read_to_string(path)?;
    let tuning = flappy_gates::Tuning::from_json(&json)?;
    log::info!("Loaded tuning from {}", path);
    Ok(tuning)
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use flappy_gates::audio::NullSink;
    use flappy_gates::persistence::JsonFileStore;
    use flappy_gates::sim::GameState;
    use flappy_gates::{Game, Tuning};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Flappy Gates (headless) starting...");

    let tuning = match std::env::args().nth(1) {
        Some(path) => load_tuning(&path).unwrap_or_else(|e| {
            log::warn!("Ignoring tuning file {}: {}", path, e);
            Tuning::default()
        }),
        None => Tuning::default(),
    };

    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    let store = JsonFileStore::new(std::env::temp_dir().join("flappy-gates-best.json"));
    log::info!("Best score file: {}", store.path().display());

    let state = GameState::new(tuning, seed, Box::new(store));
    let mut game = Game::new(state, NullSink);
    let summary = headless::run(&mut game);

    println!(
        "Run over after {} frames: score {}, best {}",
        summary.frames, summary.score, summary.best
    );
    Ok(())
}

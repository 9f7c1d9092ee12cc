//! Orb Destroyer entry point
//!
//! In the browser this wires the DOM to the game and runs the
//! requestAnimationFrame loop. Natively it plays a headless auto-fire session
//! and prints the final stats.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, HtmlElement, KeyboardEvent, MouseEvent, TouchEvent};

    use orb_destroyer::renderer::CanvasRenderer;
    use orb_destroyer::sim::{
        GameMode, InputEvent, RenderSnapshot, SkinId, StatsSnapshot, UpgradeKind,
    };
    use orb_destroyer::{Frontend, Game};

    /// Canvas for the play field, DOM text for the HUD and shop
    struct WebFrontend {
        canvas: CanvasRenderer,
        document: Document,
    }

    impl Frontend for WebFrontend {
        fn render(&mut self, snapshot: &RenderSnapshot<'_>) {
            if let Err(e) = self.canvas.draw(snapshot) {
                log::warn!("Render error: {:?}", e);
            }
        }

        fn stats_changed(&mut self, stats: &StatsSnapshot) {
            update_hud(&self.document, stats);
        }
    }

    struct App {
        game: Game,
        frontend: WebFrontend,
    }

    impl App {
        fn handle(&mut self, event: InputEvent) {
            self.game.handle(event, now_ms());
        }
    }

    /// Same clock as the requestAnimationFrame timestamp
    fn now_ms() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or(0.0)
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

    fn update_hud(document: &Document, stats: &StatsSnapshot) {
        set_text(document, "coins", &stats.coins.to_string());
        set_text(document, "diamonds", &stats.diamonds.to_string());
        set_text(document, "level", &stats.level.to_string());
        set_text(document, "power", &stats.damage.to_string());
        set_text(document, "orbs-progress", &stats.progress_label());

        for upgrade in &stats.upgrades {
            let name = upgrade.kind.as_str();
            set_text(document, &format!("{name}-level"), &upgrade.level.to_string());
            set_text(document, &format!("{name}-cost"), &upgrade.cost.to_string());
            let selector = format!("[data-upgrade=\"{name}\"]");
            if let Ok(Some(card)) = document.query_selector(&selector) {
                let _ = card
                    .class_list()
                    .toggle_with_force("disabled", !upgrade.affordable);
            }
        }

        for skin in &stats.skins {
            let selector = format!("[data-skin=\"{}\"]", skin.skin.name());
            if let Ok(Some(card)) = document.query_selector(&selector) {
                let classes = card.class_list();
                let _ = classes.toggle_with_force("owned", skin.owned);
                let _ = classes.toggle_with_force("active", skin.active);
            }
        }

        if let Some(btn) = document.get_element_by_id("auto-fire-btn") {
            let label = if stats.auto_fire { "AUTO-FIRE: ON" } else { "AUTO-FIRE" };
            btn.set_text_content(Some(label));
            let _ = btn.class_list().toggle_with_force("special", stats.auto_fire);
        }
        let pause_label = if stats.mode == GameMode::Paused { "RESUME" } else { "PAUSE" };
        set_text(document, "pause-btn", pause_label);

        let in_menu = stats.mode == GameMode::Menu;
        set_hidden(document, "start-screen", !in_menu);
        set_hidden(document, "game-screen", in_menu);
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialised".into());
        }

        log::info!("Orb Destroyer starting...");

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("game-canvas")
            .ok_or_else(|| JsValue::from_str("no canvas"))?
            .dyn_into()
            .map_err(|_| JsValue::from_str("game-canvas is not a canvas"))?;
        let (width, height) = fit_canvas(&canvas);

        let seed = js_sys::Date::now() as u64;
        let frontend = WebFrontend {
            canvas: CanvasRenderer::new(&canvas)?,
            document: document.clone(),
        };
        let app = Rc::new(RefCell::new(App {
            game: Game::new(seed),
            frontend,
        }));
        app.borrow_mut().handle(InputEvent::Resize { width, height });
        log::info!("Game initialized with seed: {}", seed);

        setup_buttons(&document, &app);
        setup_canvas_input(&canvas, &app);
        setup_shop(&document, &app);
        setup_keyboard(&document, &app);
        setup_auto_pause(&document, &app);
        setup_resize(&window, &canvas, &app);

        request_animation_frame(app);
        log::info!("Orb Destroyer running!");
        Ok(())
    }

    /// Match the canvas backing store to its laid-out size
    fn fit_canvas(canvas: &HtmlCanvasElement) -> (f32, f32) {
        let width = canvas.client_width().max(1) as u32;
        let height = canvas.client_height().max(1) as u32;
        canvas.set_width(width);
        canvas.set_height(height);
        (width as f32, height as f32)
    }

    fn on_click(document: &Document, id: &str, app: &Rc<RefCell<App>>, event: InputEvent) {
        let Some(el) = document.get_element_by_id(id) else {
            log::warn!("Missing #{} in page", id);
            return;
        };
        let app = app.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            app.borrow_mut().handle(event);
        });
        let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(document: &Document, app: &Rc<RefCell<App>>) {
        on_click(document, "start-btn", app, InputEvent::StartGame);
        on_click(document, "pause-btn", app, InputEvent::TogglePause);
        on_click(document, "auto-fire-btn", app, InputEvent::ToggleAutoFire);
        on_click(document, "restart-btn", app, InputEvent::Restart);
        on_click(document, "main-menu-btn", app, InputEvent::ReturnToMenu);
        on_click(document, "next-level-btn", app, InputEvent::AdvanceLevel);
    }

    fn setup_canvas_input(canvas: &HtmlCanvasElement, app: &Rc<RefCell<App>>) {
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                app.borrow_mut().handle(InputEvent::Shoot);
            });
            let _ = canvas.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch shoots too; suppress the synthetic click that would follow
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                app.borrow_mut().handle(InputEvent::Shoot);
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Upgrade cards carry `data-upgrade`, skin cards `data-skin`
    fn setup_shop(document: &Document, app: &Rc<RefCell<App>>) {
        let bind = |selector: &str, key: &'static str| {
            let Ok(cards) = document.query_selector_all(selector) else {
                return;
            };
            for i in 0..cards.length() {
                let Some(card) = cards.item(i).and_then(|n| n.dyn_into::<HtmlElement>().ok()) else {
                    continue;
                };
                let Some(value) = card.dataset().get(key) else {
                    continue;
                };
                let event = match key {
                    "upgrade" => UpgradeKind::parse(&value).map(InputEvent::PurchaseUpgrade),
                    _ => SkinId::parse(&value).map(InputEvent::PurchaseSkin),
                };
                let Some(event) = event else {
                    log::warn!("Unknown shop item {:?}", value);
                    continue;
                };
                let app = app.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                    app.borrow_mut().handle(event);
                });
                let _ = card.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        };
        bind(".upgrade-card", "upgrade");
        bind(".skin-card", "skin");
    }

    fn setup_keyboard(document: &Document, app: &Rc<RefCell<App>>) {
        let app = app.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            let input = match event.key().as_str() {
                " " => InputEvent::Shoot,
                "a" | "A" => InputEvent::ToggleAutoFire,
                "p" | "P" | "Escape" => InputEvent::TogglePause,
                _ => return,
            };
            event.prevent_default();
            app.borrow_mut().handle(input);
        });
        let _ = document.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_auto_pause(document: &Document, app: &Rc<RefCell<App>>) {
        let app = app.clone();
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                let mut app = app.borrow_mut();
                if app.game.state.mode == GameMode::Playing {
                    app.handle(InputEvent::TogglePause);
                    log::info!("Auto-paused (tab hidden)");
                }
            }
        });
        let _ = document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_resize(window: &web_sys::Window, canvas: &HtmlCanvasElement, app: &Rc<RefCell<App>>) {
        let app = app.clone();
        let canvas = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let (width, height) = fit_canvas(&canvas);
            app.borrow_mut().handle(InputEvent::Resize { width, height });
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, time: f64) {
        {
            let mut guard = app.borrow_mut();
            let App { game, frontend } = &mut *guard;
            game.frame(time, frontend);
            for event in game.drain_events() {
                log::debug!("{:?}", event);
            }
        }

        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    if let Err(e) = wasm_game::run() {
        web_sys::console::error_1(&e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::error::Error;

    use orb_destroyer::consts::NOMINAL_FRAME_MS;
    use orb_destroyer::sim::{
        GameEvent, InputEvent, RenderSnapshot, SkinId, StatsSnapshot, UpgradeKind,
    };
    use orb_destroyer::{Frontend, Game, Settings, Tuning};

    /// Ten minutes at 60 fps
    const DEFAULT_FRAMES: u64 = 36_000;
    /// How often the bot visits the shop
    const SHOP_EVERY_FRAMES: u64 = 60;

    #[derive(Default)]
    struct Recorder {
        frames_rendered: u64,
        last_stats: Option<StatsSnapshot>,
    }

    impl Frontend for Recorder {
        fn render(&mut self, _snapshot: &RenderSnapshot<'_>) {
            self.frames_rendered += 1;
        }

        fn stats_changed(&mut self, stats: &StatsSnapshot) {
            self.last_stats = Some(stats.clone());
        }
    }

    /// Usage: `orb-destroyer [tuning.json] [frames]`
    pub fn run(mut args: impl Iterator<Item = String>) -> Result<(), Box<dyn Error>> {
        let tuning = match args.next() {
            Some(path) => {
                log::info!("Loading tuning from {}", path);
                Tuning::from_json(&std::fs::read_to_string(&path)?)?
            }
            None => Tuning::default(),
        };
        let frames = match args.next() {
            Some(n) => n.parse()?,
            None => DEFAULT_FRAMES,
        };

        let seed = 0x0b_de57;
        let mut game = Game::with_config(seed, tuning, Settings::default())?;
        let mut recorder = Recorder::default();

        game.handle(InputEvent::StartGame, 0.0);
        game.handle(InputEvent::ToggleAutoFire, 0.0);

        for frame in 0..frames {
            let time = frame as f64 * NOMINAL_FRAME_MS;
            game.frame(time, &mut recorder);

            if frame % SHOP_EVERY_FRAMES == 0 {
                shop(&mut game, time);
            }

            for event in game.drain_events() {
                match event {
                    GameEvent::LevelUp { level, bonus_coins, bonus_diamonds } => {
                        log::info!(
                            "[{:>6}] level {} reached (+{} coins, +{} diamonds)",
                            frame,
                            level,
                            bonus_coins,
                            bonus_diamonds
                        );
                    }
                    GameEvent::UpgradePurchased { kind, level } => {
                        log::debug!("[{:>6}] bought {} -> {}", frame, kind.as_str(), level);
                    }
                    _ => {}
                }
            }
        }

        log::info!(
            "Session over after {} frames ({} rendered)",
            frames,
            recorder.frames_rendered
        );
        let stats = StatsSnapshot::capture(&game.state);
        println!("{}", serde_json::to_string_pretty(&stats)?);
        Ok(())
    }

    /// Greedy bot: cheapest affordable upgrade first, then the next skin
    fn shop(game: &mut Game, time: f64) {
        while let Some(kind) = UpgradeKind::ALL
            .into_iter()
            .filter(|&kind| game.state.ledger.can_afford(kind))
            .min_by_key(|&kind| game.state.ledger.upgrade(kind).cost)
        {
            game.handle(InputEvent::PurchaseUpgrade(kind), time);
        }

        let ledger = &game.state.ledger;
        let next_skin = SkinId::ALL
            .into_iter()
            .find(|&skin| !ledger.owns(skin))
            .filter(|skin| ledger.diamonds >= skin.cost());
        if let Some(skin) = next_skin {
            game.handle(InputEvent::PurchaseSkin(skin), time);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Orb Destroyer (native) starting...");

    if let Err(err) = headless::run(std::env::args().skip(1)) {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

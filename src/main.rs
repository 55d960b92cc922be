//! Cosmic Arcade entry point
//!
//! On the web: mounts one game on a canvas and drives it from
//! requestAnimationFrame. Natively: runs every game headlessly with scripted
//! input and logs what happened.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_host {
    use std::any::Any;
    use std::cell::RefCell;
    use std::rc::{Rc, Weak};

    use anyhow::{Context, anyhow};
    use wasm_bindgen::prelude::*;
    use web_sys::{EventTarget, HtmlCanvasElement, KeyboardEvent, MouseEvent, PointerEvent};

    use cosmic_arcade::platform::{AnimationLoop, Capabilities};
    use cosmic_arcade::renderer::canvas::CanvasRenderer;
    use cosmic_arcade::renderer::RenderOptions;
    use cosmic_arcade::sim::input::ClientRect;
    use cosmic_arcade::sim::{AchievementSink, GameEvent, InputAdapter, TimeStep, UnlockedSet};
    use cosmic_arcade::{GameKind, MiniGame, Settings};

    const CANVAS_ID: &str = "game-canvas";

    /// One mounted game and everything its frame callback touches
    struct Host {
        game: Box<dyn MiniGame>,
        input: InputAdapter,
        renderer: CanvasRenderer,
        canvas: HtmlCanvasElement,
        options: RenderOptions,
        show_fps: bool,
        unlocked: UnlockedSet,
        last_time: Option<f64>,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: f32,
    }

    struct Mounted {
        host: Rc<RefCell<Host>>,
        _frame_loop: AnimationLoop,
        _listeners: Vec<Listener>,
    }

    /// Registered DOM listener; removed from its target on drop
    struct Listener {
        target: EventTarget,
        name: &'static str,
        callback: js_sys::Function,
        _closure: Box<dyn Any>,
    }

    impl Drop for Listener {
        fn drop(&mut self) {
            if let Err(e) = self.target.remove_event_listener_with_callback(self.name, &self.callback) {
                log::warn!("Could not remove {} listener: {:?}", self.name, e);
            }
        }
    }

    thread_local! {
        static MOUNTED: RefCell<Option<Mounted>> = const { RefCell::new(None) };
    }

    impl Host {
        fn frame(&mut self, time: f64) {
            let step = match self.last_time {
                Some(last) => TimeStep::from_elapsed_ms(time - last),
                None => TimeStep::NOMINAL,
            };
            self.last_time = Some(time);
            self.track_fps(time);

            let rect = self.canvas.get_bounding_client_rect();
            self.input.set_client_rect(ClientRect {
                left: rect.left() as f32,
                top: rect.top() as f32,
                width: rect.width() as f32,
                height: rect.height() as f32,
            });

            let input = self.input.take();
            for event in self.game.tick(&input, step) {
                match event {
                    GameEvent::Achievement(id) => self.unlocked.notify(&id),
                    GameEvent::PhaseChanged { from, to } => log::debug!("{:?} -> {:?}", from, to),
                    _ => {}
                }
            }

            self.options.fps = self.show_fps.then_some(self.fps);
            let frame = self.game.frame(&self.options);
            self.renderer.render(&frame);
        }

        fn track_fps(&mut self, time: f64) {
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % self.frame_times.len();
            let oldest = self.frame_times[self.frame_index];
            if oldest > 0.0 && time > oldest {
                self.fps = (60_000.0 / (time - oldest)) as f32;
            }
        }

        /// Tab hidden or window blurred: pause a running game
        fn auto_pause(&mut self, why: &str) {
            if self.game.phase().is_running() {
                self.input.toggle_pause();
                log::info!("Auto-paused ({})", why);
            }
        }
    }

    pub fn mount(slug: &str) -> anyhow::Result<()> {
        unmount();

        let caps = Capabilities::detect();
        if let Some(notice) = caps.unsupported_notice() {
            log::error!("{}", notice);
            return Err(anyhow!(notice));
        }

        let kind = GameKind::from_slug(slug).with_context(|| format!("unknown game '{}'", slug))?;
        let window = web_sys::window().context("no window")?;
        let (canvas, ctx) = cosmic_arcade::renderer::canvas::get_canvas_context(CANVAS_ID)
            .with_context(|| format!("no 2D canvas with id '{}'", CANVAS_ID))?;

        let settings = Settings::load();
        let seed = js_sys::Date::now() as u64;
        let game = kind.create(seed);
        let arena = game.arena();

        let mut renderer = CanvasRenderer::new(ctx);
        renderer.resize(&canvas, arena, window.device_pixel_ratio());

        let host = Rc::new(RefCell::new(Host {
            game,
            input: InputAdapter::new(arena),
            renderer,
            canvas: canvas.clone(),
            options: RenderOptions::from_settings(&settings),
            show_fps: settings.show_fps,
            unlocked: UnlockedSet::default(),
            last_time: None,
            frame_times: [0.0; 60],
            frame_index: 0,
            fps: 0.0,
        }));
        log::info!("Mounted {} with seed {}", slug, seed);

        let mut listeners = setup_input_handlers(&canvas, Rc::downgrade(&host));
        listeners.extend(setup_auto_pause(Rc::downgrade(&host)));

        let weak = Rc::downgrade(&host);
        let frame_loop = AnimationLoop::start(move |time| {
            if let Some(host) = weak.upgrade() {
                host.borrow_mut().frame(time);
            }
        });

        MOUNTED.with(|m| {
            *m.borrow_mut() = Some(Mounted {
                host,
                _frame_loop: frame_loop,
                _listeners: listeners,
            })
        });
        Ok(())
    }

    /// Stop the frame loop, detach the listeners and drop the game
    pub fn unmount() {
        let previous = MOUNTED.with(|m| m.borrow_mut().take());
        if let Some(mounted) = previous {
            let title = mounted.host.borrow().game.title().to_string();
            drop(mounted);
            log::info!("Unmounted {}", title);
        }
    }

    fn listen<E: wasm_bindgen::convert::FromWasmAbi + 'static>(
        target: &EventTarget,
        name: &'static str,
        host: Weak<RefCell<Host>>,
        mut handler: impl FnMut(&mut Host, E) + 'static,
    ) -> Option<Listener> {
        let closure = Closure::<dyn FnMut(E)>::new(move |event: E| {
            if let Some(host) = host.upgrade() {
                handler(&mut host.borrow_mut(), event);
            }
        });
        let callback: js_sys::Function = closure.as_ref().unchecked_ref::<js_sys::Function>().clone();
        if let Err(e) = target.add_event_listener_with_callback(name, &callback) {
            log::error!("Could not add {} listener: {:?}", name, e);
            return None;
        }
        Some(Listener {
            target: target.clone(),
            name,
            callback,
            _closure: Box::new(closure),
        })
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, host: Weak<RefCell<Host>>) -> Vec<Listener> {
        let mut listeners = vec![
            listen(canvas, "pointermove", host.clone(), |h, e: PointerEvent| {
                h.input.pointer_moved(e.client_x() as f32, e.client_y() as f32);
            }),
            listen(canvas, "pointerdown", host.clone(), |h, e: PointerEvent| {
                h.input.pointer_down(e.client_x() as f32, e.client_y() as f32);
            }),
            listen(canvas, "pointerup", host.clone(), |h, e: PointerEvent| {
                h.input.pointer_up(e.client_x() as f32, e.client_y() as f32);
            }),
            listen(canvas, "click", host.clone(), |h, e: MouseEvent| {
                h.input.click(e.client_x() as f32, e.client_y() as f32);
            }),
        ];

        if let Some(document) = web_sys::window().and_then(|w| w.document()) {
            listeners.push(listen(&document, "keydown", host, |h, e: KeyboardEvent| {
                if matches!(e.key().as_str(), "p" | "P" | "Escape") {
                    h.input.toggle_pause();
                }
            }));
        }
        listeners.into_iter().flatten().collect()
    }

    fn setup_auto_pause(host: Weak<RefCell<Host>>) -> Vec<Listener> {
        let Some(window) = web_sys::window() else {
            return Vec::new();
        };
        let mut listeners = Vec::new();
        if let Some(document) = window.document() {
            let doc = document.clone();
            listeners.push(listen(&document, "visibilitychange", host.clone(), move |h, _: web_sys::Event| {
                if doc.visibility_state() == web_sys::VisibilityState::Hidden {
                    h.auto_pause("tab hidden");
                }
            }));
        }
        listeners.push(listen(&window, "blur", host, |h, _: web_sys::FocusEvent| h.auto_pause("window blur")));
        listeners.into_iter().flatten().collect()
    }

    /// Default game when the canvas names none
    pub fn requested_slug() -> String {
        web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(CANVAS_ID))
            .and_then(|c| c.get_attribute("data-game"))
            .unwrap_or_else(|| GameKind::CosmicCollector.slug().to_string())
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"logger already initialised".into());
        }
        log::info!("Cosmic Arcade starting...");

        if let Err(e) = mount(&requested_slug()) {
            log::error!("Could not start game: {:#}", e);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_host::run();
}

/// Switch the page to another game
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn mount_game(slug: &str) -> Result<(), JsValue> {
    wasm_host::mount(slug).map_err(|e| JsValue::from_str(&format!("{:#}", e)))
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn unmount_game() {
    wasm_host::unmount();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use cosmic_arcade::GameKind;

    env_logger::init();
    log::info!("Cosmic Arcade (native) starting...");
    log::info!("Native mode runs games headlessly - serve the wasm build to play");

    let kinds: Vec<GameKind> = match std::env::args().nth(1) {
        Some(slug) => match GameKind::from_slug(&slug) {
            Some(kind) => vec![kind],
            None => {
                eprintln!("unknown game '{}'", slug);
                let names: Vec<&str> = GameKind::ALL.iter().map(|k| k.slug()).collect();
                eprintln!("available: {}", names.join(", "));
                std::process::exit(2);
            }
        },
        None => GameKind::ALL.to_vec(),
    };

    for kind in kinds {
        demo(kind);
    }
}

/// Scripted run: click to start, sweep the pointer, click now and then
#[cfg(not(target_arch = "wasm32"))]
fn demo(kind: cosmic_arcade::GameKind) {
    use cosmic_arcade::renderer::RenderOptions;
    use cosmic_arcade::sim::{GameEvent, InputAdapter, TimeStep};

    const TICKS: u32 = 1800;

    let mut game = kind.create(42);
    let arena = game.arena();
    let mut input = InputAdapter::new(arena);
    let mut achievements = Vec::new();
    let mut transitions = 0;

    input.pointer_down(arena.x / 2.0, arena.y / 2.0);
    input.click(arena.x / 2.0, arena.y / 2.0);
    for t in 0..TICKS {
        let phase = t as f32 * 0.01;
        let x = arena.x / 2.0 + phase.sin() * arena.x * 0.4;
        let y = arena.y / 2.0 + (phase * 0.7).cos() * arena.y * 0.3;
        input.pointer_moved(x, y);
        match t % 90 {
            30 => input.pointer_up(x, y),
            60 => {
                input.pointer_down(x, y);
                input.click(x, y);
            }
            _ => {}
        }
        for event in game.tick(&input.take(), TimeStep::NOMINAL) {
            match event {
                GameEvent::Achievement(id) => achievements.push(id),
                GameEvent::PhaseChanged { .. } => transitions += 1,
                _ => {}
            }
        }
    }

    let frame = game.frame(&RenderOptions::default());
    println!(
        "{:<20} phase {:<10} transitions {:>3}  draw cmds {:>4}  achievements [{}]",
        kind.slug(),
        format!("{:?}", game.phase()),
        transitions,
        frame.len(),
        achievements.join(", ")
    );
}

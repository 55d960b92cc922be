//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Mount lifetime (liveness tokens for async results)
//! - Capability detection before mounting a canvas game
//! - The requestAnimationFrame loop (wasm only)

use std::rc::{Rc, Weak};

#[cfg(target_arch = "wasm32")]
mod frame_loop;

#[cfg(target_arch = "wasm32")]
pub use frame_loop::AnimationLoop;

/// Owned by a mounted game; dropping it marks every token dead
#[derive(Debug, Default)]
pub struct Liveness {
    alive: Rc<()>,
}

/// Cheap handle checked before applying late results
#[derive(Debug, Clone)]
pub struct LivenessToken {
    alive: Weak<()>,
}

impl Liveness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> LivenessToken {
        LivenessToken {
            alive: Rc::downgrade(&self.alive),
        }
    }
}

impl LivenessToken {
    pub fn is_alive(&self) -> bool {
        self.alive.strong_count() > 0
    }
}

/// What the environment can do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub canvas_2d: bool,
    pub local_storage: bool,
    pub touch: bool,
}

impl Capabilities {
    /// Native builds render headlessly
    pub fn headless() -> Self {
        Self {
            canvas_2d: false,
            local_storage: false,
            touch: false,
        }
    }

    pub fn can_mount(&self) -> bool {
        self.canvas_2d
    }

    /// Notice shown instead of a game when mounting is impossible
    pub fn unsupported_notice(&self) -> Option<&'static str> {
        (!self.can_mount()).then_some("Your browser does not support the canvas needed for this game.")
    }

    /// Probe the browser: a throwaway canvas must hand out a 2D context
    #[cfg(target_arch = "wasm32")]
    pub fn detect() -> Self {
        use wasm_bindgen::JsCast;

        let Some(window) = web_sys::window() else {
            return Self::headless();
        };
        let canvas_2d = window
            .document()
            .and_then(|d| d.create_element("canvas").ok())
            .and_then(|el| el.dyn_into::<web_sys::HtmlCanvasElement>().ok())
            .and_then(|c| c.get_context("2d").ok().flatten())
            .is_some();
        let local_storage = window.local_storage().ok().flatten().is_some();
        let touch = window.navigator().max_touch_points() > 0;
        let caps = Self {
            canvas_2d,
            local_storage,
            touch,
        };
        log::info!("Capabilities: {:?}", caps);
        caps
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn detect() -> Self {
        Self::headless()
    }
}

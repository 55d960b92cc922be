//! requestAnimationFrame driver with cancellation

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

type FrameClosure = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Running frame loop. Dropping it cancels the pending frame and frees the
/// callback.
pub struct AnimationLoop {
    slot: FrameClosure,
    handle: Rc<Cell<Option<i32>>>,
    running: Rc<Cell<bool>>,
}

fn request(slot: &FrameClosure, handle: &Cell<Option<i32>>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    if let Some(closure) = slot.borrow().as_ref() {
        match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(id) => handle.set(Some(id)),
            Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
        }
    }
}

impl AnimationLoop {
    /// Call `on_frame(timestamp_ms)` every animation frame until dropped
    pub fn start(mut on_frame: impl FnMut(f64) + 'static) -> Self {
        let slot: FrameClosure = Rc::new(RefCell::new(None));
        let handle = Rc::new(Cell::new(None));
        let running = Rc::new(Cell::new(true));

        let (next_slot, next_handle, still_running) = (slot.clone(), handle.clone(), running.clone());
        *slot.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp: f64| {
            next_handle.set(None);
            if !still_running.get() {
                return;
            }
            on_frame(timestamp);
            if still_running.get() {
                request(&next_slot, &next_handle);
            }
        }) as Box<dyn FnMut(f64)>));

        request(&slot, &handle);
        log::info!("Frame loop started");
        Self { slot, handle, running }
    }

    pub fn stop(&self) {
        self.running.set(false);
        if let Some(id) = self.handle.take()
            && let Some(window) = web_sys::window()
        {
            let _ = window.cancel_animation_frame(id);
        }
    }
}

impl Drop for AnimationLoop {
    fn drop(&mut self) {
        self.stop();
        // Break the closure's self-reference
        self.slot.borrow_mut().take();
        log::info!("Frame loop stopped");
    }
}

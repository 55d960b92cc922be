//! Pointer input adapter
//!
//! DOM events land here between frames. Each frame the host calls `take()`,
//! which hands the tick a snapshot and clears the one-shot flags.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    /// Last known pointer position in canvas space
    pub pointer: Option<Vec2>,
    /// Pointer went down since the last tick
    pub pressed: bool,
    /// Pointer went up since the last tick
    pub released: bool,
    /// Click/tap completed since the last tick
    pub clicked: bool,
    /// Pause toggle
    pub pause: bool,
}

/// Client-space rectangle of the canvas element (getBoundingClientRect)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClientRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

/// Collects pointer events and maps them into canvas coordinates
#[derive(Debug, Clone)]
pub struct InputAdapter {
    canvas_size: Vec2,
    rect: ClientRect,
    pending: TickInput,
}

impl InputAdapter {
    pub fn new(canvas_size: Vec2) -> Self {
        Self {
            canvas_size,
            rect: ClientRect {
                left: 0.0,
                top: 0.0,
                width: canvas_size.x,
                height: canvas_size.y,
            },
            pending: TickInput::default(),
        }
    }

    /// Canvas element moved or was resized by CSS
    pub fn set_client_rect(&mut self, rect: ClientRect) {
        self.rect = rect;
    }

    /// Client coordinates -> canvas coordinates, undoing CSS scaling
    pub fn to_canvas(&self, client_x: f32, client_y: f32) -> Vec2 {
        let scale = Vec2::new(
            if self.rect.width > 0.0 { self.canvas_size.x / self.rect.width } else { 1.0 },
            if self.rect.height > 0.0 { self.canvas_size.y / self.rect.height } else { 1.0 },
        );
        (Vec2::new(client_x, client_y) - Vec2::new(self.rect.left, self.rect.top)) * scale
    }

    pub fn pointer_moved(&mut self, client_x: f32, client_y: f32) {
        self.pending.pointer = Some(self.to_canvas(client_x, client_y));
    }

    pub fn pointer_down(&mut self, client_x: f32, client_y: f32) {
        self.pointer_moved(client_x, client_y);
        self.pending.pressed = true;
    }

    pub fn pointer_up(&mut self, client_x: f32, client_y: f32) {
        self.pointer_moved(client_x, client_y);
        self.pending.released = true;
    }

    pub fn click(&mut self, client_x: f32, client_y: f32) {
        self.pointer_moved(client_x, client_y);
        self.pending.clicked = true;
    }

    pub fn toggle_pause(&mut self) {
        self.pending.pause = true;
    }

    /// Snapshot for this tick; clears one-shot inputs after processing
    pub fn take(&mut self) -> TickInput {
        let input = self.pending.clone();
        self.pending.pressed = false;
        self.pending.released = false;
        self.pending.clicked = false;
        self.pending.pause = false;
        input
    }
}
